//! Batch driver: JSON Lines in, one result file per record out.
//!
//! Records are computed independently. A failing record lands in
//! `errors.ndjson` and never stops its siblings.
use crate::client::PayrollClient;
use crate::document::{display_value, get_path};
use crate::preflight::{MissingPolicy, NonInteractivePrompt, PromptProvider};
use crate::util::safe_slug;
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

pub const ERROR_LOG_NAME: &str = "errors.ndjson";

/// One parsed input line. `index` is the 1-based line number and names the
/// output file.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub index: usize,
    pub document: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct RecordSet {
    pub records: Vec<Record>,
    pub skipped: Vec<SkippedLine>,
}

/// Per-record result, in input order once collected.
#[derive(Debug)]
pub struct Outcome {
    pub index: usize,
    pub result: std::result::Result<Value, String>,
}

#[derive(Debug, Serialize)]
struct ErrorLine<'a> {
    index: usize,
    error: &'a str,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    /// File names written under the output directory, in input order.
    pub written: Vec<String>,
    pub errors: usize,
    pub error_log: Option<PathBuf>,
}

/// Read a JSON Lines file. Blank lines are ignored; lines that fail to parse
/// are reported in `skipped` instead of failing the whole read.
pub fn read_records(path: &Path) -> Result<RecordSet> {
    let text =
        fs::read_to_string(path).with_context(|| format!("read input {}", path.display()))?;
    let mut set = RecordSet::default();
    for (offset, line) in text.lines().enumerate() {
        let line_number = offset + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str(line) {
            Ok(document) => set.records.push(Record {
                index: line_number,
                document,
            }),
            Err(err) => {
                tracing::debug!(line = line_number, error = %err, "skipping malformed record");
                set.skipped.push(SkippedLine {
                    line: line_number,
                    message: err.to_string(),
                });
            }
        }
    }
    Ok(set)
}

/// Interactive prompts cannot be shared between concurrent workers.
pub fn check_worker_policy(workers: usize, policy: MissingPolicy) -> Result<()> {
    if workers > 1 && policy == MissingPolicy::Ask {
        return Err(anyhow!(
            "--missing-policy ask needs a single worker (got --workers {workers})"
        ));
    }
    Ok(())
}

/// Compute every record. With one worker the caller's prompt is used; with
/// more, each worker thread answers non-interactively.
pub fn compute_records(
    client: &PayrollClient,
    records: &[Record],
    policy: MissingPolicy,
    workers: usize,
    prompt: &mut dyn PromptProvider,
) -> Result<Vec<Outcome>> {
    check_worker_policy(workers, policy)?;
    if workers <= 1 || records.len() <= 1 {
        return Ok(records
            .iter()
            .map(|record| compute_one(client, record, policy, prompt))
            .collect());
    }

    let next = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel();
    thread::scope(|scope| {
        for _ in 0..workers.min(records.len()) {
            let tx = tx.clone();
            let next = &next;
            scope.spawn(move || {
                let mut prompt = NonInteractivePrompt;
                loop {
                    let idx = next.fetch_add(1, Ordering::SeqCst);
                    let Some(record) = records.get(idx) else {
                        break;
                    };
                    let outcome = compute_one(client, record, policy, &mut prompt);
                    if tx.send(outcome).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(tx);

    let mut outcomes: Vec<Outcome> = rx.into_iter().collect();
    outcomes.sort_by_key(|outcome| outcome.index);
    Ok(outcomes)
}

fn compute_one(
    client: &PayrollClient,
    record: &Record,
    policy: MissingPolicy,
    prompt: &mut dyn PromptProvider,
) -> Outcome {
    let result = client
        .compute(&record.document, policy, prompt)
        .map_err(|err| format!("{:#}", anyhow::Error::from(err)));
    match &result {
        Ok(_) => tracing::info!(index = record.index, "record computed"),
        Err(err) => tracing::info!(index = record.index, error = %err, "record failed"),
    }
    Outcome {
        index: record.index,
        result,
    }
}

/// `<idx:03>_<slug(ccaa)>_<month>-<year>.json`, built from the record as read.
pub fn output_file_name(index: usize, document: &Value) -> String {
    let field = |path: &str, placeholder: &str| {
        get_path(document, path)
            .filter(|value| !value.is_null())
            .map_or_else(|| placeholder.to_string(), display_value)
    };
    let ccaa = field("region_config.ccaa", "CCAA");
    let month = field("period.month", "MM");
    let year = field("period.year", "YYYY");
    format!("{index:03}_{}_{month}-{year}.json", safe_slug(&ccaa))
}

/// Write result files and the error log under `out_dir`.
pub fn write_outcomes(
    out_dir: &Path,
    records: &[Record],
    outcomes: &[Outcome],
) -> Result<BatchReport> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("create output dir {}", out_dir.display()))?;
    let mut report = BatchReport::default();
    let mut error_lines = Vec::new();

    for outcome in outcomes {
        match &outcome.result {
            Ok(value) => {
                let source = records
                    .iter()
                    .find(|record| record.index == outcome.index)
                    .map(|record| &record.document);
                let name = output_file_name(outcome.index, source.unwrap_or(&Value::Null));
                let path = out_dir.join(&name);
                let text = serde_json::to_string_pretty(value).context("serialize result")?;
                fs::write(&path, text + "\n")
                    .with_context(|| format!("write {}", path.display()))?;
                report.written.push(name);
            }
            Err(message) => error_lines.push(ErrorLine {
                index: outcome.index,
                error: message,
            }),
        }
    }

    if !error_lines.is_empty() {
        let path = out_dir.join(ERROR_LOG_NAME);
        let mut file =
            fs::File::create(&path).with_context(|| format!("create {}", path.display()))?;
        for line in &error_lines {
            let text = serde_json::to_string(line).context("serialize error line")?;
            writeln!(file, "{text}").with_context(|| format!("write {}", path.display()))?;
        }
        report.errors = error_lines.len();
        report.error_log = Some(path);
    }
    Ok(report)
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;
