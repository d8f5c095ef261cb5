use crate::cli::{BatchArgs, ComputeArgs, PreflightArgs, ServiceArgs};
use anyhow::{Context, Result};
use payroll_pipeline::batch;
use payroll_pipeline::client::{run_preflight, PayrollClient};
use payroll_pipeline::config::{apply_env_overrides, load_config, validate_config, PipelineConfig};
use payroll_pipeline::preflight::{
    ConsolePrompt, MissingPolicy, NonInteractivePrompt, PromptProvider, ScriptedPrompt,
};
use payroll_pipeline::schema::SchemaSet;
use payroll_pipeline::service::{CannedService, ComputationService, OpenAiService};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

const EXIT_INPUT_MISSING: u8 = 1;
const EXIT_NO_RECORDS: u8 = 2;
const EXIT_RECORD_ERRORS: u8 = 3;

pub fn run_batch(args: BatchArgs) -> Result<ExitCode> {
    let workers = usize::from(args.workers);
    batch::check_worker_policy(workers, args.missing_policy)?;
    if !args.input.is_file() {
        eprintln!("Input not found: {}", args.input.display());
        return Ok(ExitCode::from(EXIT_INPUT_MISSING));
    }

    let set = batch::read_records(&args.input)?;
    for skipped in &set.skipped {
        eprintln!("[SKIP] Line {} JSON error: {}", skipped.line, skipped.message);
    }
    if set.records.is_empty() {
        eprintln!("No valid records found.");
        return Ok(ExitCode::from(EXIT_NO_RECORDS));
    }

    let client = build_client(&args.service)?;
    let mut prompt = prompt_for(args.missing_policy, args.answers.as_deref())?;
    tracing::info!(
        records = set.records.len(),
        workers,
        policy = %args.missing_policy,
        "starting batch"
    );
    let outcomes = batch::compute_records(
        &client,
        &set.records,
        args.missing_policy,
        workers,
        prompt.as_mut(),
    )?;
    let report = batch::write_outcomes(&args.out_dir, &set.records, &outcomes)?;
    for name in &report.written {
        println!("[OK] {name}");
    }

    if let Some(log) = &report.error_log {
        eprintln!(
            "[DONE with errors] {} ok, {} errors -> {}",
            report.written.len(),
            report.errors,
            log.display()
        );
        return Ok(ExitCode::from(EXIT_RECORD_ERRORS));
    }
    println!("[DONE] {} ok, 0 errors", report.written.len());
    Ok(ExitCode::SUCCESS)
}

pub fn run_compute(args: ComputeArgs) -> Result<ExitCode> {
    let input = read_document(&args.input)?;
    let client = build_client(&args.service)?;
    let mut prompt = prompt_for(args.missing_policy, args.answers.as_deref())?;
    let output = client.compute(&input, args.missing_policy, prompt.as_mut())?;
    let text = serde_json::to_string_pretty(&output).context("serialize result")?;
    match &args.out {
        Some(path) => {
            fs::write(path, text + "\n").with_context(|| format!("write {}", path.display()))?;
            println!("wrote {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(ExitCode::SUCCESS)
}

pub fn run_preflight_only(args: PreflightArgs) -> Result<ExitCode> {
    let input = read_document(&args.input)?;
    let config = load_config(args.config.as_deref())?;
    let schemas = load_schemas(&config)?;
    let mut prompt = prompt_for(args.missing_policy, args.answers.as_deref())?;
    let preflight = run_preflight(&schemas, &input, args.missing_policy, prompt.as_mut())?;
    println!(
        "{}",
        serde_json::to_string_pretty(&preflight).context("serialize preflight")?
    );
    Ok(ExitCode::SUCCESS)
}

fn read_document(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))
}

fn load_schemas(config: &PipelineConfig) -> Result<SchemaSet> {
    SchemaSet::load(config.input_schema.as_deref(), config.output_schema.as_deref())
        .context("load schemas")
}

/// Resolve config (file, then env, then flags) and build the client once.
fn build_client(args: &ServiceArgs) -> Result<PayrollClient> {
    let mut config = load_config(args.config.as_deref())?;
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    validate_config(&config)?;

    let schemas = load_schemas(&config)?;
    let service: Box<dyn ComputationService> = match &args.response_file {
        Some(path) => Box::new(CannedService::from_file(path)?),
        None => Box::new(OpenAiService::from_env(&config.base_url, config.timeout())?),
    };
    tracing::debug!(model = %config.model, base_url = %config.base_url, "client ready");
    Ok(PayrollClient::new(schemas, service, config.model_settings()))
}

/// An answers file wins; otherwise `ask` prompts on the console and every
/// other policy never prompts.
fn prompt_for(policy: MissingPolicy, answers: Option<&Path>) -> Result<Box<dyn PromptProvider>> {
    if let Some(path) = answers {
        let scripted = ScriptedPrompt::from_file(path)
            .with_context(|| format!("read answers {}", path.display()))?;
        return Ok(Box::new(scripted));
    }
    let prompt: Box<dyn PromptProvider> = match policy {
        MissingPolicy::Ask => Box::new(ConsolePrompt),
        MissingPolicy::Default | MissingPolicy::Fail => Box::new(NonInteractivePrompt),
    };
    Ok(prompt)
}
