//! Shared helpers for driving the `payroll` binary.

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Run the binary with the OpenAI environment cleared so no test can reach
/// the network or pick up a developer's model override.
pub fn run_payroll(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_payroll"))
        .args(args)
        .current_dir(cwd)
        .env_remove("OPENAI_API_KEY")
        .env_remove("OPENAI_MODEL")
        .env_remove("OPENAI_BASE_URL")
        .env_remove("RUST_LOG")
        .output()
        .expect("run payroll binary")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// A document with every field the preflight checks for.
pub fn complete_document(ccaa: &str, month: u32) -> Value {
    json!({
        "period": {"year": 2025, "month": month},
        "region_config": {"ccaa": ccaa},
        "company": {"name": "Acme SL", "cnae": "6201"},
        "tables": {"cotization_year": 2025, "irpf_year": 2025},
        "worker": {"nif": "12345678Z", "name": "Ana Ruiz"},
        "compensation": {"base_salary": 1800.0, "base_salary_cra_code": "C01"}
    })
}

pub fn write_lines(path: &Path, lines: &[String]) {
    let mut text = lines.join("\n");
    text.push('\n');
    fs::write(path, text).expect("write records");
}
