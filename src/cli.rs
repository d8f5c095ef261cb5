//! CLI argument parsing for the payroll pipeline.
use clap::{Args, Parser, Subcommand};
use payroll_pipeline::preflight::MissingPolicy;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "payroll",
    version,
    about = "Preflight and compute payroll documents through a structured-output model",
    after_help = "Examples:\n  payroll preflight --input doc.json --missing-policy default\n  payroll compute --input doc.json --out result.json\n  payroll batch --input records.jsonl --workers 4 --missing-policy default",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Log debug events to stderr (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Batch(BatchArgs),
    Compute(ComputeArgs),
    Preflight(PreflightArgs),
}

/// Settings shared by every command that talks to the model.
#[derive(Args, Debug, Clone)]
pub struct ServiceArgs {
    /// Pipeline config JSON (model, base_url, schemas, tuning)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Model name; overrides OPENAI_MODEL and the config file
    #[arg(long)]
    pub model: Option<String>,

    /// Replay a stored response instead of calling the API
    #[arg(long, value_name = "PATH")]
    pub response_file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
#[command(about = "Compute every record of a JSON Lines file")]
pub struct BatchArgs {
    /// JSON Lines file with one payroll document per line
    #[arg(long, value_name = "PATH")]
    pub input: PathBuf,

    /// Parallel workers
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    pub workers: u16,

    /// How to resolve missing fields
    #[arg(long, value_enum, default_value_t = MissingPolicy::Fail)]
    pub missing_policy: MissingPolicy,

    /// Directory for result files and errors.ndjson
    #[arg(long, value_name = "DIR", default_value = "outputs")]
    pub out_dir: PathBuf,

    /// Answers for `ask`, one per line, used instead of the console
    #[arg(long, value_name = "PATH")]
    pub answers: Option<PathBuf>,

    #[command(flatten)]
    pub service: ServiceArgs,
}

#[derive(Parser, Debug)]
#[command(about = "Compute a single payroll document")]
pub struct ComputeArgs {
    /// Payroll document JSON
    #[arg(long, value_name = "PATH")]
    pub input: PathBuf,

    /// Write the result here instead of stdout
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = MissingPolicy::Fail)]
    pub missing_policy: MissingPolicy,

    #[arg(long, value_name = "PATH")]
    pub answers: Option<PathBuf>,

    #[command(flatten)]
    pub service: ServiceArgs,
}

#[derive(Parser, Debug)]
#[command(about = "Validate and complete a document without calling the model")]
pub struct PreflightArgs {
    /// Payroll document JSON
    #[arg(long, value_name = "PATH")]
    pub input: PathBuf,

    #[arg(long, value_enum, default_value_t = MissingPolicy::Fail)]
    pub missing_policy: MissingPolicy,

    #[arg(long, value_name = "PATH")]
    pub answers: Option<PathBuf>,

    /// Pipeline config JSON; only the schema paths are used
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
