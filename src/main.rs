use clap::Parser;
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod workflow;

fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = cli::RootArgs::parse();
    init_tracing(args.verbose);

    let result = match args.command {
        cli::Command::Batch(args) => workflow::run_batch(args),
        cli::Command::Compute(args) => workflow::run_compute(args),
        cli::Command::Preflight(args) => workflow::run_preflight_only(args),
    };
    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins when set; otherwise warnings only, or debug with
/// `--verbose`.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
