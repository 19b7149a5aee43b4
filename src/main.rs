use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use herald::consts::{DEFAULT_INTERPRETER, DEFAULT_SCRIPT};
use herald::query::Retriever;
use herald::runner::{ProcessRunner, RunError, RunnerConfig};

#[derive(Parser)]
#[command(name = "herald", version, about = "A messenger between you and your retrieval script.")]
struct Cli {
    /// Query text, passed to the script as a single argument
    query: String,

    /// Interpreter the script runs under
    #[arg(long, default_value = DEFAULT_INTERPRETER)]
    interpreter: String,

    /// Path to the retrieval script
    #[arg(long, default_value = DEFAULT_SCRIPT)]
    script: PathBuf,

    /// Kill the script after this many seconds (default: wait forever)
    #[arg(short, long)]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = RunnerConfig {
        timeout: cli.timeout.map(Duration::from_secs),
    };
    let runner = Arc::new(ProcessRunner::new(config));
    let retriever = Retriever::with_script(runner, cli.interpreter, cli.script);

    // Ctrl+C kills the child instead of leaving it orphaned
    tokio::select! {
        result = retriever.ask(&cli.query) => match result {
            Ok(answer) => println!("{answer}"),
            Err(error) => {
                if let RunError::NonZeroExit { stderr, .. } = &error {
                    if !stderr.is_empty() {
                        eprintln!("{stderr}");
                    }
                }
                return Err(error.into());
            }
        },
        _ = tokio::signal::ctrl_c() => {
            eprintln!("interrupted");
            std::process::exit(130);
        }
    }

    Ok(())
}
