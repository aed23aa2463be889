use chainrouter::cli::run_cli;
use chainrouter::logging::{init_logging, LogFormat};

fn main() -> anyhow::Result<()> {
    init_logging(LogFormat::from_env())?;
    run_cli()
}
