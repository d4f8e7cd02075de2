//! possumgen - main entry point
//!
//! Converts a POSSUM FSF setup file into a shell script.

use possumgen::cli::Cli;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// Initialize the logger with appropriate settings
fn init_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logger();

    let cli = Cli::parse_args();
    debug!("CLI arguments parsed: {:?}", cli);

    match possumgen::convert_file(&cli.fsf_file, &cli.output_shell) {
        Ok(summary) => {
            info!(
                "{} parameters, {} commands {:?}",
                summary.parameters, summary.commands, summary.per_stage
            );
            println!("Shell script written to {}", cli.output_shell.display());
        }
        Err(e) => {
            error!("Conversion failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
