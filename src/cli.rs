use clap::Parser;
use std::path::PathBuf;

/// possumgen - turn a POSSUM setup file into a runnable shell script
#[derive(Parser, Debug)]
#[command(name = "possumgen")]
#[command(about = "Convert a POSSUM FSF setup file into a shell script that runs the FSL/POSSUM simulation")]
#[command(version)]
pub struct Cli {
    /// FSF file written by the POSSUM GUI
    pub fsf_file: PathBuf,

    /// Shell script to create (overwritten if it exists)
    pub output_shell: PathBuf,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
