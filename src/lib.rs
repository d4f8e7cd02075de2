//! possumgen library
//!
//! Reads a POSSUM FSF setup file and produces the shell script that prepares
//! the simulation directory and runs `possumX`. Data flows one way:
//! [`fsf`] → [`params::ParameterStore`] → [`config::SimulationConfig`] →
//! [`geometry`] → [`pipeline`] → [`emitter`].

pub mod cli;
pub mod config;
pub mod emitter;
pub mod error;
pub mod fsf;
pub mod geometry;
pub mod invocation;
pub mod params;
pub mod pipeline;
pub mod tool_traits;
pub mod tools;
pub mod types;

use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

pub use config::SimulationConfig;
pub use error::PossumGenError;
pub use geometry::{GeometryInputs, GeometryResult};
pub use invocation::{Arg, Invocation, Redirect};
pub use params::ParameterStore;
pub use pipeline::{Pipeline, PipelineBuilder, Stage};
pub use tool_traits::ToolArgs;

/// What a conversion produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    pub parameters: usize,
    pub commands: usize,
    /// Number of commands per stage name.
    pub per_stage: BTreeMap<String, usize>,
}

/// Build the pipeline for already-parsed parameters.
pub fn generate(store: &ParameterStore) -> Result<Pipeline> {
    let config = SimulationConfig::from_store(store)?;
    Ok(pipeline::build(&config)?)
}

/// Convert `input` (FSF) into the shell script at `output`.
pub fn convert_file(input: &Path, output: &Path) -> Result<ConversionSummary> {
    info!("Reading FSF file {:?}", input);
    let store = fsf::load_from_file(input)?;
    let pipeline = generate(&store)?;
    emitter::write_to_file(&pipeline, output)?;

    let mut per_stage = BTreeMap::new();
    for command in pipeline.commands() {
        *per_stage.entry(command.stage.to_string()).or_insert(0) += 1;
    }
    Ok(ConversionSummary {
        parameters: store.len(),
        commands: pipeline.len(),
        per_stage,
    })
}
