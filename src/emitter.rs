//! Script emission.
//!
//! Writes the interpreter line followed by one rendered command per line,
//! in pipeline order. Commands are neither reordered nor merged.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::pipeline::Pipeline;

/// Interpreter directive and the blank line that follows it.
pub const PREAMBLE: &str = "#!/bin/sh\n\n";

/// Write the script text for `pipeline` to `writer`.
pub fn write_script<W: Write>(pipeline: &Pipeline, writer: &mut W) -> std::io::Result<()> {
    writer.write_all(PREAMBLE.as_bytes())?;
    for invocation in pipeline.invocations() {
        writeln!(writer, "{}", invocation.render())?;
    }
    Ok(())
}

/// Render the whole script to a string.
pub fn render_script(pipeline: &Pipeline) -> String {
    let mut out = String::from(PREAMBLE);
    for line in pipeline.render_lines() {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Create or overwrite `path` with the script and mark it executable.
pub fn write_to_file<P: AsRef<Path>>(pipeline: &Pipeline, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut file = fs::File::create(path)
        .with_context(|| format!("Failed to create script {:?}", path))?;
    write_script(pipeline, &mut file)
        .with_context(|| format!("Failed to write script {:?}", path))?;
    file.flush()
        .with_context(|| format!("Failed to flush script {:?}", path))?;
    drop(file);

    set_executable(path)?;
    info!("Wrote {} commands to {:?}", pipeline.len(), path);
    Ok(())
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("Failed to mark {:?} executable", path))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}
