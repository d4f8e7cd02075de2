//! FSF setup-file reading.
//!
//! The POSSUM GUI saves its state as TCL assignments of the form
//!
//! ```text
//! set entries($w,KEY) "VALUE"
//! ```
//!
//! Only lines containing such an assignment contribute. Comments, headers and
//! any other TCL statements are skipped without complaint. Values are taken
//! literally: no escape processing is done inside the quotes.

use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

use crate::params::ParameterStore;

static ENTRY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"set entries\(\$w,([^)]*)\)\s+"([^"]*)""#).expect("Invalid regex pattern")
});

/// Extract the `(key, value)` assignment from a single line, if any.
pub fn parse_line(line: &str) -> Option<(&str, &str)> {
    let caps = ENTRY_PATTERN.captures(line)?;
    let key = caps.get(1)?.as_str().trim();
    let value = caps.get(2)?.as_str().trim();
    Some((key, value))
}

/// Parse FSF text into a parameter store.
pub fn parse_str(content: &str) -> ParameterStore {
    let mut store = ParameterStore::new();
    let mut ignored = 0usize;
    for line in content.lines() {
        match parse_line(line) {
            Some((key, value)) => store.insert(key, value),
            None => ignored += 1,
        }
    }
    debug!(
        "Parsed {} parameters ({} lines ignored)",
        store.len(),
        ignored
    );
    store
}

/// Read and parse an FSF file from disk.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<ParameterStore> {
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read FSF file {:?}", path.as_ref()))?;
    Ok(parse_str(&content))
}
