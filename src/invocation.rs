//! Structured command descriptors.
//!
//! The pipeline builder produces [`Invocation`]s: a program, an ordered
//! argument list and an optional output redirect. They are turned into shell
//! text only by [`Invocation::render`], which is the single place where
//! quoting is decided. Values are inserted verbatim; paths containing spaces
//! or shell metacharacters are not escaped.

use std::fmt;

use serde::Serialize;

use crate::config::InstallDirs;
use crate::tool_traits::ToolArgs;

/// A single command-line argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Arg {
    /// Inserted as-is.
    Word(String),
    /// Wrapped in double quotes.
    DoubleQuoted(String),
    /// Wrapped in single quotes.
    SingleQuoted(String),
}

impl Arg {
    /// The argument text without any quoting.
    pub fn value(&self) -> &str {
        match self {
            Arg::Word(s) | Arg::DoubleQuoted(s) | Arg::SingleQuoted(s) => s,
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Word(s) => write!(f, "{}", s),
            Arg::DoubleQuoted(s) => write!(f, "\"{}\"", s),
            Arg::SingleQuoted(s) => write!(f, "'{}'", s),
        }
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::Word(s)
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Word(s.to_string())
    }
}

/// Where a command's output goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Redirect {
    /// `> target`: stdout replaces the file.
    Overwrite(String),
    /// `>> target 2>&1`: stdout and stderr are appended to a log.
    AppendAll(String),
}

impl Redirect {
    pub fn target(&self) -> &str {
        match self {
            Redirect::Overwrite(t) | Redirect::AppendAll(t) => t,
        }
    }
}

impl fmt::Display for Redirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Redirect::Overwrite(t) => write!(f, "> {}", t),
            Redirect::AppendAll(t) => write!(f, ">> {} 2>&1", t),
        }
    }
}

/// One command of the generated script. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<Arg>,
    pub redirect: Option<Redirect>,
}

impl Invocation {
    /// Build an invocation from typed tool arguments.
    pub fn from_tool<T: ToolArgs>(tool: &T, dirs: &InstallDirs) -> Self {
        Self {
            program: tool.program(dirs),
            args: tool.to_cli_args(),
            redirect: tool.redirect(),
        }
    }

    /// Whether any argument equals `value` (ignoring quoting).
    pub fn has_arg(&self, value: &str) -> bool {
        self.args.iter().any(|a| a.value() == value)
    }

    /// Whether any argument starts with `prefix`, e.g. `--trslc=`.
    pub fn has_arg_prefix(&self, prefix: &str) -> bool {
        self.args.iter().any(|a| a.value().starts_with(prefix))
    }

    /// Render as a single shell line.
    pub fn render(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string());
        }
        if let Some(redirect) = &self.redirect {
            line.push(' ');
            line.push_str(&redirect.to_string());
        }
        line
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Format a computed real in shortest round-trip form, keeping a fractional
/// digit for whole numbers (`4.0`, not `4`). Exponents carry a sign and at
/// least two digits (`1e-05`, `1.5e+16`).
pub fn format_real(value: f64) -> String {
    let text = format!("{:?}", value);
    match text.split_once('e') {
        Some((mantissa, exp)) => match exp.parse::<i32>() {
            Ok(e) => {
                let sign = if e < 0 { '-' } else { '+' };
                format!("{}e{}{:02}", mantissa, sign, e.unsigned_abs())
            }
            Err(_) => text,
        },
        None => text,
    }
}
