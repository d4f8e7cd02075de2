//! Typed arguments for plain shell utilities: `mkdir`, `cp` and `echo`.

use crate::config::InstallDirs;
use crate::invocation::{Arg, Redirect};
use crate::tool_traits::ToolArgs;

/// `mkdir -p <path>`
#[derive(Debug, Clone)]
pub struct MkdirArgs {
    pub path: String,
}

impl ToolArgs for MkdirArgs {
    fn program(&self, _dirs: &InstallDirs) -> String {
        "mkdir".to_string()
    }

    fn to_cli_args(&self) -> Vec<Arg> {
        vec!["-p".into(), self.path.as_str().into()]
    }
}

/// `cp <source> <dest>`
#[derive(Debug, Clone)]
pub struct CopyArgs {
    pub source: String,
    pub dest: String,
}

impl ToolArgs for CopyArgs {
    fn program(&self, _dirs: &InstallDirs) -> String {
        "cp".to_string()
    }

    fn to_cli_args(&self) -> Vec<Arg> {
        vec![self.source.as_str().into(), self.dest.as_str().into()]
    }
}

/// `echo <text> > <target>`: writes one line, replacing the target.
#[derive(Debug, Clone)]
pub struct EchoArgs {
    /// Already quoted as it should appear.
    pub text: Arg,
    pub target: String,
}

impl ToolArgs for EchoArgs {
    fn program(&self, _dirs: &InstallDirs) -> String {
        "echo".to_string()
    }

    fn to_cli_args(&self) -> Vec<Arg> {
        vec![self.text.clone()]
    }

    fn redirect(&self) -> Option<Redirect> {
        Some(Redirect::Overwrite(self.target.clone()))
    }
}
