//! Typed arguments for the POSSUM programs.
//!
//! - `PulseArgs` for `pulse`, which builds a standard EPI/GE sequence
//! - `PossumXArgs` for `possumX`, which runs the simulation
//!
//! Both append stdout and stderr to the simulation log.

use crate::config::{InstallDirs, PulseParams};
use crate::invocation::{format_real, Arg, Redirect};
use crate::tool_traits::ToolArgs;

/// Slice start offset passed as `--zstart`.
pub const Z_START: &str = "0";

// ============================================================================
// pulse
// ============================================================================

#[derive(Debug, Clone)]
pub struct PulseArgs<'a> {
    /// Registered object volume (`-i`).
    pub object: String,
    /// Output pulse file base (`-o`).
    pub output: String,
    pub params: &'a PulseParams,
    /// Voxel size on the slice-selection axis of the reference volume.
    pub slice_thickness: f64,
    pub log: String,
}

impl ToolArgs for PulseArgs<'_> {
    fn program(&self, dirs: &InstallDirs) -> String {
        dirs.possum_bin("pulse")
    }

    fn to_cli_args(&self) -> Vec<Arg> {
        let p = self.params;
        let mut args: Vec<Arg> = vec![
            "-i".into(),
            self.object.as_str().into(),
            "-o".into(),
            self.output.as_str().into(),
            format!("--seq={}", p.seq_name).into(),
            format!("--te={}", p.te).into(),
            format!("--tr={}", p.tr).into(),
        ];
        if p.sequence.uses_slice_tr() {
            args.push(format!("--trslc={}", p.tr_slice).into());
        }
        let tail: [Arg; 15] = [
            format!("--nx={}", p.nx).into(),
            format!("--ny={}", p.ny).into(),
            format!("--numslc={}", p.num_slices).into(),
            format!("--dx={}", p.dx).into(),
            format!("--dy={}", p.dy).into(),
            format!("--slcthk={}", format_real(self.slice_thickness)).into(),
            format!("--numvol={}", p.num_volumes).into(),
            format!("--zstart={}", Z_START).into(),
            format!("--bw={}", p.bandwidth).into(),
            format!("--readdir={}{}", p.read_dir, p.polarity).into(),
            format!("--phasedir={}{}", p.phase_dir, p.polarity).into(),
            format!("--slcdir={}{}", p.slice_dir, p.polarity).into(),
            format!("--maxG={}", p.max_gradient).into(),
            format!("--riset={}", p.rise_time).into(),
            "-v".into(),
        ];
        args.extend(tail);
        args
    }

    fn redirect(&self) -> Option<Redirect> {
        Some(Redirect::AppendAll(self.log.clone()))
    }
}

// ============================================================================
// possumX
// ============================================================================

#[derive(Debug, Clone)]
pub struct PossumXArgs {
    pub sim_dir: String,
    pub num_procs: String,
    /// Processing-time budget (`-t`).
    pub proc_time: String,
    pub segments: String,
    pub log: String,
}

impl ToolArgs for PossumXArgs {
    fn program(&self, dirs: &InstallDirs) -> String {
        dirs.possum_bin("possumX")
    }

    fn to_cli_args(&self) -> Vec<Arg> {
        vec![
            self.sim_dir.as_str().into(),
            "-n".into(),
            self.num_procs.as_str().into(),
            "-t".into(),
            self.proc_time.as_str().into(),
            "-s".into(),
            self.segments.as_str().into(),
        ]
    }

    fn redirect(&self) -> Option<Redirect> {
        Some(Redirect::AppendAll(self.log.clone()))
    }
}
