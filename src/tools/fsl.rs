//! Typed arguments for the FSL image tools.
//!
//! - `FslCreateHdArgs` for `fslcreatehd`
//! - `FlirtArgs` for `flirt -applyxfm`
//! - `FslRoiArgs` for `fslroi`
//! - `FslMathsArgs` for `fslmaths -mul -div`

use crate::config::InstallDirs;
use crate::invocation::{format_real, Arg};
use crate::tool_traits::ToolArgs;

/// NIfTI datatype code for signed 16-bit integers.
pub const DATATYPE_INT16: u32 = 16;

// ============================================================================
// fslcreatehd
// ============================================================================

/// Create an empty image header with the given grid.
///
/// Argument order: `x y z t xsize ysize zsize tr xorig yorig zorig datatype out`.
#[derive(Debug, Clone)]
pub struct FslCreateHdArgs {
    pub dims: [u32; 3],
    pub volumes: u32,
    pub pixdims: [f64; 3],
    /// Fourth voxel size, passed through verbatim.
    pub pixdim4: String,
    pub origin: [i32; 3],
    pub datatype: u32,
    pub output: String,
}

impl ToolArgs for FslCreateHdArgs {
    fn program(&self, dirs: &InstallDirs) -> String {
        dirs.fsl_bin("fslcreatehd")
    }

    fn to_cli_args(&self) -> Vec<Arg> {
        let mut args: Vec<Arg> = self.dims.iter().map(|d| Arg::from(d.to_string())).collect();
        args.push(self.volumes.to_string().into());
        args.extend(self.pixdims.iter().map(|p| Arg::from(format_real(*p))));
        args.push(self.pixdim4.as_str().into());
        args.extend(self.origin.iter().map(|o| Arg::from(o.to_string())));
        args.push(self.datatype.to_string().into());
        args.push(self.output.as_str().into());
        args
    }
}

// ============================================================================
// flirt
// ============================================================================

/// Resample `input` onto the grid of `reference` with an identity transform.
#[derive(Debug, Clone)]
pub struct FlirtArgs {
    pub input: String,
    pub reference: String,
    pub output: String,
}

impl ToolArgs for FlirtArgs {
    fn program(&self, dirs: &InstallDirs) -> String {
        dirs.fsl_bin("flirt")
    }

    fn to_cli_args(&self) -> Vec<Arg> {
        vec![
            "-in".into(),
            self.input.as_str().into(),
            "-ref".into(),
            self.reference.as_str().into(),
            "-applyxfm".into(),
            "-out".into(),
            self.output.as_str().into(),
        ]
    }
}

// ============================================================================
// fslroi
// ============================================================================

/// Extract `t_size` volumes starting at `t_min`.
#[derive(Debug, Clone)]
pub struct FslRoiArgs {
    pub input: String,
    pub output: String,
    pub t_min: u32,
    pub t_size: u32,
}

impl ToolArgs for FslRoiArgs {
    fn program(&self, dirs: &InstallDirs) -> String {
        dirs.fsl_bin("fslroi")
    }

    fn to_cli_args(&self) -> Vec<Arg> {
        vec![
            self.input.as_str().into(),
            self.output.as_str().into(),
            self.t_min.to_string().into(),
            self.t_size.to_string().into(),
        ]
    }
}

// ============================================================================
// fslmaths
// ============================================================================

/// `fslmaths <input> -mul <multiplier> -div <divisor> <output>`
#[derive(Debug, Clone)]
pub struct FslMathsArgs {
    pub input: String,
    pub multiplier: String,
    pub divisor: u32,
    pub output: String,
}

impl ToolArgs for FslMathsArgs {
    fn program(&self, dirs: &InstallDirs) -> String {
        dirs.fsl_bin("fslmaths")
    }

    fn to_cli_args(&self) -> Vec<Arg> {
        vec![
            self.input.as_str().into(),
            "-mul".into(),
            self.multiplier.as_str().into(),
            "-div".into(),
            self.divisor.to_string().into(),
            self.output.as_str().into(),
        ]
    }
}
