//! Type-safe tool argument contracts.
//!
//! Every external program the generated script calls has a struct in
//! [`crate::tools`] implementing [`ToolArgs`]. The struct fields are the only
//! inputs; the trait maps them onto the exact flags the program expects, so a
//! misspelt flag is a one-line fix in one place rather than a string hunt
//! through the builder.

use crate::config::InstallDirs;
use crate::invocation::{Arg, Redirect};

/// Trait for typed tool arguments.
///
/// # Contract
///
/// - `program()`: executable to run, resolved against the install roots for
///   FSL and POSSUM binaries or a bare name for shell utilities.
/// - `to_cli_args()`: arguments in the order the program expects them.
/// - `redirect()`: where output goes, if anywhere.
///
/// # Example
///
/// ```ignore
/// use possumgen::tools::fsl::FslRoiArgs;
///
/// let args = FslRoiArgs {
///     input: "sim/b0newref".into(),
///     output: "sim/b0z_dz.nii.gz".into(),
///     t_min: 0,
///     t_size: 1,
/// };
/// let cli_args = args.to_cli_args(); // ["sim/b0newref", "sim/b0z_dz.nii.gz", "0", "1"]
/// ```
pub trait ToolArgs {
    /// Executable path or name.
    fn program(&self, dirs: &InstallDirs) -> String;

    /// Convert struct fields to ordered arguments.
    fn to_cli_args(&self) -> Vec<Arg>;

    /// Output redirect. Most tools write their own files and need none.
    fn redirect(&self) -> Option<Redirect> {
        None
    }
}
