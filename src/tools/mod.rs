//! Type-safe tool argument modules.
//!
//! One struct per external program invoked by the generated script. Each maps
//! its fields onto the exact arguments the program expects.

pub mod fsl;
pub mod possum;
pub mod shell;
