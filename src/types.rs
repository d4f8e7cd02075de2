//! Type-safe parameter categories.
//!
//! FSF values arrive as free text. The handful that steer pipeline decisions
//! are mapped onto these enums once, when the configuration is resolved, so
//! that the builder matches exhaustively instead of comparing strings.

use serde::Serialize;
use strum::{Display, EnumString};

/// Spatial axis of the simulated volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[derive(Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Axis {
    X,
    Y,
    #[default]
    Z,
}

impl Axis {
    /// Interpret a slice-selection value. Anything other than `x` or `y`
    /// (case-insensitive) selects the z axis.
    pub fn from_selection(value: &str) -> Self {
        value.trim().parse().unwrap_or(Axis::Z)
    }

    /// Position of this axis in an `[x, y, z]` triple.
    pub fn index(&self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Pulse sequences that `pulse` can generate itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[derive(Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StandardSequence {
    /// Echo-planar imaging; takes a per-slice repetition time.
    Epi,
    /// Gradient echo.
    Ge,
}

impl StandardSequence {
    /// Whether the `--trslc` argument applies to this sequence.
    pub fn uses_slice_tr(&self) -> bool {
        matches!(self, StandardSequence::Epi)
    }
}

/// How the pulse sequence is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SequenceKind {
    /// Generated by the `pulse` tool.
    Standard(StandardSequence),
    /// Supplied by the user as a family of pre-built pulse files.
    Custom,
}

impl SequenceKind {
    pub fn from_seqtype(value: &str) -> Self {
        match value.trim().parse::<StandardSequence>() {
            Ok(seq) => SequenceKind::Standard(seq),
            Err(_) => SequenceKind::Custom,
        }
    }
}

/// Units the B0 field map is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display)]
pub enum FieldUnits {
    /// Parts per million; scaled by field strength before simulation.
    #[default]
    #[strum(serialize = "ppm")]
    Ppm,
    /// Any other value. The extracted slice is used as-is.
    #[strum(serialize = "raw")]
    Raw,
}

impl FieldUnits {
    pub fn from_units(value: &str) -> Self {
        if value.eq_ignore_ascii_case("ppm") {
            FieldUnits::Ppm
        } else {
            FieldUnits::Raw
        }
    }
}

/// Which noise figure the `noise` file carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display)]
#[strum(serialize_all = "lowercase")]
pub enum NoiseUnits {
    Snr,
    #[default]
    Sigma,
}

impl NoiseUnits {
    /// `snr` (case-insensitive) selects SNR; everything else is sigma.
    pub fn from_units(value: &str) -> Self {
        if value.eq_ignore_ascii_case("snr") {
            NoiseUnits::Snr
        } else {
            NoiseUnits::Sigma
        }
    }
}
