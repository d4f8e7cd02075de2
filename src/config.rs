//! Typed simulation configuration.
//!
//! Every FSF key the pipeline reads, and its default, is declared in [`keys`]
//! and resolved here exactly once. Optional inputs become `Option`s so the
//! pipeline builder never performs truthiness checks on raw strings, and
//! numeric values needed for geometry are converted up front. A malformed
//! number therefore aborts before any script is written.

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{PossumGenError, Result};
use crate::geometry::GeometryInputs;
use crate::params::ParameterStore;
use crate::types::{Axis, FieldUnits, NoiseUnits, SequenceKind, StandardSequence};

/// FSF key names and their defaults.
pub mod keys {
    pub const FSLDIR: &str = "FSLDIR";
    pub const POSSUMDIR: &str = "POSSUMDIR";
    pub const OUT: &str = "out";

    pub const OBVOL: &str = "obvol";
    pub const MRPAR: &str = "mrpar";
    pub const SLCPROF: &str = "slcprof";
    pub const MOT: &str = "mot";
    pub const ACT1: &str = "act1";
    pub const ACT2: &str = "act2";
    pub const B0F: &str = "b0f";
    pub const B0UNITS: &str = "b0units";
    pub const B0FIELDSTRENGTH: &str = "b0fieldstrength";

    pub const IN_NX: &str = "inNx";
    pub const IN_NY: &str = "inNy";
    pub const IN_NZ: &str = "inNz";
    pub const IN_NT: &str = "inNt";
    pub const VC_X: &str = "vcX";
    pub const VC_Y: &str = "vcY";
    pub const VC_Z: &str = "vcZ";
    pub const OUTSIZE_NX: &str = "outsize_nx";
    pub const OUTSIZE_NY: &str = "outsize_ny";
    pub const OUTSIZE_NZ: &str = "outsize_nz";
    pub const OUTSIZE_DX: &str = "outsize_dx";
    pub const OUTSIZE_DY: &str = "outsize_dy";
    pub const OUTSIZE_DZ: &str = "outsize_dz";
    pub const SLCSAMPFACTOR: &str = "slcsampfactor";
    pub const SLCSELECT: &str = "slcselect";

    pub const SEQTYPE: &str = "seqtype";
    pub const TE: &str = "te";
    pub const TR: &str = "tr";
    pub const TRSLC: &str = "trslc";
    pub const NUMVOL: &str = "numvol";
    pub const BW: &str = "bw";
    pub const READGRAD: &str = "readgrad";
    pub const PHENCODE: &str = "phencode";
    pub const PLUS: &str = "plus";
    pub const MAXG: &str = "maxG";
    pub const RISET: &str = "riseT";
    pub const CUSPULSE: &str = "cuspulse";

    pub const NOISE_YN: &str = "noise_yn";
    pub const NOISEUNITS: &str = "noiseunits";
    pub const NOISESNR: &str = "noisesnr";
    pub const NOISESIGMA: &str = "noisesigma";

    pub const NUMPROC: &str = "numproc";
    pub const PROCTIME: &str = "proctime";
    pub const SEGS: &str = "segs";
}

/// Defaults applied when a key is absent.
pub mod defaults {
    pub const FSLDIR: &str = "/usr/local/fsl";
    pub const OUT: &str = "./simdir";

    pub const B0UNITS: &str = "ppm";
    pub const B0FIELDSTRENGTH: &str = "1.5";

    pub const IN_DIM: &str = "0";
    pub const IN_NT: &str = "1";
    pub const VOXEL_SIZE: &str = "1";
    pub const GEOMETRY_OUTSIZE_D: &str = "1";
    pub const SLCSAMPFACTOR: &str = "1";
    pub const SLCSELECT: &str = "z";

    pub const SEQTYPE: &str = "epi";
    pub const TE: &str = "0.03";
    pub const TR: &str = "3";
    pub const TRSLC: &str = "0.12";
    pub const NUMVOL: &str = "1";
    pub const BW: &str = "100000";
    pub const READGRAD: &str = "x";
    pub const PHENCODE: &str = "y";
    pub const PLUS: &str = "+";
    pub const MAXG: &str = "0.055";
    pub const RISET: &str = "0.00022";
    pub const PULSE_NX: &str = "64";
    pub const PULSE_NY: &str = "64";
    pub const PULSE_NUMSLC: &str = "1";
    pub const PULSE_DX: &str = "4.0";
    pub const PULSE_DY: &str = "4.0";

    pub const NOISE_YN: &str = "0";
    pub const NOISEUNITS: &str = "sigma";
    pub const NOISESNR: &str = "10";
    pub const NOISESIGMA: &str = "0";

    pub const NUMPROC: &str = "1";
    pub const PROCTIME: &str = "0";
    pub const SEGS: &str = "10000";
}

/// Installation roots of the external toolkits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallDirs {
    pub fsl_dir: String,
    pub possum_dir: String,
}

impl InstallDirs {
    /// Path of an FSL binary, e.g. `<FSLDIR>/bin/flirt`.
    pub fn fsl_bin(&self, tool: &str) -> String {
        format!("{}/bin/{}", self.fsl_dir, tool)
    }

    /// Path of a POSSUM binary, e.g. `<POSSUMDIR>/bin/possumX`.
    pub fn possum_bin(&self, tool: &str) -> String {
        format!("{}/bin/{}", self.possum_dir, tool)
    }
}

/// Input files copied or registered into the simulation directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputFiles {
    /// Primary object volume. Always registered, even when blank.
    pub object: String,
    pub mr_params: Option<String>,
    pub slice_profile: Option<String>,
    pub motion: Option<String>,
    pub activation_image: Option<String>,
    pub activation_timecourse: Option<String>,
}

/// B0 inhomogeneity input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMap {
    pub path: String,
    pub units: FieldUnits,
    /// Main field strength in tesla, passed verbatim to `fslmaths -mul`.
    pub field_strength: String,
}

/// Arguments for a `pulse`-generated sequence. All values are passed through
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PulseParams {
    pub sequence: StandardSequence,
    /// `seqtype` as written, for `--seq=`.
    pub seq_name: String,
    pub te: String,
    pub tr: String,
    pub tr_slice: String,
    pub nx: String,
    pub ny: String,
    pub num_slices: String,
    pub dx: String,
    pub dy: String,
    pub num_volumes: String,
    pub bandwidth: String,
    pub read_dir: String,
    pub phase_dir: String,
    pub slice_dir: String,
    pub polarity: String,
    pub max_gradient: String,
    pub rise_time: String,
}

/// Where the pulse sequence comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PulseSource {
    Standard(PulseParams),
    /// User-supplied pulse file family. `None` when no base path was given.
    Custom { base: Option<String> },
}

/// Noise file contents, present only when noise is enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoiseConfig {
    pub units: NoiseUnits,
    pub value: String,
}

/// `possumX` execution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionSettings {
    pub num_procs: String,
    pub proc_time: String,
    pub segments: String,
}

/// Fully resolved configuration for one pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationConfig {
    pub dirs: InstallDirs,
    pub out_dir: String,
    pub inputs: InputFiles,
    pub field_map: Option<FieldMap>,
    pub geometry: GeometryInputs,
    pub pulse: PulseSource,
    pub noise: Option<NoiseConfig>,
    pub execution: ExecutionSettings,
}

impl SimulationConfig {
    /// Resolve every parameter the pipeline needs from `store`.
    pub fn from_store(store: &ParameterStore) -> Result<Self> {
        let fsl_dir = store.get(keys::FSLDIR, defaults::FSLDIR).to_string();
        let possum_dir = store.get(keys::POSSUMDIR, &fsl_dir).to_string();

        let config = Self {
            dirs: InstallDirs {
                fsl_dir,
                possum_dir,
            },
            out_dir: store.get(keys::OUT, defaults::OUT).to_string(),
            inputs: resolve_inputs(store),
            field_map: resolve_field_map(store),
            geometry: resolve_geometry(store)?,
            pulse: resolve_pulse(store),
            noise: resolve_noise(store),
            execution: ExecutionSettings {
                num_procs: owned(store, keys::NUMPROC, defaults::NUMPROC),
                proc_time: owned(store, keys::PROCTIME, defaults::PROCTIME),
                segments: owned(store, keys::SEGS, defaults::SEGS),
            },
        };

        if let Ok(json) = serde_json::to_string(&config) {
            debug!("Resolved configuration: {}", json);
        }
        Ok(config)
    }
}

fn owned(store: &ParameterStore, key: &str, default: &str) -> String {
    store.get(key, default).to_string()
}

fn optional(store: &ParameterStore, key: &str) -> Option<String> {
    store.optional(key).map(str::to_string)
}

fn resolve_inputs(store: &ParameterStore) -> InputFiles {
    InputFiles {
        object: owned(store, keys::OBVOL, ""),
        mr_params: optional(store, keys::MRPAR),
        slice_profile: optional(store, keys::SLCPROF),
        motion: optional(store, keys::MOT),
        activation_image: optional(store, keys::ACT1),
        activation_timecourse: optional(store, keys::ACT2),
    }
}

fn resolve_field_map(store: &ParameterStore) -> Option<FieldMap> {
    let path = optional(store, keys::B0F)?;
    Some(FieldMap {
        path,
        units: FieldUnits::from_units(store.get(keys::B0UNITS, defaults::B0UNITS)),
        field_strength: owned(store, keys::B0FIELDSTRENGTH, defaults::B0FIELDSTRENGTH),
    })
}

fn resolve_geometry(store: &ParameterStore) -> Result<GeometryInputs> {
    let selection = store.get(keys::SLCSELECT, defaults::SLCSELECT);
    let slice_axis = Axis::from_selection(selection);
    if !["x", "y", "z"].contains(&selection.to_ascii_lowercase().as_str()) {
        warn!(
            "Unrecognised slice selection {:?}, using the {} axis",
            selection, slice_axis
        );
    }

    let pixdim4 = store.get(keys::IN_NT, defaults::IN_NT);
    let dims = [
        parse_count(store, keys::IN_NX, defaults::IN_DIM)?,
        parse_count(store, keys::IN_NY, defaults::IN_DIM)?,
        parse_count(store, keys::IN_NZ, defaults::IN_DIM)?,
    ];
    // Output sizes default to the input grid; `pulse` still gets the raw text.
    let output_dims = [
        parse_count(store, keys::OUTSIZE_NX, &dims[0].to_string())?,
        parse_count(store, keys::OUTSIZE_NY, &dims[1].to_string())?,
        parse_count(store, keys::OUTSIZE_NZ, &dims[2].to_string())?,
    ];
    Ok(GeometryInputs {
        dims,
        temporal_extent: parse_count(store, keys::IN_NT, defaults::IN_NT)?,
        pixdim4: pixdim4.to_string(),
        voxel_sizes: [
            parse_real(store, keys::VC_X, defaults::VOXEL_SIZE)?,
            parse_real(store, keys::VC_Y, defaults::VOXEL_SIZE)?,
            parse_real(store, keys::VC_Z, defaults::VOXEL_SIZE)?,
        ],
        output_dims,
        output_voxel_sizes: [
            parse_real(store, keys::OUTSIZE_DX, defaults::GEOMETRY_OUTSIZE_D)?,
            parse_real(store, keys::OUTSIZE_DY, defaults::GEOMETRY_OUTSIZE_D)?,
            parse_real(store, keys::OUTSIZE_DZ, defaults::GEOMETRY_OUTSIZE_D)?,
        ],
        sampling_factor: parse_real(store, keys::SLCSAMPFACTOR, defaults::SLCSAMPFACTOR)?,
        slice_axis,
    })
}

fn resolve_pulse(store: &ParameterStore) -> PulseSource {
    let seq_name = store.get(keys::SEQTYPE, defaults::SEQTYPE);
    match SequenceKind::from_seqtype(seq_name) {
        SequenceKind::Standard(sequence) => PulseSource::Standard(PulseParams {
            sequence,
            seq_name: seq_name.to_string(),
            te: owned(store, keys::TE, defaults::TE),
            tr: owned(store, keys::TR, defaults::TR),
            tr_slice: owned(store, keys::TRSLC, defaults::TRSLC),
            nx: owned(store, keys::OUTSIZE_NX, defaults::PULSE_NX),
            ny: owned(store, keys::OUTSIZE_NY, defaults::PULSE_NY),
            num_slices: owned(store, keys::OUTSIZE_NZ, defaults::PULSE_NUMSLC),
            dx: owned(store, keys::OUTSIZE_DX, defaults::PULSE_DX),
            dy: owned(store, keys::OUTSIZE_DY, defaults::PULSE_DY),
            num_volumes: owned(store, keys::NUMVOL, defaults::NUMVOL),
            bandwidth: owned(store, keys::BW, defaults::BW),
            read_dir: owned(store, keys::READGRAD, defaults::READGRAD),
            phase_dir: owned(store, keys::PHENCODE, defaults::PHENCODE),
            slice_dir: owned(store, keys::SLCSELECT, defaults::SLCSELECT),
            polarity: owned(store, keys::PLUS, defaults::PLUS),
            max_gradient: owned(store, keys::MAXG, defaults::MAXG),
            rise_time: owned(store, keys::RISET, defaults::RISET),
        }),
        SequenceKind::Custom => PulseSource::Custom {
            base: optional(store, keys::CUSPULSE),
        },
    }
}

fn resolve_noise(store: &ParameterStore) -> Option<NoiseConfig> {
    if store.get(keys::NOISE_YN, defaults::NOISE_YN) != "1" {
        return None;
    }
    let units = NoiseUnits::from_units(store.get(keys::NOISEUNITS, defaults::NOISEUNITS));
    let value = match units {
        NoiseUnits::Snr => owned(store, keys::NOISESNR, defaults::NOISESNR),
        NoiseUnits::Sigma => owned(store, keys::NOISESIGMA, defaults::NOISESIGMA),
    };
    Some(NoiseConfig { units, value })
}

fn parse_real(store: &ParameterStore, key: &str, default: &str) -> Result<f64> {
    let raw = store.get(key, default);
    raw.trim()
        .parse::<f64>()
        .map_err(|_| PossumGenError::value_conversion(key, raw, "real number"))
}

/// Parse a non-negative whole number. Integral reals such as `64.0` are
/// accepted since the GUI sometimes writes dimensions that way.
fn parse_count(store: &ParameterStore, key: &str, default: &str) -> Result<u32> {
    let raw = store.get(key, default);
    let text = raw.trim();
    if let Ok(n) = text.parse::<u32>() {
        return Ok(n);
    }
    match text.parse::<f64>() {
        Ok(v) if v.fract() == 0.0 && v >= 0.0 && v <= f64::from(u32::MAX) => Ok(v as u32),
        _ => Err(PossumGenError::value_conversion(
            key,
            raw,
            "non-negative integer",
        )),
    }
}
