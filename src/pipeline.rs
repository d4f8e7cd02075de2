//! Pipeline assembly.
//!
//! Turns a [`SimulationConfig`] into the ordered list of commands the
//! generated script runs. Stages are fixed and always visited in the same
//! order; each one decides from the configuration alone whether it emits
//! anything. Nothing here depends on the outcome of an earlier command, so
//! the result is a pure function of the configuration.
//!
//! Order matters: the output directory must exist before anything writes into
//! it, and the reference volume must exist before anything is registered
//! against it.

use serde::Serialize;
use strum::{Display, EnumIter};
use tracing::{debug, info};

use crate::config::{PulseSource, SimulationConfig};
use crate::error::Result;
use crate::geometry::{self, GeometryResult};
use crate::invocation::{Arg, Invocation};
use crate::tool_traits::ToolArgs;
use crate::tools::fsl::{FlirtArgs, FslCreateHdArgs, FslMathsArgs, FslRoiArgs, DATATYPE_INT16};
use crate::tools::possum::{PossumXArgs, PulseArgs};
use crate::tools::shell::{CopyArgs, EchoArgs, MkdirArgs};
use crate::types::{FieldUnits, NoiseUnits};

/// Fixed file names inside the simulation directory.
pub mod files {
    pub const BRAIN_REF: &str = "brainref";
    pub const BRAIN: &str = "brain";
    pub const MR_PARAMS: &str = "MRpar";
    pub const SLICE_PROFILE: &str = "slcprof";
    pub const MOTION: &str = "motion";
    pub const ACTIVATION: &str = "T2";
    pub const ACTIVATION_TIMECOURSE: &str = "T2timecourse";
    pub const B0_REGISTERED: &str = "b0newref";
    pub const B0_SLICE: &str = "b0z_dz.nii.gz";
    pub const PULSE: &str = "pulse";
    pub const NOISE: &str = "noise";
    pub const LOG: &str = "possum.log";
    pub const SETUP: &str = "possum.fsf";
}

/// Suffixes making up a custom pulse file family, base file first.
pub const PULSE_FAMILY_SUFFIXES: [&str; 7] =
    ["", ".info", ".readme", ".posx", ".posy", ".posz", ".com"];

/// Divisor converting a ppm field map to absolute units.
pub const PPM_DIVISOR: u32 = 1_000_000;

pub const SETUP_MARKER: &str = "POSSUM setup file generated.";

/// Pipeline stages in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    Setup,
    ReferenceVolume,
    PrimaryRegistration,
    AuxiliaryCopy,
    Activation,
    FieldMap,
    PulseSequence,
    Noise,
    Finalization,
}

/// A command tagged with the stage that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedCommand {
    pub stage: Stage,
    pub invocation: Invocation,
}

/// The ordered command sequence for one simulation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Pipeline {
    commands: Vec<PlannedCommand>,
}

impl Pipeline {
    pub fn commands(&self) -> &[PlannedCommand] {
        &self.commands
    }

    pub fn invocations(&self) -> impl Iterator<Item = &Invocation> {
        self.commands.iter().map(|c| &c.invocation)
    }

    /// Commands emitted by `stage`, in order.
    pub fn stage(&self, stage: Stage) -> impl Iterator<Item = &Invocation> {
        self.commands
            .iter()
            .filter(move |c| c.stage == stage)
            .map(|c| &c.invocation)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Render every command as a shell line.
    pub fn render_lines(&self) -> Vec<String> {
        self.invocations().map(Invocation::render).collect()
    }
}

/// Resolve geometry and build the pipeline for `config`.
pub fn build(config: &SimulationConfig) -> Result<Pipeline> {
    let geometry = geometry::resolve(&config.geometry)?;
    debug!(
        "Reference geometry: dims={:?} pixdims={:?} axis={}",
        geometry.dims, geometry.pixdims, geometry.slice_axis
    );
    Ok(PipelineBuilder::new(config, geometry).build())
}

/// Straight-line builder visiting each stage once.
pub struct PipelineBuilder<'a> {
    config: &'a SimulationConfig,
    geometry: GeometryResult,
    commands: Vec<PlannedCommand>,
}

impl<'a> PipelineBuilder<'a> {
    pub fn new(config: &'a SimulationConfig, geometry: GeometryResult) -> Self {
        Self {
            config,
            geometry,
            commands: Vec::new(),
        }
    }

    pub fn build(mut self) -> Pipeline {
        self.setup();
        self.reference_volume();
        self.primary_registration();
        self.auxiliary_copies();
        self.activation();
        self.field_map();
        self.pulse_sequence();
        self.noise();
        self.finalization();

        info!("Planned {} commands", self.commands.len());
        Pipeline {
            commands: self.commands,
        }
    }

    fn out(&self, name: &str) -> String {
        format!("{}/{}", self.config.out_dir, name)
    }

    fn push<T: ToolArgs>(&mut self, stage: Stage, tool: &T) {
        let invocation = Invocation::from_tool(tool, &self.config.dirs);
        debug!("[{}] {}", stage, invocation);
        self.commands.push(PlannedCommand { stage, invocation });
    }

    fn copy_into(&mut self, stage: Stage, source: &str, dest_name: &str) {
        let tool = CopyArgs {
            source: source.to_string(),
            dest: self.out(dest_name),
        };
        self.push(stage, &tool);
    }

    fn register(&mut self, stage: Stage, input: &str, dest_name: &str) {
        let tool = FlirtArgs {
            input: input.to_string(),
            reference: self.out(files::BRAIN_REF),
            output: self.out(dest_name),
        };
        self.push(stage, &tool);
    }

    fn setup(&mut self) {
        let tool = MkdirArgs {
            path: self.config.out_dir.clone(),
        };
        self.push(Stage::Setup, &tool);
    }

    fn reference_volume(&mut self) {
        let tool = FslCreateHdArgs {
            dims: self.geometry.dims,
            volumes: self.geometry.temporal_extent,
            pixdims: self.geometry.pixdims,
            pixdim4: self.geometry.pixdim4.clone(),
            origin: [0, 0, 0],
            datatype: DATATYPE_INT16,
            output: self.out(files::BRAIN_REF),
        };
        self.push(Stage::ReferenceVolume, &tool);
    }

    fn primary_registration(&mut self) {
        let config = self.config;
        let object = &config.inputs.object;
        self.register(Stage::PrimaryRegistration, object, files::BRAIN);
    }

    fn auxiliary_copies(&mut self) {
        let config = self.config;
        let inputs = &config.inputs;
        let copies = [
            (&inputs.mr_params, files::MR_PARAMS),
            (&inputs.slice_profile, files::SLICE_PROFILE),
            (&inputs.motion, files::MOTION),
        ];
        for (source, dest) in copies {
            match source {
                Some(path) => self.copy_into(Stage::AuxiliaryCopy, path, dest),
                None => debug!("No input for {}, skipping copy", dest),
            }
        }
    }

    fn activation(&mut self) {
        let config = self.config;
        let inputs = &config.inputs;
        if let Some(path) = &inputs.activation_image {
            self.register(Stage::Activation, path, files::ACTIVATION);
        }
        if let Some(path) = &inputs.activation_timecourse {
            self.copy_into(Stage::Activation, path, files::ACTIVATION_TIMECOURSE);
        }
    }

    fn field_map(&mut self) {
        let config = self.config;
        let Some(field) = &config.field_map else {
            return;
        };

        self.register(Stage::FieldMap, &field.path, files::B0_REGISTERED);

        let slice = self.out(files::B0_SLICE);
        let roi = FslRoiArgs {
            input: self.out(files::B0_REGISTERED),
            output: slice.clone(),
            t_min: 0,
            t_size: 1,
        };
        self.push(Stage::FieldMap, &roi);

        match field.units {
            FieldUnits::Ppm => {
                let maths = FslMathsArgs {
                    input: slice.clone(),
                    multiplier: field.field_strength.clone(),
                    divisor: PPM_DIVISOR,
                    output: slice,
                };
                self.push(Stage::FieldMap, &maths);
            }
            FieldUnits::Raw => debug!("Field map not in ppm, leaving values unscaled"),
        }
    }

    fn pulse_sequence(&mut self) {
        let config = self.config;
        match &config.pulse {
            PulseSource::Standard(params) => {
                let tool = PulseArgs {
                    object: self.out(files::BRAIN),
                    output: self.out(files::PULSE),
                    params,
                    slice_thickness: self.geometry.slice_thickness(),
                    log: self.out(files::LOG),
                };
                self.push(Stage::PulseSequence, &tool);
            }
            PulseSource::Custom { base: Some(base) } => {
                for suffix in PULSE_FAMILY_SUFFIXES {
                    let source = format!("{}{}", base, suffix);
                    let dest = format!("{}{}", files::PULSE, suffix);
                    self.copy_into(Stage::PulseSequence, &source, &dest);
                }
            }
            PulseSource::Custom { base: None } => {
                debug!("Custom sequence without a pulse file, nothing to copy");
            }
        }
    }

    fn noise(&mut self) {
        let config = self.config;
        let Some(noise) = &config.noise else {
            return;
        };
        let line = match noise.units {
            NoiseUnits::Snr => format!("snr {}", noise.value),
            NoiseUnits::Sigma => format!("sigma {}", noise.value),
        };
        let tool = EchoArgs {
            text: Arg::DoubleQuoted(line),
            target: self.out(files::NOISE),
        };
        self.push(Stage::Noise, &tool);
    }

    fn finalization(&mut self) {
        let config = self.config;
        let exec = &config.execution;
        let run = PossumXArgs {
            sim_dir: config.out_dir.clone(),
            num_procs: exec.num_procs.clone(),
            proc_time: exec.proc_time.clone(),
            segments: exec.segments.clone(),
            log: self.out(files::LOG),
        };
        self.push(Stage::Finalization, &run);

        let marker = EchoArgs {
            text: Arg::SingleQuoted(SETUP_MARKER.to_string()),
            target: self.out(files::SETUP),
        };
        self.push(Stage::Finalization, &marker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParameterStore;
    use strum::IntoEnumIterator;

    fn pipeline(pairs: &[(&str, &str)]) -> Pipeline {
        let store: ParameterStore = pairs.iter().copied().collect();
        let config = SimulationConfig::from_store(&store).unwrap();
        build(&config).unwrap()
    }

    #[test]
    fn test_minimal_pipeline_stage_order() {
        let p = pipeline(&[("out", "sim"), ("obvol", "/data/brain.nii.gz")]);
        let stages: Vec<Stage> = p.commands().iter().map(|c| c.stage).collect();
        assert_eq!(
            stages,
            vec![
                Stage::Setup,
                Stage::ReferenceVolume,
                Stage::PrimaryRegistration,
                Stage::PulseSequence,
                Stage::Finalization,
                Stage::Finalization,
            ]
        );
    }

    #[test]
    fn test_full_pipeline_follows_stage_declaration_order() {
        let p = pipeline(&[
            ("mrpar", "m"),
            ("slcprof", "s"),
            ("mot", "mo"),
            ("act1", "a1"),
            ("act2", "a2"),
            ("b0f", "b0"),
            ("noise_yn", "1"),
        ]);
        let order: Vec<Stage> = Stage::iter().collect();
        let positions: Vec<usize> = p
            .commands()
            .iter()
            .map(|c| order.iter().position(|s| *s == c.stage).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] <= w[1]));
        for stage in Stage::iter() {
            assert!(p.stage(stage).count() > 0, "{stage} emitted nothing");
        }
    }

    #[test]
    fn test_field_map_ppm_scales_slice() {
        let p = pipeline(&[("out", "sim"), ("b0f", "/data/b0.nii.gz"), ("b0fieldstrength", "3")]);
        let lines: Vec<String> = p.stage(Stage::FieldMap).map(Invocation::render).collect();
        assert_eq!(
            lines,
            vec![
                "/usr/local/fsl/bin/flirt -in /data/b0.nii.gz -ref sim/brainref -applyxfm -out sim/b0newref",
                "/usr/local/fsl/bin/fslroi sim/b0newref sim/b0z_dz.nii.gz 0 1",
                "/usr/local/fsl/bin/fslmaths sim/b0z_dz.nii.gz -mul 3 -div 1000000 sim/b0z_dz.nii.gz",
            ]
        );
    }

    #[test]
    fn test_field_map_raw_units_skip_scaling() {
        let p = pipeline(&[("b0f", "/data/b0.nii.gz"), ("b0units", "rad/s")]);
        assert_eq!(p.stage(Stage::FieldMap).count(), 2);
    }

    #[test]
    fn test_custom_pulse_family() {
        let p = pipeline(&[
            ("out", "sim"),
            ("seqtype", "custom"),
            ("cuspulse", "/seq/mypulse"),
        ]);
        let lines: Vec<String> = p.stage(Stage::PulseSequence).map(Invocation::render).collect();
        assert_eq!(
            lines,
            vec![
                "cp /seq/mypulse sim/pulse",
                "cp /seq/mypulse.info sim/pulse.info",
                "cp /seq/mypulse.readme sim/pulse.readme",
                "cp /seq/mypulse.posx sim/pulse.posx",
                "cp /seq/mypulse.posy sim/pulse.posy",
                "cp /seq/mypulse.posz sim/pulse.posz",
                "cp /seq/mypulse.com sim/pulse.com",
            ]
        );
    }

    #[test]
    fn test_custom_without_base_emits_nothing() {
        let p = pipeline(&[("seqtype", "custom")]);
        assert_eq!(p.stage(Stage::PulseSequence).count(), 0);
    }

    #[test]
    fn test_slice_thickness_follows_selected_axis() {
        let p = pipeline(&[
            ("inNx", "64"),
            ("vcX", "3.0"),
            ("outsize_dx", "2.0"),
            ("slcselect", "x"),
        ]);
        let pulse = p.stage(Stage::PulseSequence).next().unwrap();
        assert!(pulse.has_arg("--slcthk=2.0"));
        assert!(pulse.has_arg("--slcdir=x+"));
        assert!(pulse.has_arg("--dx=2.0"));
    }

    #[test]
    fn test_finalization_lines() {
        let p = pipeline(&[("out", "sim"), ("numproc", "8"), ("proctime", "120")]);
        let lines: Vec<String> = p.stage(Stage::Finalization).map(Invocation::render).collect();
        assert_eq!(
            lines,
            vec![
                "/usr/local/fsl/bin/possumX sim -n 8 -t 120 -s 10000 >> sim/possum.log 2>&1",
                "echo 'POSSUM setup file generated.' > sim/possum.fsf",
            ]
        );
    }
}
