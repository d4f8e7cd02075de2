//! Pipeline Behaviour Tests
//!
//! These tests verify:
//! - Fixed stage ordering
//! - Optional inputs add or remove exactly their own commands
//! - Standard vs custom pulse sequence branches
//! - Noise file gating

use possumgen::pipeline::{files, Stage, PULSE_FAMILY_SUFFIXES};
use possumgen::{generate, Invocation, ParameterStore, Pipeline};

fn store(pairs: &[(&str, &str)]) -> ParameterStore {
    pairs.iter().copied().collect()
}

fn base_pairs() -> Vec<(&'static str, &'static str)> {
    vec![
        ("out", "/sim/run1"),
        ("obvol", "/data/brain.nii.gz"),
        ("inNx", "64"),
        ("inNy", "64"),
        ("inNz", "30"),
        ("inNt", "1"),
        ("vcX", "3.0"),
        ("vcY", "3.0"),
        ("vcZ", "3.0"),
        ("outsize_nx", "64"),
        ("outsize_ny", "64"),
        ("outsize_nz", "30"),
        ("outsize_dx", "3.0"),
        ("outsize_dy", "3.0"),
        ("outsize_dz", "4.0"),
        ("slcsampfactor", "1"),
        ("slcselect", "z"),
    ]
}

fn full_pairs() -> Vec<(&'static str, &'static str)> {
    let mut pairs = base_pairs();
    pairs.extend([
        ("mrpar", "/data/MRpar_1.5T"),
        ("slcprof", "/data/slcprof"),
        ("mot", "/data/motion"),
        ("act1", "/data/T2.nii.gz"),
        ("act2", "/data/T2timecourse"),
        ("b0f", "/data/b0A_dA.nii.gz"),
    ]);
    pairs
}

fn build(pairs: &[(&str, &str)]) -> Pipeline {
    generate(&store(pairs)).expect("pipeline should build")
}

fn lines(p: &Pipeline) -> Vec<String> {
    p.render_lines()
}

// =============================================================================
// Concrete scenarios
// =============================================================================

#[test]
fn test_reference_volume_for_example_geometry() {
    let p = build(&base_pairs());
    let reference: Vec<&Invocation> = p.stage(Stage::ReferenceVolume).collect();
    assert_eq!(reference.len(), 1);
    assert_eq!(
        reference[0].render(),
        "/usr/local/fsl/bin/fslcreatehd 64 64 23 1 3.0 3.0 4.0 1 0 0 0 16 /sim/run1/brainref"
    );
}

#[test]
fn test_full_script_lines() {
    let p = build(&full_pairs());
    assert_eq!(
        lines(&p),
        vec![
            "mkdir -p /sim/run1",
            "/usr/local/fsl/bin/fslcreatehd 64 64 23 1 3.0 3.0 4.0 1 0 0 0 16 /sim/run1/brainref",
            "/usr/local/fsl/bin/flirt -in /data/brain.nii.gz -ref /sim/run1/brainref -applyxfm -out /sim/run1/brain",
            "cp /data/MRpar_1.5T /sim/run1/MRpar",
            "cp /data/slcprof /sim/run1/slcprof",
            "cp /data/motion /sim/run1/motion",
            "/usr/local/fsl/bin/flirt -in /data/T2.nii.gz -ref /sim/run1/brainref -applyxfm -out /sim/run1/T2",
            "cp /data/T2timecourse /sim/run1/T2timecourse",
            "/usr/local/fsl/bin/flirt -in /data/b0A_dA.nii.gz -ref /sim/run1/brainref -applyxfm -out /sim/run1/b0newref",
            "/usr/local/fsl/bin/fslroi /sim/run1/b0newref /sim/run1/b0z_dz.nii.gz 0 1",
            "/usr/local/fsl/bin/fslmaths /sim/run1/b0z_dz.nii.gz -mul 1.5 -div 1000000 /sim/run1/b0z_dz.nii.gz",
            "/usr/local/fsl/bin/pulse -i /sim/run1/brain -o /sim/run1/pulse --seq=epi --te=0.03 --tr=3 --trslc=0.12 --nx=64 --ny=64 --numslc=30 --dx=3.0 --dy=3.0 --slcthk=4.0 --numvol=1 --zstart=0 --bw=100000 --readdir=x+ --phasedir=y+ --slcdir=z+ --maxG=0.055 --riset=0.00022 -v >> /sim/run1/possum.log 2>&1",
            "/usr/local/fsl/bin/possumX /sim/run1 -n 1 -t 0 -s 10000 >> /sim/run1/possum.log 2>&1",
            "echo 'POSSUM setup file generated.' > /sim/run1/possum.fsf",
        ]
    );
}

#[test]
fn test_noise_flag_zero_writes_no_noise_file() {
    let mut pairs = base_pairs();
    pairs.extend([("noise_yn", "0"), ("noiseunits", "snr"), ("noisesnr", "20")]);
    let p = build(&pairs);
    assert_eq!(p.stage(Stage::Noise).count(), 0);
    let noise_target = format!("/sim/run1/{}", files::NOISE);
    assert!(lines(&p).iter().all(|l| !l.ends_with(&noise_target)));
}

#[test]
fn test_epi_includes_trslc_and_ge_does_not() {
    let mut epi = base_pairs();
    epi.push(("seqtype", "epi"));
    let p = build(&epi);
    let pulse = p.stage(Stage::PulseSequence).next().unwrap();
    assert!(pulse.render().contains("--trslc="));

    let mut ge = base_pairs();
    ge.push(("seqtype", "ge"));
    let p = build(&ge);
    let pulse = p.stage(Stage::PulseSequence).next().unwrap();
    assert!(!pulse.render().contains("--trslc="));
    assert!(pulse.has_arg("--seq=ge"));
}

#[test]
fn test_sequence_type_is_case_insensitive() {
    let mut pairs = base_pairs();
    pairs.push(("seqtype", "EPI"));
    let p = build(&pairs);
    let pulse: Vec<&Invocation> = p.stage(Stage::PulseSequence).collect();
    assert_eq!(pulse.len(), 1);
    assert!(pulse[0].has_arg("--seq=EPI"));
    assert!(pulse[0].has_arg_prefix("--trslc="));
}

// =============================================================================
// Optional inputs
// =============================================================================

#[test]
fn test_each_optional_input_removes_only_its_commands() {
    let full = lines(&build(&full_pairs()));

    let cases: [(&str, &[&str]); 6] = [
        ("mrpar", &["cp /data/MRpar_1.5T /sim/run1/MRpar"]),
        ("slcprof", &["cp /data/slcprof /sim/run1/slcprof"]),
        ("mot", &["cp /data/motion /sim/run1/motion"]),
        (
            "act1",
            &["/usr/local/fsl/bin/flirt -in /data/T2.nii.gz -ref /sim/run1/brainref -applyxfm -out /sim/run1/T2"],
        ),
        ("act2", &["cp /data/T2timecourse /sim/run1/T2timecourse"]),
        (
            "b0f",
            &[
                "/usr/local/fsl/bin/flirt -in /data/b0A_dA.nii.gz -ref /sim/run1/brainref -applyxfm -out /sim/run1/b0newref",
                "/usr/local/fsl/bin/fslroi /sim/run1/b0newref /sim/run1/b0z_dz.nii.gz 0 1",
                "/usr/local/fsl/bin/fslmaths /sim/run1/b0z_dz.nii.gz -mul 1.5 -div 1000000 /sim/run1/b0z_dz.nii.gz",
            ],
        ),
    ];

    for (key, removed) in cases {
        let pairs: Vec<_> = full_pairs().into_iter().filter(|(k, _)| *k != key).collect();
        let without = lines(&build(&pairs));
        let expected: Vec<String> = full
            .iter()
            .filter(|l| !removed.contains(&l.as_str()))
            .cloned()
            .collect();
        assert_eq!(without, expected, "removing {key}");
    }
}

#[test]
fn test_blank_optional_input_is_absent() {
    let mut pairs = base_pairs();
    pairs.extend([("mrpar", ""), ("mot", "   "), ("b0f", "")]);
    let p = build(&pairs);
    assert_eq!(p.stage(Stage::AuxiliaryCopy).count(), 0);
    assert_eq!(p.stage(Stage::FieldMap).count(), 0);
}

#[test]
fn test_activation_substeps_are_independent() {
    let mut only_timecourse = base_pairs();
    only_timecourse.push(("act2", "/data/tc"));
    let p = build(&only_timecourse);
    let act: Vec<String> = p.stage(Stage::Activation).map(Invocation::render).collect();
    assert_eq!(act, vec!["cp /data/tc /sim/run1/T2timecourse"]);

    let mut only_image = base_pairs();
    only_image.push(("act1", "/data/act.nii.gz"));
    let p = build(&only_image);
    let act: Vec<&Invocation> = p.stage(Stage::Activation).collect();
    assert_eq!(act.len(), 1);
    assert!(act[0].program.ends_with("/bin/flirt"));
}

// =============================================================================
// Pulse sequence branch
// =============================================================================

#[test]
fn test_custom_sequence_copies_seven_files() {
    let mut pairs = base_pairs();
    pairs.extend([("seqtype", "spiral"), ("cuspulse", "/seq/spiral")]);
    let p = build(&pairs);
    let copies: Vec<&Invocation> = p.stage(Stage::PulseSequence).collect();
    assert_eq!(copies.len(), PULSE_FAMILY_SUFFIXES.len());
    assert_eq!(copies.len(), 7);
    assert!(copies.iter().all(|c| c.program == "cp"));
    assert!(lines(&p).iter().all(|l| !l.contains("/bin/pulse ")));
}

#[test]
fn test_pulse_uses_custom_install_root() {
    let mut pairs = base_pairs();
    pairs.extend([("FSLDIR", "/opt/fsl"), ("POSSUMDIR", "/opt/possum")]);
    let p = build(&pairs);
    let pulse = p.stage(Stage::PulseSequence).next().unwrap();
    assert_eq!(pulse.program, "/opt/possum/bin/pulse");
    let reference = p.stage(Stage::ReferenceVolume).next().unwrap();
    assert_eq!(reference.program, "/opt/fsl/bin/fslcreatehd");
}

// =============================================================================
// Noise
// =============================================================================

#[test]
fn test_noise_snr_line() {
    let mut pairs = base_pairs();
    pairs.extend([("noise_yn", "1"), ("noiseunits", "SNR"), ("noisesnr", "30")]);
    let p = build(&pairs);
    let noise: Vec<String> = p.stage(Stage::Noise).map(Invocation::render).collect();
    assert_eq!(noise, vec!["echo \"snr 30\" > /sim/run1/noise"]);
}

#[test]
fn test_noise_sigma_line_for_other_units() {
    let mut pairs = base_pairs();
    pairs.extend([("noise_yn", "1"), ("noiseunits", "dB"), ("noisesigma", "0.2")]);
    let p = build(&pairs);
    let noise: Vec<String> = p.stage(Stage::Noise).map(Invocation::render).collect();
    assert_eq!(noise, vec!["echo \"sigma 0.2\" > /sim/run1/noise"]);
}

// =============================================================================
// Failure
// =============================================================================

#[test]
fn test_malformed_geometry_number_fails() {
    let mut pairs = base_pairs();
    pairs.push(("outsize_dz", "four"));
    // later entry wins when collected into the store
    let err = generate(&store(&pairs)).unwrap_err();
    assert!(err.to_string().contains("outsize_dz"));
}

#[test]
fn test_malformed_passthrough_value_is_not_checked() {
    let mut pairs = base_pairs();
    pairs.push(("te", "soon"));
    let p = build(&pairs);
    let pulse = p.stage(Stage::PulseSequence).next().unwrap();
    assert!(pulse.has_arg("--te=soon"));
}
