use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const NEAR_UV_CONFORMERS: &str = r#"
[
  {
    "transitions": [
      { "energy": 3.8, "osc_strength": 0.02 },
      { "energy": 4.0, "osc_strength": 0.05 }
    ],
    "weight": 0.6,
    "nsample": 2
  },
  {
    "transitions": [
      { "energy": 3.9, "osc_strength": 0.03 }
    ],
    "weight": 0.4,
    "nsample": 2
  }
]
"#;

const FAR_UV_CONFORMERS: &str = r#"
[
  {
    "transitions": [{ "energy": 12.0, "osc_strength": 0.4 }],
    "weight": 1.0,
    "nsample": 1
  }
]
"#;

fn run_atmospec(temp: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_atmospec"))
        .current_dir(temp.path())
        .env_remove("ATMOSPEC_ACTINIC_FLUX")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("atmospec binary should run")
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("parent directory should be created");
    }
    fs::write(path, content).expect("file should be written");
}

fn write_flux_table(path: &Path) {
    let mut csv = String::from("index,source,wavelength,low,medium,high\n");
    for (index, wavelength) in (290..=750).enumerate() {
        csv.push_str(&format!("{index},synthetic,{wavelength},1e13,5e13,1e14\n"));
    }
    write_file(path, &csv);
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn spectrum_command_writes_named_tsv_export() {
    let temp = TempDir::new().expect("tempdir should be created");
    write_file(&temp.path().join("conformers.json"), NEAR_UV_CONFORMERS);

    let output = run_atmospec(
        &temp,
        &["spectrum", "conformers.json", "--identifier", "CC=O"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("500 points, 2 conformers"));

    let exported = fs::read_to_string(temp.path().join("spectrum_CC=O.tsv"))
        .expect("export should be named after the identifier");
    let mut lines = exported.lines();
    assert_eq!(
        lines.next(),
        Some("# Energy (eV)\tIntensity / cm² per molecule\tgaussian broadening, width = 0.05 eV")
    );
    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), 500);
    assert!(rows.iter().all(|row| row.split('\t').count() == 2));
}

#[test]
fn spectrum_command_applies_settings_file_and_flag_overrides() {
    let temp = TempDir::new().expect("tempdir should be created");
    write_file(&temp.path().join("conformers.json"), NEAR_UV_CONFORMERS);
    write_file(
        &temp.path().join("settings.json"),
        r#"{ "kernel": "lorentzian", "widthEv": 0.2, "energyUnit": "nm" }"#,
    );

    let output = run_atmospec(
        &temp,
        &[
            "spectrum",
            "conformers.json",
            "--settings",
            "settings.json",
            "--width",
            "0.1",
            "--output",
            "out/lorentz.tsv",
        ],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let exported =
        fs::read_to_string(temp.path().join("out/lorentz.tsv")).expect("export should exist");
    assert!(exported.starts_with(
        "# Energy (nm)\tIntensity / cm² per molecule\tlorentzian broadening, width = 0.1 eV\n"
    ));
}

#[test]
fn unknown_kernel_is_a_usage_error() {
    let temp = TempDir::new().expect("tempdir should be created");
    write_file(&temp.path().join("conformers.json"), NEAR_UV_CONFORMERS);

    let output = run_atmospec(
        &temp,
        &["spectrum", "conformers.json", "--kernel", "triangle"],
    );
    assert_eq!(output.status.code(), Some(2));
    let stderr = stderr(&output);
    assert!(stderr.contains("ERROR: [INPUT.CLI_USAGE]"), "stderr: {stderr}");
    assert!(stderr.contains("invalid broadening kernel 'triangle'"));
    assert!(stderr.contains("FATAL EXIT CODE: 2"));
}

#[test]
fn unknown_kernel_in_settings_file_is_an_input_error() {
    let temp = TempDir::new().expect("tempdir should be created");
    write_file(&temp.path().join("conformers.json"), NEAR_UV_CONFORMERS);
    write_file(&temp.path().join("settings.json"), r#"{"kernel":"voigt"}"#);

    let output = run_atmospec(
        &temp,
        &["spectrum", "conformers.json", "--settings", "settings.json"],
    );
    assert_eq!(output.status.code(), Some(2));
    let stderr = stderr(&output);
    assert!(stderr.contains("ERROR: [INPUT.SETTINGS]"), "stderr: {stderr}");
    assert_eq!(stderr.matches("unknown variant").count(), 1, "stderr: {stderr}");
    assert!(stderr.contains("FATAL EXIT CODE: 2"));
}

#[test]
fn empty_transitions_are_rejected() {
    let temp = TempDir::new().expect("tempdir should be created");
    write_file(
        &temp.path().join("conformers.json"),
        r#"[{ "transitions": [], "weight": 1.0, "nsample": 1 }]"#,
    );

    let output = run_atmospec(&temp, &["spectrum", "conformers.json"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("ERROR: [INPUT.EMPTY_TRANSITIONS]"));
    assert!(!temp.path().join("spectrum.tsv").exists());
}

#[test]
fn photolysis_command_reports_rate_and_json_result() {
    let temp = TempDir::new().expect("tempdir should be created");
    write_file(&temp.path().join("conformers.json"), NEAR_UV_CONFORMERS);
    write_flux_table(&temp.path().join("flux.csv"));

    let output = run_atmospec(
        &temp,
        &[
            "photolysis",
            "conformers.json",
            "--flux-table",
            "flux.csv",
            "--json",
            "result/high.json",
        ],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let stdout = stdout(&output);
    assert!(stdout.contains("High flux, quantum yield 1.0"));
    let rate_line = stdout
        .lines()
        .find(|line| line.starts_with("Photolysis rate constant: "))
        .expect("rate line should be printed");
    let rate = rate_line
        .trim_start_matches("Photolysis rate constant: ")
        .trim_end_matches(" s^-1");
    assert!(rate.contains('e'), "rate should be scientific: {rate}");

    let result: Value = serde_json::from_str(
        &fs::read_to_string(temp.path().join("result/high.json")).expect("json should exist"),
    )
    .expect("json should parse");
    assert_eq!(result["fluxLevel"], "high");
    assert_eq!(result["wavelengths"].as_array().map(Vec::len), Some(461));
    assert_eq!(result["jSmoothed"].as_array().map(Vec::len), Some(461));
    assert!(result["totalRate"].as_f64().expect("totalRate") > 0.0);
}

#[test]
fn photolysis_rate_scales_with_flux_level_and_quantum_yield() {
    let temp = TempDir::new().expect("tempdir should be created");
    write_file(&temp.path().join("conformers.json"), NEAR_UV_CONFORMERS);
    write_flux_table(&temp.path().join("flux.csv"));

    let rate_for = |extra: &[&str], json: &str| -> f64 {
        let mut args = vec![
            "photolysis",
            "conformers.json",
            "--flux-table",
            "flux.csv",
            "--json",
            json,
        ];
        args.extend_from_slice(extra);
        let output = run_atmospec(&temp, &args);
        assert!(output.status.success(), "stderr: {}", stderr(&output));
        let result: Value = serde_json::from_str(
            &fs::read_to_string(temp.path().join(json)).expect("json should exist"),
        )
        .expect("json should parse");
        result["totalRate"].as_f64().expect("totalRate")
    };

    let high = rate_for(&[], "high.json");
    let low = rate_for(&["--flux-level", "low"], "low.json");
    let half = rate_for(&["--quantum-yield", "0.5"], "half.json");

    assert!((low / high - 0.1).abs() < 1.0e-9);
    assert!((half / high - 0.5).abs() < 1.0e-9);
}

#[test]
fn photolysis_outside_actinic_range_fails_with_computation_error() {
    let temp = TempDir::new().expect("tempdir should be created");
    write_file(&temp.path().join("conformers.json"), FAR_UV_CONFORMERS);
    write_flux_table(&temp.path().join("flux.csv"));

    let output = run_atmospec(
        &temp,
        &["photolysis", "conformers.json", "--flux-table", "flux.csv"],
    );
    assert_eq!(output.status.code(), Some(4));
    let stderr = stderr(&output);
    assert!(stderr.contains("ERROR: [RUN.OUT_OF_ACTINIC_RANGE]"), "stderr: {stderr}");
    assert!(stderr.contains("Spectrum outside of actinic range"));
}

#[test]
fn photolysis_without_flux_table_is_an_io_error() {
    let temp = TempDir::new().expect("tempdir should be created");
    write_file(&temp.path().join("conformers.json"), NEAR_UV_CONFORMERS);

    let output = run_atmospec(
        &temp,
        &["photolysis", "conformers.json", "--flux-table", "missing.csv"],
    );
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("ERROR: [IO.FLUX_TABLE]"));
}

#[test]
fn quantum_yield_outside_unit_interval_is_rejected() {
    let temp = TempDir::new().expect("tempdir should be created");
    write_file(&temp.path().join("conformers.json"), NEAR_UV_CONFORMERS);
    write_flux_table(&temp.path().join("flux.csv"));

    let output = run_atmospec(
        &temp,
        &[
            "photolysis",
            "conformers.json",
            "--flux-table",
            "flux.csv",
            "--quantum-yield",
            "1.5",
        ],
    );
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("ERROR: [INPUT.QUANTUM_YIELD]"));
}

#[test]
fn transitions_command_prints_flattened_table() {
    let temp = TempDir::new().expect("tempdir should be created");
    write_file(&temp.path().join("conformers.json"), NEAR_UV_CONFORMERS);

    let output = run_atmospec(&temp, &["transitions", "conformers.json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let stdout = stdout(&output);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines[0],
        "# Excitation energy (eV)\tOscillator strength (-)\tConformer"
    );
    assert_eq!(&lines[1..], ["3.8\t0.02\t0", "4.0\t0.05\t0", "3.9\t0.03\t1"]);
}

#[test]
fn experimental_command_aligns_reference_spectrum() {
    let temp = TempDir::new().expect("tempdir should be created");
    write_file(
        &temp.path().join("references.json"),
        r#"
        [
          { "identifier": "O=O", "x_array": [200.0], "y_array": [1e-20] },
          { "identifier": "CC=O", "x_array": [247.96, 309.95], "y_array": [2e-20, 4e-20] },
          { "identifier": "C", "x_array": [200.0] }
        ]
        "#,
    );

    let found = run_atmospec(
        &temp,
        &["experimental", "references.json", "--identifier", "CC=O", "--unit", "eV"],
    );
    assert!(found.status.success(), "stderr: {}", stderr(&found));
    let stdout = stdout(&found);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "# Energy (eV)\tIntensity / cm² per molecule");
    assert_eq!(lines.len(), 3);
    let first_energy: f64 = lines[1]
        .split('\t')
        .next()
        .and_then(|field| field.parse().ok())
        .expect("energy should parse");
    assert!((first_energy - 5.0).abs() < 1.0e-3);

    let malformed = run_atmospec(
        &temp,
        &["experimental", "references.json", "--identifier", "C"],
    );
    assert_eq!(malformed.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&malformed.stdout).contains("No experimental spectrum for 'C'"));
}

#[test]
fn structures_command_accepts_trajectories_and_rejects_scalars() {
    let temp = TempDir::new().expect("tempdir should be created");
    write_file(&temp.path().join("conformers.json"), NEAR_UV_CONFORMERS);
    let water = r#"{ "symbols": ["O", "H", "H"], "positions": [[0, 0, 0], [0.96, 0, 0], [-0.24, 0.93, 0]] }"#;
    write_file(
        &temp.path().join("trajectory.json"),
        &format!("[{water}, {water}]"),
    );
    write_file(&temp.path().join("scalar.json"), "42");

    let output = run_atmospec(
        &temp,
        &["structures", "trajectory.json", "--conformers", "conformers.json"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "Frame 0: 3 atoms\nFrame 1: 3 atoms\n");

    let scalar = run_atmospec(&temp, &["structures", "scalar.json"]);
    assert_eq!(scalar.status.code(), Some(2));
    assert!(stderr(&scalar).contains("ERROR: [INPUT.STRUCTURE_TYPE]"));
}
