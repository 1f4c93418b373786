use super::CliError;
use super::helpers::{SettingsOverrides, load_ensemble, load_settings, read_text, write_json};
use atmospec_core::analysis::TransitionScatter;
use atmospec_core::domain::{AtmospecError, ConformerTrajectory};
use atmospec_core::ensemble::aggregate;
use atmospec_core::experimental::{InMemoryReferenceSpectra, find_experimental_spectrum};
use atmospec_core::export::{INTENSITY_UNIT, export_file_name, format_float, write_tsv};
use atmospec_core::photolysis::{
    ActinicFluxTable, FluxLevel, PhotolysisEngine, validate_quantum_yield,
};
use atmospec_core::spectrum::BroadeningKernel;
use atmospec_core::units::EnergyUnit;
use std::path::PathBuf;

#[derive(clap::Args)]
pub(super) struct BroadeningFlags {
    /// Analysis settings JSON (camelCase keys); flags override its values
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Broadening kernel: gaussian or lorentzian
    #[arg(long)]
    kernel: Option<BroadeningKernel>,

    /// Broadening width in eV
    #[arg(long)]
    width: Option<f64>,

    /// Display energy unit: eV, cm^-1 or nm
    #[arg(long)]
    unit: Option<EnergyUnit>,

    /// Molecular identifier (SMILES)
    #[arg(long)]
    identifier: Option<String>,
}

impl BroadeningFlags {
    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            settings_path: self.settings.clone(),
            kernel: self.kernel,
            width_ev: self.width,
            unit: self.unit,
            identifier: self.identifier.clone(),
        }
    }
}

#[derive(clap::Args)]
pub(super) struct SpectrumArgs {
    /// Conformer records JSON
    conformers: PathBuf,

    /// TSV output path (default: spectrum.tsv or spectrum_<identifier>.tsv)
    #[arg(long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    broadening: BroadeningFlags,
}

#[derive(clap::Args)]
pub(super) struct PhotolysisArgs {
    /// Conformer records JSON
    conformers: PathBuf,

    /// Actinic flux CSV (default: settings, then $ATMOSPEC_ACTINIC_FLUX)
    #[arg(long)]
    flux_table: Option<PathBuf>,

    /// Actinic flux level: low, medium or high
    #[arg(long)]
    flux_level: Option<FluxLevel>,

    /// Photolysis quantum yield in (0, 1]
    #[arg(long)]
    quantum_yield: Option<f64>,

    /// Print the differential rate on the flux grid
    #[arg(long)]
    table: bool,

    /// Write the full photolysis result as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    #[command(flatten)]
    broadening: BroadeningFlags,
}

#[derive(clap::Args)]
pub(super) struct TransitionsArgs {
    /// Conformer records JSON
    conformers: PathBuf,
}

#[derive(clap::Args)]
pub(super) struct ExperimentalArgs {
    /// Reference spectra JSON: [{"identifier", "x_array", "y_array"}]
    references: PathBuf,

    /// Molecular identifier (SMILES) to look up
    #[arg(long)]
    identifier: String,

    /// Display energy unit: eV, cm^-1 or nm
    #[arg(long, default_value = "nm")]
    unit: EnergyUnit,
}

#[derive(clap::Args)]
pub(super) struct StructuresArgs {
    /// Structure JSON: one {"symbols", "positions"} object or an array of them
    structures: PathBuf,

    /// Conformer records whose count must match the number of frames
    #[arg(long)]
    conformers: Option<PathBuf>,
}

pub(super) fn run_spectrum_command(args: SpectrumArgs) -> Result<i32, CliError> {
    let settings = load_settings(&args.broadening.overrides())?;
    let ensemble = load_ensemble(&args.conformers)?;
    let spectrum = aggregate(&ensemble, &settings.broadening_params())?;

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(export_file_name(settings.identifier.as_deref())));
    write_tsv(&output, &spectrum.total, settings.kernel, settings.width_ev)?;

    println!(
        "Spectrum written to {} ({} points, {} conformer{})",
        output.display(),
        spectrum.total.len(),
        ensemble.len(),
        if ensemble.len() == 1 { "" } else { "s" }
    );
    if let Some(peak) = spectrum.total.peak() {
        println!("Peak intensity: {} {INTENSITY_UNIT}", format_float(peak));
    }
    Ok(0)
}

pub(super) fn run_photolysis_command(args: PhotolysisArgs) -> Result<i32, CliError> {
    let mut settings = load_settings(&args.broadening.overrides())?;
    if let Some(level) = args.flux_level {
        settings.flux_level = level;
    }
    if let Some(quantum_yield) = args.quantum_yield {
        validate_quantum_yield(quantum_yield)?;
        settings.quantum_yield = quantum_yield;
    }
    if let Some(path) = args.flux_table {
        settings.actinic_flux_path = Some(path);
    }

    let ensemble = load_ensemble(&args.conformers)?;
    let spectrum = aggregate(&ensemble, &settings.broadening_params())?;
    let flux = ActinicFluxTable::global(&settings.resolve_actinic_flux_path())?;
    let result = PhotolysisEngine::new(flux).compute(
        &spectrum.cross_section_nm,
        settings.flux_level,
        settings.quantum_yield,
    )?;

    if args.table {
        println!("# Wavelength (nm)\tj (s^-1 nm^-1)\tj smoothed (s^-1 nm^-1)");
        for ((wavelength, raw), smoothed) in result
            .wavelengths
            .iter()
            .zip(&result.j_diff)
            .zip(&result.j_smoothed)
        {
            println!(
                "{}\t{}\t{}",
                format_float(*wavelength),
                format_float(*raw),
                format_float(*smoothed)
            );
        }
    }
    println!(
        "{}, quantum yield {}",
        result.flux_level.label(),
        format_float(result.quantum_yield)
    );
    println!("Photolysis rate constant: {} s^-1", result.formatted_rate());

    if let Some(path) = args.json {
        write_json(&path, &result)?;
        println!("JSON result: {}", path.display());
    }
    Ok(0)
}

pub(super) fn run_transitions_command(args: TransitionsArgs) -> Result<i32, CliError> {
    let ensemble = load_ensemble(&args.conformers)?;
    ensemble.validate()?;
    let scatter = TransitionScatter::from_ensemble(&ensemble);
    print!("{}", scatter.render_table());
    Ok(0)
}

pub(super) fn run_experimental_command(args: ExperimentalArgs) -> Result<i32, CliError> {
    let source = read_text(&args.references, "reference spectra")?;
    let references = InMemoryReferenceSpectra::from_json_str(&source)?;

    let Some(spectrum) = find_experimental_spectrum(&references, &args.identifier) else {
        println!("No experimental spectrum for '{}'", args.identifier);
        return Ok(1);
    };

    println!("# Energy ({})\tIntensity / {INTENSITY_UNIT}", args.unit);
    for (x, y) in spectrum
        .energies_in(args.unit)
        .iter()
        .zip(&spectrum.cross_section)
    {
        println!("{}\t{}", format_float(*x), format_float(*y));
    }
    Ok(0)
}

pub(super) fn run_structures_command(args: StructuresArgs) -> Result<i32, CliError> {
    let source = read_text(&args.structures, "conformer structures")?;
    let value: serde_json::Value = serde_json::from_str(&source).map_err(|error| {
        AtmospecError::input_validation(
            "INPUT.STRUCTURE_FORMAT",
            format!("failed to parse '{}': {error}", args.structures.display()),
        )
    })?;
    let trajectory = ConformerTrajectory::from_value(value)?;

    if let Some(path) = &args.conformers {
        let ensemble = load_ensemble(path)?;
        if ensemble.len() != trajectory.len() {
            return Err(CliError::Compute(AtmospecError::input_validation(
                "INPUT.STRUCTURE_COUNT",
                format!(
                    "{} structure frames for {} conformers",
                    trajectory.len(),
                    ensemble.len()
                ),
            )));
        }
    }

    for (index, frame) in trajectory.frames().iter().enumerate() {
        println!("Frame {index}: {} atoms", frame.atom_count());
    }
    Ok(0)
}
