use super::CliError;
use anyhow::Context;
use atmospec_core::config::AnalysisSettings;
use atmospec_core::domain::{AtmospecError, ConformerEnsemble};
use atmospec_core::spectrum::BroadeningKernel;
use atmospec_core::units::EnergyUnit;
use std::fs;
use std::path::{Path, PathBuf};

/// Command-line overrides applied on top of a settings file.
#[derive(Debug, Clone, Default)]
pub(super) struct SettingsOverrides {
    pub(super) settings_path: Option<PathBuf>,
    pub(super) kernel: Option<BroadeningKernel>,
    pub(super) width_ev: Option<f64>,
    pub(super) unit: Option<EnergyUnit>,
    pub(super) identifier: Option<String>,
}

pub(super) fn read_text(path: &Path, what: &str) -> Result<String, CliError> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {what} '{}'", path.display()))?;
    Ok(text)
}

pub(super) fn load_ensemble(path: &Path) -> Result<ConformerEnsemble, CliError> {
    let source = read_text(path, "conformer records")?;
    let ensemble = ConformerEnsemble::from_json_str(&source)?;
    tracing::debug!(
        path = %path.display(),
        conformers = ensemble.len(),
        "loaded conformer records"
    );
    Ok(ensemble)
}

pub(super) fn load_settings(overrides: &SettingsOverrides) -> Result<AnalysisSettings, CliError> {
    let mut settings = match &overrides.settings_path {
        Some(path) => AnalysisSettings::from_path(path).map_err(AtmospecError::from)?,
        None => AnalysisSettings::default(),
    };

    if let Some(kernel) = overrides.kernel {
        settings.kernel = kernel;
    }
    if let Some(width_ev) = overrides.width_ev {
        settings.width_ev = width_ev;
    }
    if let Some(unit) = overrides.unit {
        settings.energy_unit = unit;
    }
    if let Some(identifier) = &overrides.identifier {
        settings.identifier = Some(identifier.clone());
    }
    settings.validate()?;
    Ok(settings)
}

pub(super) fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory '{}'", parent.display()))?;
    }
    let rendered = serde_json::to_string_pretty(value).context("failed to serialize JSON")?;
    fs::write(path, rendered)
        .with_context(|| format!("failed to write JSON output '{}'", path.display()))?;
    Ok(())
}
