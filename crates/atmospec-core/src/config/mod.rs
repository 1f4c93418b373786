//! Analysis settings shared by the command-line front end and library
//! callers.
//!
//! Settings are read from a camelCase JSON document; every field is optional
//! and falls back to the defaults of the interactive application.

use crate::domain::{AtmospecError, ComputeResult};
use crate::photolysis::{FluxLevel, validate_quantum_yield};
use crate::spectrum::{BroadeningKernel, BroadeningParams};
use crate::units::EnergyUnit;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_WIDTH_EV: f64 = 0.05;
pub const DEFAULT_QUANTUM_YIELD: f64 = 1.0;
/// Environment variable naming the actinic flux table when no path is configured.
pub const ACTINIC_FLUX_ENV: &str = "ATMOSPEC_ACTINIC_FLUX";
pub const DEFAULT_ACTINIC_FLUX_PATH: &str = "data/StandardActinicFluxes2.csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisSettings {
    pub kernel: BroadeningKernel,
    pub width_ev: f64,
    pub energy_unit: EnergyUnit,
    pub flux_level: FluxLevel,
    pub quantum_yield: f64,
    pub actinic_flux_path: Option<PathBuf>,
    /// Molecular identifier (SMILES) used for reference lookups and export names.
    pub identifier: Option<String>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            kernel: BroadeningKernel::Gaussian,
            width_ev: DEFAULT_WIDTH_EV,
            energy_unit: EnergyUnit::Ev,
            flux_level: FluxLevel::High,
            quantum_yield: DEFAULT_QUANTUM_YIELD,
            actinic_flux_path: None,
            identifier: None,
        }
    }
}

impl AnalysisSettings {
    pub fn from_path(path: &Path) -> Result<Self, AnalysisSettingsError> {
        let source = fs::read_to_string(path).map_err(|source| AnalysisSettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&source).map_err(|source| AnalysisSettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn broadening_params(&self) -> BroadeningParams {
        BroadeningParams::new(self.kernel, self.width_ev, self.energy_unit)
    }

    pub fn validate(&self) -> ComputeResult<()> {
        self.broadening_params().validate()?;
        validate_quantum_yield(self.quantum_yield)
    }

    /// Configured flux table path, then `$ATMOSPEC_ACTINIC_FLUX`, then the
    /// bundled default location.
    pub fn resolve_actinic_flux_path(&self) -> PathBuf {
        self.actinic_flux_path
            .clone()
            .or_else(|| std::env::var_os(ACTINIC_FLUX_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ACTINIC_FLUX_PATH))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisSettingsError {
    #[error("failed to read analysis settings '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse analysis settings '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl From<AnalysisSettingsError> for AtmospecError {
    fn from(error: AnalysisSettingsError) -> Self {
        match &error {
            AnalysisSettingsError::Read { .. } => {
                AtmospecError::io_system("IO.SETTINGS", error.to_string())
            }
            AnalysisSettingsError::Parse { .. } => {
                AtmospecError::input_validation("INPUT.SETTINGS", error.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AnalysisSettings, AnalysisSettingsError};
    use crate::domain::AtmospecError;
    use crate::photolysis::FluxLevel;
    use crate::spectrum::BroadeningKernel;
    use crate::units::EnergyUnit;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_interactive_application() {
        let settings = AnalysisSettings::default();
        assert_eq!(settings.kernel, BroadeningKernel::Gaussian);
        assert_eq!(settings.width_ev, 0.05);
        assert_eq!(settings.energy_unit, EnergyUnit::Ev);
        assert_eq!(settings.flux_level, FluxLevel::High);
        assert_eq!(settings.quantum_yield, 1.0);
        settings.validate().expect("defaults are valid");
    }

    #[test]
    fn partial_json_overrides_only_given_fields() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("settings.json");
        fs::write(
            &path,
            r#"{ "kernel": "lorentzian", "energyUnit": "cm^-1", "fluxLevel": "low",
                 "actinicFluxPath": "fluxes.csv" }"#,
        )
        .expect("settings should be written");

        let settings = AnalysisSettings::from_path(&path).expect("settings should load");
        assert_eq!(settings.kernel, BroadeningKernel::Lorentzian);
        assert_eq!(settings.energy_unit, EnergyUnit::Cm);
        assert_eq!(settings.flux_level, FluxLevel::Low);
        assert_eq!(settings.width_ev, 0.05);
        assert_eq!(
            settings.resolve_actinic_flux_path(),
            PathBuf::from("fluxes.csv")
        );
    }

    #[test]
    fn read_and_parse_failures_are_distinguished() {
        let temp = TempDir::new().expect("tempdir should be created");
        let missing = AnalysisSettings::from_path(&temp.path().join("missing.json"))
            .expect_err("missing file should fail");
        assert!(matches!(missing, AnalysisSettingsError::Read { .. }));

        let path = temp.path().join("broken.json");
        fs::write(&path, r#"{ "kernel": "voigt" }"#).expect("settings should be written");
        let broken = AnalysisSettings::from_path(&path).expect_err("unknown kernel should fail");
        assert!(matches!(broken, AnalysisSettingsError::Parse { .. }));
        assert!(broken.to_string().contains("broken.json"));
    }

    #[test]
    fn invalid_numbers_fail_validation() {
        let settings = AnalysisSettings {
            quantum_yield: 0.0,
            ..AnalysisSettings::default()
        };
        assert_eq!(
            settings.validate().expect_err("zero yield").placeholder(),
            "INPUT.QUANTUM_YIELD"
        );

        let settings = AnalysisSettings {
            width_ev: -0.1,
            ..AnalysisSettings::default()
        };
        assert_eq!(
            settings.validate().expect_err("negative width").placeholder(),
            "INPUT.BROADENING_WIDTH"
        );
    }

    #[test]
    fn settings_errors_map_to_error_categories() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("settings.json");
        fs::write(&path, r#"{ "kernel": "voigt" }"#).expect("settings should be written");

        let error = AtmospecError::from(
            AnalysisSettings::from_path(&path).expect_err("unknown kernel"),
        );
        assert_eq!(error.placeholder(), "INPUT.SETTINGS");
        assert_eq!(error.exit_code(), 2);
        assert_eq!(error.message().matches("unknown variant").count(), 1);

        let error = AtmospecError::from(
            AnalysisSettings::from_path(&temp.path().join("missing.json"))
                .expect_err("missing file"),
        );
        assert_eq!(error.placeholder(), "IO.SETTINGS");
        assert_eq!(error.exit_code(), 3);
    }
}
