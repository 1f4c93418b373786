//! Recompute-on-change state for one molecule.
//!
//! Each setter recomputes the derived spectrum and photolysis results from
//! scratch. A failed recompute leaves the previously computed state intact,
//! so the next valid change recovers normal operation.

use crate::config::AnalysisSettings;
use crate::domain::{ComputeResult, ConformerEnsemble};
use crate::ensemble::{EnsembleSpectrum, aggregate};
use crate::photolysis::{
    ActinicFluxTable, FluxLevel, PhotolysisEngine, PhotolysisResult, validate_quantum_yield,
};
use crate::spectrum::BroadeningKernel;
use crate::units::EnergyUnit;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PhotolysisState {
    #[default]
    Empty,
    /// The spectrum does not overlap the actinic flux wavelengths.
    OutOfRange,
    Ready(PhotolysisResult),
}

impl PhotolysisState {
    pub fn result(&self) -> Option<&PhotolysisResult> {
        match self {
            Self::Ready(result) => Some(result),
            Self::Empty | Self::OutOfRange => None,
        }
    }
}

pub struct AnalysisSession<'a> {
    settings: AnalysisSettings,
    flux: Option<&'a ActinicFluxTable>,
    ensemble: Option<ConformerEnsemble>,
    spectrum: Option<EnsembleSpectrum>,
    photolysis: PhotolysisState,
}

impl<'a> AnalysisSession<'a> {
    pub fn new(settings: AnalysisSettings, flux: Option<&'a ActinicFluxTable>) -> Self {
        Self {
            settings,
            flux,
            ensemble: None,
            spectrum: None,
            photolysis: PhotolysisState::Empty,
        }
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    pub fn spectrum(&self) -> Option<&EnsembleSpectrum> {
        self.spectrum.as_ref()
    }

    pub fn photolysis(&self) -> &PhotolysisState {
        &self.photolysis
    }

    /// Conformer decomposition is only meaningful for two or more conformers.
    pub fn can_decompose(&self) -> bool {
        self.spectrum
            .as_ref()
            .is_some_and(EnsembleSpectrum::can_decompose)
    }

    pub fn set_conformers(&mut self, ensemble: ConformerEnsemble) -> ComputeResult<()> {
        let spectrum = aggregate(&ensemble, &self.settings.broadening_params())?;
        self.ensemble = Some(ensemble);
        self.install_spectrum(spectrum)
    }

    pub fn set_kernel(&mut self, kernel: BroadeningKernel) -> ComputeResult<()> {
        self.update_settings(|settings| settings.kernel = kernel)
    }

    pub fn set_width(&mut self, width_ev: f64) -> ComputeResult<()> {
        self.update_settings(|settings| settings.width_ev = width_ev)
    }

    pub fn set_energy_unit(&mut self, unit: EnergyUnit) -> ComputeResult<()> {
        self.update_settings(|settings| settings.energy_unit = unit)
    }

    pub fn set_flux_level(&mut self, level: FluxLevel) -> ComputeResult<()> {
        let previous = self.settings.flux_level;
        self.settings.flux_level = level;
        self.recompute_photolysis().inspect_err(|_| {
            self.settings.flux_level = previous;
        })
    }

    pub fn set_quantum_yield(&mut self, quantum_yield: f64) -> ComputeResult<()> {
        validate_quantum_yield(quantum_yield)?;
        let previous = self.settings.quantum_yield;
        self.settings.quantum_yield = quantum_yield;
        self.recompute_photolysis().inspect_err(|_| {
            self.settings.quantum_yield = previous;
        })
    }

    pub fn reset(&mut self) {
        self.ensemble = None;
        self.spectrum = None;
        self.photolysis = PhotolysisState::Empty;
        self.settings.flux_level = FluxLevel::default();
        self.settings.quantum_yield = AnalysisSettings::default().quantum_yield;
    }

    fn update_settings(&mut self, change: impl FnOnce(&mut AnalysisSettings)) -> ComputeResult<()> {
        let mut candidate = self.settings.clone();
        change(&mut candidate);
        candidate.broadening_params().validate()?;

        let Some(ensemble) = self.ensemble.as_ref() else {
            self.settings = candidate;
            return Ok(());
        };
        let spectrum = aggregate(ensemble, &candidate.broadening_params())?;
        self.settings = candidate;
        self.install_spectrum(spectrum)
    }

    fn install_spectrum(&mut self, spectrum: EnsembleSpectrum) -> ComputeResult<()> {
        self.spectrum = Some(spectrum);
        self.recompute_photolysis()
    }

    fn recompute_photolysis(&mut self) -> ComputeResult<()> {
        let (Some(flux), Some(spectrum)) = (self.flux, self.spectrum.as_ref()) else {
            self.photolysis = PhotolysisState::Empty;
            return Ok(());
        };

        let engine = PhotolysisEngine::new(flux);
        if let Err(error) = engine.check_overlap(&spectrum.cross_section_nm) {
            tracing::warn!(%error, "photolysis skipped");
            self.photolysis = PhotolysisState::OutOfRange;
            return Ok(());
        }
        let result = engine.compute(
            &spectrum.cross_section_nm,
            self.settings.flux_level,
            self.settings.quantum_yield,
        )?;
        self.photolysis = PhotolysisState::Ready(result);
        Ok(())
    }
}
