//! Boltzmann-weighted ensemble spectrum and the nanometer hand-off to the
//! photolysis stage.

use crate::domain::{AtmospecError, ComputeResult, ConformerEnsemble};
use crate::spectrum::{BroadenedSpectrum, BroadeningParams, EnergyWindow, Spectrum};
use crate::units::{EnergyUnit, array_from_ev, ascending_wavelengths};
use serde::{Deserialize, Serialize};

/// Cross section indexed by ascending wavelength in nm.
///
/// Always holds at least two points on a finite, strictly ascending grid;
/// deserialization goes through the same checks as [`Self::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CrossSectionRecord")]
pub struct CrossSectionByWavelength {
    wavelengths: Vec<f64>,
    cross_section: Vec<f64>,
}

#[derive(Deserialize)]
struct CrossSectionRecord {
    wavelengths: Vec<f64>,
    cross_section: Vec<f64>,
}

impl TryFrom<CrossSectionRecord> for CrossSectionByWavelength {
    type Error = AtmospecError;

    fn try_from(record: CrossSectionRecord) -> Result<Self, Self::Error> {
        Self::new(record.wavelengths, record.cross_section)
    }
}

impl CrossSectionByWavelength {
    pub fn new(wavelengths: Vec<f64>, cross_section: Vec<f64>) -> ComputeResult<Self> {
        if wavelengths.len() != cross_section.len() {
            return Err(AtmospecError::input_validation(
                "INPUT.CROSS_SECTION_SHAPE",
                format!(
                    "cross section has {} wavelengths but {} values",
                    wavelengths.len(),
                    cross_section.len()
                ),
            ));
        }
        if wavelengths.len() < 2 {
            return Err(AtmospecError::input_validation(
                "INPUT.CROSS_SECTION_SHAPE",
                "cross section needs at least 2 wavelengths",
            ));
        }
        if wavelengths.iter().any(|wavelength| !wavelength.is_finite())
            || wavelengths.windows(2).any(|pair| pair[1] <= pair[0])
        {
            return Err(AtmospecError::input_validation(
                "INPUT.CROSS_SECTION_ORDER",
                "cross section wavelengths must be finite and strictly ascending",
            ));
        }
        Ok(Self {
            wavelengths,
            cross_section,
        })
    }

    /// Projects an eV-indexed spectrum onto ascending wavelengths.
    ///
    /// Both arrays are reversed together because `nm = 1239.8 / eV` turns an
    /// ascending energy grid into a descending wavelength grid.
    pub fn from_ev_grid(grid_ev: &[f64], cross_section: &[f64]) -> ComputeResult<Self> {
        let wavelengths = ascending_wavelengths(grid_ev);
        let cross_section = cross_section.iter().rev().copied().collect();
        Self::new(wavelengths, cross_section)
    }

    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    pub fn cross_section(&self) -> &[f64] {
        &self.cross_section
    }

    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }

    pub fn wavelength_span(&self) -> (f64, f64) {
        (
            self.wavelengths[0],
            self.wavelengths[self.wavelengths.len() - 1],
        )
    }
}

/// Result of one ensemble recompute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleSpectrum {
    pub params: BroadeningParams,
    pub window: EnergyWindow,
    /// Weighted total with sticks from every conformer concatenated.
    pub total: BroadenedSpectrum,
    /// Weighted per-conformer curves, kept for visualization only.
    pub conformers: Vec<BroadenedSpectrum>,
    pub cross_section_nm: CrossSectionByWavelength,
}

impl EnsembleSpectrum {
    /// Whether the total can be decomposed into more than one conformer curve.
    pub fn can_decompose(&self) -> bool {
        self.conformers.len() > 1
    }

    pub fn unit(&self) -> EnergyUnit {
        self.params.unit
    }
}

/// Synthesizes every conformer on a shared grid and sums them with their
/// population weights.
pub fn aggregate(
    ensemble: &ConformerEnsemble,
    params: &BroadeningParams,
) -> ComputeResult<EnsembleSpectrum> {
    ensemble.validate()?;
    params.validate()?;

    let window = EnergyWindow::from_energies(&ensemble.all_energies_ev())?;
    let grid_ev = window.grid_ev()?;
    tracing::debug!(
        conformers = ensemble.len(),
        transitions = ensemble.transition_count(),
        x_min = window.x_min,
        x_max = window.x_max,
        kernel = %params.kernel,
        width = params.width_ev,
        unit = %params.unit,
        "aggregating ensemble spectrum"
    );

    let mut total_ev = vec![0.0; grid_ev.len()];
    let mut x_stick = Vec::with_capacity(ensemble.transition_count());
    let mut y_stick = Vec::with_capacity(ensemble.transition_count());
    let mut conformers = Vec::with_capacity(ensemble.len());

    for conformer in ensemble {
        let spectrum = Spectrum::from_conformer(conformer)?;
        let mut broadened = spectrum.get_spectrum(params, Some(window))?;
        broadened.scale(conformer.weight);

        for (total, value) in total_ev.iter_mut().zip(&broadened.y) {
            *total += value;
        }
        x_stick.extend_from_slice(&broadened.x_stick);
        y_stick.extend_from_slice(&broadened.y_stick);
        conformers.push(broadened);
    }

    let cross_section_nm = CrossSectionByWavelength::from_ev_grid(&grid_ev, &total_ev)?;
    let total = BroadenedSpectrum {
        unit: params.unit,
        x: array_from_ev(&grid_ev, params.unit),
        y: total_ev,
        x_stick,
        y_stick,
    };

    Ok(EnsembleSpectrum {
        params: *params,
        window,
        total,
        conformers,
        cross_section_nm,
    })
}
