//! Photolysis rate constant from a theoretical cross section and tabulated
//! actinic flux.

mod flux;

pub use flux::{ActinicFluxTable, FluxLevel};

use crate::domain::{AtmospecError, ComputeResult};
use crate::ensemble::CrossSectionByWavelength;
use crate::export::format_scientific;
use crate::numerics::{box_smooth_same, interpolate_linear_zero_fill, trapezoid};
use serde::{Deserialize, Serialize};

/// Width of the box filter applied to the displayed differential rate.
pub const SMOOTHING_KERNEL_SIZE: usize = 3;

/// Significant digits used when reporting the total rate constant.
pub const RATE_PRECISION: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotolysisResult {
    pub flux_level: FluxLevel,
    pub quantum_yield: f64,
    pub wavelengths: Vec<f64>,
    /// Differential rate j(λ) in s^-1 nm^-1.
    pub j_diff: Vec<f64>,
    /// Box-smoothed j(λ) for display.
    pub j_smoothed: Vec<f64>,
    /// Trapezoidal integral of the raw `j_diff`, s^-1.
    pub total_rate: f64,
}

impl PhotolysisResult {
    pub fn formatted_rate(&self) -> String {
        format_scientific(self.total_rate, RATE_PRECISION)
    }
}

pub struct PhotolysisEngine<'a> {
    flux: &'a ActinicFluxTable,
}

impl<'a> PhotolysisEngine<'a> {
    pub fn new(flux: &'a ActinicFluxTable) -> Self {
        Self { flux }
    }

    pub fn flux_table(&self) -> &'a ActinicFluxTable {
        self.flux
    }

    /// Fails when the cross section and the flux table share no wavelengths.
    pub fn check_overlap(&self, cross_section: &CrossSectionByWavelength) -> ComputeResult<()> {
        let (flux_min, flux_max) = self.flux.wavelength_span();
        let (spectrum_min, spectrum_max) = cross_section.wavelength_span();
        if spectrum_max <= flux_min || spectrum_min >= flux_max {
            return Err(AtmospecError::computation(
                "RUN.OUT_OF_ACTINIC_RANGE",
                format!(
                    "Spectrum outside of actinic range: spectrum spans [{spectrum_min:.1}, {spectrum_max:.1}] nm, flux spans [{flux_min:.1}, {flux_max:.1}] nm"
                ),
            ));
        }
        Ok(())
    }

    /// Cross section resampled onto the flux wavelengths, zero where the
    /// spectrum has no data.
    pub fn interpolate_cross_section(
        &self,
        cross_section: &CrossSectionByWavelength,
    ) -> ComputeResult<Vec<f64>> {
        interpolate_linear_zero_fill(
            self.flux.wavelengths(),
            cross_section.wavelengths(),
            cross_section.cross_section(),
        )
        .map_err(|error| AtmospecError::computation("RUN.INTERPOLATION", error.to_string()))
    }

    /// `j(λ) = σ(λ) · F(λ) · φ` on the flux grid.
    pub fn differential_rate(
        &self,
        cross_section: &CrossSectionByWavelength,
        level: FluxLevel,
        quantum_yield: f64,
    ) -> ComputeResult<Vec<f64>> {
        validate_quantum_yield(quantum_yield)?;
        let sigma = self.interpolate_cross_section(cross_section)?;
        Ok(sigma
            .iter()
            .zip(self.flux.flux(level))
            .map(|(sigma, flux)| sigma * flux * quantum_yield)
            .collect())
    }

    pub fn compute(
        &self,
        cross_section: &CrossSectionByWavelength,
        level: FluxLevel,
        quantum_yield: f64,
    ) -> ComputeResult<PhotolysisResult> {
        self.check_overlap(cross_section)?;
        let j_diff = self.differential_rate(cross_section, level, quantum_yield)?;
        let wavelengths = self.flux.wavelengths().to_vec();
        let total_rate = trapezoid(&wavelengths, &j_diff)
            .map_err(|error| AtmospecError::computation("RUN.INTEGRATION", error.to_string()))?;
        let j_smoothed = box_smooth_same(&j_diff, SMOOTHING_KERNEL_SIZE);

        tracing::debug!(%level, quantum_yield, total_rate, "computed photolysis rate");
        Ok(PhotolysisResult {
            flux_level: level,
            quantum_yield,
            wavelengths,
            j_diff,
            j_smoothed,
            total_rate,
        })
    }
}

pub fn validate_quantum_yield(quantum_yield: f64) -> ComputeResult<()> {
    if !(quantum_yield > 0.0 && quantum_yield <= 1.0) {
        return Err(AtmospecError::input_validation(
            "INPUT.QUANTUM_YIELD",
            format!("quantum yield must lie in (0, 1], got {quantum_yield}"),
        ));
    }
    Ok(())
}
