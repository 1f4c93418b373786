//! Broadened UV/vis spectrum of a single conformer.
//!
//! All line-shape math happens on an eV grid; the grid and the stick
//! positions are converted to the display unit only at the end.

mod kernel;

pub use kernel::BroadeningKernel;

use crate::common::constants::{ENERGY_PADDING_EV, MIN_PADDED_ENERGY_EV, N_SAMPLE_POINTS};
use crate::domain::{AtmospecError, ComputeResult, Conformer, Transition, validate_transitions};
use crate::numerics::{linspace, max_value, min_value};
use crate::units::{EnergyUnit, array_from_ev};
use serde::{Deserialize, Serialize};

/// Spectrum energy range in eV derived from the extreme excitation energies.
///
/// The range is padded by 1.5 eV on both sides, except that a lower bound
/// below 1 eV is replaced by half of the lowest energy. Small energies turn
/// into long tails once expressed in nanometers.
pub fn energy_range_ev(excitation_energies: &[f64]) -> ComputeResult<(f64, f64)> {
    let (Some(en_min), Some(en_max)) = (
        min_value(excitation_energies),
        max_value(excitation_energies),
    ) else {
        return Err(AtmospecError::input_validation(
            "INPUT.EMPTY_TRANSITIONS",
            "cannot determine energy range without excitation energies",
        ));
    };

    if !(en_min > 0.0 && en_max > 0.0) || !en_max.is_finite() {
        return Err(AtmospecError::computation(
            "RUN.ENERGY_RANGE",
            format!(
                "excitation energies must be finite and > 0 eV, got min={en_min}, max={en_max}"
            ),
        ));
    }

    let x_max = en_max + ENERGY_PADDING_EV;
    let mut x_min = en_min - ENERGY_PADDING_EV;
    if x_min < MIN_PADDED_ENERGY_EV {
        x_min = en_min / 2.0;
    }
    Ok((x_min, x_max))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyWindow {
    pub x_min: f64,
    pub x_max: f64,
}

impl EnergyWindow {
    pub fn new(x_min: f64, x_max: f64) -> ComputeResult<Self> {
        if !x_min.is_finite() || !x_max.is_finite() || x_min <= 0.0 || x_min >= x_max {
            return Err(AtmospecError::input_validation(
                "INPUT.ENERGY_WINDOW",
                format!("invalid energy window [{x_min}, {x_max}] eV"),
            ));
        }
        Ok(Self { x_min, x_max })
    }

    pub fn from_energies(excitation_energies: &[f64]) -> ComputeResult<Self> {
        let (x_min, x_max) = energy_range_ev(excitation_energies)?;
        Ok(Self { x_min, x_max })
    }

    /// The fixed-size eV sampling grid spanning this window.
    pub fn grid_ev(&self) -> ComputeResult<Vec<f64>> {
        linspace(self.x_min, self.x_max, N_SAMPLE_POINTS).map_err(|error| {
            AtmospecError::computation("RUN.ENERGY_GRID", error.to_string())
        })
    }
}

/// Kernel, width and display unit of one spectrum recompute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BroadeningParams {
    pub kernel: BroadeningKernel,
    pub width_ev: f64,
    pub unit: EnergyUnit,
}

impl BroadeningParams {
    pub fn new(kernel: BroadeningKernel, width_ev: f64, unit: EnergyUnit) -> Self {
        Self {
            kernel,
            width_ev,
            unit,
        }
    }

    pub fn validate(&self) -> ComputeResult<()> {
        if !self.width_ev.is_finite() || self.width_ev <= 0.0 {
            return Err(AtmospecError::input_validation(
                "INPUT.BROADENING_WIDTH",
                format!("broadening width must be finite and > 0 eV, got {}", self.width_ev),
            ));
        }
        Ok(())
    }
}

/// Continuous spectrum plus the stick representation of its transitions.
///
/// `x` is in the display unit (descending for nanometers), `y` is the cross
/// section in cm^2 per molecule. Sticks are rescaled so that the strongest
/// transition matches the peak of `y`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadenedSpectrum {
    pub unit: EnergyUnit,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub x_stick: Vec<f64>,
    pub y_stick: Vec<f64>,
}

impl BroadenedSpectrum {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn peak(&self) -> Option<f64> {
        max_value(&self.y)
    }

    /// Multiplies intensities and stick heights by a population weight.
    pub fn scale(&mut self, weight: f64) {
        self.y.iter_mut().for_each(|value| *value *= weight);
        self.y_stick.iter_mut().for_each(|value| *value *= weight);
    }
}

/// Transitions of one conformer ready for broadening.
#[derive(Debug, Clone, Copy)]
pub struct Spectrum<'a> {
    transitions: &'a [Transition],
    nsample: u32,
}

impl<'a> Spectrum<'a> {
    pub fn new(transitions: &'a [Transition], nsample: u32) -> ComputeResult<Self> {
        validate_transitions(transitions)?;
        if nsample == 0 {
            return Err(AtmospecError::input_validation(
                "INPUT.CONFORMER_NSAMPLE",
                "nsample must be > 0",
            ));
        }
        Ok(Self {
            transitions,
            nsample,
        })
    }

    pub fn from_conformer(conformer: &'a Conformer) -> ComputeResult<Self> {
        Self::new(&conformer.transitions, conformer.nsample)
    }

    pub fn transitions(&self) -> &'a [Transition] {
        self.transitions
    }

    pub fn excitation_energies(&self) -> Vec<f64> {
        self.transitions.iter().map(|tr| tr.energy_ev).collect()
    }

    /// Computes the spectrum on `window`, or on the window derived from this
    /// conformer's own energies when `window` is `None`.
    pub fn get_spectrum(
        &self,
        params: &BroadeningParams,
        window: Option<EnergyWindow>,
    ) -> ComputeResult<BroadenedSpectrum> {
        params.validate()?;
        let window = match window {
            Some(window) => window,
            None => EnergyWindow::from_energies(&self.excitation_energies())?,
        };
        let grid_ev = window.grid_ev()?;
        let y = self.broaden_on_grid(&grid_ev, params);
        Ok(self.to_display_unit(&grid_ev, y, params.unit))
    }

    /// Cross section (cm^2 per molecule) at each point of an eV grid.
    pub fn broaden_on_grid(&self, grid_ev: &[f64], params: &BroadeningParams) -> Vec<f64> {
        let mut y = vec![0.0; grid_ev.len()];
        params.kernel.accumulate(
            grid_ev,
            &mut y,
            self.transitions,
            params.width_ev,
            self.nsample,
        );
        y
    }

    fn to_display_unit(&self, grid_ev: &[f64], y: Vec<f64>, unit: EnergyUnit) -> BroadenedSpectrum {
        let x = array_from_ev(grid_ev, unit);
        let x_stick = array_from_ev(&self.excitation_energies(), unit);

        let peak = max_value(&y).unwrap_or(0.0);
        let max_strength = self
            .transitions
            .iter()
            .map(|tr| tr.osc_strength)
            .fold(0.0, f64::max);
        let y_stick = self
            .transitions
            .iter()
            .map(|tr| {
                if max_strength > 0.0 {
                    tr.osc_strength * peak / max_strength
                } else {
                    0.0
                }
            })
            .collect();

        BroadenedSpectrum {
            unit,
            x,
            y,
            x_stick,
            y_stick,
        }
    }
}
