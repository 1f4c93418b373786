use crate::common::constants::{CROSS_SECTION_COEFF, PI};
use crate::domain::{AtmospecError, Transition};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Line shape used to spread each transition over the energy grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BroadeningKernel {
    #[default]
    Gaussian,
    Lorentzian,
}

impl BroadeningKernel {
    pub const ALL: [BroadeningKernel; 2] = [Self::Gaussian, Self::Lorentzian];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gaussian => "gaussian",
            Self::Lorentzian => "lorentzian",
        }
    }

    /// Adds the broadened contribution of every transition to `y`.
    ///
    /// `grid_ev` and `y` must have equal length; `width` is sigma for the
    /// Gaussian and the full width tau for the Lorentzian, both in eV.
    pub(crate) fn accumulate(
        self,
        grid_ev: &[f64],
        y: &mut [f64],
        transitions: &[Transition],
        width: f64,
        nsample: u32,
    ) {
        match self {
            Self::Gaussian => accumulate_gaussian(grid_ev, y, transitions, width, nsample),
            Self::Lorentzian => accumulate_lorentzian(grid_ev, y, transitions, width, nsample),
        }
    }
}

impl Display for BroadeningKernel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

impl FromStr for BroadeningKernel {
    type Err = AtmospecError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        Self::ALL
            .into_iter()
            .find(|kernel| kernel.as_str().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| {
                AtmospecError::input_validation(
                    "INPUT.BROADENING_KERNEL",
                    format!("invalid broadening kernel '{normalized}'"),
                )
            })
    }
}

fn accumulate_gaussian(
    grid_ev: &[f64],
    y: &mut [f64],
    transitions: &[Transition],
    sigma: f64,
    nsample: u32,
) {
    let normalization = 1.0 / (2.0 * PI).sqrt() / sigma / f64::from(nsample);
    let two_sigma_sq = 2.0 * sigma * sigma;
    for transition in transitions {
        let prefactor = normalization * CROSS_SECTION_COEFF * transition.osc_strength;
        for (value, x) in y.iter_mut().zip(grid_ev) {
            let delta = x - transition.energy_ev;
            *value += prefactor * (-(delta * delta) / two_sigma_sq).exp();
        }
    }
}

fn accumulate_lorentzian(
    grid_ev: &[f64],
    y: &mut [f64],
    transitions: &[Transition],
    tau: f64,
    nsample: u32,
) {
    let normalization = tau / 2.0 / PI / f64::from(nsample);
    let half_width_sq = tau * tau / 4.0;
    for transition in transitions {
        let prefactor = normalization * CROSS_SECTION_COEFF * transition.osc_strength;
        for (value, x) in y.iter_mut().zip(grid_ev) {
            let delta = x - transition.energy_ev;
            *value += prefactor / (delta * delta + half_width_sq);
        }
    }
}
