//! Energy representations used for display and for the photolysis hand-off.
//!
//! eV and cm^-1 are related by a scale factor; nanometers are inversely
//! proportional to energy, so converting an ascending eV array to nm yields a
//! descending array.

use crate::common::constants::{CM_FACTOR, NM_FACTOR};
use crate::domain::AtmospecError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EnergyUnit {
    #[default]
    #[serde(rename = "eV")]
    Ev,
    #[serde(rename = "cm^-1")]
    Cm,
    #[serde(rename = "nm")]
    Nm,
}

impl EnergyUnit {
    pub const ALL: [EnergyUnit; 3] = [Self::Ev, Self::Cm, Self::Nm];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ev => "eV",
            Self::Cm => "cm^-1",
            Self::Nm => "nm",
        }
    }

    /// Factor relating eV to this unit.
    ///
    /// For [`EnergyUnit::Nm`] this is the numerator of `nm = factor / eV`, not a
    /// multiplicative factor.
    pub const fn factor(self) -> f64 {
        match self {
            Self::Ev => 1.0,
            Self::Cm => CM_FACTOR,
            Self::Nm => NM_FACTOR,
        }
    }

    pub const fn is_wavelength(self) -> bool {
        matches!(self, Self::Nm)
    }
}

impl Display for EnergyUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

impl FromStr for EnergyUnit {
    type Err = AtmospecError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "eV" | "ev" => Ok(Self::Ev),
            "cm^-1" | "cm-1" | "cm" => Ok(Self::Cm),
            "nm" => Ok(Self::Nm),
            other => Err(AtmospecError::input_validation(
                "INPUT.ENERGY_UNIT",
                format!("invalid energy unit '{other}'"),
            )),
        }
    }
}

pub fn from_ev(value_ev: f64, unit: EnergyUnit) -> f64 {
    match unit {
        EnergyUnit::Nm => unit.factor() / value_ev,
        EnergyUnit::Ev | EnergyUnit::Cm => value_ev * unit.factor(),
    }
}

pub fn to_ev(value: f64, unit: EnergyUnit) -> f64 {
    match unit {
        EnergyUnit::Nm => unit.factor() / value,
        EnergyUnit::Ev | EnergyUnit::Cm => value / unit.factor(),
    }
}

pub fn convert(value: f64, from: EnergyUnit, to: EnergyUnit) -> f64 {
    if from == to {
        return value;
    }
    from_ev(to_ev(value, from), to)
}

/// Element-wise [`from_ev`], preserving input order.
pub fn array_from_ev(values_ev: &[f64], unit: EnergyUnit) -> Vec<f64> {
    values_ev.iter().map(|value| from_ev(*value, unit)).collect()
}

/// Wavelengths (nm) for an eV array, reversed so an ascending eV input
/// produces an ascending wavelength output.
pub fn ascending_wavelengths(values_ev: &[f64]) -> Vec<f64> {
    values_ev
        .iter()
        .rev()
        .map(|value| from_ev(*value, EnergyUnit::Nm))
        .collect()
}

/// Expresses a wavelength in nm in the given display unit.
pub fn nm_to_unit(wavelength_nm: f64, unit: EnergyUnit) -> f64 {
    convert(wavelength_nm, EnergyUnit::Nm, unit)
}
