//! Experimental reference spectra overlaid on the theoretical one.
//!
//! Records are keyed by a molecular identifier (a SMILES string). Stored
//! x values are wavelengths in nm; they are re-expressed in the display unit
//! before plotting.

use crate::units::{EnergyUnit, nm_to_unit};
use serde::{Deserialize, Serialize};

/// Raw record as handed over by an external store. Either array may be
/// missing from a malformed record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReferenceSpectrumRecord {
    pub identifier: String,
    #[serde(default)]
    pub x_array: Option<Vec<f64>>,
    #[serde(default)]
    pub y_array: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentalSpectrum {
    pub identifier: String,
    pub wavelengths_nm: Vec<f64>,
    pub cross_section: Vec<f64>,
}

impl ExperimentalSpectrum {
    /// Accepts a record only when both arrays are present, non-empty, and of
    /// equal length.
    pub fn from_record(record: &ReferenceSpectrumRecord) -> Option<Self> {
        let (Some(x), Some(y)) = (&record.x_array, &record.y_array) else {
            tracing::debug!(identifier = %record.identifier, "reference spectrum lacks x or y array");
            return None;
        };
        if x.is_empty() || x.len() != y.len() {
            tracing::debug!(
                identifier = %record.identifier,
                x = x.len(),
                y = y.len(),
                "reference spectrum arrays are empty or mismatched"
            );
            return None;
        }
        Some(Self {
            identifier: record.identifier.clone(),
            wavelengths_nm: x.clone(),
            cross_section: y.clone(),
        })
    }

    /// Energies of the reference points in the display unit.
    pub fn energies_in(&self, unit: EnergyUnit) -> Vec<f64> {
        self.wavelengths_nm
            .iter()
            .map(|wavelength| nm_to_unit(*wavelength, unit))
            .collect()
    }
}

/// Lookup of experimental spectra by molecular identifier.
pub trait ReferenceSpectrumSource {
    fn find_by_identifier(&self, identifier: &str) -> Option<ReferenceSpectrumRecord>;
}

/// Finds and validates the reference spectrum for `identifier`.
///
/// Blank identifiers short-circuit without querying the source.
pub fn find_experimental_spectrum<S>(source: &S, identifier: &str) -> Option<ExperimentalSpectrum>
where
    S: ReferenceSpectrumSource + ?Sized,
{
    let identifier = identifier.trim();
    if identifier.is_empty() {
        return None;
    }
    let record = source.find_by_identifier(identifier)?;
    ExperimentalSpectrum::from_record(&record)
}

/// Reference spectra held in memory; the first record for an identifier wins.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReferenceSpectra {
    records: Vec<ReferenceSpectrumRecord>,
}

impl InMemoryReferenceSpectra {
    pub fn new(records: Vec<ReferenceSpectrumRecord>) -> Self {
        Self { records }
    }

    pub fn from_json_str(source: &str) -> crate::domain::ComputeResult<Self> {
        let records = serde_json::from_str(source).map_err(|error| {
            crate::domain::AtmospecError::input_validation(
                "INPUT.REFERENCE_SPECTRA",
                format!("failed to parse reference spectra: {error}"),
            )
        })?;
        Ok(Self::new(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ReferenceSpectrumSource for InMemoryReferenceSpectra {
    fn find_by_identifier(&self, identifier: &str) -> Option<ReferenceSpectrumRecord> {
        self.records
            .iter()
            .find(|record| record.identifier == identifier)
            .cloned()
    }
}
