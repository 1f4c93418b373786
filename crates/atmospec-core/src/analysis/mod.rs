//! Correlation view between excitation energies and oscillator strengths.

use crate::domain::ConformerEnsemble;
use crate::export::format_float;
use serde::{Deserialize, Serialize};

/// Transitions of all conformers flattened into parallel arrays.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionScatter {
    pub energies_ev: Vec<f64>,
    pub osc_strengths: Vec<f64>,
    /// Index of the conformer each point came from.
    pub conformer_ids: Vec<usize>,
}

impl TransitionScatter {
    pub fn from_ensemble(ensemble: &ConformerEnsemble) -> Self {
        let capacity = ensemble.transition_count();
        let mut scatter = Self {
            energies_ev: Vec::with_capacity(capacity),
            osc_strengths: Vec::with_capacity(capacity),
            conformer_ids: Vec::with_capacity(capacity),
        };
        for (conformer_id, conformer) in ensemble.iter().enumerate() {
            for transition in &conformer.transitions {
                scatter.energies_ev.push(transition.energy_ev);
                scatter.osc_strengths.push(transition.osc_strength);
                scatter.conformer_ids.push(conformer_id);
            }
        }
        scatter
    }

    pub fn len(&self) -> usize {
        self.energies_ev.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energies_ev.is_empty()
    }

    /// Energy and strength of the strongest transition.
    pub fn brightest(&self) -> Option<(f64, f64)> {
        self.energies_ev
            .iter()
            .zip(&self.osc_strengths)
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(energy, strength)| (*energy, *strength))
    }

    /// Tab-separated `energy  osc_strength  conformer` table with a header.
    pub fn render_table(&self) -> String {
        let mut output =
            String::from("# Excitation energy (eV)\tOscillator strength (-)\tConformer\n");
        for index in 0..self.len() {
            output.push_str(&format!(
                "{}\t{}\t{}\n",
                format_float(self.energies_ev[index]),
                format_float(self.osc_strengths[index]),
                self.conformer_ids[index]
            ));
        }
        output
    }
}
