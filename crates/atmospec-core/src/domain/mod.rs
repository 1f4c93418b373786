pub mod errors;
pub mod structures;

pub use errors::{AtmospecError, AtmospecErrorCategory, AtmospecResult, ComputeResult};
pub use structures::{ConformerTrajectory, MolecularStructure};

use serde::{Deserialize, Serialize};

/// Tolerance used when checking that ensemble weights sum to one.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1.0e-6;

/// A single electronic excitation produced by an upstream calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    #[serde(rename = "energy")]
    pub energy_ev: f64,
    pub osc_strength: f64,
}

impl Transition {
    pub const fn new(energy_ev: f64, osc_strength: f64) -> Self {
        Self {
            energy_ev,
            osc_strength,
        }
    }
}

/// One conformer of the molecule with its transitions and Boltzmann weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conformer {
    pub transitions: Vec<Transition>,
    pub weight: f64,
    pub nsample: u32,
}

impl Conformer {
    pub fn new(transitions: Vec<Transition>, weight: f64, nsample: u32) -> Self {
        Self {
            transitions,
            weight,
            nsample,
        }
    }

    pub fn validate(&self, index: usize) -> ComputeResult<()> {
        validate_transitions(&self.transitions).map_err(|error| {
            AtmospecError::input_validation(
                error.placeholder(),
                format!("conformer {index}: {}", error.message()),
            )
        })?;

        if !self.weight.is_finite() || !(0.0..=1.0).contains(&self.weight) {
            return Err(AtmospecError::input_validation(
                "INPUT.CONFORMER_WEIGHT",
                format!(
                    "conformer {index}: weight must lie in [0, 1], got {}",
                    self.weight
                ),
            ));
        }
        if self.nsample == 0 {
            return Err(AtmospecError::input_validation(
                "INPUT.CONFORMER_NSAMPLE",
                format!("conformer {index}: nsample must be > 0"),
            ));
        }
        Ok(())
    }
}

/// Checks a transition list before it reaches the broadening kernels.
///
/// Energies only need to be finite here; strict positivity is enforced by the
/// energy-window policy in [`crate::spectrum::energy_range_ev`].
pub fn validate_transitions(transitions: &[Transition]) -> ComputeResult<()> {
    if transitions.is_empty() {
        return Err(AtmospecError::input_validation(
            "INPUT.EMPTY_TRANSITIONS",
            "got empty transitions",
        ));
    }

    for (index, transition) in transitions.iter().enumerate() {
        if !transition.energy_ev.is_finite() {
            return Err(AtmospecError::input_validation(
                "INPUT.INVALID_TRANSITION",
                format!(
                    "transition {index} has non-finite energy {}",
                    transition.energy_ev
                ),
            ));
        }
        if !transition.osc_strength.is_finite() || transition.osc_strength < 0.0 {
            return Err(AtmospecError::input_validation(
                "INPUT.INVALID_TRANSITION",
                format!(
                    "transition {index} has invalid oscillator strength {}",
                    transition.osc_strength
                ),
            ));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConformerEnsemble {
    pub conformers: Vec<Conformer>,
}

impl ConformerEnsemble {
    pub fn new(conformers: Vec<Conformer>) -> Self {
        Self { conformers }
    }

    pub fn from_json_str(source: &str) -> ComputeResult<Self> {
        serde_json::from_str(source).map_err(|error| {
            AtmospecError::input_validation(
                "INPUT.CONFORMER_JSON",
                format!("failed to parse conformer transitions: {error}"),
            )
        })
    }

    pub fn len(&self) -> usize {
        self.conformers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conformers.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Conformer> {
        self.conformers.iter()
    }

    pub fn weight_sum(&self) -> f64 {
        self.conformers.iter().map(|conformer| conformer.weight).sum()
    }

    pub fn transition_count(&self) -> usize {
        self.conformers
            .iter()
            .map(|conformer| conformer.transitions.len())
            .sum()
    }

    /// Excitation energies of every conformer, in ensemble order.
    pub fn all_energies_ev(&self) -> Vec<f64> {
        self.conformers
            .iter()
            .flat_map(|conformer| conformer.transitions.iter().map(|tr| tr.energy_ev))
            .collect()
    }

    pub fn validate(&self) -> ComputeResult<()> {
        if self.conformers.is_empty() {
            return Err(AtmospecError::input_validation(
                "INPUT.EMPTY_ENSEMBLE",
                "conformer ensemble is empty",
            ));
        }
        for (index, conformer) in self.conformers.iter().enumerate() {
            conformer.validate(index)?;
        }

        let weight_sum = self.weight_sum();
        if (weight_sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            tracing::warn!(
                weight_sum,
                conformers = self.conformers.len(),
                "conformer weights do not sum to 1; spectrum is not normalized"
            );
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ConformerEnsemble {
    type Item = &'a Conformer;
    type IntoIter = std::slice::Iter<'a, Conformer>;

    fn into_iter(self) -> Self::IntoIter {
        self.conformers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{Conformer, ConformerEnsemble, Transition, validate_transitions};

    fn sample_conformer(weight: f64) -> Conformer {
        Conformer::new(
            vec![Transition::new(5.0, 0.1), Transition::new(6.0, 0.2)],
            weight,
            10,
        )
    }

    #[test]
    fn conformer_records_parse_from_workflow_json() {
        let ensemble = ConformerEnsemble::from_json_str(
            r#"
            [
              {
                "transitions": [
                  { "energy": 5.0, "osc_strength": 0.1 },
                  { "energy": 6.0, "osc_strength": 0.2 }
                ],
                "weight": 0.7,
                "nsample": 10
              },
              {
                "transitions": [{ "energy": 4.5, "osc_strength": 0.05 }],
                "weight": 0.3,
                "nsample": 2
              }
            ]
            "#,
        )
        .expect("ensemble should parse");

        assert_eq!(ensemble.len(), 2);
        assert_eq!(ensemble.transition_count(), 3);
        assert_eq!(ensemble.all_energies_ev(), vec![5.0, 6.0, 4.5]);
        assert!((ensemble.weight_sum() - 1.0).abs() < 1.0e-12);
        ensemble.validate().expect("ensemble should be valid");
    }

    #[test]
    fn malformed_json_is_reported_as_input_error() {
        let error = ConformerEnsemble::from_json_str(r#"[{"transitions": "nope"}]"#)
            .expect_err("parse should fail");
        assert_eq!(error.placeholder(), "INPUT.CONFORMER_JSON");
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn empty_transitions_are_rejected() {
        let error = validate_transitions(&[]).expect_err("empty list should fail");
        assert_eq!(error.placeholder(), "INPUT.EMPTY_TRANSITIONS");

        let ensemble = ConformerEnsemble::new(vec![Conformer::new(Vec::new(), 1.0, 1)]);
        let error = ensemble.validate().expect_err("empty conformer should fail");
        assert_eq!(error.placeholder(), "INPUT.EMPTY_TRANSITIONS");
        assert!(error.message().starts_with("conformer 0:"));
    }

    #[test]
    fn ensemble_validation_checks_weight_and_nsample() {
        assert_eq!(
            ConformerEnsemble::default()
                .validate()
                .expect_err("empty ensemble")
                .placeholder(),
            "INPUT.EMPTY_ENSEMBLE"
        );

        let bad_weight = ConformerEnsemble::new(vec![sample_conformer(1.5)]);
        assert_eq!(
            bad_weight.validate().expect_err("weight > 1").placeholder(),
            "INPUT.CONFORMER_WEIGHT"
        );

        let mut zero_samples = sample_conformer(1.0);
        zero_samples.nsample = 0;
        assert_eq!(
            ConformerEnsemble::new(vec![zero_samples])
                .validate()
                .expect_err("nsample == 0")
                .placeholder(),
            "INPUT.CONFORMER_NSAMPLE"
        );
    }

    #[test]
    fn negative_oscillator_strength_is_rejected() {
        let error = validate_transitions(&[Transition::new(5.0, -0.1)])
            .expect_err("negative strength should fail");
        assert_eq!(error.placeholder(), "INPUT.INVALID_TRANSITION");
    }

    #[test]
    fn unnormalized_weights_are_accepted() {
        let ensemble = ConformerEnsemble::new(vec![sample_conformer(0.4), sample_conformer(0.4)]);
        ensemble
            .validate()
            .expect("weights summing to 0.8 only warn");
    }
}
