//! Diagnostic modalities and their confusion matrices.
//!
//! A modality reports a binary (healthy/involved) observation for each LNL.
//! Clinical modalities cannot tell microscopic disease from healthy tissue;
//! pathological modalities cannot tell microscopic disease from macroscopic
//! disease. Both collapse to the same 2x2 matrix when the graph is binary.

use lymph_error::{LymphError, LymphResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Modality {
    Clinical { sens: f64, spec: f64 },
    Pathological { sens: f64, spec: f64 },
}

impl Modality {
    pub fn sens(&self) -> f64 {
        match self {
            Modality::Clinical { sens, .. } | Modality::Pathological { sens, .. } => *sens,
        }
    }

    pub fn spec(&self) -> f64 {
        match self {
            Modality::Clinical { spec, .. } | Modality::Pathological { spec, .. } => *spec,
        }
    }

    /// Validates `sens`/`spec` fall in `[0.5, 1.0]`; below-chance accuracy is
    /// rejected outright rather than absorbed into `-inf`.
    pub fn validate(&self) -> LymphResult<()> {
        let (sn, sp) = (self.sens(), self.spec());
        for (name, v) in [("sensitivity", sn), ("specificity", sp)] {
            if !(0.5..=1.0).contains(&v) {
                return Err(LymphError::InvalidArgument(
                    format!("modality {name} {v} outside [0.5, 1.0]").into(),
                ));
            }
        }
        Ok(())
    }

    /// Row `state` of the confusion matrix: `[P(observe healthy | state), P(observe involved | state)]`.
    ///
    /// `k == 2`: state 1 always reports involved at `sens`.
    /// `k == 3`: clinical cannot see micro (state 1 reads as healthy-biased,
    /// using `spec`), pathological cannot distinguish micro from macro (state
    /// 1 reads involved-biased, using `sens`).
    pub fn confusion_row(&self, k: usize, state: usize) -> [f64; 2] {
        let (sn, sp) = (self.sens(), self.spec());
        match (self, k, state) {
            (_, _, 0) => [sp, 1.0 - sp],
            (Modality::Clinical { .. }, 3, 1) => [sp, 1.0 - sp],
            (Modality::Pathological { .. }, 3, 1) => [1.0 - sn, sn],
            _ => [1.0 - sn, sn],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clinical_reads_micro_as_healthy_biased() {
        let m = Modality::Clinical { sens: 0.8, spec: 0.9 };
        assert_eq!(m.confusion_row(3, 1), [0.9, 0.1]);
    }

    #[test]
    fn pathological_reads_micro_as_involved_biased() {
        let m = Modality::Pathological { sens: 0.8, spec: 0.9 };
        assert_eq!(m.confusion_row(3, 1), [0.2, 0.8]);
    }

    #[test]
    fn binary_graph_ignores_modality_kind_for_state_one() {
        let clinical = Modality::Clinical { sens: 0.8, spec: 0.9 };
        let path = Modality::Pathological { sens: 0.8, spec: 0.9 };
        assert_eq!(clinical.confusion_row(2, 1), path.confusion_row(2, 1));
    }

    #[test]
    fn validate_rejects_below_chance_accuracy() {
        let m = Modality::Clinical { sens: 0.4, spec: 0.9 };
        assert!(m.validate().is_err());
    }
}
