//! Bilateral composition: two mirrored unilateral models sharing an optional
//! parameter symmetry.
//!
//! Ipsilateral and contralateral drainage are modeled as two independent
//! [`Unilateral`] cores. "Independent" only means their hidden states evolve
//! without cross terms; the joint observation likelihood still couples them
//! through a shared diagnose-time assumption per T-stage. [`SymmetryBroker`]
//! is the one-directional write propagation that keeps mirrored edges (and
//! optionally modalities) in lockstep without a callback graph: a write to
//! either side, when the matching flag is set, is simply re-applied to the
//! other side immediately, so there is no cycle to break.

use crate::data::diagnosis_column;
use crate::graph::{Cardinality, NodeSpec};
use crate::model::{StageMode, Unilateral};
use crate::modality::Modality;
use crate::params::ParamKind;
use lymph_error::LymphResult;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Ipsi,
    Contra,
}

/// Which parameter classes (and modalities) are shared between sides.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymmetryFlags {
    pub tumor_spread: bool,
    pub lnl_spread: bool,
    pub growth: bool,
    pub modalities: bool,
}

/// Propagates a write on one side to the other when the matching
/// [`SymmetryFlags`] bit is set. Exists as its own type (rather than inline
/// `if` checks in every [`Bilateral`] setter) so the propagation rule is
/// stated once and is trivially non-cyclic: it only ever writes into the
/// side it was not called for.
struct SymmetryBroker<'a> {
    flags: &'a SymmetryFlags,
}

impl<'a> SymmetryBroker<'a> {
    fn mirrors(&self, kind: ParamKind) -> bool {
        match kind {
            ParamKind::TumorSpread => self.flags.tumor_spread,
            ParamKind::LnlSpread | ParamKind::MicroMod => self.flags.lnl_spread,
            ParamKind::Growth => self.flags.growth,
        }
    }
}

pub struct Bilateral {
    ipsi: Unilateral,
    contra: Unilateral,
    symmetry: SymmetryFlags,
}

/// One patient's joint diagnosis: both sides' `modality-major` observation
/// vectors plus a shared T-stage.
#[derive(Debug, Clone)]
pub struct BilateralPatientRow {
    pub t_stage: String,
    pub ipsi_diagnosis: Vec<Option<bool>>,
    pub contra_diagnosis: Vec<Option<bool>>,
}

impl Bilateral {
    pub fn new(k: Cardinality, nodes: &[NodeSpec], symmetry: SymmetryFlags) -> LymphResult<Self> {
        let ipsi = Unilateral::new(k, nodes)?;
        let contra = Unilateral::new(k, nodes)?;
        Ok(Self { ipsi, contra, symmetry })
    }

    pub fn ipsi(&self) -> &Unilateral {
        &self.ipsi
    }

    pub fn contra(&self) -> &Unilateral {
        &self.contra
    }

    fn broker(&self) -> SymmetryBroker<'_> {
        SymmetryBroker { flags: &self.symmetry }
    }

    /// Sets spread parameters on `side`. When the matching symmetry flag is
    /// set, the same values are written to the other side immediately.
    pub fn set_spread_params(&mut self, side: Side, kind: ParamKind, values: &[f64]) -> LymphResult<()> {
        let mirrors = self.broker().mirrors(kind);
        match side {
            Side::Ipsi => {
                self.ipsi.set_spread_params(kind, values)?;
                if mirrors {
                    self.contra.set_spread_params(kind, values)?;
                }
            }
            Side::Contra => {
                self.contra.set_spread_params(kind, values)?;
                if mirrors {
                    self.ipsi.set_spread_params(kind, values)?;
                }
            }
        }
        Ok(())
    }

    pub fn set_modalities(&mut self, side: Side, modalities: BTreeMap<String, Modality>) -> LymphResult<()> {
        match side {
            Side::Ipsi => {
                self.ipsi.set_modalities(modalities.clone())?;
                if self.symmetry.modalities {
                    self.contra.set_modalities(modalities)?;
                }
            }
            Side::Contra => {
                self.contra.set_modalities(modalities.clone())?;
                if self.symmetry.modalities {
                    self.ipsi.set_modalities(modalities)?;
                }
            }
        }
        Ok(())
    }

    /// Both sides share one diagnose-time assumption per T-stage: a patient
    /// is diagnosed once, not once per side. There is deliberately no way to
    /// register different modes for ipsi and contra.
    pub fn set_stage_mode(&mut self, t_stage: &str, mode: StageMode) {
        self.ipsi.set_stage_mode(t_stage.to_string(), mode.clone());
        self.contra.set_stage_mode(t_stage.to_string(), mode);
    }

    /// The joint hidden-state distribution under one shared evolution mode.
    ///
    /// [`StageMode::Hmm`] and [`StageMode::BayesianNetwork`] have no
    /// marginalization to perform, so the outer product of each side's state
    /// distribution is exact. [`StageMode::HmmMarginalized`] is not: the same
    /// diagnose time `t` must be shared by both sides *inside* the sum,
    /// `joint = sum_t pi[t] * outer(ipsi_state(t), contra_state(t))`, since a
    /// single patient is diagnosed once, from both sides, not independently
    /// per side. Multiplying two already-marginalized distributions together
    /// only coincides with this when `pi` is a point mass.
    pub fn joint_state_dist(&mut self, mode: &StageMode) -> Vec<Vec<f64>> {
        match mode {
            StageMode::Hmm(_) | StageMode::BayesianNetwork => {
                let ipsi_dist = self.ipsi.state_dist(mode);
                let contra_dist = self.contra.state_dist(mode);
                outer(&ipsi_dist, &contra_dist)
            }
            StageMode::HmmMarginalized(dist) => {
                let ipsi_seq = self.ipsi.state_sequence(dist.t_max());
                let contra_seq = self.contra.state_sequence(dist.t_max());
                let n_i = ipsi_seq[0].len();
                let n_c = contra_seq[0].len();
                let mut joint = vec![vec![0.0; n_c]; n_i];
                for (t, &p_t) in dist.pmf().iter().enumerate() {
                    if p_t == 0.0 {
                        continue;
                    }
                    for i in 0..n_i {
                        let w = p_t * ipsi_seq[t][i];
                        if w == 0.0 {
                            continue;
                        }
                        for j in 0..n_c {
                            joint[i][j] += w * contra_seq[t][j];
                        }
                    }
                }
                joint
            }
        }
    }

    /// Log-likelihood of a cohort's joint diagnoses.
    ///
    /// Rows are grouped by `(t_stage, ipsi diagnosis, contra diagnosis)` so
    /// repeated joint patterns are scored once and weighted by their count,
    /// the same compression idea [`crate::data::compress`] applies to a
    /// single side. For each distinct pair the joint probability is formed
    /// without materializing a full joint observation tensor: `lhs[i] =
    /// P(ipsi diagnosis | ipsi state i)`, `rhs[j] = P(contra diagnosis |
    /// contra state j)`, and `P(pair) = sum_ij joint[i][j] * lhs[i] * rhs[j]`.
    pub fn log_likelihood(&mut self, rows: &[BilateralPatientRow]) -> f64 {
        let mut groups: HashMap<(String, Vec<u8>, Vec<u8>), (f64, usize)> = HashMap::new();
        for (idx, row) in rows.iter().enumerate() {
            let ipsi_bits = bit_pattern(&row.ipsi_diagnosis);
            let contra_bits = bit_pattern(&row.contra_diagnosis);
            if all_missing(&ipsi_bits) && all_missing(&contra_bits) {
                continue;
            }
            let entry = groups
                .entry((row.t_stage.clone(), ipsi_bits, contra_bits))
                .or_insert((0.0, idx));
            entry.0 += 1.0;
        }

        let default_mode = StageMode::Hmm(0);
        let mut total = 0.0;
        for ((stage, _, _), (count, representative_idx)) in &groups {
            let row = &rows[*representative_idx];
            let mode = self.ipsi.stage_mode_or(stage, &default_mode).clone();

            let joint = self.joint_state_dist(&mode);
            let lhs = self.ipsi.likelihood_given_state(&row.ipsi_diagnosis);
            let rhs = self.contra.likelihood_given_state(&row.contra_diagnosis);

            let p: f64 = joint
                .iter()
                .enumerate()
                .map(|(i, row_i)| lhs[i] * row_i.iter().zip(rhs.iter()).map(|(&j, &r)| j * r).sum::<f64>())
                .sum();
            total += count * p.ln();
        }
        total
    }
}

fn outer(a: &[f64], b: &[f64]) -> Vec<Vec<f64>> {
    a.iter().map(|&x| b.iter().map(|&y| x * y).collect()).collect()
}

fn bit_pattern(diagnosis: &[Option<bool>]) -> Vec<u8> {
    diagnosis_column(diagnosis.len(), diagnosis)
        .iter()
        .map(|&v| v as u8)
        .collect()
}

fn all_missing(bits: &[u8]) -> bool {
    bits.iter().all(|&b| b == 1)
}
