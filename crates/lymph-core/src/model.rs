//! The unilateral inference model: the public surface that ties the graph,
//! matrices, patient data and time evolution together.

use crate::data::{compress, Compressed, PatientTable};
use crate::evolution::{
    bn_state_dist, evolve_fixed, evolve_marginalized, evolve_sequence, start_state_vector,
    DiagnoseTimeDistribution,
};
use crate::graph::{Cardinality, Graph, NodeKind, NodeSpec};
use crate::matrices::{observation_matrix, transition_matrix};
use crate::modality::Modality;
use crate::params::{ParamKind, Params};
use crate::state_space::StateSpace;
use lymph_error::{LymphError, LymphResult};
use lymph_tensor::Tensor;
use std::collections::{BTreeMap, HashMap};

/// How a T-stage's patients are assumed to have been diagnosed in time.
#[derive(Debug, Clone)]
pub enum StageMode {
    /// A single, known diagnose time.
    Hmm(usize),
    /// Diagnose time is unknown; marginalize over a distribution.
    HmmMarginalized(DiagnoseTimeDistribution),
    /// No time axis: a one-shot Bayesian-network evaluation.
    BayesianNetwork,
}

/// A partial involvement pattern for a risk query: `Some(true)` means
/// "involved", `Some(false)` means "healthy", `None` marginalizes that LNL out.
pub type InvolvementPattern = Vec<Option<bool>>;

/// The unilateral probabilistic model over one side's lymphatic drainage
/// graph. Matrices are rebuilt lazily on the next query after a parameter or
/// modality change invalidates them; this keeps every setter cheap and every
/// getter correct without threading an explicit "dirty" flag through call
/// sites.
pub struct Unilateral {
    graph: Graph,
    space: StateSpace,
    params: Params,
    modalities: BTreeMap<String, Modality>,
    stage_modes: HashMap<String, StageMode>,
    data: Option<PatientTable>,
    compressed: Option<HashMap<String, Compressed>>,
    a_matrix: Option<Tensor<f64>>,
    b_matrix: Option<Tensor<f64>>,
    /// Latest diagnose time accepted by [`StageMode::Hmm`] before
    /// `log_likelihood` short-circuits to `-inf`; only ever checked against
    /// an explicit fixed diagnose time, never against a marginalized
    /// distribution's own support. Default 10, matching the original's
    /// `max_t` default.
    max_t: usize,
}

impl Unilateral {
    pub fn new(k: Cardinality, nodes: &[NodeSpec]) -> LymphResult<Self> {
        let graph = Graph::new(k, nodes)?;
        let space = StateSpace::new(graph.k(), graph.num_lnls());
        let params = Params::new(&graph);
        Ok(Self {
            graph,
            space,
            params,
            modalities: BTreeMap::new(),
            stage_modes: HashMap::new(),
            data: None,
            compressed: None,
            a_matrix: None,
            b_matrix: None,
            max_t: 10,
        })
    }

    /// Overrides the default `max_t = 10` cap on accepted diagnose times.
    pub fn set_max_t(&mut self, max_t: usize) {
        self.max_t = max_t;
    }

    pub fn max_t(&self) -> usize {
        self.max_t
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn num_states(&self) -> usize {
        self.space.num_states()
    }

    pub fn set_spread_params(&mut self, kind: ParamKind, values: &[f64]) -> LymphResult<()> {
        self.params.set(&self.graph, kind, values)?;
        self.a_matrix = None;
        Ok(())
    }

    pub fn get_spread_params(&self, kind: ParamKind) -> Vec<f64> {
        self.params.get(&self.graph, kind)
    }

    pub fn set_modalities(&mut self, modalities: BTreeMap<String, Modality>) -> LymphResult<()> {
        for modality in modalities.values() {
            modality.validate()?;
        }
        self.modalities = modalities;
        self.b_matrix = None;
        Ok(())
    }

    pub fn set_stage_mode(&mut self, t_stage: impl Into<String>, mode: StageMode) {
        self.stage_modes.insert(t_stage.into(), mode);
    }

    pub fn load_patient_data(&mut self, table: PatientTable) {
        tracing::info!(n_rows = table.n_rows(), t_stages = ?table.t_stages(), "loading patient cohort");
        self.compressed = Some(compress(&table));
        self.data = Some(table);
    }

    pub fn patient_data(&self) -> Option<&PatientTable> {
        self.data.as_ref()
    }

    fn ensure_a(&mut self) -> &Tensor<f64> {
        if self.a_matrix.is_none() {
            tracing::debug!(num_states = self.space.num_states(), "rebuilding transition matrix");
            self.a_matrix = Some(transition_matrix(&self.graph, &self.space, &self.params));
        }
        self.a_matrix.as_ref().unwrap()
    }

    fn ensure_b(&mut self) -> &Tensor<f64> {
        if self.b_matrix.is_none() {
            tracing::debug!(num_modalities = self.modalities.len(), "rebuilding observation matrix");
            self.b_matrix = Some(observation_matrix(&self.space, &self.modalities));
        }
        self.b_matrix.as_ref().unwrap()
    }

    /// The hidden-state distribution under a chosen evolution mode.
    pub fn state_dist(&mut self, mode: &StageMode) -> Vec<f64> {
        let n = self.space.num_states();
        let start = start_state_vector(n);
        let a = self.ensure_a();
        match mode {
            StageMode::Hmm(t) => evolve_fixed(&start, a, *t),
            StageMode::HmmMarginalized(dist) => evolve_marginalized(&start, a, dist),
            StageMode::BayesianNetwork => bn_state_dist(&start, a),
        }
    }

    /// The full per-`t` sequence of state distributions (`t = 0..=t_max`),
    /// none of them marginalized over time. Used by
    /// [`crate::bilateral::Bilateral`] to couple both sides through the same
    /// diagnose time inside a joint sum, rather than multiplying two
    /// independently marginalized distributions together.
    pub fn state_sequence(&mut self, t_max: usize) -> Vec<Vec<f64>> {
        let n = self.space.num_states();
        let start = start_state_vector(n);
        let a = self.ensure_a();
        evolve_sequence(&start, a, t_max)
    }

    /// Marginal probability of each possible observation, under a chosen
    /// evolution mode. Returned in the same bit layout as
    /// [`crate::matrices::observation_matrix`].
    pub fn observation_dist(&mut self, mode: &StageMode) -> Vec<f64> {
        let state_dist = self.state_dist(mode);
        self.ensure_b().vec_mul(&state_dist)
    }

    /// Log-likelihood of the loaded patient data under the current
    /// parameters. Returns `-inf` if any spread parameter is out of range or
    /// any stage's fixed diagnose time exceeds [`Unilateral::max_t`], rather
    /// than erroring.
    pub fn log_likelihood(&mut self) -> LymphResult<f64> {
        if !self.params.is_valid() {
            tracing::warn!("spread parameters out of [0, 1]; returning -inf log-likelihood");
            return Ok(f64::NEG_INFINITY);
        }
        let compressed = self
            .compressed
            .as_ref()
            .ok_or_else(|| LymphError::State("no patient data loaded".into()))?
            .clone();

        let max_t = self.max_t;
        let mut total = 0.0;
        for (stage, bucket) in &compressed {
            let mode = self
                .stage_modes
                .get(stage)
                .cloned()
                .unwrap_or(StageMode::Hmm(0));
            if let StageMode::Hmm(t) = mode {
                if t > max_t {
                    tracing::warn!(t, max_t, stage = %stage, "diagnose time exceeds max_t; returning -inf log-likelihood");
                    return Ok(f64::NEG_INFINITY);
                }
            }
            let obs_dist = self.observation_dist(&mode);
            let p = bucket.c.vec_mul(&obs_dist);
            for (&f_k, &p_k) in bucket.f.iter().zip(p.iter()) {
                total += f_k * p_k.ln();
            }
        }
        Ok(total)
    }

    /// The stage mode registered for `t_stage`, or `default` if none was set.
    pub fn stage_mode_or<'a>(&'a self, t_stage: &str, default: &'a StageMode) -> &'a StageMode {
        self.stage_modes.get(t_stage).unwrap_or(default)
    }

    /// `P(diagnosis | state)` for every hidden state, the same quantity
    /// [`Unilateral::posterior`] multiplies by the prior. Exposed separately
    /// for [`crate::bilateral::Bilateral`], which needs it un-normalized and
    /// un-multiplied by either side's prior. Depends only on the observation
    /// matrix `B`, never on the evolution mode, since `B` has no time axis.
    pub fn likelihood_given_state(&mut self, diagnosis: &[Option<bool>]) -> Vec<f64> {
        let n = self.space.num_states();
        let e = crate::data::diagnosis_column(diagnosis.len(), diagnosis);
        let b = self.ensure_b();
        (0..n)
            .map(|i| {
                let row = b.row(i);
                e.iter().zip(row.iter()).map(|(&ind, &p)| ind * p).sum()
            })
            .collect()
    }

    /// Posterior state distribution given one patient's diagnosis.
    /// `diagnosis` uses the same `modality-major` bit layout as
    /// [`crate::data::PatientRow`].
    pub fn posterior(&mut self, mode: &StageMode, diagnosis: &[Option<bool>]) -> Vec<f64> {
        let prior = self.state_dist(mode);
        let likelihood_given_state = self.likelihood_given_state(diagnosis);

        let mut posterior: Vec<f64> = prior
            .iter()
            .zip(likelihood_given_state.iter())
            .map(|(&pr, &lk)| pr * lk)
            .collect();
        let norm: f64 = posterior.iter().sum();
        if norm > 0.0 {
            for p in posterior.iter_mut() {
                *p /= norm;
            }
        }
        posterior
    }

    /// Marginal probability of an involvement pattern, marginalizing out
    /// LNLs left as `None`.
    pub fn risk(&mut self, mode: &StageMode, involvement: &InvolvementPattern, diagnosis: Option<&[Option<bool>]>) -> f64 {
        let dist = match diagnosis {
            Some(d) => self.posterior(mode, d),
            None => self.state_dist(mode),
        };
        let l = self.space.num_lnls();
        (0..dist.len())
            .filter(|&i| {
                let digits = self.space.digits_of(i);
                (0..l).all(|ell| match involvement.get(ell).copied() {
                    Some(Some(true)) => digits[ell] != 0,
                    Some(Some(false)) => digits[ell] == 0,
                    _ => true,
                })
            })
            .map(|i| dist[i])
            .sum()
    }
}
