//! Time evolution of the hidden state distribution.
//!
//! Three modes share the same transition matrix `A`: a hidden Markov model at
//! a fixed discrete diagnose time, one marginalized over a distribution of
//! diagnose times, and a one-shot Bayesian-network mode with no time axis at
//! all.

use lymph_error::{LymphError, LymphResult};
use lymph_tensor::Tensor;

/// A probability mass function over diagnose times `0..=t_max`.
#[derive(Debug, Clone)]
pub struct DiagnoseTimeDistribution {
    pmf: Vec<f64>,
}

impl DiagnoseTimeDistribution {
    pub fn new(pmf: Vec<f64>) -> LymphResult<Self> {
        let sum: f64 = pmf.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(LymphError::InvalidArgument(
                format!("diagnose-time distribution sums to {sum}, not 1").into(),
            ));
        }
        Ok(Self { pmf })
    }

    pub fn t_max(&self) -> usize {
        self.pmf.len() - 1
    }

    pub fn pmf(&self) -> &[f64] {
        &self.pmf
    }
}

/// The `t = 0` state distribution: every LNL healthy.
pub fn start_state_vector(num_states: usize) -> Vec<f64> {
    let mut v = vec![0.0; num_states];
    v[0] = 1.0;
    v
}

/// Evolves `start` forward exactly `t` discrete time steps under `a`.
pub fn evolve_fixed(start: &[f64], a: &Tensor<f64>, t: usize) -> Vec<f64> {
    let mut dist = start.to_vec();
    for _ in 0..t {
        dist = a.vec_mul(&dist);
    }
    dist
}

/// The full sequence of state distributions at `t = 0..=t_max`, none of them
/// marginalized over time. [`evolve_marginalized`] is exactly the
/// `pmf`-weighted sum of this sequence; callers that must share a single
/// time index across two independent evolutions (e.g. a bilateral joint
/// state, where both sides are diagnosed at the same unknown time) use the
/// raw sequence directly instead.
pub fn evolve_sequence(start: &[f64], a: &Tensor<f64>, t_max: usize) -> Vec<Vec<f64>> {
    let mut seq = Vec::with_capacity(t_max + 1);
    let mut dist = start.to_vec();
    seq.push(dist.clone());
    for _ in 0..t_max {
        dist = a.vec_mul(&dist);
        seq.push(dist.clone());
    }
    seq
}

/// Evolves `start` forward under `a`, marginalizing over a distribution of
/// diagnose times: `sum_t pmf[t] * (start . A^t)`.
pub fn evolve_marginalized(start: &[f64], a: &Tensor<f64>, dist: &DiagnoseTimeDistribution) -> Vec<f64> {
    let seq = evolve_sequence(start, a, dist.t_max());
    let n = start.len();
    let mut out = vec![0.0; n];
    for (t, &p_t) in dist.pmf().iter().enumerate() {
        for i in 0..n {
            out[i] += p_t * seq[t][i];
        }
    }
    out
}

/// Bayesian-network mode: a single application of the edge-parameterized
/// causes to the all-healthy baseline, with no time axis. "One-shot" means
/// exactly one pass of `A`, not a fixed point or a marginal over time.
pub fn bn_state_dist(start: &[f64], a: &Tensor<f64>) -> Vec<f64> {
    a.vec_mul(start)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_state_chain(p: f64) -> Tensor<f64> {
        Tensor::new(vec![1.0 - p, p, 0.0, 1.0], (2, 2))
    }

    #[test]
    fn fixed_time_matches_repeated_application() {
        let a = two_state_chain(0.3);
        let start = start_state_vector(2);
        let one = evolve_fixed(&start, &a, 1);
        assert!((one[1] - 0.3).abs() < 1e-12);
        let two = evolve_fixed(&start, &a, 2);
        // P(involved by t=2) = 1 - (1-p)^2
        assert!((two[1] - (1.0 - (1.0 - 0.3f64).powi(2))).abs() < 1e-9);
    }

    #[test]
    fn sequence_matches_evolve_fixed_at_every_t() {
        let a = two_state_chain(0.3);
        let start = start_state_vector(2);
        let seq = evolve_sequence(&start, &a, 3);
        assert_eq!(seq.len(), 4);
        for (t, step) in seq.iter().enumerate() {
            assert_eq!(step, &evolve_fixed(&start, &a, t));
        }
    }

    #[test]
    fn marginalized_distribution_sums_to_one() {
        let a = two_state_chain(0.4);
        let start = start_state_vector(2);
        let dist = DiagnoseTimeDistribution::new(vec![0.2, 0.3, 0.5]).unwrap();
        let out = evolve_marginalized(&start, &a, &dist);
        let sum: f64 = out.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_pmf_is_rejected() {
        assert!(DiagnoseTimeDistribution::new(vec![0.2, 0.2]).is_err());
    }

    #[test]
    fn bn_mode_is_a_single_step() {
        let a = two_state_chain(0.25);
        let start = start_state_vector(2);
        let bn = bn_state_dist(&start, &a);
        let one_step = evolve_fixed(&start, &a, 1);
        assert_eq!(bn, one_step);
    }
}
