//! Spread-parameter storage and the `ParamKind` addressing scheme.
//!
//! Rather than a single flat positional parameter vector, parameters are
//! addressed by kind plus position within that kind's edge class. This
//! resolves the "positional vs. keyword" ambiguity in favor of keyword-only
//! access: `set_spread_params(ParamKind::TumorSpread, &values)` always refers
//! to the tumor-spread edges in the order [`crate::graph::Graph::tumor_edges`]
//! yields them, never to a position in some combined global vector.

use crate::graph::{EdgeKind, Graph};
use lymph_error::{LymphError, LymphResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    TumorSpread,
    LnlSpread,
    Growth,
    /// Scales an LNL-spread edge's probability for a microscopic parent.
    /// Only meaningful on trinary graphs; always `1.0` on binary graphs.
    MicroMod,
}

/// Holds one spread probability per edge, plus one `micro_mod` per LNL-spread
/// edge. Values are stored verbatim, unvalidated: out-of-range spread
/// parameters are absorbed into `-inf` log-likelihoods rather than rejected
/// at assignment time.
#[derive(Debug, Clone)]
pub struct Params {
    spread: Vec<f64>,
    micro_mod: Vec<f64>,
}

impl Params {
    pub fn new(graph: &Graph) -> Self {
        let spread = vec![0.0; graph.edges().len()];
        let micro_mod = vec![1.0; graph.lnl_edges().count()];
        Self { spread, micro_mod }
    }

    fn edge_indices(graph: &Graph, kind: ParamKind) -> Vec<usize> {
        match kind {
            ParamKind::TumorSpread => graph.tumor_edges().map(|(i, _)| i).collect(),
            ParamKind::LnlSpread | ParamKind::MicroMod => graph.lnl_edges().map(|(i, _)| i).collect(),
            ParamKind::Growth => graph.growth_edges().map(|(i, _)| i).collect(),
        }
    }

    pub fn get(&self, graph: &Graph, kind: ParamKind) -> Vec<f64> {
        match kind {
            ParamKind::MicroMod => self.micro_mod.clone(),
            _ => Self::edge_indices(graph, kind)
                .into_iter()
                .map(|i| self.spread[i])
                .collect(),
        }
    }

    pub fn set(&mut self, graph: &Graph, kind: ParamKind, values: &[f64]) -> LymphResult<()> {
        let indices = Self::edge_indices(graph, kind);
        if values.len() != indices.len() {
            return Err(LymphError::InvalidArgument(
                format!(
                    "{kind:?}: expected {} values, got {}",
                    indices.len(),
                    values.len()
                )
                .into(),
            ));
        }
        match kind {
            ParamKind::MicroMod => self.micro_mod.copy_from_slice(values),
            _ => {
                for (&idx, &v) in indices.iter().zip(values) {
                    self.spread[idx] = v;
                }
            }
        }
        Ok(())
    }

    pub fn spread_of(&self, edge_idx: usize) -> f64 {
        self.spread[edge_idx]
    }

    pub fn micro_mod_of(&self, graph: &Graph, edge_idx: usize) -> f64 {
        graph
            .lnl_edges()
            .position(|(i, _)| i == edge_idx)
            .map(|pos| self.micro_mod[pos])
            .unwrap_or(1.0)
    }

    /// `true` if every stored spread probability and micro-mod factor lies in
    /// `[0, 1]`. Checked once up front by likelihood queries so an
    /// out-of-range assignment short-circuits to `-inf` without building any
    /// matrices.
    pub fn is_valid(&self) -> bool {
        self.spread.iter().chain(self.micro_mod.iter()).all(|&v| (0.0..=1.0).contains(&v))
    }

    pub fn edge_kind_param(&self, graph: &Graph, edge_idx: usize) -> (f64, f64) {
        let spread = self.spread_of(edge_idx);
        let micro_mod = if graph.edges()[edge_idx].kind == EdgeKind::LnlSpread {
            self.micro_mod_of(graph, edge_idx)
        } else {
            1.0
        };
        (spread, micro_mod)
    }
}
