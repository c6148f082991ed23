//! Assembly of the state-transition matrix `A` and observation matrix `B`.
//!
//! `A` is built row by row: for each source state, every LNL's next-state
//! distribution is computed independently (combining whichever edges feed it
//! under the independent-failure rule below) and then the row is the outer
//! product of those per-LNL distributions, restricted to the states reachable
//! under the non-decreasing partial order. `B` is the outer product of each
//! modality's confusion-matrix row across LNLs and modalities.
//!
//! Independent-failure rule: an LNL currently healthy advances only if at
//! least one incoming edge "fires"; since edges fire independently, the
//! probability it stays healthy is the product of each edge's
//! non-firing probability, not a sum of per-edge tensor entries. A
//! microscopic LNL (`k == 3`) can only advance via its own growth edge, never
//! via another spread edge — rows other than 0 in every spread edge's tensor
//! are left as the identity precisely so this composition is transparent.

use crate::graph::{Edge, EdgeKind, Graph};
use crate::modality::Modality;
use crate::params::Params;
use crate::state_space::StateSpace;
use lymph_tensor::Tensor;
use std::collections::BTreeMap;

fn edge_fire_prob(
    graph: &Graph,
    edge: &Edge,
    edge_idx: usize,
    k: usize,
    params: &Params,
    digits_i: &[usize],
) -> f64 {
    match edge.kind {
        EdgeKind::TumorSpread => params.spread_of(edge_idx),
        EdgeKind::LnlSpread => {
            let parent_pos = graph.lnl_position(edge.parent);
            let v_p = digits_i[parent_pos];
            if v_p == 0 {
                return 0.0;
            }
            let (spread, micro_mod) = params.edge_kind_param(graph, edge_idx);
            if k == 3 && v_p == 1 {
                spread * micro_mod
            } else {
                spread
            }
        }
        EdgeKind::Growth => unreachable!("growth edges are handled outside edge_fire_prob"),
    }
}

/// The next-state distribution for LNL `ell` given the full digit vector of
/// the source state. Length `k`.
fn lnl_next_state_dist(
    graph: &Graph,
    k: usize,
    params: &Params,
    ell: usize,
    digits_i: &[usize],
) -> Vec<f64> {
    let node_idx = ell + 1;
    let v = digits_i[ell];
    let mut dist = vec![0.0; k];

    if v == k - 1 {
        dist[v] = 1.0;
        return dist;
    }

    if k == 3 && v == 1 {
        let (growth_idx, _) = graph
            .growth_edge_of(node_idx)
            .expect("trinary graphs synthesize a growth edge per LNL");
        let p = params.spread_of(growth_idx);
        dist[1] = 1.0 - p;
        dist[2] = p;
        return dist;
    }

    let stay: f64 = graph
        .spread_edges_into(node_idx)
        .map(|(edge_idx, edge)| 1.0 - edge_fire_prob(graph, edge, edge_idx, k, params, digits_i))
        .product();
    dist[0] = stay;
    dist[1] = 1.0 - stay;
    dist
}

/// Builds the `k^L x k^L` state-transition matrix for one time step.
pub fn transition_matrix(graph: &Graph, space: &StateSpace, params: &Params) -> Tensor<f64> {
    let n = space.num_states();
    let k = space.k();
    let mut a = Tensor::zeros((n, n));

    for i in 0..n {
        let digits_i = space.digits_of(i).to_vec();
        let per_lnl: Vec<Vec<f64>> = (0..space.num_lnls())
            .map(|ell| lnl_next_state_dist(graph, k, params, ell, &digits_i))
            .collect();

        for &j in space.reachable_from(i) {
            let digits_j = space.digits_of(j);
            let prob: f64 = (0..space.num_lnls())
                .map(|ell| per_lnl[ell][digits_j[ell]])
                .product();
            *a.get_mut(&[i, j]) = prob;
        }
    }
    a
}

/// Builds the `k^L x 2^(M*L)` observation matrix. Modalities are ordered by
/// name (the map's natural iteration order) to fix a deterministic bit
/// layout: bit `m * L + ell` of an observation index is modality `m`'s
/// report for LNL `ell`.
pub fn observation_matrix(
    space: &StateSpace,
    modalities: &BTreeMap<String, Modality>,
) -> Tensor<f64> {
    let l = space.num_lnls();
    let m = modalities.len();
    let ml = m * l;
    let n = space.num_states();
    let num_obs = 1usize << ml;
    let mods: Vec<&Modality> = modalities.values().collect();

    let mut b = Tensor::zeros((n, num_obs));
    for i in 0..n {
        let digits = space.digits_of(i);
        for z in 0..num_obs {
            let mut prob = 1.0;
            for (mi, modality) in mods.iter().enumerate() {
                for ell in 0..l {
                    let bit_pos = mi * l + ell;
                    let bit = (z >> bit_pos) & 1;
                    let row = modality.confusion_row(space.k(), digits[ell]);
                    prob *= row[bit];
                }
            }
            *b.get_mut(&[i, z]) = prob;
        }
    }
    b
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Cardinality, NodeKind, NodeSpec};
    use crate::params::ParamKind;

    fn two_lnl_graph(k: Cardinality) -> Graph {
        Graph::new(
            k,
            &[
                NodeSpec { kind: NodeKind::Tumor, name: "T", neighbors: &["I", "II"] },
                NodeSpec { kind: NodeKind::Lnl, name: "I", neighbors: &["II"] },
                NodeSpec { kind: NodeKind::Lnl, name: "II", neighbors: &[] },
            ],
        )
        .unwrap()
    }

    #[test]
    fn rows_of_a_sum_to_one() {
        let g = two_lnl_graph(Cardinality::Binary);
        let space = StateSpace::new(g.k(), g.num_lnls());
        let mut params = Params::new(&g);
        params.set(&g, ParamKind::TumorSpread, &[0.3, 0.1]).unwrap();
        params.set(&g, ParamKind::LnlSpread, &[0.2]).unwrap();

        let a = transition_matrix(&g, &space, &params);
        for i in 0..space.num_states() {
            let sum: f64 = a.row(i).iter().sum();
            assert!((sum - 1.0).abs() < 1e-9, "row {i} sums to {sum}");
        }
    }

    #[test]
    fn a_is_upper_triangular_under_state_order() {
        let g = two_lnl_graph(Cardinality::Binary);
        let space = StateSpace::new(g.k(), g.num_lnls());
        let mut params = Params::new(&g);
        params.set(&g, ParamKind::TumorSpread, &[0.3, 0.1]).unwrap();
        params.set(&g, ParamKind::LnlSpread, &[0.2]).unwrap();
        let a = transition_matrix(&g, &space, &params);

        for i in 0..space.num_states() {
            for j in 0..space.num_states() {
                if !space.reachable_from(i).contains(&j) {
                    assert_eq!(*a.get(&[i, j]), 0.0);
                }
            }
        }
    }

    #[test]
    fn rows_of_b_sum_to_one() {
        let g = two_lnl_graph(Cardinality::Trinary);
        let space = StateSpace::new(g.k(), g.num_lnls());
        let mut modalities = BTreeMap::new();
        modalities.insert(
            "CT".to_string(),
            Modality::Clinical { sens: 0.81, spec: 0.83 },
        );
        let b = observation_matrix(&space, &modalities);
        for i in 0..space.num_states() {
            let sum: f64 = b.row(i).iter().sum();
            assert!((sum - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn involved_state_is_absorbing_for_binary_graph() {
        let g = two_lnl_graph(Cardinality::Binary);
        let space = StateSpace::new(g.k(), g.num_lnls());
        let mut params = Params::new(&g);
        params.set(&g, ParamKind::TumorSpread, &[0.3, 0.1]).unwrap();
        params.set(&g, ParamKind::LnlSpread, &[0.2]).unwrap();
        let a = transition_matrix(&g, &space, &params);

        let last = space.num_states() - 1;
        assert_eq!(*a.get(&[last, last]), 1.0);
    }
}
