//! Per-edge transition tensors.
//!
//! Every edge carries exactly one tensor of shape `(k, k, k)`: axis 0 is the
//! parent's state, axis 1 the child's previous state, axis 2 the child's next
//! state. The parent axis is only ever read at a fixed row for spread edges
//! (row 0), because the parent's actual state is never looked up through this
//! tensor directly — tumor nodes have no entry in the hidden state vector at
//! all, and LNL parents are combined across edges under the independent-failure
//! rule in [`crate::matrices`] rather than through a literal tensor lookup at
//! the parent's state index. Keeping every tensor the same `(k, k, k)` shape
//! regardless of edge kind keeps the assembly code in `matrices.rs` uniform.

use crate::graph::EdgeKind;
use lymph_tensor::Tensor;

/// Builds the transition tensor for one edge.
///
/// `spread_prob` is the edge's own spread probability (tumor/LNL spread) or
/// growth probability. `micro_mod` scales the spread probability for
/// micro-to-macro-capable LNL parents (`k == 3` only) and is ignored
/// otherwise.
pub fn edge_tensor(k: usize, kind: EdgeKind, spread_prob: f64, micro_mod: f64) -> Tensor<f64> {
    let mut t = Tensor::zeros((k, k, k));
    for p in 0..k {
        for c in 0..k {
            *t.get_mut(&[p, c, c]) = 1.0;
        }
    }

    let mut set_row = |t: &mut Tensor<f64>, parent: usize, child_prev: usize, p_advance: f64| {
        for next in 0..k {
            *t.get_mut(&[parent, child_prev, next]) = 0.0;
        }
        *t.get_mut(&[parent, child_prev, child_prev]) = 1.0 - p_advance;
        *t.get_mut(&[parent, child_prev, child_prev + 1]) = p_advance;
    };

    match kind {
        EdgeKind::TumorSpread => {
            // Tumor has no entry in the hidden state; by convention its
            // (constant) contribution lives at parent row 0.
            set_row(&mut t, 0, 0, spread_prob);
        }
        EdgeKind::Growth => {
            debug_assert_eq!(k, 3, "growth edges only exist for trinary graphs");
            set_row(&mut t, 1, 1, spread_prob);
        }
        EdgeKind::LnlSpread => {
            if k == 3 {
                set_row(&mut t, 1, 0, spread_prob * micro_mod);
                set_row(&mut t, 2, 0, spread_prob);
            } else {
                set_row(&mut t, 1, 0, spread_prob);
            }
        }
    }

    t
}
