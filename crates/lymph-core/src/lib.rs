//! Probabilistic inference over a directed graph of tumor and lymph-node-level
//! (LNL) nodes, modeling how disease spreads through a patient's lymphatic
//! drainage.
//!
//! The engine enumerates the hidden state space over LNLs, assembles a
//! state-transition matrix `A` and an observation matrix `B` from a small set
//! of per-edge spread parameters, compresses a patient cohort down to
//! per-T-stage marginalization matrices, and answers log-likelihood,
//! posterior, and risk queries against either a single [`model::Unilateral`]
//! side or a [`bilateral::Bilateral`] pair.

pub mod bilateral;
pub mod data;
pub mod edge_tensor;
pub mod evolution;
pub mod graph;
pub mod matrices;
pub mod modality;
pub mod model;
pub mod params;
pub mod state_space;

pub use bilateral::{Bilateral, BilateralPatientRow, Side, SymmetryFlags};
pub use data::{compress, default_t_stage_mapper, PatientRow, PatientTable, RawPatientRow, TStageMapper};
pub use evolution::DiagnoseTimeDistribution;
pub use graph::{Cardinality, Edge, EdgeKind, Graph, Node, NodeKind, NodeSpec};
pub use modality::Modality;
pub use model::{InvolvementPattern, StageMode, Unilateral};
pub use params::ParamKind;
pub use state_space::StateSpace;
