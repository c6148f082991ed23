//! Error types shared across the `lymph-*` crates.

use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};
use std::ops::Deref;

pub type LymphResult<T> = Result<T, LymphError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrString(Cow<'static, str>);

impl AsRef<str> for ErrString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ErrString {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for ErrString {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<T: Into<Cow<'static, str>>> From<T> for ErrString {
    fn from(v: T) -> Self {
        Self(v.into())
    }
}

/// Malformed graph description caught during construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A node was connected to itself outside of an implicit growth edge.
    SelfLoop { node: ErrString },
    /// The same neighbor appeared twice in one node's connection list.
    DuplicateNeighbor { node: ErrString, neighbor: ErrString },
    /// A node name was declared more than once.
    DuplicateName { name: ErrString },
    /// A connection list referenced a name that is not a node in the graph.
    UnknownNeighbor { node: ErrString, neighbor: ErrString },
}

impl Display for GraphError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfLoop { node } => write!(f, "node '{node}' is connected to itself"),
            Self::DuplicateNeighbor { node, neighbor } => write!(
                f,
                "node '{node}' lists neighbor '{neighbor}' more than once"
            ),
            Self::DuplicateName { name } => write!(f, "duplicate node name '{name}'"),
            Self::UnknownNeighbor { node, neighbor } => write!(
                f,
                "node '{node}' references unknown neighbor '{neighbor}'"
            ),
        }
    }
}

/// Errors surfaced by the `lymph-*` crates.
///
/// Structural errors (this enum) always propagate to the caller. Numerical
/// invalidity (out-of-range spread probabilities, diagnose times beyond
/// `t_max`) is never raised as an error; it is absorbed into likelihood
/// return values as `f64::NEG_INFINITY`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LymphError {
    /// Malformed graph: cycles through self, duplicate names, invalid edges.
    Graph(GraphError),
    /// Shape mismatch on parameter assignment, invalid T-stage, sp/sn out of range.
    InvalidArgument(ErrString),
    /// Operation requires data loaded but none is present.
    State(ErrString),
}

impl From<GraphError> for LymphError {
    fn from(e: GraphError) -> Self {
        LymphError::Graph(e)
    }
}

impl Display for LymphError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Graph(e) => write!(f, "graph error: {e}"),
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::State(msg) => write!(f, "invalid state: {msg}"),
        }
    }
}

impl std::error::Error for LymphError {}
