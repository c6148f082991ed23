/// Errors returned by fallible [`crate::Tensor`] constructors and operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TensorError {
    ShapeOverflow { dims: Vec<usize> },
    LenMismatch { len: usize, expected: usize },
    RankMismatch { got: usize, expected: usize },
    DimMismatch { axis: usize, got: usize, expected: usize },
}

impl std::fmt::Display for TensorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TensorError::ShapeOverflow { dims } => {
                write!(f, "shape overflow for dimensions {:?}", dims)
            }
            TensorError::LenMismatch { len, expected } => {
                write!(f, "length mismatch: got {}, expected {}", len, expected)
            }
            TensorError::RankMismatch { got, expected } => {
                write!(f, "rank mismatch: got {}, expected {}", got, expected)
            }
            TensorError::DimMismatch { axis, got, expected } => write!(
                f,
                "dimension mismatch on axis {}: got {}, expected {}",
                axis, got, expected
            ),
        }
    }
}

impl std::error::Error for TensorError {}
