use crate::error::TensorError;
use crate::shape::{Shape, Strides};
use std::fmt::Debug;

/// Row-major dense tensor. Data lives in a contiguous `Vec<T>`; `shape` and
/// `strides` describe how to interpret it. Used for the per-edge transition
/// tensor (rank 3), the state-transition matrix `A` and observation matrix
/// `B` (rank 2), and the per-stage marginalization matrix `C` (rank 2).
#[derive(Clone, Default)]
pub struct Tensor<T> {
    data: Vec<T>,
    shape: Shape,
    strides: Strides,
}

impl<T> Tensor<T> {
    pub fn new(data: Vec<T>, shape: impl Into<Shape>) -> Self {
        Self::try_new(data, shape).unwrap_or_else(|e| panic!("Tensor::new: {e}"))
    }

    pub fn try_new(data: Vec<T>, shape: impl Into<Shape>) -> Result<Self, TensorError> {
        let shape = shape.into();
        let strides = Strides::from(&shape);

        let expected = shape.try_size().ok_or_else(|| TensorError::ShapeOverflow {
            dims: shape.as_slice().to_vec(),
        })?;

        if data.len() != expected {
            return Err(TensorError::LenMismatch {
                len: data.len(),
                expected,
            });
        }

        Ok(Self {
            data,
            shape,
            strides,
        })
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.shape.dimensions()
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        self.shape.as_slice()
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[inline]
    pub fn strides(&self) -> &Strides {
        &self.strides
    }

    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flatten a full multi-index (one coordinate per axis) into the data offset.
    #[inline]
    pub fn index_of(&self, idx: &[usize]) -> usize {
        debug_assert_eq!(idx.len(), self.shape.dimensions());
        let mut flat = 0usize;
        for (axis, &i) in idx.iter().enumerate() {
            flat += i * self.strides.stride_at(axis);
        }
        flat
    }

    #[inline]
    pub fn get(&self, idx: &[usize]) -> &T {
        &self.data[self.index_of(idx)]
    }

    #[inline]
    pub fn get_mut(&mut self, idx: &[usize]) -> &mut T {
        let flat = self.index_of(idx);
        &mut self.data[flat]
    }
}

impl<T: Clone> Tensor<T> {
    pub fn from_elem(shape: impl Into<Shape>, value: T) -> Self {
        let shape = shape.into();
        let n = shape
            .try_size()
            .unwrap_or_else(|| panic!("Tensor::from_elem: shape size overflow"));
        Self::new(vec![value; n], shape)
    }
}

impl Tensor<f64> {
    pub fn zeros(shape: impl Into<Shape>) -> Self {
        Self::from_elem(shape, 0.0)
    }

    /// Row `i` of a rank-2 tensor (matrix). Panics if not rank 2.
    pub fn row(&self, i: usize) -> &[f64] {
        assert_eq!(self.rank(), 2, "row() requires a rank-2 tensor");
        let cols = self.dims()[1];
        let start = i * self.strides().stride_at(0);
        &self.data()[start..start + cols]
    }

    pub fn row_mut(&mut self, i: usize) -> &mut [f64] {
        assert_eq!(self.rank(), 2, "row_mut() requires a rank-2 tensor");
        let cols = self.dims()[1];
        let stride0 = self.strides().stride_at(0);
        let start = i * stride0;
        &mut self.data_mut()[start..start + cols]
    }

    /// Sum of each row; length equals the number of rows.
    pub fn row_sums(&self) -> Vec<f64> {
        assert_eq!(self.rank(), 2);
        (0..self.dims()[0])
            .map(|i| self.row(i).iter().sum())
            .collect()
    }

    /// `out[j] = sum_i lhs[i] * self[i][j]`: left-multiply a row vector by this matrix.
    pub fn vec_mul(&self, lhs: &[f64]) -> Vec<f64> {
        assert_eq!(self.rank(), 2);
        let (rows, cols) = (self.dims()[0], self.dims()[1]);
        assert_eq!(lhs.len(), rows);
        let mut out = vec![0.0; cols];
        for i in 0..rows {
            let li = lhs[i];
            if li == 0.0 {
                continue;
            }
            let row = self.row(i);
            for j in 0..cols {
                out[j] += li * row[j];
            }
        }
        out
    }

    /// Dense matrix product `self (m x k) * rhs (k x n) -> (m x n)`.
    pub fn matmul(&self, rhs: &Tensor<f64>) -> Result<Tensor<f64>, TensorError> {
        assert_eq!(self.rank(), 2);
        assert_eq!(rhs.rank(), 2);
        let (m, k) = (self.dims()[0], self.dims()[1]);
        let (k2, n) = (rhs.dims()[0], rhs.dims()[1]);
        if k != k2 {
            return Err(TensorError::DimMismatch {
                axis: 1,
                got: k2,
                expected: k,
            });
        }

        let mut out = Tensor::zeros((m, n));
        for i in 0..m {
            let lrow = self.row(i);
            let orow = out.row_mut(i);
            for (t, &l) in lrow.iter().enumerate() {
                if l == 0.0 {
                    continue;
                }
                let rrow = rhs.row(t);
                for j in 0..n {
                    orow[j] += l * rrow[j];
                }
            }
        }
        Ok(out)
    }
}

impl<T: Debug> Debug for Tensor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tensor(shape={:?}, data={:?})", self.shape.as_slice(), self.data)
    }
}
