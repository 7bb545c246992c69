//! The abstract linear-algebra statement under test.
//!
//! A statement is read-only for the autotuner: it fixes the operand
//! shapes, the storage layout, and the scalar precision, and thereby
//! selects which code-generation template applies.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar precision tag consumed by the code generator. Replaces the
/// float/double template duplication of classic BLAS-style codebases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalarKind {
    F32,
    F64,
}

impl ScalarKind {
    pub fn size(self) -> usize {
        match self {
            ScalarKind::F32 => 4,
            ScalarKind::F64 => 8,
        }
    }

    /// The C scalar type name used in generated kernel source.
    pub fn c_type(self) -> &'static str {
        match self {
            ScalarKind::F32 => "float",
            ScalarKind::F64 => "double",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarKind::F32 => write!(f, "float"),
            ScalarKind::F64 => write!(f, "double"),
        }
    }
}

/// Which reduction template a statement maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationShape {
    /// y = A * x
    VectorReduceNx,
    /// y = A^T * x
    VectorReduceTx,
}

impl fmt::Display for OperationShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationShape::VectorReduceNx => write!(f, "Nx"),
            OperationShape::VectorReduceTx => write!(f, "Tx"),
        }
    }
}

/// Selects the code-generation template: operation shape plus scalar
/// byte width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ForcedProfileKey {
    pub shape: OperationShape,
    pub scalar_size: usize,
}

/// Matrix operand description: dimensions plus layout flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixOperand {
    pub rows: usize,
    pub cols: usize,
    pub row_major: bool,
    pub transposed: bool,
}

/// The matrix-vector product under test: `y = op(A) * x` where `op` is
/// identity or transpose per the matrix operand's flag. Vector operand
/// lengths are implied by the matrix shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub matrix: MatrixOperand,
    pub scalar: ScalarKind,
}

impl Statement {
    pub fn gemv(
        rows: usize,
        cols: usize,
        row_major: bool,
        transposed: bool,
        scalar: ScalarKind,
    ) -> Self {
        Self {
            matrix: MatrixOperand {
                rows,
                cols,
                row_major,
                transposed,
            },
            scalar,
        }
    }

    /// Length of the output vector y.
    pub fn output_len(&self) -> usize {
        if self.matrix.transposed {
            self.matrix.cols
        } else {
            self.matrix.rows
        }
    }

    /// Length of the reduction (and of the input vector x).
    pub fn reduction_len(&self) -> usize {
        if self.matrix.transposed {
            self.matrix.rows
        } else {
            self.matrix.cols
        }
    }

    /// Leading dimension of the matrix as stored.
    pub fn leading_dim(&self) -> usize {
        if self.matrix.row_major {
            self.matrix.cols
        } else {
            self.matrix.rows
        }
    }

    /// Whether the reduction walks the matrix along its storage-contiguous
    /// axis. Vectorized loads of A are only emitted in this case.
    pub fn contiguous_reduction(&self) -> bool {
        self.matrix.row_major != self.matrix.transposed
    }

    pub fn shape(&self) -> OperationShape {
        if self.matrix.transposed {
            OperationShape::VectorReduceTx
        } else {
            OperationShape::VectorReduceNx
        }
    }

    pub fn profile_key(&self) -> ForcedProfileKey {
        ForcedProfileKey {
            shape: self.shape(),
            scalar_size: self.scalar.size(),
        }
    }
}
