//! Native BLAS dispatch.
//!
//! A per-scalar registry of gemm routines that may service an operation
//! before any kernel is generated. Routines are registered explicitly at
//! startup (host library, device library, or nothing at all) and report
//! through their `bool` return whether they handled the call; `false`
//! means the caller falls back to generated kernels. Every routine here
//! refuses operands with non-unit element strides, since column-major
//! BLAS interfaces cannot express them.

use std::ops::{Add, Mul};

/// A possibly offset, strided, transposed view into a dense allocation.
///
/// `size1`/`size2` are the logical dimensions before transposition;
/// `internal_size1`/`internal_size2` the allocated dimensions; `start`/
/// `inc` select the submatrix along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StridedMatrix {
    pub size1: usize,
    pub size2: usize,
    pub internal_size1: usize,
    pub internal_size2: usize,
    pub start1: usize,
    pub start2: usize,
    pub inc1: usize,
    pub inc2: usize,
    pub row_major: bool,
    pub transposed: bool,
}

impl StridedMatrix {
    /// A plain full-extent view.
    pub fn dense(size1: usize, size2: usize, row_major: bool, transposed: bool) -> Self {
        Self {
            size1,
            size2,
            internal_size1: size1,
            internal_size2: size2,
            start1: 0,
            start2: 0,
            inc1: 1,
            inc2: 1,
            row_major,
            transposed,
        }
    }

    pub fn unit_strides(&self) -> bool {
        self.inc1 == 1 && self.inc2 == 1
    }

    /// Linear index of logical element (i, j), transposition applied.
    pub fn index(&self, i: usize, j: usize) -> usize {
        let (si, sj) = if self.transposed { (j, i) } else { (i, j) };
        let p1 = self.start1 + si * self.inc1;
        let p2 = self.start2 + sj * self.inc2;
        if self.row_major {
            p1 * self.internal_size2 + p2
        } else {
            p2 * self.internal_size1 + p1
        }
    }
}

/// Transpose argument of a column-major BLAS call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlasTranspose {
    NoTrans,
    Trans,
}

impl BlasTranspose {
    fn flipped(self) -> Self {
        match self {
            BlasTranspose::NoTrans => BlasTranspose::Trans,
            BlasTranspose::Trans => BlasTranspose::NoTrans,
        }
    }
}

/// One operand folded down to what a column-major BLAS call consumes:
/// leading dimension, element offset, and the transpose flag (plus its
/// negation, used when the call order of A and B is swapped for a
/// row-major result).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlasOperand {
    pub ld: usize,
    pub off: usize,
    pub trans: BlasTranspose,
    pub negtrans: BlasTranspose,
}

impl BlasOperand {
    pub fn fold(m: &StridedMatrix) -> Self {
        let trans = if !(m.transposed ^ m.row_major) {
            BlasTranspose::Trans
        } else {
            BlasTranspose::NoTrans
        };
        Self {
            ld: if m.row_major {
                m.inc1 * m.internal_size2
            } else {
                m.inc2 * m.internal_size1
            },
            off: if m.row_major {
                m.start1 * m.internal_size2 + m.start2
            } else {
                m.start2 * m.internal_size1 + m.start1
            },
            trans,
            negtrans: trans.flipped(),
        }
    }
}

/// The C = alpha * op(A) * op(B) + beta * C problem description; the
/// operand descriptors carry layout, offsets, and strides.
#[derive(Debug, Clone, Copy)]
pub struct GemmProblem<T> {
    pub m: usize,
    pub n: usize,
    pub k: usize,
    pub alpha: T,
    pub beta: T,
    pub a: StridedMatrix,
    pub b: StridedMatrix,
    pub c: StridedMatrix,
}

/// A registered gemm routine. Returns whether it serviced the call.
pub type GemmFn<T> = fn(&GemmProblem<T>, &[T], &[T], &mut [T]) -> bool;

/// Which kind of routine is currently registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlasBackend {
    #[default]
    None,
    Host,
    Device,
}

/// Per-scalar gemm registry.
#[derive(Debug, Clone, Copy)]
pub struct BlasDispatch<T> {
    backend: BlasBackend,
    gemm: Option<GemmFn<T>>,
}

impl<T> Default for BlasDispatch<T> {
    fn default() -> Self {
        Self {
            backend: BlasBackend::None,
            gemm: None,
        }
    }
}

impl<T> BlasDispatch<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_gemm(&mut self, backend: BlasBackend, f: GemmFn<T>) {
        self.backend = backend;
        self.gemm = Some(f);
    }

    pub fn clear(&mut self) {
        self.backend = BlasBackend::None;
        self.gemm = None;
    }

    pub fn backend(&self) -> BlasBackend {
        self.backend
    }

    /// Try to service the call with the registered routine. `false`
    /// (nothing registered, a non-unit stride, or the routine declining)
    /// means the caller must fall back to a generated kernel.
    pub fn try_gemm(&self, problem: &GemmProblem<T>, a: &[T], b: &[T], c: &mut [T]) -> bool {
        let Some(f) = self.gemm else {
            return false;
        };
        if !problem.a.unit_strides() || !problem.b.unit_strides() || !problem.c.unit_strides() {
            return false;
        }
        f(problem, a, b, c)
    }
}

/// Reference host gemm over strided views. Registered as the `Host`
/// backend; correct for any layout combination, fast for none.
pub fn host_gemm<T>(problem: &GemmProblem<T>, a: &[T], b: &[T], c: &mut [T]) -> bool
where
    T: Copy + Default + Add<Output = T> + Mul<Output = T>,
{
    for i in 0..problem.m {
        for j in 0..problem.n {
            let mut acc = T::default();
            for l in 0..problem.k {
                acc = acc + a[problem.a.index(i, l)] * b[problem.b.index(l, j)];
            }
            let ci = problem.c.index(i, j);
            c[ci] = problem.alpha * acc + problem.beta * c[ci];
        }
    }
    true
}
