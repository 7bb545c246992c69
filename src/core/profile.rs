//! Execution profiles for the vector-reduction (GEMV) kernel family.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::device::DeviceDescriptor;
use crate::core::space::ParameterAssignment;
use crate::core::statement::Statement;

/// Widest vector type emitted by the code generator (float4 / double4).
pub const MAX_VECTOR_WIDTH: u32 = 4;

/// A fully concrete kernel shape derived from one parameter assignment:
/// each work-group is `local_size1` output rows by `local_size2`
/// reduction lanes, `num_groups` groups stride over the output, and
/// loads are `vector_width` elements wide where the layout permits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VectorReductionProfile {
    pub vector_width: u32,
    pub local_size1: u32,
    pub local_size2: u32,
    pub num_groups: u32,
}

impl VectorReductionProfile {
    pub fn new(vector_width: u32, local_size1: u32, local_size2: u32, num_groups: u32) -> Self {
        Self {
            vector_width,
            local_size1,
            local_size2,
            num_groups,
        }
    }

    /// Total build: any numeric assignment maps to a structurally valid
    /// profile. Missing parameters default to 1; operational validity is
    /// decided separately by [`is_invalid`](Self::is_invalid).
    pub fn from_assignment(assignment: &ParameterAssignment) -> Self {
        Self {
            vector_width: assignment.get("vector").unwrap_or(1),
            local_size1: assignment.get("local_size1").unwrap_or(1),
            local_size2: assignment.get("local_size2").unwrap_or(1),
            num_groups: assignment.get("num_groups").unwrap_or(1),
        }
    }

    /// Threads per work-group. Widened so that bounds far beyond any
    /// device limit still compare cleanly instead of wrapping.
    pub fn workgroup_threads(&self) -> u64 {
        self.local_size1 as u64 * self.local_size2 as u64
    }

    /// Local scratch demand: one row of `local_size2 + 1` slots per
    /// output row (the pad slot avoids bank conflicts in the reduction).
    /// Saturates instead of wrapping; a saturated demand exceeds any
    /// device limit anyway.
    pub fn local_mem_bytes(&self, scalar_size: usize) -> u64 {
        (self.local_size1 as u64)
            .saturating_mul(self.local_size2 as u64 + 1)
            .saturating_mul(scalar_size as u64)
    }

    /// Whether this profile cannot run on `device` for `statement`.
    ///
    /// Invalid profiles are expected and frequent during a sweep; they are
    /// skipped silently before any code generation or device work, since
    /// attempting them can fail device-side compilation or hang the queue.
    /// The predicate is monotonic in resource demand: growing the
    /// work-group or the scratch buffer never turns an invalid profile
    /// valid while device limits stay fixed.
    pub fn is_invalid(
        &self,
        device: &DeviceDescriptor,
        scalar_size: usize,
        statement: &Statement,
    ) -> bool {
        let threads = self.workgroup_threads();
        if threads == 0 || self.num_groups == 0 {
            return true;
        }
        if threads > device.max_threads_per_block as u64 {
            return true;
        }
        if self.local_mem_bytes(scalar_size) > device.shared_mem_per_block as u64 {
            return true;
        }
        // The tree reduction halves the lane count each step and the
        // row/lane split must tile the group exactly.
        if !self.local_size1.is_power_of_two() || !self.local_size2.is_power_of_two() {
            return true;
        }
        // Vectorized loads: power-of-two width up to the widest emitted
        // vector type, evenly dividing the reduction length.
        if !self.vector_width.is_power_of_two() || self.vector_width > MAX_VECTOR_WIDTH {
            return true;
        }
        if statement.reduction_len() % self.vector_width as usize != 0 {
            return true;
        }
        false
    }
}

impl fmt::Display for VectorReductionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "vector={} local_size1={} local_size2={} num_groups={}",
            self.vector_width, self.local_size1, self.local_size2, self.num_groups
        )
    }
}
