//! CUDA C templates for the blocked matrix-vector reduction.
//!
//! Work decomposition: each block is `local_size2` reduction lanes by
//! `local_size1` output rows, `num_groups` blocks stride over the output
//! vector. Every lane accumulates a strided partial dot product into a
//! padded shared scratch row, then a tree reduction over the lane
//! dimension produces one output element per row.
//!
//! When the reduction walks the matrix along its storage-contiguous axis
//! the inner loads are widened to `float2/float4/double2/double4`;
//! otherwise the vector width becomes an unroll factor over strided
//! scalar loads.

use crate::core::profile::VectorReductionProfile;
use crate::core::statement::{OperationShape, ScalarKind, Statement};
use crate::emitter::KernelSource;

fn entry_name(shape: OperationShape, scalar: ScalarKind) -> &'static str {
    match (shape, scalar) {
        (OperationShape::VectorReduceNx, ScalarKind::F32) => "gemv_nx_f32",
        (OperationShape::VectorReduceNx, ScalarKind::F64) => "gemv_nx_f64",
        (OperationShape::VectorReduceTx, ScalarKind::F32) => "gemv_tx_f32",
        (OperationShape::VectorReduceTx, ScalarKind::F64) => "gemv_tx_f64",
    }
}

/// The per-row partial-sum loop. Contiguity and vector width select one
/// of three bodies; all of them consume exactly `red_dim` products per
/// output row.
fn accumulation_body(statement: &Statement, profile: &VectorReductionProfile) -> String {
    let ty = statement.scalar.c_type();
    if statement.contiguous_reduction() {
        if profile.vector_width == 1 {
            return "\
            for (int r = lane; r < red_dim; r += LS2)
                sum += a[(size_t)row * lda + r] * x[r];"
                .to_string();
        }
        let vt = format!("{}{}", ty, profile.vector_width);
        let dot = match profile.vector_width {
            2 => "av_r.x * xv_r.x + av_r.y * xv_r.y",
            _ => "av_r.x * xv_r.x + av_r.y * xv_r.y + av_r.z * xv_r.z + av_r.w * xv_r.w",
        };
        format!(
            "\
            const {vt}* av = reinterpret_cast<const {vt}*>(a + (size_t)row * lda);
            const {vt}* xv = reinterpret_cast<const {vt}*>(x);
            for (int r = lane; r < red_dim / VWIDTH; r += LS2) {{
                const {vt} av_r = av[r];
                const {vt} xv_r = xv[r];
                sum += {dot};
            }}"
        )
    } else {
        // Strided loads cannot be widened; the width unrolls the loop
        // instead. The validated divisibility of red_dim keeps r + u in
        // bounds whenever r is.
        "\
            for (int r = lane * VWIDTH; r < red_dim; r += LS2 * VWIDTH) {
#pragma unroll
                for (int u = 0; u < VWIDTH; ++u)
                    sum += a[(size_t)(r + u) * lda + row] * x[r + u];
            }"
        .to_string()
    }
}

pub(crate) fn instantiate(statement: &Statement, profile: &VectorReductionProfile) -> KernelSource {
    let ty = statement.scalar.c_type();
    let entry = entry_name(statement.shape(), statement.scalar);
    let body = accumulation_body(statement, profile);
    let source = format!(
        r#"#define LS1 {ls1}
#define LS2 {ls2}
#define VWIDTH {vw}

extern "C" __global__ void {entry}(
    const {ty}* __restrict__ a,
    const {ty}* __restrict__ x,
    {ty}* __restrict__ y,
    int out_dim,
    int red_dim,
    int lda)
{{
    extern __shared__ unsigned char scratch_raw[];
    {ty}* scratch = reinterpret_cast<{ty}*>(scratch_raw);
    const int lane = threadIdx.x;
    const int local_row = threadIdx.y;
    const int slot = local_row * (LS2 + 1) + lane;

    for (int base = blockIdx.x * LS1; base < out_dim; base += gridDim.x * LS1) {{
        const int row = base + local_row;
        {ty} sum = ({ty})0;
        if (row < out_dim) {{
{body}
        }}
        scratch[slot] = sum;
        __syncthreads();
        for (int s = LS2 / 2; s > 0; s >>= 1) {{
            if (lane < s)
                scratch[slot] += scratch[slot + s];
            __syncthreads();
        }}
        if (lane == 0 && row < out_dim)
            y[row] = scratch[local_row * (LS2 + 1)];
        __syncthreads();
    }}
}}
"#,
        ls1 = profile.local_size1,
        ls2 = profile.local_size2,
        vw = profile.vector_width,
    );

    KernelSource {
        module_name: format!(
            "{entry}_v{}_l{}x{}_g{}",
            profile.vector_width, profile.local_size1, profile.local_size2, profile.num_groups
        ),
        entry,
        source,
        grid: (profile.num_groups, 1, 1),
        block: (profile.local_size2, profile.local_size1, 1),
        shared_mem_bytes: profile.local_mem_bytes(statement.scalar.size()) as u32,
    }
}
