//! Kernel source generation.
//!
//! Each (operation shape, scalar width) pair maps to one CUDA C template;
//! a template instantiated with a concrete profile yields a
//! [`KernelSource`] ready for JIT compilation. Generation is a pure
//! function of its inputs: the same statement and profile always produce
//! byte-identical source.

pub mod gemv;

use crate::core::profile::VectorReductionProfile;
use crate::core::statement::{ForcedProfileKey, OperationShape, Statement};
use crate::error::TuneError;

/// Generated kernel source plus the launch geometry it was built for.
#[derive(Debug, Clone)]
pub struct KernelSource {
    /// Unique module name, one per (shape, scalar, profile) instance.
    pub module_name: String,
    /// Entry point symbol inside the module.
    pub entry: &'static str,
    /// Complete CUDA C translation unit.
    pub source: String,
    pub grid: (u32, u32, u32),
    pub block: (u32, u32, u32),
    pub shared_mem_bytes: u32,
}

/// Whether a code-generation template exists for `key`.
pub fn supports(key: ForcedProfileKey) -> bool {
    matches!(
        (key.shape, key.scalar_size),
        (OperationShape::VectorReduceNx, 4 | 8) | (OperationShape::VectorReduceTx, 4 | 8)
    )
}

/// Instantiate the template selected by the statement's profile key.
///
/// A missing template is a configuration error of the whole sweep, not a
/// property of one candidate, so it is fatal.
pub fn generate(
    statement: &Statement,
    profile: &VectorReductionProfile,
) -> Result<KernelSource, TuneError> {
    let key = statement.profile_key();
    if !supports(key) {
        return Err(TuneError::UnsupportedOperation(format!(
            "no template for shape {} with {}-byte scalars",
            key.shape, key.scalar_size
        )));
    }
    Ok(gemv::instantiate(statement, profile))
}
