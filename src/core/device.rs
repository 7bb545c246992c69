//! Device capability snapshots.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Capability snapshot of one compute device, queried once per run.
/// All limit checks in profile validation read from this value; no
/// component touches a global "current device".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub name: String,
    pub index: usize,
    pub max_threads_per_block: u32,
    pub shared_mem_per_block: usize,
    pub warp_size: u32,
    pub multiprocessor_count: u32,
}

impl DeviceDescriptor {
    /// Fixed profile of a common desktop part, for tests that must run
    /// without a physical device.
    pub fn rtx3070() -> Self {
        Self {
            name: "NVIDIA GeForce RTX 3070".to_string(),
            index: 0,
            max_threads_per_block: 1024,
            shared_mem_per_block: 48 * 1024,
            warp_size: 32,
            multiprocessor_count: 46,
        }
    }

    pub fn a100() -> Self {
        Self {
            name: "NVIDIA A100-SXM4-40GB".to_string(),
            index: 0,
            max_threads_per_block: 1024,
            shared_mem_per_block: 48 * 1024,
            warp_size: 32,
            multiprocessor_count: 108,
        }
    }

    /// A deliberately tiny device used to exercise rejection paths.
    pub fn constrained(max_threads: u32, shared_mem: usize) -> Self {
        Self {
            name: "constrained-test-device".to_string(),
            index: 0,
            max_threads_per_block: max_threads,
            shared_mem_per_block: shared_mem,
            warp_size: 32,
            multiprocessor_count: 1,
        }
    }
}

impl fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (device {}): {} threads/block, {} bytes local memory, {} SMs",
            self.name,
            self.index,
            self.max_threads_per_block,
            self.shared_mem_per_block,
            self.multiprocessor_count
        )
    }
}
