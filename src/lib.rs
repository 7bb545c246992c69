//! # mvtune: Empirical Matrix-Vector Product Autotuner
//!
//! mvtune searches a discrete space of kernel execution profiles for the
//! matrix-vector product (GEMV) — non-transposed and transposed, single
//! and double precision — and reports the fastest profile measured on a
//! real device.
//!
//! ## Core Modules
//!
//! - **[`core`]**: Search intervals, the Cartesian configuration space,
//!   execution profiles and their device-limit validation, the statement
//!   under test, and device capability snapshots.
//! - **[`emitter`]**: Generates CUDA C kernel source from a profile.
//! - **[`runtime`]**: Device handles, NVRTC compilation, launches.
//! - **[`optimizer`]**: The sweep driver, benchmark backends, and the
//!   ranked result log.
//! - **[`blas`]**: Registry of native gemm routines that may service an
//!   operation before any kernel is generated.

pub mod blas;
pub mod core;
pub mod emitter;
pub mod error;
pub mod optimizer;
pub mod runtime;

pub use crate::core::{
    DeviceDescriptor, Interval, ScalarKind, Statement, TuningConfigurationSpace,
    VectorReductionProfile,
};
pub use crate::error::{BenchError, TuneError};
pub use crate::optimizer::benchmark::{DeviceBenchmark, ProfileBenchmark, SimulatedBenchmark};
pub use crate::optimizer::report::{ResultLog, TimingRecord};
pub use crate::optimizer::Autotuner;
