//! Core data model: intervals, the configuration space, profiles, the
//! statement under test, and device capability snapshots.

pub mod device;
pub mod interval;
pub mod profile;
pub mod space;
pub mod statement;

pub use device::DeviceDescriptor;
pub use interval::Interval;
pub use profile::VectorReductionProfile;
pub use space::{ParameterAssignment, TuningConfigurationSpace, TuningParameter};
pub use statement::{ForcedProfileKey, OperationShape, ScalarKind, Statement};
