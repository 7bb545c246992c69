//! The sweep driver: exhaustive enumeration, validation, generation,
//! measurement, ranking.

pub mod benchmark;
pub mod report;

use log::{debug, info, warn};

use crate::core::device::DeviceDescriptor;
use crate::core::profile::VectorReductionProfile;
use crate::core::space::TuningConfigurationSpace;
use crate::core::statement::Statement;
use crate::emitter;
use crate::error::TuneError;
use crate::optimizer::benchmark::ProfileBenchmark;
use crate::optimizer::report::{ResultLog, TimingRecord};

/// Drives one exhaustive sweep over a configuration space.
///
/// Per candidate: build the profile, gate it on device limits (invalid
/// profiles are expected and skipped silently), generate source, measure,
/// rank. Execution failure of a validated candidate is a warning, not an
/// abort; only a missing template or an empty result set is fatal.
pub struct Autotuner {
    device: DeviceDescriptor,
    repetitions: u32,
}

impl Autotuner {
    pub fn new(device: DeviceDescriptor, repetitions: u32) -> Self {
        Self {
            device,
            repetitions,
        }
    }

    pub fn device(&self) -> &DeviceDescriptor {
        &self.device
    }

    pub fn sweep<B: ProfileBenchmark>(
        &self,
        statement: &Statement,
        space: &TuningConfigurationSpace,
        bench: &mut B,
        log: &mut ResultLog,
    ) -> Result<TimingRecord, TuneError> {
        // Template availability is a property of the whole sweep; check
        // it before touching the first candidate.
        let key = statement.profile_key();
        if !emitter::supports(key) {
            return Err(TuneError::UnsupportedOperation(format!(
                "no template for shape {} with {}-byte scalars",
                key.shape, key.scalar_size
            )));
        }

        let scalar_size = statement.scalar.size();
        let total = space.len();
        info!(
            "sweeping {} candidates for {} ({}) on {}",
            total, key.shape, statement.scalar, self.device.name
        );

        let mut skipped = 0usize;
        for assignment in space.assignments() {
            let profile = VectorReductionProfile::from_assignment(&assignment);
            if profile.is_invalid(&self.device, scalar_size, statement) {
                skipped += 1;
                continue;
            }
            let kernel = emitter::generate(statement, &profile)?;
            match bench.measure(statement, &kernel, &profile, self.repetitions) {
                Ok(duration) => {
                    debug!("{profile}: {duration:?}");
                    log.record(duration, profile)?;
                }
                Err(e) => {
                    warn!("candidate {profile} failed: {e}");
                }
            }
        }

        info!(
            "sweep done: {} measured, {} invalid",
            log.len(),
            skipped
        );
        log.best().cloned().ok_or(TuneError::NoViableProfile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::statement::ScalarKind;
    use crate::core::Interval;
    use crate::optimizer::benchmark::SimulatedBenchmark;

    fn small_space() -> TuningConfigurationSpace {
        let mut space = TuningConfigurationSpace::new();
        space
            .add_parameter("vector", Interval::parse_pow2("1,2").unwrap().expand())
            .unwrap();
        space
            .add_parameter("local_size1", Interval::parse_pow2("2,8").unwrap().expand())
            .unwrap();
        space
            .add_parameter("local_size2", Interval::parse_pow2("2,8").unwrap().expand())
            .unwrap();
        space
            .add_parameter("num_groups", Interval::parse_stepped("16,64,16").unwrap().expand())
            .unwrap();
        space
    }

    #[test]
    fn sweep_finds_a_best_profile() {
        let tuner = Autotuner::new(DeviceDescriptor::rtx3070(), 3);
        let statement = Statement::gemv(2048, 2048, true, false, ScalarKind::F32);
        let mut log = ResultLog::in_memory();
        let best = tuner
            .sweep(
                &statement,
                &small_space(),
                &mut SimulatedBenchmark::new(),
                &mut log,
            )
            .unwrap();
        assert!(!log.is_empty());
        assert_eq!(&best, log.best().unwrap());
        assert!(log.records().iter().all(|r| r.duration >= best.duration));
    }

    #[test]
    fn sweep_is_reproducible_under_deterministic_measurement() {
        let tuner = Autotuner::new(DeviceDescriptor::rtx3070(), 3);
        let statement = Statement::gemv(2048, 2048, true, true, ScalarKind::F64);
        let space = small_space();
        let mut log_a = ResultLog::in_memory();
        let mut log_b = ResultLog::in_memory();
        let a = tuner
            .sweep(&statement, &space, &mut SimulatedBenchmark::new(), &mut log_a)
            .unwrap();
        let b = tuner
            .sweep(&statement, &space, &mut SimulatedBenchmark::new(), &mut log_b)
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(log_a.len(), log_b.len());
    }

    #[test]
    fn all_candidates_invalid_is_no_viable_profile() {
        // 1 thread max: every profile in the space is rejected.
        let tuner = Autotuner::new(DeviceDescriptor::constrained(1, 16), 3);
        let statement = Statement::gemv(64, 64, true, false, ScalarKind::F32);
        let mut log = ResultLog::in_memory();
        let err = tuner
            .sweep(
                &statement,
                &small_space(),
                &mut SimulatedBenchmark::new(),
                &mut log,
            )
            .unwrap_err();
        assert!(matches!(err, TuneError::NoViableProfile));
        assert!(log.is_empty());
    }

    #[test]
    fn invalid_candidates_are_skipped_not_fatal() {
        // Shared memory admits only the smallest scratch shapes; the
        // rest are skipped but the sweep still succeeds.
        let dev = DeviceDescriptor::constrained(1024, 2 * 9 * 4);
        let tuner = Autotuner::new(dev, 3);
        let statement = Statement::gemv(256, 256, true, false, ScalarKind::F32);
        let mut log = ResultLog::in_memory();
        let best = tuner
            .sweep(
                &statement,
                &small_space(),
                &mut SimulatedBenchmark::new(),
                &mut log,
            )
            .unwrap();
        assert!(best.profile.local_size1 * (best.profile.local_size2 + 1) * 4 <= 2 * 9 * 4);
        assert!(log.len() < small_space().len());
    }
}
