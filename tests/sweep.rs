//! End-to-end sweeps against the simulated benchmark, exercising the
//! whole pipeline (expansion, enumeration, validation, generation,
//! measurement, ranking, results file) without a device.

use std::fs;
use std::io::BufWriter;

use mvtune::{
    Autotuner, DeviceDescriptor, Interval, ResultLog, ScalarKind, SimulatedBenchmark, Statement,
    TuneError, TuningConfigurationSpace, VectorReductionProfile,
};

fn gemv_space() -> TuningConfigurationSpace {
    let mut space = TuningConfigurationSpace::new();
    space
        .add_parameter("vector", Interval::parse_pow2("1,4").unwrap().expand())
        .unwrap();
    space
        .add_parameter("local_size1", Interval::parse_pow2("2,16").unwrap().expand())
        .unwrap();
    space
        .add_parameter("local_size2", Interval::parse_pow2("2,16").unwrap().expand())
        .unwrap();
    space
        .add_parameter(
            "num_groups",
            Interval::parse_stepped("16,256,48").unwrap().expand(),
        )
        .unwrap();
    space
}

fn valid_profile_count(
    space: &TuningConfigurationSpace,
    device: &DeviceDescriptor,
    statement: &Statement,
) -> usize {
    space
        .assignments()
        .map(|a| VectorReductionProfile::from_assignment(&a))
        .filter(|p| !p.is_invalid(device, statement.scalar.size(), statement))
        .count()
}

#[test]
fn results_file_has_one_line_per_valid_profile() {
    let device = DeviceDescriptor::rtx3070();
    let statement = Statement::gemv(2048, 2048, true, false, ScalarKind::F32);
    let space = gemv_space();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gemv.dat");
    {
        let sink = BufWriter::new(fs::File::create(&path).unwrap());
        let mut log = ResultLog::with_sink(Box::new(sink));
        let tuner = Autotuner::new(device.clone(), 5);
        tuner
            .sweep(&statement, &space, &mut SimulatedBenchmark::new(), &mut log)
            .unwrap();
    }

    let contents = fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = contents.lines().collect();
    assert_eq!(
        lines.len(),
        valid_profile_count(&space, &device, &statement)
    );
    assert!(!lines.is_empty());
    for line in &lines {
        let fields: Vec<_> = line.split(' ').collect();
        assert_eq!(fields.len(), 5);
        fields[0].parse::<f64>().unwrap();
        for f in &fields[1..] {
            f.parse::<u32>().unwrap();
        }
    }
}

#[test]
fn file_minimum_matches_reported_best() {
    let device = DeviceDescriptor::rtx3070();
    let statement = Statement::gemv(2048, 2048, true, true, ScalarKind::F64);
    let space = gemv_space();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gemv.dat");
    let best = {
        let sink = BufWriter::new(fs::File::create(&path).unwrap());
        let mut log = ResultLog::with_sink(Box::new(sink));
        let tuner = Autotuner::new(device, 5);
        tuner
            .sweep(&statement, &space, &mut SimulatedBenchmark::new(), &mut log)
            .unwrap()
    };

    let contents = fs::read_to_string(&path).unwrap();
    let min_line = contents
        .lines()
        .map(|l| l.split(' ').next().unwrap().parse::<f64>().unwrap())
        .fold(f64::INFINITY, f64::min);
    assert_eq!(min_line, best.duration.as_secs_f64());
}

#[test]
fn best_profile_is_reproducible() {
    let device = DeviceDescriptor::rtx3070();
    let statement = Statement::gemv(2048, 2048, true, false, ScalarKind::F32);
    let space = gemv_space();
    let tuner = Autotuner::new(device, 5);

    let mut log_a = ResultLog::in_memory();
    let mut log_b = ResultLog::in_memory();
    let a = tuner
        .sweep(&statement, &space, &mut SimulatedBenchmark::new(), &mut log_a)
        .unwrap();
    let b = tuner
        .sweep(&statement, &space, &mut SimulatedBenchmark::new(), &mut log_b)
        .unwrap();
    assert_eq!(a, b);
    assert_eq!(log_a.records(), log_b.records());
}

#[test]
fn hostile_device_yields_no_viable_profile_and_empty_file() {
    let device = DeviceDescriptor::constrained(1, 1);
    let statement = Statement::gemv(2048, 2048, true, false, ScalarKind::F32);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gemv.dat");
    let err = {
        let sink = BufWriter::new(fs::File::create(&path).unwrap());
        let mut log = ResultLog::with_sink(Box::new(sink));
        let tuner = Autotuner::new(device, 5);
        tuner
            .sweep(
                &statement,
                &gemv_space(),
                &mut SimulatedBenchmark::new(),
                &mut log,
            )
            .unwrap_err()
    };
    assert!(matches!(err, TuneError::NoViableProfile));
    assert_eq!(fs::read_to_string(&path).unwrap(), "");
}

#[test]
fn odd_reduction_length_prunes_wide_vectors() {
    let device = DeviceDescriptor::rtx3070();
    let statement = Statement::gemv(2048, 1000, true, false, ScalarKind::F32);
    let mut space = TuningConfigurationSpace::new();
    space.add_parameter("vector", vec![1, 2, 3, 4]).unwrap();
    space.add_parameter("local_size1", vec![8]).unwrap();
    space.add_parameter("local_size2", vec![16]).unwrap();
    space.add_parameter("num_groups", vec![64]).unwrap();

    let mut log = ResultLog::in_memory();
    let tuner = Autotuner::new(device, 3);
    tuner
        .sweep(&statement, &space, &mut SimulatedBenchmark::new(), &mut log)
        .unwrap();
    // Width 3 is not a power of two and is skipped; 1, 2, 4 all divide.
    assert_eq!(log.len(), 3);
    assert!(log
        .records()
        .iter()
        .all(|r| [1, 2, 4].contains(&r.profile.vector_width)));
}
