//! GEMV autotuning binary.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Parser;

use mvtune::optimizer::report::{self, ResultLog};
use mvtune::runtime::DeviceContext;
use mvtune::{
    Autotuner, DeviceBenchmark, Interval, ScalarKind, Statement, TuningConfigurationSpace,
};

/// Problem size used for all measurements, matching the reference
/// tuning setup.
const SIZE: usize = 2048;

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum Layout {
    /// y = A * x
    Nx,
    /// y = A^T * x
    Tx,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum ScalarType {
    Float,
    Double,
}

#[derive(Parser)]
#[command(name = "tuner")]
#[command(about = "Empirical autotuner for matrix-vector product kernels")]
#[command(version)]
struct Cli {
    /// Layout to tune the hardware for
    #[arg(short, long, default_value = "nx")]
    layout: Layout,

    /// Scalartype to tune the hardware for
    #[arg(short, long, default_value = "float")]
    scalartype: ScalarType,

    /// Name of the output data file
    #[arg(short, long, default_value = "gemv_autotuning.dat")]
    output: PathBuf,

    /// ID of the device to use for the autotuning procedure
    #[arg(short, long, default_value_t = 0)]
    device: usize,

    /// Vector type used in the kernel. Specify min,max both powers of two.
    #[arg(long, default_value = "1,1")]
    vector: String,

    /// Number of work-item rows in each work-group. Specify min,max both
    /// powers of two.
    #[arg(long = "local-size-1", default_value = "2,64")]
    local_size_1: String,

    /// Number of work-item columns in each work-group. Specify min,max
    /// both powers of two.
    #[arg(long = "local-size-2", default_value = "2,64")]
    local_size_2: String,

    /// Number of work groups required. Specify min,max,increment.
    #[arg(long = "num-groups", default_value = "1,1024,16")]
    num_groups: String,

    /// Timed launches per candidate; the minimum is reported.
    #[arg(short, long, default_value_t = 10)]
    repetitions: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let scalar = match cli.scalartype {
        ScalarType::Float => ScalarKind::F32,
        ScalarType::Double => ScalarKind::F64,
    };
    let transposed = matches!(cli.layout, Layout::Tx);
    let statement = Statement::gemv(SIZE, SIZE, true, transposed, scalar);

    let vector = Interval::parse_pow2(&cli.vector)?;
    let local_size_1 = Interval::parse_pow2(&cli.local_size_1)?;
    let local_size_2 = Interval::parse_pow2(&cli.local_size_2)?;
    let num_groups = Interval::parse_stepped(&cli.num_groups)?;

    let mut space = TuningConfigurationSpace::new();
    space.add_parameter("vector", vector.expand())?;
    space.add_parameter("local_size1", local_size_1.expand())?;
    space.add_parameter("local_size2", local_size_2.expand())?;
    space.add_parameter("num_groups", num_groups.expand())?;

    let device = DeviceContext::open(cli.device)?;
    let descriptor = device.descriptor().clone();

    println!("-------------------");
    println!("{descriptor}");
    println!("Operation : GEMV");
    println!("-------------------");
    println!("layout : {}", statement.shape());
    println!("scalartype : {}", statement.scalar);
    println!("vector : [{}]", cli.vector);
    println!("local size 1 : [{}]", cli.local_size_1);
    println!("local size 2 : [{}]", cli.local_size_2);
    println!("number of groups : [{}]", cli.num_groups);
    println!("-------------------");

    let sink = BufWriter::new(File::create(&cli.output)?);
    let mut log = ResultLog::with_sink(Box::new(sink));
    let mut bench = DeviceBenchmark::new(device, &statement)?;
    let tuner = Autotuner::new(descriptor.clone(), cli.repetitions);
    let best = tuner.sweep(&statement, &space, &mut bench, &mut log)?;

    println!();
    println!(" ============");
    println!(
        " Best Profile : {:.9e} => {}",
        best.duration.as_secs_f64(),
        best.profile
    );
    println!(" ============");
    println!();

    let summary_path = cli.output.with_extension("json");
    let summary = File::create(&summary_path)?;
    report::write_summary(summary, &statement, &descriptor, log.len(), &best)?;
    println!("Summary written to {}", summary_path.display());

    Ok(())
}
