//! Result ranking and reporting.

use std::io::Write;
use std::time::Duration;

use serde::Serialize;
use serde_json::json;

use crate::core::device::DeviceDescriptor;
use crate::core::profile::VectorReductionProfile;
use crate::core::statement::Statement;
use crate::error::TuneError;

/// One successful measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimingRecord {
    pub duration: Duration,
    pub profile: VectorReductionProfile,
}

/// Ranked measurements plus an optional incremental results sink.
///
/// Records are kept sorted ascending by duration; ties stay in insertion
/// order and are never dropped. Every recorded measurement is appended
/// to the sink immediately and flushed, so a crashed sweep still leaves
/// all completed measurements on disk.
pub struct ResultLog {
    records: Vec<TimingRecord>,
    sink: Option<Box<dyn Write>>,
}

impl ResultLog {
    pub fn in_memory() -> Self {
        Self {
            records: Vec::new(),
            sink: None,
        }
    }

    pub fn with_sink(sink: Box<dyn Write>) -> Self {
        Self {
            records: Vec::new(),
            sink: Some(sink),
        }
    }

    /// Rank one measurement and append it to the sink.
    ///
    /// Line format: `<seconds:e-notation> <vector> <local_size1>
    /// <local_size2> <num_groups>`, in measurement order (not rank
    /// order).
    pub fn record(
        &mut self,
        duration: Duration,
        profile: VectorReductionProfile,
    ) -> Result<(), TuneError> {
        if let Some(sink) = self.sink.as_mut() {
            writeln!(
                sink,
                "{:.9e} {} {} {} {}",
                duration.as_secs_f64(),
                profile.vector_width,
                profile.local_size1,
                profile.local_size2,
                profile.num_groups
            )?;
            sink.flush()?;
        }
        let at = self
            .records
            .partition_point(|r| r.duration <= duration);
        self.records.insert(at, TimingRecord { duration, profile });
        Ok(())
    }

    /// The fastest measurement so far.
    pub fn best(&self) -> Option<&TimingRecord> {
        self.records.first()
    }

    /// All measurements, ascending by duration.
    pub fn records(&self) -> &[TimingRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Machine-readable summary of a finished sweep.
pub fn write_summary<W: Write>(
    mut w: W,
    statement: &Statement,
    device: &DeviceDescriptor,
    candidates: usize,
    best: &TimingRecord,
) -> Result<(), TuneError> {
    let summary = json!({
        "timestamp": chrono::Local::now().to_rfc3339(),
        "device": device,
        "operation": {
            "shape": statement.shape().to_string(),
            "scalar": statement.scalar.to_string(),
            "rows": statement.matrix.rows,
            "cols": statement.matrix.cols,
        },
        "candidates_measured": candidates,
        "best": {
            "seconds": best.duration.as_secs_f64(),
            "profile": best.profile,
        },
    });
    serde_json::to_writer_pretty(&mut w, &summary)
        .map_err(|e| TuneError::Io(std::io::Error::other(e)))?;
    writeln!(w)?;
    Ok(())
}
