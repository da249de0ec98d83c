// decanter-eval/src/eval/timestamps.rs
//
// Timestamp audit trail for true-positive alerts.
//
// For every malicious alert (in alert order) both timestamp indexes are
// consulted and every occurrence is appended as-is: no dedup, index order kept.
// A true positive without an index entry is an error, never an empty list,
// otherwise the artifact would silently under-report.
//
// Each sequence is written to its own artifact, a JSON array of RFC 3339
// timestamps:
//   <output>/timestamps_with_alerts_training.json
//   <output>/timestamps_with_alerts_testing.json

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EvalError, Phase, Result};
use crate::fingerprint::{FingerprintId, FingerprintRecord, Timestamp};

pub const TRAINING_ARTIFACT: &str = "timestamps_with_alerts_training.json";
pub const TESTING_ARTIFACT:  &str = "timestamps_with_alerts_testing.json";

/// Fingerprint identity → every time it was observed in one phase.
pub type TimestampIndex = HashMap<FingerprintId, Vec<Timestamp>>;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertTimestamps {
    pub training: Vec<Timestamp>,
    pub testing:  Vec<Timestamp>,
}

/// Where `AlertTimestamps::persist` put the two artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub training: PathBuf,
    pub testing:  PathBuf,
}

/// Gather the timestamps of every true-positive alert.
pub fn collect<'a>(
    alerts:   impl IntoIterator<Item = &'a FingerprintRecord>,
    training: &TimestampIndex,
    testing:  &TimestampIndex,
) -> Result<AlertTimestamps> {
    let mut out = AlertTimestamps::default();

    for alert in alerts.into_iter().filter(|a| a.is_malicious()) {
        out.training.extend_from_slice(lookup(training, &alert.id, Phase::Training)?);
        out.testing.extend_from_slice(lookup(testing, &alert.id, Phase::Testing)?);
    }

    Ok(out)
}

fn lookup<'i>(index: &'i TimestampIndex, id: &FingerprintId, phase: Phase) -> Result<&'i [Timestamp]> {
    index.get(id)
        .map(Vec::as_slice)
        .ok_or_else(|| EvalError::MissingTimestampRecord { id: id.clone(), phase })
}

impl AlertTimestamps {
    /// Write both artifacts under `dir`, creating it if needed.
    pub fn persist(&self, dir: &Path) -> Result<ArtifactPaths> {
        std::fs::create_dir_all(dir)
            .map_err(|source| EvalError::Persistence { path: dir.to_path_buf(), source })?;

        let paths = ArtifactPaths {
            training: dir.join(TRAINING_ARTIFACT),
            testing:  dir.join(TESTING_ARTIFACT),
        };
        write_timestamps(&paths.training, &self.training)?;
        write_timestamps(&paths.testing, &self.testing)?;

        info!(
            "Wrote {} training / {} testing alert timestamps to {}",
            self.training.len(), self.testing.len(), dir.display()
        );
        Ok(paths)
    }
}

/// Serialize one ordered sequence to `path`. The file handle is dropped (and
/// closed) on every return path; success additionally flushes and syncs it.
pub fn write_timestamps(path: &Path, timestamps: &[Timestamp]) -> Result<()> {
    let fail = |source: std::io::Error| EvalError::Persistence { path: path.to_path_buf(), source };

    let mut w = BufWriter::new(File::create(path).map_err(fail)?);
    serde_json::to_writer(&mut w, timestamps).map_err(|e| fail(e.into()))?;
    w.write_all(b"\n").map_err(fail)?;
    let file = w.into_inner().map_err(|e| fail(e.into_error()))?;
    file.sync_all().map_err(fail)
}

/// Restore a sequence written by `write_timestamps`.
pub fn load_timestamps(path: &Path) -> Result<Vec<Timestamp>> {
    let fail = |source: std::io::Error| EvalError::Persistence { path: path.to_path_buf(), source };

    let r = BufReader::new(File::open(path).map_err(fail)?);
    serde_json::from_reader(r).map_err(|e| fail(e.into()))
}
