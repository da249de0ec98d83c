// decanter-eval/src/dataset.rs
//
// Loaders for the detector's hand-over files.
//
// Record files are JSONL, one FingerprintRecord per line, in detection order:
//   { "id": "f1", "ground_truth": "malicious", "hosts": [...], ... }
// Blank lines are skipped. Unparseable lines and records with a zero request
// count for some host are logged and skipped in benign files; the alerts file
// must load completely, since a dropped alert changes every metric.
// Records without an "id" get a content-derived one.
//
// Timestamp index files are a single JSON object:
//   { "f1": ["2017-03-20T10:00:00Z", "2017-03-20T10:05:00Z"], ... }

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::eval::{EvalInput, TimestampIndex};
use crate::fingerprint::FingerprintRecord;

/// Records of one JSONL file and the number of non-blank lines dropped.
#[derive(Debug, Default)]
pub struct RecordFile {
    pub records: Vec<FingerprintRecord>,
    pub skipped: usize,
}

pub async fn read_records(path: &Path) -> Result<RecordFile> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading fingerprints from {}", path.display()))?;

    let mut file = RecordFile::default();
    for (n, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() { continue; }
        let mut rec = match serde_json::from_str::<FingerprintRecord>(line) {
            Ok(rec) => rec,
            Err(e) => {
                warn!("{}:{}: skipping fingerprint: {}", path.display(), n + 1, e);
                file.skipped += 1;
                continue;
            }
        };
        if let Some(h) = rec.hosts.iter().find(|h| h.requests == 0) {
            warn!("{}:{}: skipping fingerprint: host {} has zero requests", path.display(), n + 1, h.domain);
            file.skipped += 1;
            continue;
        }
        rec.ensure_id();
        file.records.push(rec);
    }

    if file.skipped > 0 {
        warn!(
            "Skipped {} of {} fingerprint lines in {}",
            file.skipped, file.skipped + file.records.len(), path.display()
        );
    }
    info!("Loaded {} fingerprints from {}", file.records.len(), path.display());
    Ok(file)
}

/// Lenient load: bad lines are dropped with a warning.
pub async fn load_records(path: &Path) -> Result<Vec<FingerprintRecord>> {
    Ok(read_records(path).await?.records)
}

/// Strict load for the alert set: any dropped line fails the run.
pub async fn load_alerts(path: &Path) -> Result<Vec<FingerprintRecord>> {
    let file = read_records(path).await?;
    if file.skipped > 0 {
        bail!("{}: {} alert lines could not be loaded", path.display(), file.skipped);
    }
    Ok(file.records)
}

pub async fn load_index(path: &Path) -> Result<TimestampIndex> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading timestamp index {}", path.display()))?;
    let index: TimestampIndex = serde_json::from_str(&content)
        .with_context(|| format!("parsing timestamp index {}", path.display()))?;

    info!("Loaded {} timestamp entries from {}", index.len(), path.display());
    Ok(index)
}

/// Load one evaluation run. A missing benign file or index means "empty".
pub async fn load_input(
    alerts:   &Path,
    benign:   Option<&Path>,
    training: Option<&Path>,
    testing:  Option<&Path>,
) -> Result<EvalInput> {
    Ok(EvalInput {
        alerts:   load_alerts(alerts).await?,
        benign:   match benign { Some(p) => load_records(p).await?, None => Vec::new() },
        training: match training { Some(p) => load_index(p).await?, None => TimestampIndex::new() },
        testing:  match testing { Some(p) => load_index(p).await?, None => TimestampIndex::new() },
    })
}
