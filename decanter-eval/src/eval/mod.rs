// decanter-eval/src/eval/mod.rs
//
// Evaluation engine: detection performance of a fingerprinting detector.
//
// Input, handed over by the detector after a training/testing run:
//   alerts    fingerprints the detector flagged, in detection order
//   benign    fingerprints it let through
//   training  fingerprint → observation timestamps in the training capture
//   testing   fingerprint → observation timestamps in the testing capture
//
// On construction the engine:
//   1. Builds the unique alert set once (greedy, order-dependent dedup)
//   2. Computes the four confusion matrices (static/retrained × fingerprints/requests)
//   3. Computes fingerprint and request totals
//
// Timestamp collection and persistence run afterwards and may fail on their
// own; metrics and stats stay readable on the engine whatever happens there.

pub mod confusion;
pub mod report;
pub mod stats;
pub mod timestamps;
pub mod unique;

use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::fingerprint::FingerprintRecord;
use crate::similarity::SimilarityOracle;

pub use confusion::{Confusion, DetectionMetrics};
pub use stats::{BucketTotals, FingerprintStats};
pub use timestamps::{AlertTimestamps, ArtifactPaths, TimestampIndex};

/// Everything the detector hands over for one evaluation run.
#[derive(Debug, Default, Clone)]
pub struct EvalInput {
    pub alerts:   Vec<FingerprintRecord>,
    pub benign:   Vec<FingerprintRecord>,
    pub training: TimestampIndex,
    pub testing:  TimestampIndex,
}

pub struct EvaluationEngine {
    input:   EvalInput,
    unique:  Vec<FingerprintRecord>,
    metrics: DetectionMetrics,
    stats:   FingerprintStats,
}

impl EvaluationEngine {
    /// Build the unique set with `oracle` (alerts traversed in received order)
    /// and compute metrics. An oracle failure aborts construction, so an
    /// engine never holds a partial unique set.
    pub fn new<O: SimilarityOracle + ?Sized>(input: EvalInput, oracle: &O) -> Result<Self> {
        let unique: Vec<FingerprintRecord> = unique::build_unique(&input.alerts, oracle)?
            .into_iter()
            .cloned()
            .collect();

        let metrics = confusion::compute(&input.alerts, &input.benign, &unique)?;
        let stats   = stats::summarize(&input.alerts, &input.benign, &unique);

        info!(
            "Evaluated {} alerts ({} unique) and {} benign fingerprints",
            input.alerts.len(), unique.len(), input.benign.len()
        );

        Ok(Self { input, unique, metrics, stats })
    }

    pub fn alerts(&self) -> &[FingerprintRecord] { &self.input.alerts }

    pub fn benign(&self) -> &[FingerprintRecord] { &self.input.benign }

    /// Residual alerting surface after retraining, in first-occurrence order.
    pub fn unique(&self) -> &[FingerprintRecord] { &self.unique }

    pub fn metrics(&self) -> &DetectionMetrics { &self.metrics }

    pub fn stats(&self) -> &FingerprintStats { &self.stats }

    /// Training/testing timestamps of every true-positive alert.
    pub fn alert_timestamps(&self) -> Result<AlertTimestamps> {
        timestamps::collect(&self.input.alerts, &self.input.training, &self.input.testing)
    }

    /// Collect the true-positive timestamps and write both artifacts to `dir`.
    pub fn persist_alert_timestamps(&self, dir: &Path) -> Result<ArtifactPaths> {
        self.alert_timestamps()?.persist(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EvalError, OracleError, Phase};
    use crate::fingerprint::{FingerprintId, GroundTruth::{Benign, Malicious}};
    use crate::similarity::oracle_fn;
    use chrono::{TimeZone, Utc};

    fn sample() -> EvalInput {
        let t = |s: i64| Utc.timestamp_opt(1_500_000_000 + s, 0).unwrap();
        EvalInput {
            alerts: vec![
                FingerprintRecord::new("rec1", Malicious, [("x.com", 3)]),
                FingerprintRecord::new("rec2", Benign,    [("y.com", 2)]),
            ],
            benign: vec![FingerprintRecord::new("rec3", Benign, [("z.com", 5)])],
            training: [(FingerprintId::from("rec1"), vec![t(1), t(2)])].into_iter().collect(),
            testing:  [(FingerprintId::from("rec1"), vec![t(3)])].into_iter().collect(),
        }
    }

    #[test]
    fn test_engine_exposes_all_results() {
        let engine = EvaluationEngine::new(sample(), &oracle_fn(|_, _| false)).unwrap();
        assert_eq!(engine.unique().len(), 2);
        assert_eq!(engine.metrics().fingerprints, Confusion { tp: 1, fp: 1, tn: 1, fn_: 0 });
        assert_eq!(engine.metrics().requests,     Confusion { tp: 3, fp: 2, tn: 5, fn_: 0 });
        assert_eq!(engine.stats().unique, BucketTotals { fingerprints: 2, requests: 5 });

        let stamps = engine.alert_timestamps().unwrap();
        assert_eq!(stamps.training.len(), 2);
        assert_eq!(stamps.testing.len(), 1);
    }

    #[test]
    fn test_missing_timestamps_leave_metrics_readable() {
        let mut input = sample();
        input.training.clear();
        let engine = EvaluationEngine::new(input, &oracle_fn(|_, _| false)).unwrap();

        let err = engine.alert_timestamps().unwrap_err();
        assert!(matches!(err, EvalError::MissingTimestampRecord { phase: Phase::Training, .. }));
        assert_eq!(engine.metrics().fingerprints.tp, 1);
        assert_eq!(engine.stats().alerts.fingerprints, 2);
    }

    #[test]
    fn test_oracle_failure_prevents_engine() {
        struct Broken;
        impl SimilarityOracle for Broken {
            fn check(&self, a: &FingerprintRecord, b: &FingerprintRecord)
                -> std::result::Result<bool, OracleError>
            {
                Err(OracleError { left: a.id.clone(), right: b.id.clone(), reason: "timeout".into() })
            }
        }
        let err = EvaluationEngine::new(sample(), &Broken).err().unwrap();
        assert!(matches!(err, EvalError::Oracle(_)));
    }

    #[test]
    fn test_repeated_runs_identical() {
        let oracle = oracle_fn(|a, b| a.ground_truth == b.ground_truth);
        let first  = EvaluationEngine::new(sample(), &oracle).unwrap();
        let second = EvaluationEngine::new(sample(), &oracle).unwrap();
        assert_eq!(first.unique(), second.unique());
        assert_eq!(first.metrics(), second.metrics());
    }

    #[test]
    fn test_persistence_failure_keeps_results() {
        let dir  = tempfile::tempdir().unwrap();
        let file = dir.path().join("not_a_dir");
        std::fs::write(&file, b"x").unwrap();

        let engine = EvaluationEngine::new(sample(), &oracle_fn(|_, _| false)).unwrap();
        let err = engine.persist_alert_timestamps(&file).unwrap_err();
        assert!(matches!(err, EvalError::Persistence { .. }));
        assert_eq!(engine.metrics().fingerprints_retrained.fp, 1);
    }
}
