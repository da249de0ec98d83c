// decanter-eval/src/lib.rs
//
// Detection-performance evaluation for DECANTeR, passive HTTP application
// fingerprinting.
//
// The detector hands over the fingerprints it flagged (alerts), the ones it
// let through (benign) and per-fingerprint observation timestamps. This crate
// turns that into confusion matrices with and without simulated operator
// retraining, plus a timestamp audit trail for every true positive.

pub mod config;
pub mod dataset;
pub mod error;
pub mod eval;
pub mod fingerprint;
pub mod similarity;

pub use error::{EvalError, OracleError, Phase};
pub use eval::{EvalInput, EvaluationEngine};
pub use fingerprint::{AppLabel, FingerprintId, FingerprintRecord, GroundTruth, HostCount};
pub use similarity::{DecanterSimilarity, SimilarityOracle};
