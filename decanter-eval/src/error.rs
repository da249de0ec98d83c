// decanter-eval/src/error.rs
//
// Error types surfaced by an evaluation run. None of these are retried here;
// the orchestration layer decides what to do with them.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::fingerprint::FingerprintId;

/// Which traffic capture a timestamp index belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Training,
    Testing,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Training => write!(f, "training"),
            Self::Testing  => write!(f, "testing"),
        }
    }
}

/// Raised by a similarity oracle that cannot decide a pair.
#[derive(Error, Debug)]
#[error("similarity check failed for {left} vs {right}: {reason}")]
pub struct OracleError {
    pub left:   FingerprintId,
    pub right:  FingerprintId,
    pub reason: String,
}

#[derive(Error, Debug)]
pub enum EvalError {
    /// A true-positive alert has no entry in one of the timestamp indexes
    #[error("no {phase} timestamp record for fingerprint {id}")]
    MissingTimestampRecord { id: FingerprintId, phase: Phase },

    /// The similarity oracle failed while building the unique set
    #[error("unique fingerprint set aborted: {0}")]
    Oracle(#[from] OracleError),

    /// The unique set handed to the confusion computation holds a record that
    /// is not one of the alerts
    #[error("unique set member {id} is not one of the alerts")]
    UniqueNotInAlerts { id: FingerprintId },

    /// The unique set carries more benign weight than the alerts it came from
    #[error("unique set counts {retrained} false positives, alerts only {fp}")]
    UniqueExceedsAlerts { retrained: u64, fp: u64 },

    /// Writing a timestamp artifact failed
    #[error("failed to persist {}: {source}", path.display())]
    Persistence {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, EvalError>;
