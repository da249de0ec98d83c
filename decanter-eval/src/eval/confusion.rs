// decanter-eval/src/eval/confusion.rs
//
// Confusion matrices under two regimes and two granularities.
//
//   Static     the detector never learns; every repeat of a false-positive
//              fingerprint alerts again.
//   Retrained  an operator trusts each distinct false positive the first time
//              it alerts. Every later alert that the unique-set builder folded
//              into an already-seen fingerprint becomes a true negative.
//
//   Fingerprint granularity counts records; request granularity counts the
//   HTTP requests each record clusters (sum of per-host request counts).
//
// Retraining only moves false positives into true negatives:
//   retrained.tn + retrained.fp == static.tn + static.fp

use serde::Serialize;

use crate::error::{EvalError, Result};
use crate::fingerprint::FingerprintRecord;

// ── Counters ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Confusion {
    pub tp:  u64,  // alert, malicious
    pub fp:  u64,  // alert, benign
    pub tn:  u64,  // not flagged, benign
    #[serde(rename = "fn")]
    pub fn_: u64,  // not flagged, malicious
}

impl Confusion {
    /// Apply the retraining model: `retrained_fp` distinct false positives
    /// still alert once, the rest of the static false positives convert.
    /// `None` when `retrained_fp` exceeds the static false positives.
    pub fn retrained(&self, retrained_fp: u64) -> Option<Confusion> {
        let converted = self.fp.checked_sub(retrained_fp)?;
        Some(Confusion {
            tp:  self.tp,
            fp:  retrained_fp,
            tn:  self.tn + converted,
            fn_: self.fn_,
        })
    }

    pub fn total(&self) -> u64 { self.tp + self.fp + self.tn + self.fn_ }

    pub fn precision(&self) -> f64 {
        let denom = self.tp + self.fp;
        if denom == 0 { 1.0 } else { self.tp as f64 / denom as f64 }
    }

    pub fn recall(&self) -> f64 {
        let denom = self.tp + self.fn_;
        if denom == 0 { 0.0 } else { self.tp as f64 / denom as f64 }
    }

    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 { 0.0 } else { 2.0 * p * r / (p + r) }
    }

    pub fn fpr(&self) -> f64 {
        let denom = self.fp + self.tn;
        if denom == 0 { 0.0 } else { self.fp as f64 / denom as f64 }
    }
}

/// All four matrices of one evaluation run. Read-only once computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DetectionMetrics {
    pub fingerprints:           Confusion,
    pub fingerprints_retrained: Confusion,
    pub requests:               Confusion,
    pub requests_retrained:     Confusion,
}

// ── Computation ───────────────────────────────────────────────────────────────

/// Cross detector bucket with ground truth.
///
/// `unique` must be the unique set built from `alerts`; only its benign
/// members count as false positives after retraining. A member that is not
/// one of the alerts, or more benign weight than the alerts carry, is an error.
pub fn compute<'a>(
    alerts: &[FingerprintRecord],
    benign: &[FingerprintRecord],
    unique: impl IntoIterator<Item = &'a FingerprintRecord>,
) -> Result<DetectionMetrics> {
    let mut fingerprints = Confusion::default();
    let mut requests     = Confusion::default();

    for a in alerts {
        let reqs = a.request_count();
        if a.is_malicious() {
            fingerprints.tp += 1;
            requests.tp     += reqs;
        } else {
            fingerprints.fp += 1;
            requests.fp     += reqs;
        }
    }

    for b in benign {
        let reqs = b.request_count();
        if b.is_malicious() {
            fingerprints.fn_ += 1;
            requests.fn_     += reqs;
        } else {
            fingerprints.tn += 1;
            requests.tn     += reqs;
        }
    }

    let (mut retrained_fp_fings, mut retrained_fp_reqs) = (0u64, 0u64);
    for u in unique {
        if !alerts.iter().any(|a| a.id == u.id) {
            return Err(EvalError::UniqueNotInAlerts { id: u.id.clone() });
        }
        if !u.is_malicious() {
            retrained_fp_fings += 1;
            retrained_fp_reqs  += u.request_count();
        }
    }

    let oversized = |retrained: u64, fp: u64| EvalError::UniqueExceedsAlerts { retrained, fp };
    Ok(DetectionMetrics {
        fingerprints,
        fingerprints_retrained: fingerprints.retrained(retrained_fp_fings)
            .ok_or_else(|| oversized(retrained_fp_fings, fingerprints.fp))?,
        requests,
        requests_retrained:     requests.retrained(retrained_fp_reqs)
            .ok_or_else(|| oversized(retrained_fp_reqs, requests.fp))?,
    })
}
