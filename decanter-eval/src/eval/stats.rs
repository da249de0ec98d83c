// decanter-eval/src/eval/stats.rs
//
// Fingerprint and request totals per collection.

use serde::Serialize;

use crate::fingerprint::FingerprintRecord;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BucketTotals {
    pub fingerprints: u64,
    pub requests:     u64,
}

impl BucketTotals {
    pub fn of<'a>(records: impl IntoIterator<Item = &'a FingerprintRecord>) -> Self {
        records.into_iter().fold(Self::default(), |acc, r| Self {
            fingerprints: acc.fingerprints + 1,
            requests:     acc.requests + r.request_count(),
        })
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FingerprintStats {
    pub alerts: BucketTotals,
    pub benign: BucketTotals,
    pub unique: BucketTotals,
}

pub fn summarize<'a>(
    alerts: &[FingerprintRecord],
    benign: &[FingerprintRecord],
    unique: impl IntoIterator<Item = &'a FingerprintRecord>,
) -> FingerprintStats {
    FingerprintStats {
        alerts: BucketTotals::of(alerts),
        benign: BucketTotals::of(benign),
        unique: BucketTotals::of(unique),
    }
}
