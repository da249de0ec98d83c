// decanter-eval/src/fingerprint.rs
//
// Fingerprint records handed to the evaluator by the upstream detector.
//
// A fingerprint clusters one or more outbound HTTP request streams that come
// from the same client application. The detector sorts fingerprints into two
// buckets (alert / benign); the ground-truth label travels with the record and
// is independent of which bucket it landed in.
//
// Records are exchanged as JSON (one record per line in the dataset files):
//   { "id": "...", "ground_truth": "malicious",
//     "hosts": [{ "domain": "x.com", "requests": 3 }],
//     "label": "background", "user_agent": "...", ... }

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Point in time a fingerprint was observed in the training or testing traffic.
pub type Timestamp = DateTime<Utc>;

// ── Labels ────────────────────────────────────────────────────────────────────

/// Authoritative classification of a fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundTruth {
    Malicious,
    Benign,
}

impl fmt::Display for GroundTruth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malicious => write!(f, "MALICIOUS"),
            Self::Benign    => write!(f, "BENIGN"),
        }
    }
}

/// Application class assigned during fingerprint extraction.
/// Background = non-interactive software (updaters, agents, malware).
/// Browser    = interactive user agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppLabel {
    #[default]
    Background,
    Browser,
}

impl fmt::Display for AppLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Background => write!(f, "Background"),
            Self::Browser    => write!(f, "Browser"),
        }
    }
}

// ── Identity ──────────────────────────────────────────────────────────────────

/// Opaque fingerprint identity. Keys the timestamp indexes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FingerprintId(pub String);

impl FingerprintId {
    pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for FingerprintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FingerprintId {
    fn from(s: &str) -> Self { Self(s.to_string()) }
}

// ── Record ────────────────────────────────────────────────────────────────────

/// One contacted domain and how many requests the fingerprint sent to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostCount {
    pub domain:   String,
    pub requests: u64,
}

impl HostCount {
    pub fn new(domain: impl Into<String>, requests: u64) -> Self {
        Self { domain: domain.into(), requests }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingerprintRecord {
    #[serde(default)]
    pub id:           FingerprintId,
    pub ground_truth: GroundTruth,
    #[serde(default)]
    pub hosts:        Vec<HostCount>,   // in extraction order

    // Features compared by the similarity oracle
    #[serde(default)]
    pub label:                  AppLabel,
    #[serde(default)]
    pub method:                 String,
    #[serde(default)]
    pub user_agent:             String,
    #[serde(default)]
    pub language:               String,
    #[serde(default)]
    pub avg_size:               f64,     // mean outgoing request size, bytes
    #[serde(default)]
    pub constant_header_fields: Vec<String>,
    #[serde(default)]
    pub outgoing_info:          u64,     // total outgoing bytes
}

impl FingerprintRecord {
    /// Minimal record: identity, label and host counts. Feature fields are empty.
    pub fn new<'a>(
        id:           impl Into<FingerprintId>,
        ground_truth: GroundTruth,
        hosts:        impl IntoIterator<Item = (&'a str, u64)>,
    ) -> Self {
        Self {
            id: id.into(),
            ground_truth,
            hosts: hosts.into_iter().map(|(d, n)| HostCount::new(d, n)).collect(),
            label:                  AppLabel::default(),
            method:                 String::new(),
            user_agent:             String::new(),
            language:               String::new(),
            avg_size:               0.0,
            constant_header_fields: Vec::new(),
            outgoing_info:          0,
        }
    }

    pub fn is_malicious(&self) -> bool {
        self.ground_truth == GroundTruth::Malicious
    }

    /// Number of HTTP requests this fingerprint clusters.
    pub fn request_count(&self) -> u64 {
        self.hosts.iter().map(|h| h.requests).sum()
    }

    /// Content-derived identity for records that arrive without one.
    /// SHA256[:16] over the canonical feature string.
    pub fn derive_id(&self) -> FingerprintId {
        let hosts = self.hosts.iter()
            .map(|h| format!("{}={}", h.domain, h.requests))
            .collect::<Vec<_>>()
            .join(",");
        let canonical = format!(
            "{}|{}|{}|{}|{:.3}|{}|{}|{}",
            self.label,
            self.method,
            self.user_agent,
            self.language,
            self.avg_size,
            self.constant_header_fields.join(","),
            hosts,
            self.outgoing_info,
        );
        let mut h = Sha256::new();
        h.update(canonical.as_bytes());
        FingerprintId(hex::encode(h.finalize())[..16].to_string())
    }

    /// Assign a derived identity when none was supplied.
    pub fn ensure_id(&mut self) {
        if self.id.is_empty() {
            self.id = self.derive_id();
        }
    }
}

impl fmt::Display for FingerprintRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hosts = self.hosts.iter()
            .map(|h| format!("{}({})", h.domain, h.requests))
            .collect::<Vec<_>>()
            .join(", ");
        write!(
            f,
            "[{}] {} {} {} ua={:?} lang={:?} avg_size={:.1} hosts=[{}]",
            self.id, self.ground_truth, self.label, self.method,
            self.user_agent, self.language, self.avg_size, hosts
        )
    }
}
