// decanter-eval/src/config.rs
//
// Tunables for the fingerprint similarity comparator.
// Defaults are the DECANTeR detection-module values; a JSON file passed with
// --similarity-config may override any subset of them:
//   { "background_threshold": 2.5, "browser_threshold": 2.0, "avg_size_error_pct": 30 }

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BACKGROUND_THRESHOLD: f64 = 2.5;
pub const DEFAULT_BROWSER_THRESHOLD:    f64 = 2.0;
pub const DEFAULT_AVG_SIZE_ERROR_PCT:   f64 = 30.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// Minimum score (out of 4) for two Background fingerprints to match.
    pub background_threshold: f64,
    /// Minimum score (out of 2) for two Browser fingerprints to match.
    pub browser_threshold:    f64,
    /// Tolerated deviation of the average request size, in percent.
    pub avg_size_error_pct:   f64,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            background_threshold: DEFAULT_BACKGROUND_THRESHOLD,
            browser_threshold:    DEFAULT_BROWSER_THRESHOLD,
            avg_size_error_pct:   DEFAULT_AVG_SIZE_ERROR_PCT,
        }
    }
}

impl SimilarityConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading similarity config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing similarity config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let cfg: SimilarityConfig = serde_json::from_str(r#"{"browser_threshold": 1.0}"#).unwrap();
        assert_eq!(cfg.browser_threshold, 1.0);
        assert_eq!(cfg.background_threshold, DEFAULT_BACKGROUND_THRESHOLD);
        assert_eq!(cfg.avg_size_error_pct, DEFAULT_AVG_SIZE_ERROR_PCT);
    }

    #[test]
    fn test_from_json_file() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.json");
        std::fs::write(&path, r#"{"avg_size_error_pct": 10}"#).unwrap();
        let cfg = SimilarityConfig::from_json_file(&path).unwrap();
        assert_eq!(cfg.avg_size_error_pct, 10.0);

        assert!(SimilarityConfig::from_json_file(&dir.path().join("missing.json")).is_err());
    }
}
