// decanter-eval/src/similarity.rs
//
// Similarity oracle: decides whether two fingerprints belong to the same
// client application.
//
// The evaluator only consumes the boolean answer. It treats the oracle as a
// pure function: same pair in, same answer out. Symmetry is assumed but
// transitivity is NOT: A~B and B~C does not imply A~C, which is why the
// unique-set builder is order-dependent.
//
// DecanterSimilarity is the feature comparator used by the DECANTeR detection
// module. Scores per application class:
//
//   Background  host ⊆ + avg size ± + constant headers + exact UA   >= 2.5 / 4
//   Browser     exact UA + exact Accept-Language                    >= 2.0 / 2
//
// Fingerprints of different classes never match.

use crate::config::SimilarityConfig;
use crate::error::OracleError;
use crate::fingerprint::{AppLabel, FingerprintRecord, HostCount};

pub trait SimilarityOracle {
    /// `candidate` is the record under consideration, `accepted` the record it
    /// is compared against.
    fn check(&self, candidate: &FingerprintRecord, accepted: &FingerprintRecord)
        -> Result<bool, OracleError>;
}

// ── Closure adapter ───────────────────────────────────────────────────────────

/// Infallible oracle backed by a plain predicate.
pub struct FnOracle<F>(F);

pub fn oracle_fn<F>(f: F) -> FnOracle<F>
where
    F: Fn(&FingerprintRecord, &FingerprintRecord) -> bool,
{
    FnOracle(f)
}

impl<F> SimilarityOracle for FnOracle<F>
where
    F: Fn(&FingerprintRecord, &FingerprintRecord) -> bool,
{
    fn check(&self, candidate: &FingerprintRecord, accepted: &FingerprintRecord)
        -> Result<bool, OracleError>
    {
        Ok((self.0)(candidate, accepted))
    }
}

// ── DECANTeR comparator ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct DecanterSimilarity {
    cfg: SimilarityConfig,
}

impl DecanterSimilarity {
    pub fn new(cfg: SimilarityConfig) -> Self { Self { cfg } }

    pub fn config(&self) -> &SimilarityConfig { &self.cfg }

    pub fn background_score(&self, new: &FingerprintRecord, old: &FingerprintRecord) -> f64 {
        host_check(&new.hosts, &old.hosts)
            + self.avg_size_check(new.avg_size, old.avg_size)
            + header_check(&new.constant_header_fields, &old.constant_header_fields)
            + exact_match(&new.user_agent, &old.user_agent)
    }

    pub fn browser_score(&self, new: &FingerprintRecord, old: &FingerprintRecord) -> f64 {
        exact_match(&new.user_agent, &old.user_agent)
            + exact_match(&new.language, &old.language)
    }

    /// 1.0 within one error margin of the old average, 0.5 within two, else 0.
    fn avg_size_check(&self, new_avg: f64, old_avg: f64) -> f64 {
        let margin = old_avg / 100.0 * self.cfg.avg_size_error_pct;
        if (old_avg - margin..=old_avg + margin).contains(&new_avg) {
            1.0
        } else if (old_avg - 2.0 * margin..=old_avg + 2.0 * margin).contains(&new_avg) {
            0.5
        } else {
            0.0
        }
    }
}

impl SimilarityOracle for DecanterSimilarity {
    fn check(&self, candidate: &FingerprintRecord, accepted: &FingerprintRecord)
        -> Result<bool, OracleError>
    {
        if candidate.label != accepted.label {
            return Ok(false);
        }
        let similar = match candidate.label {
            AppLabel::Background => {
                self.background_score(candidate, accepted) >= self.cfg.background_threshold
            }
            AppLabel::Browser => {
                self.browser_score(candidate, accepted) >= self.cfg.browser_threshold
            }
        };
        Ok(similar)
    }
}

/// 1.0 if every host contacted by `new` was also contacted by `old`.
fn host_check(new: &[HostCount], old: &[HostCount]) -> f64 {
    let covered = new.iter().all(|n| old.iter().any(|o| o.domain == n.domain));
    if covered { 1.0 } else { 0.0 }
}

/// 1.0 for the same constant-header set, 0.5 when `new` carries every old
/// header plus extra ones.
fn header_check(new: &[String], old: &[String]) -> f64 {
    let matches = new.iter().filter(|h| old.contains(*h)).count();
    if matches == old.len() && new.len() == old.len() {
        1.0
    } else if matches == old.len() && new.len() > old.len() {
        0.5
    } else {
        0.0
    }
}

fn exact_match(a: &str, b: &str) -> f64 {
    if a == b { 1.0 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::GroundTruth;

    fn background(id: &str, hosts: &[(&str, u64)], ua: &str, avg: f64, hdrs: &[&str]) -> FingerprintRecord {
        let mut r = FingerprintRecord::new(id, GroundTruth::Benign, hosts.iter().copied());
        r.user_agent = ua.to_string();
        r.avg_size = avg;
        r.constant_header_fields = hdrs.iter().map(|h| h.to_string()).collect();
        r
    }

    fn browser(id: &str, ua: &str, lang: &str) -> FingerprintRecord {
        let mut r = FingerprintRecord::new(id, GroundTruth::Benign, [("news.example", 10)]);
        r.label = AppLabel::Browser;
        r.user_agent = ua.to_string();
        r.language = lang.to_string();
        r
    }

    #[test]
    fn test_label_mismatch_never_similar() {
        let oracle = DecanterSimilarity::default();
        let bg = background("a", &[("x", 1)], "ua", 100.0, &[]);
        let mut br = bg.clone();
        br.label = AppLabel::Browser;
        assert!(!oracle.check(&bg, &br).unwrap());
    }

    #[test]
    fn test_background_identical_scores_four() {
        let oracle = DecanterSimilarity::default();
        let a = background("a", &[("upd.example", 4)], "Updater/1.0", 200.0, &["accept", "host"]);
        let b = background("b", &[("upd.example", 9)], "Updater/1.0", 200.0, &["accept", "host"]);
        assert_eq!(oracle.background_score(&a, &b), 4.0);
        assert!(oracle.check(&a, &b).unwrap());
    }

    #[test]
    fn test_background_ua_change_still_matches() {
        // hosts + size + headers = 3.0 >= 2.5
        let oracle = DecanterSimilarity::default();
        let a = background("a", &[("upd.example", 1)], "Updater/1.1", 210.0, &["host"]);
        let b = background("b", &[("upd.example", 1)], "Updater/1.0", 200.0, &["host"]);
        assert!(oracle.check(&a, &b).unwrap());
    }

    #[test]
    fn test_background_new_host_and_ua_breaks_match() {
        // hosts 0 + size 1 + headers 1 + ua 0 = 2.0 < 2.5
        let oracle = DecanterSimilarity::default();
        let a = background("a", &[("c2.example", 1)], "Evil/1.0", 200.0, &["host"]);
        let b = background("b", &[("upd.example", 1)], "Updater/1.0", 200.0, &["host"]);
        assert!(!oracle.check(&a, &b).unwrap());
    }

    #[test]
    fn test_avg_size_bands() {
        let oracle = DecanterSimilarity::default();
        assert_eq!(oracle.avg_size_check(130.0, 100.0), 1.0);
        assert_eq!(oracle.avg_size_check(70.0, 100.0), 1.0);
        assert_eq!(oracle.avg_size_check(155.0, 100.0), 0.5);
        assert_eq!(oracle.avg_size_check(161.0, 100.0), 0.0);
    }

    #[test]
    fn test_header_check_superset_scores_half() {
        let old = vec!["host".to_string()];
        let new = vec!["host".to_string(), "x-extra".to_string()];
        assert_eq!(header_check(&new, &old), 0.5);
        assert_eq!(header_check(&old, &old), 1.0);
        assert_eq!(header_check(&old, &new), 0.0);
    }

    #[test]
    fn test_host_check_is_directional() {
        let small = vec![HostCount::new("a", 1)];
        let large = vec![HostCount::new("a", 1), HostCount::new("b", 1)];
        assert_eq!(host_check(&small, &large), 1.0);
        assert_eq!(host_check(&large, &small), 0.0);
    }

    #[test]
    fn test_browser_requires_ua_and_language() {
        let oracle = DecanterSimilarity::default();
        let a = browser("a", "Mozilla/5.0 Firefox/120", "en-US");
        let b = browser("b", "Mozilla/5.0 Firefox/120", "en-US");
        let c = browser("c", "Mozilla/5.0 Firefox/120", "de-DE");
        assert!(oracle.check(&a, &b).unwrap());
        assert!(!oracle.check(&a, &c).unwrap());
    }

    #[test]
    fn test_thresholds_follow_config() {
        let oracle = DecanterSimilarity::new(SimilarityConfig {
            browser_threshold: 1.0,
            ..SimilarityConfig::default()
        });
        let a = browser("a", "Mozilla/5.0 Firefox/120", "en-US");
        let c = browser("c", "Mozilla/5.0 Firefox/120", "de-DE");
        assert!(oracle.check(&a, &c).unwrap());
    }

    #[test]
    fn test_fn_oracle_adapter() {
        let same_ua = oracle_fn(|a, b| a.user_agent == b.user_agent);
        let a = browser("a", "x", "en");
        let b = browser("b", "x", "de");
        assert!(same_ua.check(&a, &b).unwrap());
    }
}
