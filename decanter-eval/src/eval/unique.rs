// decanter-eval/src/eval/unique.rs
//
// Greedy unique-alert builder. Simulates an operator who, after seeing an
// alert, adds its fingerprint to the trusted set so that similar fingerprints
// never alert again.
//
// Walk the alerts in the given traversal order; keep a record only if it is
// not similar to any record already kept. The result depends on that order
// and on the oracle being non-transitive, so it is NOT a maximal independent
// set of the similarity graph. That approximation is the retraining model.

use tracing::debug;

use crate::error::OracleError;
use crate::fingerprint::FingerprintRecord;
use crate::similarity::SimilarityOracle;

/// Build the unique alert set.
///
/// `alerts` fixes the traversal order: pass `alerts.iter()` for the order the
/// detector produced them, or any other ordering to study order sensitivity.
/// Accepted records come back in first-occurrence order of that traversal.
///
/// Any oracle error aborts the whole build; no partial set is returned.
pub fn build_unique<'a, I, O>(alerts: I, oracle: &O) -> Result<Vec<&'a FingerprintRecord>, OracleError>
where
    I: IntoIterator<Item = &'a FingerprintRecord>,
    O: SimilarityOracle + ?Sized,
{
    let mut unique: Vec<&'a FingerprintRecord> = Vec::new();

    for candidate in alerts {
        let mut duplicate_of = None;
        for &accepted in &unique {
            if oracle.check(candidate, accepted)? {
                duplicate_of = Some(&accepted.id);
                break;
            }
        }

        match duplicate_of {
            Some(known) => debug!("alert {} folded into {}", candidate.id, known),
            None        => unique.push(candidate),
        }
    }

    Ok(unique)
}
