//! Pipeline stages for gated-document retrieval.
//!
//! Each submodule implements exactly one stage. Keeping stages separate makes
//! each independently testable and lets the orchestrator own the control flow
//! between them.
//!
//! ## Data Flow
//!
//! ```text
//! probe ──▶ auth ──▶ resolve ──▶ fetch ──▶ assemble
//! (GET+scan) (POST)  (page_data) (images)  (order restore + sink)
//! ```
//!
//! 1. [`probe`]    — fetch the landing page and scan it into a session
//! 2. [`auth`]     — conditional challenge/response against the gate
//! 3. [`resolve`]  — fan out one metadata request per page index
//! 4. [`fetch`]    — fan out one image download per resolved location
//! 5. [`assemble`] — decode and emit pages in index order into the sink
//!
//! Cross-stage ordering is strict: resolution fully completes before any
//! fetch is issued, and all fetches settle before assembly begins. Within a
//! fan-out stage no ordering is promised.

pub mod assemble;
pub mod auth;
pub mod fetch;
pub mod probe;
pub mod resolve;

use crate::error::DocsendError;

/// Wait-for-all aggregation for a fan-out stage.
///
/// Every sibling's outcome is collected first; only then, if any sibling
/// failed, the failure with the lowest page index is reported and the rest
/// are discarded. No partial result is ever surfaced.
pub(crate) fn settle_all<T>(
    outcomes: Vec<Result<T, (usize, DocsendError)>>,
) -> Result<Vec<T>, DocsendError> {
    let mut values = Vec::with_capacity(outcomes.len());
    let mut failure: Option<(usize, DocsendError)> = None;
    for outcome in outcomes {
        match outcome {
            Ok(value) => values.push(value),
            Err((page, error)) => {
                if failure.as_ref().is_none_or(|(lowest, _)| page < *lowest) {
                    failure = Some((page, error));
                }
            }
        }
    }
    match failure {
        Some((_, error)) => Err(error),
        None => Ok(values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settle_all_succeeds_when_every_sibling_succeeds() {
        let outcomes: Vec<Result<usize, (usize, DocsendError)>> =
            vec![Ok(2), Ok(1), Ok(3)];
        assert_eq!(settle_all(outcomes).unwrap(), vec![2, 1, 3]);
    }

    #[test]
    fn settle_all_reports_lowest_failing_page() {
        let outcomes: Vec<Result<usize, (usize, DocsendError)>> = vec![
            Ok(1),
            Err((
                4,
                DocsendError::PageFetchFailed {
                    page: 4,
                    reason: "x".into(),
                },
            )),
            Err((
                2,
                DocsendError::PageFetchFailed {
                    page: 2,
                    reason: "y".into(),
                },
            )),
        ];
        let err = settle_all(outcomes).unwrap_err();
        assert!(matches!(err, DocsendError::PageFetchFailed { page: 2, .. }));
    }
}
