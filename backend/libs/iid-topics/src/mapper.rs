use crate::models::{BatchOutcome, RawTokenResult, TokenOutcome};

/// Align IID per-token results with the tokens that were sent.
///
/// The service only emits error entries for failures and may omit entries
/// for tokens that succeeded, so any token without a matching result is
/// counted as a success. Results beyond `tokens.len()` are ignored.
pub fn to_batch_outcome(results: &[RawTokenResult], tokens: &[String]) -> BatchOutcome {
    let mut out = BatchOutcome {
        outcomes: Vec::with_capacity(tokens.len()),
        success_count: 0,
        failure_count: 0,
    };

    for i in 0..tokens.len() {
        match results.get(i).and_then(RawTokenResult::error_code) {
            Some(code) => {
                out.outcomes.push(TokenOutcome::failure(i, code));
                out.failure_count += 1;
            }
            None => {
                out.outcomes.push(TokenOutcome::success(i));
                out.success_count += 1;
            }
        }
    }

    out
}
