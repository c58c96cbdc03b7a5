//! Monotonic boundary search.
//!
//! Not a root finder: the goal is the pass/fail transition point of a
//! physical test. `low` is always known-good, `high` known-bad, and the
//! bracket narrows until a *relative* accuracy bound is met - appropriate
//! because acceleration and velocity brackets span orders of magnitude.

use libm::floorf;

/// Converged output of one boundary search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOutcome {
    /// Last known-good parameter value.
    pub value: f32,
    /// Number of probes evaluated.
    pub iterations: u32,
}

/// Narrow `[low, high]` around the pass/fail boundary of `probe`.
///
/// Midpoints are floored to whole units so the bracket cannot oscillate on
/// fractional remainders. Terminates when `high - low <= low * accuracy` or
/// when the floored midpoint stops landing strictly between the brackets.
///
/// Returns the last known-good value, never the midpoint that produced the
/// final failure. The initial `low` is accepted untested: the configured
/// minimum is assumed safe.
///
/// # Errors
///
/// Propagates the first error raised by `probe`; the bracket state at that
/// point is discarded.
pub fn boundary_search<E, F>(
    low: f32,
    high: f32,
    accuracy: f32,
    mut probe: F,
) -> Result<SearchOutcome, E>
where
    F: FnMut(f32) -> Result<bool, E>,
{
    let mut low = low;
    let mut high = high;
    let mut iterations = 0u32;

    while (high - low) > (low * accuracy) {
        let candidate = floorf((low + high) / 2.0);
        if candidate <= low || candidate >= high {
            break;
        }
        iterations += 1;
        if probe(candidate)? {
            low = candidate;
        } else {
            high = candidate;
        }
    }

    Ok(SearchOutcome { value: low, iterations })
}
