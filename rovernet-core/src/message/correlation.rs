/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

//! Correlation identifiers for request/response pairing.

use rand::Rng;

/// The reserved "no correlation" sentinel.
///
/// Fire-and-forget envelopes (actions, topic publishes) carry this value;
/// the generator never returns it.
pub const NO_CORRELATION: u32 = 0;

/// Exclusive upper bound of the correlation ID range.
const CORRELATION_RANGE_END: u32 = 1_000_000_000;

/// Draws a correlation ID for a new service request.
///
/// IDs are drawn uniformly from `1..1_000_000_000`; the reserved
/// [`NO_CORRELATION`] value is redrawn. The range is large enough that
/// collisions among concurrently pending requests are negligible, but the
/// generator alone guarantees "almost certainly unique", not unique —
/// [`PendingRequests::insert_new`](crate::dispatch::PendingRequests::insert_new)
/// redraws on collision against the in-flight table.
#[must_use]
pub fn next_correlation_id() -> u32 {
    let mut rng = rand::rng();
    loop {
        let id = rng.random_range(0..CORRELATION_RANGE_END);
        if id != NO_CORRELATION {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn never_returns_the_sentinel() {
        for _ in 0..10_000 {
            assert_ne!(next_correlation_id(), NO_CORRELATION);
        }
    }

    #[test]
    fn duplicates_are_negligible_over_many_draws() {
        let mut seen = HashSet::new();
        let mut duplicates = 0usize;
        for _ in 0..10_000 {
            if !seen.insert(next_correlation_id()) {
                duplicates += 1;
            }
        }
        // Birthday bound: 10k draws from ~1e9 values expect ~0.05 collisions.
        assert!(duplicates <= 3, "unexpected duplicate count: {duplicates}");
    }

    #[test]
    fn stays_in_range() {
        for _ in 0..1_000 {
            assert!(next_correlation_id() < CORRELATION_RANGE_END);
        }
    }
}
