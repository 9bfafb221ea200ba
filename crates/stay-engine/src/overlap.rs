//! Detect stays that share nights.
//!
//! The booking sheet is trusted never to confirm two overlapping stays for the
//! same unit, but nothing on the read side guarantees it. These checks let a
//! caller notice when the feed breaks that rule, and let a writer refuse a
//! request that would break it. Touching stays (one leaves the day the other
//! arrives) are NOT overlaps.

use crate::booking::DateRange;

/// Two confirmed ranges that share at least one night.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlap {
    pub first: DateRange,
    pub second: DateRange,
    pub shared_nights: i64,
}

/// Find every pair of ranges in the list that share a night.
///
/// Pairs are reported once, in input order (`first` precedes `second`).
pub fn find_overlaps(ranges: &[DateRange]) -> Vec<Overlap> {
    let mut overlaps = Vec::new();

    for (i, a) in ranges.iter().enumerate() {
        for b in &ranges[i + 1..] {
            if a.overlaps(b) {
                let start = a.checkin.max(b.checkin);
                let end = a.checkout.min(b.checkout);
                overlaps.push(Overlap {
                    first: *a,
                    second: *b,
                    shared_nights: (end - start).num_days(),
                });
            }
        }
    }

    overlaps
}

/// The existing ranges a proposed stay would collide with.
pub fn stay_conflicts(stay: &DateRange, ranges: &[DateRange]) -> Vec<DateRange> {
    ranges.iter().filter(|r| r.overlaps(stay)).copied().collect()
}
