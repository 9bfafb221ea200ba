//! Property-based tests for occupancy, picker rules and pricing using proptest.
//!
//! These hold for *any* set of bookings and any candidate stay, not just the
//! hand-picked cases in the other test files.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use stay_engine::calendar::{can_select_arrival, can_select_departure, StaySelection};
use stay_engine::date::to_iso;
use stay_engine::occupancy::is_occupied;
use stay_engine::{nights_between, Booking, DateRange, Occupancy, PricingPolicy, UnitId};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

/// A day within roughly a year of the base date.
fn arb_day() -> impl Strategy<Value = NaiveDate> {
    (0i64..400).prop_map(|offset| base() + Duration::days(offset))
}

/// A stay of 1..=14 nights starting within the year.
fn arb_range() -> impl Strategy<Value = DateRange> {
    (0i64..380, 1i64..=14).prop_map(|(start, len)| {
        let checkin = base() + Duration::days(start);
        DateRange::new(checkin, checkin + Duration::days(len)).unwrap()
    })
}

fn arb_ranges() -> impl Strategy<Value = Vec<DateRange>> {
    prop::collection::vec(arb_range(), 0..8)
}

fn arb_policy() -> impl Strategy<Value = PricingPolicy> {
    (1u32..=7, 10_000u64..200_000, 10_000u64..200_000, 0u32..=100).prop_map(
        |(threshold, short, long, pct)| {
            PricingPolicy::new(threshold, short, long, f64::from(pct) / 100.0).unwrap()
        },
    )
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    /// Occupancy matches the half-open definition exactly.
    #[test]
    fn occupancy_matches_definition(day in arb_day(), ranges in arb_ranges()) {
        let expected = ranges.iter().any(|r| r.checkin <= day && day < r.checkout);
        prop_assert_eq!(is_occupied(day, &ranges), expected);
    }

    /// A checkout day is never occupied by its own booking.
    #[test]
    fn checkout_day_free_of_own_booking(r in arb_range()) {
        prop_assert!(!is_occupied(r.checkout, &[r]));
        prop_assert!(is_occupied(r.checkin, &[r]));
    }

    /// Accepted departures are strictly after arrival and never jump an occupied night.
    #[test]
    fn accepted_departure_spans_only_free_nights(
        arrival in arb_day(),
        departure in arb_day(),
        ranges in arb_ranges(),
    ) {
        let today = base();
        if can_select_departure(departure, today, Some(arrival), &ranges) {
            prop_assert!(departure > arrival);
            let mut d = arrival;
            while d < departure {
                prop_assert!(!is_occupied(d, &ranges));
                d += Duration::days(1);
            }
        }
    }

    /// When a departure is accepted, the arrival itself was a valid arrival.
    #[test]
    fn accepted_departure_implies_valid_arrival(
        arrival in arb_day(),
        departure in arb_day(),
        ranges in arb_ranges(),
    ) {
        let today = base();
        if can_select_departure(departure, today, Some(arrival), &ranges) {
            prop_assert!(can_select_arrival(arrival, today, &ranges));
        }
    }

    /// A completed selection never overlaps an existing booking.
    #[test]
    fn completed_selection_never_overlaps(
        arrival in arb_day(),
        departure in arb_day(),
        ranges in arb_ranges(),
    ) {
        let today = base();
        let mut sel = StaySelection::new();
        sel.set_arrival(arrival, today, &ranges);
        sel.set_departure(departure, today, &ranges);
        if let Some(stay) = sel.range() {
            prop_assert!(ranges.iter().all(|r| !r.overlaps(&stay)));
        }
    }

    /// total == nights * rate and deposit == total * fraction for every valid stay.
    #[test]
    fn quote_arithmetic(r in arb_range(), policy in arb_policy()) {
        let q = policy.quote_dates(r.checkin, r.checkout).unwrap();
        prop_assert_eq!(i64::from(q.nights), r.nights());
        prop_assert_eq!(q.nightly_rate, policy.rate_for_nights(q.nights));
        prop_assert_eq!(q.total, u64::from(q.nights) * q.nightly_rate);
        prop_assert_eq!(q.deposit_due, q.total as f64 * policy.deposit_fraction);
    }

    /// String and date night counts agree, and never go negative.
    #[test]
    fn nights_between_agrees_with_dates(a in arb_day(), b in arb_day()) {
        let n = nights_between(&to_iso(a), &to_iso(b)).unwrap();
        prop_assert!(n >= 0);
        prop_assert_eq!(n, (b - a).num_days().max(0));
    }

    /// Rebuilding occupancy from identical feed data is idempotent.
    #[test]
    fn occupancy_rebuild_is_idempotent(ranges in arb_ranges()) {
        let bookings: Vec<Booking> = ranges
            .iter()
            .map(|r| Booking {
                cabana: "Cabaña 1".to_string(),
                checkin: to_iso(r.checkin),
                checkout: to_iso(r.checkout),
                ..Booking::default()
            })
            .collect();
        let a = Occupancy::for_unit(&bookings, UnitId::from(1)).unwrap();
        let b = Occupancy::for_unit(&bookings, UnitId::from(1)).unwrap();
        prop_assert_eq!(a, b);
    }
}
