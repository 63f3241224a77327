//! Property-based tests for slot search using proptest.
//!
//! These check invariants that must hold for *any* calendar and window, not
//! just the examples in `search_tests.rs`.

use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};
use proptest::prelude::*;
use slot_engine::{
    classify, search, AttendeeAvailability, AttendeeCalendar, BusyInterval, Confidence,
    ResolutionAction, SearchParams,
};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 16, 0, 0, 0).unwrap()
}

/// A busy interval somewhere in the first four days, 5 to 240 minutes long.
fn arb_interval() -> impl Strategy<Value = BusyInterval> {
    (0i64..(4 * 24 * 60), 5i64..=240).prop_map(|(offset, len)| {
        let start = base() + Duration::minutes(offset);
        BusyInterval::new(start, start + Duration::minutes(len), "busy").unwrap()
    })
}

fn arb_calendar() -> impl Strategy<Value = AttendeeCalendar> {
    prop_oneof![
        4 => prop::collection::vec(arb_interval(), 0..8).prop_map(AttendeeCalendar::busy),
        1 => Just(AttendeeCalendar::unavailable("unreachable")),
    ]
}

fn arb_availability() -> impl Strategy<Value = AttendeeAvailability> {
    prop::collection::vec(arb_calendar(), 0..4).prop_map(|cals| {
        cals.into_iter()
            .enumerate()
            .map(|(i, cal)| (format!("user{}@example.com", i), cal))
            .collect()
    })
}

fn arb_duration() -> impl Strategy<Value = u32> {
    prop_oneof![Just(15u32), Just(30), Just(45), Just(60), Just(90), Just(120)]
}

fn arb_granularity() -> impl Strategy<Value = u32> {
    prop_oneof![Just(5u32), Just(10), Just(15), Just(30)]
}

/// Window start within the first two days, length up to three days.
fn arb_window() -> impl Strategy<Value = (DateTime<Utc>, DateTime<Utc>)> {
    (0i64..(2 * 24 * 60), 30i64..(3 * 24 * 60)).prop_map(|(offset, len)| {
        let start = base() + Duration::minutes(offset);
        (start, start + Duration::minutes(len))
    })
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn slots_have_exact_duration_inside_business_hours(
        availability in arb_availability(),
        duration in arb_duration(),
        granularity in arb_granularity(),
        (start, end) in arb_window(),
        top_k in 1usize..6,
    ) {
        let params = SearchParams::new(duration, start, end)
            .with_granularity(granularity)
            .with_top_k(top_k);
        let outcome = search(&availability, &params).unwrap();

        prop_assert!(outcome.slots.len() <= top_k);
        for slot in &outcome.slots {
            prop_assert_eq!(slot.end - slot.start, Duration::minutes(i64::from(duration)));
            prop_assert!(slot.start.hour() >= 9);
            prop_assert!(slot.end.hour() < 18 || (slot.end.hour() == 18 && slot.end.minute() == 0));
            prop_assert_eq!(slot.start.date_naive(), slot.end.date_naive());
            prop_assert!(slot.start >= start && slot.end <= end);
        }
    }

    #[test]
    fn high_confidence_slots_overlap_no_busy_interval(
        availability in arb_availability(),
        duration in arb_duration(),
        (start, end) in arb_window(),
    ) {
        let params = SearchParams::new(duration, start, end).with_top_k(5);
        let outcome = search(&availability, &params).unwrap();

        for slot in outcome.slots.iter().filter(|s| s.confidence == Confidence::High) {
            for (_, busy) in availability.busy_intervals() {
                prop_assert!(!(slot.start < busy.end && slot.end > busy.start));
            }
        }
    }

    #[test]
    fn degraded_iff_some_calendar_unreadable(
        availability in arb_availability(),
        (start, end) in arb_window(),
    ) {
        let params = SearchParams::new(30, start, end);
        let outcome = search(&availability, &params).unwrap();
        let expected = if availability.has_unavailable() {
            Confidence::Degraded
        } else {
            Confidence::High
        };
        for slot in &outcome.slots {
            prop_assert_eq!(slot.confidence, expected);
        }
    }

    #[test]
    fn ranking_is_sorted_and_deterministic(
        availability in arb_availability(),
        duration in arb_duration(),
        (start, end) in arb_window(),
    ) {
        let params = SearchParams::new(duration, start, end).with_top_k(5);
        let first = search(&availability, &params).unwrap();
        let second = search(&availability, &params).unwrap();
        prop_assert_eq!(&first, &second);

        for pair in first.slots.windows(2) {
            let ordered = pair[0].score > pair[1].score
                || (pair[0].score == pair[1].score && pair[0].start < pair[1].start);
            prop_assert!(ordered);
        }
    }

    #[test]
    fn conflicts_reported_only_without_slots(
        availability in arb_availability(),
        (start, end) in arb_window(),
    ) {
        let params = SearchParams::new(60, start, end);
        let outcome = search(&availability, &params).unwrap();
        if !outcome.slots.is_empty() {
            prop_assert!(outcome.blocking_conflicts.is_empty());
        }
    }

    #[test]
    fn classification_is_total_and_case_insensitive(prefix in "[a-zA-Z ]{0,10}", suffix in "[a-zA-Z ]{0,10}") {
        let one_on_one = format!("{}1:1{}", prefix, suffix);
        prop_assert_eq!(classify(&one_on_one), ResolutionAction::SendRescheduleRequest);
        prop_assert_eq!(classify(&one_on_one.to_uppercase()), ResolutionAction::SendRescheduleRequest);

        let optional = format!("{}OpTiOnAl{}", prefix, suffix);
        prop_assert_eq!(classify(&optional), ResolutionAction::MarkAsResolved);
    }
}
