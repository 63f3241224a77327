//! Per-attendee availability: busy intervals or an "unknown" marker.
//!
//! Each attendee contributes one calendar stream. A stream that could not be
//! read is kept as [`AttendeeCalendar::Unavailable`] so downstream stages can
//! treat the attendee as unknown rather than free.
//!
//! The map is keyed by attendee id in sorted order, so two aggregations over
//! the same inputs compare equal no matter which order the streams arrived in.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A time range during which an attendee is already committed.
///
/// Invariant: `end > start`. Use [`BusyInterval::new`] to enforce it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub summary: String,
}

impl BusyInterval {
    /// Build an interval, returning `None` when `end <= start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, summary: impl Into<String>) -> Option<Self> {
        if end <= start {
            return None;
        }
        Some(Self {
            start,
            end,
            summary: summary.into(),
        })
    }

    /// Half-open overlap test. Touching intervals do not overlap.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end && end > self.start
    }
}

/// One attendee's calendar as seen by the scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum AttendeeCalendar {
    /// Busy intervals sorted by `(start, end, summary)`.
    Busy { intervals: Vec<BusyInterval> },
    /// The calendar could not be read. The attendee is unknown, not free.
    Unavailable { reason: String },
}

impl AttendeeCalendar {
    /// Build a busy calendar from raw intervals, sorting them.
    pub fn busy(mut intervals: Vec<BusyInterval>) -> Self {
        intervals.sort();
        AttendeeCalendar::Busy { intervals }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        AttendeeCalendar::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, AttendeeCalendar::Unavailable { .. })
    }

    /// Busy intervals, or an empty slice for an unavailable calendar.
    pub fn intervals(&self) -> &[BusyInterval] {
        match self {
            AttendeeCalendar::Busy { intervals } => intervals,
            AttendeeCalendar::Unavailable { .. } => &[],
        }
    }
}

/// Mapping attendee id → calendar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttendeeAvailability {
    calendars: BTreeMap<String, AttendeeCalendar>,
}

impl AttendeeAvailability {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, attendee: &str) -> Option<&AttendeeCalendar> {
        self.calendars.get(attendee)
    }

    pub fn len(&self) -> usize {
        self.calendars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calendars.is_empty()
    }

    /// Iterate attendees in sorted id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttendeeCalendar)> {
        self.calendars.iter().map(|(id, cal)| (id.as_str(), cal))
    }

    /// Every busy interval of every readable calendar, tagged with its attendee.
    pub fn busy_intervals(&self) -> impl Iterator<Item = (&str, &BusyInterval)> {
        self.iter()
            .flat_map(|(id, cal)| cal.intervals().iter().map(move |b| (id, b)))
    }

    /// Attendees whose calendar could not be read, with the reason.
    pub fn unavailable(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter_map(|(id, cal)| match cal {
            AttendeeCalendar::Unavailable { reason } => Some((id, reason.as_str())),
            AttendeeCalendar::Busy { .. } => None,
        })
    }

    pub fn has_unavailable(&self) -> bool {
        self.calendars.values().any(AttendeeCalendar::is_unavailable)
    }
}

impl FromIterator<(String, AttendeeCalendar)> for AttendeeAvailability {
    fn from_iter<I: IntoIterator<Item = (String, AttendeeCalendar)>>(iter: I) -> Self {
        Self {
            calendars: iter.into_iter().collect(),
        }
    }
}
