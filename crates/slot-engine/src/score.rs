//! Deterministic slot scoring.
//!
//! A score is a pure function of the slot, the availability map and the
//! business-hours calendar: the same inputs always produce the same number.
//!
//! ```text
//! score = base(label) - lunch_overlap_penalty - buffer_penalty
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::availability::AttendeeAvailability;
use crate::hours::{BusinessHours, SlotLabel};

pub const MORNING_BASE: f64 = 100.0;
pub const AFTERNOON_BASE: f64 = 80.0;
pub const MIDDAY_BASE: f64 = 40.0;

/// Points lost per minute a morning/afternoon slot spills into lunch.
pub const LUNCH_PENALTY_PER_MINUTE: f64 = 1.0;
/// Points lost per minute of missing buffer, on each side.
pub const BUFFER_PENALTY_PER_MINUTE: f64 = 2.0;

/// Default gap required between a meeting and its neighbours.
pub const DEFAULT_BUFFER_MINUTES: u32 = 15;

/// Score components, kept so callers can explain a ranking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub base: f64,
    pub lunch_penalty: f64,
    pub buffer_penalty: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.base - self.lunch_penalty - self.buffer_penalty
    }
}

pub fn base_score(label: SlotLabel) -> f64 {
    match label {
        SlotLabel::Morning => MORNING_BASE,
        SlotLabel::Afternoon => AFTERNOON_BASE,
        SlotLabel::Midday => MIDDAY_BASE,
    }
}

/// Score `[start, end)` against every readable calendar in `availability`.
pub fn score_slot(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    availability: &AttendeeAvailability,
    hours: &BusinessHours,
    buffer_minutes: u32,
) -> f64 {
    score_breakdown(start, end, availability, hours, buffer_minutes).total()
}

pub fn score_breakdown(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    availability: &AttendeeAvailability,
    hours: &BusinessHours,
    buffer_minutes: u32,
) -> ScoreBreakdown {
    let label = hours.label(start);
    ScoreBreakdown {
        base: base_score(label),
        lunch_penalty: lunch_penalty(start, end, label, hours),
        buffer_penalty: buffer_penalty(start, end, availability, buffer_minutes),
    }
}

fn lunch_penalty(start: DateTime<Utc>, end: DateTime<Utc>, label: SlotLabel, hours: &BusinessHours) -> f64 {
    // Midday slots already carry the low base score.
    if label == SlotLabel::Midday {
        return 0.0;
    }
    let Some((lunch_start, lunch_end)) = hours.lunch_window(start) else {
        return 0.0;
    };
    let overlap = end.min(lunch_end) - start.max(lunch_start);
    minutes(overlap).max(0.0) * LUNCH_PENALTY_PER_MINUTE
}

/// Penalty for the nearest busy interval ending before `start` and the nearest
/// one starting after `end`, across all readable calendars. Intervals that
/// overlap the slot are not neighbours and are ignored.
fn buffer_penalty(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    availability: &AttendeeAvailability,
    buffer_minutes: u32,
) -> f64 {
    let required = f64::from(buffer_minutes);
    let mut gap_before: Option<Duration> = None;
    let mut gap_after: Option<Duration> = None;

    for (_, busy) in availability.busy_intervals() {
        if busy.end <= start {
            let gap = start - busy.end;
            gap_before = Some(gap_before.map_or(gap, |g| g.min(gap)));
        } else if busy.start >= end {
            let gap = busy.start - end;
            gap_after = Some(gap_after.map_or(gap, |g| g.min(gap)));
        }
    }

    [gap_before, gap_after]
        .into_iter()
        .flatten()
        .map(|gap| (required - minutes(gap)).max(0.0) * BUFFER_PENALTY_PER_MINUTE)
        .sum()
}

fn minutes(d: Duration) -> f64 {
    d.num_seconds() as f64 / 60.0
}
