//! Discretized slot search over business hours.
//!
//! A cursor walks the window in `granularity_minutes` steps, jumping to the
//! next opening time whenever a meeting starting at the cursor would run past
//! closing. Each candidate is tested against every readable calendar with the
//! half-open overlap rule `start < busy.end && end > busy.start`; survivors are
//! scored and the first `top_k` are returned ranked by score, then start.
//!
//! When nothing survives, the outcome carries the events that blocked the
//! best attempted candidates so callers can reason about the conflicts.

use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::availability::AttendeeAvailability;
use crate::conflict::Conflict;
use crate::error::{EngineError, Result};
use crate::hours::{is_weekend, BusinessHours, SlotLabel};
use crate::request::TimeRange;
use crate::score::{self, DEFAULT_BUFFER_MINUTES};

pub const DEFAULT_GRANULARITY_MINUTES: u32 = 15;
pub const DEFAULT_TOP_K: usize = 3;

/// How much a slot can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Every attendee calendar was read and none overlaps the slot.
    High,
    /// At least one calendar was unreadable and the slot assumes it is free.
    Degraded,
}

/// A proposed meeting time of the requested duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub score: f64,
    pub label: SlotLabel,
    pub confidence: Confidence,
}

impl CandidateSlot {
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start, self.end)
    }
}

/// Search inputs. [`SearchParams::new`] fills in the defaults
/// (15-minute grid, 09:00–18:00 UTC, top 3, 15-minute buffer).
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub duration_minutes: u32,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub granularity_minutes: u32,
    pub business_hours: BusinessHours,
    pub top_k: usize,
    pub buffer_minutes: u32,
    pub exclude_weekends: bool,
}

impl SearchParams {
    pub fn new(duration_minutes: u32, window_start: DateTime<Utc>, window_end: DateTime<Utc>) -> Self {
        Self {
            duration_minutes,
            window_start,
            window_end,
            granularity_minutes: DEFAULT_GRANULARITY_MINUTES,
            business_hours: BusinessHours::default(),
            top_k: DEFAULT_TOP_K,
            buffer_minutes: DEFAULT_BUFFER_MINUTES,
            exclude_weekends: false,
        }
    }

    pub fn with_granularity(mut self, minutes: u32) -> Self {
        self.granularity_minutes = minutes;
        self
    }

    pub fn with_business_hours(mut self, hours: BusinessHours) -> Self {
        self.business_hours = hours;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_buffer(mut self, minutes: u32) -> Self {
        self.buffer_minutes = minutes;
        self
    }

    pub fn excluding_weekends(mut self, exclude: bool) -> Self {
        self.exclude_weekends = exclude;
        self
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.duration_minutes))
    }

    /// # Errors
    /// Returns `EngineError::InvalidSearch` for a zero duration, grid step or `top_k`.
    pub fn validate(&self) -> Result<()> {
        if self.duration_minutes == 0 {
            return Err(EngineError::InvalidSearch("duration must be positive".to_string()));
        }
        if self.granularity_minutes == 0 {
            return Err(EngineError::InvalidSearch("granularity must be positive".to_string()));
        }
        if self.top_k == 0 {
            return Err(EngineError::InvalidSearch("top_k must be positive".to_string()));
        }
        Ok(())
    }

    /// Candidate start times in chronological order.
    pub fn candidates(&self) -> Candidates<'_> {
        let cursor = (self.window_start < self.window_end).then(|| {
            self.business_hours
                .align_up(self.window_start, self.granularity_minutes)
        });
        Candidates { params: self, cursor }
    }
}

/// Iterator over candidate start times; see [`SearchParams::candidates`].
#[derive(Debug, Clone)]
pub struct Candidates<'a> {
    params: &'a SearchParams,
    cursor: Option<DateTime<Utc>>,
}

impl Iterator for Candidates<'_> {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        let params = self.params;
        let hours = &params.business_hours;
        let duration = params.duration();
        let step = Duration::minutes(i64::from(params.granularity_minutes.max(1)));

        loop {
            let cursor = self.cursor?;
            let end = match cursor.checked_add_signed(duration) {
                Some(end) if end <= params.window_end => end,
                _ => {
                    self.cursor = None;
                    return None;
                }
            };

            let date = hours.local_date(cursor);
            let next_day = hours.next_opening_after(date, params.exclude_weekends);

            if params.exclude_weekends && is_weekend(date) {
                self.cursor = next_day;
                continue;
            }
            let (Some(open), Some(close)) = (hours.opening_on(date), hours.closing_on(date)) else {
                self.cursor = next_day;
                continue;
            };
            if cursor < open {
                self.cursor = Some(open);
                continue;
            }
            if end > close {
                self.cursor = next_day;
                continue;
            }

            self.cursor = cursor.checked_add_signed(step);
            return Some(cursor);
        }
    }
}

/// Everything a search produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    /// Free slots ranked by score (desc) then start (asc).
    pub slots: Vec<CandidateSlot>,
    /// Events blocking the best attempted candidates. Empty when `slots` is not.
    pub blocking_conflicts: Vec<Conflict>,
    pub candidates_checked: usize,
}

/// A business-hour candidate rejected because of busy overlaps.
struct Attempt {
    start: DateTime<Utc>,
    label: SlotLabel,
    blocking: Vec<Conflict>,
}

/// Run the search.
///
/// # Errors
/// Returns `EngineError::InvalidSearch` when [`SearchParams::validate`] fails.
/// Unreadable calendars never cause an error; they only degrade confidence.
pub fn search(availability: &AttendeeAvailability, params: &SearchParams) -> Result<SearchOutcome> {
    params.validate()?;

    let duration = params.duration();
    let confidence = if availability.has_unavailable() {
        Confidence::Degraded
    } else {
        Confidence::High
    };

    let mut slots: Vec<CandidateSlot> = Vec::new();
    let mut attempts: Vec<Attempt> = Vec::new();
    let mut candidates_checked = 0;

    for start in params.candidates() {
        candidates_checked += 1;
        let Some(end) = start.checked_add_signed(duration) else {
            break;
        };

        let blocking: Vec<Conflict> = availability
            .busy_intervals()
            .filter(|(_, busy)| busy.overlaps(start, end))
            .map(|(attendee, busy)| Conflict {
                attendee: attendee.to_string(),
                event_summary: busy.summary.clone(),
                event_interval: TimeRange::new(busy.start, busy.end),
            })
            .collect();

        let label = params.business_hours.label(start);
        if !blocking.is_empty() {
            attempts.push(Attempt { start, label, blocking });
            continue;
        }

        slots.push(CandidateSlot {
            start,
            end,
            score: score::score_slot(
                start,
                end,
                availability,
                &params.business_hours,
                params.buffer_minutes,
            ),
            label,
            confidence,
        });
        if slots.len() >= params.top_k {
            break;
        }
    }

    slots.sort_by(rank_slots);

    let blocking_conflicts = if slots.is_empty() {
        best_attempt_conflicts(attempts, params.top_k)
    } else {
        Vec::new()
    };

    Ok(SearchOutcome {
        slots,
        blocking_conflicts,
        candidates_checked,
    })
}

/// Convenience wrapper returning only the ranked slots.
///
/// # Errors
/// Same as [`search`].
pub fn find_slots(availability: &AttendeeAvailability, params: &SearchParams) -> Result<Vec<CandidateSlot>> {
    search(availability, params).map(|outcome| outcome.slots)
}

fn rank_slots(a: &CandidateSlot, b: &CandidateSlot) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.start.cmp(&b.start))
}

/// The attempts closest to feasible are the ones with the fewest blocking
/// events; ties go to the preferred label, then the earliest start.
fn best_attempt_conflicts(mut attempts: Vec<Attempt>, top_k: usize) -> Vec<Conflict> {
    attempts.sort_by(|a, b| {
        a.blocking
            .len()
            .cmp(&b.blocking.len())
            .then_with(|| a.label.rank().cmp(&b.label.rank()))
            .then_with(|| a.start.cmp(&b.start))
    });

    let mut conflicts: Vec<Conflict> = Vec::new();
    for attempt in attempts.into_iter().take(top_k) {
        for conflict in attempt.blocking {
            if !conflicts.contains(&conflict) {
                conflicts.push(conflict);
            }
        }
    }
    conflicts
}
