//! Fetch and normalize every attendee's busy intervals.
//!
//! Fetches run concurrently, one per attendee, each under its own timeout. A
//! failed or late fetch turns into an "unavailable" marker for that attendee
//! only; aggregation itself never fails. Results are keyed by attendee id in
//! sorted order, so completion order cannot change the output.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use slot_engine::{AttendeeAvailability, AttendeeCalendar, BusyInterval};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::SchedulerConfig;
use crate::provider::{CalendarProvider, ProviderEvent};

pub struct AvailabilityAggregator {
    provider: Arc<dyn CalendarProvider>,
    fetch_timeout: Duration,
}

impl AvailabilityAggregator {
    pub fn new(provider: Arc<dyn CalendarProvider>, fetch_timeout: Duration) -> Self {
        Self {
            provider,
            fetch_timeout,
        }
    }

    pub fn from_config(provider: Arc<dyn CalendarProvider>, config: &SchedulerConfig) -> Self {
        Self::new(provider, config.fetch_timeout())
    }

    /// Availability of every attendee over `[window_start, window_end)`.
    ///
    /// Duplicate attendee ids are fetched once.
    pub async fn fetch<I, S>(
        &self,
        attendees: I,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> AttendeeAvailability
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unique: BTreeSet<String> = attendees
            .into_iter()
            .map(|a| a.as_ref().to_string())
            .collect();

        let fetches = unique.into_iter().map(|attendee| async move {
            let calendar = self.fetch_one(&attendee, window_start, window_end).await;
            (attendee, calendar)
        });

        join_all(fetches).await.into_iter().collect()
    }

    async fn fetch_one(
        &self,
        attendee: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> AttendeeCalendar {
        let fetch = self.provider.fetch_events(attendee, window_start, window_end);
        match timeout(self.fetch_timeout, fetch).await {
            Ok(Ok(events)) => {
                let calendar = normalize_events(attendee, events);
                debug!(
                    "Fetched {} busy intervals for {}",
                    calendar.intervals().len(),
                    attendee
                );
                calendar
            }
            Ok(Err(e)) => {
                warn!("Could not fetch calendar for {}: {}", attendee, e);
                AttendeeCalendar::unavailable(format!("Could not fetch calendar: {}", e))
            }
            Err(_) => {
                warn!(
                    "Calendar fetch for {} timed out after {}ms",
                    attendee,
                    self.fetch_timeout.as_millis()
                );
                AttendeeCalendar::unavailable(format!(
                    "Calendar fetch timed out after {}ms",
                    self.fetch_timeout.as_millis()
                ))
            }
        }
    }
}

/// Turn provider events into sorted busy intervals, dropping events whose end
/// is not after their start.
pub fn normalize_events(attendee: &str, events: Vec<ProviderEvent>) -> AttendeeCalendar {
    let intervals = events
        .into_iter()
        .filter_map(|event| {
            let interval = BusyInterval::new(event.start_time, event.end_time, event.summary.as_str());
            if interval.is_none() {
                warn!(
                    "Dropping event '{}' for {}: end {} is not after start {}",
                    event.summary, attendee, event.end_time, event.start_time
                );
            }
            interval
        })
        .collect();
    AttendeeCalendar::busy(intervals)
}
