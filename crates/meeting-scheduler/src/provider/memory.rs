use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{BookingRequest, CalendarProvider, CreatedEvent, ProviderEvent};
use crate::error::{ProviderError, SchedulerError};

/// JSON description of an [`InMemoryProvider`].
///
/// ```json
/// {
///   "calendars": {
///     "ana@example.com": [
///       {"summary": "Standup", "startTime": "2026-03-16T10:00:00Z", "endTime": "2026-03-16T10:30:00Z"}
///     ]
///   },
///   "unreachable": ["bo@example.com"],
///   "delaysMs": {"cy@example.com": 50},
///   "rejectBookings": "quota exceeded"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalendarFixture {
    pub calendars: BTreeMap<String, Vec<ProviderEvent>>,
    pub unreachable: Vec<String>,
    pub delays_ms: BTreeMap<String, u64>,
    pub reject_bookings: Option<String>,
}

/// A provider backed by process memory.
///
/// Booked events are added to every attendee's calendar, so a later fetch
/// sees them as busy. Accounts are matched case-insensitively.
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    calendars: RwLock<HashMap<String, Vec<ProviderEvent>>>,
    unreachable: HashSet<String>,
    delays: HashMap<String, Duration>,
    reject_bookings: Option<String>,
    created: RwLock<Vec<BookingRequest>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(mut self, account: &str, events: Vec<ProviderEvent>) -> Self {
        self.calendars
            .get_mut()
            .entry(account_key(account))
            .or_default()
            .extend(events);
        self
    }

    pub fn with_unreachable(mut self, account: &str) -> Self {
        self.unreachable.insert(account_key(account));
        self
    }

    /// Delay every fetch for `account`, e.g. to exercise fetch timeouts.
    pub fn with_delay(mut self, account: &str, delay: Duration) -> Self {
        self.delays.insert(account_key(account), delay);
        self
    }

    /// Make every booking fail with `message`.
    pub fn rejecting_bookings(mut self, message: impl Into<String>) -> Self {
        self.reject_bookings = Some(message.into());
        self
    }

    pub fn from_fixture(fixture: CalendarFixture) -> Self {
        let mut provider = Self::new();
        for (account, events) in fixture.calendars {
            provider = provider.with_events(&account, events);
        }
        for account in &fixture.unreachable {
            provider = provider.with_unreachable(account);
        }
        for (account, ms) in &fixture.delays_ms {
            provider = provider.with_delay(account, Duration::from_millis(*ms));
        }
        if let Some(message) = fixture.reject_bookings {
            provider = provider.rejecting_bookings(message);
        }
        provider
    }

    pub fn from_fixture_json(json: &str) -> Result<Self, SchedulerError> {
        let fixture: CalendarFixture = serde_json::from_str(json)
            .map_err(|e| SchedulerError::Fixture(format!("invalid calendar fixture: {}", e)))?;
        Ok(Self::from_fixture(fixture))
    }

    pub fn from_fixture_file(path: impl AsRef<Path>) -> Result<Self, SchedulerError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_fixture_json(&json)
    }

    /// Bookings accepted so far, oldest first.
    pub async fn bookings(&self) -> Vec<BookingRequest> {
        self.created.read().await.clone()
    }
}

fn account_key(account: &str) -> String {
    account.trim().to_lowercase()
}

#[async_trait]
impl CalendarProvider for InMemoryProvider {
    async fn fetch_events(
        &self,
        account_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ProviderEvent>, ProviderError> {
        let key = account_key(account_id);
        if let Some(delay) = self.delays.get(&key) {
            tokio::time::sleep(*delay).await;
        }
        if self.unreachable.contains(&key) {
            return Err(ProviderError::Unreachable(format!(
                "calendar for {} is unreachable",
                account_id
            )));
        }

        let calendars = self.calendars.read().await;
        let events = calendars
            .get(&key)
            .ok_or_else(|| ProviderError::NotFound(account_id.to_string()))?;

        Ok(events
            .iter()
            .filter(|e| e.start_time < end && e.end_time > start)
            .cloned()
            .collect())
    }

    async fn create_event(&self, booking: &BookingRequest) -> Result<CreatedEvent, ProviderError> {
        if let Some(message) = &self.reject_bookings {
            return Err(ProviderError::Rejected(message.clone()));
        }

        let event = ProviderEvent {
            summary: booking.subject.clone(),
            start_time: booking.start,
            end_time: booking.end,
        };
        {
            let mut calendars = self.calendars.write().await;
            let accounts = booking
                .attendees
                .iter()
                .chain(std::iter::once(&booking.organizer))
                .filter(|a| !a.trim().is_empty());
            for attendee in accounts {
                let calendar = calendars.entry(account_key(attendee)).or_default();
                if !calendar.contains(&event) {
                    calendar.push(event.clone());
                }
            }
        }
        self.created.write().await.push(booking.clone());

        let event_id = Uuid::new_v4().simple().to_string();
        debug!("Created event {} for organizer {}", event_id, booking.organizer);
        Ok(CreatedEvent {
            html_link: format!("memory://events/{}", event_id),
            event_id,
            created_at: Utc::now(),
        })
    }
}
