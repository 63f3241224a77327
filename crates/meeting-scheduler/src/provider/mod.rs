//! Calendar provider interface.
//!
//! The scheduler talks to calendars only through [`CalendarProvider`]: one
//! read operation per attendee and one write operation for the final booking.
//! Authentication and wire formats live behind the trait.

mod memory;

pub use memory::{CalendarFixture, InMemoryProvider};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// An event as listed by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderEvent {
    #[serde(alias = "Summary", default)]
    pub summary: String,
    #[serde(alias = "StartTime")]
    pub start_time: DateTime<Utc>,
    #[serde(alias = "EndTime")]
    pub end_time: DateTime<Utc>,
}

/// Everything a provider needs to create the meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    /// Booking identity; the event is created on this account's calendar.
    pub organizer: String,
    pub attendees: Vec<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub subject: String,
    pub description: String,
    pub location: Option<String>,
    /// IANA timezone the provider should display the event in.
    pub timezone: String,
    /// Reminder overrides; empty means the provider's defaults.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reminders: Vec<Reminder>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderMethod {
    Email,
    Popup,
}

/// A notification sent `minutes_before` the event starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub method: ReminderMethod,
    #[serde(alias = "minutes_before")]
    pub minutes_before: u32,
}

/// Provider acknowledgement of a created event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEvent {
    pub event_id: String,
    pub html_link: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// List events on `account_id`'s calendar that intersect `[start, end)`.
    async fn fetch_events(
        &self,
        account_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ProviderEvent>, ProviderError>;

    /// Create the meeting on the organizer's calendar, inviting all attendees.
    async fn create_event(&self, booking: &BookingRequest) -> Result<CreatedEvent, ProviderError>;
}
