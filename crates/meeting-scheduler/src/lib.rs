//! # meeting-scheduler
//!
//! The I/O side of meeting scheduling, built around `slot-engine`.
//!
//! A [`SchedulingOrchestrator`] takes one incoming [`SchedulingRequest`],
//! normalizes it, fetches every attendee's calendar concurrently through a
//! [`CalendarProvider`], asks the engine for ranked slots, and either books the
//! best one or escalates with resolution strategies for the conflicts that
//! blocked the search.
//!
//! ## Modules
//!
//! - [`config`]: TOML configuration with defaults
//! - [`request`]: Intake and normalization of external requests
//! - [`interpret`]: Pluggable free-text interpretation
//! - [`provider`]: Calendar provider trait and the in-memory provider
//! - [`aggregator`]: Concurrent availability fetch with per-attendee timeouts
//! - [`orchestrator`]: The scheduling state machine
//! - [`error`]: Error types

pub mod aggregator;
pub mod config;
pub mod error;
pub mod interpret;
pub mod orchestrator;
pub mod provider;
pub mod request;

pub use aggregator::AvailabilityAggregator;
pub use config::SchedulerConfig;
pub use error::{ConfigError, ProviderError, SchedulerError};
pub use interpret::{Interpretation, KeywordInterpreter, RequestInterpreter};
pub use orchestrator::{
    Plan, SchedulingOrchestrator, SchedulingResult, SchedulingRun, SchedulingState,
    UnavailableAttendee,
};
pub use provider::{
    BookingRequest, CalendarFixture, CalendarProvider, CreatedEvent, InMemoryProvider, ProviderEvent,
    Reminder, ReminderMethod,
};
pub use request::{normalize_request, ParseWarning, SchedulingRequest};
