//! # slot-engine
//!
//! Deterministic meeting slot search for calendar scheduling agents.
//!
//! Given every attendee's busy intervals, the engine walks a time window on a
//! fixed grid inside business hours, drops candidates that overlap anyone's
//! calendar, scores the survivors by time of day and buffer to neighbouring
//! meetings, and returns a ranked top-K. When nothing fits it reports the
//! events that blocked the best attempts, and classifies those conflicts into
//! resolution actions.
//!
//! The crate is pure: no I/O, no clock, no logging. Fetching calendars and
//! booking belong to the caller.
//!
//! ## Modules
//!
//! - [`availability`]: Per-attendee busy intervals or "unknown" markers
//! - [`hours`]: Business hours, time-of-day labels, grid alignment
//! - [`search`]: Candidate generation, filtering and ranking
//! - [`score`]: Deterministic slot scoring
//! - [`conflict`]: Conflict classification into resolution strategies
//! - [`request`]: The normalized meeting request
//! - [`error`]: Error types

pub mod availability;
pub mod conflict;
pub mod error;
pub mod hours;
pub mod request;
pub mod score;
pub mod search;

pub use availability::{AttendeeAvailability, AttendeeCalendar, BusyInterval};
pub use conflict::{analyze, classify, Conflict, ConflictAnalysis, ResolutionAction, ResolutionStrategy};
pub use error::EngineError;
pub use hours::{BusinessHours, SlotLabel};
pub use request::{MeetingRequest, Priority, TimeRange};
pub use search::{find_slots, search, CandidateSlot, Confidence, SearchOutcome, SearchParams};
