//! The scheduling state machine.
//!
//! ```text
//! PARSING → FETCHING_AVAILABILITY → SEARCHING_SLOTS ─┬→ FOUND → BOOKING ─┬→ DONE
//!                                                    │                   └→ FAILED
//!                                                    └→ NOT_FOUND → CONFLICT_ANALYSIS → ESCALATED
//! ```
//!
//! Every run ends in exactly one of DONE, ESCALATED or FAILED. Only the
//! booking call can fail a run; degraded calendars and empty searches are
//! ordinary outcomes.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use slot_engine::{
    analyze, search, AttendeeAvailability, BusinessHours, CandidateSlot, MeetingRequest,
    ResolutionStrategy, SearchOutcome,
};
use tracing::{debug, info, warn};

use crate::aggregator::AvailabilityAggregator;
use crate::config::SchedulerConfig;
use crate::error::Result;
use crate::interpret::{KeywordInterpreter, RequestInterpreter};
use crate::provider::{BookingRequest, CalendarProvider};
use crate::request::{normalize_request, Normalized, ParseWarning, SchedulingRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchedulingState {
    Parsing,
    FetchingAvailability,
    SearchingSlots,
    Found,
    Booking,
    Done,
    NotFound,
    ConflictAnalysis,
    Escalated,
    Failed,
}

impl SchedulingState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Escalated | Self::Failed)
    }
}

impl fmt::Display for SchedulingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Parsing => "PARSING",
            Self::FetchingAvailability => "FETCHING_AVAILABILITY",
            Self::SearchingSlots => "SEARCHING_SLOTS",
            Self::Found => "FOUND",
            Self::Booking => "BOOKING",
            Self::Done => "DONE",
            Self::NotFound => "NOT_FOUND",
            Self::ConflictAnalysis => "CONFLICT_ANALYSIS",
            Self::Escalated => "ESCALATED",
            Self::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// An attendee whose calendar could not be read, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnavailableAttendee {
    pub attendee: String,
    pub reason: String,
}

/// What the caller gets back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SchedulingResult {
    #[serde(rename_all = "camelCase")]
    Success {
        chosen_slot: CandidateSlot,
        event_id: String,
        event_link: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        alternatives: Vec<CandidateSlot>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        unavailable_attendees: Vec<UnavailableAttendee>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        parse_warnings: Vec<ParseWarning>,
    },
    #[serde(rename_all = "camelCase")]
    Escalated {
        resolution_strategies: Vec<ResolutionStrategy>,
        auto_resolvable: usize,
        requires_human_intervention: usize,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        unavailable_attendees: Vec<UnavailableAttendee>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        parse_warnings: Vec<ParseWarning>,
    },
    Error {
        error: String,
    },
}

impl SchedulingResult {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// One pass through the state machine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingRun {
    pub request_id: String,
    /// States visited, in order, ending in a terminal state.
    pub path: Vec<SchedulingState>,
    #[serde(flatten)]
    pub result: SchedulingResult,
}

impl SchedulingRun {
    pub fn final_state(&self) -> Option<SchedulingState> {
        self.path.last().copied()
    }
}

/// Everything up to (not including) booking.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub meeting: MeetingRequest,
    pub availability: AttendeeAvailability,
    pub outcome: SearchOutcome,
    pub warnings: Vec<ParseWarning>,
}

impl Plan {
    pub fn unavailable_attendees(&self) -> Vec<UnavailableAttendee> {
        unavailable_attendees(&self.availability)
    }
}

struct StatePath<'a> {
    request_id: &'a str,
    states: Vec<SchedulingState>,
}

impl<'a> StatePath<'a> {
    fn new(request_id: &'a str) -> Self {
        Self {
            request_id,
            states: Vec::new(),
        }
    }

    fn enter(&mut self, state: SchedulingState) {
        debug!("Request {} entering {}", self.request_id, state);
        self.states.push(state);
    }
}

pub struct SchedulingOrchestrator {
    config: SchedulerConfig,
    hours: BusinessHours,
    provider: Arc<dyn CalendarProvider>,
    aggregator: AvailabilityAggregator,
    interpreter: Box<dyn RequestInterpreter>,
}

impl SchedulingOrchestrator {
    /// # Errors
    /// Returns `SchedulerError::Config` when `config` does not validate.
    pub fn new(config: SchedulerConfig, provider: Arc<dyn CalendarProvider>) -> Result<Self> {
        config.validate()?;
        let hours = config.business_hours()?;
        let aggregator = AvailabilityAggregator::from_config(Arc::clone(&provider), &config);
        Ok(Self {
            config,
            hours,
            provider,
            aggregator,
            interpreter: Box::new(KeywordInterpreter),
        })
    }

    /// Replace the built-in keyword interpreter.
    pub fn with_interpreter(mut self, interpreter: impl RequestInterpreter + 'static) -> Self {
        self.interpreter = Box::new(interpreter);
        self
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn normalize(&self, request: &SchedulingRequest, received_at: DateTime<Utc>) -> Normalized {
        normalize_request(
            request,
            &self.config,
            self.hours.timezone(),
            self.interpreter.as_ref(),
            received_at,
        )
    }

    /// Normalize, fetch and search without booking anything.
    ///
    /// # Errors
    /// Returns `SchedulerError::Engine` if the search rejects its parameters.
    pub async fn plan(&self, request: &SchedulingRequest, received_at: DateTime<Utc>) -> Result<Plan> {
        let Normalized { meeting, warnings } = self.normalize(request, received_at);
        let availability = self.fetch_availability(&meeting).await;
        let outcome = self.search_slots(&meeting, &availability)?;
        Ok(Plan {
            meeting,
            availability,
            outcome,
            warnings,
        })
    }

    /// Run the full state machine for one request.
    pub async fn schedule(&self, request: &SchedulingRequest, received_at: DateTime<Utc>) -> SchedulingRun {
        let Normalized { meeting, warnings } = self.normalize(request, received_at);
        let mut path = StatePath::new(&meeting.request_id);
        path.enter(SchedulingState::Parsing);
        for warning in &warnings {
            debug!("Request {}: {}: {}", meeting.request_id, warning.field, warning.message);
        }

        path.enter(SchedulingState::FetchingAvailability);
        let availability = self.fetch_availability(&meeting).await;
        let unavailable = unavailable_attendees(&availability);

        path.enter(SchedulingState::SearchingSlots);
        let outcome = match self.search_slots(&meeting, &availability) {
            Ok(outcome) => outcome,
            Err(e) => {
                path.enter(SchedulingState::Failed);
                warn!("Slot search failed for request {}: {}", meeting.request_id, e);
                return finish(&meeting, path, SchedulingResult::Error { error: e.to_string() });
            }
        };

        let mut slots = outcome.slots.into_iter();
        let Some(chosen) = slots.next() else {
            path.enter(SchedulingState::NotFound);
            path.enter(SchedulingState::ConflictAnalysis);
            let analysis = analyze(&outcome.blocking_conflicts);
            path.enter(SchedulingState::Escalated);
            info!(
                "No free slot for request {} after {} candidates; escalating {} conflicts",
                meeting.request_id,
                outcome.candidates_checked,
                analysis.resolution_strategies.len()
            );
            let result = SchedulingResult::Escalated {
                resolution_strategies: analysis.resolution_strategies,
                auto_resolvable: analysis.auto_resolvable,
                requires_human_intervention: analysis.requires_human_intervention,
                unavailable_attendees: unavailable,
                parse_warnings: warnings,
            };
            return finish(&meeting, path, result);
        };

        path.enter(SchedulingState::Found);
        path.enter(SchedulingState::Booking);
        let booking = self.booking_for(&meeting, &chosen);
        let result = match self.provider.create_event(&booking).await {
            Ok(created) => {
                path.enter(SchedulingState::Done);
                info!(
                    "Booked request {} at {} as event {}",
                    meeting.request_id, chosen.start, created.event_id
                );
                SchedulingResult::Success {
                    chosen_slot: chosen,
                    event_id: created.event_id,
                    event_link: created.html_link,
                    alternatives: slots.collect(),
                    unavailable_attendees: unavailable,
                    parse_warnings: warnings,
                }
            }
            Err(e) => {
                path.enter(SchedulingState::Failed);
                warn!("Booking failed for request {}: {}", meeting.request_id, e);
                SchedulingResult::Error { error: e.to_string() }
            }
        };
        finish(&meeting, path, result)
    }

    async fn fetch_availability(&self, meeting: &MeetingRequest) -> AttendeeAvailability {
        self.aggregator
            .fetch(&meeting.attendees, meeting.window_start, meeting.window_end)
            .await
    }

    fn search_slots(&self, meeting: &MeetingRequest, availability: &AttendeeAvailability) -> Result<SearchOutcome> {
        let params = self
            .config
            .search_params(meeting.duration_minutes, meeting.window_start, meeting.window_end)?;
        Ok(search(availability, &params)?)
    }

    fn booking_for(&self, meeting: &MeetingRequest, slot: &CandidateSlot) -> BookingRequest {
        BookingRequest {
            organizer: meeting.organizer.clone(),
            attendees: meeting.attendees.iter().cloned().collect(),
            start: slot.start,
            end: slot.end,
            subject: meeting.subject.clone(),
            description: meeting.description.clone(),
            location: meeting.location.clone(),
            timezone: self.hours.timezone().name().to_string(),
            reminders: self.config.booking.reminders.clone(),
        }
    }
}

fn unavailable_attendees(availability: &AttendeeAvailability) -> Vec<UnavailableAttendee> {
    availability
        .unavailable()
        .map(|(attendee, reason)| UnavailableAttendee {
            attendee: attendee.to_string(),
            reason: reason.to_string(),
        })
        .collect()
}

fn finish(meeting: &MeetingRequest, path: StatePath<'_>, result: SchedulingResult) -> SchedulingRun {
    SchedulingRun {
        request_id: meeting.request_id.clone(),
        path: path.states,
        result,
    }
}
