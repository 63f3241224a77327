//! Intake: turn an external scheduling request into a [`MeetingRequest`].
//!
//! Intake never fails. Missing or malformed fields fall back to documented
//! defaults and each fallback is recorded as a [`ParseWarning`].

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use slot_engine::{MeetingRequest, Priority};
use uuid::Uuid;

use crate::config::SchedulerConfig;
use crate::interpret::RequestInterpreter;

/// An attendee given either as a bare id or as `{"email": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttendeeRef {
    Id(String),
    Email { email: String },
}

impl AttendeeRef {
    pub fn id(&self) -> &str {
        match self {
            AttendeeRef::Id(id) => id,
            AttendeeRef::Email { email } => email,
        }
    }
}

/// A duration given as a number or as numeric text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationField {
    Minutes(i64),
    Text(String),
}

/// A scheduling request as received from upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulingRequest {
    #[serde(alias = "Request_id")]
    pub request_id: Option<String>,
    #[serde(alias = "From")]
    pub from: Option<String>,
    #[serde(alias = "Attendees")]
    pub attendees: Vec<AttendeeRef>,
    #[serde(alias = "Subject")]
    pub subject: Option<String>,
    #[serde(alias = "EmailContent")]
    pub email_content: Option<String>,
    #[serde(alias = "Start")]
    pub start: Option<String>,
    #[serde(alias = "End")]
    pub end: Option<String>,
    #[serde(alias = "Duration_mins")]
    pub duration_minutes: Option<DurationField>,
    #[serde(alias = "Location")]
    pub location: Option<String>,
}

/// A field that could not be used as given, and what was used instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseWarning {
    pub field: String,
    pub message: String,
}

impl ParseWarning {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub meeting: MeetingRequest,
    pub warnings: Vec<ParseWarning>,
}

/// Normalize `request`, consulting `interpreter` for fields the request does
/// not state explicitly.
///
/// `timezone` is used for timestamps without an offset. `received_at` stands
/// in for a missing window start.
pub fn normalize_request(
    request: &SchedulingRequest,
    config: &SchedulerConfig,
    timezone: Tz,
    interpreter: &dyn RequestInterpreter,
    received_at: DateTime<Utc>,
) -> Normalized {
    let mut warnings = Vec::new();
    let email_content = request.email_content.clone().unwrap_or_default();
    let interpretation = interpreter.interpret(&email_content, received_at);

    let request_id = match non_empty(request.request_id.as_deref()) {
        Some(id) => id.to_string(),
        None => {
            let generated = Uuid::new_v4().to_string();
            warnings.push(ParseWarning::new(
                "requestId",
                format!("missing, generated {}", generated),
            ));
            generated
        }
    };

    // Attendees.
    let mut attendees: BTreeSet<String> = BTreeSet::new();
    for attendee in &request.attendees {
        match non_empty(Some(attendee.id())) {
            Some(id) => {
                attendees.insert(normalize_id(id));
            }
            None => warnings.push(ParseWarning::new("attendees", "dropped an empty attendee id")),
        }
    }

    let organizer = match non_empty(request.from.as_deref()) {
        Some(from) => normalize_id(from),
        None => match attendees.iter().next() {
            Some(first) => {
                warnings.push(ParseWarning::new(
                    "from",
                    format!("missing, using {} as organizer", first),
                ));
                first.clone()
            }
            None => {
                warnings.push(ParseWarning::new("from", "missing and no attendees given"));
                String::new()
            }
        },
    };
    if !organizer.is_empty() {
        attendees.insert(organizer.clone());
    }

    // Window.
    let horizon = config.horizon();
    let mut window_start = match non_empty(request.start.as_deref()) {
        Some(raw) => parse_timestamp(raw, timezone, false).unwrap_or_else(|| {
            warnings.push(ParseWarning::new(
                "start",
                format!("could not parse '{}', using request time", raw),
            ));
            received_at
        }),
        None => {
            warnings.push(ParseWarning::new("start", "missing, using request time"));
            received_at
        }
    };
    let fallback_end = match window_start.checked_add_signed(horizon) {
        Some(end) => end,
        None => {
            warnings.push(ParseWarning::new(
                "start",
                format!("{} is out of range, using request time", window_start),
            ));
            window_start = received_at;
            received_at.checked_add_signed(horizon).unwrap_or(received_at)
        }
    };

    let window_end = match non_empty(request.end.as_deref()) {
        Some(raw) => match parse_timestamp(raw, timezone, true) {
            Some(end) if end > window_start => end,
            Some(_) => {
                warnings.push(ParseWarning::new(
                    "end",
                    format!(
                        "'{}' is not after start, using a {}-day window",
                        raw,
                        horizon.num_days()
                    ),
                ));
                fallback_end
            }
            None => {
                warnings.push(ParseWarning::new(
                    "end",
                    format!(
                        "could not parse '{}', using a {}-day window",
                        raw,
                        horizon.num_days()
                    ),
                ));
                fallback_end
            }
        },
        None => {
            warnings.push(ParseWarning::new(
                "end",
                format!("missing, using a {}-day window", horizon.num_days()),
            ));
            fallback_end
        }
    };

    // Duration: explicit field, then interpreter, then default.
    let explicit = match &request.duration_minutes {
        None => None,
        Some(field) => {
            let parsed = match field {
                DurationField::Minutes(n) => Some(*n),
                DurationField::Text(text) => text.trim().parse::<i64>().ok(),
            };
            match parsed.and_then(|n| u32::try_from(n).ok()).filter(|n| *n > 0) {
                Some(n) => Some(n),
                None => {
                    warnings.push(ParseWarning::new(
                        "durationMinutes",
                        format!("{:?} is not a positive number of minutes", field),
                    ));
                    None
                }
            }
        }
    };
    let mut duration_minutes = explicit
        .or(interpretation.duration_minutes)
        .unwrap_or(config.defaults.duration_minutes);
    if duration_minutes < config.defaults.min_duration_minutes {
        warnings.push(ParseWarning::new(
            "durationMinutes",
            format!(
                "{} minutes is below the minimum, using {}",
                duration_minutes, config.defaults.min_duration_minutes
            ),
        ));
        duration_minutes = config.defaults.min_duration_minutes;
    }

    let subject = non_empty(request.subject.as_deref())
        .map(str::to_string)
        .unwrap_or_else(|| {
            warnings.push(ParseWarning::new("subject", "missing, using 'Meeting'"));
            "Meeting".to_string()
        });

    let meeting = MeetingRequest {
        request_id,
        organizer,
        attendees,
        duration_minutes,
        window_start,
        window_end,
        subject,
        description: email_content,
        location: non_empty(request.location.as_deref()).map(str::to_string),
        priority: interpretation.priority.unwrap_or(Priority::Normal),
    };

    Normalized { meeting, warnings }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn normalize_id(id: &str) -> String {
    id.trim().to_lowercase()
}

/// Years a request timestamp may fall in. Chrono also parses signed
/// extended years, which would overflow window and slot arithmetic.
const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse RFC 3339, a naive local datetime in `timezone`, or a bare date.
///
/// A bare date means local midnight, or the last second of the day when
/// `end_of_day` is set. Instants outside years 1 to 9999 are rejected.
pub fn parse_timestamp(raw: &str, timezone: Tz, end_of_day: bool) -> Option<DateTime<Utc>> {
    parse_any(raw.trim(), timezone, end_of_day)
        .filter(|dt| (MIN_YEAR..=MAX_YEAR).contains(&dt.year()))
}

fn parse_any(raw: &str, timezone: Tz, end_of_day: bool) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
            if end_of_day {
                date.and_hms_opt(23, 59, 59)
            } else {
                date.and_hms_opt(0, 0, 0)
            }
        })?;

    timezone
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}
