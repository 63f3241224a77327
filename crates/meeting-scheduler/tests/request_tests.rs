//! Tests for request intake and normalization.

use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use meeting_scheduler::request::{AttendeeRef, DurationField};
use meeting_scheduler::{
    normalize_request, Interpretation, KeywordInterpreter, RequestInterpreter, SchedulerConfig,
    SchedulingRequest,
};
use slot_engine::Priority;

// ── Helpers ─────────────────────────────────────────────────────────────────

fn received() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 15, 20, 0, 0).unwrap()
}

fn normalize(request: &SchedulingRequest) -> meeting_scheduler::request::Normalized {
    normalize_request(
        request,
        &SchedulerConfig::default(),
        Tz::UTC,
        &KeywordInterpreter,
        received(),
    )
}

fn warned(normalized: &meeting_scheduler::request::Normalized, field: &str) -> bool {
    normalized.warnings.iter().any(|w| w.field == field)
}

struct FixedInterpreter(Interpretation);

impl RequestInterpreter for FixedInterpreter {
    fn interpret(&self, _email_content: &str, _received_at: DateTime<Utc>) -> Interpretation {
        self.0
    }
}

// ── Decoding ────────────────────────────────────────────────────────────────

#[test]
fn decodes_original_field_spellings() {
    let request: SchedulingRequest = serde_json::from_str(
        r#"{
            "Request_id": "6118b54f-907b-4451-8d48-dd13d76033a5",
            "From": "userone.amd@gmail.com",
            "Attendees": [{"email": "usertwo.amd@gmail.com"}, "userthree.amd@gmail.com"],
            "Subject": "Agentic AI Project Status Update",
            "EmailContent": "Hi team, let's meet on Thursday for 30 minutes to discuss the status of Agentic AI Project.",
            "Duration_mins": "30",
            "Location": "IISc Bangalore"
        }"#,
    )
    .unwrap();

    assert_eq!(
        request.request_id.as_deref(),
        Some("6118b54f-907b-4451-8d48-dd13d76033a5")
    );
    assert_eq!(
        request.attendees,
        vec![
            AttendeeRef::Email {
                email: "usertwo.amd@gmail.com".to_string()
            },
            AttendeeRef::Id("userthree.amd@gmail.com".to_string()),
        ]
    );
    assert_eq!(request.duration_minutes, Some(DurationField::Text("30".to_string())));
}

#[test]
fn decodes_camel_case_fields() {
    let request: SchedulingRequest = serde_json::from_str(
        r#"{"requestId": "r-1", "from": "a@x.io", "attendees": ["b@x.io"], "durationMinutes": 45}"#,
    )
    .unwrap();
    assert_eq!(request.request_id.as_deref(), Some("r-1"));
    assert_eq!(request.duration_minutes, Some(DurationField::Minutes(45)));
}

// ── Normalization ───────────────────────────────────────────────────────────

#[test]
fn complete_request_needs_no_fallbacks() {
    let request = SchedulingRequest {
        request_id: Some("r-1".to_string()),
        from: Some("Ana@Example.com".to_string()),
        attendees: vec![AttendeeRef::Id(" bo@example.com ".to_string())],
        subject: Some("Sync".to_string()),
        email_content: Some("Quick sync".to_string()),
        start: Some("2026-03-16T09:00:00Z".to_string()),
        end: Some("2026-03-16T12:00:00Z".to_string()),
        duration_minutes: Some(DurationField::Minutes(45)),
        location: Some("Room 1".to_string()),
    };
    let normalized = normalize(&request);
    let meeting = &normalized.meeting;

    assert!(normalized.warnings.is_empty(), "{:?}", normalized.warnings);
    assert_eq!(meeting.organizer, "ana@example.com");
    assert_eq!(
        meeting.attendees.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["ana@example.com", "bo@example.com"]
    );
    assert_eq!(meeting.duration_minutes, 45);
    assert_eq!(meeting.window_start, Utc.with_ymd_and_hms(2026, 3, 16, 9, 0, 0).unwrap());
    assert_eq!(meeting.window_end, Utc.with_ymd_and_hms(2026, 3, 16, 12, 0, 0).unwrap());
    assert_eq!(meeting.location.as_deref(), Some("Room 1"));
    assert_eq!(meeting.priority, Priority::Normal);
}

#[test]
fn empty_request_falls_back_to_defaults() {
    let normalized = normalize(&SchedulingRequest::default());
    let meeting = &normalized.meeting;

    assert!(!meeting.request_id.is_empty());
    assert_eq!(meeting.organizer, "");
    assert!(meeting.attendees.is_empty());
    assert_eq!(meeting.duration_minutes, 30);
    assert_eq!(meeting.window_start, received());
    assert_eq!(meeting.window_end, received() + chrono::Duration::days(7));
    assert_eq!(meeting.subject, "Meeting");
    assert_eq!(meeting.priority, Priority::Normal);
    for field in ["requestId", "from", "start", "end", "subject"] {
        assert!(warned(&normalized, field), "expected a warning for {}", field);
    }
}

#[test]
fn missing_organizer_uses_first_attendee() {
    let request = SchedulingRequest {
        attendees: vec![
            AttendeeRef::Id("zed@example.com".to_string()),
            AttendeeRef::Id("amy@example.com".to_string()),
            AttendeeRef::Id("  ".to_string()),
        ],
        ..Default::default()
    };
    let normalized = normalize(&request);

    assert_eq!(normalized.meeting.organizer, "amy@example.com");
    assert_eq!(normalized.meeting.attendees.len(), 2);
    assert!(warned(&normalized, "from"));
    assert!(warned(&normalized, "attendees"));
}

#[test]
fn duration_comes_from_email_text_when_not_given() {
    let request = SchedulingRequest {
        email_content: Some("Can we schedule a 1-hour urgent meeting tomorrow?".to_string()),
        ..Default::default()
    };
    let meeting = normalize(&request).meeting;
    assert_eq!(meeting.duration_minutes, 60);
    assert_eq!(meeting.priority, Priority::Urgent);
}

#[test]
fn explicit_duration_beats_email_text() {
    let request = SchedulingRequest {
        email_content: Some("let's take an hour".to_string()),
        duration_minutes: Some(DurationField::Minutes(20)),
        ..Default::default()
    };
    assert_eq!(normalize(&request).meeting.duration_minutes, 20);
}

#[test]
fn malformed_duration_falls_through_with_warning() {
    let request = SchedulingRequest {
        duration_minutes: Some(DurationField::Text("soon".to_string())),
        ..Default::default()
    };
    let normalized = normalize(&request);
    assert_eq!(normalized.meeting.duration_minutes, 30);
    assert!(warned(&normalized, "durationMinutes"));
}

#[test]
fn short_duration_is_raised_to_minimum() {
    let request = SchedulingRequest {
        duration_minutes: Some(DurationField::Minutes(5)),
        ..Default::default()
    };
    let normalized = normalize(&request);
    assert_eq!(normalized.meeting.duration_minutes, 15);
    assert!(warned(&normalized, "durationMinutes"));
}

#[test]
fn end_before_start_uses_horizon() {
    let request = SchedulingRequest {
        start: Some("2026-03-16T09:00:00Z".to_string()),
        end: Some("2026-03-16T08:00:00Z".to_string()),
        ..Default::default()
    };
    let normalized = normalize(&request);
    assert_eq!(
        normalized.meeting.window_end,
        Utc.with_ymd_and_hms(2026, 3, 23, 9, 0, 0).unwrap()
    );
    assert!(warned(&normalized, "end"));
}

#[test]
fn extended_year_start_falls_back_to_request_time() {
    let request = SchedulingRequest {
        start: Some("+262142-12-31T00:00".to_string()),
        ..Default::default()
    };
    let normalized = normalize(&request);
    assert_eq!(normalized.meeting.window_start, received());
    assert_eq!(normalized.meeting.window_end, received() + Duration::days(7));
    assert!(warned(&normalized, "start"));
}

#[test]
fn extended_year_end_falls_back_to_horizon() {
    let request = SchedulingRequest {
        start: Some("2026-03-16T09:00:00Z".to_string()),
        end: Some("+262142-12-31T23:59:59Z".to_string()),
        ..Default::default()
    };
    let normalized = normalize(&request);
    assert_eq!(
        normalized.meeting.window_end,
        Utc.with_ymd_and_hms(2026, 3, 23, 9, 0, 0).unwrap()
    );
    assert!(warned(&normalized, "end"));
}

#[test]
fn last_supported_year_start_keeps_a_full_window() {
    let request = SchedulingRequest {
        start: Some("9999-12-31T09:00:00Z".to_string()),
        ..Default::default()
    };
    let normalized = normalize(&request);
    let start = Utc.with_ymd_and_hms(9999, 12, 31, 9, 0, 0).unwrap();
    assert_eq!(normalized.meeting.window_start, start);
    assert_eq!(normalized.meeting.window_end, start + Duration::days(7));
    assert!(!warned(&normalized, "start"));
}

#[test]
fn unvalidated_huge_horizon_is_clamped() {
    let mut config = SchedulerConfig::default();
    config.defaults.horizon_days = i64::MAX;
    let normalized = normalize_request(
        &SchedulingRequest::default(),
        &config,
        Tz::UTC,
        &KeywordInterpreter,
        received(),
    );
    assert_eq!(normalized.meeting.window_end, received() + Duration::days(3660));
}

#[test]
fn naive_timestamps_use_configured_timezone() {
    let request = SchedulingRequest {
        start: Some("2026-03-16T09:00:00".to_string()),
        end: Some("2026-03-16".to_string()),
        ..Default::default()
    };
    let kolkata: Tz = "Asia/Kolkata".parse().unwrap();
    let normalized = normalize_request(
        &request,
        &SchedulerConfig::default(),
        kolkata,
        &KeywordInterpreter,
        received(),
    );

    assert_eq!(
        normalized.meeting.window_start,
        Utc.with_ymd_and_hms(2026, 3, 16, 3, 30, 0).unwrap()
    );
    assert_eq!(
        normalized.meeting.window_end,
        Utc.with_ymd_and_hms(2026, 3, 16, 18, 29, 59).unwrap()
    );
}

#[test]
fn custom_interpreter_fills_fields() {
    let interpreter = FixedInterpreter(Interpretation {
        duration_minutes: Some(50),
        priority: Some(Priority::Urgent),
    });
    let normalized = normalize_request(
        &SchedulingRequest::default(),
        &SchedulerConfig::default(),
        Tz::UTC,
        &interpreter,
        received(),
    );
    assert_eq!(normalized.meeting.duration_minutes, 50);
    assert_eq!(normalized.meeting.priority, Priority::Urgent);
}
