//! Tests for conflict classification and resolution counters.

use chrono::{TimeZone, Utc};
use slot_engine::{analyze, classify, Conflict, ResolutionAction, TimeRange};

/// Helper: a conflict for `summary` on 2026-03-16 10:00-11:00 UTC.
fn conflict(summary: &str) -> Conflict {
    Conflict {
        attendee: "ana@example.com".to_string(),
        event_summary: summary.to_string(),
        event_interval: TimeRange::new(
            Utc.with_ymd_and_hms(2026, 3, 16, 10, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 16, 11, 0, 0).unwrap(),
        ),
    }
}

#[test]
fn mixed_conflicts_classified_in_order() {
    let conflicts = vec![
        conflict("Weekly 1:1 sync"),
        conflict("Optional brainstorm"),
        conflict("Board review"),
    ];

    let analysis = analyze(&conflicts);

    let actions: Vec<_> = analysis
        .resolution_strategies
        .iter()
        .map(|s| s.action)
        .collect();
    assert_eq!(
        actions,
        vec![
            ResolutionAction::SendRescheduleRequest,
            ResolutionAction::MarkAsResolved,
            ResolutionAction::FindAlternative,
        ]
    );
    assert_eq!(analysis.auto_resolvable, 2);
    assert_eq!(analysis.requires_human_intervention, 1);
}

#[test]
fn strategies_keep_the_original_conflict() {
    let conflicts = vec![conflict("Board review")];
    let analysis = analyze(&conflicts);
    assert_eq!(analysis.resolution_strategies[0].conflict, conflicts[0]);
    assert_eq!(
        analysis.resolution_strategies[0].suggestion,
        "Find alternative time slot or negotiate priority"
    );
}

#[test]
fn classification_ignores_case() {
    assert_eq!(classify("OPTIONAL: demo"), ResolutionAction::MarkAsResolved);
    assert_eq!(classify("Team Sync (Optional)"), ResolutionAction::MarkAsResolved);
    assert_eq!(classify("1:1 WITH MANAGER"), ResolutionAction::SendRescheduleRequest);
}

#[test]
fn one_on_one_takes_precedence_over_optional() {
    assert_eq!(
        classify("Optional 1:1 catch-up"),
        ResolutionAction::SendRescheduleRequest
    );
}

#[test]
fn unmatched_and_empty_summaries_need_alternative() {
    assert_eq!(classify(""), ResolutionAction::FindAlternative);
    assert_eq!(classify("1-1 sync"), ResolutionAction::FindAlternative);
    assert_eq!(classify("Quarterly planning"), ResolutionAction::FindAlternative);
}

#[test]
fn empty_input_yields_empty_analysis() {
    let analysis = analyze(&[]);
    assert!(analysis.resolution_strategies.is_empty());
    assert_eq!(analysis.auto_resolvable, 0);
    assert_eq!(analysis.requires_human_intervention, 0);
}

#[test]
fn analysis_serializes_with_wire_names() {
    let analysis = analyze(&[conflict("Weekly 1:1 sync")]);
    let json = serde_json::to_value(&analysis).unwrap();

    assert_eq!(json["autoResolvable"], 1);
    assert_eq!(json["requiresHumanIntervention"], 0);
    assert_eq!(
        json["resolutionStrategies"][0]["action"],
        "send_reschedule_request"
    );
    assert_eq!(
        json["resolutionStrategies"][0]["conflict"]["eventSummary"],
        "Weekly 1:1 sync"
    );
}
