//! Classify blocking events and propose a resolution for each.
//!
//! Classification looks only at the event summary, case-insensitively, in
//! fixed precedence: `1:1` → reschedule request, `optional` → resolved,
//! anything else → find an alternative. The rule is total and preserves
//! input order.

use serde::{Deserialize, Serialize};

use crate::request::TimeRange;

/// An attendee's busy event that blocks a candidate or requested time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    pub attendee: String,
    pub event_summary: String,
    pub event_interval: TimeRange,
}

/// What to do about a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionAction {
    SendRescheduleRequest,
    MarkAsResolved,
    FindAlternative,
}

impl ResolutionAction {
    /// Everything except `FindAlternative` can be handled without a human.
    pub fn is_auto_resolvable(self) -> bool {
        !matches!(self, ResolutionAction::FindAlternative)
    }

    pub fn suggestion(self) -> &'static str {
        match self {
            ResolutionAction::SendRescheduleRequest => {
                "Request to reschedule 1:1 meeting as group meeting has higher priority"
            }
            ResolutionAction::MarkAsResolved => "Attendee can skip optional meeting",
            ResolutionAction::FindAlternative => "Find alternative time slot or negotiate priority",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionStrategy {
    pub conflict: Conflict,
    pub suggestion: String,
    pub action: ResolutionAction,
}

/// Strategies in input order plus the derived counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictAnalysis {
    pub resolution_strategies: Vec<ResolutionStrategy>,
    pub auto_resolvable: usize,
    pub requires_human_intervention: usize,
}

/// Map an event summary to its resolution action.
pub fn classify(event_summary: &str) -> ResolutionAction {
    let summary = event_summary.to_lowercase();
    if summary.contains("1:1") {
        ResolutionAction::SendRescheduleRequest
    } else if summary.contains("optional") {
        ResolutionAction::MarkAsResolved
    } else {
        ResolutionAction::FindAlternative
    }
}

/// Propose one strategy per conflict, preserving order.
pub fn analyze(conflicts: &[Conflict]) -> ConflictAnalysis {
    let resolution_strategies: Vec<ResolutionStrategy> = conflicts
        .iter()
        .map(|conflict| {
            let action = classify(&conflict.event_summary);
            ResolutionStrategy {
                conflict: conflict.clone(),
                suggestion: action.suggestion().to_string(),
                action,
            }
        })
        .collect();

    let auto_resolvable = resolution_strategies
        .iter()
        .filter(|s| s.action.is_auto_resolvable())
        .count();

    ConflictAnalysis {
        requires_human_intervention: resolution_strategies.len() - auto_resolvable,
        auto_resolvable,
        resolution_strategies,
    }
}
