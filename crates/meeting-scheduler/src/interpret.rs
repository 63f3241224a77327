//! Pluggable interpretation of the free-text part of a request.
//!
//! An interpreter only fills in typed fields (duration, priority). It never
//! decides what the scheduler does next.

use chrono::{DateTime, Utc};
use slot_engine::Priority;

/// Fields an interpreter may extract from free text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Interpretation {
    pub duration_minutes: Option<u32>,
    pub priority: Option<Priority>,
}

pub trait RequestInterpreter: Send + Sync {
    fn interpret(&self, email_content: &str, received_at: DateTime<Utc>) -> Interpretation;
}

/// Keyword matching over the email body.
///
/// Durations: `30 minutes`, `45 mins`, `90min`, `1 hour`, `1-hour`, `2 hrs`,
/// `1.5 hours`, `an hour`, `one hour`, `half an hour`, `half hour`. The first
/// match wins. Priority is urgent on `urgent`, `asap`, `immediately` or
/// `as soon as possible`.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordInterpreter;

const URGENT_WORDS: [&str; 3] = ["urgent", "asap", "immediately"];

impl RequestInterpreter for KeywordInterpreter {
    fn interpret(&self, email_content: &str, _received_at: DateTime<Utc>) -> Interpretation {
        let tokens = tokenize(email_content);
        let urgent = tokens.iter().any(|t| URGENT_WORDS.contains(&t.as_str()))
            || tokens
                .windows(4)
                .any(|w| w == ["as", "soon", "as", "possible"]);

        Interpretation {
            duration_minutes: extract_duration(&tokens),
            priority: urgent.then_some(Priority::Urgent),
        }
    }
}

/// Lower-cased words; digits keep their decimal point, everything else splits.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '.' { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .map(|t| t.trim_matches('.'))
        .filter(|t| !t.is_empty())
        .flat_map(split_glued_unit)
        .collect()
}

/// `90min` → [`90`, `min`].
fn split_glued_unit(token: &str) -> Vec<String> {
    let digits = token
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(token.len());
    if digits == 0 || digits == token.len() {
        return vec![token.to_string()];
    }
    vec![token[..digits].to_string(), token[digits..].to_string()]
}

fn unit_minutes(unit: &str) -> Option<f64> {
    match unit {
        "minute" | "minutes" | "min" | "mins" => Some(1.0),
        "hour" | "hours" | "hr" | "hrs" | "h" => Some(60.0),
        _ => None,
    }
}

fn is_hour(unit: &str) -> bool {
    unit_minutes(unit) == Some(60.0)
}

fn extract_duration(tokens: &[String]) -> Option<u32> {
    for (i, token) in tokens.iter().enumerate() {
        let next = tokens.get(i + 1).map(String::as_str);
        let after = tokens.get(i + 2).map(String::as_str);

        if token == "half" {
            match (next, after) {
                (Some(unit), _) if is_hour(unit) => return Some(30),
                (Some("a" | "an"), Some(unit)) if is_hour(unit) => return Some(30),
                _ => continue,
            }
        }

        let Some(unit) = next else { continue };
        let value = match token.parse::<f64>() {
            Ok(n) => n * unit_minutes(unit).unwrap_or(0.0),
            Err(_) => match token.as_str() {
                "a" | "an" | "one" if is_hour(unit) => 60.0,
                "two" if is_hour(unit) => 120.0,
                _ => 0.0,
            },
        };
        if value >= 1.0 && value.is_finite() {
            return Some(value.round() as u32);
        }
    }
    None
}
