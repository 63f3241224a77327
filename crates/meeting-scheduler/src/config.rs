//! Scheduler configuration.
//!
//! Built once (from a TOML file or defaults) and passed by reference into the
//! aggregator, the intake layer and the orchestrator. Nothing reads the
//! environment.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use slot_engine::hours::BusinessHours;
use slot_engine::SearchParams;

use crate::error::ConfigError;
use crate::provider::{Reminder, ReminderMethod};

/// Longest fallback window, in days.
pub const MAX_HORIZON_DAYS: i64 = 3660;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub business_hours: BusinessHoursConfig,
    pub search: SearchConfig,
    pub provider: ProviderConfig,
    pub defaults: DefaultsConfig,
    pub booking: BookingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessHoursConfig {
    pub open_hour: u32,
    pub close_hour: u32,
    /// IANA timezone the opening hours are expressed in.
    pub timezone: String,
}

impl Default for BusinessHoursConfig {
    fn default() -> Self {
        Self {
            open_hour: 9,
            close_hour: 18,
            timezone: "UTC".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub granularity_minutes: u32,
    pub top_k: usize,
    pub buffer_minutes: u32,
    pub exclude_weekends: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            granularity_minutes: 15,
            top_k: 3,
            buffer_minutes: 15,
            exclude_weekends: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Per-attendee fetch timeout. An attendee whose calendar does not arrive
    /// in time is treated as unknown.
    pub fetch_timeout_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub duration_minutes: u32,
    pub min_duration_minutes: u32,
    /// Window length used when a request has no usable end.
    pub horizon_days: i64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            duration_minutes: 30,
            min_duration_minutes: 15,
            horizon_days: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingConfig {
    /// Reminders attached to every booked event. An empty list leaves the
    /// provider's own defaults in place.
    pub reminders: Vec<Reminder>,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            reminders: vec![
                Reminder {
                    method: ReminderMethod::Email,
                    minutes_before: 24 * 60,
                },
                Reminder {
                    method: ReminderMethod::Popup,
                    minutes_before: 10,
                },
            ],
        }
    }
}

impl SchedulerConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Read)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string. Missing keys take defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: SchedulerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.business_hours()?;
        if self.search.granularity_minutes == 0 {
            return Err(ConfigError::Invalid(
                "search.granularity_minutes must be positive".to_string(),
            ));
        }
        if self.search.top_k == 0 {
            return Err(ConfigError::Invalid("search.top_k must be positive".to_string()));
        }
        if self.provider.fetch_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "provider.fetch_timeout_ms must be positive".to_string(),
            ));
        }
        if self.defaults.min_duration_minutes == 0 {
            return Err(ConfigError::Invalid(
                "defaults.min_duration_minutes must be positive".to_string(),
            ));
        }
        if self.defaults.duration_minutes < self.defaults.min_duration_minutes {
            return Err(ConfigError::Invalid(format!(
                "defaults.duration_minutes ({}) is below defaults.min_duration_minutes ({})",
                self.defaults.duration_minutes, self.defaults.min_duration_minutes
            )));
        }
        if self.defaults.horizon_days <= 0 || self.defaults.horizon_days > MAX_HORIZON_DAYS {
            return Err(ConfigError::Invalid(format!(
                "defaults.horizon_days must be between 1 and {}",
                MAX_HORIZON_DAYS
            )));
        }
        Ok(())
    }

    /// Business hours as the engine understands them.
    pub fn business_hours(&self) -> Result<BusinessHours, ConfigError> {
        let hours = &self.business_hours;
        BusinessHours::with_timezone_name(hours.open_hour, hours.close_hour, &hours.timezone)
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.provider.fetch_timeout_ms)
    }

    /// Fallback window length, clamped to `1..=MAX_HORIZON_DAYS` days so an
    /// unvalidated value cannot overflow.
    pub fn horizon(&self) -> chrono::Duration {
        chrono::Duration::days(self.defaults.horizon_days.clamp(1, MAX_HORIZON_DAYS))
    }

    /// Search parameters for one request, with this configuration's grid,
    /// hours, ranking depth and buffer.
    pub fn search_params(
        &self,
        duration_minutes: u32,
        window_start: chrono::DateTime<chrono::Utc>,
        window_end: chrono::DateTime<chrono::Utc>,
    ) -> Result<SearchParams, ConfigError> {
        Ok(SearchParams::new(duration_minutes, window_start, window_end)
            .with_granularity(self.search.granularity_minutes)
            .with_business_hours(self.business_hours()?)
            .with_top_k(self.search.top_k)
            .with_buffer(self.search.buffer_minutes)
            .excluding_weekends(self.search.exclude_weekends))
    }
}
