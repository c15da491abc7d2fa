/// Thing handler: turns one poll result into a status update.
///
/// A successful poll marks the thing online and publishes the level on
/// `CHANNEL_ALERT_LEVEL`. A failed poll marks it offline with a message the
/// user can act on and shortens the wait before the next attempt. The
/// normal refresh interval comes back after the next success.

use crate::client::{PageSource, WaterAlertClient};
use crate::model::{AlertLevel, CHANNEL_ALERT_LEVEL, FetchResult, WaterAlertError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Refresh interval used when the configuration does not give one.
pub const DEFAULT_REFRESH_HOURS: u64 = 5;

/// Longest refresh interval a thing may configure (one year).
pub const MAX_REFRESH_HOURS: u64 = 24 * 365;

/// Wait before retrying after a failed poll.
pub const RETRY_HOURS: u64 = 3;

pub const MSG_TIMEOUT: &str = "Request timeout";
pub const MSG_PARSE: &str = "Unable to parse response";
pub const MSG_UNKNOWN: &str = "Unable to get water level";

const SECONDS_PER_HOUR: u64 = 60 * 60;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusDetail {
    CommunicationError,
    ConfigurationError,
}

/// Connectivity status of a configured thing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ThingStatus {
    /// Not polled yet.
    Unknown,
    Online,
    Offline { detail: StatusDetail, message: String },
}

impl ThingStatus {
    pub fn offline(detail: StatusDetail, message: impl Into<String>) -> Self {
        ThingStatus::Offline {
            detail,
            message: message.into(),
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, ThingStatus::Online)
    }
}

/// Status a poll result maps to.
pub fn status_for(result: &FetchResult) -> ThingStatus {
    match result {
        Ok(_) => ThingStatus::Online,
        Err(WaterAlertError::Timeout(_)) => {
            ThingStatus::offline(StatusDetail::CommunicationError, MSG_TIMEOUT)
        }
        Err(WaterAlertError::Parse) => ThingStatus::offline(StatusDetail::CommunicationError, MSG_PARSE),
        Err(WaterAlertError::Configuration(_)) => {
            ThingStatus::offline(StatusDetail::CommunicationError, MSG_UNKNOWN)
        }
    }
}

/// Receives status changes and channel values for configured things.
pub trait StatusSink: Send + Sync {
    fn update_status(&self, thing_id: &str, status: ThingStatus);

    fn publish_level(&self, thing_id: &str, channel: &str, level: AlertLevel, at: DateTime<Utc>);
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

/// Delays used by the poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    /// Wait before the first poll.
    pub initial_delay: Duration,
    /// Wait after a successful poll.
    pub refresh_interval: Duration,
    /// Wait after a failed poll.
    pub retry_interval: Duration,
}

impl PollSchedule {
    /// Polls immediately, then every `refresh_hours`, retrying failures
    /// after `RETRY_HOURS`.
    pub fn hours(refresh_hours: u64) -> Self {
        Self {
            initial_delay: Duration::ZERO,
            refresh_interval: Duration::from_secs(refresh_hours.saturating_mul(SECONDS_PER_HOUR)),
            retry_interval: Duration::from_secs(RETRY_HOURS * SECONDS_PER_HOUR),
        }
    }

    /// Wait before the poll that follows `result`.
    pub fn next_delay(&self, result: &FetchResult) -> Duration {
        match result {
            Ok(_) => self.refresh_interval,
            Err(_) => self.retry_interval,
        }
    }
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self::hours(DEFAULT_REFRESH_HOURS)
    }
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

/// One configured thing: its client, where results go, and its schedule.
pub struct AlertHandler<S: PageSource> {
    thing_id: String,
    client: WaterAlertClient<S>,
    sink: Arc<dyn StatusSink>,
    schedule: PollSchedule,
}

impl<S: PageSource> AlertHandler<S> {
    pub fn new(
        thing_id: impl Into<String>,
        client: WaterAlertClient<S>,
        sink: Arc<dyn StatusSink>,
        schedule: PollSchedule,
    ) -> Self {
        Self {
            thing_id: thing_id.into(),
            client,
            sink,
            schedule,
        }
    }

    pub fn thing_id(&self) -> &str {
        &self.thing_id
    }

    pub fn schedule(&self) -> PollSchedule {
        self.schedule
    }

    /// Polls once, reports the outcome and returns the wait before the
    /// next poll.
    pub fn update(&self) -> Duration {
        let result = self.client.get_level();
        let status = status_for(&result);

        match &result {
            Ok(level) => {
                debug!(thing = %self.thing_id, level = %level, "Poll succeeded");
                self.sink.update_status(&self.thing_id, status);
                self.sink
                    .publish_level(&self.thing_id, CHANNEL_ALERT_LEVEL, *level, Utc::now());
            }
            Err(e) => {
                warn!(thing = %self.thing_id, error = %e, "Poll failed");
                self.sink.update_status(&self.thing_id, status);
            }
        }

        self.schedule.next_delay(&result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
