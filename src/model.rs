/// Shared data types for the water alert service.
///
/// Everything that crosses a module boundary lives here: the alert level
/// itself, the error taxonomy, and the integer sentinel codes used when a
/// level has to be published as a plain number.

use std::fmt;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Channel identifiers
// ---------------------------------------------------------------------------

/// Channel that receives the numeric restriction level.
pub const CHANNEL_ALERT_LEVEL: &str = "alertlevel";

// ---------------------------------------------------------------------------
// Sentinel codes
// ---------------------------------------------------------------------------

/// Integer published when a page was fetched but no level could be read.
pub const ERROR_PARSE: i32 = -1;

/// Integer published when the page could not be fetched at all.
pub const ERROR_TIMEOUT: i32 = -2;

// ---------------------------------------------------------------------------
// Alert level
// ---------------------------------------------------------------------------

/// Water restriction level, 0 (no restrictions) through 4.
///
/// The inner value is private so a level outside `0..=4` can never be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct AlertLevel(u8);

impl AlertLevel {
    pub const NONE: AlertLevel = AlertLevel(0);
    pub const ONE: AlertLevel = AlertLevel(1);
    pub const TWO: AlertLevel = AlertLevel(2);
    pub const THREE: AlertLevel = AlertLevel(3);
    pub const FOUR: AlertLevel = AlertLevel(4);

    /// Highest level any council publishes.
    pub const MAX: u8 = 4;

    /// Returns `None` for anything above level four.
    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::MAX).then_some(AlertLevel(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Everything that can stop a poll from producing a level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WaterAlertError {
    /// The page was fetched but nothing in it matched a known level.
    #[error("Unable to parse response")]
    Parse,

    /// The request did not complete (timeout, connection or HTTP failure).
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Missing or unusable location; raised once at initialization.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl WaterAlertError {
    /// Sentinel integer for hosts that publish a plain number.
    ///
    /// Configuration errors never reach a channel, so they share the
    /// parse code.
    pub fn code(&self) -> i32 {
        match self {
            WaterAlertError::Timeout(_) => ERROR_TIMEOUT,
            WaterAlertError::Parse | WaterAlertError::Configuration(_) => ERROR_PARSE,
        }
    }
}

/// Outcome of a single poll cycle.
pub type FetchResult = Result<AlertLevel, WaterAlertError>;

/// Flattens a poll outcome into the integer channel contract:
/// `0..=4` on success, a negative sentinel otherwise.
pub fn level_code(result: &FetchResult) -> i32 {
    match result {
        Ok(level) => i32::from(level.value()),
        Err(e) => e.code(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
