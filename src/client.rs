/// Water alert client: location string in, restriction level out.
///
/// A location looks like `"<service>:<region>[:<area>]"`, for example
/// `"smartwater:hamilton"` or `"watercare:city"`. It is resolved once, when
/// the client is built, so a bad location is reported at startup and never
/// during polling.
///
/// Each `get_level` call is exactly one blocking GET through a
/// `PageSource`. There is no retry here; the poller decides when to try
/// again.

use crate::model::{FetchResult, WaterAlertError};
use crate::providers::{self, LevelExtractor, ProviderDescriptor};
use std::time::Duration;
use tracing::{debug, warn};

/// Request timeout for council pages.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// A parsed location string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub service: String,
    pub region: String,
    /// Sub-area within the region; empty when not given.
    pub area: String,
}

impl Location {
    /// Parses `"<service>:<region>[:<area>]"`.
    ///
    /// # Errors
    /// `WaterAlertError::Configuration` if the service or region is
    /// missing or there are more than three parts.
    pub fn parse(location: &str) -> Result<Self, WaterAlertError> {
        let parts: Vec<&str> = location.trim().split(':').map(str::trim).collect();

        let (service, region, area) = match parts.as_slice() {
            [service, region] => (*service, *region, ""),
            [service, region, area] => (*service, *region, *area),
            _ => {
                return Err(WaterAlertError::Configuration(format!(
                    "Location '{}' must look like <service>:<region>[:<area>]",
                    location
                )));
            }
        };

        if service.is_empty() || region.is_empty() {
            return Err(WaterAlertError::Configuration(format!(
                "Location '{}' is missing a service or region",
                location
            )));
        }

        Ok(Location {
            service: service.to_lowercase(),
            region: region.to_lowercase(),
            area: area.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// HTTP collaborator
// ---------------------------------------------------------------------------

/// Fetches a page body. Any failure to get a body is a timeout as far as
/// the caller is concerned.
pub trait PageSource: Send + Sync {
    fn fetch(&self, url: &str) -> Result<String, WaterAlertError>;
}

/// `PageSource` backed by a blocking reqwest client.
pub struct HttpPageSource {
    client: reqwest::blocking::Client,
}

impl HttpPageSource {
    /// Client with the standard `REQUEST_TIMEOUT`.
    pub fn new() -> Result<Self, WaterAlertError> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, WaterAlertError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("nzwater_service/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WaterAlertError::Configuration(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl PageSource for HttpPageSource {
    fn fetch(&self, url: &str) -> Result<String, WaterAlertError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| WaterAlertError::Timeout(e.to_string()))?;

        if !response.status().is_success() {
            return Err(WaterAlertError::Timeout(format!("HTTP {} from {}", response.status(), url)));
        }

        response
            .text()
            .map_err(|e| WaterAlertError::Timeout(format!("Failed to read body: {}", e)))
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Resolved location plus the page source used to poll it.
pub struct WaterAlertClient<S: PageSource = HttpPageSource> {
    source: S,
    provider: &'static ProviderDescriptor,
    location: Location,
    url: String,
}

impl WaterAlertClient<HttpPageSource> {
    /// Builds a client that fetches over HTTP with `REQUEST_TIMEOUT`.
    pub fn new(location: &str) -> Result<Self, WaterAlertError> {
        Self::with_source(HttpPageSource::new()?, location)
    }
}

impl<S: PageSource> WaterAlertClient<S> {
    /// Builds a client around any page source.
    ///
    /// # Errors
    /// `WaterAlertError::Configuration` when the location does not parse,
    /// names an unregistered service, or names a region the provider does
    /// not serve.
    pub fn with_source(source: S, location: &str) -> Result<Self, WaterAlertError> {
        let location = Location::parse(location)?;

        let provider = providers::find_provider(&location.service).ok_or_else(|| {
            WaterAlertError::Configuration(format!(
                "Unknown service '{}' (known: {})",
                location.service,
                providers::all_services().join(", ")
            ))
        })?;

        let url = provider.endpoint(&location.region).ok_or_else(|| {
            WaterAlertError::Configuration(format!(
                "Service '{}' has no region '{}' (known: {})",
                provider.service,
                location.region,
                provider.region_names().join(", ")
            ))
        })?;

        debug!(service = provider.service, url = %url, "Resolved location");

        Ok(Self {
            source,
            provider,
            location,
            url,
        })
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn provider(&self) -> &'static ProviderDescriptor {
        self.provider
    }

    /// URL polled on every `get_level` call.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetches the page once and reads the level from it.
    ///
    /// Fetch failures come back as `WaterAlertError::Timeout`; pages the
    /// provider cannot read come back as `WaterAlertError::Parse`.
    pub fn get_level(&self) -> FetchResult {
        debug!("Fetching {}", self.url);

        let page = self.source.fetch(&self.url).inspect_err(|e| {
            warn!(service = self.provider.service, error = %e, "Fetch failed");
        })?;

        self.provider.find_level(&page, &self.location.area)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
