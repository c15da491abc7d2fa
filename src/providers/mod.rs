/// Council water restriction providers.
///
/// Every council publishes its current restriction level as unstructured
/// HTML, so each one gets its own file with a hostname, an endpoint table
/// and a text pattern. The shapes of extraction form a closed set
/// (`Extraction`); everything else about a provider is plain data in a
/// `ProviderDescriptor`.
///
/// Adding a council means adding a file here and one line to
/// `PROVIDER_REGISTRY`.

pub mod fixtures;
pub mod matamata_piako;
pub mod napier;
pub mod smartwater;
pub mod taupo;
pub mod watercare;

use crate::model::{FetchResult, WaterAlertError};
use crate::normalize::normalize;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

// ---------------------------------------------------------------------------
// Extraction capability
// ---------------------------------------------------------------------------

/// Anything that can turn a council page into a restriction level.
pub trait LevelExtractor {
    /// Stable lookup key used in location strings, e.g. `"watercare"`.
    fn service(&self) -> &'static str;

    /// Full URL for a region, or `None` if the provider does not serve it.
    fn endpoint(&self, region: &str) -> Option<String>;

    /// Reads the level out of a fetched page.
    ///
    /// Pure: the same page always gives the same result.
    fn find_level(&self, page: &str, area: &str) -> FetchResult;
}

// ---------------------------------------------------------------------------
// Provider descriptors
// ---------------------------------------------------------------------------

/// How a provider maps region names to paths on its host.
#[derive(Debug)]
pub enum Regions {
    /// One page covers every region.
    Any(&'static str),
    /// Region name (lower-case) to path.
    Named(&'static [(&'static str, &'static str)]),
}

/// How a provider turns pattern matches into a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// Scan every match in order; the first capture the shared normalizer
    /// accepts wins.
    FirstNormalized,
    /// Only the first match counts; its capture is a digit taken from an
    /// image filename.
    AssetFilename,
    /// Scan every match in order against a fixed heading phrase table.
    HeadingWord,
}

/// Immutable description of one council data source.
pub struct ProviderDescriptor {
    /// Lookup key, unique across the registry.
    pub service: &'static str,
    /// Human-readable council name.
    pub council: &'static str,
    /// Scheme and host, no trailing slash.
    pub hostname: &'static str,
    pub regions: Regions,
    /// Capture group 1 holds the raw level token.
    pub pattern: &'static Lazy<Regex>,
    pub extraction: Extraction,
}

impl ProviderDescriptor {
    /// Region names this provider understands, for error messages.
    /// Empty when any region is accepted.
    pub fn region_names(&self) -> Vec<&'static str> {
        match self.regions {
            Regions::Any(_) => Vec::new(),
            Regions::Named(table) => table.iter().map(|(name, _)| *name).collect(),
        }
    }
}

impl LevelExtractor for ProviderDescriptor {
    fn service(&self) -> &'static str {
        self.service
    }

    fn endpoint(&self, region: &str) -> Option<String> {
        let path = match self.regions {
            Regions::Any(path) => path,
            Regions::Named(table) => {
                let region = region.trim().to_lowercase();
                table
                    .iter()
                    .find(|(name, _)| *name == region)
                    .map(|(_, path)| *path)?
            }
        };
        Some(format!("{}{}", self.hostname, path))
    }

    fn find_level(&self, page: &str, _area: &str) -> FetchResult {
        let regex: &Regex = self.pattern;
        match self.extraction {
            Extraction::FirstNormalized => first_normalized(regex, page),
            Extraction::AssetFilename => smartwater::read_asset_level(regex, page),
            Extraction::HeadingWord => matamata_piako::read_heading_level(regex, page),
        }
    }
}

/// Shared strategy for providers whose pattern captures free text.
fn first_normalized(regex: &Regex, page: &str) -> FetchResult {
    for caps in regex.captures_iter(page) {
        // A repeated group that never matched leaves nothing to normalize
        let Some(token) = caps.get(1) else {
            continue;
        };
        debug!("Data Level {}", token.as_str());

        if let Ok(level) = normalize(token.as_str()) {
            return Ok(level);
        }
    }
    Err(WaterAlertError::Parse)
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Every supported council, keyed by `service`.
pub static PROVIDER_REGISTRY: &[&ProviderDescriptor] = &[
    &watercare::PROVIDER,
    &napier::PROVIDER,
    &taupo::PROVIDER,
    &smartwater::PROVIDER,
    &matamata_piako::PROVIDER,
];

/// Looks up a provider by service id (case-insensitive).
pub fn find_provider(service: &str) -> Option<&'static ProviderDescriptor> {
    let service = service.trim();
    PROVIDER_REGISTRY
        .iter()
        .copied()
        .find(|p| p.service.eq_ignore_ascii_case(service))
}

/// All registered service ids.
pub fn all_services() -> Vec<&'static str> {
    PROVIDER_REGISTRY.iter().map(|p| p.service).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AlertLevel;
    use std::collections::HashSet;

    #[test]
    fn test_service_ids_are_unique() {
        let services = all_services();
        let unique: HashSet<_> = services.iter().collect();
        assert_eq!(services.len(), unique.len(), "duplicate service id in registry");
        assert_eq!(services.len(), 5);
    }

    #[test]
    fn test_find_provider_is_case_insensitive() {
        let provider = find_provider("WaterCare").expect("watercare should be registered");
        assert_eq!(provider.service(), "watercare");
        assert!(find_provider(" smartwater ").is_some());
        assert!(find_provider("wellingtonwater").is_none());
    }

    #[test]
    fn test_every_provider_has_an_https_or_http_host() {
        for provider in PROVIDER_REGISTRY {
            assert!(
                provider.hostname.starts_with("http://") || provider.hostname.starts_with("https://"),
                "{}: hostname must carry a scheme",
                provider.service
            );
            assert!(!provider.hostname.ends_with('/'), "{}: no trailing slash", provider.service);
        }
    }

    #[test]
    fn test_named_regions_reject_unknown_region() {
        let provider = find_provider("smartwater").unwrap();
        assert!(provider.endpoint("auckland").is_none());
        assert_eq!(provider.region_names(), vec!["hamilton", "waitomo", "waipa"]);
    }

    #[test]
    fn test_any_region_provider_ignores_region() {
        let provider = find_provider("napiercitycouncil").unwrap();
        assert_eq!(provider.endpoint("city"), provider.endpoint("anything"));
        assert!(provider.region_names().is_empty());
    }

    #[test]
    fn test_first_normalized_skips_unrecognized_captures() {
        let regex = Regex::new(r"<b>(\w+)</b>").unwrap();
        let page = "<b>Water</b><b>Saving</b><b>three</b><b>one</b>";
        assert_eq!(first_normalized(&regex, page), Ok(AlertLevel::THREE));
    }

    #[test]
    fn test_first_normalized_without_matches_is_parse_error() {
        let regex = Regex::new(r"<b>(\w+)</b>").unwrap();
        assert_eq!(first_normalized(&regex, "<p>nothing</p>"), Err(WaterAlertError::Parse));
        assert_eq!(first_normalized(&regex, "<b>Water</b>"), Err(WaterAlertError::Parse));
    }
}
