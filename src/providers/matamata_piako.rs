/// Matamata-Piako District Council current water situation page.
///
/// The situation is announced in an `<h5>` heading such as
/// "Level Two water restrictions ...". Headings are matched against a
/// fixed phrase table rather than the shared normalizer: bare words such
/// as "two" are not accepted here, and a heading without a "Level X"
/// phrase does not match at all.

use super::{Extraction, ProviderDescriptor, Regions};
use crate::model::{AlertLevel, FetchResult, WaterAlertError};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use tracing::debug;

const HOSTNAME: &str = "https://www.mpdc.govt.nz";
const REGION_DISTRICT: &str = "/water/current-water-situation";

const PATTERN: &str = r"<h5>.*?\b(level .*?) water restrictions.*?</h5>";

static REGEX: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(PATTERN)
        .case_insensitive(true)
        .multi_line(true)
        .dot_matches_new_line(true)
        .build()
        .expect("matamata-piako pattern is valid")
});

pub static PROVIDER: ProviderDescriptor = ProviderDescriptor {
    service: "matamatapiakodistrictcouncil",
    council: "Matamata-Piako District Council",
    hostname: HOSTNAME,
    regions: Regions::Named(&[("district", REGION_DISTRICT)]),
    pattern: &REGEX,
    extraction: Extraction::HeadingWord,
};

/// Scans headings in order; the first recognised phrase wins.
pub(crate) fn read_heading_level(regex: &Regex, page: &str) -> FetchResult {
    for caps in regex.captures_iter(page) {
        let Some(phrase) = caps.get(1) else {
            continue;
        };
        debug!("Data Level {}", phrase.as_str());

        let level = match phrase.as_str().trim().to_lowercase().as_str() {
            "no" => AlertLevel::NONE,
            "level one" => AlertLevel::ONE,
            "level two" => AlertLevel::TWO,
            "level three" => AlertLevel::THREE,
            "level four" => AlertLevel::FOUR,
            _ => continue,
        };
        return Ok(level);
    }
    Err(WaterAlertError::Parse)
}
