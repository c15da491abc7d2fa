/// Taupo District Council water conservation page.
///
/// The district has not been in restrictions since this provider was
/// added, so the pattern follows the wording of its other notices:
/// `<strong>Level Two restrictions</strong>`. The last word before
/// "restrictions" is the level.

use super::{Extraction, ProviderDescriptor, Regions};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

const HOSTNAME: &str = "https://www.taupodc.govt.nz";
const REGION_DISTRICT: &str = "/transport-and-water/water-conservation";

const PATTERN: &str = r"<strong>((?-u:\w)+ )*restrictions</strong>";

static REGEX: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(PATTERN)
        .case_insensitive(true)
        .build()
        .expect("taupo pattern is valid")
});

pub static PROVIDER: ProviderDescriptor = ProviderDescriptor {
    service: "taupodistrictcouncil",
    council: "Taupo District Council",
    hostname: HOSTNAME,
    regions: Regions::Any(REGION_DISTRICT),
    pattern: &REGEX,
    extraction: Extraction::FirstNormalized,
};
