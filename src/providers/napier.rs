/// Napier City Council water restrictions page.
///
/// The status box is a `class="waterstat"` element whose bold text reads
/// "Level <word> ...".

use super::{Extraction, ProviderDescriptor, Regions};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

const HOSTNAME: &str = "https://www.napier.govt.nz";
const REGION_CITY: &str = "/services/water/water/water-restrictions";

const PATTERN: &str = r#"class="waterstat".*?<strong>.*?Level ((?-u:\w)* ).*?</strong>"#;

static REGEX: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(PATTERN)
        .case_insensitive(true)
        .multi_line(true)
        .dot_matches_new_line(true)
        .build()
        .expect("napier pattern is valid")
});

pub static PROVIDER: ProviderDescriptor = ProviderDescriptor {
    service: "napiercitycouncil",
    council: "Napier City Council",
    hostname: HOSTNAME,
    regions: Regions::Any(REGION_CITY),
    pattern: &REGEX,
    extraction: Extraction::FirstNormalized,
};
