/// Watercare (Auckland) water restrictions page.
///
/// The level appears in bold text such as
/// `<strong>Level Two restrictions are in place</strong>`; the word right
/// before "restrictions" is the level.

use super::{Extraction, ProviderDescriptor, Regions};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

const HOSTNAME: &str = "https://www.watercare.co.nz";
const REGION_CITY: &str = "/Water-and-wastewater/Water-supply-situation/Water-restrictions";

const PATTERN: &str = r"<strong>.*?([A-Za-z1234]+) restrictions.*?</strong>";

static REGEX: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(PATTERN)
        .case_insensitive(true)
        .build()
        .expect("watercare pattern is valid")
});

pub static PROVIDER: ProviderDescriptor = ProviderDescriptor {
    service: "watercare",
    council: "Watercare (Auckland)",
    hostname: HOSTNAME,
    regions: Regions::Any(REGION_CITY),
    pattern: &REGEX,
    extraction: Extraction::FirstNormalized,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AlertLevel, WaterAlertError};
    use crate::providers::LevelExtractor;
    use crate::providers::fixtures::*;

    #[test]
    fn test_endpoint_is_the_city_page_for_any_region() {
        let url = PROVIDER.endpoint("city").unwrap();
        assert_eq!(
            url,
            "https://www.watercare.co.nz/Water-and-wastewater/Water-supply-situation/Water-restrictions"
        );
        assert_eq!(PROVIDER.endpoint("north"), Some(url));
    }

    #[test]
    fn test_level_two_page() {
        assert_eq!(PROVIDER.find_level(fixture_watercare_level_two(), ""), Ok(AlertLevel::TWO));
    }

    #[test]
    fn test_word_before_restrictions_is_captured() {
        let page = "<p><strong>Before Two restrictions</strong></p>";
        assert_eq!(PROVIDER.find_level(page, ""), Ok(AlertLevel::TWO));
    }

    #[test]
    fn test_no_restrictions_page_is_level_zero() {
        assert_eq!(
            PROVIDER.find_level(fixture_watercare_no_restrictions(), ""),
            Ok(AlertLevel::NONE)
        );
    }

    #[test]
    fn test_unrecognized_bold_text_is_skipped() {
        let page = "<strong>Outdoor water restrictions</strong>\n<strong>Stage 3 restrictions</strong>";
        assert_eq!(PROVIDER.find_level(page, ""), Ok(AlertLevel::THREE));
    }

    #[test]
    fn test_page_without_match_is_parse_error() {
        assert_eq!(
            PROVIDER.find_level(fixture_unrelated_page(), ""),
            Err(WaterAlertError::Parse)
        );
    }

    #[test]
    fn test_find_level_is_repeatable() {
        let page = fixture_watercare_level_two();
        assert_eq!(PROVIDER.find_level(page, ""), PROVIDER.find_level(page, ""));
    }
}
