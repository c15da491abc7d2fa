/// Free-text restriction level normalization.
///
/// Councils write levels as words ("Level Two"), bare words ("two") or
/// digits. This table is shared by every provider whose pattern captures
/// free text, so the word list only exists once.

use crate::model::{AlertLevel, WaterAlertError};

/// Normalizes a captured level token, treating "no"/"none" as level 0.
pub fn normalize(token: &str) -> Result<AlertLevel, WaterAlertError> {
    normalize_with(token, AlertLevel::NONE)
}

/// Normalizes a captured level token.
///
/// Matching is exact after lower-casing and trimming. `no_level` is
/// returned for "no" and "none", which lets a provider report "no
/// restrictions" as something other than 0.
///
/// # Errors
/// `WaterAlertError::Parse` for any token outside the table.
pub fn normalize_with(token: &str, no_level: AlertLevel) -> Result<AlertLevel, WaterAlertError> {
    let level = match token.trim().to_lowercase().as_str() {
        "no" | "none" => no_level,
        "level one" | "one" | "1" => AlertLevel::ONE,
        "level two" | "two" | "2" => AlertLevel::TWO,
        "level three" | "three" | "3" => AlertLevel::THREE,
        "level four" | "four" | "4" => AlertLevel::FOUR,
        _ => return Err(WaterAlertError::Parse),
    };
    Ok(level)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_table_entry_maps_to_documented_level() {
        let table: &[(&[&str], u8)] = &[
            (&["no", "none"], 0),
            (&["level one", "one", "1"], 1),
            (&["level two", "two", "2"], 2),
            (&["level three", "three", "3"], 3),
            (&["level four", "four", "4"], 4),
        ];

        for (tokens, expected) in table {
            for token in *tokens {
                let level = normalize(token).expect("table token should normalize");
                assert_eq!(level.value(), *expected, "token {:?}", token);
            }
        }
    }

    #[test]
    fn test_case_and_surrounding_whitespace_are_ignored() {
        assert_eq!(normalize("  LEVEL Two "), Ok(AlertLevel::TWO));
        assert_eq!(normalize("Three\n"), Ok(AlertLevel::THREE));
        assert_eq!(normalize("\tNone"), Ok(AlertLevel::NONE));
    }

    #[test]
    fn test_no_level_override_is_respected() {
        assert_eq!(normalize("no"), Ok(AlertLevel::NONE));
        assert_eq!(normalize_with("no", AlertLevel::TWO), Ok(AlertLevel::TWO));
        assert_eq!(normalize_with("None", AlertLevel::ONE), Ok(AlertLevel::ONE));
        // The override only applies to the "no restrictions" synonyms
        assert_eq!(normalize_with("four", AlertLevel::TWO), Ok(AlertLevel::FOUR));
    }

    #[test]
    fn test_unknown_tokens_are_parse_errors() {
        for token in ["", "five", "5", "0", "level", "level  two", "before", "twelve", "level 2"] {
            assert_eq!(
                normalize(token),
                Err(WaterAlertError::Parse),
                "token {:?} should not normalize",
                token
            );
        }
    }
}
