//! Phone number shape checking and normalization.

use std::sync::LazyLock;

use regex::Regex;

/// International shape: optional `+`, first digit 1-9, 8-15 digits total.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9][0-9]{7,14}$").expect("phone regex"));

/// Strip the separators people actually type (spaces, dashes, dots, parens).
fn strip_separators(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect()
}

/// Whether the input is a plausible international phone number.
pub fn is_valid_phone(raw: &str) -> bool {
    PHONE_RE.is_match(&strip_separators(raw))
}

/// Normalize to international format for the messaging API.
///
/// Separators are dropped; a number without a `+` prefix gets the default
/// country code when one is configured, otherwise just the `+`.
pub fn normalize_phone(raw: &str, default_country_code: Option<&str>) -> String {
    let stripped = strip_separators(raw);
    let had_plus = stripped.starts_with('+');
    let digits: String = stripped.chars().filter(char::is_ascii_digit).collect();

    if had_plus {
        format!("+{digits}")
    } else if let Some(cc) = default_country_code {
        format!("+{}{digits}", cc.trim_start_matches('+'))
    } else {
        format!("+{digits}")
    }
}
