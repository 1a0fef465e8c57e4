//! Status-code keys and default response resolution.
//!
//! Responses are keyed by an exact code (`"404"`), a digit-class pattern
//! (`"4XX"`) or `"default"`. [`lookup_status`] resolves a concrete status
//! against such keys with exact > pattern > default precedence.
//! [`resolve_default_status`] picks a representative success response when
//! no status is known yet.

use indexmap::IndexMap;

/// The catch-all response key.
pub const DEFAULT_KEY: &str = "default";

/// Returns the digit-class pattern (`4XX`) for a status code.
#[must_use]
pub fn pattern_for(status: u16) -> String {
    format!("{}XX", status / 100)
}

/// Resolves a concrete status code against patterned response keys.
///
/// Precedence is the exact code, then the `NXX` pattern (case-insensitive),
/// then `default`. Returns the matched key and its entry.
///
/// # Example
///
/// ```
/// use ariadne_core::status::lookup_status;
/// use indexmap::IndexMap;
///
/// let responses: IndexMap<String, &str> = [("200", "ok"), ("4XX", "client"), ("default", "other")]
///     .into_iter()
///     .map(|(k, v)| (k.to_string(), v))
///     .collect();
///
/// assert_eq!(lookup_status(&responses, 200).map(|(_, v)| *v), Some("ok"));
/// assert_eq!(lookup_status(&responses, 404).map(|(_, v)| *v), Some("client"));
/// assert_eq!(lookup_status(&responses, 500).map(|(_, v)| *v), Some("other"));
/// ```
pub fn lookup_status<T>(responses: &IndexMap<String, T>, status: u16) -> Option<(&str, &T)> {
    let exact = status.to_string();
    if let Some((key, value)) = responses.get_key_value(&exact) {
        return Some((key.as_str(), value));
    }

    let pattern = pattern_for(status);
    if let Some((key, value)) = responses
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(&pattern))
    {
        return Some((key.as_str(), value));
    }

    responses
        .get_key_value(DEFAULT_KEY)
        .map(|(key, value)| (key.as_str(), value))
}

/// Picks the representative response key when no status is known.
///
/// Priority: the explicit code when declared, the first of 200-203 in
/// ascending order, `2XX`, `default`, then the first declared response.
#[must_use]
pub fn resolve_default_status<T>(
    responses: &IndexMap<String, T>,
    explicit: Option<u16>,
) -> Option<&str> {
    if let Some(code) = explicit {
        if let Some((key, _)) = responses.get_key_value(&code.to_string()) {
            return Some(key.as_str());
        }
    }

    for code in 200..=203_u16 {
        if let Some((key, _)) = responses.get_key_value(&code.to_string()) {
            return Some(key.as_str());
        }
    }

    if let Some((key, _)) = responses
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("2XX"))
    {
        return Some(key.as_str());
    }

    if let Some((key, _)) = responses.get_key_value(DEFAULT_KEY) {
        return Some(key.as_str());
    }

    responses.keys().next().map(String::as_str)
}

/// Maps a response key to the status code a mock response carries.
///
/// Numeric keys map to themselves, `NXX` to `N00`, and `default` to 200.
#[must_use]
pub fn status_code_for_key(key: &str) -> u16 {
    if let Ok(code) = key.parse::<u16>() {
        return code;
    }
    let bytes = key.as_bytes();
    if bytes.len() == 3 && key.get(1..).is_some_and(|rest| rest.eq_ignore_ascii_case("XX")) {
        if let Some(digit) = (bytes[0] as char).to_digit(10) {
            // Single digit, so the product fits in u16.
            return u16::try_from(digit * 100).unwrap_or(200);
        }
    }
    200
}
