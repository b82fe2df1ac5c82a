//! Duration values as written in markup or config files.
//!
//! A value is either a bare millisecond integer or a string carrying a unit
//! letter. The unit is found by presence, checked in order: `h` means hours,
//! otherwise `m` means minutes, otherwise `s` means seconds, otherwise the
//! number is milliseconds. The numeric part is the leading number of the
//! string. Because of the presence rule `"500ms"` reads as 500 minutes.

use serde::{Deserialize, Deserializer};

const MS_PER_SECOND: f64 = 1_000.0;
const MS_PER_MINUTE: f64 = 60.0 * MS_PER_SECOND;
const MS_PER_HOUR: f64 = 60.0 * MS_PER_MINUTE;

/// Parse a duration string to milliseconds.
///
/// Returns `None` when there is no leading number or the result is negative.
pub fn parse_duration_ms(raw: &str) -> Option<u64> {
    let text = raw.trim().to_ascii_lowercase();

    let factor = if text.contains('h') {
        MS_PER_HOUR
    } else if text.contains('m') {
        MS_PER_MINUTE
    } else if text.contains('s') {
        MS_PER_SECOND
    } else {
        let digits = leading_number(&text, false);
        return digits.parse::<i64>().ok().and_then(|v| u64::try_from(v).ok());
    };

    let value: f64 = leading_number(&text, true).parse().ok()?;
    let ms = value * factor;
    if ms.is_finite() && ms >= 0.0 {
        Some(ms as u64)
    } else {
        None
    }
}

/// The longest prefix that reads as a number.
fn leading_number(text: &str, allow_fraction: bool) -> &str {
    let mut end = 0;
    let mut seen_dot = false;
    for (i, ch) in text.char_indices() {
        match ch {
            '+' | '-' if i == 0 => {}
            '0'..='9' => {}
            '.' if allow_fraction && !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + ch.len_utf8();
    }
    &text[..end]
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DurationValue {
    Millis(u64),
    Text(String),
}

/// Serde helper accepting `8000` or `"8s"`.
pub(crate) fn deserialize_ms<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match DurationValue::deserialize(deserializer)? {
        DurationValue::Millis(ms) => Ok(ms),
        DurationValue::Text(text) => parse_duration_ms(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid duration: '{text}'"))),
    }
}
