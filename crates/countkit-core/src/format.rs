//! Display formatting shared by the widgets.

use std::sync::OnceLock;

use regex::Regex;

/// `1234567` -> `"1,234,567"`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Last two digits, zero-padded: `9` -> `"09"`, `123` -> `"23"`.
pub fn two_digit(value: u64) -> String {
    format!("{:02}", value % 100)
}

fn plural_after_one() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // A "1" (any zero padding) or "Last", optional inline tags, whitespace,
    // then a word ending in a plural "s".
    RE.get_or_init(|| {
        Regex::new(r"(?i)(\b(?:0*?1|LAST)(?:\s*?<.*?>\s*?)*?\s+?(?:\s*?<.*?>\s*?)*?\w+?)(s)\b")
            .expect("plural pattern is valid")
    })
}

/// Singularize the word after a rendered `1` or `Last`.
///
/// `"Last Days"` -> `"Last Day"`, `"01 <b>Hours</b>"` -> `"01 <b>Hour</b>"`.
pub fn strip_plurals(text: &str) -> String {
    plural_after_one().replace_all(text, "${1}").into_owned()
}
