//! Placeholder substitution for countdown displays.
//!
//! Placeholders are case-insensitive, tolerate inner whitespace and accept
//! either number: `{DAYS}`, `{ day }`, `{Hours}`, `{MINUTE}`, `{seconds}`.
//! The date placeholder is `{DATE}` or `{DAT}`.

use std::sync::OnceLock;

use regex::{NoExpand, Regex};

use crate::format::{strip_plurals, two_digit};
use crate::time::Remaining;

/// Replacement for the day count on the final day.
pub const LAST_DAY_LABEL: &str = "Last";

struct Placeholders {
    days: Regex,
    hours: Regex,
    minutes: Regex,
    seconds: Regex,
    date: Regex,
}

fn placeholder(word: &str) -> Regex {
    Regex::new(&format!(r"(?i)\{{\s*{word}\s*\}}")).expect("placeholder pattern is valid")
}

fn placeholders() -> &'static Placeholders {
    static SET: OnceLock<Placeholders> = OnceLock::new();
    SET.get_or_init(|| Placeholders {
        days: placeholder("DAYS?"),
        hours: placeholder("HOURS?"),
        minutes: placeholder("MINUTES?"),
        seconds: placeholder("SECONDS?"),
        date: placeholder("DATE?"),
    })
}

/// Render `template` for a positive remaining duration.
///
/// `date_label` replaces `{DATE}`.
///
/// On the last day only the day placeholder is substituted, with
/// [`LAST_DAY_LABEL`], and the word following a `1` or `Last` loses its
/// plural `s`. Every other placeholder is left as written.
pub fn render(template: &str, remaining: &Remaining, date_label: &str) -> String {
    let p = placeholders();

    if remaining.days < 1 {
        let text = p.days.replace_all(template, NoExpand(LAST_DAY_LABEL));
        return strip_plurals(&text);
    }

    let days = remaining.days.to_string();
    let text = p.days.replace_all(template, NoExpand(&days));
    let text = p.hours.replace_all(&text, NoExpand(&two_digit(remaining.hours)));
    let text = p.minutes.replace_all(&text, NoExpand(&two_digit(remaining.minutes)));
    let text = p.seconds.replace_all(&text, NoExpand(&two_digit(remaining.seconds)));
    p.date.replace_all(&text, NoExpand(date_label)).into_owned()
}
