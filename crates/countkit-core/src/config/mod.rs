//! Widget configuration.
//!
//! Widgets are configured either from the `data-*` attributes of their
//! host element ([`Attributes`]) or from a TOML file ([`WidgetsConfig`]).
//! Both paths validate once and produce immutable [`CountdownConfig`] /
//! [`CounterConfig`] values.

mod duration;
mod file;
mod widget;

use std::collections::HashMap;

pub use duration::parse_duration_ms;
pub use file::{CountdownSection, WidgetsConfig};
pub use widget::{
    CountdownConfig, CounterConfig, ATTR_COUNT_PROPERTY, ATTR_END, ATTR_END_MESSAGE,
    ATTR_ENDPOINT, ATTR_SEED, ATTR_SPEED, ATTR_UPDATE, ATTR_UTC_OFFSET,
};

/// Read-only attribute map of a host element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(HashMap<String, String>);

impl Attributes {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
