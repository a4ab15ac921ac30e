//! Read-only view of an inbound request

use std::collections::HashMap;

/// Anything that can answer header lookups for an inbound request
///
/// Transport layers implement [`RequestEnvelope::header`]; cookie parsing
/// comes for free.
pub trait RequestEnvelope {
    /// Value of the named header (case-insensitive)
    fn header(&self, name: &str) -> Option<&str>;

    /// Value of the named cookie from the `Cookie` header
    ///
    /// Empty values count as absent.
    fn cookie(&self, name: &str) -> Option<&str> {
        let header = self.header("cookie")?;
        header.split(';').find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            if key.trim() != name {
                return None;
            }
            let value = value.trim().trim_matches('"');
            (!value.is_empty()).then_some(value)
        })
    }
}

impl RequestEnvelope for HashMap<String, String> {
    fn header(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

impl RequestEnvelope for Vec<(String, String)> {
    fn header(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
