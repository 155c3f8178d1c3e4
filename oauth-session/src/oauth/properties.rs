//! Flat key-value configuration handed to providers.

use std::collections::BTreeMap;

use crate::error::{invalid_setting, Error};

/// Provider options keyed by dotted names such as `oauth2.google.scope`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties(BTreeMap<String, String>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a property, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overlay `other` on top of `self`; keys in `other` win.
    pub fn merge(mut self, other: Properties) -> Self {
        self.0.extend(other.0);
        self
    }

    /// Parse a single `key=value` (or `key:value`) entry.
    pub fn parse_pair(entry: &str) -> Result<(String, String), Error> {
        let separator = entry
            .find(|c: char| c == '=' || c == ':')
            .ok_or_else(|| invalid_setting(entry, "expected 'key=value'"))?;
        let key = entry[..separator].trim();
        if key.is_empty() {
            return Err(invalid_setting(entry, "empty property name"));
        }
        let value = entry[separator + 1..].trim();
        Ok((key.to_string(), value.to_string()))
    }

    /// Build properties from `key=value` entries.
    pub fn from_pairs<I, S>(entries: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut properties = Self::new();
        for entry in entries {
            let (key, value) = Self::parse_pair(entry.as_ref())?;
            properties.0.insert(key, value);
        }
        Ok(properties)
    }

    /// Parse properties text: one entry per line, `#` and `!` start comments.
    pub fn parse(text: &str) -> Result<Self, Error> {
        Self::from_pairs(text.lines().map(str::trim).filter(|line| {
            !line.is_empty() && !line.starts_with('#') && !line.starts_with('!')
        }))
    }
}

impl FromIterator<(String, String)> for Properties {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigurationErrorKind, ErrorKind};

    #[test]
    fn test_parse_properties_text() {
        let text = "\
# Google provider
oauth2.google.scope = profile email
! legacy comment
oauth2.google.pending_lifetime_secs:300

";
        let properties = Properties::parse(text).unwrap();

        assert_eq!(properties.len(), 2);
        assert_eq!(properties.get("oauth2.google.scope"), Some("profile email"));
        assert_eq!(
            properties.get("oauth2.google.pending_lifetime_secs"),
            Some("300")
        );
    }

    #[test]
    fn test_value_may_contain_separator() {
        let properties =
            Properties::from_pairs(["oauth2.oidc.auth_url=https://id.example.com/auth?x=1"])
                .unwrap();
        assert_eq!(
            properties.get("oauth2.oidc.auth_url"),
            Some("https://id.example.com/auth?x=1")
        );
    }

    #[test]
    fn test_line_without_separator_is_rejected() {
        let err = Properties::parse("oauth2.google.scope").unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::Configuration(ConfigurationErrorKind::InvalidSetting(
                "oauth2.google.scope".to_string()
            ))
        );
    }

    #[test]
    fn test_empty_key_is_rejected() {
        assert!(Properties::parse_pair("=value").is_err());
    }

    #[test]
    fn test_merge_prefers_other() {
        let base = Properties::new().with("a", "1").with("b", "2");
        let merged = base.merge(Properties::new().with("b", "3"));

        assert_eq!(merged.get("a"), Some("1"));
        assert_eq!(merged.get("b"), Some("3"));
    }
}
