//! Requester context: the claims a caller presents with each query.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Per-request claims (identity, department, location, ...).
///
/// Created fresh for every query and never stored in the index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequesterContext {
    claims: BTreeMap<String, String>,
}

impl RequesterContext {
    /// Empty context (an anonymous requester)
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style claim setter
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.claims.insert(key.into(), value.into());
        self
    }

    /// Insert or replace a claim
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.claims.insert(key.into(), value.into());
    }

    /// Look up a claim
    pub fn get(&self, key: &str) -> Option<&str> {
        self.claims.get(key).map(String::as_str)
    }

    /// Whether the claim is present at all
    pub fn contains(&self, key: &str) -> bool {
        self.claims.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    /// Iterate claims in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.claims.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parse `key=value` pairs (as given on the command line)
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut context = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| format!("Expected key=value, got '{}'", pair))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(format!("Empty key in '{}'", pair));
            }
            context.insert(key, value.trim());
        }
        Ok(context)
    }
}

impl<K, V> FromIterator<(K, V)> for RequesterContext
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            claims: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl FromStr for RequesterContext {
    type Err = String;

    /// Parse a comma separated list such as `user_id=123,location=New York`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::new());
        }
        Self::from_pairs(s.split(','))
    }
}

impl fmt::Display for RequesterContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.iter().map(|(k, v)| format!("{}:{}", k, v)).collect();
        write!(f, "{{{}}}", rendered.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_context() {
        let ctx = RequesterContext::new();
        assert!(ctx.is_empty());
        assert_eq!(ctx.get("user_id"), None);
        assert_eq!(ctx.to_string(), "{}");
    }

    #[test]
    fn test_builder_and_lookup() {
        let ctx = RequesterContext::new()
            .with("user_id", "123")
            .with("location", "New York");
        assert!(ctx.contains("user_id"));
        assert_eq!(ctx.get("location"), Some("New York"));
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn test_parse_pairs() {
        let ctx: RequesterContext = "user_id=456, department=Dev,location=London".parse().unwrap();
        assert_eq!(ctx.get("user_id"), Some("456"));
        assert_eq!(ctx.get("department"), Some("Dev"));
        assert_eq!(ctx.get("location"), Some("London"));
    }

    #[test]
    fn test_parse_rejects_missing_separator() {
        let result: Result<RequesterContext, _> = "user_id".parse();
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_empty_string() {
        let ctx: RequesterContext = "".parse().unwrap();
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_from_iterator() {
        let ctx: RequesterContext = vec![("department", "IT")].into_iter().collect();
        assert_eq!(ctx.get("department"), Some("IT"));
    }
}
