//! Model registry mapping model names to backend webhook URLs

use std::collections::HashMap;

use chrono::Utc;
use tracing::warn;

use crate::error::{AppError, Result};

/// Registry of configured chat models.
///
/// Built once at startup from the `MODELS` mapping string and immutable for
/// the process lifetime, so it can be read from any number of concurrent
/// requests without synchronization.
#[derive(Debug)]
pub struct ModelRegistry {
    models: HashMap<String, String>,
    created_at: i64,
}

impl ModelRegistry {
    /// Parse a `name=url;name=url;...` mapping string.
    ///
    /// Entries that do not split into exactly two `=`-delimited fields are
    /// skipped with a warning. An input yielding no usable entries is an
    /// error: the gateway must not start without at least one model.
    pub fn from_spec(spec: &str) -> Result<Self> {
        if spec.is_empty() {
            return Err(AppError::Config(config::ConfigError::Message(format!(
                "environment variable MODELS is not set; expected {}",
                MAPPING_FORMAT_HINT
            ))));
        }

        let mut models = HashMap::new();
        for entry in spec.split(';') {
            let fields: Vec<&str> = entry.split('=').collect();
            if fields.len() != 2 {
                warn!(entry = %entry, "Skipping malformed model mapping");
                continue;
            }
            models.insert(fields[0].to_string(), fields[1].to_string());
        }

        if models.is_empty() {
            return Err(AppError::Config(config::ConfigError::Message(format!(
                "no usable model mappings in MODELS; expected {}",
                MAPPING_FORMAT_HINT
            ))));
        }

        Ok(Self {
            models,
            created_at: Utc::now().timestamp(),
        })
    }

    /// Look up the webhook URL for a model name (case-sensitive exact match).
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.models.get(name).map(String::as_str)
    }

    /// All configured model names, sorted for stable listings.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.models.keys().cloned().collect();
        names.sort();
        names
    }

    /// Unix timestamp captured when the registry was built.
    ///
    /// Model entries have no persisted lifecycle, so construction time is
    /// the closest thing to a creation time the listing can report.
    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    /// Number of configured models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// True when no models are configured.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// True when the model name is configured.
    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }
}

const MAPPING_FORMAT_HINT: &str =
    "name=url;name=url;... e.g. MODELS=assistant=https://flows.example.com/webhook/abc/chat";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed_entries() {
        let registry =
            ModelRegistry::from_spec("a=http://x/webhook1;b=http://y/webhook2").unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.resolve("a"), Some("http://x/webhook1"));
        assert_eq!(registry.resolve("b"), Some("http://y/webhook2"));
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let registry =
            ModelRegistry::from_spec("a=http://x/webhook1;bad;b=http://y/webhook2").unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("a"));
        assert!(registry.contains("b"));
        assert!(!registry.contains("bad"));
    }

    #[test]
    fn test_empty_spec_is_an_error() {
        assert!(ModelRegistry::from_spec("").is_err());
    }

    #[test]
    fn test_all_malformed_spec_is_an_error() {
        assert!(ModelRegistry::from_spec("bad;worse;still=not=right").is_err());
    }

    #[test]
    fn test_entry_with_extra_equals_is_skipped() {
        // Splitting on '=' must yield exactly two fields, so a URL with a
        // query string parameter is rejected as malformed rather than
        // silently truncated.
        let registry =
            ModelRegistry::from_spec("a=http://x/hook?k=v;b=http://y/webhook2").unwrap();
        assert!(!registry.contains("a"));
        assert!(registry.contains("b"));
    }

    #[test]
    fn test_duplicate_names_last_wins() {
        let registry = ModelRegistry::from_spec("a=http://first;a=http://second").unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve("a"), Some("http://second"));
    }

    #[test]
    fn test_resolve_is_case_sensitive() {
        let registry = ModelRegistry::from_spec("Model=http://x/webhook").unwrap();
        assert_eq!(registry.resolve("Model"), Some("http://x/webhook"));
        assert_eq!(registry.resolve("model"), None);
        assert_eq!(registry.resolve("MODEL"), None);
    }

    #[test]
    fn test_names_are_sorted() {
        let registry = ModelRegistry::from_spec("zeta=http://z;alpha=http://a;mid=http://m").unwrap();
        assert_eq!(registry.names(), vec!["alpha", "mid", "zeta"]);
    }
}
