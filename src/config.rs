//! Service configuration, loaded from the environment.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::batch::FetchPolicy;
use crate::error::{PipelineError, Result};

/// Runtime configuration for the service.
///
/// Loaded from environment variables by [`Config::from_env`], typically
/// after `dotenvy` has read a `.env` file. Deserializable as well so it
/// can be embedded in a larger application config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Google API key, shared by the Custom Search calls.
    pub api_key: String,
    /// Google Programmable Search Engine identifier.
    pub engine_id: String,
    /// Gemini API key. When absent the extractive summarizer is used.
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    /// Gemini model name.
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,
    /// Number of search links to fetch per request.
    #[serde(default = "default_max_links")]
    pub max_links: usize,
    /// Number of image URLs to return per request.
    #[serde(default = "default_image_count")]
    pub image_count: usize,
    /// Failed-fetch count at which a batch aborts. Zero is treated as one.
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    /// Wait for every fetch instead of aborting at the threshold.
    #[serde(default)]
    pub best_effort: bool,
    /// Drop unresolved fetches on abort instead of waiting for them.
    #[serde(default = "default_true")]
    pub discard_on_abort: bool,
    /// Per-fetch timeout in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    /// Request-wide deadline in seconds. Zero disables the deadline.
    #[serde(default = "default_global_timeout")]
    pub global_timeout_secs: u64,
    /// Cap on concurrent fetches. Absent means unbounded.
    #[serde(default)]
    pub concurrency: Option<usize>,
    /// File the most recent summary is mirrored to, if set.
    #[serde(default)]
    pub summary_file: Option<PathBuf>,
    /// Address the HTTP server listens on.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash-latest".to_string()
}

fn default_max_links() -> usize {
    10
}

fn default_image_count() -> usize {
    3
}

fn default_failure_threshold() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

fn default_fetch_timeout() -> u64 {
    5
}

fn default_global_timeout() -> u64 {
    30
}

fn default_listen_addr() -> String {
    "0.0.0.0:8000".to_string()
}

impl Config {
    /// Loads configuration from process environment variables.
    ///
    /// `API_KEY` and `SEARCH_ENGINE_ID` are required; everything else
    /// falls back to defaults. Tunables use the `WEBBRIEF_` prefix.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &str| {
            get(key).ok_or_else(|| {
                PipelineError::Config(format!("missing required environment variable {key}"))
            })
        };
        fn parse<T: std::str::FromStr>(key: &str, value: String) -> Result<T> {
            value
                .parse()
                .map_err(|_| PipelineError::Config(format!("invalid value for {key}: {value}")))
        }

        let mut config = Self {
            api_key: require("API_KEY")?,
            engine_id: require("SEARCH_ENGINE_ID")?,
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_model: default_gemini_model(),
            max_links: default_max_links(),
            image_count: default_image_count(),
            failure_threshold: default_failure_threshold(),
            best_effort: false,
            discard_on_abort: true,
            fetch_timeout_secs: default_fetch_timeout(),
            global_timeout_secs: default_global_timeout(),
            concurrency: None,
            summary_file: None,
            listen_addr: default_listen_addr(),
        };

        if let Some(v) = get("WEBBRIEF_GEMINI_MODEL") {
            config.gemini_model = v;
        }
        if let Some(v) = get("WEBBRIEF_MAX_LINKS") {
            config.max_links = parse("WEBBRIEF_MAX_LINKS", v)?;
        }
        if let Some(v) = get("WEBBRIEF_IMAGE_COUNT") {
            config.image_count = parse("WEBBRIEF_IMAGE_COUNT", v)?;
        }
        if let Some(v) = get("WEBBRIEF_FAILURE_THRESHOLD") {
            config.failure_threshold = parse("WEBBRIEF_FAILURE_THRESHOLD", v)?;
        }
        if let Some(v) = get("WEBBRIEF_BEST_EFFORT") {
            config.best_effort = parse_bool("WEBBRIEF_BEST_EFFORT", &v)?;
        }
        if let Some(v) = get("WEBBRIEF_DISCARD_ON_ABORT") {
            config.discard_on_abort = parse_bool("WEBBRIEF_DISCARD_ON_ABORT", &v)?;
        }
        if let Some(v) = get("WEBBRIEF_FETCH_TIMEOUT_SECS") {
            config.fetch_timeout_secs = parse("WEBBRIEF_FETCH_TIMEOUT_SECS", v)?;
        }
        if let Some(v) = get("WEBBRIEF_GLOBAL_TIMEOUT_SECS") {
            config.global_timeout_secs = parse("WEBBRIEF_GLOBAL_TIMEOUT_SECS", v)?;
        }
        if let Some(v) = get("WEBBRIEF_CONCURRENCY") {
            config.concurrency = Some(parse("WEBBRIEF_CONCURRENCY", v)?);
        }
        if let Some(v) = get("WEBBRIEF_SUMMARY_FILE") {
            config.summary_file = Some(PathBuf::from(v));
        }
        if let Some(v) = get("WEBBRIEF_LISTEN_ADDR") {
            config.listen_addr = v;
        }

        Ok(config)
    }

    /// Fetch policy derived from the threshold and best-effort settings.
    pub fn fetch_policy(&self) -> FetchPolicy {
        if self.best_effort {
            FetchPolicy::BestEffort
        } else {
            FetchPolicy::FailFast {
                threshold: self.failure_threshold.max(1),
            }
        }
    }

    /// Per-fetch timeout as a duration.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Request-wide deadline, or `None` when disabled.
    pub fn global_timeout(&self) -> Option<Duration> {
        if self.global_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.global_timeout_secs))
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(PipelineError::Config(format!(
            "invalid value for {key}: {value}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config =
            Config::from_lookup(lookup_from(&[("API_KEY", "k"), ("SEARCH_ENGINE_ID", "cx")]))
                .unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.engine_id, "cx");
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.gemini_model, "gemini-1.5-flash-latest");
        assert_eq!(config.max_links, 10);
        assert_eq!(config.image_count, 3);
        assert_eq!(config.failure_threshold, 3);
        assert!(!config.best_effort);
        assert!(config.discard_on_abort);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(5));
        assert_eq!(config.global_timeout(), Some(Duration::from_secs(30)));
        assert!(config.concurrency.is_none());
        assert!(config.summary_file.is_none());
        assert_eq!(config.listen_addr, "0.0.0.0:8000");
    }

    #[test]
    fn test_config_missing_api_key() {
        let err = Config::from_lookup(lookup_from(&[("SEARCH_ENGINE_ID", "cx")])).unwrap_err();
        assert!(err.to_string().contains("API_KEY"));
    }

    #[test]
    fn test_config_blank_value_counts_as_missing() {
        let err = Config::from_lookup(lookup_from(&[
            ("API_KEY", "  "),
            ("SEARCH_ENGINE_ID", "cx"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("API_KEY"));
    }

    #[test]
    fn test_config_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("API_KEY", "k"),
            ("SEARCH_ENGINE_ID", "cx"),
            ("GEMINI_API_KEY", "gk"),
            ("WEBBRIEF_MAX_LINKS", "5"),
            ("WEBBRIEF_FAILURE_THRESHOLD", "1"),
            ("WEBBRIEF_BEST_EFFORT", "true"),
            ("WEBBRIEF_DISCARD_ON_ABORT", "no"),
            ("WEBBRIEF_FETCH_TIMEOUT_SECS", "2"),
            ("WEBBRIEF_GLOBAL_TIMEOUT_SECS", "0"),
            ("WEBBRIEF_CONCURRENCY", "4"),
            ("WEBBRIEF_SUMMARY_FILE", "/tmp/summary.txt"),
            ("WEBBRIEF_LISTEN_ADDR", "127.0.0.1:9999"),
        ]))
        .unwrap();
        assert_eq!(config.gemini_api_key.as_deref(), Some("gk"));
        assert_eq!(config.max_links, 5);
        assert_eq!(config.failure_threshold, 1);
        assert!(config.best_effort);
        assert!(!config.discard_on_abort);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(2));
        assert_eq!(config.global_timeout(), None);
        assert_eq!(config.concurrency, Some(4));
        assert_eq!(
            config.summary_file.as_deref(),
            Some(std::path::Path::new("/tmp/summary.txt"))
        );
        assert_eq!(config.listen_addr, "127.0.0.1:9999");
    }

    #[test]
    fn test_config_invalid_number() {
        let err = Config::from_lookup(lookup_from(&[
            ("API_KEY", "k"),
            ("SEARCH_ENGINE_ID", "cx"),
            ("WEBBRIEF_MAX_LINKS", "many"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("WEBBRIEF_MAX_LINKS"));
    }

    #[test]
    fn test_fetch_policy_fail_fast() {
        let config =
            Config::from_lookup(lookup_from(&[("API_KEY", "k"), ("SEARCH_ENGINE_ID", "cx")]))
                .unwrap();
        assert_eq!(config.fetch_policy(), FetchPolicy::FailFast { threshold: 3 });
    }

    #[test]
    fn test_fetch_policy_best_effort() {
        let config = Config::from_lookup(lookup_from(&[
            ("API_KEY", "k"),
            ("SEARCH_ENGINE_ID", "cx"),
            ("WEBBRIEF_BEST_EFFORT", "1"),
        ]))
        .unwrap();
        assert_eq!(config.fetch_policy(), FetchPolicy::BestEffort);
    }

    #[test]
    fn test_fetch_policy_clamps_zero_threshold() {
        let config = Config::from_lookup(lookup_from(&[
            ("API_KEY", "k"),
            ("SEARCH_ENGINE_ID", "cx"),
            ("WEBBRIEF_FAILURE_THRESHOLD", "0"),
        ]))
        .unwrap();
        assert_eq!(config.fetch_policy(), FetchPolicy::FailFast { threshold: 1 });
    }

    #[test]
    fn test_config_deserialization_defaults() {
        let json = r#"{"api_key":"k","engine_id":"cx"}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.failure_threshold, 3);
        assert_eq!(config.global_timeout_secs, 30);
        assert!(config.discard_on_abort);
    }
}
