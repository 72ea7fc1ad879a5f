use std::path::PathBuf;

use serde::Deserialize;

use crate::adapters::{DEFAULT_CHART_BASE_URL, DEFAULT_QUOTES_COUNT, DEFAULT_SEARCH_BASE_URL};
use crate::http_client::{DEFAULT_TIMEOUT_MS, DEFAULT_USER_AGENT};

pub const DEFAULT_LOOKBACK_DAYS: u16 = 5;
pub const DEFAULT_MAX_IN_FLIGHT: usize = 4;

/// Runtime settings shared by every adapter binary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub chart_base_url: String,
    pub search_base_url: String,
    /// Per-request timeout for every outbound call.
    pub request_timeout_ms: u64,
    pub lookback_days: u16,
    pub search_quotes_count: u16,
    /// Per-ticker lookups allowed in flight within one batch.
    pub max_in_flight: usize,
    pub user_agent: String,
    /// Optional JSON file replacing the embedded local name table.
    pub names_path: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            chart_base_url: DEFAULT_CHART_BASE_URL.to_owned(),
            search_base_url: DEFAULT_SEARCH_BASE_URL.to_owned(),
            request_timeout_ms: DEFAULT_TIMEOUT_MS,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            search_quotes_count: DEFAULT_QUOTES_COUNT,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            names_path: None,
        }
    }
}

impl CoreConfig {
    /// Read `TICKWATCH_*` variables from the process environment.
    ///
    /// Unparseable or zero values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        Self {
            chart_base_url: var("TICKWATCH_CHART_BASE_URL").unwrap_or(defaults.chart_base_url),
            search_base_url: var("TICKWATCH_SEARCH_BASE_URL").unwrap_or(defaults.search_base_url),
            request_timeout_ms: positive(
                "TICKWATCH_TIMEOUT_MS",
                var("TICKWATCH_TIMEOUT_MS"),
                defaults.request_timeout_ms,
            ),
            lookback_days: positive(
                "TICKWATCH_LOOKBACK_DAYS",
                var("TICKWATCH_LOOKBACK_DAYS"),
                defaults.lookback_days,
            ),
            search_quotes_count: positive(
                "TICKWATCH_SEARCH_QUOTES_COUNT",
                var("TICKWATCH_SEARCH_QUOTES_COUNT"),
                defaults.search_quotes_count,
            ),
            max_in_flight: positive(
                "TICKWATCH_MAX_IN_FLIGHT",
                var("TICKWATCH_MAX_IN_FLIGHT"),
                defaults.max_in_flight,
            ),
            user_agent: var("TICKWATCH_USER_AGENT").unwrap_or(defaults.user_agent),
            names_path: var("TICKWATCH_NAMES_PATH").map(PathBuf::from),
        }
    }
}

fn positive<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: std::str::FromStr + PartialOrd + Default + Copy,
{
    let Some(raw) = raw else {
        return default;
    };

    match raw.parse::<T>() {
        Ok(value) if value > T::default() => value,
        _ => {
            tracing::warn!(key, value = %raw, "ignoring invalid setting, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect::<HashMap<_, _>>();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = CoreConfig::from_lookup(|_| None);
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.request_timeout_ms, 10_000);
        assert_eq!(config.lookback_days, 5);
        assert_eq!(config.max_in_flight, 4);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = CoreConfig::from_lookup(lookup_from(&[
            ("TICKWATCH_CHART_BASE_URL", "http://127.0.0.1:9000"),
            ("TICKWATCH_TIMEOUT_MS", "2500"),
            ("TICKWATCH_MAX_IN_FLIGHT", "1"),
            ("TICKWATCH_NAMES_PATH", "/etc/tickwatch/names.json"),
        ]));

        assert_eq!(config.chart_base_url, "http://127.0.0.1:9000");
        assert_eq!(config.request_timeout_ms, 2_500);
        assert_eq!(config.max_in_flight, 1);
        assert_eq!(
            config.names_path,
            Some(PathBuf::from("/etc/tickwatch/names.json"))
        );
    }

    #[test]
    fn invalid_or_zero_values_fall_back() {
        let config = CoreConfig::from_lookup(lookup_from(&[
            ("TICKWATCH_TIMEOUT_MS", "soon"),
            ("TICKWATCH_LOOKBACK_DAYS", "0"),
            ("TICKWATCH_MAX_IN_FLIGHT", "-3"),
            ("TICKWATCH_SEARCH_BASE_URL", "   "),
        ]));

        assert_eq!(config.request_timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(config.lookback_days, DEFAULT_LOOKBACK_DAYS);
        assert_eq!(config.max_in_flight, DEFAULT_MAX_IN_FLIGHT);
        assert_eq!(config.search_base_url, DEFAULT_SEARCH_BASE_URL);
    }

    #[test]
    fn deserializes_partial_documents() {
        let config: CoreConfig =
            serde_json::from_str(r#"{"lookback_days": 7}"#).expect("partial config");
        assert_eq!(config.lookback_days, 7);
        assert_eq!(config.max_in_flight, DEFAULT_MAX_IN_FLIGHT);
    }
}
