//! Settings injected into the quote core at construction time.
//!
//! Nothing in the core reads preferences or the environment on its own; a
//! front end builds a `QuoteConfig` (from defaults, from the environment with
//! [`QuoteConfig::from_env`], or from command line arguments) and hands it in.
use std::env;
use std::path::PathBuf;

use serde::Deserialize;

/// Environment variable carrying the Alpha Vantage API key; also the name
/// the key is exported under to the quote program.
pub const API_KEY_ENV: &str = "ALPHAVANTAGE_API_KEY";
/// Environment variable with the namespace filter expression.
pub const NAMESPACE_REGEX_ENV: &str = "FQ_NAMESPACE_REGEX";
/// Environment variable with the wrapper script path.
pub const WRAPPER_ENV: &str = "FQ_WRAPPER";
/// Environment variable with the interpreter path.
pub const INTERPRETER_ENV: &str = "FQ_INTERPRETER";
/// Environment variable with the default currency code.
pub const DEFAULT_CURRENCY_ENV: &str = "FQ_DEFAULT_CURRENCY";

/// Interpreter searched on `PATH` when none is configured.
pub const DEFAULT_INTERPRETER: &str = "perl";
/// Wrapper script used when none is configured.
pub const DEFAULT_WRAPPER: &str = "finance-quote-wrapper";
/// Book currency used when none is configured.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Quote core settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QuoteConfig {
    /// Interpreter running the wrapper; searched on `PATH` when unset.
    pub interpreter: Option<PathBuf>,
    /// Finance::Quote wrapper script.
    pub wrapper: PathBuf,
    /// Alpha Vantage API key passed to the quote program.
    pub api_key: Option<String>,
    /// Case-insensitive expression restricting which namespaces are quoted.
    pub namespace_filter: Option<String>,
    /// ISO code of the book's default currency.
    pub default_currency: String,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        QuoteConfig {
            interpreter: None,
            wrapper: PathBuf::from(DEFAULT_WRAPPER),
            api_key: None,
            namespace_filter: None,
            default_currency: String::from(DEFAULT_CURRENCY),
        }
    }
}

impl QuoteConfig {
    /// Defaults overridden by the `FQ_*` and `ALPHAVANTAGE_API_KEY` variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with a custom variable source. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = QuoteConfig::default();
        QuoteConfig {
            interpreter: get(INTERPRETER_ENV).map(PathBuf::from),
            wrapper: get(WRAPPER_ENV).map(PathBuf::from).unwrap_or(defaults.wrapper),
            api_key: get(API_KEY_ENV),
            namespace_filter: get(NAMESPACE_REGEX_ENV),
            default_currency: get(DEFAULT_CURRENCY_ENV)
                .map(|c| c.trim().to_uppercase())
                .unwrap_or(defaults.default_currency),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = QuoteConfig::default();
        assert_eq!(config.wrapper, PathBuf::from("finance-quote-wrapper"));
        assert_eq!(config.default_currency, "USD");
        assert!(config.api_key.is_none());
        assert!(config.namespace_filter.is_none());
    }

    #[test]
    fn test_lookup_overrides() {
        let vars: HashMap<&str, &str> = [
            (API_KEY_ENV, "secret"),
            (NAMESPACE_REGEX_ENV, "^NAS"),
            (DEFAULT_CURRENCY_ENV, "eur"),
            (WRAPPER_ENV, ""),
        ]
        .into_iter()
        .collect();
        let config = QuoteConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.namespace_filter.as_deref(), Some("^NAS"));
        assert_eq!(config.default_currency, "EUR");
        assert_eq!(config.wrapper, PathBuf::from(DEFAULT_WRAPPER));
        assert!(config.interpreter.is_none());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: QuoteConfig =
            serde_json::from_str(r#"{"default_currency": "CHF"}"#).unwrap();
        assert_eq!(config.default_currency, "CHF");
        assert_eq!(config.wrapper, PathBuf::from(DEFAULT_WRAPPER));
    }
}
