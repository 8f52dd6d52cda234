//! Bridge configuration loaded from the environment.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `UNILIFE_TOKEN_TEMPLATE` | `supabase-final` | Provider template requested with every token |
//! | `UNILIFE_REFRESH_MARGIN_SECS` | 120 | Refresh this long before expiry |
//! | `UNILIFE_REFRESH_MIN_SECS` | 15 | Lower clamp of the refresh delay |
//! | `UNILIFE_REFRESH_MAX_SECS` | 3000 | Upper clamp of the refresh delay |
//! | `UNILIFE_REFRESH_FALLBACK_SECS` | 2700 | Delay when the expiry is unreadable |
//! | `UNILIFE_RETRY_BASE_SECS` | 30 | First retry after a failed acquisition |
//! | `UNILIFE_RETRY_MAX_SECS` | 300 | Retry backoff cap |
//! | `UNILIFE_FOREGROUND_THROTTLE_SECS` | 60 | Minimum gap between forced foreground refreshes |

use std::time::Duration;

use crate::policy::RefreshPolicy;

pub const ENV_TOKEN_TEMPLATE: &str = "UNILIFE_TOKEN_TEMPLATE";
pub const DEFAULT_TOKEN_TEMPLATE: &str = "supabase-final";

/// Errors from loading or validating bridge configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a whole number of seconds, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("invalid refresh policy: {0}")]
    Policy(String),
}

/// Everything the bridge needs besides its collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub token_template: String,
    pub policy: RefreshPolicy,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            token_template: DEFAULT_TOKEN_TEMPLATE.to_string(),
            policy: RefreshPolicy::default(),
        }
    }
}

impl BridgeConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary lookup; unset keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token_template = match lookup(ENV_TOKEN_TEMPLATE) {
            Some(value) if value.trim().is_empty() => {
                return Err(ConfigError::Empty(ENV_TOKEN_TEMPLATE))
            }
            Some(value) => value.trim().to_string(),
            None => DEFAULT_TOKEN_TEMPLATE.to_string(),
        };

        let defaults = RefreshPolicy::default();
        let secs = |var: &'static str, default: Duration| -> Result<Duration, ConfigError> {
            match lookup(var) {
                None => Ok(default),
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|_| ConfigError::InvalidNumber { var, value: raw }),
            }
        };

        let policy = RefreshPolicy {
            margin: secs("UNILIFE_REFRESH_MARGIN_SECS", defaults.margin)?,
            min_delay: secs("UNILIFE_REFRESH_MIN_SECS", defaults.min_delay)?,
            max_delay: secs("UNILIFE_REFRESH_MAX_SECS", defaults.max_delay)?,
            fallback_delay: secs("UNILIFE_REFRESH_FALLBACK_SECS", defaults.fallback_delay)?,
            retry_base: secs("UNILIFE_RETRY_BASE_SECS", defaults.retry_base)?,
            retry_max: secs("UNILIFE_RETRY_MAX_SECS", defaults.retry_max)?,
            foreground_throttle: secs(
                "UNILIFE_FOREGROUND_THROTTLE_SECS",
                defaults.foreground_throttle,
            )?,
        };
        policy.validate()?;

        Ok(Self {
            token_template,
            policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = BridgeConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(config.token_template, "supabase-final");
    }

    #[test]
    fn overrides_are_applied() {
        let config = BridgeConfig::from_lookup(lookup(&[
            ("UNILIFE_TOKEN_TEMPLATE", "backend"),
            ("UNILIFE_REFRESH_MARGIN_SECS", "60"),
            ("UNILIFE_FOREGROUND_THROTTLE_SECS", " 5 "),
        ]))
        .unwrap();
        assert_eq!(config.token_template, "backend");
        assert_eq!(config.policy.margin, Duration::from_secs(60));
        assert_eq!(config.policy.foreground_throttle, Duration::from_secs(5));
        assert_eq!(config.policy.min_delay, Duration::from_secs(15));
    }

    #[test]
    fn garbage_number_is_reported_with_its_variable() {
        let err = BridgeConfig::from_lookup(lookup(&[("UNILIFE_RETRY_BASE_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidNumber { var: "UNILIFE_RETRY_BASE_SECS", .. }
        ));
    }

    #[test]
    fn blank_template_is_rejected() {
        let err = BridgeConfig::from_lookup(lookup(&[("UNILIFE_TOKEN_TEMPLATE", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Empty(_)));
    }

    #[test]
    fn unbounded_delays_are_rejected() {
        let err = BridgeConfig::from_lookup(lookup(&[
            ("UNILIFE_REFRESH_MAX_SECS", "18446744073709551615"),
            ("UNILIFE_REFRESH_FALLBACK_SECS", "18446744073709551615"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Policy(_)));
    }

    #[test]
    fn inconsistent_policy_is_rejected() {
        let err = BridgeConfig::from_lookup(lookup(&[
            ("UNILIFE_REFRESH_MIN_SECS", "600"),
            ("UNILIFE_REFRESH_MAX_SECS", "300"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Policy(_)));
    }
}
