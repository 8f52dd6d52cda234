//! When to refresh.
//!
//! Pure arithmetic over the token expiry and the failure count; the bridge
//! owns the clock and the timer.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::config::ConfigError;

/// Longest delay the bridge will ever arm a timer for.
pub const MAX_SCHEDULABLE_DELAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Timing knobs for the bridge.
///
/// | Field | Default |
/// |-------|---------|
/// | `margin` | 2 min before expiry |
/// | `min_delay` | 15 s |
/// | `max_delay` | 50 min |
/// | `fallback_delay` | 45 min, used when the expiry cannot be read |
/// | `retry_base` | 30 s, doubled per consecutive failure |
/// | `retry_max` | 5 min |
/// | `foreground_throttle` | 60 s between forced foreground refreshes |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    pub margin: Duration,
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub fallback_delay: Duration,
    pub retry_base: Duration,
    pub retry_max: Duration,
    pub foreground_throttle: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            margin: Duration::from_secs(2 * 60),
            min_delay: Duration::from_secs(15),
            max_delay: Duration::from_secs(50 * 60),
            fallback_delay: Duration::from_secs(45 * 60),
            retry_base: Duration::from_secs(30),
            retry_max: Duration::from_secs(5 * 60),
            foreground_throttle: Duration::from_secs(60),
        }
    }
}

impl RefreshPolicy {
    /// Delay until the refresh for a token expiring at `expires_at`.
    ///
    /// `expires_at - now - margin`, clamped into `[min_delay, max_delay]`.
    /// An already expired token yields `min_delay`.
    pub fn refresh_delay(&self, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
        let remaining = (expires_at - now).to_std().unwrap_or(Duration::ZERO);
        remaining
            .saturating_sub(self.margin)
            .max(self.min_delay)
            .min(self.max_delay)
    }

    /// Backoff before the next attempt after `failures` consecutive
    /// failures (1-based).
    pub fn retry_delay(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1).min(16);
        self.retry_base
            .saturating_mul(1u32 << exponent)
            .min(self.retry_max)
    }

    /// Reject combinations the scheduler cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_delay.is_zero() {
            return Err(ConfigError::Policy("min delay must be positive".into()));
        }
        if self.min_delay > self.max_delay {
            return Err(ConfigError::Policy(format!(
                "min delay {:?} exceeds max delay {:?}",
                self.min_delay, self.max_delay
            )));
        }
        for (name, value) in [("max delay", self.max_delay), ("retry max", self.retry_max)] {
            if value > MAX_SCHEDULABLE_DELAY {
                return Err(ConfigError::Policy(format!(
                    "{name} {value:?} exceeds the {MAX_SCHEDULABLE_DELAY:?} limit"
                )));
            }
        }
        if self.fallback_delay < self.min_delay || self.fallback_delay > self.max_delay {
            return Err(ConfigError::Policy(format!(
                "fallback delay {:?} outside [{:?}, {:?}]",
                self.fallback_delay, self.min_delay, self.max_delay
            )));
        }
        if self.retry_base.is_zero() || self.retry_base > self.retry_max {
            return Err(ConfigError::Policy(format!(
                "retry base {:?} must be positive and at most retry max {:?}",
                self.retry_base, self.retry_max
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn ten_minute_token_refreshes_two_minutes_early() {
        let policy = RefreshPolicy::default();
        let delay = policy.refresh_delay(now() + TimeDelta::minutes(10), now());
        assert_eq!(delay, Duration::from_secs(8 * 60));
    }

    #[test]
    fn short_token_is_clamped_to_min_delay() {
        let policy = RefreshPolicy::default();
        let delay = policy.refresh_delay(now() + TimeDelta::seconds(30), now());
        assert_eq!(delay, policy.min_delay);
    }

    #[test]
    fn expired_token_uses_min_delay() {
        let policy = RefreshPolicy::default();
        let delay = policy.refresh_delay(now() - TimeDelta::hours(1), now());
        assert_eq!(delay, policy.min_delay);
    }

    #[test]
    fn long_token_is_clamped_to_max_delay() {
        let policy = RefreshPolicy::default();
        let delay = policy.refresh_delay(now() + TimeDelta::hours(24), now());
        assert_eq!(delay, policy.max_delay);
    }

    #[test]
    fn delay_is_always_strictly_before_expiry_when_room_allows() {
        let policy = RefreshPolicy::default();
        for minutes in [1_i64, 3, 10, 30, 52, 60] {
            let expiry = now() + TimeDelta::minutes(minutes);
            let delay = policy.refresh_delay(expiry, now());
            let remaining = (expiry - now()).to_std().unwrap();
            assert!(delay >= policy.min_delay && delay <= policy.max_delay);
            if remaining > policy.min_delay {
                assert!(delay < remaining, "{minutes}m token refreshed at {delay:?}");
            }
        }
    }

    #[test]
    fn retry_backoff_doubles_and_caps() {
        let policy = RefreshPolicy::default();
        let secs: Vec<u64> = (1..=6).map(|n| policy.retry_delay(n).as_secs()).collect();
        assert_eq!(secs, vec![30, 60, 120, 240, 300, 300]);
        assert_eq!(policy.retry_delay(u32::MAX), policy.retry_max);
    }

    #[test]
    fn validate_accepts_defaults() {
        assert!(RefreshPolicy::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_inverted_clamp_and_stray_fallback() {
        let inverted = RefreshPolicy {
            min_delay: Duration::from_secs(600),
            max_delay: Duration::from_secs(60),
            ..RefreshPolicy::default()
        };
        assert!(inverted.validate().is_err());

        let stray = RefreshPolicy {
            fallback_delay: Duration::from_secs(3 * 60 * 60),
            ..RefreshPolicy::default()
        };
        assert!(stray.validate().is_err());

        let huge_max = RefreshPolicy {
            max_delay: Duration::from_secs(u64::MAX),
            fallback_delay: Duration::from_secs(u64::MAX),
            ..RefreshPolicy::default()
        };
        assert!(huge_max.validate().is_err());

        let huge_retry = RefreshPolicy {
            retry_max: MAX_SCHEDULABLE_DELAY + Duration::from_secs(1),
            ..RefreshPolicy::default()
        };
        assert!(huge_retry.validate().is_err());

        let day = RefreshPolicy {
            max_delay: MAX_SCHEDULABLE_DELAY,
            ..RefreshPolicy::default()
        };
        assert!(day.validate().is_ok());

        let zero_retry = RefreshPolicy {
            retry_base: Duration::ZERO,
            ..RefreshPolicy::default()
        };
        assert!(zero_retry.validate().is_err());
    }
}
