//! Configuration for the election engine.

use crate::{ElectionError, ElectionResult};
use std::time::Duration;

/// Minimum lease lifetime.
pub const MIN_TTL: Duration = Duration::from_millis(1000);

/// Minimum retry interval.
pub const MIN_WAIT: Duration = Duration::from_millis(500);

/// Configuration for an [`ElectionEngine`](crate::ElectionEngine).
///
/// Validated once at engine construction and immutable afterwards.
#[derive(Debug, Clone)]
pub struct ElectionConfig {
    /// The contested leadership slot; independent groups do not interact
    pub group: String,

    /// Lease lifetime; a record older than this is expired and recontestable
    pub ttl: Duration,

    /// Fixed retry interval after a failed acquire or a lost renewal
    pub wait: Duration,

    /// Store-location identifier, passed through to the store adapter
    pub location: String,
}

impl Default for ElectionConfig {
    fn default() -> Self {
        Self {
            group: "default".to_string(),
            ttl: Duration::from_millis(1000),
            wait: Duration::from_millis(500),
            location: "leader".to_string(),
        }
    }
}

impl ElectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Renewal cadence: a quarter of the lease lifetime, guaranteeing at
    /// least three renewal attempts within one expiry window and tolerating
    /// roughly two consecutive missed renewals before the lease actually
    /// lapses.
    pub fn renew_interval(&self) -> Duration {
        Duration::from_millis(self.ttl.as_millis() as u64 / 4)
    }

    /// Validates option bounds, failing fast on anything below minimum.
    pub fn validate(&self) -> ElectionResult<()> {
        if self.group.is_empty() {
            return Err(ElectionError::config("group must not be empty"));
        }
        if self.location.is_empty() {
            return Err(ElectionError::config("location must not be empty"));
        }
        if self.ttl < MIN_TTL {
            return Err(ElectionError::config(format!(
                "ttl {}ms is below the {}ms minimum",
                self.ttl.as_millis(),
                MIN_TTL.as_millis()
            )));
        }
        if self.wait < MIN_WAIT {
            return Err(ElectionError::config(format!(
                "wait {}ms is below the {}ms minimum",
                self.wait.as_millis(),
                MIN_WAIT.as_millis()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ElectionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.group, "default");
        assert_eq!(config.location, "leader");
        assert_eq!(config.ttl, Duration::from_millis(1000));
        assert_eq!(config.wait, Duration::from_millis(500));
    }

    #[test]
    fn renew_interval_is_a_quarter_of_ttl() {
        let config = ElectionConfig::default().with_ttl(Duration::from_millis(2000));
        assert_eq!(config.renew_interval(), Duration::from_millis(500));

        // Integer division on milliseconds.
        let config = ElectionConfig::default().with_ttl(Duration::from_millis(1001));
        assert_eq!(config.renew_interval(), Duration::from_millis(250));
    }

    #[test]
    fn ttl_below_minimum_is_rejected() {
        let config = ElectionConfig::default().with_ttl(Duration::from_millis(999));
        assert!(matches!(
            config.validate(),
            Err(ElectionError::Config { .. })
        ));
    }

    #[test]
    fn wait_below_minimum_is_rejected() {
        let config = ElectionConfig::default().with_wait(Duration::from_millis(499));
        assert!(matches!(
            config.validate(),
            Err(ElectionError::Config { .. })
        ));
    }

    #[test]
    fn empty_group_and_location_are_rejected() {
        assert!(ElectionConfig::default().with_group("").validate().is_err());
        assert!(ElectionConfig::default()
            .with_location("")
            .validate()
            .is_err());
    }
}
