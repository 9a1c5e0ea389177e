//! # Global runtime configuration.
//!
//! Provides [`Config`] — centralized settings for the scheduler runtime.
//!
//! Config is used in two ways:
//! 1. **Scheduler creation**: `Scheduler::builder(config)`
//! 2. **Property intake**: [`Config::from_props`] reads the string properties
//!    an embedding host passes through (`script.timeout`, `script.local`).
//!
//! ## Sentinel values
//! - `timeout = 0ms` → watchdog disabled (absent, non-parseable, or
//!   non-positive property values collapse to this)
//! - `bus_capacity` is clamped to a minimum of 1 by the bus

use std::collections::HashMap;
use std::time::Duration;

/// Property key holding the maximum run duration in milliseconds.
pub const TIMEOUT_PROPERTY: &str = "script.timeout";

/// Property key marking the primary task as locally developed.
pub const LOCAL_PROPERTY: &str = "script.local";

/// Global configuration for the scheduler runtime.
///
/// ## Field semantics
/// - `timeout`: maximum run duration (`0ms` = watchdog disabled)
/// - `poll_interval`: sleep interval of the suspension idle job
/// - `bus_capacity`: event bus ring buffer size
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum run duration before the watchdog force-stops the run.
    ///
    /// - `Duration::ZERO` = no watchdog
    /// - `> 0` = the watchdog fires after `timeout + 1s` grace
    pub timeout: Duration,

    /// Sleep interval of the idle job that occupies the worker slot while
    /// the run is suspended.
    pub poll_interval: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages
    /// observe `Lagged` and skip older items. Minimum value is 1 (enforced
    /// by the bus).
    pub bus_capacity: usize,
}

impl Config {
    /// Builds a config from host string properties.
    ///
    /// Only [`TIMEOUT_PROPERTY`] is read here; an absent, non-parseable, or
    /// non-positive value disables the watchdog. Other fields keep their
    /// defaults.
    pub fn from_props(props: &HashMap<String, String>) -> Self {
        let timeout = props
            .get(TIMEOUT_PROPERTY)
            .map(|s| Self::parse_timeout(s))
            .unwrap_or(Duration::ZERO);
        Self {
            timeout,
            ..Self::default()
        }
    }

    /// Parses a millisecond timeout property value.
    ///
    /// Non-parseable or non-positive input yields `Duration::ZERO`
    /// (watchdog disabled).
    pub fn parse_timeout(s: &str) -> Duration {
        match s.trim().parse::<i64>() {
            Ok(ms) if ms > 0 => Duration::from_millis(ms as u64),
            _ => Duration::ZERO,
        }
    }

    /// Returns the watchdog timeout as an `Option`.
    ///
    /// - `None` → watchdog disabled
    /// - `Some(d)` → armed for `d` plus a fixed 1s grace
    #[inline]
    pub fn watchdog_timeout(&self) -> Option<Duration> {
        if self.timeout == Duration::ZERO {
            None
        } else {
            Some(self.timeout)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

/// Returns whether the host properties mark the primary task as local.
///
/// Reads [`LOCAL_PROPERTY`]; anything other than the literal `"true"` is
/// treated as remote.
pub fn local_from_props(props: &HashMap<String, String>) -> bool {
    props.get(LOCAL_PROPERTY).map(String::as_str) == Some("true")
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `timeout = 0ms` (no watchdog)
    /// - `poll_interval = 600ms`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            timeout: Duration::ZERO,
            poll_interval: Duration::from_millis(600),
            bus_capacity: 1024,
        }
    }
}
