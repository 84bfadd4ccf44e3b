//! # Restart backoff.
//!
//! The delay after `streak` consecutive silent generations is
//! `first × factor^streak`, capped at `max`, with jitter applied last. The base
//! is recomputed from `streak` every time, so jitter never compounds.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use steward::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(125),
//!     max: Duration::from_secs(2),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(backoff.next(0), Duration::from_millis(125));
//! assert_eq!(backoff.next(2), Duration::from_millis(500));
//! assert_eq!(backoff.next(8), Duration::from_secs(2));
//! assert!(BackoffPolicy::none().next(8).is_zero());
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Delay schedule between ward generations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay after the first silent generation.
    pub first: Duration,
    /// Upper bound for any delay.
    pub max: Duration,
    /// Growth per additional silent generation (`1.0` keeps the delay constant).
    pub factor: f64,
    /// Randomization applied to the capped delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl BackoffPolicy {
    /// Restart immediately.
    pub const fn none() -> Self {
        Self {
            first: Duration::ZERO,
            max: Duration::ZERO,
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }

    /// Constant `delay` between generations.
    pub const fn constant(delay: Duration) -> Self {
        Self {
            first: delay,
            max: delay,
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }

    /// Doubling delay starting at `first`, capped at `max`.
    pub const fn exponential(first: Duration, max: Duration) -> Self {
        Self {
            first,
            max,
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }

    /// Replaces the jitter policy.
    pub const fn with_jitter(mut self, jitter: JitterPolicy) -> Self {
        self.jitter = jitter;
        self
    }

    /// True when every delay is zero.
    pub fn is_none(&self) -> bool {
        self.first.is_zero() || self.max.is_zero()
    }

    /// Delay to apply after `streak` consecutive silent generations (0-indexed).
    pub fn next(&self, streak: u32) -> Duration {
        if self.is_none() {
            return Duration::ZERO;
        }
        let exp = streak.min(i32::MAX as u32) as i32;
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);

        let base = if secs.is_finite() && secs >= 0.0 && secs <= self.max.as_secs_f64() {
            Duration::from_secs_f64(secs)
        } else {
            self.max
        };

        match self.jitter {
            JitterPolicy::Decorrelated => {
                self.jitter
                    .apply_decorrelated(self.first.min(self.max), base, self.max)
            }
            _ => self.jitter.apply(base),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_immediate() {
        let policy = BackoffPolicy::default();
        assert!(policy.is_none());
        for streak in [0, 1, 10, u32::MAX] {
            assert_eq!(policy.next(streak), Duration::ZERO);
        }
    }

    #[test]
    fn test_exponential_is_capped() {
        let policy =
            BackoffPolicy::exponential(Duration::from_millis(100), Duration::from_millis(700));
        let delays: Vec<_> = (0..5).map(|s| policy.next(s)).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
                Duration::from_millis(700),
                Duration::from_millis(700),
            ]
        );
        assert_eq!(policy.next(u32::MAX), Duration::from_millis(700));
    }

    #[test]
    fn test_constant() {
        let policy = BackoffPolicy::constant(Duration::from_millis(250));
        assert!((0..20).all(|s| policy.next(s) == Duration::from_millis(250)));
    }

    #[test]
    fn test_first_above_max_uses_max() {
        let policy = BackoffPolicy {
            first: Duration::from_secs(10),
            max: Duration::from_secs(5),
            factor: 2.0,
            jitter: JitterPolicy::None,
        };
        assert_eq!(policy.next(0), Duration::from_secs(5));
    }

    #[test]
    fn test_jitter_stays_under_base() {
        let policy = BackoffPolicy::exponential(Duration::from_millis(100), Duration::from_secs(30))
            .with_jitter(JitterPolicy::Full);
        for streak in 0..12 {
            let base = Duration::from_secs_f64((0.1 * 2f64.powi(streak as i32)).min(30.0));
            assert!(policy.next(streak) <= base, "streak {streak}");
        }
    }

    #[test]
    fn test_equal_jitter_keeps_half() {
        let policy = BackoffPolicy::constant(Duration::from_secs(1)).with_jitter(JitterPolicy::Equal);
        for streak in 0..50 {
            let d = policy.next(streak);
            assert!(d >= Duration::from_millis(500) && d <= Duration::from_secs(1));
        }
    }

    #[test]
    fn test_decorrelated_spreads_out() {
        let policy = BackoffPolicy::exponential(Duration::from_millis(100), Duration::from_secs(30))
            .with_jitter(JitterPolicy::Decorrelated);
        let samples: Vec<_> = (0..100).map(|_| policy.next(8)).collect();
        assert!(samples.iter().all(|d| *d >= Duration::from_millis(100)));
        assert!(samples.iter().any(|d| *d >= Duration::from_secs(5)));
    }
}
