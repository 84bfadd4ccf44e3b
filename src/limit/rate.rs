//! Event rates.

use std::cmp::Ordering;
use std::fmt;
use std::time::Duration;

/// Events per second.
///
/// Totally ordered (`NaN` never appears through the constructors, and
/// comparisons use [`f64::total_cmp`]). [`Rate::INF`] means "no limit".
///
/// ```
/// use std::time::Duration;
/// use steward::Rate;
///
/// assert_eq!(Rate::per(2, Duration::from_secs(1)), Rate::new(2.0));
/// assert_eq!(Rate::every(Duration::from_millis(250)), Rate::new(4.0));
/// assert!(Rate::per(10, Duration::from_secs(60)) < Rate::new(1.0));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Rate(f64);

impl Rate {
    /// Unlimited rate.
    pub const INF: Rate = Rate(f64::INFINITY);

    /// Rate that never refills.
    pub const ZERO: Rate = Rate(0.0);

    /// Creates a rate of `per_second` events per second (negative and `NaN` become zero).
    pub fn new(per_second: f64) -> Self {
        if per_second.is_nan() || per_second < 0.0 {
            Rate::ZERO
        } else {
            Rate(per_second)
        }
    }

    /// `count` events spread over `period`.
    pub fn per(count: u32, period: Duration) -> Self {
        if count == 0 {
            return Rate::ZERO;
        }
        Rate::every(period / count)
    }

    /// One event every `interval`; a zero interval is unlimited.
    pub fn every(interval: Duration) -> Self {
        if interval.is_zero() {
            return Rate::INF;
        }
        Rate(1.0 / interval.as_secs_f64())
    }

    /// Events per second.
    #[inline]
    pub fn as_f64(&self) -> f64 {
        self.0
    }

    /// True for [`Rate::INF`].
    #[inline]
    pub fn is_inf(&self) -> bool {
        self.0.is_infinite()
    }

    /// Time needed to accumulate `tokens` at this rate.
    pub(crate) fn duration_for(&self, tokens: f64) -> Duration {
        if tokens <= 0.0 || self.is_inf() {
            return Duration::ZERO;
        }
        if self.0 <= 0.0 {
            return Duration::MAX;
        }
        Duration::try_from_secs_f64(tokens / self.0).unwrap_or(Duration::MAX)
    }

    /// Tokens accumulated at this rate over `elapsed`.
    pub(crate) fn tokens_for(&self, elapsed: Duration) -> f64 {
        if elapsed.is_zero() {
            return 0.0;
        }
        elapsed.as_secs_f64() * self.0
    }
}

impl PartialEq for Rate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Rate {}

impl PartialOrd for Rate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_inf() {
            f.write_str("inf")
        } else {
            write!(f, "{}/s", self.0)
        }
    }
}
