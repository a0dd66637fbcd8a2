//! Delay schedules between connection attempts.

use std::time::Duration;

use rand::Rng;

/// How the delay grows between consecutive attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backoff {
    /// The same delay before every retry.
    #[default]
    Fixed,
    /// Doubling delay capped at `max_delay`, with up to 10% jitter.
    Exponential { max_delay: Duration },
}

impl Backoff {
    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay(&self, attempt: u32, base: Duration) -> Duration {
        match *self {
            Backoff::Fixed => base,
            Backoff::Exponential { max_delay } => calculate_backoff(
                attempt,
                base.as_millis() as u64,
                max_delay.as_millis() as u64,
            ),
        }
    }

    /// Same as [`Backoff::delay`] but without jitter, for budget estimates.
    pub fn nominal_delay(&self, attempt: u32, base: Duration) -> Duration {
        match *self {
            Backoff::Fixed => base,
            Backoff::Exponential { max_delay } => {
                exponential_ms(attempt, base.as_millis() as u64, max_delay.as_millis() as u64)
            }
        }
    }
}

fn exponential_ms(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }
    let exponential_base = 2u64.saturating_pow(attempt - 1);
    Duration::from_millis(base_ms.saturating_mul(exponential_base).min(max_ms))
}

/// Calculate exponential backoff delay with jitter.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    let capped_delay = exponential_ms(attempt, base_ms, max_ms).as_millis() as u64;

    // Apply jitter (0 to 10% of the delay)
    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_calculation() {
        let b1 = calculate_backoff(1, 100, 2000);
        assert!(b1.as_millis() >= 100);

        let b2 = calculate_backoff(2, 100, 2000);
        assert!(b2.as_millis() >= 200);

        let max = calculate_backoff(10, 100, 1000);
        assert!(max.as_millis() >= 1000);
        assert!(max.as_millis() < 1100);
    }

    #[test]
    fn fixed_ignores_attempt_number() {
        let base = Duration::from_millis(2500);
        assert_eq!(Backoff::Fixed.delay(1, base), base);
        assert_eq!(Backoff::Fixed.delay(5, base), base);
    }

    #[test]
    fn nominal_exponential_is_capped() {
        let backoff = Backoff::Exponential {
            max_delay: Duration::from_secs(1),
        };
        let base = Duration::from_millis(300);
        assert_eq!(backoff.nominal_delay(1, base), Duration::from_millis(300));
        assert_eq!(backoff.nominal_delay(2, base), Duration::from_millis(600));
        assert_eq!(backoff.nominal_delay(3, base), Duration::from_secs(1));
    }
}
