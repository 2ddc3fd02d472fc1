use rand::Rng;
use std::time::Duration;

/// Outcome of recording a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// Wait this long, then try again
    BackingOff(Duration),
    /// All attempts used up; surface the failure
    Exhausted,
}

/// Explicit retry state machine for one fetch.
///
/// Tracks the attempt count and computes the next backoff delay: the base
/// delay doubles per attempt, is capped, and carries ±50% jitter so retries
/// from concurrent walkers do not line up.
#[derive(Debug, Clone)]
pub struct RetrySchedule {
    attempt: u32,
    max_retries: u32,
    base: Duration,
    cap: Duration,
}

impl RetrySchedule {
    pub fn new(max_retries: u32, base: Duration, cap: Duration) -> Self {
        Self {
            attempt: 0,
            max_retries,
            base,
            cap,
        }
    }

    /// Records a transient failure and decides what happens next.
    pub fn record_failure(&mut self) -> RetryState {
        if self.attempt >= self.max_retries {
            return RetryState::Exhausted;
        }

        let backoff = self.backoff_for(self.attempt);
        self.attempt += 1;
        RetryState::BackingOff(with_jitter(backoff))
    }

    /// Deterministic backoff for a given attempt, before jitter.
    fn backoff_for(&self, attempt: u32) -> Duration {
        let shift = attempt.min(16);
        let factor = 1u32 << shift;
        self.base.saturating_mul(factor).min(self.cap)
    }

    /// Attempts recorded so far.
    pub fn attempts(&self) -> u32 {
        self.attempt
    }
}

/// Applies ±50% uniform jitter to a delay.
fn with_jitter(delay: Duration) -> Duration {
    let millis = delay.as_millis() as u64;
    if millis == 0 {
        return delay;
    }
    let half = millis / 2;
    let jittered = rand::thread_rng().gen_range(millis - half..=millis + half);
    Duration::from_millis(jittered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let schedule = RetrySchedule::new(5, Duration::from_millis(500), Duration::from_secs(10));
        assert_eq!(schedule.backoff_for(0), Duration::from_millis(500));
        assert_eq!(schedule.backoff_for(1), Duration::from_millis(1000));
        assert_eq!(schedule.backoff_for(2), Duration::from_millis(2000));
        assert_eq!(schedule.backoff_for(10), Duration::from_secs(10));
    }

    #[test]
    fn test_exhausts_after_max_retries() {
        let mut schedule = RetrySchedule::new(3, Duration::from_millis(1), Duration::from_secs(1));

        for _ in 0..3 {
            assert!(matches!(
                schedule.record_failure(),
                RetryState::BackingOff(_)
            ));
        }
        assert_eq!(schedule.record_failure(), RetryState::Exhausted);
        assert_eq!(schedule.attempts(), 3);
    }

    #[test]
    fn test_zero_retries_exhausts_immediately() {
        let mut schedule = RetrySchedule::new(0, Duration::from_millis(500), Duration::from_secs(10));
        assert_eq!(schedule.record_failure(), RetryState::Exhausted);
    }

    #[test]
    fn test_jitter_stays_within_half_window() {
        for _ in 0..100 {
            let jittered = with_jitter(Duration::from_millis(1000));
            assert!(jittered >= Duration::from_millis(500));
            assert!(jittered <= Duration::from_millis(1500));
        }
    }
}
