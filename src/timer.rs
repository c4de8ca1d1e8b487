use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
#[error("attempted to advance the retransmission timer while it is inactive")]
pub struct InactiveTimerError;

/// Tracks the time since the oldest unacknowledged segment was
/// (re)transmitted.
///
/// The timer is purely passive: the owning sender feeds it elapsed
/// milliseconds via `advance` and polls `expired`. It is started when a
/// segment enters flight, restarted on acknowledgment progress or
/// retransmission, and stopped when nothing is in flight.
#[derive(Debug, Default)]
pub struct RetransmitTimer {
    active: bool,
    elapsed_ms: u64,
    timeout_ms: u64,
}

impl RetransmitTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activates the timer with the given timeout, zeroing any
    /// previously accumulated time.
    pub fn start(&mut self, timeout_ms: u64) {
        self.timeout_ms = timeout_ms;
        self.elapsed_ms = 0;
        self.active = true;
    }

    /// Deactivates the timer and discards accumulated time.
    pub fn stop(&mut self) {
        self.active = false;
        self.elapsed_ms = 0;
    }

    pub fn active(&self) -> bool {
        self.active
    }

    /// Records that `ms` milliseconds have passed. Advancing an inactive
    /// timer is a caller bug and fails rather than silently accumulating
    /// time; check `active()` first.
    pub fn advance(&mut self, ms: u64) -> Result<(), InactiveTimerError> {
        if !self.active {
            return Err(InactiveTimerError);
        }

        self.elapsed_ms += ms;
        Ok(())
    }

    pub fn expired(&self) -> bool {
        self.active && self.elapsed_ms >= self.timeout_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_timer_is_inactive() {
        let timer = RetransmitTimer::new();

        assert_eq!(timer.active(), false);
        assert_eq!(timer.expired(), false);
    }

    #[test]
    fn test_expires_after_timeout() {
        let mut timer = RetransmitTimer::new();

        timer.start(100);
        assert_eq!(timer.active(), true);
        assert_eq!(timer.expired(), false);

        timer.advance(99).unwrap();
        assert_eq!(timer.expired(), false);

        timer.advance(1).unwrap();
        assert_eq!(timer.expired(), true);
    }

    #[test]
    fn test_restart_zeroes_elapsed_time() {
        let mut timer = RetransmitTimer::new();

        timer.start(50);
        timer.advance(49).unwrap();
        timer.start(50);
        timer.advance(49).unwrap();

        assert_eq!(timer.expired(), false);
    }

    #[test]
    fn test_stop_deactivates() {
        let mut timer = RetransmitTimer::new();

        timer.start(10);
        timer.advance(20).unwrap();
        assert_eq!(timer.expired(), true);

        timer.stop();
        assert_eq!(timer.active(), false);
        assert_eq!(timer.expired(), false);
    }

    #[test]
    fn test_advance_while_inactive_fails() {
        let mut timer = RetransmitTimer::new();

        assert_eq!(timer.advance(5), Err(InactiveTimerError));

        timer.start(10);
        timer.stop();
        assert_eq!(timer.advance(5), Err(InactiveTimerError));
    }
}
