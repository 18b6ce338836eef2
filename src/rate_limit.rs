//! Rate limiting for high-frequency callbacks, measured against the host clock.

/// Leading-edge throttle: the first call in a window runs, later calls in the
/// same window are dropped rather than queued.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval_ms: i64,
    window_end: Option<i64>,
}

impl Throttle {
    pub fn new(interval_ms: i64) -> Self {
        Self {
            interval_ms: interval_ms.max(0),
            window_end: None,
        }
    }

    pub fn try_acquire(&mut self, now_ms: i64) -> bool {
        if self.window_end.is_some_and(|end| now_ms < end) {
            return false;
        }
        self.window_end = Some(now_ms.saturating_add(self.interval_ms));
        true
    }

    pub fn call<R>(&mut self, now_ms: i64, f: impl FnOnce() -> R) -> Option<R> {
        self.try_acquire(now_ms).then(f)
    }
}

/// Trailing-edge debounce: fires once after `delay_ms` of silence. Every call
/// pushes the deadline out again.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay_ms: i64,
    deadline: Option<i64>,
}

impl Debounce {
    pub fn new(delay_ms: i64) -> Self {
        Self {
            delay_ms: delay_ms.max(0),
            deadline: None,
        }
    }

    pub fn call(&mut self, now_ms: i64) {
        self.deadline = Some(now_ms.saturating_add(self.delay_ms));
    }

    /// When the host should wake the debounce up, if anything is pending.
    pub fn deadline(&self) -> Option<i64> {
        self.deadline
    }

    pub fn poll(&mut self, now_ms: i64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttle_runs_leading_call_and_drops_the_rest_of_the_window() {
        let mut throttle = Throttle::new(150);
        let mut ran = Vec::new();
        for now in [0, 10, 149, 150, 151, 299, 300] {
            if let Some(value) = throttle.call(now, || now) {
                ran.push(value);
            }
        }
        assert_eq!(ran, vec![0, 150, 300]);
    }

    #[test]
    fn zero_interval_throttle_never_drops() {
        let mut throttle = Throttle::new(0);
        assert!(throttle.try_acquire(5));
        assert!(throttle.try_acquire(5));
    }

    #[test]
    fn debounce_fires_once_after_silence() {
        let mut debounce = Debounce::new(100);
        debounce.call(0);
        debounce.call(60);
        assert!(!debounce.poll(120));
        assert_eq!(debounce.deadline(), Some(160));
        assert!(debounce.poll(160));
        assert!(!debounce.poll(500));
    }

    #[test]
    fn debounce_cancel_discards_pending_call() {
        let mut debounce = Debounce::new(100);
        assert!(!debounce.cancel());
        debounce.call(0);
        assert!(debounce.cancel());
        assert!(!debounce.poll(1_000));
    }
}
