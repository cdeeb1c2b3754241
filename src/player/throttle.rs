use std::time::Duration;

use tokio::time::Instant;

/// Accepts an event only if `min_interval` has passed since the last accepted one.
#[derive(Debug, Clone)]
pub struct Throttle {
    min_interval: Duration,
    last_accepted: Option<Instant>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_accepted: None,
        }
    }

    /// Dropped events do not move the window.
    pub fn try_accept(&mut self, now: Instant) -> bool {
        let too_soon = self
            .last_accepted
            .is_some_and(|last| now.saturating_duration_since(last) < self.min_interval);
        if too_soon {
            return false;
        }
        self.last_accepted = Some(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_millis(1000);

    #[test]
    fn first_event_is_accepted() {
        let mut t = Throttle::new(SECOND);
        assert!(t.try_accept(Instant::now()));
    }

    #[test]
    fn events_inside_window_are_dropped() {
        let mut t = Throttle::new(SECOND);
        let t0 = Instant::now();
        assert!(t.try_accept(t0));
        assert!(!t.try_accept(t0 + Duration::from_millis(500)));
        assert!(!t.try_accept(t0 + Duration::from_millis(999)));
        assert!(t.try_accept(t0 + SECOND));
    }

    #[test]
    fn dropped_events_do_not_extend_window() {
        let mut t = Throttle::new(SECOND);
        let t0 = Instant::now();
        assert!(t.try_accept(t0));
        for ms in (100..1000).step_by(100) {
            assert!(!t.try_accept(t0 + Duration::from_millis(ms)));
        }
        assert!(t.try_accept(t0 + Duration::from_millis(1500)));
        assert!(!t.try_accept(t0 + Duration::from_millis(2000)));
    }
}
