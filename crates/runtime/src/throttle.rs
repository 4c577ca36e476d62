use foundation::time::TimeMs;

/// Rate limit for a high-frequency event stream with a trailing-edge
/// guarantee.
///
/// At most one firing happens per window. An update inside the window is
/// parked in a single deferred slot (last-value-wins) and fires when the
/// window closes via `poll`. No value is permanently dropped: the final
/// update of a burst is always eventually delivered.
///
/// The gate never reads a clock; the host passes `TimeMs` into `update` and
/// `poll`, which keeps the behavior deterministic and replayable.
#[derive(Debug, Clone)]
pub struct ThrottleGate<T> {
    window_ms: u64,
    last_fire_at: TimeMs,
    pending: Option<Pending<T>>,
}

#[derive(Debug, Clone)]
struct Pending<T> {
    due: TimeMs,
    value: T,
}

impl<T> ThrottleGate<T> {
    /// `now` seeds the last-fire timestamp, so the first update inside the
    /// initial window is deferred rather than fired immediately.
    pub fn new(window_ms: u64, now: TimeMs) -> Self {
        Self {
            window_ms,
            last_fire_at: now,
            pending: None,
        }
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// Submit a new value. Fires immediately if the window has elapsed,
    /// otherwise replaces the deferred slot with this value.
    pub fn update(&mut self, now: TimeMs, value: T) -> Option<T> {
        if now.saturating_elapsed_since(self.last_fire_at) >= self.window_ms {
            self.last_fire_at = now;
            self.pending = None;
            return Some(value);
        }

        // Only one deferred slot may be outstanding; newest value wins.
        self.pending = Some(Pending {
            due: self.last_fire_at.plus_ms(self.window_ms),
            value,
        });
        None
    }

    /// Fire the deferred value once its deadline has passed.
    pub fn poll(&mut self, now: TimeMs) -> Option<T> {
        let due = self.pending.as_ref()?.due;
        if now < due {
            return None;
        }
        let pending = self.pending.take()?;
        self.last_fire_at = now;
        Some(pending.value)
    }

    /// When the host loop should next call `poll`, if anything is parked.
    pub fn next_deadline(&self) -> Option<TimeMs> {
        self.pending.as_ref().map(|p| p.due)
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop any parked value. Teardown must call this so nothing fires into
    /// a dead context.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Restart the window at `now` and drop any parked value. Used when the
    /// host performs an action that is allowed to bypass the gate.
    pub fn reset(&mut self, now: TimeMs) {
        self.last_fire_at = now;
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::ThrottleGate;
    use foundation::time::TimeMs;

    #[test]
    fn burst_inside_window_fires_once_with_last_value() {
        // window = 1000ms; A at t=0, B at t=200, C at t=900.
        let mut gate = ThrottleGate::new(1000, TimeMs(0));
        assert_eq!(gate.update(TimeMs(0), "a"), None);
        assert_eq!(gate.update(TimeMs(200), "b"), None);
        assert_eq!(gate.update(TimeMs(900), "c"), None);

        assert_eq!(gate.poll(TimeMs(999)), None);
        assert_eq!(gate.poll(TimeMs(1000)), Some("c"));
        assert_eq!(gate.poll(TimeMs(1001)), None);
    }

    #[test]
    fn fires_immediately_after_window_elapses() {
        let mut gate = ThrottleGate::new(100, TimeMs(0));
        assert_eq!(gate.update(TimeMs(150), "a"), Some("a"));
        // Window restarts at the fire.
        assert_eq!(gate.update(TimeMs(200), "b"), None);
        assert_eq!(gate.next_deadline(), Some(TimeMs(250)));
    }

    #[test]
    fn trailing_value_is_never_dropped() {
        let mut gate = ThrottleGate::new(100, TimeMs(0));
        assert_eq!(gate.update(TimeMs(110), 1), Some(1));
        assert_eq!(gate.update(TimeMs(120), 2), None);
        assert_eq!(gate.update(TimeMs(130), 3), None);
        assert_eq!(gate.poll(TimeMs(210)), Some(3));
        assert!(!gate.has_pending());
    }

    #[test]
    fn at_most_one_fire_per_window_over_a_long_burst() {
        let mut gate = ThrottleGate::new(100, TimeMs(0));
        let mut fires = 0;
        for t in (0..=500).step_by(10) {
            if gate.update(TimeMs(t), t).is_some() {
                fires += 1;
            }
            if gate.poll(TimeMs(t)).is_some() {
                fires += 1;
            }
        }
        if gate.poll(TimeMs(600)).is_some() {
            fires += 1;
        }
        // 600ms of traffic with a 100ms window: at most 6 fires.
        assert!(fires <= 6, "fired {fires} times");
        assert!(fires >= 1);
    }

    #[test]
    fn cancel_clears_the_slot() {
        let mut gate = ThrottleGate::new(100, TimeMs(0));
        assert_eq!(gate.update(TimeMs(10), "a"), None);
        gate.cancel();
        assert_eq!(gate.poll(TimeMs(1000)), None);
    }

    #[test]
    fn reset_restarts_the_window() {
        let mut gate = ThrottleGate::new(100, TimeMs(0));
        assert_eq!(gate.update(TimeMs(10), "a"), None);
        gate.reset(TimeMs(50));
        assert_eq!(gate.poll(TimeMs(1000)), None);
        // New window counts from the reset, not from the old fire.
        assert_eq!(gate.update(TimeMs(60), "b"), None);
        assert_eq!(gate.next_deadline(), Some(TimeMs(150)));
    }
}
