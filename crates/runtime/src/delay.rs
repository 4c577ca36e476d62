use foundation::time::TimeMs;

/// A single-slot cancellable deferred value.
///
/// Scheduling replaces whatever was pending, so only the most recent request
/// of a given kind is ever honored. The owner drives it with `poll` and must
/// `cancel` on teardown; there is no hidden timer that can fire into a dead
/// context.
#[derive(Debug, Clone, Default)]
pub struct DelaySlot<T> {
    pending: Option<(TimeMs, T)>,
}

impl<T> DelaySlot<T> {
    pub fn new() -> Self {
        Self { pending: None }
    }

    /// Park `value` until `due`. Replaces any pending value.
    pub fn schedule(&mut self, due: TimeMs, value: T) {
        self.pending = Some((due, value));
    }

    /// Fire the pending value once its deadline has passed.
    pub fn poll(&mut self, now: TimeMs) -> Option<T> {
        let (due, _) = self.pending.as_ref()?;
        if now < *due {
            return None;
        }
        self.pending.take().map(|(_, v)| v)
    }

    pub fn next_deadline(&self) -> Option<TimeMs> {
        self.pending.as_ref().map(|(due, _)| *due)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::DelaySlot;
    use foundation::time::TimeMs;

    #[test]
    fn fires_only_once_deadline_passes() {
        let mut slot = DelaySlot::new();
        slot.schedule(TimeMs(100), "x");
        assert_eq!(slot.poll(TimeMs(99)), None);
        assert_eq!(slot.poll(TimeMs(100)), Some("x"));
        assert_eq!(slot.poll(TimeMs(200)), None);
    }

    #[test]
    fn scheduling_replaces_pending_value() {
        let mut slot = DelaySlot::new();
        slot.schedule(TimeMs(100), 1);
        slot.schedule(TimeMs(300), 2);
        assert_eq!(slot.poll(TimeMs(150)), None);
        assert_eq!(slot.poll(TimeMs(300)), Some(2));
    }

    #[test]
    fn cancel_clears_pending() {
        let mut slot = DelaySlot::new();
        slot.schedule(TimeMs(10), ());
        slot.cancel();
        assert!(!slot.is_pending());
        assert_eq!(slot.poll(TimeMs(1000)), None);
    }
}
