/// Time primitives
///
/// The client core never reads a wall clock. Every time-dependent operation
/// takes an explicit `TimeMs` supplied by the host, so behavior is
/// deterministic and replayable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeMs(pub u64);

impl TimeMs {
    pub fn saturating_elapsed_since(self, earlier: TimeMs) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    pub fn plus_ms(self, ms: u64) -> TimeMs {
        TimeMs(self.0.saturating_add(ms))
    }
}
