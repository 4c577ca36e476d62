pub mod delay;
pub mod metrics;
pub mod throttle;

pub use delay::DelaySlot;
pub use metrics::Metrics;
pub use throttle::ThrottleGate;
