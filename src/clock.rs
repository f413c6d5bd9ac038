use chrono::Utc;

/// Millisecond wall-clock source injected into the workspace so the tracker
/// can be driven deterministically in tests.
pub trait Clock: Send {
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}
