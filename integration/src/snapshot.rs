use serde::{Deserialize, Serialize};

/// A value paired with the instant it was observed, used for the Portfolio Snapshot and other
/// point-in-time caches that the Trade Manager domain refreshes on a cadence or in reaction to
/// an adapter callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot<T> {
    pub time: chrono::DateTime<chrono::Utc>,
    pub value: T,
}

impl<T> Snapshot<T> {
    pub fn new(time: chrono::DateTime<chrono::Utc>, value: T) -> Self {
        Self { time, value }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Snapshot<U> {
        Snapshot {
            time: self.time,
            value: f(self.value),
        }
    }
}
