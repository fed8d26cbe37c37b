use crate::ids::{AccountId, StrategyInstanceId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Recognized states for a Session (§3): created at day start, closed at end-of-day cleanup or
/// on a fatal error. At most one `Open` Session exists per process at a time.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum SessionState {
    Pending,
    Open,
    Closed,
    Error,
}

/// A (trading-day, account) tuple owning the set of active Strategy Instances for the day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub day: NaiveDate,
    pub account: AccountId,
    pub state: SessionState,
    pub strategies: Vec<StrategyInstanceId>,
}

impl Session {
    pub fn new_pending(day: NaiveDate, account: AccountId) -> Self {
        Self {
            day,
            account,
            state: SessionState::Pending,
            strategies: Vec::new(),
        }
    }

    pub fn open(&mut self) {
        self.state = SessionState::Open;
    }

    pub fn close(&mut self) {
        self.state = SessionState::Closed;
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, SessionState::Open)
    }
}
