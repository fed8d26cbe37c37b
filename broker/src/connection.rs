use algotrade_instrument::connection::{backoff_delay, ChannelState, DEFAULT_RETRY_CAP};
use algotrade_integration::Terminal;
use chrono::{DateTime, Utc};

/// Drives one channel (API or feed) through the state machine in §4.2. Adapters own one of
/// these per channel and call `tick` every engine iteration.
#[derive(Debug, Clone)]
pub struct ConnectionDriver {
    state: ChannelState,
    next_attempt: Option<DateTime<Utc>>,
    retry_cap: u32,
}

pub enum ConnectionTick {
    Unchanged,
    ShouldConnect,
    Disconnected { code: DisconnectCode },
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DisconnectCode {
    RetryCapExhausted,
    TransientLoss,
}

impl Default for ConnectionDriver {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_CAP)
    }
}

impl ConnectionDriver {
    pub fn new(retry_cap: u32) -> Self {
        Self {
            state: ChannelState::Disconnected,
            next_attempt: None,
            retry_cap,
        }
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn start_connecting(&mut self) {
        self.state = ChannelState::Connecting;
    }

    pub fn on_connected(&mut self) {
        self.state = ChannelState::Connected;
        self.next_attempt = None;
    }

    /// A `CONNECTING` attempt failed, or a previously `CONNECTED` channel dropped.
    pub fn on_failure(&mut self, now: DateTime<Utc>) -> ConnectionTick {
        let was_connected = matches!(self.state, ChannelState::Connected);
        let failures = match self.state {
            ChannelState::Backoff {
                consecutive_failures,
            } => consecutive_failures + 1,
            _ => 1,
        };

        if failures > self.retry_cap {
            self.state = ChannelState::Failed;
            return ConnectionTick::Disconnected {
                code: DisconnectCode::RetryCapExhausted,
            };
        }

        self.state = ChannelState::Backoff {
            consecutive_failures: failures,
        };
        self.next_attempt = Some(now + chrono::Duration::from_std(backoff_delay(failures)).unwrap());

        if was_connected {
            ConnectionTick::Disconnected {
                code: DisconnectCode::TransientLoss,
            }
        } else {
            ConnectionTick::Unchanged
        }
    }

    /// Call every tick: returns `ShouldConnect` once the backoff deadline has elapsed.
    pub fn tick(&mut self, now: DateTime<Utc>) -> ConnectionTick {
        if self.state.is_terminal() {
            return ConnectionTick::Unchanged;
        }
        if let ChannelState::Backoff { .. } = self.state {
            if self.next_attempt.is_some_and(|deadline| now >= deadline) {
                self.next_attempt = None;
                return ConnectionTick::ShouldConnect;
            }
        }
        ConnectionTick::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 27, h, 0, 0).unwrap()
    }

    #[test]
    fn retry_cap_exhaustion_transitions_to_failed() {
        let mut driver = ConnectionDriver::new(2);
        driver.start_connecting();
        driver.on_failure(t(0));
        driver.on_failure(t(0));
        let tick = driver.on_failure(t(0));
        assert!(matches!(
            tick,
            ConnectionTick::Disconnected {
                code: DisconnectCode::RetryCapExhausted
            }
        ));
        assert_eq!(driver.state(), ChannelState::Failed);
    }

    #[test]
    fn transient_loss_from_connected_retries_indefinitely() {
        let mut driver = ConnectionDriver::new(DEFAULT_RETRY_CAP);
        driver.start_connecting();
        driver.on_connected();
        let tick = driver.on_failure(t(0));
        assert!(matches!(
            tick,
            ConnectionTick::Disconnected {
                code: DisconnectCode::TransientLoss
            }
        ));
    }
}
