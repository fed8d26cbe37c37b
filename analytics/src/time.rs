use chrono::TimeDelta;

/// A span of time a metric is expressed "per". `SharpeRatio`, `RateOfReturn`, and friends are
/// generic over this so a raw trading-session duration can be rescaled to an annualised figure
/// without the caller juggling `TimeDelta` arithmetic by hand.
pub trait TimeInterval: Sized {
    fn interval(&self) -> TimeDelta;
}

impl TimeInterval for TimeDelta {
    fn interval(&self) -> TimeDelta {
        *self
    }
}

/// One calendar day.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, serde::Deserialize, serde::Serialize)]
pub struct Daily;

impl TimeInterval for Daily {
    fn interval(&self) -> TimeDelta {
        TimeDelta::days(1)
    }
}

/// 252 trading days, the convention for markets with a Monday-Friday session calendar (B3,
/// NYSE, ...).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, serde::Deserialize, serde::Serialize)]
pub struct Annual252;

impl TimeInterval for Annual252 {
    fn interval(&self) -> TimeDelta {
        TimeDelta::days(252)
    }
}

/// 365 calendar days, for venues that trade every day of the year.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, serde::Deserialize, serde::Serialize)]
pub struct Annual365;

impl TimeInterval for Annual365 {
    fn interval(&self) -> TimeDelta {
        TimeDelta::days(365)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_is_one_day() {
        assert_eq!(Daily.interval(), TimeDelta::days(1));
    }

    #[test]
    fn annual_252_is_252_days() {
        assert_eq!(Annual252.interval(), TimeDelta::days(252));
    }

    #[test]
    fn annual_365_is_365_days() {
        assert_eq!(Annual365.interval(), TimeDelta::days(365));
    }

    #[test]
    fn time_delta_is_its_own_interval() {
        let delta = TimeDelta::hours(6);
        assert_eq!(delta.interval(), delta);
    }
}
