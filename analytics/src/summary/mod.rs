use crate::{
    metric::{profit_factor::ProfitFactor, sharpe::SharpeRatio, win_rate::WinRate},
    time::TimeInterval,
};
use algotrade_instrument::Instrument;
use algotrade_integration::collection::FnvIndexMap;
use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};

/// One realised round-trip, the unit the summary generator is fed. The Trade Manager emits one
/// of these whenever a position in an [`Instrument`] returns to flat.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClosedTrade {
    pub instrument: Instrument,
    pub pnl: Decimal,
    pub exit_time: DateTime<Utc>,
}

/// Online mean/variance accumulator (Welford's algorithm), avoiding a full return series in
/// memory for the lifetime of a session.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
struct ReturnsAccumulator {
    count: Decimal,
    mean: Decimal,
    m2: Decimal,
}

impl ReturnsAccumulator {
    fn update(&mut self, x: Decimal) {
        self.count += Decimal::ONE;
        let delta = x - self.mean;
        self.mean += delta.checked_div(self.count).unwrap_or(Decimal::ZERO);
        let delta2 = x - self.mean;
        self.m2 += delta * delta2;
    }

    fn std_dev(&self) -> Decimal {
        if self.count <= Decimal::ONE {
            Decimal::ZERO
        } else {
            self.m2
                .checked_div(self.count)
                .unwrap_or(Decimal::ZERO)
                .sqrt()
                .unwrap_or(Decimal::ZERO)
        }
    }
}

/// Performance summary for a single [`Instrument`] over `[time_engine_start, time_engine_end]`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TearSheet<Interval> {
    pub pnl: Decimal,
    pub sharpe_ratio: SharpeRatio<Interval>,
    pub win_rate: Option<WinRate>,
    pub profit_factor: Option<ProfitFactor>,
}

/// Accumulates [`ClosedTrade`]s for one [`Instrument`] and produces a [`TearSheet`] on demand.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct InstrumentSummaryGenerator {
    time_engine_start: Option<DateTime<Utc>>,
    time_engine_now: Option<DateTime<Utc>>,
    pnl_raw: Decimal,
    returns: ReturnsAccumulator,
    wins: Decimal,
    losses_count: Decimal,
    gross_profit: Decimal,
    gross_loss: Decimal,
}

impl InstrumentSummaryGenerator {
    fn update_from_trade(&mut self, trade: &ClosedTrade) {
        self.time_engine_start.get_or_insert(trade.exit_time);
        self.time_engine_now = Some(
            self.time_engine_now
                .map_or(trade.exit_time, |now| now.max(trade.exit_time)),
        );

        self.pnl_raw += trade.pnl;
        self.returns.update(trade.pnl);

        if trade.pnl.is_sign_positive() && !trade.pnl.is_zero() {
            self.wins += Decimal::ONE;
            self.gross_profit += trade.pnl;
        } else if trade.pnl.is_sign_negative() {
            self.losses_count += Decimal::ONE;
            self.gross_loss += trade.pnl.abs();
        }
    }

    fn generate<Interval>(&self, risk_free_return: Decimal, interval: Interval) -> TearSheet<Interval>
    where
        Interval: TimeInterval,
    {
        let trading_period = match (self.time_engine_start, self.time_engine_now) {
            (Some(start), Some(now)) => now.signed_duration_since(start).max(TimeDelta::seconds(1)),
            _ => TimeDelta::seconds(1),
        };

        let sharpe_ratio = SharpeRatio::calculate(
            risk_free_return,
            self.returns.mean,
            self.returns.std_dev(),
            trading_period,
        )
        .scale(interval);

        let win_rate = WinRate::calculate(self.wins, self.wins + self.losses_count);
        let profit_factor = ProfitFactor::calculate(self.gross_profit, self.gross_loss);

        TearSheet {
            pnl: self.pnl_raw,
            sharpe_ratio,
            win_rate,
            profit_factor,
        }
    }
}

/// A point-in-time trading report across every [`Instrument`] the account has traded.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TradingSummary<Interval> {
    pub time_engine_start: DateTime<Utc>,
    pub time_engine_end: DateTime<Utc>,
    pub instruments: FnvIndexMap<Instrument, TearSheet<Interval>>,
}

impl<Interval> TradingSummary<Interval> {
    pub fn trading_duration(&self) -> TimeDelta {
        self.time_engine_end.signed_duration_since(self.time_engine_start)
    }
}

/// Generator for a [`TradingSummary`], fed one [`ClosedTrade`] at a time as positions flatten.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TradingSummaryGenerator {
    /// Theoretical rate of return of an investment with zero risk, used as the baseline for
    /// Sharpe. See: <https://www.investopedia.com/terms/r/risk-freerate.asp>
    pub risk_free_return: Decimal,
    pub time_engine_start: DateTime<Utc>,
    pub time_engine_now: DateTime<Utc>,
    instruments: FnvIndexMap<Instrument, InstrumentSummaryGenerator>,
}

impl TradingSummaryGenerator {
    pub fn init(risk_free_return: Decimal, time_engine_start: DateTime<Utc>) -> Self {
        Self {
            risk_free_return,
            time_engine_start,
            time_engine_now: time_engine_start,
            instruments: FnvIndexMap::default(),
        }
    }

    pub fn update_from_trade(&mut self, trade: &ClosedTrade) {
        if self.time_engine_now < trade.exit_time {
            self.time_engine_now = trade.exit_time;
        }

        self.instruments
            .entry(trade.instrument.clone())
            .or_default()
            .update_from_trade(trade);
    }

    /// Generates the latest [`TradingSummary`] at the given [`TimeInterval`]. Pass
    /// [`crate::time::Annual365`] for a 24/7 market or [`crate::time::Annual252`] for one with a
    /// Monday-Friday session calendar.
    pub fn generate<Interval>(&self, interval: Interval) -> TradingSummary<Interval>
    where
        Interval: TimeInterval + Copy,
    {
        let instruments = self
            .instruments
            .iter()
            .map(|(instrument, generator)| {
                (instrument.clone(), generator.generate(self.risk_free_return, interval))
            })
            .collect();

        TradingSummary {
            time_engine_start: self.time_engine_start,
            time_engine_end: self.time_engine_now,
            instruments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Daily;
    use algotrade_instrument::{BrokerId, InstrumentKind};
    use rust_decimal_macros::dec;

    fn instrument() -> Instrument {
        Instrument::new("WINFUT", InstrumentKind::Future, BrokerId::Mock, "WINQ25")
    }

    fn trade(pnl: Decimal, exit_time: DateTime<Utc>) -> ClosedTrade {
        ClosedTrade {
            instrument: instrument(),
            pnl,
            exit_time,
        }
    }

    #[test]
    fn accumulates_pnl_and_win_rate_across_trades() {
        let start = DateTime::<Utc>::MIN_UTC;
        let mut generator = TradingSummaryGenerator::init(Decimal::ZERO, start);

        generator.update_from_trade(&trade(dec!(100), start + TimeDelta::hours(1)));
        generator.update_from_trade(&trade(dec!(-40), start + TimeDelta::hours(2)));
        generator.update_from_trade(&trade(dec!(60), start + TimeDelta::hours(3)));

        let summary = generator.generate(Daily);
        let tear_sheet = summary.instruments.get(&instrument()).unwrap();

        assert_eq!(tear_sheet.pnl, dec!(120));
        assert_eq!(tear_sheet.win_rate.as_ref().unwrap().value, dec!(2) / dec!(3));
        assert_eq!(tear_sheet.profit_factor.as_ref().unwrap().value, dec!(160) / dec!(40));
    }

    #[test]
    fn no_trades_yields_no_win_rate_or_profit_factor() {
        let start = DateTime::<Utc>::MIN_UTC;
        let generator = TradingSummaryGenerator::init(Decimal::ZERO, start);

        let summary = generator.generate(Daily);
        assert!(summary.instruments.is_empty());
    }

    #[test]
    fn separate_instruments_are_tracked_independently() {
        let start = DateTime::<Utc>::MIN_UTC;
        let mut generator = TradingSummaryGenerator::init(Decimal::ZERO, start);

        let other = Instrument::new("PETR4", InstrumentKind::Spot, BrokerId::Mock, "PETR4");

        generator.update_from_trade(&trade(dec!(50), start + TimeDelta::hours(1)));
        generator.update_from_trade(&ClosedTrade {
            instrument: other.clone(),
            pnl: dec!(-10),
            exit_time: start + TimeDelta::hours(1),
        });

        let summary = generator.generate(Daily);
        assert_eq!(summary.instruments.get(&instrument()).unwrap().pnl, dec!(50));
        assert_eq!(summary.instruments.get(&other).unwrap().pnl, dec!(-10));
    }
}
