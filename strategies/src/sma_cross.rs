use algotrade_broker::Portfolio;
use algotrade_marketdata::Bar;
use algotrade_strategy::{Strategy, StrategySignal};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const FIXED_ORDER_QUANTITY: u64 = 100;

/// Dual simple-moving-average crossover: golden cross opens a long position, death cross flattens
/// it. Fixed order size, stop-loss set as `close * (1 - stop_percent / 100)` at entry.
#[derive(Debug, Clone, Copy)]
pub struct SmaCrossStrategy {
    fast: usize,
    slow: usize,
    stop_percent: Decimal,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SmaCrossState {
    closes: Vec<Decimal>,
    position_qty: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    Above,
    Below,
    Equal,
}

fn sma(closes: &[Decimal], period: usize) -> Option<Decimal> {
    if closes.len() < period {
        return None;
    }
    let window = &closes[closes.len() - period..];
    let sum: Decimal = window.iter().sum();
    Some(sum / Decimal::from(period))
}

fn relation(closes: &[Decimal], fast: usize, slow: usize) -> Option<Relation> {
    let fast_avg = sma(closes, fast)?;
    let slow_avg = sma(closes, slow)?;
    Some(match fast_avg.cmp(&slow_avg) {
        std::cmp::Ordering::Greater => Relation::Above,
        std::cmp::Ordering::Less => Relation::Below,
        std::cmp::Ordering::Equal => Relation::Equal,
    })
}

impl SmaCrossStrategy {
    pub fn new(fast: usize, slow: usize, stop_percent: Decimal) -> Self {
        Self { fast, slow, stop_percent }
    }

    /// Bars needed before the first crossover is evaluated. Requiring a full `2 * slow` window
    /// (rather than just `slow`) means the windows have fully rolled over once before we start
    /// comparing them, so the first evaluated relation is the one the caller actually cares
    /// about rather than noise from a half-filled slow window.
    fn warmup_len(&self) -> usize {
        self.slow * 2
    }
}

impl Strategy for SmaCrossStrategy {
    type StateSchema = SmaCrossState;

    fn class_name(&self) -> &'static str {
        "SmaCross"
    }

    fn validate(&self, params: &serde_json::Value, _portfolio: &Portfolio) -> bool {
        let fast = params.get("fast").and_then(serde_json::Value::as_u64);
        let slow = params.get("slow").and_then(serde_json::Value::as_u64);
        let stop_percent = params.get("stop_percent").and_then(serde_json::Value::as_f64);
        matches!((fast, slow, stop_percent), (Some(f), Some(s), Some(_)) if f > 0 && s > f)
    }

    fn initialize(
        &mut self,
        _state: &mut Self::StateSchema,
        _portfolio: &Portfolio,
        _is_first_init: bool,
    ) -> bool {
        true
    }

    fn process(&mut self, state: &mut Self::StateSchema, bar: Bar, _portfolio: &Portfolio) -> StrategySignal {
        if !bar.closed {
            return StrategySignal::no_action();
        }

        state.closes.push(bar.close);
        let warmup = self.warmup_len();
        if state.closes.len() < warmup {
            return StrategySignal::no_action();
        }

        let current = relation(&state.closes, self.fast, self.slow);
        let previous = if state.closes.len() == warmup {
            None
        } else {
            relation(&state.closes[..state.closes.len() - 1], self.fast, self.slow)
        };

        match current {
            Some(Relation::Above) if previous != Some(Relation::Above) && state.position_qty.is_zero() => {
                let quantity = Decimal::from(FIXED_ORDER_QUANTITY);
                state.position_qty = quantity;
                let stop_price = bar.close * (Decimal::ONE - self.stop_percent / Decimal::from(100));
                StrategySignal::buy(quantity, Some(stop_price))
            }
            Some(Relation::Below) if previous != Some(Relation::Below) && !state.position_qty.is_zero() => {
                let quantity = state.position_qty;
                state.position_qty = Decimal::ZERO;
                StrategySignal::flat(quantity)
            }
            _ => StrategySignal::no_action(),
        }
    }

    fn resume(
        &mut self,
        _state: &mut Self::StateSchema,
        _bars_today: &[Bar],
        _portfolio: &Portfolio,
        _now: chrono::DateTime<chrono::Utc>,
    ) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn bar(close: Decimal) -> Bar {
        Bar {
            timestamp: Utc::now(),
            open: close,
            high: close,
            low: close,
            close,
            volume: Decimal::ZERO,
            closed: true,
        }
    }

    fn feed(strategy: &mut SmaCrossStrategy, state: &mut SmaCrossState, closes: &[Decimal]) -> Vec<StrategySignal> {
        let portfolio = Portfolio::default();
        closes
            .iter()
            .map(|&close| strategy.process(state, bar(close), &portfolio))
            .collect()
    }

    #[test]
    fn golden_cross_opens_a_long_position() {
        let mut strategy = SmaCrossStrategy::new(3, 5, dec!(2.0));
        let mut state = SmaCrossState::default();
        let closes = [
            dec!(10), dec!(10), dec!(10), dec!(10), dec!(10),
            dec!(10), dec!(11), dec!(12), dec!(13), dec!(14),
        ];

        let signals = feed(&mut strategy, &mut state, &closes);

        for signal in &signals[..9] {
            assert_eq!(signal.action, algotrade_strategy::Action::NoAction);
        }
        let last = signals[9];
        assert_eq!(last.action, algotrade_strategy::Action::Buy);
        assert_eq!(last.quantity, dec!(100));
        assert_eq!(last.stop_price, Some(dec!(13.72)));
    }

    #[test]
    fn flat_sequence_never_signals() {
        let mut strategy = SmaCrossStrategy::new(3, 5, dec!(2.0));
        let mut state = SmaCrossState::default();
        let closes = vec![dec!(20); 20];

        let signals = feed(&mut strategy, &mut state, &closes);

        assert!(signals.iter().all(|s| s.action == algotrade_strategy::Action::NoAction));
    }

    #[test]
    fn death_cross_flattens_an_open_position() {
        let mut strategy = SmaCrossStrategy::new(3, 5, dec!(2.0));
        let mut state = SmaCrossState::default();
        let opening = [
            dec!(10), dec!(10), dec!(10), dec!(10), dec!(10),
            dec!(10), dec!(11), dec!(12), dec!(13), dec!(14),
        ];
        feed(&mut strategy, &mut state, &opening);
        assert_eq!(state.position_qty, dec!(100));

        let closing = [dec!(13), dec!(12), dec!(11), dec!(10), dec!(9)];
        let signals = feed(&mut strategy, &mut state, &closing);

        let flats: Vec<_> = signals
            .iter()
            .filter(|s| s.action == algotrade_strategy::Action::Flat)
            .collect();
        assert_eq!(flats.len(), 1);
        assert_eq!(flats[0].quantity, dec!(100));
        assert_eq!(state.position_qty, dec!(0));
    }
}
