use crate::data::PriceBar;
use crate::strategy::Signal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

//a closed round-trip trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub entry_date: DateTime<Utc>,
    pub exit_date: DateTime<Utc>,
    pub entry_price: f64,
    pub exit_price: f64,
    //net of entry and exit fee, in percent
    pub pnl_pct: f64,
}

impl Trade {
    //holding period in calendar days
    pub fn holding_days(&self) -> i64 {
        (self.exit_date - self.entry_date).num_days()
    }
}

//round-trip return in percent after paying the fee on both legs
pub fn round_trip_pnl_pct(entry_price: f64, exit_price: f64, fee: f64) -> f64 {
    ((exit_price / entry_price - 1.0) - 2.0 * fee) * 100.0
}

//walks the signals and emits one trade per enter/exit pair, filled at the close
//a position still open on the last bar is not reported
pub fn extract_trades(signals: &[Signal], bars: &[PriceBar], fee: f64) -> Vec<Trade> {
    let mut trades = Vec::new();
    let mut open: Option<(DateTime<Utc>, f64)> = None;

    for (signal, bar) in signals.iter().zip(bars) {
        match (open, signal) {
            (None, Signal::Enter) => {
                open = Some((bar.timestamp, bar.close));
            }
            (Some((entry_date, entry_price)), Signal::Exit) => {
                trades.push(Trade {
                    entry_date,
                    exit_date: bar.timestamp,
                    entry_price,
                    exit_price: bar.close,
                    pnl_pct: round_trip_pnl_pct(entry_price, bar.close, fee),
                });
                open = None;
            }
            _ => {}
        }
    }

    trades
}
