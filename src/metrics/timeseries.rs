use crate::engine::accounting::market_returns;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

//a point in the equity curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    //cumulative growth of 1.0
    pub equity: f64,
    //(equity - running peak) / running peak, always <= 0
    pub drawdown: f64,
    //net strategy return of this bar
    pub returns: f64,
}

impl EquityPoint {
    pub fn new(timestamp: DateTime<Utc>, equity: f64, drawdown: f64, returns: f64) -> Self {
        EquityPoint {
            timestamp,
            equity,
            drawdown,
            returns,
        }
    }
}

//replaces missing (nan/inf) returns with 0
pub fn clean_returns(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .map(|&r| if r.is_finite() { r } else { 0.0 })
        .collect()
}

//compounds returns into an equity curve with base 1.0
pub fn cumulative_equity(returns: &[f64]) -> Vec<f64> {
    let mut curve = Vec::with_capacity(returns.len());
    let mut running = 1.0;
    for &r in returns {
        running *= 1.0 + r;
        curve.push(running);
    }
    curve
}

//fractional drawdown from the running peak for each point
//a non-positive peak means everything is lost, reported as -1
pub fn drawdowns(equity: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(equity.len());
    let mut peak = f64::NEG_INFINITY;

    for &value in equity {
        if value > peak {
            peak = value;
        }

        let dd = if peak > 0.0 {
            ((value - peak) / peak).max(-1.0)
        } else {
            -1.0
        };
        out.push(dd);
    }

    out
}

//calculates the equity curve with drawdowns
pub fn calculate_equity_curve(
    timestamps: &[DateTime<Utc>],
    equity_values: &[f64],
    returns: &[f64],
) -> Vec<EquityPoint> {
    let dds = drawdowns(equity_values);

    timestamps
        .iter()
        .zip(equity_values)
        .zip(returns)
        .zip(dds)
        .map(|(((&ts, &equity), &ret), dd)| EquityPoint::new(ts, equity, dd, ret))
        .collect()
}

//deepest drawdown in percent, in [-100, 0]; 0 for an empty curve
pub fn max_drawdown_pct(equity: &[f64]) -> f64 {
    drawdowns(equity).into_iter().fold(0.0, f64::min) * 100.0
}

//buy-and-hold benchmark: compounded close-to-close returns, base 1.0
pub fn buy_and_hold_curve(closes: &[f64]) -> Vec<f64> {
    cumulative_equity(&clean_returns(&market_returns(closes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cumulative_equity_compounds() {
        let curve = cumulative_equity(&[0.0, 0.1, -0.5]);
        assert_eq!(curve[0], 1.0);
        assert!((curve[1] - 1.1).abs() < 1e-12);
        assert!((curve[2] - 0.55).abs() < 1e-12);
    }

    #[test]
    fn clean_returns_zeroes_gaps() {
        assert_eq!(
            clean_returns(&[0.1, f64::NAN, f64::INFINITY, -0.2]),
            vec![0.1, 0.0, 0.0, -0.2]
        );
    }

    #[test]
    fn drawdown_tracks_running_peak() {
        let dd = drawdowns(&[1.0, 1.2, 0.9, 1.3]);
        assert_eq!(dd[0], 0.0);
        assert_eq!(dd[1], 0.0);
        assert!((dd[2] + 0.25).abs() < 1e-12);
        assert_eq!(dd[3], 0.0);
    }

    #[test]
    fn max_drawdown_is_most_negative() {
        let mdd = max_drawdown_pct(&[1.0, 0.8, 1.1, 0.55, 0.6]);
        assert!((mdd + 50.0).abs() < 1e-9);
    }

    #[test]
    fn max_drawdown_of_empty_curve_is_zero() {
        assert_eq!(max_drawdown_pct(&[]), 0.0);
    }

    #[test]
    fn wiped_out_curve_is_bounded_at_minus_hundred() {
        assert_eq!(max_drawdown_pct(&[1.0, -0.2, 0.1]), -100.0);
    }

    #[test]
    fn buy_and_hold_tracks_price_ratio() {
        let curve = buy_and_hold_curve(&[50.0, 55.0, 40.0]);
        assert_eq!(curve[0], 1.0);
        assert!((curve[2] - 0.8).abs() < 1e-12);
    }
}
