use crate::engine::trades::Trade;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

//shape of the per-trade pnl distribution, in percent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeDistribution {
    pub count: usize,
    pub winners: usize,
    pub losers: usize,
    pub mean_pct: f64,
    pub median_pct: f64,
    pub best_pct: f64,
    pub worst_pct: f64,
}

impl TradeDistribution {
    //all zero when there are no trades
    pub fn from_trades(trades: &[Trade]) -> Self {
        let pnls: Vec<f64> = trades.iter().map(|t| t.pnl_pct).collect();
        TradeDistribution::from_pnls(&pnls)
    }

    pub fn from_pnls(pnls: &[f64]) -> Self {
        if pnls.is_empty() {
            return TradeDistribution::default();
        }

        let mut sorted = pnls.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mid = sorted.len() / 2;
        let median_pct = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };

        TradeDistribution {
            count: pnls.len(),
            winners: pnls.iter().filter(|&&p| p > 0.0).count(),
            losers: pnls.iter().filter(|&&p| p < 0.0).count(),
            mean_pct: pnls.mean(),
            median_pct,
            best_pct: sorted[sorted.len() - 1],
            worst_pct: sorted[0],
        }
    }
}
