use crate::engine::trades::Trade;
use crate::metrics::timeseries::{clean_returns, cumulative_equity, max_drawdown_pct};
use indexmap::IndexMap;
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

//trading periods per year used for annualisation
pub const PERIODS_PER_YEAR: f64 = 252.0;

//summary metrics for a backtest
//every field is finite; degenerate inputs map to 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub total_return_pct: f64,
    pub annual_return_pct: f64,
    pub annual_volatility_pct: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown_pct: f64,
    pub total_trades: usize,
    pub win_rate_pct: f64,
}

impl SummaryMetrics {
    //calculate summary metrics from per-bar net returns and closed trades
    //missing (non-finite) returns count as 0
    pub fn from_returns(returns: &[f64], trades: &[Trade]) -> Self {
        let returns = clean_returns(returns);
        let equity = cumulative_equity(&returns);
        let final_equity = equity.last().copied().unwrap_or(1.0);

        let total_return_pct = (final_equity - 1.0) * 100.0;

        let years = returns.len() as f64 / PERIODS_PER_YEAR;
        let annual_return_pct = if years > 0.0 {
            (final_equity.powf(1.0 / years) - 1.0) * 100.0
        } else {
            0.0
        };

        let annual_volatility_pct = finite_or_zero(annual_volatility(&returns) * 100.0);
        let annual_return_pct = finite_or_zero(annual_return_pct);

        //zero risk-free rate
        let sharpe_ratio = if annual_volatility_pct > 0.0 {
            annual_return_pct / annual_volatility_pct
        } else {
            0.0
        };

        let max_drawdown_pct = finite_or_zero(max_drawdown_pct(&equity)).clamp(-100.0, 0.0);

        let total_trades = trades.len();
        let winners = trades.iter().filter(|t| t.pnl_pct > 0.0).count();
        let win_rate_pct = if total_trades > 0 {
            winners as f64 / total_trades as f64 * 100.0
        } else {
            0.0
        };

        SummaryMetrics {
            total_return_pct: finite_or_zero(total_return_pct),
            annual_return_pct,
            annual_volatility_pct,
            sharpe_ratio: finite_or_zero(sharpe_ratio),
            max_drawdown_pct,
            total_trades,
            win_rate_pct,
        }
    }

    //metrics as a name -> value mapping, in display order
    pub fn to_map(&self) -> IndexMap<&'static str, f64> {
        let mut map = IndexMap::new();
        map.insert("total_return", self.total_return_pct);
        map.insert("annual_return", self.annual_return_pct);
        map.insert("annual_volatility", self.annual_volatility_pct);
        map.insert("sharpe_ratio", self.sharpe_ratio);
        map.insert("max_drawdown", self.max_drawdown_pct);
        map.insert("total_trades", self.total_trades as f64);
        map.insert("win_rate", self.win_rate_pct);
        map
    }

    //rows of (label, formatted value) for reports
    pub fn display_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Total Return", format!("{:.2}%", self.total_return_pct)),
            ("Annual Return", format!("{:.2}%", self.annual_return_pct)),
            (
                "Annual Volatility",
                format!("{:.2}%", self.annual_volatility_pct),
            ),
            ("Sharpe Ratio", format!("{:.3}", self.sharpe_ratio)),
            ("Max Drawdown", format!("{:.2}%", self.max_drawdown_pct)),
            ("Total Trades", format!("{}", self.total_trades)),
            ("Win Rate", format!("{:.2}%", self.win_rate_pct)),
        ]
    }

    //prints metrics in a formatted table
    pub fn pretty_print_table(&self) {
        let mut table = Table::new();

        table.add_row(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));

        for (label, value) in self.display_rows() {
            table.add_row(Row::new(vec![Cell::new(label), Cell::new(&value)]));
        }

        table.printstd();
    }
}

//sample standard deviation scaled to a year; 0 with fewer than two returns
fn annual_volatility(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }

    let std_dev = returns.std_dev();
    std_dev * PERIODS_PER_YEAR.sqrt()
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
