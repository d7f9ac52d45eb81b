pub mod distribution;
pub mod monthly;
pub mod summary;
pub mod timeseries;

pub use distribution::TradeDistribution;
pub use monthly::{monthly_returns, pivot_by_year, MonthlyReturn};
pub use summary::SummaryMetrics;
pub use timeseries::{buy_and_hold_curve, calculate_equity_curve, EquityPoint};
