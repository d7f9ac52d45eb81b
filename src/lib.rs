//a Rust-based backtesting engine for rule-based single-asset strategies

pub mod config;
pub mod data;
pub mod engine;
pub mod metrics;
pub mod strategy;

//prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{RunConfiguration, StrategyRun, DEFAULT_FEE};
    pub use crate::data::{load_csv, validate_date_range, PriceBar, PriceSeries};
    pub use crate::engine::{
        run_batch, run_strategy, BacktestError, BacktestJob, BacktestOutcome, BacktestResult,
        ComputationError, ConfigError, DataError, PositionState, ResultCache, Trade,
    };
    pub use crate::metrics::{
        buy_and_hold_curve, monthly_returns, pivot_by_year, EquityPoint, MonthlyReturn,
        SummaryMetrics, TradeDistribution,
    };
    pub use crate::strategy::{
        support_resistance::SupportResistanceStrategy, ParamKind, ParamSpec, ParamValue, Signal,
        Strategy, StrategyParameters, StrategyRegistry,
    };
}
