pub mod backtest_config;

pub use backtest_config::{RunConfiguration, StrategyRun, DEFAULT_FEE};
