pub mod accounting;
pub mod backtest;
pub mod batch;
pub mod cache;
pub mod error;
pub mod position;
pub mod trades;

pub use accounting::{account_returns, ReturnSeries};
pub use backtest::{run_strategy, validate_fee, BacktestResult};
pub use batch::{run_batch, BacktestJob};
pub use cache::{CacheKey, ResultCache};
pub use error::{BacktestError, BacktestOutcome, ComputationError, ConfigError, DataError};
pub use position::{resolve_positions, PositionState};
pub use trades::{extract_trades, Trade};
