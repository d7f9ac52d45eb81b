use crate::data::PriceSeries;
use crate::engine::accounting::account_returns;
use crate::engine::error::{BacktestOutcome, ComputationError, ConfigError};
use crate::engine::position::{resolve_positions, PositionState};
use crate::engine::trades::{extract_trades, Trade};
use crate::metrics::{calculate_equity_curve, EquityPoint, SummaryMetrics};
use crate::strategy::{Strategy, StrategyParameters};
use serde::{Deserialize, Serialize};

//result of a backtest, owned entirely by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub strategy_id: String,
    //display label of the parameter set, if it has one
    pub label: Option<String>,
    pub metrics: SummaryMetrics,
    //one point per input bar, equity base 1.0
    pub equity_curve: Vec<EquityPoint>,
    pub positions: Vec<PositionState>,
    //closed round trips only
    pub trades: Vec<Trade>,
    pub trade_pnls: Vec<f64>,
}

impl BacktestResult {
    pub fn final_equity(&self) -> f64 {
        self.equity_curve.last().map(|p| p.equity).unwrap_or(1.0)
    }

    //"<strategy name> - <label>", as shown in reports
    pub fn display_name(&self, strategy_name: &str) -> String {
        format!(
            "{} - {}",
            strategy_name,
            self.label.as_deref().unwrap_or("Unnamed")
        )
    }
}

//fee is a fraction per transition, eg 0.0005 for 0.05%
pub fn validate_fee(fee: f64) -> Result<f64, ConfigError> {
    if fee.is_finite() && (0.0..1.0).contains(&fee) {
        Ok(fee)
    } else {
        Err(ConfigError::InvalidFee(fee))
    }
}

//runs signal generation, position resolution, accounting, trade extraction
//and metrics for one strategy and parameter set
//pure: same inputs always give an identical result, inputs are not mutated
pub fn run_strategy<S: Strategy + ?Sized>(
    strategy: &S,
    series: &PriceSeries,
    params: &StrategyParameters,
    fee: f64,
) -> BacktestOutcome<BacktestResult> {
    let fee = validate_fee(fee)?;
    params.validate(&strategy.param_schema())?;

    let signals = strategy.generate_signals(series, params)?;
    if signals.len() != series.len() {
        return Err(ComputationError::LengthMismatch {
            stage: "signals",
            expected: series.len(),
            actual: signals.len(),
        }
        .into());
    }

    let positions = resolve_positions(&signals);
    let closes = series.closes();
    let accounted = account_returns(&closes, &positions, fee)?;
    let trades = extract_trades(&signals, series.bars(), fee);

    let metrics = SummaryMetrics::from_returns(&accounted.strategy_returns, &trades);
    let equity_curve = calculate_equity_curve(
        &series.timestamps(),
        &accounted.equity,
        &accounted.strategy_returns,
    );
    let trade_pnls = trades.iter().map(|t| t.pnl_pct).collect();

    Ok(BacktestResult {
        strategy_id: strategy.id().to_string(),
        label: params.label().map(str::to_string),
        metrics,
        equity_curve,
        positions,
        trades,
        trade_pnls,
    })
}
