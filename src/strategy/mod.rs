pub mod params;
pub mod registry;
pub mod support_resistance;

use crate::data::PriceSeries;
use crate::engine::backtest::{run_strategy, BacktestResult};
use crate::engine::error::BacktestOutcome;
use serde::{Deserialize, Serialize};

pub use params::{ParamKind, ParamSpec, ParamValue, StrategyParameters, LABEL_KEY};
pub use registry::StrategyRegistry;

//per-bar decision emitted by a strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    Enter,
    Exit,
    //no signal on this bar
    Neutral,
}

//strategy interface that all strategies must implement
//a strategy is descriptive data plus a pure signal rule; everything after
//signal generation is shared by the engine
pub trait Strategy: Send + Sync {
    //stable identifier used for lookup and cache keys
    fn id(&self) -> &str;

    //returns the strategy display name
    fn name(&self) -> &str;

    //markdown explanation of the rule
    fn description(&self) -> &str;

    fn default_params(&self) -> StrategyParameters;

    fn param_schema(&self) -> Vec<ParamSpec>;

    //maps each bar to a signal; must not look at bars after the current one
    fn generate_signals(
        &self,
        series: &PriceSeries,
        params: &StrategyParameters,
    ) -> BacktestOutcome<Vec<Signal>>;

    //runs the full backtest pipeline for this strategy
    fn run(
        &self,
        series: &PriceSeries,
        params: &StrategyParameters,
        fee: f64,
    ) -> BacktestOutcome<BacktestResult> {
        run_strategy(self, series, params, fee)
    }
}
