use crate::data::PriceSeries;
use crate::engine::backtest::BacktestResult;
use crate::engine::error::BacktestOutcome;
use crate::strategy::{Strategy, StrategyParameters};
use log::{debug, warn};
use rayon::prelude::*;
use std::sync::Arc;

//one invocation: a strategy paired with one parameter set
#[derive(Clone)]
pub struct BacktestJob {
    pub strategy: Arc<dyn Strategy>,
    pub params: StrategyParameters,
}

impl BacktestJob {
    pub fn new(strategy: Arc<dyn Strategy>, params: StrategyParameters) -> Self {
        BacktestJob { strategy, params }
    }

    //"<strategy name> - <label>"
    pub fn display_name(&self) -> String {
        format!(
            "{} - {}",
            self.strategy.name(),
            self.params.label().unwrap_or("Unnamed")
        )
    }
}

//runs every job in parallel against the same series
//results come back in job order; a failing job does not affect the others
pub fn run_batch(
    series: &PriceSeries,
    jobs: &[BacktestJob],
    fee: f64,
) -> Vec<BacktestOutcome<BacktestResult>> {
    jobs.par_iter()
        .map(|job| {
            debug!("Running {}", job.display_name());
            let outcome = job.strategy.run(series, &job.params, fee);
            if let Err(e) = &outcome {
                warn!("{} failed: {}", job.display_name(), e);
            }
            outcome
        })
        .collect()
}
