use crate::engine::batch::BacktestJob;
use crate::engine::error::ConfigError;
use crate::strategy::support_resistance::SupportResistanceStrategy;
use crate::strategy::{Strategy, StrategyParameters, StrategyRegistry};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

//default fee as a fraction (0.05%)
pub const DEFAULT_FEE: f64 = 0.0005;

fn default_fee() -> f64 {
    DEFAULT_FEE
}

//one strategy with every parameter set to run it with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyRun {
    pub strategy_id: String,
    pub parameter_sets: Vec<StrategyParameters>,
}

//complete backtest configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfiguration {
    //data
    pub data_path: PathBuf,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,

    //fee per position change, as a fraction
    #[serde(default = "default_fee")]
    pub fee: f64,

    //strategies
    pub strategies: Vec<StrategyRun>,

    //optional output paths
    #[serde(default)]
    pub output_equity_csv: Option<PathBuf>,
    #[serde(default)]
    pub output_trades_csv: Option<PathBuf>,
}

impl Default for RunConfiguration {
    fn default() -> Self {
        let strategy = SupportResistanceStrategy;
        RunConfiguration {
            data_path: PathBuf::from("data.csv"),
            symbol: None,
            start: None,
            end: None,
            fee: DEFAULT_FEE,
            strategies: vec![StrategyRun {
                strategy_id: strategy.id().to_string(),
                parameter_sets: vec![strategy.default_params()],
            }],
            output_equity_csv: None,
            output_trades_csv: None,
        }
    }
}

impl RunConfiguration {
    //load configuration from a JSON file
    pub fn from_json_file(path: &PathBuf) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: RunConfiguration = serde_json::from_str(&contents)?;
        Ok(config)
    }

    //save configuration to a JSON file
    pub fn to_json_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    //resolves strategy ids into jobs, one per parameter set
    //a strategy listed without parameter sets runs once with its defaults
    pub fn jobs(&self, registry: &StrategyRegistry) -> Result<Vec<BacktestJob>, ConfigError> {
        let mut jobs = Vec::new();

        for run in &self.strategies {
            let strategy = registry.require(&run.strategy_id)?;

            if run.parameter_sets.is_empty() {
                jobs.push(BacktestJob::new(strategy.clone(), strategy.default_params()));
                continue;
            }

            for params in &run.parameter_sets {
                jobs.push(BacktestJob::new(strategy.clone(), params.clone()));
            }
        }

        Ok(jobs)
    }

    //applies parameter overrides to every parameter set of one strategy
    //a strategy listed without sets gets its defaults first; a strategy not
    //listed at all is appended with its defaults plus the overrides
    pub fn with_overrides(
        mut self,
        registry: &StrategyRegistry,
        strategy_id: &str,
        overrides: &StrategyParameters,
    ) -> Result<Self, ConfigError> {
        let strategy = registry.require(strategy_id)?;
        let mut matched = false;

        for run in self
            .strategies
            .iter_mut()
            .filter(|run| run.strategy_id == strategy_id)
        {
            matched = true;
            if run.parameter_sets.is_empty() {
                run.parameter_sets.push(strategy.default_params());
            }
            for params in &mut run.parameter_sets {
                params.merge(overrides);
            }
        }

        if !matched {
            let mut params = strategy.default_params();
            params.merge(overrides);
            self.strategies.push(StrategyRun {
                strategy_id: strategy.id().to_string(),
                parameter_sets: vec![params],
            });
        }

        Ok(self)
    }
}
