use crate::data::PriceSeries;
use crate::engine::backtest::BacktestResult;
use crate::engine::batch::BacktestJob;
use crate::engine::error::BacktestOutcome;
use crate::strategy::{Strategy, StrategyParameters};
use chrono::NaiveDate;
use dashmap::DashMap;
use log::{debug, warn};
use rayon::prelude::*;
use serde_json::json;
use std::sync::Arc;

//everything that identifies one backtest invocation
#[derive(Debug, Clone)]
pub struct CacheKey<'a> {
    pub ticker: &'a str,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub strategy_id: &'a str,
    pub params: &'a StrategyParameters,
    pub fee: f64,
    //content hash of the price series
    pub dataset: &'a str,
}

impl CacheKey<'_> {
    //deterministic blake3 hash of the canonical json form
    pub fn hash(&self) -> String {
        let canonical = json!({
            "ticker": self.ticker,
            "start": self.start.map(|d| d.to_string()),
            "end": self.end.map(|d| d.to_string()),
            "strategy_id": self.strategy_id,
            "params": self.params.canonical_json(),
            "fee_bits": self.fee.to_bits(),
            "dataset": self.dataset,
        });
        blake3::hash(canonical.to_string().as_bytes())
            .to_hex()
            .to_string()
    }
}

//session-scoped memo of backtest results
//safe because the engine is deterministic; nothing is persisted
#[derive(Clone, Default)]
pub struct ResultCache {
    entries: Arc<DashMap<String, BacktestResult>>,
}

impl ResultCache {
    pub fn new() -> Self {
        ResultCache {
            entries: Arc::new(DashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<BacktestResult> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    pub fn insert(&self, key: String, result: BacktestResult) {
        self.entries.insert(key, result);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    //returns the cached result or runs the backtest and caches it
    //failures are not cached
    #[allow(clippy::too_many_arguments)]
    pub fn get_or_run(
        &self,
        ticker: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        strategy: &dyn Strategy,
        series: &PriceSeries,
        params: &StrategyParameters,
        fee: f64,
    ) -> BacktestOutcome<BacktestResult> {
        let dataset = series.fingerprint();
        let key = CacheKey {
            ticker,
            start,
            end,
            strategy_id: strategy.id(),
            params,
            fee,
            dataset: &dataset,
        }
        .hash();

        if let Some(hit) = self.get(&key) {
            debug!("Cache hit for {} ({})", strategy.id(), &key[..12]);
            return Ok(hit);
        }

        debug!("Cache miss for {} ({})", strategy.id(), &key[..12]);
        let result = strategy.run(series, params, fee)?;
        self.insert(key, result.clone());
        Ok(result)
    }

    //parallel batch like run_batch, but each job goes through the cache
    pub fn run_batch(
        &self,
        ticker: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        series: &PriceSeries,
        jobs: &[BacktestJob],
        fee: f64,
    ) -> Vec<BacktestOutcome<BacktestResult>> {
        jobs.par_iter()
            .map(|job| {
                let outcome = self.get_or_run(
                    ticker,
                    start,
                    end,
                    job.strategy.as_ref(),
                    series,
                    &job.params,
                    fee,
                );
                if let Err(e) = &outcome {
                    warn!("{} failed: {}", job.display_name(), e);
                }
                outcome
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::support_resistance::SupportResistanceStrategy;
    use chrono::{TimeZone, Utc};

    fn series() -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        PriceSeries::from_closes(start, &[100.0, 90.0, 95.0, 100.0, 105.0]).unwrap()
    }

    fn key_for(params: &StrategyParameters, fee: f64) -> String {
        CacheKey {
            ticker: "KO",
            start: None,
            end: None,
            strategy_id: "support_resistance",
            params,
            fee,
            dataset: "abc",
        }
        .hash()
    }

    #[test]
    fn key_is_stable_and_sensitive_to_inputs() {
        let params = SupportResistanceStrategy.default_params();
        assert_eq!(key_for(&params, 0.001), key_for(&params, 0.001));
        assert_ne!(key_for(&params, 0.001), key_for(&params, 0.002));

        let other = params.clone().with_number("sr_buy", 0.1);
        assert_ne!(key_for(&params, 0.001), key_for(&other, 0.001));
    }

    #[test]
    fn second_call_is_served_from_cache() {
        let cache = ResultCache::new();
        let params = SupportResistanceStrategy.default_params();
        let series = series();

        let first = cache
            .get_or_run("KO", None, None, &SupportResistanceStrategy, &series, &params, 0.0005)
            .unwrap();
        assert_eq!(cache.len(), 1);

        let second = cache
            .get_or_run("KO", None, None, &SupportResistanceStrategy, &series, &params, 0.0005)
            .unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(first, second);
    }

    #[test]
    fn failures_are_not_cached() {
        let cache = ResultCache::new();
        let params = SupportResistanceStrategy.default_params();
        let result = cache.get_or_run(
            "KO",
            None,
            None,
            &SupportResistanceStrategy,
            &series(),
            &params,
            2.0,
        );
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn cached_batch_dedups_identical_parameter_sets() {
        let cache = ResultCache::new();
        let strategy: Arc<dyn Strategy> = Arc::new(SupportResistanceStrategy);
        let params = SupportResistanceStrategy.default_params();
        let jobs = vec![
            BacktestJob::new(strategy.clone(), params.clone()),
            BacktestJob::new(strategy.clone(), params.clone()),
            BacktestJob::new(strategy, params.with_number("sr_sell", 1.2)),
        ];

        let results = cache.run_batch("KO", None, None, &series(), &jobs, 0.0005);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0], results[1]);
        assert!(results[2].is_err());
        assert_eq!(cache.len(), 1);
    }
}
