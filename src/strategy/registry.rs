use crate::engine::error::ConfigError;
use crate::strategy::support_resistance::SupportResistanceStrategy;
use crate::strategy::Strategy;
use indexmap::IndexMap;
use std::sync::Arc;

//lookup table of available strategies, keyed by id in registration order
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    strategies: IndexMap<String, Arc<dyn Strategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        StrategyRegistry {
            strategies: IndexMap::new(),
        }
    }

    //registry pre-populated with every built-in strategy
    pub fn with_builtin() -> Self {
        let mut registry = StrategyRegistry::new();
        registry.register(Arc::new(SupportResistanceStrategy));
        registry
    }

    //adds a strategy, replacing any previous one with the same id
    pub fn register(&mut self, strategy: Arc<dyn Strategy>) {
        self.strategies.insert(strategy.id().to_string(), strategy);
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Strategy>> {
        self.strategies.get(id).cloned()
    }

    //like get, but unknown ids are a config error
    pub fn require(&self, id: &str) -> Result<Arc<dyn Strategy>, ConfigError> {
        self.get(id)
            .ok_or_else(|| ConfigError::UnknownStrategy(id.to_string()))
    }

    pub fn ids(&self) -> Vec<&str> {
        self.strategies.keys().map(|k| k.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Strategy>> {
        self.strategies.values()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}
