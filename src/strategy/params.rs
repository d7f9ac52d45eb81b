use crate::engine::error::ConfigError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

//optional text parameter naming a parameter set in reports
pub const LABEL_KEY: &str = "name";

//a single strategy parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
}

//declared shape of a parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParamKind {
    Number { min: f64, max: f64, step: f64 },
    Text,
}

//schema entry describing one parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub key: String,
    pub label: String,
    pub help: String,
    pub kind: ParamKind,
    pub required: bool,
}

impl ParamSpec {
    pub fn number(key: &str, label: &str, help: &str, min: f64, max: f64, step: f64) -> Self {
        ParamSpec {
            key: key.to_string(),
            label: label.to_string(),
            help: help.to_string(),
            kind: ParamKind::Number { min, max, step },
            required: true,
        }
    }

    pub fn text(key: &str, label: &str, help: &str) -> Self {
        ParamSpec {
            key: key.to_string(),
            label: label.to_string(),
            help: help.to_string(),
            kind: ParamKind::Text,
            required: false,
        }
    }
}

//named parameter set for one strategy invocation, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyParameters(IndexMap<String, ParamValue>);

impl StrategyParameters {
    pub fn new() -> Self {
        StrategyParameters(IndexMap::new())
    }

    //builder-style insert of a numeric value
    pub fn with_number(mut self, key: &str, value: f64) -> Self {
        self.0.insert(key.to_string(), ParamValue::Number(value));
        self
    }

    //builder-style insert of a text value
    pub fn with_text(mut self, key: &str, value: &str) -> Self {
        self.0.insert(key.to_string(), ParamValue::Text(value.to_string()));
        self
    }

    pub fn insert(&mut self, key: &str, value: ParamValue) {
        self.0.insert(key.to_string(), value);
    }

    //copies every value of other over this set
    pub fn merge(&mut self, other: &StrategyParameters) {
        for (key, value) in other.iter() {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    //returns a numeric parameter or a config error if absent or not a number
    pub fn number(&self, key: &str) -> Result<f64, ConfigError> {
        match self.0.get(key) {
            Some(ParamValue::Number(v)) => Ok(*v),
            Some(ParamValue::Text(_)) => Err(ConfigError::WrongType {
                key: key.to_string(),
                expected: "number",
            }),
            None => Err(ConfigError::MissingParameter(key.to_string())),
        }
    }

    //returns a text parameter if present
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(ParamValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.text(LABEL_KEY)
    }

    //checks required keys, types and numeric bounds against a schema
    //keys not in the schema are ignored
    pub fn validate(&self, schema: &[ParamSpec]) -> Result<(), ConfigError> {
        for spec in schema {
            let value = match self.0.get(&spec.key) {
                Some(value) => value,
                None if spec.required => {
                    return Err(ConfigError::MissingParameter(spec.key.clone()))
                }
                None => continue,
            };

            match (&spec.kind, value) {
                (ParamKind::Number { min, max, .. }, ParamValue::Number(v)) => {
                    if !v.is_finite() || *v < *min || *v > *max {
                        return Err(ConfigError::OutOfRange {
                            key: spec.key.clone(),
                            value: *v,
                            min: *min,
                            max: *max,
                        });
                    }
                }
                (ParamKind::Number { .. }, ParamValue::Text(_)) => {
                    return Err(ConfigError::WrongType {
                        key: spec.key.clone(),
                        expected: "number",
                    });
                }
                (ParamKind::Text, ParamValue::Text(s)) => {
                    //a present label must say something, even when optional
                    if s.trim().is_empty() {
                        return Err(ConfigError::BlankParameter(spec.key.clone()));
                    }
                }
                (ParamKind::Text, ParamValue::Number(_)) => {
                    return Err(ConfigError::WrongType {
                        key: spec.key.clone(),
                        expected: "text",
                    });
                }
            }
        }

        Ok(())
    }

    //canonical json form, stable across runs (insertion order preserved)
    pub fn canonical_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Vec<ParamSpec> {
        vec![
            ParamSpec::number("level", "Level", "", 0.0, 1.0, 0.05),
            ParamSpec::text("name", "Name", ""),
        ]
    }

    #[test]
    fn valid_parameters_pass() {
        let params = StrategyParameters::new()
            .with_number("level", 0.5)
            .with_text("name", "x");
        assert!(params.validate(&schema()).is_ok());
    }

    #[test]
    fn optional_text_may_be_absent() {
        let params = StrategyParameters::new().with_number("level", 0.0);
        assert!(params.validate(&schema()).is_ok());
    }

    #[test]
    fn missing_required_key_fails() {
        let params = StrategyParameters::new().with_text("name", "x");
        assert_eq!(
            params.validate(&schema()),
            Err(ConfigError::MissingParameter("level".to_string()))
        );
    }

    #[test]
    fn out_of_range_fails() {
        let params = StrategyParameters::new().with_number("level", 1.5);
        assert!(matches!(
            params.validate(&schema()),
            Err(ConfigError::OutOfRange { .. })
        ));
    }

    #[test]
    fn nan_is_out_of_range() {
        let params = StrategyParameters::new().with_number("level", f64::NAN);
        assert!(matches!(
            params.validate(&schema()),
            Err(ConfigError::OutOfRange { .. })
        ));
    }

    #[test]
    fn blank_optional_text_fails() {
        let params = StrategyParameters::new()
            .with_number("level", 0.5)
            .with_text("name", "   ");
        assert_eq!(
            params.validate(&schema()),
            Err(ConfigError::BlankParameter("name".to_string()))
        );
    }

    #[test]
    fn text_where_number_expected_fails() {
        let params = StrategyParameters::new().with_text("level", "high");
        assert_eq!(
            params.validate(&schema()),
            Err(ConfigError::WrongType {
                key: "level".to_string(),
                expected: "number"
            })
        );
    }

    #[test]
    fn deserializes_mixed_json_map() {
        let params: StrategyParameters =
            serde_json::from_str(r#"{"sr_buy": 0.3, "name": "Standard"}"#).unwrap();
        assert_eq!(params.number("sr_buy").unwrap(), 0.3);
        assert_eq!(params.text("name"), Some("Standard"));
    }
}
