use crate::engine::error::DataError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

//represents a single ohlcv bar (candlestick) of market data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        PriceBar {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    //convenience for series built from closes only (open = high = low = close)
    pub fn from_close(timestamp: DateTime<Utc>, close: f64) -> Self {
        PriceBar::new(timestamp, close, close, close, close, 0.0)
    }

    //checks every field is finite and the close can be magnitude-scaled
    pub fn validate(&self, index: usize) -> Result<(), DataError> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ];

        for (field, value) in fields {
            if !value.is_finite() {
                return Err(DataError::NonFinitePrice { index, field });
            }
        }

        if self.close <= 0.0 {
            return Err(DataError::NonPositivePrice {
                index,
                price: self.close,
            });
        }

        Ok(())
    }
}
