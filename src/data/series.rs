use crate::data::bar::PriceBar;
use crate::engine::error::DataError;
use chrono::{DateTime, NaiveDate, Utc};

//validated, immutable price history for one instrument
//invariants: non-empty, strictly increasing timestamps, finite fields, close > 0
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    //validates bars and wraps them, failing atomically on the first bad bar
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, DataError> {
        if bars.is_empty() {
            return Err(DataError::EmptySeries);
        }

        for (index, bar) in bars.iter().enumerate() {
            bar.validate(index)?;

            if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
                return Err(DataError::NonMonotonicTimestamps { index });
            }
        }

        Ok(PriceSeries { bars })
    }

    //builds a daily series from close prices, starting at the given date
    pub fn from_closes(start: DateTime<Utc>, closes: &[f64]) -> Result<Self, DataError> {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                PriceBar::from_close(start + chrono::Duration::days(i as i64), close)
            })
            .collect();
        PriceSeries::new(bars)
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    //always false for a constructed series, kept for api symmetry with slices
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.bars.iter().map(|b| b.timestamp).collect()
    }

    pub fn first(&self) -> &PriceBar {
        &self.bars[0]
    }

    pub fn last(&self) -> &PriceBar {
        &self.bars[self.bars.len() - 1]
    }

    //restricts to bars whose date falls in [start, end)
    //yfinance treats the end date as exclusive, so this does too
    pub fn between(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Self, DataError> {
        let bars = self
            .bars
            .iter()
            .filter(|bar| {
                let date = bar.timestamp.date_naive();
                start.map_or(true, |s| date >= s) && end.map_or(true, |e| date < e)
            })
            .cloned()
            .collect();
        PriceSeries::new(bars)
    }

    //content hash of the series, used to key cached results
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for bar in &self.bars {
            hasher.update(&bar.timestamp.timestamp().to_le_bytes());
            for value in [bar.open, bar.high, bar.low, bar.close, bar.volume] {
                hasher.update(&value.to_bits().to_le_bytes());
            }
        }
        hasher.finalize().to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn empty_series_is_rejected() {
        assert_eq!(PriceSeries::new(vec![]), Err(DataError::EmptySeries));
    }

    #[test]
    fn duplicate_timestamp_is_rejected() {
        let bars = vec![
            PriceBar::from_close(start(), 10.0),
            PriceBar::from_close(start(), 11.0),
        ];
        assert_eq!(
            PriceSeries::new(bars),
            Err(DataError::NonMonotonicTimestamps { index: 1 })
        );
    }

    #[test]
    fn negative_price_is_rejected_with_index() {
        let err = PriceSeries::from_closes(start(), &[10.0, 11.0, -1.0]).unwrap_err();
        assert_eq!(
            err,
            DataError::NonPositivePrice {
                index: 2,
                price: -1.0
            }
        );
    }

    #[test]
    fn between_filters_by_date_with_exclusive_end() {
        let series = PriceSeries::from_closes(start(), &[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let sliced = series
            .between(
                NaiveDate::from_ymd_opt(2024, 1, 2),
                NaiveDate::from_ymd_opt(2024, 1, 4),
            )
            .unwrap();
        assert_eq!(sliced.closes(), vec![2.0, 3.0]);
    }

    #[test]
    fn between_with_no_overlap_is_empty_error() {
        let series = PriceSeries::from_closes(start(), &[1.0, 2.0]).unwrap();
        let err = series
            .between(NaiveDate::from_ymd_opt(2030, 1, 1), None)
            .unwrap_err();
        assert_eq!(err, DataError::EmptySeries);
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a = PriceSeries::from_closes(start(), &[1.0, 2.0]).unwrap();
        let b = PriceSeries::from_closes(start(), &[1.0, 2.0]).unwrap();
        let c = PriceSeries::from_closes(start(), &[1.0, 2.5]).unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }
}
