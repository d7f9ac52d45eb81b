use crate::data::PriceSeries;
use crate::engine::error::{ensure_finite, BacktestOutcome, DataError};
use crate::strategy::{ParamSpec, Signal, Strategy, StrategyParameters, LABEL_KEY};

pub const BUY_LEVEL: &str = "sr_buy";
pub const SELL_LEVEL: &str = "sr_sell";
pub const LABEL: &str = LABEL_KEY;

const DESCRIPTION: &str = "\
### Support & Resistance Strategy

Identifies trading opportunities from scaled price levels:

1. Scale each close by its order of magnitude into [1, 10)
2. Take the fractional part as the indicator
3. Enter long when the indicator is below the buy level (support)
4. Exit when the indicator is above the sell level (resistance)

Lower buy levels and higher sell levels trade less often.
Fees are charged on both entry and exit.";

//support & resistance strategy driven by the fractional part of the
//magnitude-scaled close
#[derive(Debug, Clone, Copy, Default)]
pub struct SupportResistanceStrategy;

//fractional part of the close after scaling by its order of magnitude
//eg 95.0 -> 9.5 -> 0.5, 1234.0 -> 1.234 -> 0.234
pub fn magnitude_indicator(close: f64) -> f64 {
    let scaled = close / 10f64.powf(close.log10().floor());
    scaled % 1.0
}

//signal for one indicator value; exit wins when both thresholds trigger
pub fn classify(indicator: f64, buy_level: f64, sell_level: f64) -> Signal {
    if indicator > sell_level {
        Signal::Exit
    } else if indicator < buy_level {
        Signal::Enter
    } else {
        Signal::Neutral
    }
}

impl Strategy for SupportResistanceStrategy {
    fn id(&self) -> &str {
        "support_resistance"
    }

    fn name(&self) -> &str {
        "Support & Resistance"
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn default_params(&self) -> StrategyParameters {
        StrategyParameters::new()
            .with_number(BUY_LEVEL, 0.3)
            .with_number(SELL_LEVEL, 0.7)
            .with_text(LABEL, "Standard")
    }

    fn param_schema(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::text(LABEL, "Strategy Name", "Descriptive name for this parameter set"),
            ParamSpec::number(
                BUY_LEVEL,
                "SR Buy Level",
                "Buy when indicator < this value",
                0.0,
                1.0,
                0.05,
            ),
            ParamSpec::number(
                SELL_LEVEL,
                "SR Sell Level",
                "Sell when indicator > this value",
                0.0,
                1.0,
                0.05,
            ),
        ]
    }

    fn generate_signals(
        &self,
        series: &PriceSeries,
        params: &StrategyParameters,
    ) -> BacktestOutcome<Vec<Signal>> {
        let buy_level = params.number(BUY_LEVEL)?;
        let sell_level = params.number(SELL_LEVEL)?;

        let mut signals = Vec::with_capacity(series.len());
        for (index, bar) in series.bars().iter().enumerate() {
            //log10 is undefined here, fail instead of producing nan
            if bar.close <= 0.0 {
                return Err(DataError::NonPositivePrice {
                    index,
                    price: bar.close,
                }
                .into());
            }

            let indicator = ensure_finite("indicator", index, magnitude_indicator(bar.close))?;
            signals.push(classify(indicator, buy_level, sell_level));
        }

        Ok(signals)
    }
}
