use crate::engine::error::{ensure_finite, ComputationError};
use crate::engine::position::PositionState;

//per-bar net returns and the equity curve they compound into
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSeries {
    pub strategy_returns: Vec<f64>,
    pub equity: Vec<f64>,
}

//simple close-to-close returns; the first bar has no prior and returns 0
pub fn market_returns(closes: &[f64]) -> Vec<f64> {
    let mut returns = Vec::with_capacity(closes.len());
    for i in 0..closes.len() {
        if i == 0 {
            returns.push(0.0);
        } else {
            returns.push(closes[i] / closes[i - 1] - 1.0);
        }
    }
    returns
}

//1 on bars where the position flips, 0 elsewhere (and on bar 0)
pub fn position_changes(positions: &[PositionState]) -> Vec<f64> {
    let mut changes = Vec::with_capacity(positions.len());
    for i in 0..positions.len() {
        if i == 0 {
            changes.push(0.0);
        } else {
            changes.push((positions[i].exposure() - positions[i - 1].exposure()).abs());
        }
    }
    changes
}

//computes net strategy returns and the compounded equity curve
//bar i earns its market return only if the position was held at bar i-1,
//and pays the fee once on every bar where the position changes
pub fn account_returns(
    closes: &[f64],
    positions: &[PositionState],
    fee: f64,
) -> Result<ReturnSeries, ComputationError> {
    debug_assert_eq!(closes.len(), positions.len());

    let market = market_returns(closes);
    let changes = position_changes(positions);

    let mut strategy_returns = Vec::with_capacity(closes.len());
    let mut equity = Vec::with_capacity(closes.len());
    let mut running = 1.0;

    for i in 0..closes.len() {
        let held = if i == 0 { 0.0 } else { positions[i - 1].exposure() };
        let net = ensure_finite("strategy_return", i, market[i] * held - fee * changes[i])?;

        running = ensure_finite("equity", i, running * (1.0 + net))?;

        strategy_returns.push(net);
        equity.push(running);
    }

    Ok(ReturnSeries {
        strategy_returns,
        equity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use PositionState::{Flat, Long};

    #[test]
    fn market_returns_start_at_zero() {
        let returns = market_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(returns[0], 0.0);
        assert!((returns[1] - 0.1).abs() < 1e-12);
        assert!((returns[2] + 0.1).abs() < 1e-12);
    }

    #[test]
    fn position_changes_flag_transitions_only() {
        let changes = position_changes(&[Long, Long, Flat, Flat, Long]);
        assert_eq!(changes, vec![0.0, 0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn position_opened_on_bar_does_not_earn_that_bar() {
        let result = account_returns(&[100.0, 200.0, 300.0], &[Flat, Long, Long], 0.0).unwrap();
        assert_eq!(result.strategy_returns[1], 0.0);
        assert!((result.strategy_returns[2] - 0.5).abs() < 1e-12);
        assert!((result.equity[2] - 1.5).abs() < 1e-12);
    }

    #[test]
    fn fee_charged_once_per_transition() {
        let fee = 0.001;
        let result = account_returns(
            &[100.0, 100.0, 100.0, 100.0],
            &[Flat, Long, Long, Flat],
            fee,
        )
        .unwrap();
        assert_eq!(result.strategy_returns, vec![0.0, -fee, 0.0, -fee]);
    }

    #[test]
    fn equity_base_is_one_on_first_bar() {
        let result = account_returns(&[50.0], &[Long], 0.01).unwrap();
        assert_eq!(result.equity, vec![1.0]);
    }

    #[test]
    fn equity_is_running_product() {
        let result = account_returns(
            &[100.0, 90.0, 95.0, 100.0, 105.0],
            &[Long, Long, Flat, Long, Flat],
            0.0005,
        )
        .unwrap();
        for i in 1..result.equity.len() {
            assert_eq!(
                result.equity[i],
                result.equity[i - 1] * (1.0 + result.strategy_returns[i])
            );
        }
    }

    #[test]
    fn non_finite_return_is_computation_error() {
        let err = account_returns(&[1.0, f64::INFINITY], &[Long, Long], 0.0).unwrap_err();
        assert!(matches!(
            err,
            ComputationError::NonFinite {
                stage: "strategy_return",
                index: 1,
                ..
            }
        ));
    }
}
