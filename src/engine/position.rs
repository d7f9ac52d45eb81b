use crate::strategy::Signal;
use serde::{Deserialize, Serialize};

//held state on a bar; long-only, at most one position at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PositionState {
    #[default]
    Flat,
    Long,
}

impl PositionState {
    //numeric exposure: flat 0, long 1
    pub fn exposure(self) -> f64 {
        match self {
            PositionState::Flat => 0.0,
            PositionState::Long => 1.0,
        }
    }

    //applies one signal; repeated enters while long and exits while flat are no-ops
    pub fn next(self, signal: Signal) -> Self {
        match (self, signal) {
            (PositionState::Flat, Signal::Enter) => PositionState::Long,
            (PositionState::Long, Signal::Exit) => PositionState::Flat,
            (state, _) => state,
        }
    }
}

//forward-fills signals into a position per bar
//position[i] depends only on signals[..=i]
pub fn resolve_positions(signals: &[Signal]) -> Vec<PositionState> {
    signals
        .iter()
        .scan(PositionState::Flat, |state, &signal| {
            *state = state.next(signal);
            Some(*state)
        })
        .collect()
}
