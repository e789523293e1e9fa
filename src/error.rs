use thiserror::Error;

use crate::session::Phase;

/// Reasons a container action is refused. A refused action never touches the session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("cannot {action} while the run is {phase}")]
    WrongPhase { action: &'static str, phase: Phase },

    #[error("completion for level {level} arrived but level {current} is active")]
    StaleCompletion { level: usize, current: usize },

    #[error("skip reveal for level {level} fired but level {current} is active")]
    StaleReveal { level: usize, current: usize },

    #[error("outcome for level {level} was already recorded")]
    OutcomeAlreadyRecorded { level: usize },

    #[error("skip is not available yet on level {level}")]
    SkipUnavailable { level: usize },

    #[error("no microgame is active")]
    NoActiveMicrogame,
}
