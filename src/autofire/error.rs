use crate::controller::Action;
use thiserror::Error;

/// Caller contract violations of the autofire stage
///
/// None of these are runtime conditions; they indicate a bug in the caller and the
/// binary treats them as fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AutoFireError {
    /// `run` was called while the ticker loop is still alive
    #[error("AutoFirer already running")]
    AlreadyRunning,

    #[error("interval must be >= 0 but was: {0}")]
    NegativeInterval(i64),

    /// Autofire can only be configured for buttons, not axes
    #[error("{0} is not a button")]
    NotAButton(Action),

    /// `run` needs a tokio runtime to spawn the ticker loop on
    #[error("AutoFirer must be started from within a tokio runtime")]
    NoRuntime,
}
