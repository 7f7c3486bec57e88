use std::fmt;

use tracing::{debug, error};

/// How a stage stopped.
///
/// Whatever the exit, the stage has closed its downstream stream by the time it is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageExit {
    /// The upstream was closed and every item read was written downstream.
    Exhausted,
    /// The cancellation signal fired while the stage was reading or writing.
    Cancelled,
    /// Every reader of the downstream stream was dropped.
    Abandoned,
    /// The stage function panicked on an item.
    Panicked,
}

impl StageExit {
    /// Returns the value logged in the `exit` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            StageExit::Exhausted => "exhausted",
            StageExit::Cancelled => "cancelled",
            StageExit::Abandoned => "abandoned",
            StageExit::Panicked => "panicked",
        }
    }

    /// Logs the exit of a stage that wrote `forwarded` items.
    pub(crate) fn log(self, stage: &'static str, forwarded: u64) {
        match self {
            StageExit::Panicked => {
                error!(stage, exit = %self, forwarded, "stage function panicked, downstream closed");
            }
            _ => {
                debug!(stage, exit = %self, forwarded, "stage terminated");
            }
        }
    }
}

impl fmt::Display for StageExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
