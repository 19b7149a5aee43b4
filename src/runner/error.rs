//! The ways a child-process run can fail.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Terminal failure of one run. Exit-code and signal deaths are distinct
/// variants and are never conflated.
#[derive(Debug, Error)]
pub enum RunError {
    /// The process could not be created or awaited at the OS level
    /// (most commonly: the executable does not exist).
    #[error("failed to start `{command}`: {source}")]
    Startup {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The process ran to completion and exited non-zero. Whatever it wrote
    /// to stdout is discarded; stderr is kept for diagnostics.
    #[error("`{command}` exited with code {code}")]
    NonZeroExit {
        command: String,
        code: i32,
        stderr: String,
    },

    /// The process was killed by a signal and produced no exit code.
    #[error("`{command}` was terminated by signal {signal}")]
    SignalTermination { command: String, signal: i32 },

    /// The configured time limit elapsed before the process finished.
    /// The child has been killed.
    #[error("`{command}` timed out after {limit:?}")]
    TimedOut { command: String, limit: Duration },

    /// Cancellation was requested before the process finished.
    /// The child has been killed.
    #[error("`{command}` was cancelled")]
    Cancelled { command: String },
}

impl RunError {
    /// The observed exit code, for the one failure kind that has one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::NonZeroExit { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonzero_exit_message_names_the_code() {
        let error = RunError::NonZeroExit {
            command: "python3".to_string(),
            code: 3,
            stderr: String::new(),
        };
        assert_eq!(error.to_string(), "`python3` exited with code 3");
    }

    #[test]
    fn signal_message_names_the_signal() {
        let error = RunError::SignalTermination {
            command: "python3".to_string(),
            signal: 9,
        };
        assert_eq!(error.to_string(), "`python3` was terminated by signal 9");
    }

    #[test]
    fn exit_code_only_exists_for_nonzero_exit() {
        let startup = RunError::Startup {
            command: "missing".to_string(),
            source: io::Error::other("no such file"),
        };
        let exited = RunError::NonZeroExit {
            command: "sh".to_string(),
            code: 2,
            stderr: String::new(),
        };

        assert_eq!(startup.exit_code(), None);
        assert_eq!(exited.exit_code(), Some(2));
    }
}
