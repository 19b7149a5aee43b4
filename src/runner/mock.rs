use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Invocation, RunError, Runner};

/// A scripted runner for tests. Returns pre-defined outcomes in order and
/// records every invocation it is given.
pub struct MockRunner {
    outcomes: Mutex<VecDeque<Result<String, RunError>>>,
    seen: Mutex<Vec<Invocation>>,
}

impl MockRunner {
    pub fn new(outcomes: Vec<Result<String, RunError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Every invocation this runner has been asked to run, in order.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Runner for MockRunner {
    async fn run(&self, invocation: &Invocation) -> Result<String, RunError> {
        self.seen.lock().unwrap().push(invocation.clone());
        self.outcomes.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(RunError::Startup {
                command: invocation.command().to_string(),
                source: io::Error::other("MockRunner: no more scripted outcomes"),
            })
        })
    }
}
