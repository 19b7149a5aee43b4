//! The question-to-answer front end.
//!
//! A [`Retriever`] turns one query into the invocation
//! `<interpreter> <script> <query>` and hands it to a [`Runner`]. The
//! script is an opaque collaborator: it receives the query text as its
//! single argument, writes its answer to stdout, and exits 0 on success.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::consts::{DEFAULT_INTERPRETER, DEFAULT_SCRIPT};
use crate::runner::{Invocation, RunError, Runner};

/// Asks questions by delegating to an external retrieval script.
pub struct Retriever {
    interpreter: String,
    script: PathBuf,
    runner: Arc<dyn Runner>,
}

impl Retriever {
    /// A retriever with the default interpreter and script.
    pub fn new(runner: Arc<dyn Runner>) -> Self {
        Self::with_script(runner, DEFAULT_INTERPRETER, DEFAULT_SCRIPT)
    }

    /// A retriever running `script` under `interpreter`.
    pub fn with_script(
        runner: Arc<dyn Runner>,
        interpreter: impl Into<String>,
        script: impl Into<PathBuf>,
    ) -> Self {
        Self {
            interpreter: interpreter.into(),
            script: script.into(),
            runner,
        }
    }

    /// The invocation that [`ask`](Self::ask) would run for `query`.
    /// The query text is a single verbatim argument, never shell syntax.
    pub fn invocation(&self, query: &str) -> Invocation {
        Invocation::new(&self.interpreter)
            .arg(self.script.to_string_lossy())
            .arg(query)
    }

    /// Run one query through the script and resolve with its trimmed answer.
    pub async fn ask(&self, query: &str) -> Result<String, RunError> {
        debug!(
            interpreter = %self.interpreter,
            script = %self.script.display(),
            "delegating query to retrieval script"
        );
        self.runner.run(&self.invocation(query)).await
    }
}
