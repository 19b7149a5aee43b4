//! Project-wide constants.

/// Default interpreter the retrieval script runs under.
pub const DEFAULT_INTERPRETER: &str = "python3";

/// Default retrieval script invoked once per query.
pub const DEFAULT_SCRIPT: &str = "query_data.py";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_non_empty() {
        assert!(!DEFAULT_INTERPRETER.is_empty());
        assert!(!DEFAULT_SCRIPT.is_empty());
    }
}
