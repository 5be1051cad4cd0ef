//! Guard against stale aggregation results.
//!
//! In-flight requests are never aborted; when the user switches repository
//! or time range mid-fetch, the old aggregation still completes. Callers
//! take a token before starting work and check it on completion; a result
//! whose token is no longer current must be discarded, not applied.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct SelectionGeneration {
    current: AtomicU64,
}

impl SelectionGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a new selection and returns its token.
    pub fn advance(&self) -> u64 {
        self.current.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Token for the current selection without advancing it.
    pub fn token(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }

    /// Whether a result computed under `token` may still be applied.
    pub fn is_current(&self, token: u64) -> bool {
        self.token() == token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_from_previous_selection_is_stale() {
        let generation = SelectionGeneration::new();
        let first = generation.advance();
        assert!(generation.is_current(first));

        let second = generation.advance();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
    }

    #[test]
    fn token_observes_without_advancing() {
        let generation = SelectionGeneration::new();
        let token = generation.advance();
        assert_eq!(generation.token(), token);
        assert!(generation.is_current(token));
    }
}
