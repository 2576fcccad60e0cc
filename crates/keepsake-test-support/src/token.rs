//! Test token generator: predictable `TokenGenerator` for tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use keepsake_core::token::{TokenGenerator, WishlistToken};

/// Hands out `{prefix}-1`, `{prefix}-2`, ... in order.
#[derive(Debug)]
pub struct SequenceTokenGenerator {
    prefix: String,
    next: AtomicUsize,
}

impl SequenceTokenGenerator {
    /// Create a generator whose tokens start with `prefix`.
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_owned(),
            next: AtomicUsize::new(1),
        }
    }
}

impl Default for SequenceTokenGenerator {
    fn default() -> Self {
        Self::new("token")
    }
}

impl TokenGenerator for SequenceTokenGenerator {
    /// # Panics
    ///
    /// Panics if the prefix is not a valid token prefix.
    fn generate(&self) -> WishlistToken {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        WishlistToken::parse(format!("{}-{n}", self.prefix))
            .expect("SequenceTokenGenerator prefix must be token-safe")
    }
}
