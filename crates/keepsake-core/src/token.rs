//! Wishlist tokens and their generation.
//!
//! A token is the opaque handle an anonymous shopper uses to reach their
//! wishlist. Generation goes through `TokenGenerator` so tests and replays
//! can inject a predictable sequence.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum accepted token length.
pub const MAX_TOKEN_LEN: usize = 64;

/// Length of tokens produced by `RandomTokenGenerator`.
pub const GENERATED_TOKEN_LEN: usize = 32;

/// Reasons a string is rejected as a wishlist token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The token is empty.
    #[error("wishlist token must not be empty")]
    Empty,

    /// The token exceeds `MAX_TOKEN_LEN`.
    #[error("wishlist token exceeds {MAX_TOKEN_LEN} characters")]
    TooLong,

    /// The token contains a character outside `[A-Za-z0-9_-]`.
    #[error("wishlist token contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// Opaque, immutable wishlist token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WishlistToken(String);

impl WishlistToken {
    /// Validates and wraps a token string.
    ///
    /// # Errors
    ///
    /// Returns `TokenError` if the value is empty, too long, or contains a
    /// character other than ASCII alphanumerics, `-` and `_`.
    pub fn parse(value: impl Into<String>) -> Result<Self, TokenError> {
        let value = value.into();
        if value.is_empty() {
            return Err(TokenError::Empty);
        }
        if value.len() > MAX_TOKEN_LEN {
            return Err(TokenError::TooLong);
        }
        if let Some(bad) = value
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(TokenError::InvalidCharacter(bad));
        }
        Ok(Self(value))
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WishlistToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for WishlistToken {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for WishlistToken {
    type Error = TokenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<WishlistToken> for String {
    fn from(token: WishlistToken) -> Self {
        token.0
    }
}

/// Source of fresh wishlist tokens.
pub trait TokenGenerator: Send + Sync {
    /// Produces a new token. Uniqueness is enforced by the repository.
    fn generate(&self) -> WishlistToken;
}

/// Production generator drawing alphanumeric characters from the thread RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTokenGenerator;

impl TokenGenerator for RandomTokenGenerator {
    fn generate(&self) -> WishlistToken {
        let value: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(GENERATED_TOKEN_LEN)
            .map(char::from)
            .collect();
        WishlistToken(value)
    }
}
