//! Idempotency key validation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Longest key accepted from a caller.
pub const MAX_IDEMPOTENCY_KEY_LEN: usize = 255;

/// Validation errors for [`IdempotencyKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdempotencyKeyValidationError {
    /// The key string was empty or only whitespace.
    EmptyKey,
    /// The key carried surrounding whitespace or control characters.
    InvalidKey,
    /// The key exceeded [`MAX_IDEMPOTENCY_KEY_LEN`] characters.
    TooLong,
}

impl fmt::Display for IdempotencyKeyValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyKey => write!(f, "idempotency key must not be empty"),
            Self::InvalidKey => write!(
                f,
                "idempotency key must not contain surrounding whitespace or control characters"
            ),
            Self::TooLong => write!(
                f,
                "idempotency key must be at most {MAX_IDEMPOTENCY_KEY_LEN} characters"
            ),
        }
    }
}

impl std::error::Error for IdempotencyKeyValidationError {}

/// Caller-supplied opaque token that makes a creation retryable.
///
/// Clients send this via the `Idempotency-Key` HTTP header. Any printable
/// token is accepted; UUIDs are conventional but not required.
///
/// # Example
///
/// ```
/// # use staffing::domain::idempotency::IdempotencyKey;
/// let key = IdempotencyKey::new("create-emp-2024-06-01-0001").expect("valid key");
/// assert_eq!(key.as_ref(), "create-emp-2024-06-01-0001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Validate and construct an [`IdempotencyKey`].
    ///
    /// # Errors
    ///
    /// Returns [`IdempotencyKeyValidationError`] when the key is blank, has
    /// surrounding whitespace or control characters, or is too long.
    pub fn new(key: impl AsRef<str>) -> Result<Self, IdempotencyKeyValidationError> {
        Self::from_owned(key.as_ref().to_owned())
    }

    fn from_owned(key: String) -> Result<Self, IdempotencyKeyValidationError> {
        if key.trim().is_empty() {
            return Err(IdempotencyKeyValidationError::EmptyKey);
        }
        if key.trim() != key || key.chars().any(char::is_control) {
            return Err(IdempotencyKeyValidationError::InvalidKey);
        }
        if key.chars().count() > MAX_IDEMPOTENCY_KEY_LEN {
            return Err(IdempotencyKeyValidationError::TooLong);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for IdempotencyKey {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<IdempotencyKey> for String {
    fn from(value: IdempotencyKey) -> Self {
        value.0
    }
}

impl TryFrom<String> for IdempotencyKey {
    type Error = IdempotencyKeyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}
