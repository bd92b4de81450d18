//! User Name Value Object
//!
//! The login handle. Equality and lookup are case-sensitive: `Bob` and
//! `bob` are different accounts.
//!
//! ## Invariants
//! - Length: 3 to 50 characters (Unicode scalar values)
//! - No whitespace
//! - No control characters

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::error::AuthError;

pub const USER_NAME_MIN_LENGTH: usize = 3;
pub const USER_NAME_MAX_LENGTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserNameError {
    #[error("username is too short ({length} chars, minimum {min})")]
    TooShort { length: usize, min: usize },

    #[error("username is too long ({length} chars, maximum {max})")]
    TooLong { length: usize, max: usize },

    #[error("username cannot contain whitespace")]
    ContainsWhitespace,

    #[error("username contains an invalid character at position {position}")]
    InvalidCharacter { position: usize },
}

impl From<UserNameError> for AuthError {
    fn from(err: UserNameError) -> Self {
        AuthError::Validation(err.to_string())
    }
}

/// Validated user name
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    pub fn new(input: impl Into<String>) -> Result<Self, UserNameError> {
        let value = input.into();
        Self::validate(&value)?;
        Ok(Self(value))
    }

    /// Rebuild from a stored value (already validated on the way in)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }

    fn validate(value: &str) -> Result<(), UserNameError> {
        let length = value.chars().count();
        if length < USER_NAME_MIN_LENGTH {
            return Err(UserNameError::TooShort {
                length,
                min: USER_NAME_MIN_LENGTH,
            });
        }
        if length > USER_NAME_MAX_LENGTH {
            return Err(UserNameError::TooLong {
                length,
                max: USER_NAME_MAX_LENGTH,
            });
        }

        for (position, ch) in value.chars().enumerate() {
            if ch.is_whitespace() {
                return Err(UserNameError::ContainsWhitespace);
            }
            if ch.is_control() {
                return Err(UserNameError::InvalidCharacter { position });
            }
        }

        Ok(())
    }
}

impl fmt::Debug for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UserName").field(&self.0).finish()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserName {
    type Error = UserNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserName> for String {
    fn from(name: UserName) -> Self {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod length_validation {
        use super::*;

        #[test]
        fn test_empty_fails() {
            assert!(matches!(
                UserName::new(""),
                Err(UserNameError::TooShort { length: 0, min: 3 })
            ));
        }

        #[test]
        fn test_too_short() {
            assert!(matches!(
                UserName::new("ab"),
                Err(UserNameError::TooShort { length: 2, min: 3 })
            ));
        }

        #[test]
        fn test_boundaries() {
            assert!(UserName::new("bob").is_ok());
            assert!(UserName::new("a".repeat(USER_NAME_MAX_LENGTH)).is_ok());
            assert!(matches!(
                UserName::new("a".repeat(USER_NAME_MAX_LENGTH + 1)),
                Err(UserNameError::TooLong { length: 51, max: 50 })
            ));
        }

        #[test]
        fn test_counts_characters_not_bytes() {
            // 3 characters, 9 bytes
            assert!(UserName::new("日本語").is_ok());
        }
    }

    mod character_validation {
        use super::*;

        #[test]
        fn test_whitespace_rejected() {
            assert_eq!(
                UserName::new("bob smith"),
                Err(UserNameError::ContainsWhitespace)
            );
            assert_eq!(UserName::new(" bob"), Err(UserNameError::ContainsWhitespace));
        }

        #[test]
        fn test_control_character_rejected() {
            assert_eq!(
                UserName::new("bob\u{0}x"),
                Err(UserNameError::InvalidCharacter { position: 3 })
            );
        }
    }

    #[test]
    fn test_case_is_preserved_and_significant() {
        let upper = UserName::new("Bob").unwrap();
        let lower = UserName::new("bob").unwrap();
        assert_eq!(upper.as_str(), "Bob");
        assert_ne!(upper, lower);
    }

    #[test]
    fn test_validation_error_kind() {
        let err: AuthError = UserName::new("x").unwrap_err().into();
        assert!(matches!(err, AuthError::Validation(_)));
    }
}
