//! Identifier newtypes for platform entities.
//!
//! All identifiers are caller-supplied strings validated against one canonical
//! grammar: non-empty, ASCII, at most [`MAX_ID_LEN`] bytes, restricted to
//! alphanumerics plus `_`, `-`, `.`, and `:`. Identifiers are compared and
//! hashed as plain strings; no structure beyond the grammar is assumed.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum identifier length in bytes.
pub const MAX_ID_LEN: usize = 128;

/// Validation failure for an identifier string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IdValidationError {
    #[error("identifier must not be empty")]
    Empty,

    #[error("identifier too long ({len} bytes > {max} bytes)")]
    TooLong { len: usize, max: usize },

    #[error("identifier must be ASCII")]
    NonAscii,

    #[error("identifier has invalid character '{ch}' at byte {index}")]
    InvalidChar { ch: char, index: usize },
}

fn validate_id(value: &str) -> Result<(), IdValidationError> {
    if value.is_empty() {
        return Err(IdValidationError::Empty);
    }
    if value.len() > MAX_ID_LEN {
        return Err(IdValidationError::TooLong {
            len: value.len(),
            max: MAX_ID_LEN,
        });
    }
    if !value.is_ascii() {
        return Err(IdValidationError::NonAscii);
    }
    for (index, ch) in value.char_indices() {
        if !(ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.' | ':')) {
            return Err(IdValidationError::InvalidChar { ch, index });
        }
    }
    Ok(())
}

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from an owned or borrowed string.
            ///
            /// # Errors
            /// Returns an error if the string violates the identifier grammar.
            pub fn new(value: impl Into<String>) -> Result<Self, IdValidationError> {
                Self::try_from(value.into())
            }

            /// Create an identifier from a static string literal.
            ///
            /// # Panics
            /// Panics if the identifier is not canonical. Use only for
            /// compile-time known values.
            #[must_use]
            pub fn from_static(value: &'static str) -> Self {
                value.parse().expect("static identifier must be canonical")
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                validate_id(&value)?;
                Ok(Self(value))
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::try_from(s.to_owned())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }
    };
}

define_id! {
    /// Agent identifier - a registered account on the platform.
    AgentId
}

define_id! {
    /// Post identifier.
    PostId
}

define_id! {
    /// Comment identifier.
    CommentId
}

define_id! {
    /// Submolt (community) identifier.
    SubmoltId
}
