// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Non-empty string validation
//!
//! [`NonEmptyString`] guarantees at construction that a value holds at least
//! one non-whitespace character. The node registry uses it to reject empty
//! node names and urls before touching its state.
//!
//! ```rust
//! use node_client::NonEmptyString;
//!
//! let name = NonEmptyString::new("Local Node 1").expect("valid name");
//! assert_eq!(name.as_str(), "Local Node 1");
//!
//! assert!(NonEmptyString::new("").is_err());
//! assert!(NonEmptyString::new("  \t").is_err());
//! ```

use core::fmt;
use std::str::FromStr;

/// A non-empty string wrapper that ensures validity at construction
///
/// The contained string is never empty, contains at least one
/// non-whitespace character and is immutable after construction. Leading
/// and trailing whitespace is kept as given.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyString(Box<str>);

impl NonEmptyString {
    /// Create a new `NonEmptyString` from any string-like input
    ///
    /// # Errors
    ///
    /// Returns a descriptive message if the string is empty or whitespace-only
    ///
    /// ```rust
    /// use node_client::NonEmptyString;
    ///
    /// assert!(NonEmptyString::new("http://localhost:8080/api").is_ok());
    /// assert!(NonEmptyString::new(" padded ").is_ok());
    /// assert!(NonEmptyString::new("\n").is_err());
    /// ```
    pub fn new(s: impl Into<String>) -> Result<Self, String> {
        let s = s.into();
        if s.trim().is_empty() {
            Err("String cannot be empty or whitespace-only".to_string())
        } else {
            Ok(NonEmptyString(s.into_boxed_str()))
        }
    }

    /// Get a string slice of the contained value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap into an owned `String`
    pub fn into_string(self) -> String {
        self.0.into_string()
    }
}

impl fmt::Display for NonEmptyString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NonEmptyString {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for NonEmptyString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_input() {
        assert!(NonEmptyString::new("").is_err());
        assert!(NonEmptyString::new("   ").is_err());
        assert_eq!(
            NonEmptyString::new("\t").unwrap_err(),
            "String cannot be empty or whitespace-only"
        );
    }

    #[test]
    fn keeps_surrounding_whitespace() {
        let value = NonEmptyString::new(" node ").unwrap();
        assert_eq!(value.as_str(), " node ");
        assert_eq!(value.to_string(), " node ");
        assert_eq!(value.into_string(), " node ");
    }

    #[test]
    fn parses_from_str() {
        let parsed: NonEmptyString = "Local Wallet".parse().unwrap();
        assert_eq!(parsed.as_ref(), "Local Wallet");

        let invalid: Result<NonEmptyString, _> = "".parse();
        assert!(invalid.is_err());
    }
}
