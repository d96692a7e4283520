//! Two-variant result type for collaborator boundaries.
//!
//! The puzzle client and the result parser report failures as values with
//! one or more human-readable reasons instead of `Err(anyhow::Error)`, so
//! callers can print every reason without unwinding.

use std::fmt;

/// Success with a value, or failure with human-readable reasons.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Ok { value: T },
    Err { reasons: Vec<String> },
}

impl<T> Outcome<T> {
    pub const fn ok(value: T) -> Self {
        Self::Ok { value }
    }

    /// Failure with a single reason.
    pub fn error(reason: impl Into<String>) -> Self {
        Self::Err {
            reasons: vec![reason.into()],
        }
    }

    /// Failure with several reasons. An empty list still counts as failure.
    pub fn errors<I, S>(reasons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Err {
            reasons: reasons.into_iter().map(Into::into).collect(),
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Ok { value } => Some(value),
            Self::Err { .. } => None,
        }
    }

    pub fn reasons(&self) -> &[String] {
        match self {
            Self::Ok { .. } => &[],
            Self::Err { reasons } => reasons,
        }
    }

    /// Convert into `anyhow::Result`, joining reasons into one message.
    pub fn into_result(self) -> anyhow::Result<T> {
        match self {
            Self::Ok { value } => Ok(value),
            Self::Err { reasons } => Err(anyhow::anyhow!(Reasons(&reasons).to_string())),
        }
    }
}

/// Display helper: `reason one; reason two`.
pub struct Reasons<'a>(pub &'a [String]);

impl fmt::Display for Reasons<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("unknown error");
        }
        f.write_str(&self.0.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_accessors() {
        let outcome = Outcome::ok(42);
        assert_eq!(outcome.value(), Some(&42));
        assert!(outcome.reasons().is_empty());
    }

    #[test]
    fn test_error_keeps_every_reason() {
        let outcome: Outcome<()> = Outcome::errors(["Could not submit answer", "429"]);
        assert_eq!(outcome.value(), None);
        assert_eq!(outcome.reasons().len(), 2);

        let err = outcome.into_result().unwrap_err();
        assert_eq!(err.to_string(), "Could not submit answer; 429");
    }
}
