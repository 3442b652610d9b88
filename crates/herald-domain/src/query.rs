//! Query module - the caller's question

use std::fmt;

/// Reasons a raw query is refused before any service is called
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// No query was supplied, or it was blank after trimming
    Missing,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::Missing => f.write_str("Missing query in request data"),
        }
    }
}

impl std::error::Error for QueryError {}

/// A trimmed, non-empty question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    /// Validate and trim a raw query
    ///
    /// # Examples
    ///
    /// ```
    /// use herald_domain::{Query, QueryError};
    ///
    /// assert_eq!(Query::parse("  What did he build? ").unwrap().as_str(), "What did he build?");
    /// assert_eq!(Query::parse(" \n\t"), Err(QueryError::Missing));
    /// ```
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(QueryError::Missing);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The sanitized query text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
