//! Full-text search over posts. [`SearchIndex`] is the seam; [`Catalog`]
//! implements it with a case-insensitive substring match over titles and
//! the plain text of post bodies.

use crate::post::Post;
use crate::repository::{Catalog, PostRepository};
use std::fmt;

/// Finds posts matching a query.
pub trait SearchIndex {
    /// Returns the posts matching `query`, newest first. Fails with
    /// [`Error::EmptyQuery`] if `query` is blank.
    fn search(&self, query: &str) -> Result<Vec<&Post>>;
}

impl SearchIndex for Catalog {
    fn search(&self, query: &str) -> Result<Vec<&Post>> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Err(Error::EmptyQuery);
        }
        Ok(self
            .posts()
            .iter()
            .filter(|p| {
                p.title.to_lowercase().contains(&query) || p.text.to_lowercase().contains(&query)
            })
            .collect())
    }
}

/// The result of a search.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem with a search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Returned when the query has no keywords.
    EmptyQuery,
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::EmptyQuery => write!(f, "please enter a keyword"),
        }
    }
}

impl std::error::Error for Error {}
