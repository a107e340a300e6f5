//! Tag search expressions
//!
//! Two dialects share one evaluation model:
//! 1. The full dialect ([`parser::parse`]): `AND`/`OR`/`NOT` with groups and
//!    quoted literals
//! 2. The simple dialect ([`simple::parse_simple`]): `+required`, `included`,
//!    `-excluded`
//!
//! Both evaluate against a [`Candidate`] holding a file's or folder's tag
//! names. [`filter`] runs them over the store.

pub mod error;
pub mod expr;
pub mod filter;
pub mod parser;
pub mod simple;

pub use error::SearchError;
pub use expr::{Candidate, Expr};
pub use filter::{QueryFilterExt, search_files, search_folders};
pub use parser::{find_groups, parse};
pub use simple::{SimpleQuery, parse_simple};

/// A parsed query in either dialect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Expression(Expr),
    Simple(SimpleQuery),
}

impl Query {
    /// Parse the full dialect
    ///
    /// # Errors
    ///
    /// Returns `SearchError::MalformedQuery` if the text does not parse.
    pub fn parse(input: &str) -> Result<Self, SearchError> {
        parser::parse(input).map(Self::Expression)
    }

    /// Parse the simple dialect
    #[must_use]
    pub fn parse_simple(input: &str) -> Self {
        Self::Simple(simple::parse_simple(input))
    }

    #[must_use]
    pub fn matches(&self, candidate: &Candidate) -> bool {
        match self {
            Self::Expression(expr) => expr.evaluate(candidate),
            Self::Simple(query) => query.matches(candidate),
        }
    }

    /// True for queries that accept every candidate without looking at it
    #[must_use]
    pub fn matches_everything(&self) -> bool {
        match self {
            Self::Expression(expr) => *expr == Expr::Everything,
            Self::Simple(query) => query.is_empty(),
        }
    }
}

/// Knobs applied when filtering candidates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Let literals match the candidate's name as well as its tags
    pub match_names: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialects_agree_on_simple_cases() {
        let full = Query::parse("a AND NOT b").unwrap();
        let simple = Query::parse_simple("+a -b");

        for tags in [vec!["a"], vec!["a", "b"], vec!["b"], vec![]] {
            let candidate = Candidate::new(tags.clone());
            assert_eq!(
                full.matches(&candidate),
                simple.matches(&candidate),
                "dialects disagree on {tags:?}"
            );
        }
    }

    #[test]
    fn test_matches_everything() {
        assert!(Query::parse("").unwrap().matches_everything());
        assert!(Query::parse("()").unwrap().matches_everything());
        assert!(Query::parse_simple("  ").matches_everything());
        assert!(!Query::parse("a").unwrap().matches_everything());
        assert!(!Query::parse_simple("-a").matches_everything());
    }

    #[test]
    fn test_malformed_full_query() {
        assert!(matches!(
            Query::parse("(a"),
            Err(SearchError::MalformedQuery { .. })
        ));
    }
}
