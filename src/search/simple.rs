//! Simple search dialect
//!
//! Space-separated terms with an optional one-character prefix:
//!
//! - `+tag`: required, every one must be present
//! - `-tag`: excluded, none may be present
//! - `~tag` or `tag`: included, at least one must be present (if any are given)
//!
//! A backslash makes the next character literal, so `\-tag` includes a tag
//! literally named `-tag` and `big\ bird` is a single term.

use super::expr::Candidate;
use super::parser::ESCAPE;
use serde::{Deserialize, Serialize};

const REQUIRED: char = '+';
const EXCLUDED: char = '-';
const INCLUDED: char = '~';

/// A parsed simple-dialect query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleQuery {
    pub required: Vec<String>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl SimpleQuery {
    /// True when no term was given; an empty query matches everything
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.include.is_empty() && self.exclude.is_empty()
    }

    #[must_use]
    pub fn matches(&self, candidate: &Candidate) -> bool {
        self.required.iter().all(|tag| candidate.has(tag))
            && (self.include.is_empty() || self.include.iter().any(|tag| candidate.has(tag)))
            && !self.exclude.iter().any(|tag| candidate.has(tag))
    }
}

/// Parse a simple-dialect query; every input is valid
///
/// A prefix with nothing after it is ignored.
///
/// # Examples
/// ```
/// # use filetag::search::simple::parse_simple;
/// let query = parse_simple("+photo cat ~dog -blurry");
/// assert_eq!(query.required, vec!["photo"]);
/// assert_eq!(query.include, vec!["cat", "dog"]);
/// assert_eq!(query.exclude, vec!["blurry"]);
/// ```
#[must_use]
pub fn parse_simple(query: &str) -> SimpleQuery {
    let mut parsed = SimpleQuery::default();

    for term in split_terms(query) {
        let bucket = match term.prefix {
            Some(REQUIRED) => &mut parsed.required,
            Some(EXCLUDED) => &mut parsed.exclude,
            _ => &mut parsed.include,
        };
        if !term.text.is_empty() {
            bucket.push(term.text);
        }
    }
    parsed
}

struct Term {
    /// First character when it was not escaped
    prefix: Option<char>,
    text: String,
}

fn split_terms(query: &str) -> Vec<Term> {
    let mut terms = Vec::new();
    let mut chars = query.chars();
    let mut current: Option<Term> = None;

    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            terms.extend(current.take());
            continue;
        }
        let term = current.get_or_insert_with(|| Term {
            prefix: None,
            text: String::new(),
        });
        if c == ESCAPE {
            term.text.push(chars.next().unwrap_or(ESCAPE));
        } else if term.prefix.is_none()
            && term.text.is_empty()
            && matches!(c, REQUIRED | EXCLUDED | INCLUDED)
        {
            term.prefix = Some(c);
        } else {
            term.text.push(c);
        }
    }
    terms.extend(current);
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_prefixes_sort_terms() {
        let query = parse_simple("+a b ~c -d");
        assert_eq!(query.required, strings(&["a"]));
        assert_eq!(query.include, strings(&["b", "c"]));
        assert_eq!(query.exclude, strings(&["d"]));
    }

    #[test]
    fn test_only_first_prefix_counts() {
        let query = parse_simple("+-a --b");
        assert_eq!(query.required, strings(&["-a"]));
        assert_eq!(query.exclude, strings(&["-b"]));
    }

    #[test]
    fn test_escapes() {
        let query = parse_simple(r"\-a big\ bird \\x");
        assert_eq!(query.include, strings(&["-a", "big bird", r"\x"]));
        assert!(query.exclude.is_empty());
    }

    #[test]
    fn test_bare_prefix_is_ignored() {
        assert!(parse_simple("+ - ~").is_empty());
        assert!(parse_simple("   ").is_empty());
    }

    #[test]
    fn test_matching_rules() {
        let query = parse_simple("+photo cat dog -blurry");

        assert!(query.matches(&Candidate::new(["photo", "cat"])));
        assert!(query.matches(&Candidate::new(["photo", "dog", "cat"])));
        assert!(!query.matches(&Candidate::new(["photo"])));
        assert!(!query.matches(&Candidate::new(["cat", "dog"])));
        assert!(!query.matches(&Candidate::new(["photo", "cat", "blurry"])));
    }

    #[test]
    fn test_no_include_terms_accepts_any() {
        let query = parse_simple("+a -b");
        assert!(query.matches(&Candidate::new(["a"])));
        assert!(query.matches(&Candidate::new(["a", "z"])));
    }

    #[test]
    fn test_empty_query_matches_everything() {
        assert!(parse_simple("").matches(&Candidate::default()));
    }
}
