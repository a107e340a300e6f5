//! Boolean expression tree and its evaluation against a candidate

use std::collections::HashSet;

/// A parsed full-dialect search expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Matches every candidate; the parse of an empty query or `()`
    Everything,
    /// True iff the candidate carries this tag (or has this name)
    Literal(String),
    Not(Box<Expr>),
    /// True iff every operand is; operands stay in query order
    And(Vec<Expr>),
    Or(Vec<Expr>),
}

impl Expr {
    #[must_use]
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Join with AND, appending to `self` when it already is one
    #[must_use]
    pub fn and(self, rhs: Self) -> Self {
        match self {
            Self::And(mut operands) => {
                operands.push(rhs);
                Self::And(operands)
            }
            lhs => Self::And(vec![lhs, rhs]),
        }
    }

    /// Join with OR, appending to `self` when it already is one
    #[must_use]
    pub fn or(self, rhs: Self) -> Self {
        match self {
            Self::Or(mut operands) => {
                operands.push(rhs);
                Self::Or(operands)
            }
            lhs => Self::Or(vec![lhs, rhs]),
        }
    }

    /// Evaluate against `candidate`; `And`/`Or` short-circuit
    ///
    /// Recursion only follows nesting, so a long chain of operands is
    /// walked in a loop.
    #[must_use]
    pub fn evaluate(&self, candidate: &Candidate) -> bool {
        match self {
            Self::Everything => true,
            Self::Literal(text) => candidate.has(text),
            Self::Not(inner) => !inner.evaluate(candidate),
            Self::And(operands) => operands.iter().all(|expr| expr.evaluate(candidate)),
            Self::Or(operands) => operands.iter().any(|expr| expr.evaluate(candidate)),
        }
    }
}

/// The tag names (and optionally the name) of a file or folder under test
///
/// Comparison is exact and case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    pub tags: HashSet<String>,
    /// Matched by literals too when present
    pub name: Option<String>,
}

impl Candidate {
    #[must_use]
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            name: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// True if `text` is one of the tags or equals the name
    #[must_use]
    pub fn has(&self, text: &str) -> bool {
        self.tags.contains(text) || self.name.as_deref() == Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_everything_matches_empty_candidate() {
        assert!(Expr::Everything.evaluate(&Candidate::default()));
    }

    #[test]
    fn test_literal_is_case_sensitive() {
        let candidate = Candidate::new(["Cat"]);
        assert!(Expr::literal("Cat").evaluate(&candidate));
        assert!(!Expr::literal("cat").evaluate(&candidate));
    }

    #[test]
    fn test_not_and_or() {
        let candidate = Candidate::new(["a", "b"]);

        assert!(Expr::literal("a").and(Expr::literal("b")).evaluate(&candidate));
        assert!(!Expr::literal("a").and(Expr::literal("c")).evaluate(&candidate));
        assert!(Expr::literal("c").or(Expr::literal("b")).evaluate(&candidate));
        assert!(Expr::literal("c").negate().evaluate(&candidate));
    }

    #[test]
    fn test_chains_flatten_into_one_node() {
        let chain = Expr::literal("a")
            .and(Expr::literal("b"))
            .and(Expr::literal("c"));
        assert_eq!(
            chain,
            Expr::And(vec![
                Expr::literal("a"),
                Expr::literal("b"),
                Expr::literal("c"),
            ])
        );

        let mixed = Expr::literal("a").or(Expr::literal("b")).and(Expr::literal("c"));
        assert!(matches!(&mixed, Expr::And(operands) if operands.len() == 2));
        assert!(mixed.evaluate(&Candidate::new(["b", "c"])));
        assert!(!mixed.evaluate(&Candidate::new(["a"])));
    }

    #[test]
    fn test_name_matches_only_when_set() {
        let expr = Expr::literal("report.pdf");
        let tagged = Candidate::new(["work"]);

        assert!(!expr.evaluate(&tagged));
        assert!(expr.evaluate(&tagged.with_name("report.pdf")));
    }
}
