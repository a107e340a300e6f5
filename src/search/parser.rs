//! Full-dialect search parser
//!
//! ```text
//! expr     := term (BOOL_OP? term)*
//! term     := NOT* (literal | group)
//! group    := '(' expr ')'
//! literal  := '"' text '"' | bareword
//! BOOL_OP  := 'AND' | 'OR' | '+' | '~'
//! NOT      := 'NOT' | '-'
//! ```
//!
//! Operators share one precedence level and fold left to right, so
//! `a OR b AND c` reads as `(a OR b) AND c`. Two terms with no operator
//! between them are joined by AND. A backslash makes the next character
//! literal, wherever it appears.
//!
//! Grouping is resolved first by [`find_groups`], which does not know about
//! quotes: a parenthesis inside a quoted literal still opens or closes a
//! group unless it is escaped.
//!
//! A chain of the same operator becomes one n-ary node. Nesting (groups,
//! `NOT` runs and switches between AND and OR) may not go deeper than
//! [`MAX_DEPTH`].

use super::error::SearchError;
use super::expr::Expr;
use std::iter::Peekable;
use std::ops::Range;
use std::vec::IntoIter;

pub const ESCAPE: char = '\\';
pub const GROUP_START: char = '(';
pub const GROUP_END: char = ')';
pub const QUOTE: char = '"';

const AND: [&str; 2] = ["AND", "+"];
const OR: [&str; 2] = ["OR", "~"];
const NOT: [&str; 2] = ["NOT", "-"];

/// Deepest expression tree a query may produce
pub const MAX_DEPTH: usize = 64;

/// Locate every parenthesised group in `query`
///
/// Returns byte ranges covering both parentheses, innermost groups first
/// (a group is emitted when its `)` is seen). Escaped parentheses are
/// skipped.
///
/// # Errors
///
/// Returns `SearchError::MalformedQuery` for an unmatched `(` or `)`, or
/// for groups nested more than [`MAX_DEPTH`] deep.
///
/// # Examples
/// ```
/// # use filetag::search::parser::find_groups;
/// let query = "(a (b))";
/// let groups: Vec<&str> = find_groups(query)
///     .unwrap()
///     .into_iter()
///     .map(|range| &query[range])
///     .collect();
/// assert_eq!(groups, vec!["(b)", "(a (b))"]);
/// ```
pub fn find_groups(query: &str) -> Result<Vec<Range<usize>>, SearchError> {
    scan_groups(query, query)
}

fn scan_groups(text: &str, source: &str) -> Result<Vec<Range<usize>>, SearchError> {
    let mut stack = Vec::new();
    let mut groups = Vec::new();
    let mut escaping = false;

    for (i, c) in text.char_indices() {
        if escaping {
            escaping = false;
            continue;
        }
        match c {
            ESCAPE => escaping = true,
            GROUP_START => {
                if stack.len() == MAX_DEPTH {
                    return Err(SearchError::malformed(
                        source,
                        format!("groups nested deeper than {MAX_DEPTH}"),
                    ));
                }
                stack.push(i);
            }
            GROUP_END => {
                let start = stack.pop().ok_or_else(|| {
                    SearchError::malformed(source, format!("unmatched '{GROUP_END}'"))
                })?;
                groups.push(start..i + GROUP_END.len_utf8());
            }
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(SearchError::malformed(
            source,
            format!("unmatched '{GROUP_START}'"),
        ));
    }
    Ok(groups)
}

/// Parse a full-dialect query
///
/// An empty (or all-whitespace) query parses to [`Expr::Everything`].
///
/// # Errors
///
/// Returns `SearchError::MalformedQuery` for unbalanced groups, an
/// unterminated quoted literal, an operator missing an operand, or an
/// expression nested more than [`MAX_DEPTH`] deep.
///
/// # Examples
/// ```
/// # use filetag::search::parser::parse;
/// # use filetag::search::expr::Candidate;
/// let expr = parse("cat AND NOT (dog OR \"big bird\")").unwrap();
/// assert!(expr.evaluate(&Candidate::new(["cat"])));
/// assert!(!expr.evaluate(&Candidate::new(["cat", "big bird"])));
/// ```
pub fn parse(query: &str) -> Result<Expr, SearchError> {
    let (expr, _) = Parser { source: query }.expression(query)?;
    Ok(expr)
}

/// An expression with the height of its tree
type Node = (Expr, usize);

#[derive(Debug)]
enum Token {
    Term(Node),
    And,
    Or,
    Not,
}

#[derive(Debug, Clone, Copy)]
enum Join {
    And,
    Or,
}

struct Parser<'a> {
    source: &'a str,
}

impl Parser<'_> {
    fn malformed(&self, reason: impl Into<String>) -> SearchError {
        SearchError::malformed(self.source, reason)
    }

    fn check_depth(&self, depth: usize) -> Result<usize, SearchError> {
        if depth > MAX_DEPTH {
            return Err(self.malformed(format!("expression nested deeper than {MAX_DEPTH}")));
        }
        Ok(depth)
    }

    /// Parse `text`, replacing each top-level group by its own parse
    fn expression(&self, text: &str) -> Result<Node, SearchError> {
        let groups = scan_groups(text, self.source)?;

        let mut tokens = Vec::new();
        let mut cursor = 0;
        for group in top_level(groups) {
            self.lex(&text[cursor..group.start], &mut tokens)?;
            let start = group.start + GROUP_START.len_utf8();
            let end = group.end - GROUP_END.len_utf8();
            tokens.push(Token::Term(self.expression(&text[start..end])?));
            cursor = group.end;
        }
        self.lex(&text[cursor..], &mut tokens)?;

        self.build(tokens)
    }

    /// Split a group-free stretch of text into tokens
    fn lex(&self, text: &str, tokens: &mut Vec<Token>) -> Result<(), SearchError> {
        let mut chars = text.chars();
        let mut word = String::new();
        let mut started = false;
        let mut literal = false;

        while let Some(c) = chars.next() {
            match c {
                ESCAPE => {
                    word.push(chars.next().unwrap_or(ESCAPE));
                    started = true;
                    literal = true;
                }
                QUOTE => {
                    loop {
                        match chars.next() {
                            Some(QUOTE) => break,
                            Some(ESCAPE) => match chars.next() {
                                Some(escaped) => word.push(escaped),
                                None => return Err(self.malformed("unterminated literal")),
                            },
                            Some(inner) => word.push(inner),
                            None => return Err(self.malformed("unterminated literal")),
                        }
                    }
                    started = true;
                    literal = true;
                }
                c if c.is_whitespace() => {
                    if started {
                        tokens.push(classify(std::mem::take(&mut word), literal));
                    }
                    started = false;
                    literal = false;
                }
                c => {
                    word.push(c);
                    started = true;
                }
            }
        }
        if started {
            tokens.push(classify(word, literal));
        }
        Ok(())
    }

    fn build(&self, tokens: Vec<Token>) -> Result<Node, SearchError> {
        let mut tokens = tokens.into_iter().peekable();
        if tokens.peek().is_none() {
            return Ok((Expr::Everything, 1));
        }

        let (mut acc, mut depth) = self.term(&mut tokens)?;
        loop {
            let join = match tokens.peek() {
                None => break,
                Some(Token::And) => Some(Join::And),
                Some(Token::Or) => Some(Join::Or),
                Some(_) => None,
            };
            if join.is_some() {
                tokens.next();
            }
            let (rhs, rhs_depth) = self.term(&mut tokens)?;
            let join = join.unwrap_or(Join::And);
            let extends = matches!(
                (&acc, join),
                (Expr::And(_), Join::And) | (Expr::Or(_), Join::Or)
            );
            depth = self.check_depth(if extends {
                depth.max(rhs_depth + 1)
            } else {
                depth.max(rhs_depth) + 1
            })?;
            acc = match join {
                Join::And => acc.and(rhs),
                Join::Or => acc.or(rhs),
            };
        }
        Ok((acc, depth))
    }

    fn term(&self, tokens: &mut Peekable<IntoIter<Token>>) -> Result<Node, SearchError> {
        let mut negations = 0;
        loop {
            match tokens.next() {
                Some(Token::Not) => negations += 1,
                Some(Token::Term((expr, depth))) => {
                    let depth = self.check_depth(depth + negations)?;
                    let expr = (0..negations).fold(expr, |expr, _| expr.negate());
                    return Ok((expr, depth));
                }
                Some(Token::And | Token::Or) => {
                    return Err(self.malformed("operator without left operand"));
                }
                None => return Err(self.malformed("operator without right operand")),
            }
        }
    }
}

/// Keywords are only recognised in bare words with no escaped or quoted part
fn classify(word: String, literal: bool) -> Token {
    if literal {
        return Token::Term((Expr::Literal(word), 1));
    }
    let word_ref = word.as_str();
    if AND.contains(&word_ref) {
        Token::And
    } else if OR.contains(&word_ref) {
        Token::Or
    } else if NOT.contains(&word_ref) {
        Token::Not
    } else {
        Token::Term((Expr::Literal(word), 1))
    }
}

/// Keep the groups not nested inside another, in text order
fn top_level(mut groups: Vec<Range<usize>>) -> Vec<Range<usize>> {
    groups.sort_by_key(|group| group.start);
    let mut outer: Vec<Range<usize>> = Vec::new();
    for group in groups {
        if outer.last().is_none_or(|last| group.start >= last.end) {
            outer.push(group);
        }
    }
    outer
}
