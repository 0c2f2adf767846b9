//! Converts a query string into a [`Query`] tree.
//!
//! Grammar (informal):
//!
//! ```text
//! query     := or_expr
//! or_expr   := and_expr ( (AND|OR|NOT|ε) and_expr )*
//! and_expr  := atom
//! atom      := TERM | phrase | group
//! phrase    := '"' TERM (WS TERM)+ '"' ( '~' INT )?
//! group     := '(' query ')'
//! ```
//!
//! Clause-type assignment is a left-to-right scan with "sticky MUST": a term following
//! `AND` is MUST and retroactively promotes the previous clause to MUST as well; a term
//! following `OR` is SHOULD; a term following `NOT` is MUST_NOT and leaves the previous
//! clause untouched. A bare term (no preceding connector) is SHOULD.

use tracing::debug;

use crate::error::{Error, Result};
use crate::query::{BooleanClause, BooleanQuery, ClauseKind, PhraseQuery, Query};

/// Parse a query string into a [`Query`] tree.
///
/// An empty (or all-whitespace) string parses to an empty [`BooleanQuery`], which
/// matches nothing.
pub fn parse_query(input: &str) -> Result<Query> {
    let tokens = lex(input)?;
    let mut pos = 0;
    let query = parse_expr(&tokens, &mut pos)?;

    if pos != tokens.len() {
        return Err(Error::QueryParse(format!(
            "unbalanced parenthesis at token {pos}"
        )));
    }

    debug!(?query, "parsed query string");
    Ok(query)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tok {
    And,
    Or,
    Not,
    LParen,
    RParen,
    Term(String),
    Phrase(Vec<String>, u32),
}

fn lex(input: &str) -> Result<Vec<Tok>> {
    let mut chars = input.chars().peekable();
    let mut tokens = Vec::new();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        match c {
            '(' => {
                chars.next();
                tokens.push(Tok::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Tok::RParen);
            }
            '"' => {
                chars.next();
                let mut content = String::new();
                let mut closed = false;

                for c2 in chars.by_ref() {
                    if c2 == '"' {
                        closed = true;
                        break;
                    }
                    content.push(c2);
                }

                if !closed {
                    return Err(Error::QueryParse("unclosed quote in query string".into()));
                }

                let terms = content.split_whitespace().map(str::to_owned).collect();
                let distance = lex_proximity_suffix(&mut chars)?;
                tokens.push(Tok::Phrase(terms, distance));
            }
            _ => {
                let mut word = String::new();
                while let Some(&c2) = chars.peek() {
                    if c2.is_whitespace() || c2 == '(' || c2 == ')' || c2 == '"' {
                        break;
                    }
                    word.push(c2);
                    chars.next();
                }

                tokens.push(match word.as_str() {
                    "AND" => Tok::And,
                    "OR" => Tok::Or,
                    "NOT" => Tok::Not,
                    _ => Tok::Term(word),
                });
            }
        }
    }

    Ok(tokens)
}

/// Parse an optional `~<int>` proximity suffix immediately following a closing quote.
///
/// Absent suffix defaults to `0`; a negative integer is a parse error.
fn lex_proximity_suffix(chars: &mut std::iter::Peekable<std::str::Chars>) -> Result<u32> {
    if chars.peek() != Some(&'~') {
        return Ok(0);
    }
    chars.next();

    let negative = chars.peek() == Some(&'-');
    if negative {
        chars.next();
    }

    let mut digits = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() {
            digits.push(c);
            chars.next();
        } else {
            break;
        }
    }

    if negative {
        return Err(Error::QueryParse(
            "proximity distance must not be negative".into(),
        ));
    }

    if digits.is_empty() {
        return Ok(0);
    }

    digits
        .parse()
        .map_err(|_| Error::QueryParse(format!("invalid proximity distance {digits:?}")))
}

/// Parse a flat left-to-right sequence of (connector?, atom) pairs up to the next
/// unmatched `)` or end of input, applying the sticky-MUST clause assignment rule.
///
/// Returns the lone atom directly when exactly one clause was produced.
fn parse_expr(tokens: &[Tok], pos: &mut usize) -> Result<Query> {
    let mut clauses: Vec<BooleanClause> = Vec::new();

    loop {
        let connector = match tokens.get(*pos) {
            Some(Tok::And) => {
                *pos += 1;
                Some(Connector::And)
            }
            Some(Tok::Or) => {
                *pos += 1;
                Some(Connector::Or)
            }
            Some(Tok::Not) => {
                *pos += 1;
                Some(Connector::Not)
            }
            _ => None,
        };

        match tokens.get(*pos) {
            None | Some(Tok::RParen) => {
                if connector.is_some() {
                    return Err(Error::QueryParse(
                        "dangling AND/OR/NOT with no following term".into(),
                    ));
                }
                break;
            }
            _ => {}
        }

        let atom = parse_atom(tokens, pos)?;

        let kind = match connector {
            None | Some(Connector::Or) => ClauseKind::Should,
            Some(Connector::Not) => ClauseKind::MustNot,
            Some(Connector::And) => {
                if let Some(previous) = clauses.last_mut() {
                    previous.clause = ClauseKind::Must;
                }
                ClauseKind::Must
            }
        };

        clauses.push(BooleanClause::new(atom, kind));
    }

    if clauses.len() == 1 {
        Ok(clauses.into_iter().next().unwrap().query)
    } else {
        Ok(Query::Boolean(BooleanQuery { clauses }))
    }
}

enum Connector {
    And,
    Or,
    Not,
}

fn parse_atom(tokens: &[Tok], pos: &mut usize) -> Result<Query> {
    match tokens.get(*pos) {
        Some(Tok::LParen) => {
            *pos += 1;
            let inner = parse_expr(tokens, pos)?;
            match tokens.get(*pos) {
                Some(Tok::RParen) => {
                    *pos += 1;
                    Ok(inner)
                }
                _ => Err(Error::QueryParse("unbalanced parenthesis".into())),
            }
        }
        Some(Tok::Term(term)) => {
            *pos += 1;
            Ok(Query::term(term.clone()))
        }
        Some(Tok::Phrase(terms, distance)) => {
            *pos += 1;
            Ok(Query::Phrase(
                PhraseQuery::new(terms.clone()).with_distance(*distance),
            ))
        }
        other => Err(Error::QueryParse(format!(
            "expected a term, phrase or group, found {other:?}"
        ))),
    }
}
