//! Evaluates a [`Query`] tree against an index's inverted and positional maps.
//!
//! Takes the two maps and the normaliser chain directly rather than a reference to
//! [`crate::index::Index`] itself, so the boolean set algebra and positional dispatch can
//! be exercised without constructing a whole index.

use std::collections::{HashMap, HashSet};

use crate::error::Result;
use crate::normalise::{self, TokenNormaliser};
use crate::positional::{multi_term_intersect, two_term_intersect};
use crate::query::{BooleanQuery, ClauseKind, PhraseQuery, Query};

type Inverted = HashMap<String, Vec<String>>;
type Positional = HashMap<String, HashMap<String, Vec<usize>>>;

/// Query variants are a closed Rust enum, so dispatch here is exhaustive by construction:
/// there is no "unknown variant" case to guard against at runtime.
pub(crate) fn evaluate(
    query: &Query,
    inverted: &Inverted,
    positional: &Positional,
    normalisers: &[Box<dyn TokenNormaliser>],
) -> Result<HashSet<String>> {
    match query {
        Query::Term(t) => Ok(evaluate_term(&t.term, inverted, normalisers)),
        Query::Boolean(b) => evaluate_boolean(b, inverted, positional, normalisers),
        Query::Phrase(p) => evaluate_phrase(p, inverted, positional, normalisers),
    }
}

fn evaluate_term(
    term: &str,
    inverted: &Inverted,
    normalisers: &[Box<dyn TokenNormaliser>],
) -> HashSet<String> {
    let normalised = normalise::apply_chain(normalisers, vec![term.to_owned()]);

    let Some(token) = normalised.first() else {
        return HashSet::new();
    };

    inverted
        .get(token)
        .map(|docs| docs.iter().cloned().collect())
        .unwrap_or_default()
}

fn evaluate_boolean(
    query: &BooleanQuery,
    inverted: &Inverted,
    positional: &Positional,
    normalisers: &[Box<dyn TokenNormaliser>],
) -> Result<HashSet<String>> {
    let mut and_set: Option<HashSet<String>> = None;
    let mut or_set: HashSet<String> = HashSet::new();
    let mut not_set: HashSet<String> = HashSet::new();

    for clause in &query.clauses {
        let matched = evaluate(&clause.query, inverted, positional, normalisers)?;

        match clause.clause {
            ClauseKind::Must => {
                and_set = Some(match and_set {
                    None => matched,
                    Some(existing) => existing.intersection(&matched).cloned().collect(),
                });
            }
            ClauseKind::Should => or_set.extend(matched),
            ClauseKind::MustNot => not_set.extend(matched),
        }
    }

    let base = and_set.unwrap_or(or_set);
    Ok(base.difference(&not_set).cloned().collect())
}

fn evaluate_phrase(
    query: &PhraseQuery,
    inverted: &Inverted,
    positional: &Positional,
    normalisers: &[Box<dyn TokenNormaliser>],
) -> Result<HashSet<String>> {
    let terms = normalise::apply_chain(normalisers, query.terms.clone());

    match terms.len() {
        0 => Ok(HashSet::new()),
        1 => Ok(inverted
            .get(&terms[0])
            .map(|docs| docs.iter().cloned().collect())
            .unwrap_or_default()),
        _ => {
            let k = (query.distance + 1) as usize;

            let mut postings = Vec::with_capacity(terms.len());
            for term in &terms {
                match positional.get(term) {
                    Some(p) => postings.push(p),
                    None => return Ok(HashSet::new()),
                }
            }

            if postings.len() == 2 {
                Ok(two_term_intersect(postings[0], postings[1], k, query.ordered))
            } else {
                Ok(multi_term_intersect(&postings, k, query.ordered))
            }
        }
    }
}
