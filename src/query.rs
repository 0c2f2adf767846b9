//! Query tree types.
//!
//! A [`Query`] is a small tagged union over the three supported query shapes. Building
//! one by hand is possible via the constructors below, or a query string can be turned
//! into a tree with [`crate::parser::parse_query`].

/// A query that matches documents containing a single term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermQuery {
    pub term: String,
}

impl TermQuery {
    pub fn new(term: impl Into<String>) -> Self {
        Self { term: term.into() }
    }
}

/// A query that matches documents where a sequence of terms occurs within a given
/// word-distance of one another.
///
/// `distance` is the user-facing proximity distance: `0` means the terms must be
/// adjacent. `ordered` requires the terms to occur in the given left-to-right order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseQuery {
    pub terms: Vec<String>,
    pub distance: u32,
    pub ordered: bool,
}

impl PhraseQuery {
    pub fn new<I, T>(terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            terms: terms.into_iter().map(Into::into).collect(),
            distance: 0,
            ordered: false,
        }
    }

    pub fn with_distance(mut self, distance: u32) -> Self {
        self.distance = distance;
        self
    }

    pub fn with_ordered(mut self, ordered: bool) -> Self {
        self.ordered = ordered;
        self
    }
}

/// How a clause contributes to a [`BooleanQuery`]'s result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    /// The clause's matches are intersected into the result (conjunction).
    Must,
    /// The clause's matches are unioned into the result, unless any MUST clause is
    /// present (disjunction).
    Should,
    /// The clause's matches are subtracted from the result (exclusion).
    MustNot,
}

/// A single clause of a [`BooleanQuery`]: a sub-query paired with how it contributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanClause {
    pub query: Query,
    pub clause: ClauseKind,
}

impl BooleanClause {
    pub fn new(query: impl Into<Query>, clause: ClauseKind) -> Self {
        Self {
            query: query.into(),
            clause,
        }
    }
}

/// A query composed of MUST / SHOULD / MUST_NOT clauses over sub-queries.
///
/// Evaluation: the presence of any MUST clause suppresses SHOULD clauses entirely (a
/// SHOULD never widens a MUST result); a query with only MUST_NOT clauses matches
/// nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BooleanQuery {
    pub clauses: Vec<BooleanClause>,
}

impl BooleanQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn must(mut self, query: impl Into<Query>) -> Self {
        self.clauses.push(BooleanClause::new(query, ClauseKind::Must));
        self
    }

    pub fn should(mut self, query: impl Into<Query>) -> Self {
        self.clauses
            .push(BooleanClause::new(query, ClauseKind::Should));
        self
    }

    pub fn must_not(mut self, query: impl Into<Query>) -> Self {
        self.clauses
            .push(BooleanClause::new(query, ClauseKind::MustNot));
        self
    }
}

/// A query tree: a term, a proximity phrase, or a boolean composition of sub-queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Term(TermQuery),
    Phrase(PhraseQuery),
    Boolean(BooleanQuery),
}

impl Query {
    pub fn term(term: impl Into<String>) -> Self {
        Query::Term(TermQuery::new(term))
    }
}

impl From<TermQuery> for Query {
    fn from(q: TermQuery) -> Self {
        Query::Term(q)
    }
}

impl From<PhraseQuery> for Query {
    fn from(q: PhraseQuery) -> Self {
        Query::Phrase(q)
    }
}

impl From<BooleanQuery> for Query {
    fn from(q: BooleanQuery) -> Self {
        Query::Boolean(q)
    }
}

impl From<&str> for Query {
    fn from(term: &str) -> Self {
        Query::term(term)
    }
}
