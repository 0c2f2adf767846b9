//! An in-memory, inverted-index text search engine.
//!
//! Text is ingested through [`Index::append`], which tokenizes each document (see
//! [`tokenise`]) and runs the result through a configurable normalizer chain (see
//! [`normalise`]) before recording it in a dual index: a *term to ordered postings*
//! inverted index and a *term to document to positions* positional index. Queries
//! ([`query`]) are evaluated against both structures to support boolean composition and
//! proximity phrase matching, including multi-term positional intersection (see
//! [`positional`]). A small recursive-descent parser ([`parser`]) turns a query string
//! into a [`Query`] tree.
//!
//! The index performs no internal synchronization; see [`Index`]'s documentation for the
//! concurrency model expected of callers who share one across threads.

pub mod normalise;
pub mod parser;
pub mod query;
pub mod tokenise;

mod error;
mod eval;
mod index;
mod positional;

pub use error::{Error, Result};
pub use index::{Document, Index, SearchInput};
pub use query::{BooleanClause, BooleanQuery, ClauseKind, PhraseQuery, Query, TermQuery};
