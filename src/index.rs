//! The core index: document store, inverted index, and positional index, bound together
//! by a tokeniser and normaliser chain applied identically at ingest and query time.

use std::collections::{HashMap, HashSet};

use tracing::{instrument, trace, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::eval;
use crate::normalise::{self, LowerCase, TokenNormaliser};
use crate::parser;
use crate::query::Query;
use crate::tokenise::{Tokeniser, WordTokeniser};

/// A document as seen by callers: its text plus an optional caller-supplied identifier.
///
/// An identifier left unset is assigned a fresh random UUID (v4) on [`Index::append`].
/// `Document` is otherwise immutable once ingested; it is returned from [`Index::search`]
/// carrying the identifier the index actually assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub text: String,
    pub id: Option<String>,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Document::new(text)
    }
}

impl From<String> for Document {
    fn from(text: String) -> Self {
        Document::new(text)
    }
}

/// A document as held internally: its raw text alongside the normalized token sequence
/// produced for it at ingest, which `delete` replays to unwind the two index maps.
#[derive(Debug, Clone)]
struct StoredDocument {
    text: String,
    tokens: Vec<String>,
}

/// Either a pre-built [`Query`] tree or a query string to be parsed per the grammar in
/// [`crate::parser`]. Distinct from `Query`'s own `From<&str>` (which builds a literal
/// `TermQuery`): a bare string handed to [`Index::search`] is a query to parse, not a
/// term to match verbatim.
pub enum SearchInput {
    Query(Query),
    QueryString(String),
}

impl From<Query> for SearchInput {
    fn from(query: Query) -> Self {
        SearchInput::Query(query)
    }
}

impl From<&str> for SearchInput {
    fn from(query: &str) -> Self {
        SearchInput::QueryString(query.to_owned())
    }
}

impl From<String> for SearchInput {
    fn from(query: String) -> Self {
        SearchInput::QueryString(query)
    }
}

/// In-memory inverted-index text search engine.
///
/// Holds the document store, the inverted index (token to ordered document-id postings,
/// one entry per occurrence), and the positional index (token to document-id to ascending
/// positions). `append` and `delete` are the only mutators; `search` is read-only.
/// `Index` performs no internal synchronization — see the crate-level docs for the
/// concurrency model expected of callers who share one across threads.
pub struct Index {
    tokeniser: Box<dyn Tokeniser>,
    normalisers: Vec<Box<dyn TokenNormaliser>>,
    documents: HashMap<String, StoredDocument>,
    inverted: HashMap<String, Vec<String>>,
    positional: HashMap<String, HashMap<String, Vec<usize>>>,
}

impl Index {
    /// Build an index with the default tokeniser ([`WordTokeniser`]) and a
    /// lowercase-only normaliser chain.
    pub fn new() -> Self {
        Self {
            tokeniser: Box::new(WordTokeniser::new()),
            normalisers: vec![Box::new(LowerCase)],
            documents: HashMap::new(),
            inverted: HashMap::new(),
            positional: HashMap::new(),
        }
    }

    /// Replace the tokeniser.
    pub fn with_tokeniser<T>(mut self, tokeniser: T) -> Self
    where
        T: 'static + Tokeniser,
    {
        self.tokeniser = Box::new(tokeniser);
        self
    }

    /// Replace the normaliser chain entirely (the default lowercase-only chain is
    /// dropped, not appended to).
    pub fn with_normalisers<I>(mut self, normalisers: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn TokenNormaliser>>,
    {
        self.normalisers = normalisers.into_iter().collect();
        self
    }

    /// Append a normaliser to the chain.
    pub fn with_normaliser<T>(mut self, normaliser: T) -> Self
    where
        T: 'static + TokenNormaliser,
    {
        self.normalisers.push(Box::new(normaliser));
        self
    }

    /// The number of documents currently stored.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Ingest a batch of documents (raw strings and [`Document`]s may be mixed).
    ///
    /// Not atomic: if ingest fails partway through the batch, documents processed
    /// before the failing one remain indexed.
    #[instrument(skip(self, items))]
    pub fn append<I, D>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = D>,
        D: Into<Document>,
    {
        for item in items {
            self.append_one(item.into())?;
        }
        Ok(())
    }

    fn append_one(&mut self, doc: Document) -> Result<()> {
        let id = match doc.id {
            Some(id) => {
                if self.documents.contains_key(&id) {
                    warn!(id = %id, "rejected duplicate document id");
                    return Err(Error::DuplicateIngest(id));
                }
                id
            }
            None => Uuid::new_v4().to_string(),
        };

        let raw_tokens = self.tokeniser.tokenize(&doc.text);
        let tokens = normalise::apply_chain(&self.normalisers, raw_tokens);

        for (position, token) in tokens.iter().enumerate() {
            self.inverted
                .entry(token.clone())
                .or_default()
                .push(id.clone());

            self.positional
                .entry(token.clone())
                .or_default()
                .entry(id.clone())
                .or_default()
                .push(position);
        }

        trace!(id = %id, token_count = tokens.len(), "appended document");

        self.documents.insert(
            id,
            StoredDocument {
                text: doc.text,
                tokens,
            },
        );

        Ok(())
    }

    /// Delete the union of documents resolved from `docs` (by their `id`, ignoring
    /// documents with no id) and `ids`, restricted to identifiers present in the store.
    /// At least one of the two must be supplied. Returns the number of documents
    /// actually removed.
    #[instrument(skip(self, docs, ids))]
    pub fn delete(&mut self, docs: Option<&[Document]>, ids: Option<&[String]>) -> Result<usize> {
        if docs.is_none() && ids.is_none() {
            return Err(Error::InvalidArgument(
                "delete requires at least one of docs or ids".into(),
            ));
        }

        let mut requested: HashSet<&str> = HashSet::new();
        if let Some(docs) = docs {
            requested.extend(docs.iter().filter_map(|d| d.id.as_deref()));
        }
        if let Some(ids) = ids {
            requested.extend(ids.iter().map(String::as_str));
        }

        let resolved: Vec<String> = requested
            .into_iter()
            .filter(|id| self.documents.contains_key(*id))
            .map(str::to_owned)
            .collect();

        for id in &resolved {
            let stored = self
                .documents
                .remove(id)
                .expect("resolved id is known to be present in the store");

            for token in &stored.tokens {
                if let Some(postings) = self.inverted.get_mut(token) {
                    if let Some(pos) = postings.iter().position(|d| d == id) {
                        postings.remove(pos);
                    }
                    if postings.is_empty() {
                        self.inverted.remove(token);
                    }
                }

                if let Some(by_doc) = self.positional.get_mut(token) {
                    by_doc.remove(id);
                    if by_doc.is_empty() {
                        self.positional.remove(token);
                    }
                }
            }
        }

        trace!(count = resolved.len(), "deleted documents");

        Ok(resolved.len())
    }

    /// Evaluate a query (tree or string) and return the matching documents, deduplicated
    /// by identifier. Order is unspecified.
    #[instrument(skip(self, query))]
    pub fn search<Q>(&self, query: Q) -> Result<Vec<Document>>
    where
        Q: Into<SearchInput>,
    {
        let query = match query.into() {
            SearchInput::Query(query) => query,
            SearchInput::QueryString(text) => parser::parse_query(&text)?,
        };

        let ids = eval::evaluate(&query, &self.inverted, &self.positional, &self.normalisers)?;

        trace!(matches = ids.len(), "evaluated query");

        Ok(ids
            .into_iter()
            .filter_map(|id| {
                self.documents.get(&id).map(|stored| {
                    Document::new(stored.text.clone()).with_id(id)
                })
            })
            .collect())
    }

    /// The positions recorded for `token` in document `doc_id`, if any. Exposed mainly
    /// for tests asserting on the positional index directly.
    pub fn positions_for(&self, token: &str, doc_id: &str) -> Option<&[usize]> {
        self.positional
            .get(token)
            .and_then(|by_doc| by_doc.get(doc_id))
            .map(Vec::as_slice)
    }
}

impl Default for Index {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{BooleanQuery, PhraseQuery, Query, TermQuery};

    fn ids(docs: &[Document]) -> HashSet<String> {
        docs.iter().map(|d| d.id.clone().unwrap()).collect()
    }

    #[test]
    fn tokenizes_the_scenario_1_sentence() {
        let tokens = WordTokeniser::new()
            .tokenize("Version 4.0 was released on October 12, 2012.");
        assert_eq!(tokens, vec!["Version", "was", "released", "on", "October"]);
    }

    #[test]
    fn like_matches_all_three_cake_matches_two_what_matches_none() {
        let mut index = Index::new();
        index
            .append(["i like cake", "you like cookie", "we like cake"])
            .unwrap();

        assert_eq!(index.search("like").unwrap().len(), 3);
        assert_eq!(index.search("cake").unwrap().len(), 2);
        assert!(index.search("what").unwrap().is_empty());
    }

    #[test]
    fn boolean_must_and_must_not_scenarios() {
        let mut index = Index::new();
        index
            .append([
                "i like cake",
                "you like cookie",
                "we like cake",
                "we should have a tea party",
            ])
            .unwrap();

        let must_query = BooleanQuery::new().must("like").must("we");
        let matches = index.search(Query::Boolean(must_query)).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].text, "we like cake");

        let exclude_query = BooleanQuery::new().must_not("cake").should("like");
        let matches = index.search(Query::Boolean(exclude_query)).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].text, "you like cookie");
    }

    #[test]
    fn phrase_query_scenarios_with_distance_and_order() {
        let mut index = Index::new();
        index
            .append([
                "i like cake, but do we like this specific cake",
                "you like cookie",
                "we like cake",
                "we should have a tea party",
            ])
            .unwrap();

        assert_eq!(
            index
                .search(Query::Phrase(PhraseQuery::new(["like", "cake"])))
                .unwrap()
                .len(),
            2
        );

        assert_eq!(
            index
                .search(Query::Phrase(
                    PhraseQuery::new(["we", "cake"]).with_distance(2)
                ))
                .unwrap()
                .len(),
            2
        );

        assert!(index
            .search(Query::Phrase(PhraseQuery::new(["we", "cake"])))
            .unwrap()
            .is_empty());

        assert_eq!(
            index
                .search(Query::Phrase(PhraseQuery::new(["cake", "like"])))
                .unwrap()
                .len(),
            2
        );

        assert!(index
            .search(Query::Phrase(
                PhraseQuery::new(["cake", "like"]).with_ordered(true)
            ))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn repeated_term_phrase_requires_repeated_token() {
        let mut index = Index::new();
        index.append(["you like cookie"]).unwrap();
        assert!(index
            .search(Query::Phrase(PhraseQuery::new(["like", "like"])))
            .unwrap()
            .is_empty());

        index.append(["you like like cookie"]).unwrap();
        assert_eq!(
            index
                .search(Query::Phrase(PhraseQuery::new(["like", "like"])))
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn positional_index_records_zero_based_ascending_positions() {
        let mut index = Index::new();
        index
            .append([Document::new("this book has a lot of words for a book").with_id("d1")])
            .unwrap();

        assert_eq!(index.positions_for("book", "d1"), Some(&[1usize, 9][..]));
    }

    #[test]
    fn term_query_and_single_term_phrase_query_agree() {
        let mut index = Index::new();
        index.append(["we like cake", "we should have a tea"]).unwrap();

        let term_result = ids(&index.search(Query::term("cake")).unwrap());
        let phrase_result = ids(&index.search(Query::Phrase(PhraseQuery::new(["cake"]))).unwrap());

        assert_eq!(term_result, phrase_result);
    }

    #[test]
    fn boolean_clause_order_does_not_affect_result() {
        let mut index = Index::new();
        index.append(["we like cake", "we like cookie", "they like tea"]).unwrap();

        let a = BooleanQuery::new().must("we").must("like");
        let b = BooleanQuery::new().must("like").must("we");

        assert_eq!(
            ids(&index.search(Query::Boolean(a)).unwrap()),
            ids(&index.search(Query::Boolean(b)).unwrap())
        );
    }

    #[test]
    fn should_only_boolean_query_matches_same_set_as_bare_query() {
        let mut index = Index::new();
        index.append(["we like cake", "they like tea"]).unwrap();

        let wrapped = BooleanQuery::new().should(TermQuery::new("cake"));
        assert_eq!(
            ids(&index.search(Query::Boolean(wrapped)).unwrap()),
            ids(&index.search(Query::term("cake")).unwrap())
        );
    }

    #[test]
    fn delete_removes_all_traces_of_a_document() {
        let mut index = Index::new();
        index
            .append([Document::new("we like cake").with_id("d1"), "they like tea".into()])
            .unwrap();

        let deleted = index.delete(None, Some(&["d1".to_owned()])).unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(index.len(), 1);
        assert!(index.positions_for("cake", "d1").is_none());
        assert!(index.search("cake").unwrap().is_empty());
    }

    #[test]
    fn delete_without_docs_or_ids_is_an_invalid_argument_error() {
        let mut index = Index::new();
        assert!(index.delete(None, None).is_err());
    }

    #[test]
    fn append_rejects_duplicate_identifiers() {
        let mut index = Index::new();
        index.append([Document::new("we like cake").with_id("d1")]).unwrap();

        let result = index.append([Document::new("they like tea").with_id("d1")]);
        assert!(matches!(result, Err(Error::DuplicateIngest(_))));
    }

    #[test]
    fn search_accepts_a_query_string() {
        let mut index = Index::new();
        index.append(["we like cake", "they like tea"]).unwrap();

        let matches = index.search("we AND cake").unwrap();
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn normalizer_chain_empties_a_query_term_to_no_matches() {
        let mut index = Index::new().with_normaliser(normalise::StopWords::default_english());
        index.append(["we like cake"]).unwrap();

        assert!(index.search(Query::term("the")).unwrap().is_empty());
    }
}
