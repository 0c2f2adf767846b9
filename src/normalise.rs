//! This module defines a [`TokenNormaliser`] trait that facilitates token normalisation.
//!
//! There are several predefined normalisers:
//!  * [`LowerCase`] - lower-cases every token
//!  * [`StopWords`] - filters tokens present in a configurable set (NLTK English list by
//!    default)
//!  * [`NGram`] - expands each token into its contiguous character n-grams
//!  * [`Unicode`] - performs unicode normalisation of tokens
//!
//! Normalisers are composed linearly: the output of stage *i* is the input of stage
//! *i+1*. A chain must be applied identically at ingest and at query time, and every
//! built-in stage is idempotent (reapplying the chain has no further effect).

use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};

/// Token normaliser.
///
/// Unlike a single-token transform, a normaliser sees the whole token sequence at once,
/// since a stage (such as [`NGram`]) may lengthen or shorten it.
pub trait TokenNormaliser: Send + Sync {
    fn normalize(&self, tokens: Vec<String>) -> Vec<String>;
}

/// Run every normaliser in `chain`, in order, over `tokens`.
pub fn apply_chain(chain: &[Box<dyn TokenNormaliser>], tokens: Vec<String>) -> Vec<String> {
    chain
        .iter()
        .fold(tokens, |tokens, normaliser| normaliser.normalize(tokens))
}

/// Lower-cases every token using locale-independent case folding.
pub struct LowerCase;

impl TokenNormaliser for LowerCase {
    fn normalize(&self, tokens: Vec<String>) -> Vec<String> {
        tokens.into_iter().map(|t| t.to_lowercase()).collect()
    }
}

/// Removes tokens present in a configurable stop word set.
///
/// Defaults to the NLTK English stop word list, lowercased.
pub struct StopWords {
    stop_words: std::collections::HashSet<String>,
}

impl StopWords {
    /// Build a stop word filter from a custom list.
    pub fn new(stop_words: &[&str]) -> Self {
        Self {
            stop_words: stop_words.iter().map(|&s| s.to_owned()).collect(),
        }
    }

    /// Build a stop word filter using the built-in NLTK English list.
    pub fn default_english() -> Self {
        Self::new(DEFAULT_STOP_WORDS)
    }
}

impl TokenNormaliser for StopWords {
    fn normalize(&self, tokens: Vec<String>) -> Vec<String> {
        tokens
            .into_iter()
            .filter(|t| !self.stop_words.contains(t))
            .collect()
    }
}

/// Expands each token into its contiguous character n-grams.
///
/// For a token `T`: if `|T| <= min_gram`, the contribution is `[T]`. Otherwise the
/// contribution is (optionally `T` itself, then) every contiguous substring of length
/// `ℓ` with `min_gram <= ℓ <= max_gram`, enumerated by starting index ascending then
/// length ascending.
pub struct NGram {
    min_gram: usize,
    max_gram: usize,
    preserve_original: bool,
}

impl NGram {
    /// `min_gram` must be `>= 1` and `<= max_gram`, otherwise `Error::InvalidArgument`.
    pub fn new(min_gram: usize, max_gram: usize, preserve_original: bool) -> Result<Self> {
        if min_gram < 1 {
            return Err(Error::InvalidArgument(
                "min_gram must be at least 1".into(),
            ));
        }
        if min_gram > max_gram {
            return Err(Error::InvalidArgument(
                "min_gram must not exceed max_gram".into(),
            ));
        }

        Ok(Self {
            min_gram,
            max_gram,
            preserve_original,
        })
    }

    fn expand(&self, token: &str) -> Vec<String> {
        let chars: Vec<char> = token.chars().collect();

        if chars.len() <= self.min_gram {
            return vec![token.to_owned()];
        }

        let mut grams = Vec::new();
        if self.preserve_original {
            grams.push(token.to_owned());
        }

        for start in 0..chars.len() {
            for len in self.min_gram..=self.max_gram {
                if start + len > chars.len() {
                    break;
                }
                grams.push(chars[start..start + len].iter().collect());
            }
        }

        grams
    }
}

impl TokenNormaliser for NGram {
    fn normalize(&self, tokens: Vec<String>) -> Vec<String> {
        tokens.iter().flat_map(|t| self.expand(t)).collect()
    }
}

/// Unicode normaliser.
///
/// Performs NFC, NFD, NFKC or NFKD unicode normalisation as defined by the unicode
/// standard. This is character-level canonicalisation, not fuzzy matching: distinct
/// byte sequences that represent the same text collapse to one token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Unicode {
    NFC,
    NFD,
    NFKC,
    NFKD,
}

impl TokenNormaliser for Unicode {
    fn normalize(&self, tokens: Vec<String>) -> Vec<String> {
        tokens
            .into_iter()
            .map(|t| match self {
                Unicode::NFC => t.nfc().collect(),
                Unicode::NFD => t.nfd().collect(),
                Unicode::NFKC => t.nfkc().collect(),
                Unicode::NFKD => t.nfkd().collect(),
            })
            .collect()
    }
}

/// The NLTK English stop word list, lowercased.
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by", "for",
    "with", "about", "against", "between", "into", "through", "during", "before", "after",
    "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over", "under",
    "again", "further", "then", "once", "here", "there", "when", "where", "why", "how", "all",
    "any", "both", "each", "few", "more", "most", "other", "some", "such", "no", "nor", "not",
    "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will", "just", "don",
    "should", "now",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn strs(v: Vec<&str>) -> Vec<String> {
        v.into_iter().map(str::to_owned).collect()
    }

    #[test]
    fn lowercase_folds_every_token() {
        assert_eq!(
            LowerCase.normalize(strs(vec!["Hello", "WORLD"])),
            strs(vec!["hello", "world"])
        );
    }

    #[test]
    fn stopwords_removes_configured_words_and_preserves_order() {
        let normaliser = StopWords::new(&["the", "a"]);
        assert_eq!(
            normaliser.normalize(strs(vec!["the", "cat", "sat", "a", "mat"])),
            strs(vec!["cat", "sat", "mat"])
        );
    }

    #[test]
    fn default_english_stopwords_contains_glossary_entries() {
        let normaliser = StopWords::default_english();
        assert_eq!(normaliser.normalize(strs(vec!["the", "cake"])), strs(vec!["cake"]));
    }

    #[test]
    fn ngram_short_token_passes_through_unchanged() {
        let normaliser = NGram::new(3, 5, false).unwrap();
        assert_eq!(normaliser.normalize(strs(vec!["ab"])), strs(vec!["ab"]));
    }

    #[test]
    fn ngram_expands_by_start_then_length() {
        let normaliser = NGram::new(2, 3, false).unwrap();
        assert_eq!(
            normaliser.normalize(strs(vec!["abcd"])),
            strs(vec!["ab", "abc", "bc", "bcd", "cd"])
        );
    }

    #[test]
    fn ngram_can_preserve_the_original_token() {
        let normaliser = NGram::new(2, 2, true).unwrap();
        assert_eq!(
            normaliser.normalize(strs(vec!["abc"])),
            strs(vec!["abc", "ab", "bc"])
        );
    }

    #[test]
    fn ngram_rejects_zero_min_gram() {
        assert!(matches!(
            NGram::new(0, 3, false),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn ngram_rejects_min_gram_above_max_gram() {
        assert!(matches!(
            NGram::new(4, 3, false),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn unicode_nfc_collapses_combining_sequences() {
        let decomposed = "e\u{0301}"; // e + combining acute accent
        let normaliser = Unicode::NFC;
        let result = normaliser.normalize(vec![decomposed.to_owned()]);
        assert_eq!(result, vec!["\u{00e9}".to_owned()]);
    }
}
