//! This module defines tokenising facilities to split raw text into tokens.
//!
//! A tokeniser is any type that implements [`Tokeniser`]. There are several predefined
//! tokenisers:
//!  * [`WordTokeniser`] - the default; matches maximal runs of unicode word characters
//!    with every decimal digit excluded (a digit splits a run rather than merely
//!    disqualifying whatever run it starts)
//!  * [`RegexTokeniser`] - matches the tokens found by an arbitrary regex
//!  * [`SpaceTokeniser`] - splits input by white space
//!
//! Unlike the corpus this crate grew out of, tokenisation here always runs over an
//! in-memory string rather than an incremental file reader, so a [`Tokeniser`] is a
//! plain, pure function from text to tokens.

use regex::Regex;

/// Tokeniser knows how to split a piece of text into an ordered sequence of tokens.
///
/// Implementations must be pure: the same input text always yields the same output
/// sequence, and empty input yields an empty sequence.
pub trait Tokeniser: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// The default tokeniser.
///
/// Matches maximal runs of unicode word characters (`\w`) with decimal digits excluded
/// from the class entirely, so a digit splits a run rather than merely disqualifying
/// whatever run it happens to start: `"room2you"` yields `["room", "you"]`, `"file_2txt"`
/// yields `["file_", "txt"]`, `"1a"` yields `["a"]`, and `"4.0"` yields no token at all.
pub struct WordTokeniser {
    word_run: Regex,
}

impl WordTokeniser {
    pub fn new() -> Self {
        Self {
            word_run: Regex::new(r"[^\W\d]+").expect("static pattern is valid"),
        }
    }
}

impl Default for WordTokeniser {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokeniser for WordTokeniser {
    fn tokenize(&self, text: &str) -> Vec<String> {
        self.word_run
            .find_iter(text)
            .map(|m| m.as_str().to_owned())
            .collect()
    }
}

/// Tokeniser that emits every match of an arbitrary user-supplied regex.
pub struct RegexTokeniser {
    pattern: Regex,
}

impl RegexTokeniser {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }
}

impl Tokeniser for RegexTokeniser {
    fn tokenize(&self, text: &str) -> Vec<String> {
        self.pattern
            .find_iter(text)
            .map(|m| m.as_str().to_owned())
            .collect()
    }
}

/// Tokeniser that splits the input on runs of white space.
pub struct SpaceTokeniser;

impl Tokeniser for SpaceTokeniser {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split_whitespace().map(|s| s.to_owned()).collect()
    }
}
