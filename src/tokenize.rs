//! Word tokenizer for titles and self-text.

use regex::Regex;
use std::collections::BTreeSet;

/// Distinct tokens of one record (title ∪ body), in sorted order.
pub type TokenSet = BTreeSet<String>;

/// Splits text on word boundaries, lowercases, and drops noise tokens.
#[derive(Clone, Debug)]
pub struct Tokenizer {
    word_re: Regex,
    stop_words: Vec<String>, // sorted for binary_search
}

impl Tokenizer {
    pub fn new<I, S>(stop_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        // Runs of letters/digits/underscore, allowing inner apostrophes ("don't", "reddit’s").
        let word_re = Regex::new(r"[\w]+(?:['’][\w]+)*").expect("static regex");
        let mut stop_words: Vec<String> = stop_words.into_iter().map(|s| s.as_ref().trim().to_lowercase()).collect();
        stop_words.sort();
        stop_words.dedup();
        Self { word_re, stop_words }
    }

    /// Lazily yield kept tokens of `text`.
    pub fn tokens<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        self.word_re
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .filter(move |tok| self.keep(tok))
    }

    /// A token is kept when it has at least one ASCII lowercase letter and is not a stop word.
    pub fn keep(&self, token: &str) -> bool {
        token.bytes().any(|b| b.is_ascii_lowercase()) && self.stop_words.binary_search_by(|s| s.as_str().cmp(token)).is_err()
    }

    /// Union of the tokens of all `fields`, each token once.
    pub fn token_set<'a, I>(&self, fields: I) -> TokenSet
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut set = TokenSet::new();
        for text in fields {
            set.extend(self.tokens(text));
        }
        set
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(["ref"])
    }
}
