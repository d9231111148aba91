//! Pattern compiler for `hears` registrations.
//!
//! A pattern is literal text with zero or more `{name}` placeholders:
//!
//! ```text
//! "I am {name} the {attribute}"
//! ```
//!
//! Compilation is a two-stage pipeline so each step can be tested on its own:
//!
//! 1. [`tokenize`] splits the pattern into literal and placeholder tokens.
//! 2. [`build`] escapes the literals, turns every placeholder into a greedy
//!    capture group and compiles an anchored, case-insensitive [`Regex`].
//!
//! # Adjacent placeholders
//!
//! `"{a}{b}"` is accepted, but nothing separates the two captures. Matching is
//! greedy, so `a` takes as much as it can and `b` gets the rest (`"hello"`
//! yields `a = "hell"`, `b = "o"`). Put literal text between placeholders when
//! the split matters.
//!
//! # Line breaks
//!
//! Placeholders do not match across a line break, and the expression is
//! anchored at both ends. A message with a trailing newline (`"hi Julia\n"`)
//! therefore does not match `"hi {name}"`.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use regex::{Regex, RegexBuilder};

use crate::error::{PatternError, PatternResult};

/// Expression substituted for each placeholder.
const CAPTURE_GROUP: &str = "(.+)";

/// A lexical piece of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Text that must match literally (case-insensitively).
    Literal(&'a str),
    /// A `{name}` placeholder, holding the bare name.
    Placeholder(&'a str),
}

/// Splits a pattern into literal and placeholder tokens.
///
/// Only a brace pair around a non-empty run of word characters (letters,
/// digits, `_`) is a placeholder. Any other brace is literal text, so
/// `"smile :}"`, `"use {} here"` and `"json {a b}"` are plain literals.
pub fn tokenize(pattern: &str) -> PatternResult<Vec<Token<'_>>> {
    if pattern.is_empty() {
        return Err(PatternError::Empty);
    }

    let mut tokens = Vec::new();
    let mut literal_start = 0;
    let mut cursor = 0;

    while let Some(offset) = pattern[cursor..].find('{') {
        let open = cursor + offset;
        let body = &pattern[open + 1..];
        let name_len = body.find(|c: char| !is_word_char(c)).unwrap_or(body.len());

        if name_len == 0 || !body[name_len..].starts_with('}') {
            cursor = open + 1;
            continue;
        }

        if literal_start < open {
            tokens.push(Token::Literal(&pattern[literal_start..open]));
        }
        tokens.push(Token::Placeholder(&body[..name_len]));
        literal_start = open + name_len + 2;
        cursor = literal_start;
    }

    if literal_start < pattern.len() {
        tokens.push(Token::Literal(&pattern[literal_start..]));
    }

    Ok(tokens)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Builds a matcher from tokens produced by [`tokenize`].
pub fn build(raw: &str, tokens: &[Token<'_>]) -> PatternResult<CompiledPattern> {
    let mut source = String::from("^");
    let mut param_names = Vec::new();
    let mut seen = HashSet::new();

    for token in tokens {
        match token {
            Token::Literal(text) => source.push_str(&regex::escape(text)),
            Token::Placeholder(name) => {
                if !seen.insert(*name) {
                    return Err(PatternError::DuplicatePlaceholder {
                        name: (*name).to_string(),
                    });
                }
                param_names.push((*name).to_string());
                source.push_str(CAPTURE_GROUP);
            }
        }
    }
    source.push('$');

    let regex = RegexBuilder::new(&source).case_insensitive(true).build()?;

    Ok(CompiledPattern {
        raw: raw.to_string(),
        regex,
        param_names,
    })
}

/// A compiled `hears` pattern.
#[derive(Clone)]
pub struct CompiledPattern {
    raw: String,
    regex: Regex,
    param_names: Vec<String>,
}

impl CompiledPattern {
    /// Tokenizes and builds `pattern`.
    pub fn compile(pattern: &str) -> PatternResult<Self> {
        let tokens = tokenize(pattern)?;
        build(pattern, &tokens)
    }

    /// The pattern as it was registered.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Placeholder names in declaration order.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// The generated expression.
    pub fn as_regex(&self) -> &Regex {
        &self.regex
    }

    /// Returns `true` if `text` matches the whole pattern.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Matches `text` against the whole pattern and returns the captured
    /// values in placeholder order.
    pub fn captures(&self, text: &str) -> Option<Vec<String>> {
        let caps = self.regex.captures(text)?;
        Some(
            (1..=self.param_names.len())
                .map(|i| caps.get(i).map_or_else(String::new, |m| m.as_str().to_string()))
                .collect(),
        )
    }
}

impl FromStr for CompiledPattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

impl fmt::Debug for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPattern")
            .field("raw", &self.raw)
            .field("regex", &self.regex.as_str())
            .field("param_names", &self.param_names)
            .finish()
    }
}
