//! Greedy longest-match tokenization against a [`SymbolTable`].
//!
//! Matching is case-sensitive by construction. Sessions that want
//! case-insensitive lookup fold the text before it gets here.

use crate::{
    table::SymbolTable,
    unicode::{is_any_whitespace, is_combining_mark},
};
use std::{borrow::Cow, collections::BTreeMap, fmt};

/// Coarse class of a token's source, for filtering when joining targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Letter,
    Mark,
    Number,
    Punctuation,
    Separator,
    Other,
}

impl Category {
    /// Classifies by the first character of `symbol`.
    pub fn of(symbol: &str) -> Self {
        let Some(c) = symbol.chars().next() else {
            return Category::Other;
        };
        if is_any_whitespace(c) {
            Category::Separator
        } else if is_combining_mark(c) {
            Category::Mark
        } else if c.is_alphabetic() {
            Category::Letter
        } else if c.is_numeric() {
            Category::Number
        } else if is_punctuation(c) {
            Category::Punctuation
        } else {
            Category::Other
        }
    }
}

#[inline]
fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
        || matches!(c as u32,
            0x00A1 | 0x00A7 | 0x00AB | 0x00B6 | 0x00B7 | 0x00BB | 0x00BF |
            0x2010..=0x2027 | // dashes, quotes, bullets
            0x2030..=0x205E | // per mille through four dot mark
            0x3001..=0x3003 | // ideographic comma and full stop
            0x3008..=0x3011 | // CJK brackets
            0x30FB |          // katakana middle dot
            0xFF01..=0xFF0F | 0xFF1A..=0xFF20 | 0xFF3B..=0xFF40 | 0xFF5B..=0xFF65
        )
}

/// One tokenizer step.
///
/// `source` borrows from the tokenized text; `target` borrows from the table
/// for a match, from the text otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub source: Cow<'a, str>,
    pub target: Cow<'a, str>,
    pub matched: bool,
}

impl<'a> Token<'a> {
    pub fn matched(source: &'a str, target: &'a str) -> Self {
        Self {
            source: Cow::Borrowed(source),
            target: Cow::Borrowed(target),
            matched: true,
        }
    }

    pub fn unmatched(symbol: &'a str) -> Self {
        Self {
            source: Cow::Borrowed(symbol),
            target: Cow::Borrowed(symbol),
            matched: false,
        }
    }

    pub fn category(&self) -> Category {
        Category::of(&self.source)
    }

    pub fn into_owned(self) -> Token<'static> {
        Token {
            source: Cow::Owned(self.source.into_owned()),
            target: Cow::Owned(self.target.into_owned()),
            matched: self.matched,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Occurrences {
    count: usize,
    offsets: Vec<usize>,
}

/// Unmatched symbols of one call: how often, and at which character offsets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnmatchedTally {
    symbols: BTreeMap<String, Occurrences>,
}

impl UnmatchedTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, symbol: &str, offset: usize) {
        let entry = self.symbols.entry(symbol.to_owned()).or_default();
        entry.count += 1;
        entry.offsets.push(offset);
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Number of distinct unmatched symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Number of unmatched occurrences overall.
    pub fn total(&self) -> usize {
        self.symbols.values().map(|o| o.count).sum()
    }

    pub fn count(&self, symbol: &str) -> usize {
        self.symbols.get(symbol).map_or(0, |o| o.count)
    }

    pub fn offsets(&self, symbol: &str) -> &[usize] {
        self.symbols.get(symbol).map_or(&[][..], |o| o.offsets.as_slice())
    }

    /// `(symbol, count)` in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.symbols.iter().map(|(s, o)| (s.as_str(), o.count))
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.symbols.retain(|s, _| keep(s));
    }

    pub fn merge(&mut self, other: UnmatchedTally) {
        for (symbol, occ) in other.symbols {
            let entry = self.symbols.entry(symbol).or_default();
            entry.count += occ.count;
            entry.offsets.extend(occ.offsets);
        }
    }

    /// Moves every offset by `by`, for tallies of a sub-sequence.
    pub(crate) fn shift(&mut self, by: usize) {
        for occ in self.symbols.values_mut() {
            occ.offsets.iter_mut().for_each(|o| *o += by);
        }
    }
}

impl fmt::Display for UnmatchedTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (symbol, count)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{symbol:?}×{count}")?;
        }
        Ok(())
    }
}

/// Tokens of one text plus its unmatched-symbol tally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokenization<'a> {
    pub tokens: Vec<Token<'a>>,
    pub tally: UnmatchedTally,
}

impl<'a> Tokenization<'a> {
    /// Concatenated targets.
    pub fn targets(&self) -> String {
        self.targets_where(|_| true)
    }

    /// Concatenated targets of the tokens `keep` accepts.
    pub fn targets_where(&self, mut keep: impl FnMut(&Token<'a>) -> bool) -> String {
        let mut out = String::with_capacity(self.tokens.iter().map(|t| t.target.len()).sum());
        for token in self.tokens.iter().filter(|&t| keep(t)) {
            out.push_str(&token.target);
        }
        out
    }

    pub fn into_owned(self) -> Tokenization<'static> {
        Tokenization {
            tokens: self.tokens.into_iter().map(Token::into_owned).collect(),
            tally: self.tally,
        }
    }
}

/// Consumes `text` left to right, always taking the longest table key that
/// prefixes the remaining text. A position no key covers yields one
/// unmatched token of exactly one `char`, which is tallied.
pub fn tokenize<'a>(text: &'a str, table: &'a SymbolTable) -> Tokenization<'a> {
    let mut tokens = Vec::with_capacity(text.len() / 2 + 1);
    let mut tally = UnmatchedTally::new();
    let mut pos = 0;
    let mut chars_seen = 0;

    while let Some(c) = text[pos..].chars().next() {
        let rest = &text[pos..];
        match table.longest_match_prefix(rest) {
            Some(entry) => {
                let len = entry.source().len();
                tokens.push(Token::matched(&rest[..len], entry.target()));
                chars_seen += entry.source().chars().count();
                pos += len;
            }
            None => {
                let symbol = &rest[..c.len_utf8()];
                tally.record(symbol, chars_seen);
                tokens.push(Token::unmatched(symbol));
                chars_seen += 1;
                pos += c.len_utf8();
            }
        }
    }

    Tokenization { tokens, tally }
}
