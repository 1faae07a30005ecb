pub mod pipeline;
pub mod profile;
pub mod rules;
pub mod segment;
pub mod stage;
pub mod table;
pub mod token;
pub mod translit;
pub mod unicode;

#[cfg(test)]
pub(crate) mod testing;

pub use pipeline::Pipeline;
pub use profile::Profile;
pub use profile::preset::{ARPABET, ORTHOGRAPHIC, PHONEME_LABELS};
pub use rules::{MalformedRuleError, RuleSet, SymbolClass};
pub use segment::{Delimiters, Segment, join, split_on_delimiters};
pub use stage::{FoldCase, NFC, NFD, Rewrite, Stage};
pub use table::{MalformedTableError, SymbolEntry, SymbolTable, SymbolTableBuilder, TableOptions};
pub use token::{Category, Token, Tokenization, UnmatchedTally, tokenize};
pub use translit::{
    Phase, TokenFilter, Transliteration, Transliterator, TransliteratorBuilder,
    UnmappedSymbolError,
};
