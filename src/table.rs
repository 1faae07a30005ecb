//! Source → target symbol table with longest-match lookup.
//!
//! Both columns are stored decomposed (NFD). Targets lose their tone letters
//! at load time unless [`TableOptions::strip_tones`] is turned off. A table
//! is immutable once built; [`SymbolTableBuilder`] is the only way to add
//! entries and it is consumed by `build()`.

mod csv;
mod trie;

use crate::unicode::{canonicalize_in, decode_utf8, needs_case_fold, strip_tone_markers};
use log::{debug, warn};
use smallvec::SmallVec;
use std::{collections::HashMap, fs, path::Path};
use thiserror::Error;
use trie::Trie;

/// A row or file-level problem found while loading a table. Collected on the
/// table, never returned from a constructor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("table `{table}` line {line}: {reason}")]
pub struct MalformedTableError {
    pub table: String,
    /// 1-based; 0 for problems with the file as a whole.
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableOptions {
    /// Remove tone letters (˥˦˧˨˩) from targets.
    pub strip_tones: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self { strip_tones: true }
    }
}

impl TableOptions {
    pub const KEEP_TONES: Self = Self { strip_tones: false };
}

/// One source symbol and every target it was given, in load order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    source: String,
    targets: SmallVec<[String; 1]>,
}

impl SymbolEntry {
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The authoritative (first loaded) target.
    pub fn target(&self) -> &str {
        &self.targets[0]
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }
}

#[derive(Debug, Clone)]
pub struct SymbolTable {
    name: String,
    entries: Vec<SymbolEntry>,
    index: HashMap<String, u32>,
    trie: Trie,
    match_set: Vec<u32>,
    issues: Vec<MalformedTableError>,
}

impl SymbolTable {
    pub fn builder(name: impl Into<String>) -> SymbolTableBuilder {
        SymbolTableBuilder::new(name)
    }

    /// Builds a table from `(source, target)` pairs.
    pub fn load<I, S, T>(name: impl Into<String>, entries: I, options: TableOptions) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self::builder(name)
            .strip_tones(options.strip_tones)
            .entries(entries)
            .build()
    }

    /// Parses a mapping file with an `Orth,Phon` (or `Source,Target`) header.
    pub fn from_csv(name: impl Into<String>, text: &str, options: TableOptions) -> Self {
        let mut builder = Self::builder(name).strip_tones(options.strip_tones);
        let mut rows = csv::records(text);

        match rows.next() {
            None => {
                builder.reject(0, "empty table file");
                return builder.build();
            }
            Some((line, Ok(header))) => {
                let known = header.len() >= 2
                    && matches!(
                        (
                            header[0].trim().to_ascii_lowercase().as_str(),
                            header[1].trim().to_ascii_lowercase().as_str()
                        ),
                        ("orth", "phon") | ("source", "target")
                    );
                if !known {
                    warn!(
                        "table `{}` line {line}: unrecognised header {:?}, reading it as source,target",
                        builder.name, header
                    );
                }
            }
            Some((line, Err(reason))) => builder.reject(line, &reason),
        }

        for (line, record) in rows {
            let record = match record {
                Ok(record) => record,
                Err(reason) => {
                    builder.reject(line, &reason);
                    continue;
                }
            };
            match record.as_slice() {
                [source, ..] if source.is_empty() => builder.reject(line, "empty source"),
                [_] | [] => builder.reject(line, "expected two fields"),
                [source, target, rest @ ..] => {
                    if !rest.is_empty() {
                        builder.reject(line, &format!("{} extra column(s) ignored", rest.len()));
                    }
                    builder = builder.entry(source, target);
                }
            }
        }
        builder.build()
    }

    /// Reads a mapping file. A missing, unreadable or non-UTF-8 file yields
    /// an empty table carrying one issue.
    pub fn from_path(path: impl AsRef<Path>, options: TableOptions) -> Self {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        match fs::read(path).map_err(|e| e.to_string()).and_then(decode_utf8) {
            Ok(text) => Self::from_csv(name, &text, options),
            Err(reason) => {
                let mut builder = Self::builder(name);
                builder.reject(0, &format!("cannot read {}: {reason}", path.display()));
                builder.build()
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, source: &str) -> Option<&SymbolEntry> {
        let id = match self.index.get(source) {
            Some(&id) => id,
            None => *self.index.get(canonicalize_in(source).as_ref())?,
        };
        Some(&self.entries[id as usize])
    }

    /// The entry whose source is the longest prefix of `text`. `text` is
    /// expected to be decomposed already.
    #[inline]
    pub fn longest_match_prefix(&self, text: &str) -> Option<&SymbolEntry> {
        self.trie
            .longest_prefix(text)
            .map(|(id, _)| &self.entries[id as usize])
    }

    /// Sources by descending code-point length, ties in insertion order.
    pub fn match_set(&self) -> impl Iterator<Item = &str> + '_ {
        self.match_set
            .iter()
            .map(|&id| self.entries[id as usize].source.as_str())
    }

    /// Entries in insertion order of their first occurrence.
    pub fn entries(&self) -> &[SymbolEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn issues(&self) -> &[MalformedTableError] {
        &self.issues
    }

    /// Whether any source would be unreachable after case folding.
    pub fn has_uppercase_keys(&self) -> bool {
        self.entries.iter().any(|e| needs_case_fold(&e.source))
    }
}

/// Accumulates entries for a [`SymbolTable`].
#[derive(Debug, Clone)]
pub struct SymbolTableBuilder {
    name: String,
    options: TableOptions,
    entries: Vec<SymbolEntry>,
    index: HashMap<String, u32>,
    issues: Vec<MalformedTableError>,
}

impl SymbolTableBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: TableOptions::default(),
            entries: Vec::new(),
            index: HashMap::new(),
            issues: Vec::new(),
        }
    }

    /// Applies to entries added after this call.
    pub fn strip_tones(mut self, strip: bool) -> Self {
        self.options.strip_tones = strip;
        self
    }

    pub fn entry(mut self, source: impl AsRef<str>, target: impl AsRef<str>) -> Self {
        let source = canonicalize_in(source.as_ref()).into_owned();
        let target = canonicalize_in(target.as_ref());
        let target = if self.options.strip_tones {
            strip_tone_markers(&target).into_owned()
        } else {
            target.into_owned()
        };
        if source.is_empty() {
            self.reject(0, "empty source");
            return self;
        }
        match self.index.get(&source) {
            Some(&id) => self.entries[id as usize].targets.push(target),
            None => {
                self.index.insert(source.clone(), self.entries.len() as u32);
                self.entries.push(SymbolEntry {
                    source,
                    targets: SmallVec::from_iter([target]),
                });
            }
        }
        self
    }

    pub fn entries<I, S, T>(self, entries: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        entries
            .into_iter()
            .fold(self, |builder, (source, target)| builder.entry(source, target))
    }

    fn reject(&mut self, line: usize, reason: &str) {
        let issue = MalformedTableError {
            table: self.name.clone(),
            line,
            reason: reason.to_owned(),
        };
        warn!("{issue}");
        self.issues.push(issue);
    }

    pub fn build(self) -> SymbolTable {
        let mut trie = Trie::default();
        for (id, entry) in self.entries.iter().enumerate() {
            trie.insert(&entry.source, id as u32);
        }
        let mut match_set: Vec<u32> = (0..self.entries.len() as u32).collect();
        match_set.sort_by_key(|&id| std::cmp::Reverse(self.entries[id as usize].source.chars().count()));

        debug!(
            "table `{}`: {} entries, {} trie nodes, {} issues",
            self.name,
            self.entries.len(),
            trie.node_count(),
            self.issues.len()
        );
        SymbolTable {
            name: self.name,
            entries: self.entries,
            index: self.index,
            trie,
            match_set,
            issues: self.issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KANA: &str = "\
Orth,Phon
か,ka
が,ɡa
きゃ,kʲa
き,kʲi
ん,ɴ
ー,ː
";

    fn kana() -> SymbolTable {
        SymbolTable::from_csv("kana", KANA, TableOptions::default())
    }

    #[test]
    fn longest_match_beats_shorter_key() {
        let table = SymbolTable::load("t", [("a", "x"), ("ab", "y")], TableOptions::default());
        assert_eq!(table.longest_match_prefix("abc").map(SymbolEntry::target), Some("y"));
        assert_eq!(table.longest_match_prefix("ac").map(SymbolEntry::target), Some("x"));
        assert!(table.longest_match_prefix("c").is_none());
    }

    #[test]
    fn loads_csv_and_decomposes() {
        let table = kana();
        assert!(table.issues().is_empty(), "{:?}", table.issues());
        assert_eq!(table.len(), 6);
        // が is stored as か + U+3099
        let ga = table.get("が").unwrap();
        assert_eq!(ga.source(), "か\u{3099}");
        assert_eq!(table.longest_match_prefix("か\u{3099}").map(SymbolEntry::target), Some("ɡa"));
        assert_eq!(table.longest_match_prefix("きゃく").map(SymbolEntry::target), Some("kʲa"));
    }

    #[test]
    fn match_set_is_longest_first_then_insertion_order() {
        let table = kana();
        let keys: Vec<&str> = table.match_set().collect();
        // が decomposes to two code points and sorts with きゃ
        assert_eq!(keys, ["か\u{3099}", "きゃ", "か", "き", "ん", "ー"]);
    }

    #[test]
    fn duplicate_sources_keep_first_target() {
        let table = SymbolTable::load(
            "dup",
            [("ʃ", "sh"), ("ʃ", "sch"), ("a", "a")],
            TableOptions::default(),
        );
        let entry = table.get("ʃ").unwrap();
        assert_eq!(entry.target(), "sh");
        assert_eq!(entry.targets(), ["sh", "sch"]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn tone_letters_stripped_by_default() {
        let rows = [("ma", "ma˥˩")];
        let stripped = SymbolTable::load("t", rows, TableOptions::default());
        assert_eq!(stripped.get("ma").unwrap().target(), "ma");
        let kept = SymbolTable::load("t", rows, TableOptions::KEEP_TONES);
        assert_eq!(kept.get("ma").unwrap().target(), "ma˥˩");
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let csv = "Orth,Phon\nka,ka\nbroken\n,empty\nsa,sa,extra\n\"open,x\nん,\n";
        let table = SymbolTable::from_csv("bad", csv, TableOptions::default());
        let lines: Vec<usize> = table.issues().iter().map(|i| i.line).collect();
        assert_eq!(lines, [3, 4, 5, 6]);
        assert_eq!(table.get("sa").map(SymbolEntry::target), Some("sa"));
        // empty target is a valid deletion
        assert_eq!(table.get("ん").map(SymbolEntry::target), Some(""));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn quoted_punctuation_keys() {
        let csv = "Source,Target\n\",\",\n\"\"\"\",\n";
        let table = SymbolTable::from_csv("punct", csv, TableOptions::default());
        assert!(table.issues().is_empty());
        assert!(table.get(",").is_some());
        assert!(table.get("\"").is_some());
    }

    #[test]
    fn unknown_header_is_accepted() {
        let table = SymbolTable::from_csv("h", "grapheme,ipa\nx,ks\n", TableOptions::default());
        assert!(table.issues().is_empty());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn missing_or_empty_file_yields_empty_table() {
        let missing = SymbolTable::from_path("/no/such/table.csv", TableOptions::default());
        assert!(missing.is_empty());
        assert_eq!(missing.issues().len(), 1);
        assert_eq!(missing.name(), "table");

        let empty = SymbolTable::from_csv("empty", "", TableOptions::default());
        assert!(empty.is_empty());
        assert_eq!(empty.issues()[0].line, 0);
    }

    #[test]
    fn invalid_utf8_file_yields_empty_table() -> std::io::Result<()> {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(b"Orth,Phon\n\xff\xfe,x\n")?;
        let table = SymbolTable::from_path(file.path(), TableOptions::default());
        assert!(table.is_empty());
        assert_eq!(table.issues().len(), 1);
        Ok(())
    }

    #[test]
    fn uppercase_keys_detected() {
        assert!(!kana().has_uppercase_keys());
        let labels = SymbolTable::load("l", [("a", "a"), ("A", "ḁ")], TableOptions::default());
        assert!(labels.has_uppercase_keys());
    }
}
