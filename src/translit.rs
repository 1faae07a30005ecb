//! The transliteration session: normalization, pre-processing rules,
//! longest-match lookup, post-processing rules and recomposition.
//!
//! A call walks the phases `Start → Normalized → PreProcessed → Tokenized →
//! PostProcessed → Finalized` in order. Rule phases with no rules configured
//! pass the text through untouched. The unmatched-symbol tally belongs to
//! the call, so one [`Transliterator`] can serve many threads at once.

use crate::{
    pipeline::Pipeline,
    profile::Profile,
    rules::RuleSet,
    segment::{self, Delimiters, split_labels, split_on_delimiters},
    stage::{FoldCase, NFC, NFD, Rewrite, Stage},
    table::SymbolTable,
    token::{Token, Tokenization, UnmatchedTally, tokenize},
    unicode::{fold_case, is_any_whitespace},
};
use log::{debug, trace, warn};
use std::{borrow::Cow, sync::Arc};
use thiserror::Error;

/// One or more input symbols had no table entry and validation was on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} unmapped symbol(s) in `{input}` (table `{table}`): {tally}", tally.total())]
pub struct UnmappedSymbolError {
    /// The text (or space-joined label sequence) passed to the call.
    pub input: String,
    pub table: String,
    pub tally: UnmatchedTally,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Start,
    Normalized,
    PreProcessed,
    Tokenized,
    PostProcessed,
    Finalized,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::Start,
        Phase::Normalized,
        Phase::PreProcessed,
        Phase::Tokenized,
        Phase::PostProcessed,
        Phase::Finalized,
    ];
}

/// Everything a call produced, not just the output string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transliteration {
    tokens: Vec<Token<'static>>,
    tally: UnmatchedTally,
    snapshots: [String; 6],
}

impl Transliteration {
    pub fn output(&self) -> &str {
        self.snapshot(Phase::Finalized)
    }

    pub fn into_output(self) -> String {
        let [.., output] = self.snapshots;
        output
    }

    /// The text as it stood when `phase` was reached.
    pub fn snapshot(&self, phase: Phase) -> &str {
        &self.snapshots[phase as usize]
    }

    /// Concatenated table targets before post-processing.
    pub fn mapped(&self) -> &str {
        self.snapshot(Phase::Tokenized)
    }

    pub fn tokens(&self) -> &[Token<'static>] {
        &self.tokens
    }

    pub fn tally(&self) -> &UnmatchedTally {
        &self.tally
    }
}

/// Decides which tokens contribute their target to the mapped string.
pub type TokenFilter = fn(&Token<'_>) -> bool;

fn keep_every_token(_: &Token<'_>) -> bool {
    true
}

/// A configured session. Built once, then only read.
#[derive(Debug, Clone)]
pub struct Transliterator {
    table: Arc<SymbolTable>,
    normalize: Pipeline,
    preprocess: Pipeline,
    postprocess: Pipeline,
    token_filter: TokenFilter,
    case_sensitive: bool,
    validate: bool,
    strip_stress: bool,
    delimiters: Delimiters,
    separator: String,
}

impl Transliterator {
    pub fn builder(table: impl Into<Arc<SymbolTable>>) -> TransliteratorBuilder {
        TransliteratorBuilder::new(table)
    }

    /// Case-sensitive, validating, no rules.
    pub fn new(table: impl Into<Arc<SymbolTable>>) -> Self {
        Self::builder(table).build()
    }

    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    pub fn validates(&self) -> bool {
        self.validate
    }

    pub fn transliterate(&self, text: &str, validate: bool) -> Result<String, UnmappedSymbolError> {
        self.run(text, validate, None)
    }

    /// [`Transliterator::transliterate`] with the session's `validate` flag.
    pub fn transliterate_default(&self, text: &str) -> Result<String, UnmappedSymbolError> {
        self.transliterate(text, self.validate)
    }

    pub fn transliterate_detailed(
        &self,
        text: &str,
        validate: bool,
    ) -> Result<Transliteration, UnmappedSymbolError> {
        let mut detail = Detail::default();
        let output = self.run(text, validate, Some(&mut detail))?;
        let [start, normalized, pre, mapped, post] = detail.snapshots;
        Ok(Transliteration {
            tokens: detail.tokens,
            tally: detail.tally,
            snapshots: [start, normalized, pre, mapped, post, output],
        })
    }

    /// Segmented mode: strips stress digits if configured, splits on the
    /// session delimiters, transliterates each segment's labels as one
    /// string and joins the results with the separator. Case-insensitive
    /// sessions fold the labels before looking for delimiters.
    ///
    /// With `validate`, the tallies of all segments are checked together and
    /// nothing is returned if any segment had an unmapped symbol. Tally
    /// offsets count characters of all labels written back to back,
    /// delimiters included.
    pub fn transliterate_labels<S: AsRef<str>>(
        &self,
        labels: &[S],
        validate: bool,
    ) -> Result<String, UnmappedSymbolError> {
        let input = || {
            labels
                .iter()
                .map(|l| l.as_ref())
                .collect::<Vec<&str>>()
                .join(" ")
        };
        let labels: Vec<Cow<'_, str>> = labels
            .iter()
            .map(|l| {
                let l = l.as_ref();
                let l = if self.strip_stress { segment::strip_stress(l) } else { l };
                if self.case_sensitive { Cow::Borrowed(l) } else { fold_case(l) }
            })
            .collect();

        let segments = split_on_delimiters(&labels, &self.delimiters);
        trace!("{} labels in {} segment(s)", labels.len(), segments.len());

        let mut outputs = Vec::with_capacity(segments.len());
        let mut tally = UnmatchedTally::new();
        let mut consumed = 0;
        let mut chars_before = 0;
        for segment in &segments {
            chars_before += labels[consumed..segment.offset]
                .iter()
                .map(|l| l.chars().count())
                .sum::<usize>();
            consumed = segment.offset;

            let text = segment.concat();
            let mut segment_tally = UnmatchedTally::new();
            let output = self.execute(&text, &mut segment_tally, None);
            segment_tally.shift(chars_before);
            tally.merge(segment_tally);
            outputs.push(output);
        }

        if validate {
            self.check(&input(), tally)?;
        }
        Ok(segment::join(outputs, &self.separator))
    }

    /// [`Transliterator::transliterate_labels`] over a whitespace-separated
    /// label string.
    pub fn transliterate_label_text(
        &self,
        text: &str,
        validate: bool,
    ) -> Result<String, UnmappedSymbolError> {
        self.transliterate_labels(&split_labels(text), validate)
    }

    fn run(
        &self,
        text: &str,
        validate: bool,
        mut detail: Option<&mut Detail>,
    ) -> Result<String, UnmappedSymbolError> {
        let mut tally = UnmatchedTally::new();
        let output = self.execute(text, &mut tally, detail.as_deref_mut());
        if validate {
            self.check(text, tally.clone())?;
        }
        if let Some(detail) = detail {
            detail.tally = tally;
        }
        Ok(output)
    }

    fn execute(
        &self,
        text: &str,
        tally: &mut UnmatchedTally,
        mut detail: Option<&mut Detail>,
    ) -> String {
        let mut observe = |phase: Phase, text: &str| {
            trace!("{phase:?}: {text:?}");
            if let Some(detail) = detail.as_deref_mut() {
                detail.snapshots[phase as usize] = text.to_owned();
            }
        };
        observe(Phase::Start, text);

        let normalized = self.normalize.process(Cow::Borrowed(text));
        observe(Phase::Normalized, &normalized);

        let pre = self.preprocess.process(normalized);
        observe(Phase::PreProcessed, &pre);

        let tokenization = tokenize(&pre, &self.table);
        let joined = tokenization.targets_where(self.token_filter);
        observe(Phase::Tokenized, &joined);

        let post = self.postprocess.process(Cow::Owned(joined));
        observe(Phase::PostProcessed, &post);

        let Tokenization { tokens, tally: found } = tokenization;
        if let Some(detail) = detail {
            detail.tokens = tokens.into_iter().map(Token::into_owned).collect();
        }
        *tally = found;

        let output = NFC.apply(post).into_owned();
        trace!("{:?}: {output:?}", Phase::Finalized);
        output
    }

    /// Drops what validation ignores and fails if anything is left.
    fn check(&self, input: &str, mut tally: UnmatchedTally) -> Result<(), UnmappedSymbolError> {
        tally.retain(|symbol| !self.is_ignorable(symbol));
        if tally.is_empty() {
            return Ok(());
        }
        Err(UnmappedSymbolError {
            input: input.to_owned(),
            table: self.table.name().to_owned(),
            tally,
        })
    }

    fn is_ignorable(&self, symbol: &str) -> bool {
        symbol.chars().all(is_any_whitespace)
            || symbol == self.separator
            || self.delimiters.contains(symbol)
    }
}

#[derive(Debug, Default)]
struct Detail {
    snapshots: [String; 5],
    tokens: Vec<Token<'static>>,
    tally: UnmatchedTally,
}

/// Configures a [`Transliterator`]. Consumed by [`TransliteratorBuilder::build`].
#[derive(Debug, Clone)]
pub struct TransliteratorBuilder {
    table: Arc<SymbolTable>,
    preprocess: Option<Arc<RuleSet>>,
    postprocess: Option<Arc<RuleSet>>,
    token_filter: TokenFilter,
    case_sensitive: bool,
    validate: bool,
    strip_stress: bool,
    delimiters: Delimiters,
    separator: String,
}

impl TransliteratorBuilder {
    pub fn new(table: impl Into<Arc<SymbolTable>>) -> Self {
        Self {
            table: table.into(),
            preprocess: None,
            postprocess: None,
            token_filter: keep_every_token,
            case_sensitive: true,
            validate: true,
            strip_stress: false,
            delimiters: Delimiters::default(),
            separator: " ".to_owned(),
        }
    }

    pub fn preprocess(mut self, rules: impl Into<Arc<RuleSet>>) -> Self {
        self.preprocess = Some(rules.into());
        self
    }

    pub fn postprocess(mut self, rules: impl Into<Arc<RuleSet>>) -> Self {
        self.postprocess = Some(rules.into());
        self
    }

    /// Only tokens `filter` accepts add their target to the mapped string,
    /// e.g. `|t| t.category() != Category::Punctuation`. Every token is still
    /// tallied and reported by [`Transliteration::tokens`].
    pub fn token_filter(mut self, filter: TokenFilter) -> Self {
        self.token_filter = filter;
        self
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Default for [`Transliterator::transliterate_default`].
    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn strip_stress(mut self, strip_stress: bool) -> Self {
        self.strip_stress = strip_stress;
        self
    }

    pub fn delimiters<I>(mut self, delimiters: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.delimiters = Delimiters::new(delimiters);
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Applies every switch of `profile`.
    pub fn profile(self, profile: &Profile) -> Self {
        self.case_sensitive(profile.case_sensitive)
            .validate(profile.validate)
            .strip_stress(profile.strip_stress)
            .delimiters(profile.delimiters.iter().copied())
            .separator(profile.separator)
    }

    pub fn build(self) -> Transliterator {
        let mut normalize = Pipeline::default();
        normalize.push(NFD);
        let mut delimiters = self.delimiters;
        if !self.case_sensitive {
            delimiters = Delimiters::new(delimiters.iter().map(|d| fold_case(d).into_owned()));
            normalize.push(FoldCase);
            if self.table.has_uppercase_keys() {
                warn!(
                    "table `{}` has upper-case sources that a case-insensitive session can never match",
                    self.table.name()
                );
            }
        }

        let rewrite = |rules: Option<Arc<RuleSet>>, stage: fn(Arc<RuleSet>) -> Rewrite| {
            let mut pipeline = Pipeline::default();
            if let Some(rules) = rules.filter(|r| !r.is_empty()) {
                pipeline.push(stage(rules));
            }
            pipeline
        };
        let preprocess = rewrite(self.preprocess, |r| Rewrite::preprocess(r));
        let postprocess = rewrite(self.postprocess, |r| Rewrite::postprocess(r));

        debug!(
            "transliterator over `{}`: normalize {:?}, pre {:?}, post {:?}, validate {}",
            self.table.name(),
            normalize,
            preprocess,
            postprocess,
            self.validate
        );

        Transliterator {
            table: self.table,
            normalize,
            preprocess,
            postprocess,
            token_filter: self.token_filter,
            case_sensitive: self.case_sensitive,
            validate: self.validate,
            strip_stress: self.strip_stress,
            delimiters,
            separator: self.separator,
        }
    }
}
