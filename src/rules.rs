//! Ordered, context-sensitive rewrite rules.
//!
//! A rule file is line oriented:
//!
//! ```text
//! % comment
//! ::vowel:: = a|e|i|o|ɯ
//! ɴ -> m / _ (p|b|m)
//! ʔ -> 0 / _ #
//! ```
//!
//! Rules run once each, in file order, over the output of the previous rule.
//! Nothing is reordered, and a rule that references an undeclared or empty
//! class simply never fires.

mod matcher;
mod parse;

use crate::unicode::decode_utf8;
use log::debug;
use smallvec::SmallVec;
use std::{borrow::Cow, collections::HashMap, fs, path::Path};
use thiserror::Error;

/// A rule or class line that could not be compiled. The line is dropped;
/// every other line of the file still loads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("rule line {line}: {reason} (`{text}`)")]
pub struct MalformedRuleError {
    pub line: usize,
    pub text: String,
    pub reason: String,
}

pub(crate) type ClassId = usize;

/// A named set of literal symbols, e.g. `::vowel:: = a|e|i|o|ɯ`.
///
/// Inline groups such as `(p|b|m)` become anonymous classes named after
/// their own source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolClass {
    name: String,
    members: Vec<String>,
}

impl SymbolClass {
    pub(crate) fn new(name: impl Into<String>, members: Vec<String>) -> Self {
        Self {
            name: name.into(),
            members,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Members in declaration order.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.members.iter().any(|m| m == symbol)
    }
}

/// One compiled step of a rule: the left context, the pattern and the right
/// context are laid out as a single sequence, with marks around the pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Step {
    /// `#` at the start of the left context.
    Start,
    /// `#` at the end of the right context.
    End,
    Literal(String),
    Class {
        class: ClassId,
        capture: Option<usize>,
    },
    PatternStart,
    PatternEnd,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Piece {
    Literal(String),
    /// The symbol captured by the `ordinal`-th pattern class, re-expressed as
    /// the member with the same index in `class`.
    Capture { ordinal: usize, class: ClassId },
}

/// A compiled `pattern -> replacement / left _ right` rule.
#[derive(Debug, Clone)]
pub struct Rule {
    line: usize,
    text: String,
    steps: SmallVec<[Step; 6]>,
    replacement: SmallVec<[Piece; 2]>,
    captures: usize,
    anchored_start: bool,
    first_literal: Option<String>,
    /// Writes an empty class back; matches are never rewritten.
    inert: bool,
}

impl Rule {
    /// Line number in the file the rule came from (1-based).
    pub fn line(&self) -> usize {
        self.line
    }

    /// The rule as written (after decomposition).
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// An ordered list of rules plus the classes they reference.
///
/// Immutable once built; share it behind an `Arc` across threads.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    name: String,
    rules: Vec<Rule>,
    classes: Vec<SymbolClass>,
    class_index: HashMap<String, ClassId>,
    issues: Vec<MalformedRuleError>,
}

impl RuleSet {
    /// A rule set with no rules – applying it is the identity.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a rule set from separate rule and class-declaration lines.
    ///
    /// Classes are resolved after every declaration has been read, so their
    /// order relative to the rules does not matter.
    pub fn load<R, C>(rule_lines: R, class_lines: C) -> Self
    where
        R: IntoIterator,
        R::Item: AsRef<str>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let mut parser = parse::Parser::default();
        for (i, line) in class_lines.into_iter().enumerate() {
            parser.declaration_line(i + 1, line.as_ref());
        }
        let rules: Vec<(usize, String)> = rule_lines
            .into_iter()
            .enumerate()
            .map(|(i, l)| (i + 1, l.as_ref().to_owned()))
            .collect();
        parser.finish("inline", rules)
    }

    /// Parses one combined file where class declarations and rules are
    /// interleaved.
    pub fn parse(text: &str) -> Self {
        Self::parse_named("inline", text)
    }

    pub fn parse_named(name: &str, text: &str) -> Self {
        let mut parser = parse::Parser::default();
        let mut rules = Vec::new();
        for (i, line) in text.lines().enumerate() {
            if parse::is_class_declaration(line) {
                parser.declaration_line(i + 1, line);
            } else {
                rules.push((i + 1, line.to_owned()));
            }
        }
        parser.finish(name, rules)
    }

    /// Reads a rule file. A missing or undecodable file yields an empty rule
    /// set carrying a single issue.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path.display().to_string();
        let text = fs::read(path)
            .map_err(|e| e.to_string())
            .and_then(decode_utf8);
        match text {
            Ok(text) => Self::parse_named(&name, &text),
            Err(reason) => {
                let issue = MalformedRuleError {
                    line: 0,
                    text: name.clone(),
                    reason: format!("cannot read rule file: {reason}"),
                };
                log::warn!("{issue}");
                Self {
                    name,
                    issues: vec![issue],
                    ..Self::default()
                }
            }
        }
    }

    /// Runs every rule once, in declared order, each over the output of the
    /// previous one. Borrows when no rule fired.
    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let mut current = Cow::Borrowed(text);
        for rule in &self.rules {
            if let Some(rewritten) = rule.rewrite(&current, &self.classes) {
                current = Cow::Owned(rewritten);
            }
        }
        current
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Looks up a declared class by bare name (`vowel`) or by its
    /// delimited form (`::vowel::`).
    pub fn class(&self, name: &str) -> Option<&SymbolClass> {
        let bare = name
            .strip_prefix("::")
            .and_then(|n| n.strip_suffix("::"))
            .unwrap_or(name);
        self.class_index.get(bare).map(|&id| &self.classes[id])
    }

    pub fn issues(&self) -> &[MalformedRuleError] {
        &self.issues
    }

    pub(crate) fn from_parts(
        name: &str,
        rules: Vec<Rule>,
        classes: Vec<SymbolClass>,
        class_index: HashMap<String, ClassId>,
        issues: Vec<MalformedRuleError>,
    ) -> Self {
        debug!(
            "rule set `{name}`: {} rules, {} classes, {} issues",
            rules.len(),
            class_index.len(),
            issues.len()
        );
        Self {
            name: name.to_owned(),
            rules,
            classes,
            class_index,
            issues,
        }
    }
}
