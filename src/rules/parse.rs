//! Line parser for class declarations and rules.
//!
//! Rules are parsed in two passes: every class declaration is collected
//! first, then each rule line is compiled against the finished class table.
use super::{ClassId, MalformedRuleError, Piece, Rule, RuleSet, Step, SymbolClass};
use crate::unicode::canonicalize_in;
use log::warn;
use memchr::memmem;
use smallvec::SmallVec;
use std::collections::HashMap;

const COMMENT: char = '%';
const BOUNDARY: char = '#';
const EMPTY: &str = "0";

/// One syntactic element of a rule field, before class resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Element {
    Literal(String),
    Class(String),
    Group(Vec<String>),
    Boundary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Pattern,
    Replacement,
    Left,
    Right,
}

type Elements = SmallVec<[Element; 4]>;

#[derive(Default)]
pub(super) struct Parser {
    classes: Vec<SymbolClass>,
    class_index: HashMap<String, ClassId>,
    /// Empty stand-ins for undeclared names, kept out of `class_index`.
    unknown: HashMap<String, ClassId>,
    issues: Vec<MalformedRuleError>,
}

/// `::name:: = …` as opposed to a rule whose pattern starts with `::name::`.
pub(super) fn is_class_declaration(line: &str) -> bool {
    split_declaration(line.trim()).is_some()
}

fn split_declaration(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix("::")?;
    let end = rest.find("::")?;
    let name = &rest[..end];
    let value = rest[end + 2..].trim_start().strip_prefix('=')?;
    is_class_name(name).then_some((name, value.trim()))
}

fn is_class_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}

fn is_skippable(line: &str) -> bool {
    line.is_empty() || line.starts_with(COMMENT)
}

impl Parser {
    pub(super) fn declaration_line(&mut self, line_no: usize, raw: &str) {
        let line = canonicalize_in(raw.trim());
        if is_skippable(&line) {
            return;
        }
        let Some((name, value)) = split_declaration(&line) else {
            self.reject(line_no, &line, "expected a class declaration `::name:: = a|b|c`");
            return;
        };
        let value = value
            .strip_prefix('(')
            .and_then(|v| v.strip_suffix(')'))
            .unwrap_or(value);
        let members: Vec<String> = value
            .split('|')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_owned)
            .collect();
        if members.is_empty() {
            warn!("class `::{name}::` on line {line_no} has no members");
        }
        let class = SymbolClass::new(name, members);
        match self.class_index.get(name) {
            Some(&id) => self.classes[id] = class,
            None => {
                self.class_index.insert(name.to_owned(), self.classes.len());
                self.classes.push(class);
            }
        }
    }

    pub(super) fn finish(mut self, name: &str, rule_lines: Vec<(usize, String)>) -> RuleSet {
        let mut rules = Vec::with_capacity(rule_lines.len());
        for (line_no, raw) in rule_lines {
            let line = canonicalize_in(raw.trim()).into_owned();
            if is_skippable(&line) {
                continue;
            }
            match self.compile(line_no, &line) {
                Ok(rule) => rules.push(rule),
                Err(reason) => self.reject(line_no, &line, &reason),
            }
        }
        RuleSet::from_parts(name, rules, self.classes, self.class_index, self.issues)
    }

    fn reject(&mut self, line: usize, text: &str, reason: &str) {
        let issue = MalformedRuleError {
            line,
            text: text.to_owned(),
            reason: reason.to_owned(),
        };
        warn!("{issue}");
        self.issues.push(issue);
    }

    fn compile(&mut self, line_no: usize, line: &str) -> Result<Rule, String> {
        let arrow = memmem::find(line.as_bytes(), b"->").ok_or("missing `->`")?;
        let pattern = line[..arrow].trim();
        let rest = &line[arrow + 2..];
        let slash = rest.find('/').ok_or("missing `/` before the environment")?;
        let replacement = rest[..slash].trim();
        let environment = &rest[slash + 1..];
        let underscore = environment
            .find('_')
            .ok_or("missing `_` in the environment")?;
        let left = environment[..underscore].trim();
        let right = environment[underscore + 1..].trim();

        if pattern.is_empty() {
            return Err("empty pattern (write `0` for an insertion)".into());
        }
        if replacement.is_empty() {
            return Err("empty replacement (write `0` for a deletion)".into());
        }

        let left = parse_field(left, Field::Left)?;
        let pattern = parse_field(pattern, Field::Pattern)?;
        let replacement = parse_field(replacement, Field::Replacement)?;
        let right = parse_field(right, Field::Right)?;

        let mut steps: SmallVec<[Step; 6]> = SmallVec::new();
        for element in left {
            steps.push(self.context_step(line_no, element, Step::Start));
        }
        steps.push(Step::PatternStart);
        let mut pattern_classes: SmallVec<[ClassId; 4]> = SmallVec::new();
        for element in pattern {
            let step = match element {
                Element::Literal(s) => Step::Literal(s),
                Element::Class(name) => {
                    let class = self.resolve(line_no, &name);
                    pattern_classes.push(class);
                    Step::Class {
                        class,
                        capture: Some(pattern_classes.len() - 1),
                    }
                }
                Element::Group(members) => {
                    let class = self.anonymous(members);
                    pattern_classes.push(class);
                    Step::Class {
                        class,
                        capture: Some(pattern_classes.len() - 1),
                    }
                }
                Element::Boundary => return Err("`#` inside a pattern".into()),
            };
            steps.push(step);
        }
        steps.push(Step::PatternEnd);
        for element in right {
            steps.push(self.context_step(line_no, element, Step::End));
        }

        let mut pieces: SmallVec<[Piece; 2]> = SmallVec::new();
        let mut ordinal = 0;
        let mut inert = false;
        for element in replacement {
            match element {
                Element::Literal(s) => pieces.push(Piece::Literal(s)),
                Element::Class(name) => {
                    let target = self.resolve(line_no, &name);
                    if self.classes[target].is_empty() {
                        // nothing to write back: the rule never fires
                        inert = true;
                        continue;
                    }
                    let &source = pattern_classes.get(ordinal).ok_or_else(|| {
                        format!("replacement class `::{name}::` has no counterpart in the pattern")
                    })?;
                    let (from, to) = (&self.classes[source], &self.classes[target]);
                    if source != target && !from.is_empty() && from.len() != to.len() {
                        return Err(format!(
                            "cannot map `{}` ({} members) onto `::{name}::` ({} members)",
                            from.name(),
                            from.len(),
                            to.len()
                        ));
                    }
                    pieces.push(Piece::Capture {
                        ordinal,
                        class: target,
                    });
                    ordinal += 1;
                }
                Element::Group(_) | Element::Boundary => {
                    return Err("groups and `#` cannot appear in a replacement".into());
                }
            }
        }

        let anchored_start = matches!(steps.first(), Some(Step::Start));
        let first_literal = steps
            .iter()
            .find(|s| !matches!(s, Step::PatternStart | Step::PatternEnd))
            .and_then(|s| match s {
                Step::Literal(l) => Some(l.clone()),
                _ => None,
            });

        Ok(Rule {
            line: line_no,
            text: line.to_owned(),
            steps,
            replacement: pieces,
            captures: pattern_classes.len(),
            anchored_start,
            first_literal,
            inert,
        })
    }

    fn context_step(&mut self, line_no: usize, element: Element, boundary: Step) -> Step {
        match element {
            Element::Literal(s) => Step::Literal(s),
            Element::Class(name) => Step::Class {
                class: self.resolve(line_no, &name),
                capture: None,
            },
            Element::Group(members) => Step::Class {
                class: self.anonymous(members),
                capture: None,
            },
            // parse_field only lets `#` through at the outer edge
            Element::Boundary => boundary,
        }
    }

    fn resolve(&mut self, line_no: usize, name: &str) -> ClassId {
        if let Some(&id) = self.class_index.get(name).or_else(|| self.unknown.get(name)) {
            return id;
        }
        warn!("line {line_no}: unknown symbol class `::{name}::`, treating it as empty");
        let id = self.classes.len();
        self.classes.push(SymbolClass::new(name, Vec::new()));
        self.unknown.insert(name.to_owned(), id);
        id
    }

    fn anonymous(&mut self, members: Vec<String>) -> ClassId {
        let name = format!("({})", members.join("|"));
        self.classes.push(SymbolClass::new(name, members));
        self.classes.len() - 1
    }
}

fn parse_field(text: &str, field: Field) -> Result<Elements, String> {
    let mut elements = Elements::new();
    if text == EMPTY && matches!(field, Field::Pattern | Field::Replacement) {
        return Ok(elements);
    }

    let mut literal = String::new();
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        if let Some(after) = rest.strip_prefix("::") {
            let end = after
                .find("::")
                .filter(|&end| is_class_name(&after[..end]))
                .ok_or_else(|| format!("unterminated class reference in `{text}`"))?;
            flush(&mut literal, &mut elements);
            elements.push(Element::Class(after[..end].to_owned()));
            rest = &after[end + 2..];
            continue;
        }
        if c == '(' {
            let close = rest
                .find(')')
                .ok_or_else(|| format!("unclosed group in `{text}`"))?;
            let members: Vec<String> = rest[1..close]
                .split('|')
                .filter(|m| !m.is_empty())
                .map(str::to_owned)
                .collect();
            flush(&mut literal, &mut elements);
            elements.push(Element::Group(members));
            rest = &rest[close + 1..];
            continue;
        }
        if c == BOUNDARY {
            flush(&mut literal, &mut elements);
            elements.push(Element::Boundary);
        } else {
            literal.push(c);
        }
        rest = &rest[c.len_utf8()..];
    }
    flush(&mut literal, &mut elements);

    validate(&elements, field, text)?;
    Ok(elements)
}

fn flush(literal: &mut String, elements: &mut Elements) {
    if !literal.is_empty() {
        elements.push(Element::Literal(std::mem::take(literal)));
    }
}

fn validate(elements: &[Element], field: Field, text: &str) -> Result<(), String> {
    let last = elements.len().saturating_sub(1);
    for (i, element) in elements.iter().enumerate() {
        match (element, field) {
            (Element::Boundary, Field::Left) if i == 0 => {}
            (Element::Boundary, Field::Right) if i == last => {}
            (Element::Boundary, _) => {
                return Err(format!("`#` is only allowed at the outer edge of a context: `{text}`"));
            }
            (Element::Group(_), Field::Replacement) => {
                return Err(format!("groups are not allowed in a replacement: `{text}`"));
            }
            _ => {}
        }
    }
    Ok(())
}
