//! Left-to-right, non-overlapping rule application.
use super::{Piece, Rule, Step, SymbolClass};
use memchr::memmem;
use smallvec::SmallVec;

#[derive(Debug, Default, Clone)]
struct MatchState {
    pattern_start: usize,
    pattern_end: usize,
    /// Member index captured by each pattern class, in order.
    captures: SmallVec<[usize; 4]>,
}

/// Matches `steps` at byte offset `pos` of `text`, returning the offset just
/// past the last consumed symbol. Class steps try their members in declaration
/// order and move on to the next one when the rest of the rule fails.
fn match_steps(
    steps: &[Step],
    text: &str,
    pos: usize,
    classes: &[SymbolClass],
    state: &mut MatchState,
) -> Option<usize> {
    let Some((step, rest)) = steps.split_first() else {
        return Some(pos);
    };
    match step {
        Step::Start if pos != 0 => None,
        Step::Start => match_steps(rest, text, pos, classes, state),
        Step::End => (pos == text.len()).then_some(pos),
        Step::PatternStart => {
            state.pattern_start = pos;
            match_steps(rest, text, pos, classes, state)
        }
        Step::PatternEnd => {
            state.pattern_end = pos;
            match_steps(rest, text, pos, classes, state)
        }
        Step::Literal(literal) => {
            if text[pos..].starts_with(literal.as_str()) {
                match_steps(rest, text, pos + literal.len(), classes, state)
            } else {
                None
            }
        }
        Step::Class { class, capture } => {
            let class = &classes[*class];
            for (member, symbol) in class.members().iter().enumerate() {
                if !text[pos..].starts_with(symbol.as_str()) {
                    continue;
                }
                if let Some(ordinal) = capture {
                    state.captures.truncate(*ordinal);
                    state.captures.push(member);
                }
                if let Some(end) = match_steps(rest, text, pos + symbol.len(), classes, state) {
                    return Some(end);
                }
            }
            None
        }
    }
}

impl Rule {
    /// Rewrites every non-overlapping match of this rule in `text`, scanning
    /// left to right. Each match consumes its contexts as well as its
    /// pattern. Returns `None` when the rule never fired.
    pub(crate) fn rewrite(&self, text: &str, classes: &[SymbolClass]) -> Option<String> {
        if self.inert {
            return None;
        }
        let finder = self
            .first_literal
            .as_deref()
            .map(|l| memmem::Finder::new(l.as_bytes()));

        let mut out: Option<String> = None;
        let mut copied = 0;
        let mut pos = 0;
        let mut state = MatchState::default();

        while pos <= text.len() {
            if self.anchored_start && pos > 0 {
                break;
            }
            if let Some(finder) = &finder {
                match finder.find(&text.as_bytes()[pos..]) {
                    Some(offset) => pos += offset,
                    None => break,
                }
            }

            state.captures.clear();
            if let Some(end) = match_steps(&self.steps, text, pos, classes, &mut state) {
                let buf = out.get_or_insert_with(|| String::with_capacity(text.len() + 8));
                buf.push_str(&text[copied..state.pattern_start]);
                self.emit(buf, &state, classes);
                copied = state.pattern_end;
                if end > pos {
                    pos = end;
                    continue;
                }
            }
            match text[pos..].chars().next() {
                Some(c) => pos += c.len_utf8(),
                None => break,
            }
        }

        let mut out = out?;
        out.push_str(&text[copied..]);
        Some(out)
    }

    fn emit(&self, buf: &mut String, state: &MatchState, classes: &[SymbolClass]) {
        for piece in &self.replacement {
            match piece {
                Piece::Literal(s) => buf.push_str(s),
                Piece::Capture { ordinal, class } => {
                    let symbol = state
                        .captures
                        .get(*ordinal)
                        .and_then(|&member| classes[*class].members().get(member));
                    if let Some(symbol) = symbol {
                        buf.push_str(symbol);
                    }
                }
            }
        }
    }
}
