//! Case folding for case-insensitive sessions.
//!
//! The matcher is always case-sensitive. A session that wants
//! case-insensitive lookup adds this stage right after decomposition, so the
//! decision is made once at the pipeline boundary and never inside the
//! tokenizer, where it would silently merge labels such as `a` and `A`.
use crate::{
    stage::{Stage, rebind},
    unicode::{fold_case, needs_case_fold},
};
use std::borrow::Cow;

#[derive(Debug, Default, Clone, Copy)]
pub struct FoldCase;

impl Stage for FoldCase {
    fn name(&self) -> &'static str {
        "fold_case"
    }

    #[inline(always)]
    fn needs_apply(&self, text: &str) -> bool {
        needs_case_fold(text)
    }

    fn apply<'a>(&self, text: Cow<'a, str>) -> Cow<'a, str> {
        rebind(text, fold_case)
    }
}
