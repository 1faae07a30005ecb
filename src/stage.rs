//! Core text-stage abstraction.
//!
//! Every text-to-text step of a transliteration (decomposition, case folding,
//! rule rewriting, recomposition) is a [`Stage`]. Stages take and return
//! `Cow<str>` so that a step which changes nothing costs nothing: the text
//! stays borrowed from the caller all the way through.
//!
//! Tokenization is deliberately *not* a stage. It turns text into tokens and
//! an unmatched-symbol tally, which is a different shape of output.

pub mod fold_case;
pub mod normalization;
pub mod rewrite;

pub use fold_case::FoldCase;
pub use normalization::{NFC, NFD, Nfc, Nfd};
pub use rewrite::Rewrite;

use std::borrow::Cow;

/// A single text-to-text step.
pub trait Stage: Send + Sync {
    /// Human-readable name – used in logs and in [`crate::pipeline::Pipeline::names`].
    fn name(&self) -> &'static str;

    /// Fast pre-check. Returning `false` promises that [`Stage::apply`] would
    /// hand the text back unchanged, so the pipeline may skip the call.
    fn needs_apply(&self, text: &str) -> bool;

    /// Allocation-aware transformation. Must always be correct, whatever
    /// `needs_apply` said.
    fn apply<'a>(&self, text: Cow<'a, str>) -> Cow<'a, str>;
}

/// Re-attaches a transformed result to the lifetime of the original `Cow`.
///
/// Helpers such as [`crate::unicode::canonicalize_in`] borrow from their
/// argument; when the argument was itself borrowed from the caller we can
/// keep it that way, otherwise the result is detached.
#[inline]
pub(crate) fn rebind<'a>(
    text: Cow<'a, str>,
    f: impl for<'b> FnOnce(&'b str) -> Cow<'b, str>,
) -> Cow<'a, str> {
    match text {
        Cow::Borrowed(s) => f(s),
        Cow::Owned(s) => {
            let changed = match f(&s) {
                Cow::Borrowed(_) => None,
                Cow::Owned(changed) => Some(changed),
            };
            Cow::Owned(changed.unwrap_or(s))
        }
    }
}
