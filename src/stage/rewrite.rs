//! Rule rewriting as a pipeline stage.
use crate::{rules::RuleSet, stage::Stage};
use std::{borrow::Cow, sync::Arc};

/// Runs a [`RuleSet`] over the text. Used twice per transliteration: once
/// over the decomposed input (`preprocess`) and once over the joined
/// targets (`postprocess`).
#[derive(Debug, Clone)]
pub struct Rewrite {
    name: &'static str,
    rules: Arc<RuleSet>,
}

impl Rewrite {
    pub fn new(name: &'static str, rules: impl Into<Arc<RuleSet>>) -> Self {
        Self {
            name,
            rules: rules.into(),
        }
    }

    pub fn preprocess(rules: impl Into<Arc<RuleSet>>) -> Self {
        Self::new("preprocess", rules)
    }

    pub fn postprocess(rules: impl Into<Arc<RuleSet>>) -> Self {
        Self::new("postprocess", rules)
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}

impl Stage for Rewrite {
    fn name(&self) -> &'static str {
        self.name
    }

    // Conservative: an insertion rule can fire on any non-empty text.
    #[inline]
    fn needs_apply(&self, text: &str) -> bool {
        !self.rules.is_empty() && !text.is_empty()
    }

    fn apply<'a>(&self, text: Cow<'a, str>) -> Cow<'a, str> {
        match text {
            Cow::Borrowed(s) => self.rules.apply(s),
            Cow::Owned(s) => match self.rules.apply(&s) {
                Cow::Borrowed(_) => Cow::Owned(s),
                Cow::Owned(changed) => Cow::Owned(changed),
            },
        }
    }
}
