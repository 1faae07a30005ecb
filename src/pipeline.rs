// src/pipeline.rs
use crate::stage::Stage;
use log::trace;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::sync::Arc;

/// An ordered list of text stages, shared between threads.
#[derive(Clone, Default)]
pub struct Pipeline {
    stages: SmallVec<[Arc<dyn Stage>; 4]>,
}

impl Pipeline {
    pub fn new(stages: impl IntoIterator<Item = Arc<dyn Stage>>) -> Self {
        Self {
            stages: stages.into_iter().collect(),
        }
    }

    pub fn push<S: Stage + 'static>(&mut self, stage: S) {
        self.stages.push(Arc::new(stage));
    }

    pub fn process<'a>(&self, text: Cow<'a, str>) -> Cow<'a, str> {
        let mut current = text;

        for stage in &self.stages {
            // Fast path: skip if no mutation needed
            if !stage.needs_apply(&current) {
                continue;
            }
            trace!("stage `{}`", stage.name());
            current = stage.apply(current);
        }

        current
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::{FoldCase, NFC, NFD};

    #[test]
    fn runs_stages_in_order() {
        let mut pipeline = Pipeline::default();
        pipeline.push(NFD);
        pipeline.push(FoldCase);
        pipeline.push(NFC);
        assert_eq!(pipeline.names(), ["nfd", "fold_case", "nfc"]);
        assert_eq!(pipeline.process(Cow::Borrowed("CAFÉ")), "café");
    }

    #[test]
    fn borrowed_through_when_nothing_applies() {
        let mut pipeline = Pipeline::default();
        pipeline.push(NFD);
        pipeline.push(FoldCase);
        let input = "kasa";
        let out = pipeline.process(Cow::Borrowed(input));
        assert!(matches!(out, Cow::Borrowed(s) if s.as_ptr() == input.as_ptr()));
    }

    #[test]
    fn empty_pipeline_is_identity() {
        let pipeline = Pipeline::new([]);
        assert!(pipeline.is_empty());
        assert_eq!(pipeline.process(Cow::Borrowed("x")), "x");
    }
}
