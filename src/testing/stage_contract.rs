use crate::stage::Stage;

/// Trait that stages implement to opt into the universal test suite.
pub trait StageTestConfig: Stage + Sized {
    /// General test samples (may or may not trigger changes)
    fn samples() -> &'static [&'static str] {
        &["kasa", " de\u{301}ja\u{300} vu ", "AH0 K", "ガギ", ""]
    }

    /// Samples that should pass through unchanged (zero-copy test).
    ///
    /// Default: lower-case ASCII that no stage of the engine touches.
    fn should_pass_through() -> &'static [&'static str] {
        &[
            "hello",   // Simple lowercase
            "test123", // Alphanumeric
            "abc def", // Simple phrase with space
            "",        // Empty string
        ]
    }

    /// Input/output pairs that verify correct transformations.
    fn should_transform() -> &'static [(&'static str, &'static str)] {
        &[]
    }

    /// Rewrite stages built from arbitrary rules are not idempotent in
    /// general (`a -> aa` grows on every pass).
    fn idempotent() -> bool {
        true
    }

    /// Whether `needs_apply` is an exact prediction. When `false` it is only
    /// required to be sound: `false` must still mean "no change".
    fn needs_apply_is_exact() -> bool {
        true
    }
}

/// Assert that a stage satisfies the universal stage contracts.
///
/// ### Contracts:
/// 1. `zero_copy_when_no_changes` → no allocation when input == output
/// 2. `stage_is_idempotent` → applying twice yields same result as once
/// 3. `needs_apply_is_accurate` → correctly predicts whether apply() would change text
/// 4. `handles_empty_string_and_ascii` → graceful on edge cases
/// 5. `no_panic_on_mixed_scripts` → survives pathological real-world input
/// 6. (Implicit) `Send + Sync` → required by trait bounds
#[macro_export]
macro_rules! assert_stage_contract {
    ($stage:expr) => {
        $crate::testing::stage_contract::zero_copy_when_no_changes(&$stage);
        $crate::testing::stage_contract::stage_is_idempotent(&$stage);
        $crate::testing::stage_contract::needs_apply_is_accurate(&$stage);
        $crate::testing::stage_contract::handles_empty_string_and_ascii(&$stage);
        $crate::testing::stage_contract::no_panic_on_mixed_scripts(&$stage);
    };
}

use std::borrow::Cow;

fn run<'a, S: Stage>(stage: &S, text: Cow<'a, str>) -> Cow<'a, str> {
    if stage.needs_apply(&text) {
        stage.apply(text)
    } else {
        text
    }
}

pub fn zero_copy_when_no_changes<S: StageTestConfig>(stage: &S) {
    for &input in S::samples() {
        let out = run(stage, Cow::Borrowed(input));
        if out == input {
            assert_eq!(
                input.as_ptr(),
                out.as_ptr(),
                "stage `{}` copied unchanged input `{input}`",
                stage.name()
            );
        }
    }

    for &pass_through in S::should_pass_through() {
        let out = run(stage, Cow::Borrowed(pass_through));
        assert_eq!(out.as_ref(), pass_through);
        assert!(
            matches!(out, Cow::Borrowed(s) if s.as_ptr() == pass_through.as_ptr()),
            "zero-copy violated on pass-through sample `{pass_through}` in `{}`",
            stage.name()
        );
    }

    for &(input, expected) in S::should_transform() {
        let out = run(stage, Cow::Borrowed(input));
        assert_eq!(out.as_ref(), expected, "stage `{}` on `{input}`", stage.name());
    }
}

pub fn stage_is_idempotent<S: StageTestConfig>(stage: &S) {
    if !S::idempotent() {
        return;
    }
    for &input in S::samples() {
        let once = stage.apply(Cow::Borrowed(input));
        let twice = stage.apply(once.clone());
        assert_eq!(once, twice, "`{}` not idempotent on `{input}`", stage.name());
    }
}

pub fn needs_apply_is_accurate<S: StageTestConfig>(stage: &S) {
    let clean = ["", "hello", "world123", " !@#"];
    let samples = S::samples().iter().chain(clean.iter());
    for &input in samples {
        let predicted = stage.needs_apply(input);
        let output = stage.apply(Cow::Owned(input.to_owned()));
        let changes = output != input;
        if S::needs_apply_is_exact() {
            assert_eq!(
                predicted,
                changes,
                "needs_apply() mismatch for `{}` on `{input}` (output = {output:?})",
                stage.name()
            );
        } else {
            assert!(
                predicted || !changes,
                "needs_apply() said no but `{}` changed `{input}` into {output:?}",
                stage.name()
            );
        }
    }
}

pub fn handles_empty_string_and_ascii<S: StageTestConfig>(stage: &S) {
    let empty = run(stage, Cow::Borrowed(""));
    assert_eq!(empty.as_ref(), "");
    let ascii = "hello world 123 !@#";
    assert_eq!(stage.apply(Cow::Borrowed(ascii)).as_ref(), ascii);
}

pub fn no_panic_on_mixed_scripts<S: StageTestConfig>(stage: &S) {
    let _ = stage.apply(Cow::Borrowed(
        "Hello 世界 русский Türkçe العربية ɕɯːto t͡s ˥˩",
    ));
}
