use crate::{
    stage::{Stage, rebind},
    unicode::{canonicalize_in, canonicalize_out, is_composed, is_decomposed},
};
use std::borrow::Cow;

/// Canonical decomposition – the form every input is matched in.
#[derive(Debug, Default, Clone, Copy)]
pub struct Nfd;

/// Canonical composition – the form every result is returned in.
#[derive(Debug, Default, Clone, Copy)]
pub struct Nfc;

pub const NFD: Nfd = Nfd;
pub const NFC: Nfc = Nfc;

// Both impls differ only in name and normalizer
macro_rules! impl_normalization_stage {
    ($stage:ty, $name:literal, $check:path, $norm:path) => {
        impl Stage for $stage {
            fn name(&self) -> &'static str {
                $name
            }

            #[inline(always)]
            fn needs_apply(&self, text: &str) -> bool {
                !$check(text)
            }

            #[inline(always)]
            fn apply<'a>(&self, text: Cow<'a, str>) -> Cow<'a, str> {
                rebind(text, $norm)
            }
        }
    };
}

impl_normalization_stage!(Nfd, "nfd", is_decomposed, canonicalize_in);
impl_normalization_stage!(Nfc, "nfc", is_composed, canonicalize_out);


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nfd_then_nfc_round_trips() {
        let original = "El Niño café naïve";
        let nfd = NFD.apply(Cow::Borrowed(original));
        assert_ne!(nfd, original);
        let back = NFC.apply(nfd);
        assert_eq!(back, original);
    }

    #[test]
    fn owned_input_stays_owned_without_reallocating() {
        let owned: Cow<'_, str> = Cow::Owned(String::from("kasa"));
        let ptr = owned.as_ptr();
        let out = NFD.apply(owned);
        assert!(matches!(out, Cow::Owned(ref s) if s.as_ptr() == ptr));
    }

    #[test]
    fn needs_apply_tracks_form() {
        assert!(NFD.needs_apply("é"));
        assert!(!NFD.needs_apply("e\u{0301}"));
        assert!(NFC.needs_apply("e\u{0301}"));
        assert!(!NFC.needs_apply("é"));
    }
}
