//! Text canonicalization and character predicates.
//!
//! Everything that enters the engine (table entries, rule lines, live input)
//! is brought to NFD first so that a base letter and its combining marks are
//! always separate code points when matched. Results leave the engine in NFC.
//! Both directions borrow when the text is already in the requested form.

use icu_normalizer::{
    ComposingNormalizer, ComposingNormalizerBorrowed, DecomposingNormalizer,
    DecomposingNormalizerBorrowed,
};
use std::{borrow::Cow, sync::LazyLock};

// ── ICU4X ──
static ICU4X_NFC: LazyLock<ComposingNormalizerBorrowed<'static>> =
    LazyLock::new(ComposingNormalizer::new_nfc);
static ICU4X_NFD: LazyLock<DecomposingNormalizerBorrowed<'static>> =
    LazyLock::new(DecomposingNormalizer::new_nfd);

/// Fully decomposed form (NFD). Applied to table entries, rule lines and
/// every input string before tokenization.
#[inline]
pub fn canonicalize_in(text: &str) -> Cow<'_, str> {
    if ICU4X_NFD.is_normalized(text) {
        return Cow::Borrowed(text);
    }
    ICU4X_NFD.normalize(text)
}

/// Fully composed form (NFC). Applied once, at the very end of a
/// transliteration call.
#[inline]
pub fn canonicalize_out(text: &str) -> Cow<'_, str> {
    if ICU4X_NFC.is_normalized(text) {
        return Cow::Borrowed(text);
    }
    ICU4X_NFC.normalize(text)
}

#[inline]
pub fn is_decomposed(text: &str) -> bool {
    ICU4X_NFD.is_normalized(text)
}

#[inline]
pub fn is_composed(text: &str) -> bool {
    ICU4X_NFC.is_normalized(text)
}

/// Validates raw file contents as UTF-8 without copying them.
pub(crate) fn decode_utf8(bytes: Vec<u8>) -> Result<String, String> {
    #[cfg(feature = "simd")]
    {
        simdutf8::compat::from_utf8(&bytes).map_err(|e| e.to_string())?;
        // SAFETY: validated just above
        Ok(unsafe { String::from_utf8_unchecked(bytes) })
    }
    #[cfg(not(feature = "simd"))]
    {
        String::from_utf8(bytes).map_err(|e| e.utf8_error().to_string())
    }
}

// Chao tone letters: extra-high through extra-low.
#[inline(always)]
pub const fn is_tone_marker(c: char) -> bool {
    matches!(c as u32, 0x02E5..=0x02E9)
}

/// Removes tone letters. Only ever applied to table targets at load time,
/// never to live input.
pub fn strip_tone_markers(text: &str) -> Cow<'_, str> {
    if !text.chars().any(is_tone_marker) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.chars().filter(|&c| !is_tone_marker(c)).collect())
}

/// Lower-cases `text`, borrowing when nothing would change.
///
/// Case-insensitive sessions call this at the pipeline boundary; the matcher
/// itself never folds.
pub fn fold_case(text: &str) -> Cow<'_, str> {
    if !needs_case_fold(text) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.to_lowercase())
}

#[inline]
pub fn needs_case_fold(text: &str) -> bool {
    if text.is_ascii() {
        return text.bytes().any(|b| b.is_ascii_uppercase());
    }
    text.chars().any(|c| {
        let mut lower = c.to_lowercase();
        lower.next() != Some(c) || lower.next().is_some()
    })
}

// This is very fast and avoids hash/table indirections.
#[inline(always)]
pub fn is_unicode_whitespace(c: char) -> bool {
    // U+00A0, U+1680, U+2000..=U+200A, U+2028, U+2029, U+202F, U+205F, U+3000
    matches!(
        c as u32,
        0x0085 | // NEXT LINE (NEL)
        0x00A0 | // NO-BREAK SPACE
        0x1680 | // OGHAM SPACE MARK
        0x2000
            ..=0x200A | // EN QUAD through HAIR SPACE
        0x2028 | // LINE SEPARATOR
        0x2029 | // PARAGRAPH SEPARATOR
        0x202F | // NARROW NO-BREAK SPACE
        0x205F | // MEDIUM MATHEMATICAL SPACE
        0x3000 // IDEOGRAPHIC SPACE
    )
}

#[inline(always)]
pub fn is_any_whitespace(c: char) -> bool {
    c.is_whitespace() || is_unicode_whitespace(c)
}

/// Combining marks that matter for phonetic notation: the generic combining
/// diacritics blocks plus the half marks used for tie bars.
#[inline(always)]
pub fn is_combining_mark(c: char) -> bool {
    matches!(c as u32,
        0x0300..=0x036F | // Combining Diacritical Marks
        0x1AB0..=0x1AFF | // Combining Diacritical Marks Extended
        0x1DC0..=0x1DFF | // Combining Diacritical Marks Supplement
        0x20D0..=0x20FF | // Combining Diacritical Marks for Symbols
        0x3099..=0x309A | // Kana voicing marks
        0xFE20..=0xFE2F   // Combining Half Marks
    )
}
