#[cfg(test)]
mod unit_tests {

    use crate::{
        Delimiters, RuleSet, SymbolTable, TableOptions, Token, Transliterator, join,
        split_on_delimiters, tokenize, unicode::{canonicalize_in, canonicalize_out},
    };
    use std::borrow::Cow;

    fn table(rows: &[(&str, &str)]) -> SymbolTable {
        SymbolTable::load("unit", rows.iter().copied(), TableOptions::default())
    }

    #[test]
    fn longest_match_determinism() {
        let table = table(&[("a", "x"), ("ab", "y")]);
        let out = tokenize("abc", &table);
        assert_eq!(out.tokens, [Token::matched("ab", "y"), Token::unmatched("c")]);
        assert_ne!(
            out.tokens,
            [
                Token::matched("a", "x"),
                Token::unmatched("b"),
                Token::unmatched("c")
            ]
        );
    }

    #[test]
    fn validation_contract() {
        let engine = Transliterator::new(table(&[("ka", "カ"), ("sa", "サ")]));
        let err = engine.transliterate("kasaX", true).unwrap_err();
        assert_eq!(err.tally.iter().collect::<Vec<_>>(), [("X", 1)]);
        assert_eq!(engine.transliterate("kasaX", false).unwrap(), "カサX");
    }

    #[test]
    fn segmentation_contract() {
        let labels = ["k", "a", "pau", "s", "a"];
        let segments = split_on_delimiters(&labels, &Delimiters::new(["pau"]));
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].labels, ["k", "a"]);
        assert_eq!(segments[1].labels, ["s", "a"]);

        let engine = Transliterator::new(table(&[("ka", "か"), ("sa", "さ")]));
        let outputs: Vec<String> = segments
            .iter()
            .map(|s| engine.transliterate(&s.concat(), true).unwrap())
            .collect();
        let joined = join(&outputs, " ");
        assert_eq!(joined, "か さ");
        assert_eq!(joined.matches(' ').count(), 1);
    }

    #[test]
    fn rule_order_is_part_of_the_contract() {
        let forward = RuleSet::parse("x -> y / _\ny -> z / _");
        let backward = RuleSet::parse("y -> z / _\nx -> y / _");
        assert_eq!(forward.apply("x"), "z");
        assert_eq!(backward.apply("x"), "y");
    }

    #[test]
    fn zero_rules_is_identity_after_mapping() {
        let table = table(&[("ɕ", "sh"), ("i", "ee")]);
        let engine = Transliterator::builder(table)
            .preprocess(RuleSet::empty())
            .postprocess(RuleSet::empty())
            .build();
        let t = engine.transliterate_detailed("ɕi", true).unwrap();
        assert_eq!(t.mapped(), "shee");
        assert_eq!(t.output(), t.mapped());
    }

    #[test]
    fn empty_input_both_modes() {
        let engine = Transliterator::new(table(&[("a", "b")]));
        for validate in [true, false] {
            let t = engine.transliterate_detailed("", validate).unwrap();
            assert_eq!(t.output(), "");
            assert!(t.tally().is_empty());
            assert!(t.tokens().is_empty());
        }
    }

    #[test]
    fn normalization_round_trip_is_idempotent() {
        for s in ["café", "ガッコウ", "ɕi\u{325}", "Å", "ǖ"] {
            let once = canonicalize_out(&canonicalize_in(s)).into_owned();
            let twice = canonicalize_out(&canonicalize_in(&once)).into_owned();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn icu_forms_agree_with_unicode_normalization() {
        use unicode_normalization::UnicodeNormalization;
        for s in ["café", "ガギグ", "Ω", "ḍ̇", "한국어"] {
            assert_eq!(canonicalize_in(s), s.nfd().collect::<String>());
            assert_eq!(canonicalize_out(s), s.nfc().collect::<String>());
        }
    }

    #[test]
    fn zero_copy_when_already_decomposed() {
        let input = "kasa";
        assert!(matches!(canonicalize_in(input), Cow::Borrowed(s) if s.as_ptr() == input.as_ptr()));
    }

    #[test]
    fn tally_offsets_point_into_decomposed_text() {
        let engine = Transliterator::new(table(&[("か", "ka")]));
        let err = engine.transliterate("かがX", true).unwrap_err();
        // が = か + U+3099, so X sits at character 3
        assert_eq!(err.tally.offsets("X"), [3]);
        assert_eq!(err.tally.count("\u{3099}"), 1);
    }
}
