//! Named session configurations.
//!
//! A [`Profile`] bundles the switches of a [`crate::TransliteratorBuilder`]
//! for one kind of input. Profiles are plain `const` data so that presets
//! can live in a compile-time lookup table.
pub mod preset;

/// Session switches applied by [`crate::TransliteratorBuilder::profile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    pub name: &'static str,
    pub case_sensitive: bool,
    pub validate: bool,
    pub strip_stress: bool,
    pub delimiters: &'static [&'static str],
    pub separator: &'static str,
}

impl Profile {
    /// Case-sensitive, validating, no delimiters, joined with a space.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            case_sensitive: true,
            validate: true,
            strip_stress: false,
            delimiters: &[],
            separator: " ",
        }
    }

    pub const fn case_sensitive(self, case_sensitive: bool) -> Self {
        Self {
            case_sensitive,
            ..self
        }
    }

    pub const fn validate(self, validate: bool) -> Self {
        Self { validate, ..self }
    }

    pub const fn strip_stress(self, strip_stress: bool) -> Self {
        Self {
            strip_stress,
            ..self
        }
    }

    pub const fn delimiters(self, delimiters: &'static [&'static str]) -> Self {
        Self { delimiters, ..self }
    }

    pub const fn separator(self, separator: &'static str) -> Self {
        Self { separator, ..self }
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new("default")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn const_builder_overrides_defaults() {
        const P: Profile = Profile::new("p").validate(false).delimiters(&["pau"]);
        assert!(P.case_sensitive);
        assert!(!P.validate);
        assert_eq!(P.delimiters, ["pau"]);
        assert_eq!(P.separator, " ");
    }
}
