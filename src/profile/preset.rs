use crate::profile::Profile;
use phf::{Map, phf_map};

/// Orthographic input such as kana: case-insensitive and forgiving, unknown
/// symbols pass through.
pub const ORTHOGRAPHIC: Profile = Profile::new("orthographic")
    .case_sensitive(false)
    .validate(false);

/// Space-separated phoneme labels where case carries meaning (voiced `a`
/// vs voiceless `A`). Pauses and silences split the utterance.
pub const PHONEME_LABELS: Profile = Profile::new("phoneme_labels").delimiters(&["pau", "sil"]);

/// Dictionary phone labels with stress digits (`AH0`, `EY1`).
pub const ARPABET: Profile = Profile::new("arpabet")
    .case_sensitive(false)
    .strip_stress(true);

static PRESETS: Map<&'static str, Profile> = phf_map! {
    "orthographic" => ORTHOGRAPHIC,
    "phoneme_labels" => PHONEME_LABELS,
    "arpabet" => ARPABET,
};

/// Looks a preset up by name, ignoring ASCII case.
pub fn by_name(name: &str) -> Option<&'static Profile> {
    PRESETS.get(name.to_ascii_lowercase().as_str())
}

pub fn names() -> impl Iterator<Item = &'static str> {
    PRESETS.keys().copied()
}
