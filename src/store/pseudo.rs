//! Placeholder values for languages that have not been translated yet.
//!
//! A new key gets a pseudo-translation in every non-default language: the
//! source text tagged with the language code and padded with `!` to the
//! length a real translation is expected to reach. Layout problems caused
//! by longer languages show up before any translator touches the file.

use crate::config::schema::PseudoConfig;

/// Build the pseudo-translation of `value` for `lang`.
///
/// The target length is `floor(chars(value) × multiplier)`. The padding
/// needed to reach it from `"<value> [<lang>]"` is split evenly, with the
/// odd `!` going to the end.
pub fn pseudo_translate(value: &str, lang: &str, pseudo: &PseudoConfig) -> String {
    let multiplier = pseudo.multiplier_for(lang);
    let target_len = (value.chars().count() as f64 * multiplier).floor() as usize;

    let base = format!("{value} [{lang}]");
    let padding = target_len.saturating_sub(base.chars().count());
    let leading = padding / 2;
    let trailing = padding - leading;

    format!("{}{}{}", "!".repeat(leading), base, "!".repeat(trailing))
}

/// Derive a key from an English value: each space-separated word gets an
/// upper-case first letter and the words are concatenated.
///
/// `"save all files"` → `"SaveAllFiles"`.
pub fn derive_key(value: &str) -> String {
    value
        .split(' ')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_values_get_no_padding() {
        let pseudo = PseudoConfig::default();
        assert_eq!(pseudo_translate("Hello", "fr", &pseudo), "Hello [fr]");
    }

    #[test]
    fn long_values_are_padded_on_both_sides() {
        let pseudo = PseudoConfig::default();
        // 40 chars × 1.25 = 50, base is 45 chars, padding 5 → 2 + 3
        let value = "This sentence has exactly forty chars!!!";
        assert_eq!(value.chars().count(), 40);
        let out = pseudo_translate(value, "es", &pseudo);
        assert_eq!(out, format!("!!{value} [es]!!!"));
        assert_eq!(out.chars().count(), 50);
    }

    #[test]
    fn unknown_language_uses_default_multiplier() {
        let pseudo = PseudoConfig::default();
        // 100 × 1.1 = 110, base is 105, padding 5
        let value = "x".repeat(100);
        let out = pseudo_translate(&value, "de", &pseudo);
        assert_eq!(out.chars().count(), 110);
        assert!(out.starts_with("!!x"));
        assert!(out.ends_with("[de]!!!"));
    }

    #[test]
    fn padding_counts_characters_not_bytes() {
        let pseudo = PseudoConfig::default();
        let value = "é".repeat(100);
        let out = pseudo_translate(&value, "es", &pseudo);
        assert_eq!(out.chars().count(), 125);
    }

    #[test]
    fn derive_key_capitalizes_words() {
        assert_eq!(derive_key("save all files"), "SaveAllFiles");
        assert_eq!(derive_key("a b"), "AB");
        assert_eq!(derive_key("Open  recent"), "OpenRecent");
        assert_eq!(derive_key("élan vital"), "ÉlanVital");
    }
}
