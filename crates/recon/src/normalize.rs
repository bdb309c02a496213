/// Canonicalize a product title for comparison.
///
/// Lowercases, drops every character outside `[a-z0-9\s]`, collapses
/// whitespace runs to a single space and trims. Idempotent.
pub fn normalize(name: &str) -> String {
    let cleaned: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Words of a normalized title that are at least `min_len` characters long.
pub fn significant_words(normalized: &str, min_len: usize) -> Vec<&str> {
    normalized
        .split(' ')
        .filter(|w| w.chars().count() >= min_len)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn strips_punctuation_and_case() {
        assert_eq!(normalize("  Red-Mug (Large)!! "), "redmug large");
        assert_eq!(normalize("Ceramic   Vase\tHandmade"), "ceramic vase handmade");
    }

    #[test]
    fn drops_non_ascii_letters() {
        assert_eq!(normalize("Café Crème 2"), "caf crme 2");
    }

    #[test]
    fn empty_and_symbols_only() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("*** ---"), "");
    }

    #[test]
    fn significant_words_cutoff() {
        let words = significant_words("a red mug of tea", 3);
        assert_eq!(words, vec!["red", "mug", "tea"]);
        assert!(significant_words("", 3).is_empty());
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(s in "\\PC*") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn normalized_alphabet(s in "\\PC*") {
            let n = normalize(&s);
            prop_assert!(n.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == ' '));
            prop_assert!(!n.starts_with(' ') && !n.ends_with(' ') && !n.contains("  "));
        }
    }
}
