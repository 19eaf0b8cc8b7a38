//! Keyword extraction
//!
//! Produces the deduplicated set of content-bearing terms that drives the
//! keyword leg of hybrid search.

/// Stop-words discarded from queries before keyword search
const STOPWORDS: &[&str] = &[
    "le", "la", "les", "un", "une", "des", "et", "ou", "de", "du", "ce", "cette", "ces", "est",
    "sont",
];

/// Extract content-bearing terms from a query.
///
/// Lowercases the text, strips punctuation, splits on whitespace and drops
/// tokens of length <= 2 or present in the stop-word list. The result is
/// deduplicated; insertion order is kept so downstream queries are
/// deterministic. May be empty, in which case the caller must skip the
/// keyword search entirely.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();

    let mut seen = std::collections::HashSet::new();
    let mut keywords = Vec::new();

    for word in cleaned.split_whitespace() {
        if word.chars().count() <= 2 || STOPWORDS.contains(&word) {
            continue;
        }
        if seen.insert(word.to_string()) {
            keywords.push(word.to_string());
        }
    }

    keywords
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_content_words() {
        let keywords = extract_keywords("Quel est le budget de la campagne ?");
        assert_eq!(keywords, vec!["quel", "budget", "campagne"]);
    }

    #[test]
    fn test_strips_punctuation_and_short_tokens() {
        let keywords = extract_keywords("OK: c'est un test, n°1 !");
        // "ok", "un", "n", "1" are too short; "est" is a stop-word
        assert_eq!(keywords, vec!["test"]);
    }

    #[test]
    fn test_no_duplicates() {
        let keywords = extract_keywords("budget budget BUDGET campagne");
        assert_eq!(keywords, vec!["budget", "campagne"]);
    }

    #[test]
    fn test_no_terms_shorter_than_three_chars() {
        let keywords = extract_keywords("ab cd efg hi jkl");
        for keyword in &keywords {
            assert!(keyword.chars().count() > 2);
        }
        assert_eq!(keywords, vec!["efg", "jkl"]);
    }

    #[test]
    fn test_all_stopwords_yields_empty_set() {
        let keywords = extract_keywords("le la les et ou de du");
        assert!(keywords.is_empty());
    }

    #[test]
    fn test_accented_words_survive() {
        let keywords = extract_keywords("définition détaillée");
        assert_eq!(keywords, vec!["définition", "détaillée"]);
    }
}
