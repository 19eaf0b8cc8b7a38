//! Query classification
//!
//! Assigns a coarse category to an incoming question to steer ranking
//! bonuses and prompt framing. Categories are checked in a fixed order and
//! the first matching pattern wins; there is no scoring.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// The five query categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    Factual,
    Conceptual,
    Procedural,
    Comparative,
    General,
}

impl QueryType {
    /// Lowercase label used on the wire and in persisted metadata
    pub fn label(&self) -> &'static str {
        match self {
            QueryType::Factual => "factual",
            QueryType::Conceptual => "conceptual",
            QueryType::Procedural => "procedural",
            QueryType::Comparative => "comparative",
            QueryType::General => "general",
        }
    }
}

impl std::fmt::Display for QueryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Regex-driven question classifier
///
/// The category groups are checked in declaration order (factual,
/// conceptual, procedural, comparative) and within a group the patterns are
/// checked in list order. A question matching nothing is `General`.
pub struct QueryClassifier {
    patterns: Vec<(QueryType, Vec<Regex>)>,
}

impl QueryClassifier {
    pub fn new() -> Self {
        let compile = |patterns: &[&str]| -> Vec<Regex> {
            patterns
                .iter()
                .map(|p| Regex::new(p).expect("static classification pattern"))
                .collect()
        };

        let patterns = vec![
            (
                QueryType::Factual,
                compile(&[
                    r"(?i)qui est|qu'est.ce que|quand|où|combien|quel",
                    r"(?i)définir|définition|signifie",
                ]),
            ),
            (
                QueryType::Conceptual,
                compile(&[
                    r"(?i)pourquoi|comment|expliquer|concept|comprendre",
                    r"(?i)quelle est la différence|comparer",
                ]),
            ),
            (
                QueryType::Procedural,
                compile(&[
                    r"(?i)comment faire|étapes|processus|méthode",
                    r"(?i)guide|tutoriel|instructions",
                ]),
            ),
            (
                QueryType::Comparative,
                compile(&[
                    r"(?i)différence entre|vs|versus|comparé à|meilleur",
                    r"(?i)avantages|inconvénients|pour et contre",
                ]),
            ),
        ];

        Self { patterns }
    }

    /// Classify a question; always returns a label, never fails
    pub fn classify(&self, question: &str) -> QueryType {
        for (query_type, group) in &self.patterns {
            for pattern in group {
                if pattern.is_match(question) {
                    return *query_type;
                }
            }
        }

        QueryType::General
    }
}

impl Default for QueryClassifier {
    fn default() -> Self {
        Self::new()
    }
}
