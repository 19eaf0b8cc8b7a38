//! Metadata filtering and reranking
//!
//! Narrows the candidate set with caller-supplied filters, then reorders it
//! so the most useful chunks for the classified query type surface first.

use crate::classifier::QueryType;
use crate::types::{QueryFilters, SearchResult};
use regex::Regex;
use std::cmp::Ordering;
use std::sync::OnceLock;
use tracing::debug;

/// Bonus applied to definition chunks for factual questions
const DEFINITION_BONUS: f32 = 0.1;
/// Bonus applied to step-by-step chunks for procedural questions
const STEPS_BONUS: f32 = 0.15;
/// Bonus applied to comparison chunks for comparative questions
const COMPARISON_BONUS: f32 = 0.2;
/// Bonus applied to the more recent of two dated chunks for
/// time-sensitive queries
const RECENCY_BONUS: f32 = 0.05;

fn time_sensitive_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)récent|nouveau|dernier|actuel|aujourd'hui")
            .expect("static time-sensitivity pattern")
    })
}

/// Apply caller-supplied metadata filters to the candidate set.
///
/// Every filter is independently optional and fail-open with respect to
/// missing metadata: a chunk is never excluded purely because a metadata
/// field is absent.
pub fn apply_metadata_filters(
    results: Vec<SearchResult>,
    filters: &QueryFilters,
) -> Vec<SearchResult> {
    let before = results.len();

    let filtered: Vec<SearchResult> = results
        .into_iter()
        .filter(|result| {
            let metadata = &result.chunk.metadata;

            if let Some(range) = &filters.date_range {
                if let Some(date) = metadata.date {
                    if date < range.start || date > range.end {
                        return false;
                    }
                }
            }

            if let Some(source_types) = &filters.source_types {
                if let Some(source_type) = &metadata.source_type {
                    if !source_types.contains(source_type) {
                        return false;
                    }
                }
            }

            if let Some(authors) = &filters.authors {
                if let Some(author) = &metadata.author {
                    if !authors.contains(author) {
                        return false;
                    }
                }
            }

            true
        })
        .collect();

    if filtered.len() < before {
        debug!(
            "Metadata filters narrowed candidates from {} to {}",
            before,
            filtered.len()
        );
    }

    filtered
}

/// Reorder results by adjusted score, descending.
///
/// Category bonuses are applied to a working copy of the score; the stored
/// similarity is never mutated. The recency bonus applies only when the
/// query text is time-sensitive and both compared chunks carry dates.
/// Membership of the set is unchanged.
pub fn rerank_results(
    mut results: Vec<SearchResult>,
    query_type: QueryType,
    query: &str,
) -> Vec<SearchResult> {
    let time_sensitive = time_sensitive_pattern().is_match(query);

    results.sort_by(|a, b| {
        let mut score_a = a.similarity + category_bonus(a, query_type);
        let mut score_b = b.similarity + category_bonus(b, query_type);

        if time_sensitive {
            if let (Some(date_a), Some(date_b)) = (a.chunk.metadata.date, b.chunk.metadata.date) {
                if date_a > date_b {
                    score_a += RECENCY_BONUS;
                } else if date_b > date_a {
                    score_b += RECENCY_BONUS;
                }
            }
        }

        score_b.partial_cmp(&score_a).unwrap_or(Ordering::Equal)
    });

    results
}

/// Order results by plain similarity, descending.
///
/// Used when reranking is disabled: the ordering coming out of the
/// retrieval stage is not guaranteed and must not be trusted.
pub fn order_by_similarity(mut results: Vec<SearchResult>) -> Vec<SearchResult> {
    results.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
    });
    results
}

fn category_bonus(result: &SearchResult, query_type: QueryType) -> f32 {
    let metadata = &result.chunk.metadata;
    match query_type {
        QueryType::Factual if metadata.is_definition => DEFINITION_BONUS,
        QueryType::Procedural if metadata.contains_steps => STEPS_BONUS,
        QueryType::Comparative if metadata.is_comparison => COMPARISON_BONUS,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChunkMetadata, DateRange, DocumentChunk};
    use chrono::NaiveDate;

    fn result(id: &str, similarity: f32, metadata: ChunkMetadata) -> SearchResult {
        SearchResult {
            chunk: DocumentChunk {
                id: id.to_string(),
                document_id: None,
                content: format!("content {}", id),
                chunk_index: 0,
                metadata,
            },
            similarity,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_filter_is_fail_open() {
        let filters = QueryFilters {
            date_range: Some(DateRange {
                start: date(2024, 1, 1),
                end: date(2024, 12, 31),
            }),
            ..Default::default()
        };

        let results = vec![
            result("dated-in", 0.9, ChunkMetadata {
                date: Some(date(2024, 6, 1)),
                ..Default::default()
            }),
            result("dated-out", 0.8, ChunkMetadata {
                date: Some(date(2023, 6, 1)),
                ..Default::default()
            }),
            result("undated", 0.7, ChunkMetadata::default()),
        ];

        let filtered = apply_metadata_filters(results, &filters);
        let ids: Vec<&str> = filtered.iter().map(|r| r.chunk.id.as_str()).collect();
        assert_eq!(ids, vec!["dated-in", "undated"]);
    }

    #[test]
    fn test_date_range_bounds_are_inclusive() {
        let filters = QueryFilters {
            date_range: Some(DateRange {
                start: date(2024, 1, 1),
                end: date(2024, 12, 31),
            }),
            ..Default::default()
        };

        let results = vec![
            result("start", 0.9, ChunkMetadata {
                date: Some(date(2024, 1, 1)),
                ..Default::default()
            }),
            result("end", 0.8, ChunkMetadata {
                date: Some(date(2024, 12, 31)),
                ..Default::default()
            }),
        ];

        assert_eq!(apply_metadata_filters(results, &filters).len(), 2);
    }

    #[test]
    fn test_source_type_and_author_filters_fail_open() {
        let filters = QueryFilters {
            source_types: Some(vec!["google_drive".to_string()]),
            authors: Some(vec!["Martin".to_string()]),
            ..Default::default()
        };

        let results = vec![
            result("match", 0.9, ChunkMetadata {
                source_type: Some("google_drive".to_string()),
                author: Some("Martin".to_string()),
                ..Default::default()
            }),
            result("wrong-source", 0.8, ChunkMetadata {
                source_type: Some("teams".to_string()),
                ..Default::default()
            }),
            result("wrong-author", 0.7, ChunkMetadata {
                author: Some("Sophie".to_string()),
                ..Default::default()
            }),
            result("no-metadata", 0.6, ChunkMetadata::default()),
        ];

        let filtered = apply_metadata_filters(results, &filters);
        let ids: Vec<&str> = filtered.iter().map(|r| r.chunk.id.as_str()).collect();
        assert_eq!(ids, vec!["match", "no-metadata"]);
    }

    #[test]
    fn test_factual_definition_bonus_outranks_equal_score() {
        let results = vec![
            result("plain", 0.8, ChunkMetadata::default()),
            result("definition", 0.8, ChunkMetadata {
                is_definition: true,
                ..Default::default()
            }),
        ];

        let ranked = rerank_results(results, QueryType::Factual, "Quelle est la définition de X ?");
        assert_eq!(ranked[0].chunk.id, "definition");
        // Stored similarity is untouched
        assert_eq!(ranked[0].similarity, 0.8);
    }

    #[test]
    fn test_procedural_steps_bonus() {
        let results = vec![
            result("plain", 0.85, ChunkMetadata::default()),
            result("steps", 0.75, ChunkMetadata {
                contains_steps: true,
                ..Default::default()
            }),
        ];

        // 0.75 + 0.15 = 0.90 beats 0.85
        let ranked = rerank_results(results, QueryType::Procedural, "Comment faire ?");
        assert_eq!(ranked[0].chunk.id, "steps");
    }

    #[test]
    fn test_comparative_comparison_bonus() {
        let results = vec![
            result("plain", 0.9, ChunkMetadata::default()),
            result("comparison", 0.75, ChunkMetadata {
                is_comparison: true,
                ..Default::default()
            }),
        ];

        // 0.75 + 0.2 = 0.95 beats 0.9
        let ranked = rerank_results(results, QueryType::Comparative, "A versus B ?");
        assert_eq!(ranked[0].chunk.id, "comparison");
    }

    #[test]
    fn test_bonus_does_not_apply_to_other_categories() {
        let results = vec![
            result("definition", 0.8, ChunkMetadata {
                is_definition: true,
                ..Default::default()
            }),
            result("plain", 0.81, ChunkMetadata::default()),
        ];

        let ranked = rerank_results(results, QueryType::General, "n'importe quoi");
        assert_eq!(ranked[0].chunk.id, "plain");
    }

    #[test]
    fn test_recency_bonus_for_time_sensitive_queries() {
        let results = vec![
            result("old", 0.8, ChunkMetadata {
                date: Some(date(2023, 1, 1)),
                ..Default::default()
            }),
            result("new", 0.8, ChunkMetadata {
                date: Some(date(2024, 1, 1)),
                ..Default::default()
            }),
        ];

        let ranked = rerank_results(results, QueryType::General, "Quel est le dernier rapport ?");
        assert_eq!(ranked[0].chunk.id, "new");
    }

    #[test]
    fn test_recency_bonus_requires_both_dates() {
        let results = vec![
            result("dated", 0.8, ChunkMetadata {
                date: Some(date(2024, 1, 1)),
                ..Default::default()
            }),
            result("undated", 0.81, ChunkMetadata::default()),
        ];

        let ranked = rerank_results(results, QueryType::General, "le rapport le plus récent");
        assert_eq!(ranked[0].chunk.id, "undated");
    }

    #[test]
    fn test_rerank_preserves_membership() {
        let results: Vec<SearchResult> = (0..10)
            .map(|i| result(&format!("c{}", i), 0.5 + (i as f32) * 0.01, ChunkMetadata::default()))
            .collect();

        let ranked = rerank_results(results.clone(), QueryType::Factual, "quel budget ?");
        assert_eq!(ranked.len(), results.len());

        let mut before: Vec<String> = results.iter().map(|r| r.chunk.id.clone()).collect();
        let mut after: Vec<String> = ranked.iter().map(|r| r.chunk.id.clone()).collect();
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }

    #[test]
    fn test_order_by_similarity_descending() {
        let results = vec![
            result("low", 0.3, ChunkMetadata::default()),
            result("high", 0.9, ChunkMetadata::default()),
            result("mid", 0.6, ChunkMetadata::default()),
        ];

        let ordered = order_by_similarity(results);
        let ids: Vec<&str> = ordered.iter().map(|r| r.chunk.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "mid", "low"]);
    }
}
