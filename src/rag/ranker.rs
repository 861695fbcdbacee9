//! Similarity ranking over the document corpus.
//!
//! Exhaustive scan, no index: every corpus entry is scored against the
//! query vector, entries below the threshold are dropped, and the rest are
//! returned best-first, capped at `max_results`.

use crate::store::{EmbeddingVector, StoredDocument};

/// A document paired with its cosine similarity to the query, in [-1, 1].
#[derive(Debug, Clone)]
pub struct ScoredMatch {
    pub document: StoredDocument,
    pub similarity: f32,
}

/// Cosine similarity between two equal-length vectors.
///
/// Returns exactly 0.0 when either magnitude is zero; a zero vector carries
/// no direction to compare, so that is the defined answer, not an error.
/// Mismatched lengths are a programming error.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "embedding length mismatch");

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Score the corpus against the query vector, drop entries below
/// `threshold`, sort descending (stable, so ties keep corpus order) and
/// take the first `max_results`.
///
/// An empty corpus, or a corpus with nothing above the threshold, yields an
/// empty result; the caller decides what that means.
pub fn rank(
    query: &[f32],
    corpus: &[(StoredDocument, EmbeddingVector)],
    threshold: f32,
    max_results: usize,
) -> Vec<ScoredMatch> {
    let mut matches: Vec<ScoredMatch> = corpus
        .iter()
        .map(|(document, embedding)| ScoredMatch {
            document: document.clone(),
            similarity: cosine_similarity(query, embedding),
        })
        .filter(|m| m.similarity >= threshold)
        .collect();

    matches.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    matches.truncate(max_results);

    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str) -> StoredDocument {
        StoredDocument {
            id: id.to_string(),
            name: format!("{}.txt", id),
            source: String::new(),
            content: String::new(),
            tags: Vec::new(),
            created_at: String::new(),
        }
    }

    fn approx_eq(left: f32, right: f32) -> bool {
        (left - right).abs() < 1e-5
    }

    #[test]
    fn cosine_is_symmetric() {
        let a = vec![0.3, -1.2, 4.0, 0.5];
        let b = vec![1.0, 2.0, -0.5, 3.3];
        assert!(approx_eq(cosine_similarity(&a, &b), cosine_similarity(&b, &a)));
    }

    #[test]
    fn cosine_is_one_for_identical_vectors() {
        let v = vec![1.0, 2.0, 3.0];
        assert!(approx_eq(cosine_similarity(&v, &v), 1.0));
    }

    #[test]
    fn zero_vector_scores_exactly_zero_not_nan() {
        let zero = vec![0.0, 0.0, 0.0];
        let other = vec![1.0, 2.0, 3.0];
        let score = cosine_similarity(&zero, &other);
        assert_eq!(score, 0.0);
        assert!(!score.is_nan());
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
    }

    #[test]
    fn rank_sorts_descending_and_caps_results() {
        let corpus = vec![
            (doc("low"), vec![0.5, 0.5]),
            (doc("best"), vec![1.0, 0.0]),
            (doc("mid"), vec![0.9, 0.1]),
            (doc("off"), vec![0.0, 1.0]),
        ];
        let query = vec![1.0, 0.0];

        let matches = rank(&query, &corpus, 0.3, 2);

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].document.id, "best");
        assert_eq!(matches[1].document.id, "mid");
        assert!(matches.iter().all(|m| m.similarity >= 0.3));
        assert!(matches[0].similarity >= matches[1].similarity);
    }

    #[test]
    fn rank_breaks_ties_by_corpus_order() {
        let corpus = vec![
            (doc("first"), vec![1.0, 0.0]),
            (doc("second"), vec![2.0, 0.0]),
            (doc("third"), vec![0.5, 0.0]),
        ];
        let query = vec![1.0, 0.0];

        let matches = rank(&query, &corpus, 0.0, 10);

        // All three score 1.0; stable sort keeps insertion order.
        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0].document.id, "first");
        assert_eq!(matches[1].document.id, "second");
        assert_eq!(matches[2].document.id, "third");
    }

    #[test]
    fn empty_corpus_and_high_threshold_yield_empty() {
        let query = vec![1.0, 0.0];
        assert!(rank(&query, &[], 0.0, 5).is_empty());

        let corpus = vec![(doc("d"), vec![0.0, 1.0])];
        assert!(rank(&query, &corpus, 0.9, 5).is_empty());
    }
}
