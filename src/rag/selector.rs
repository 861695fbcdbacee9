//! Document selection by caller-supplied criteria.
//!
//! The four filter dimensions compose by progressive intersection: each
//! supplied filter narrows the set built so far, so "these tags" plus "this
//! name fragment" expresses a precise AND. A caller who supplies nothing at
//! all falls back to the full collection rather than an empty set.

use std::collections::HashSet;

use crate::store::{EmbeddingVector, StoredDocument};

/// Request-scoped filters. Every field is optional; `use_all` forces the
/// full collection regardless of the other filters.
#[derive(Debug, Clone, Default)]
pub struct SelectionCriteria {
    pub ids: Vec<String>,
    pub name_substrings: Vec<String>,
    pub tags: Vec<String>,
    pub use_all: bool,
}

impl SelectionCriteria {
    /// True when no filter dimension was supplied at all.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
            && self.name_substrings.is_empty()
            && self.tags.is_empty()
            && !self.use_all
    }
}

/// Resolve `criteria` against the full collection into a working subset
/// plus human-readable descriptions of the filters that were applied.
///
/// An empty subset with accurate descriptions is a valid outcome; the
/// caller must surface "0 documents selected" rather than fabricate
/// context.
pub fn select(
    criteria: &SelectionCriteria,
    all_documents: &[(StoredDocument, EmbeddingVector)],
) -> (Vec<(StoredDocument, EmbeddingVector)>, Vec<String>) {
    let mut subset: Option<Vec<&(StoredDocument, EmbeddingVector)>> = None;
    let mut descriptions = Vec::new();

    if !criteria.ids.is_empty() {
        let wanted: HashSet<&str> = criteria.ids.iter().map(String::as_str).collect();
        let by_id: Vec<_> = all_documents
            .iter()
            .filter(|(doc, _)| wanted.contains(doc.id.as_str()))
            .collect();
        subset = Some(by_id);
        descriptions.push(format!("ids: {}", criteria.ids.join(", ")));
    }

    if !criteria.name_substrings.is_empty() {
        let fragments: Vec<String> = criteria
            .name_substrings
            .iter()
            .map(|s| s.to_lowercase())
            .collect();
        let by_name: Vec<_> = all_documents
            .iter()
            .filter(|(doc, _)| {
                let name = doc.name.to_lowercase();
                let source = doc.source.to_lowercase();
                fragments
                    .iter()
                    .any(|fragment| name.contains(fragment) || source.contains(fragment))
            })
            .collect();
        subset = Some(intersect_or_set(subset, by_name));
        descriptions.push(format!("names: {}", criteria.name_substrings.join(", ")));
    }

    if !criteria.tags.is_empty() {
        let wanted: HashSet<&str> = criteria.tags.iter().map(String::as_str).collect();
        let by_tag: Vec<_> = all_documents
            .iter()
            .filter(|(doc, _)| doc.tags.iter().any(|tag| wanted.contains(tag.as_str())))
            .collect();
        subset = Some(intersect_or_set(subset, by_tag));
        descriptions.push(format!("tags: {}", criteria.tags.join(", ")));
    }

    if criteria.use_all || (subset.is_none() && criteria.is_empty()) {
        subset = Some(all_documents.iter().collect());
        descriptions.push("all documents".to_string());
    }

    let resolved = subset
        .unwrap_or_default()
        .into_iter()
        .cloned()
        .collect();

    (resolved, descriptions)
}

/// Keep the current subset's order, retaining only entries also present in
/// `filtered` (matched by document id); or start from `filtered` when no
/// subset exists yet.
fn intersect_or_set<'a>(
    subset: Option<Vec<&'a (StoredDocument, EmbeddingVector)>>,
    filtered: Vec<&'a (StoredDocument, EmbeddingVector)>,
) -> Vec<&'a (StoredDocument, EmbeddingVector)> {
    match subset {
        Some(current) => {
            let keep: HashSet<&str> = filtered.iter().map(|(doc, _)| doc.id.as_str()).collect();
            current
                .into_iter()
                .filter(|(doc, _)| keep.contains(doc.id.as_str()))
                .collect()
        }
        None => filtered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, name: &str, tags: &[&str]) -> (StoredDocument, EmbeddingVector) {
        (
            StoredDocument {
                id: id.to_string(),
                name: name.to_string(),
                source: String::new(),
                content: String::new(),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                created_at: String::new(),
            },
            vec![1.0],
        )
    }

    fn ids(subset: &[(StoredDocument, EmbeddingVector)]) -> Vec<&str> {
        subset.iter().map(|(d, _)| d.id.as_str()).collect()
    }

    #[test]
    fn zero_criteria_falls_back_to_all_documents() {
        let corpus = vec![doc("1", "A.csv", &["x"]), doc("2", "B.csv", &["y"])];

        let (subset, descriptions) = select(&SelectionCriteria::default(), &corpus);

        assert_eq!(subset.len(), 2);
        assert_eq!(descriptions, vec!["all documents"]);
    }

    #[test]
    fn single_tag_filter_matches_exactly() {
        let corpus = vec![doc("1", "A.csv", &["x"]), doc("2", "B.csv", &["y"])];
        let criteria = SelectionCriteria {
            tags: vec!["x".to_string()],
            ..Default::default()
        };

        let (subset, descriptions) = select(&criteria, &corpus);

        assert_eq!(ids(&subset), vec!["1"]);
        assert_eq!(descriptions.len(), 1);
        assert!(descriptions[0].contains("tags"));
    }

    #[test]
    fn tags_and_names_intersect() {
        let corpus = vec![
            doc("1", "income-2024.csv", &["financial"]),
            doc("2", "income-notes.txt", &["personal"]),
            doc("3", "budget.csv", &["financial"]),
        ];
        let criteria = SelectionCriteria {
            name_substrings: vec!["income".to_string()],
            tags: vec!["financial".to_string()],
            ..Default::default()
        };

        let (subset, descriptions) = select(&criteria, &corpus);

        // Either filter alone matches two documents; together only one.
        assert_eq!(ids(&subset), vec!["1"]);
        assert_eq!(descriptions.len(), 2);
    }

    #[test]
    fn name_match_is_case_insensitive_and_checks_source() {
        let mut by_source = doc("1", "upload", &[]);
        by_source.0.source = "Quarterly-Income.xlsx".to_string();
        let corpus = vec![by_source, doc("2", "other.txt", &[])];
        let criteria = SelectionCriteria {
            name_substrings: vec!["INCOME".to_string()],
            ..Default::default()
        };

        let (subset, _) = select(&criteria, &corpus);

        assert_eq!(ids(&subset), vec!["1"]);
    }

    #[test]
    fn id_filter_then_tag_filter_narrows() {
        let corpus = vec![
            doc("1", "a", &["x"]),
            doc("2", "b", &["x"]),
            doc("3", "c", &["y"]),
        ];
        let criteria = SelectionCriteria {
            ids: vec!["1".to_string(), "3".to_string()],
            tags: vec!["x".to_string()],
            ..Default::default()
        };

        let (subset, _) = select(&criteria, &corpus);

        assert_eq!(ids(&subset), vec!["1"]);
    }

    #[test]
    fn no_match_returns_empty_with_descriptions() {
        let corpus = vec![doc("1", "a", &["x"])];
        let criteria = SelectionCriteria {
            tags: vec!["missing".to_string()],
            ..Default::default()
        };

        let (subset, descriptions) = select(&criteria, &corpus);

        assert!(subset.is_empty());
        assert_eq!(descriptions.len(), 1);
    }

    #[test]
    fn use_all_overrides_other_filters() {
        let corpus = vec![doc("1", "a", &["x"]), doc("2", "b", &["y"])];
        let criteria = SelectionCriteria {
            tags: vec!["x".to_string()],
            use_all: true,
            ..Default::default()
        };

        let (subset, descriptions) = select(&criteria, &corpus);

        assert_eq!(subset.len(), 2);
        assert!(descriptions.iter().any(|d| d == "all documents"));
    }
}
