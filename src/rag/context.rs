//! Prompt assembly.
//!
//! Deterministic string composition: same documents, query and directive
//! always produce byte-identical output. No summarization, no
//! deduplication.

use crate::store::StoredDocument;

/// Per-document excerpt budget in characters; excerpts keep the start of
/// the content, so total prompt size stays bounded regardless of corpus
/// size.
const EXCERPT_BUDGET: usize = 1_500;

/// Compose the generation prompt from the selected documents, the raw
/// query and an optional output-format directive.
///
/// With zero documents the prompt carries only the query (and directive):
/// a pure-knowledge query, not an error.
pub fn assemble(
    documents: &[StoredDocument],
    query: &str,
    output_format: Option<&str>,
) -> String {
    let mut prompt = String::new();

    if !documents.is_empty() {
        prompt.push_str("Use the following document excerpts to answer the question.\n\n");
        for document in documents {
            let excerpt: String = document.content.chars().take(EXCERPT_BUDGET).collect();
            prompt.push_str("### ");
            prompt.push_str(&document.name);
            prompt.push('\n');
            prompt.push_str(&excerpt);
            prompt.push_str("\n\n");
        }
    }

    if let Some(directive) = output_format.map(str::trim).filter(|d| !d.is_empty()) {
        prompt.push_str("Answer in exactly this format: ");
        prompt.push_str(directive);
        prompt.push_str(
            "\nRespond only in the requested format and do not ask for clarification.\n\n",
        );
    }

    prompt.push_str("Question: ");
    prompt.push_str(query);

    prompt
}
