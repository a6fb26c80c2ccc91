use corpus::CaseRecord;
use serde::{Deserialize, Serialize};

/// Character cap on the representative snippet stamped onto entity and
/// relationship documents.
pub const SNIPPET_MAX_CHARS: usize = 500;

/// Representative metadata for one case, taken from its first chunk and
/// stamped onto every entity and relationship the case contributes.
#[derive(Debug, Clone)]
pub struct CaseProvenance {
    pub snippet: String,
    pub filename: String,
    pub page_number: u32,
    pub first_element_id: String,
}

impl CaseProvenance {
    pub fn from_case(case: &CaseRecord) -> Self {
        match case.chunks.first() {
            Some(chunk) => Self {
                snippet: truncate_chars(&chunk.text, SNIPPET_MAX_CHARS).to_string(),
                filename: case.filename.clone(),
                page_number: chunk.page_number,
                first_element_id: chunk.element_id.clone(),
            },
            None => Self {
                snippet: String::new(),
                filename: case.filename.clone(),
                page_number: 1,
                first_element_id: String::new(),
            },
        }
    }
}

/// Cut `text` to at most `max` characters, always on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Deduplicated, identity-stable entity record built during one run.
/// Field names are the persisted store fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedEntity {
    pub entity_id: String,
    pub entity_name: String,
    pub entity_type: String,
    pub source_element_ids: Vec<String>,
    pub source_text_snippet: String,
    pub filename: String,
    pub page_number: u32,
}

/// A relationship document. References entities by name, not by resolved
/// identifier; no referential integrity is enforced against entity docs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipDoc {
    pub from_entity: String,
    pub to_entity: String,
    pub relationship_type: String,
    pub source_element_id: String,
    pub source_text_snippet: String,
    pub filename: String,
    pub page_number: u32,
}

/// A chunk document carrying its embedding and the entity names textually
/// present in it, in first-seen order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkDoc {
    pub element_id: String,
    pub text: String,
    pub filename: String,
    pub page_number: u32,
    pub entity_names: Vec<String>,
    pub text_embedding: Vec<f32>,
}

/// Everything one run produces, ready for bulk submission.
#[derive(Debug, Clone)]
pub struct DocumentSet {
    pub chunks: Vec<ChunkDoc>,
    pub entities: Vec<ResolvedEntity>,
    pub relationships: Vec<RelationshipDoc>,
}
