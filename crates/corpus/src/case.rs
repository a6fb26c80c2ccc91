use serde::{Deserialize, Serialize};

/// One source document: pre-chunked text plus the entities and relationships
/// upstream extraction tagged on it. Read-only input to the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseRecord {
    pub filename: String,
    pub chunks: Vec<Chunk>,
    pub entities: Vec<EntityMention>,
    pub relationships: Vec<RelationshipMention>,
}

/// A contiguous span of case text, the atomic unit of indexing.
///
/// `element_id` is unique within the corpus and doubles as the persisted
/// document key, so re-ingesting an unchanged corpus overwrites instead of
/// duplicating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub element_id: String,
    pub text: String,
    #[serde(default = "default_page_number")]
    pub page_number: u32,
}

fn default_page_number() -> u32 {
    1
}

/// An entity tagged on a case, scoped to that case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityMention {
    #[serde(rename = "entity")]
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: String,
}

/// A relationship tagged on a case. Participants are entity names; either
/// side may name an entity that was never separately tagged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipMention {
    #[serde(rename = "from")]
    pub from_name: String,
    #[serde(rename = "to")]
    pub to_name: String,
    #[serde(rename = "relationship")]
    pub relationship_type: String,
}

/// Top-level shape of the corpus file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Corpus {
    pub cases: Vec<CaseRecord>,
}
