pub mod associate;
pub mod builder;
pub mod docs;
pub mod resolver;

pub use associate::associated_entity_names;
pub use builder::{DocumentBuilder, Embedder};
pub use docs::{
    CaseProvenance, ChunkDoc, DocumentSet, RelationshipDoc, ResolvedEntity, SNIPPET_MAX_CHARS,
    truncate_chars,
};
pub use resolver::{EntityResolver, GENERIC_ENTITY_TYPE};
