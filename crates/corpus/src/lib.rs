pub mod case;
pub mod reader;

pub use case::{CaseRecord, Chunk, Corpus, EntityMention, RelationshipMention};
pub use reader::CorpusReader;
