pub mod bulk;
pub mod embeddings;
pub mod opensearch_index;

pub use bulk::{build_operations, BulkError, BulkOperation, BulkReport};
pub use embeddings::{
    EmbeddingClient, TruncationPolicy, EMBEDDING_DIMENSION, EMBEDDING_MAX_CHARS,
};
pub use opensearch_index::{
    OpenSearchIndexer, CHUNKS_INDEX, ENTITIES_INDEX, RELATIONSHIPS_INDEX,
};
