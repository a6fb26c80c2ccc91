use anyhow::Result;
use async_trait::async_trait;

use corpus::CaseRecord;

use crate::associate::associated_entity_names;
use crate::docs::{CaseProvenance, ChunkDoc, DocumentSet, RelationshipDoc};
use crate::resolver::EntityResolver;

/// Anything that can turn chunk text into a fixed-width vector.
#[async_trait]
pub trait Embedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Folds case records into the three document collections: chunks, entities,
/// relationships. Cases are folded in order, chunks in order within a case,
/// mentions in order within a case, so discovery order (and with it every
/// assigned identifier) is deterministic for a given corpus.
pub struct DocumentBuilder {
    resolver: EntityResolver,
    chunks: Vec<ChunkDoc>,
    relationships: Vec<RelationshipDoc>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self {
            resolver: EntityResolver::new(),
            chunks: Vec::new(),
            relationships: Vec::new(),
        }
    }

    /// Fold one case into the accumulated collections.
    ///
    /// An embedding failure aborts the fold and with it the run; nothing has
    /// been submitted to the store at that point.
    pub async fn fold_case<E: Embedder>(&mut self, case: &CaseRecord, embedder: &E) -> Result<()> {
        let provenance = CaseProvenance::from_case(case);

        for mention in &case.entities {
            self.resolver
                .resolve_tagged(&mention.name, &mention.entity_type, &provenance);
        }

        for rel in &case.relationships {
            self.resolver.resolve_participant(&rel.from_name, &provenance);
            self.resolver.resolve_participant(&rel.to_name, &provenance);
            self.relationships.push(RelationshipDoc {
                from_entity: rel.from_name.clone(),
                to_entity: rel.to_name.clone(),
                relationship_type: rel.relationship_type.clone(),
                source_element_id: provenance.first_element_id.clone(),
                source_text_snippet: provenance.snippet.clone(),
                filename: provenance.filename.clone(),
                page_number: provenance.page_number,
            });
        }

        for chunk in &case.chunks {
            let entity_names =
                associated_entity_names(&chunk.text, &case.entities, &case.relationships);
            let embedding = embedder.embed(&chunk.text).await?;

            for name in &entity_names {
                self.resolver.record_chunk(name, &chunk.element_id);
            }

            self.chunks.push(ChunkDoc {
                element_id: chunk.element_id.clone(),
                text: chunk.text.clone(),
                filename: case.filename.clone(),
                page_number: chunk.page_number,
                entity_names,
                text_embedding: embedding,
            });
        }

        Ok(())
    }

    /// Fold every case in corpus order.
    pub async fn fold_all<E: Embedder>(&mut self, cases: &[CaseRecord], embedder: &E) -> Result<()> {
        for case in cases {
            self.fold_case(case, embedder).await?;
        }
        Ok(())
    }

    /// The accumulated collections, entities in discovery order.
    pub fn finish(self) -> DocumentSet {
        DocumentSet {
            chunks: self.chunks,
            entities: self.resolver.into_entities(),
            relationships: self.relationships,
        }
    }
}
