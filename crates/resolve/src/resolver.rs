use std::collections::HashMap;

use crate::docs::{CaseProvenance, ResolvedEntity};

/// Type assigned to entities that only ever appear as relationship
/// participants, never as tagged mentions.
pub const GENERIC_ENTITY_TYPE: &str = "ENTITY";

/// Assigns and memoizes one stable identity per entity key for the duration
/// of a run.
///
/// Tagged mentions key on exact `(name, type)`, so the same name under two
/// types stays two entities. Relationship participants instead match any
/// known entity by name alone and only create (under [`GENERIC_ENTITY_TYPE`])
/// when the name is entirely unknown. That asymmetry is deliberate.
///
/// Identifiers come from a monotonic counter in discovery order: stable
/// within a run, not across runs. Key on `(entity_name, entity_type)` in the
/// store if cross-run identity matters.
pub struct EntityResolver {
    entities: Vec<ResolvedEntity>,
    by_key: HashMap<String, usize>,
    counter: usize,
}

impl EntityResolver {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            by_key: HashMap::new(),
            counter: 0,
        }
    }

    fn entity_key(name: &str, entity_type: &str) -> String {
        format!("{}|{}", name, entity_type)
    }

    /// Get or create the entity for a tagged `(name, type)` mention.
    pub fn resolve_tagged(
        &mut self,
        name: &str,
        entity_type: &str,
        provenance: &CaseProvenance,
    ) -> &ResolvedEntity {
        let key = Self::entity_key(name, entity_type);
        let idx = match self.by_key.get(&key) {
            Some(&idx) => idx,
            None => self.insert(key, name, entity_type, provenance),
        };
        &self.entities[idx]
    }

    /// Get or create the entity for a relationship participant, matching any
    /// known entity with this name regardless of type.
    pub fn resolve_participant(
        &mut self,
        name: &str,
        provenance: &CaseProvenance,
    ) -> &ResolvedEntity {
        let idx = match self.entities.iter().position(|e| e.entity_name == name) {
            Some(idx) => idx,
            None => {
                let key = Self::entity_key(name, GENERIC_ENTITY_TYPE);
                self.insert(key, name, GENERIC_ENTITY_TYPE, provenance)
            }
        };
        &self.entities[idx]
    }

    fn insert(
        &mut self,
        key: String,
        name: &str,
        entity_type: &str,
        provenance: &CaseProvenance,
    ) -> usize {
        self.counter += 1;
        self.entities.push(ResolvedEntity {
            entity_id: format!("ent_{:03}", self.counter),
            entity_name: name.to_string(),
            entity_type: entity_type.to_string(),
            source_element_ids: Vec::new(),
            source_text_snippet: provenance.snippet.clone(),
            filename: provenance.filename.clone(),
            page_number: provenance.page_number,
        });
        let idx = self.entities.len() - 1;
        self.by_key.insert(key, idx);
        idx
    }

    /// Append `element_id` to the first known entity (discovery order) with
    /// this name, unless it already recorded that chunk. Names that never
    /// resolved are ignored.
    pub fn record_chunk(&mut self, name: &str, element_id: &str) {
        if let Some(entity) = self.entities.iter_mut().find(|e| e.entity_name == name) {
            if !entity.source_element_ids.iter().any(|id| id == element_id) {
                entity.source_element_ids.push(element_id.to_string());
            }
        }
    }

    pub fn entities(&self) -> &[ResolvedEntity] {
        &self.entities
    }

    /// All entities in discovery order.
    pub fn into_entities(self) -> Vec<ResolvedEntity> {
        self.entities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provenance() -> CaseProvenance {
        CaseProvenance {
            snippet: "Acme Corp employs Bob.".to_string(),
            filename: "case1.pdf".to_string(),
            page_number: 1,
            first_element_id: "c1".to_string(),
        }
    }

    #[test]
    fn test_tagged_resolution_is_idempotent() {
        let mut resolver = EntityResolver::new();
        let p = provenance();

        let first = resolver.resolve_tagged("Acme Corp", "ORGANIZATION", &p).entity_id.clone();
        let second = resolver.resolve_tagged("Acme Corp", "ORGANIZATION", &p).entity_id.clone();

        assert_eq!(first, second);
        assert_eq!(resolver.entities().len(), 1);
    }

    #[test]
    fn test_same_name_different_types_stay_distinct() {
        let mut resolver = EntityResolver::new();
        let p = provenance();

        let org = resolver.resolve_tagged("Acme Corp", "ORGANIZATION", &p).entity_id.clone();
        let person = resolver.resolve_tagged("Acme Corp", "PERSON", &p).entity_id.clone();

        assert_ne!(org, person);
        assert_eq!(resolver.entities().len(), 2);
    }

    #[test]
    fn test_participant_reuses_tagged_entity_of_any_type() {
        let mut resolver = EntityResolver::new();
        let p = provenance();

        let tagged = resolver.resolve_tagged("Acme Corp", "ORGANIZATION", &p).entity_id.clone();
        let participant = resolver.resolve_participant("Acme Corp", &p).entity_id.clone();

        assert_eq!(tagged, participant);
        assert_eq!(resolver.entities().len(), 1);
    }

    #[test]
    fn test_unknown_participant_gets_generic_type() {
        let mut resolver = EntityResolver::new();
        let p = provenance();

        resolver.resolve_tagged("Acme Corp", "ORGANIZATION", &p);
        let bob = resolver.resolve_participant("Bob", &p);

        assert_eq!(bob.entity_id, "ent_002");
        assert_eq!(bob.entity_type, GENERIC_ENTITY_TYPE);
        assert_eq!(bob.source_text_snippet, "Acme Corp employs Bob.");
    }

    #[test]
    fn test_participant_resolution_is_idempotent() {
        let mut resolver = EntityResolver::new();
        let p = provenance();

        let first = resolver.resolve_participant("Bob", &p).entity_id.clone();
        let second = resolver.resolve_participant("Bob", &p).entity_id.clone();

        assert_eq!(first, second);
        assert_eq!(resolver.entities().len(), 1);
    }

    #[test]
    fn test_ids_are_zero_padded_and_sequential() {
        let mut resolver = EntityResolver::new();
        let p = provenance();

        assert_eq!(resolver.resolve_tagged("A", "PERSON", &p).entity_id, "ent_001");
        assert_eq!(resolver.resolve_tagged("B", "PERSON", &p).entity_id, "ent_002");
        assert_eq!(resolver.resolve_participant("C", &p).entity_id, "ent_003");
    }

    #[test]
    fn test_record_chunk_appends_once() {
        let mut resolver = EntityResolver::new();
        let p = provenance();

        resolver.resolve_tagged("Acme Corp", "ORGANIZATION", &p);
        resolver.record_chunk("Acme Corp", "c1");
        resolver.record_chunk("Acme Corp", "c1");
        resolver.record_chunk("Acme Corp", "c2");

        assert_eq!(resolver.entities()[0].source_element_ids, vec!["c1", "c2"]);
    }

    #[test]
    fn test_record_chunk_hits_first_matching_entity_only() {
        let mut resolver = EntityResolver::new();
        let p = provenance();

        resolver.resolve_tagged("Acme Corp", "ORGANIZATION", &p);
        resolver.resolve_tagged("Acme Corp", "PERSON", &p);
        resolver.record_chunk("Acme Corp", "c1");

        assert_eq!(resolver.entities()[0].source_element_ids, vec!["c1"]);
        assert!(resolver.entities()[1].source_element_ids.is_empty());
    }

    #[test]
    fn test_record_chunk_ignores_unknown_names() {
        let mut resolver = EntityResolver::new();
        resolver.record_chunk("Nobody", "c1");
        assert!(resolver.entities().is_empty());
    }
}
