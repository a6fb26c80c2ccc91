use corpus::{EntityMention, RelationshipMention};

/// Entity names textually present in a chunk.
///
/// A tagged name counts when its literal string occurs anywhere in the chunk
/// text: case-sensitive, no token boundaries, so a short name can match
/// inside a longer word.
///
/// A relationship counts as a unit: when either participant's name occurs in
/// the text, both participants are associated. Result order is first-seen,
/// tagged names before relationship participants.
pub fn associated_entity_names(
    chunk_text: &str,
    entities: &[EntityMention],
    relationships: &[RelationshipMention],
) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();

    for mention in entities {
        if chunk_text.contains(&mention.name) && !names.contains(&mention.name) {
            names.push(mention.name.clone());
        }
    }

    for rel in relationships {
        if chunk_text.contains(&rel.from_name) || chunk_text.contains(&rel.to_name) {
            for name in [&rel.from_name, &rel.to_name] {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
    }

    names
}
