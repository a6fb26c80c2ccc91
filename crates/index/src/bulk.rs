use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::json;

use resolve::DocumentSet;

use crate::opensearch_index::{CHUNKS_INDEX, ENTITIES_INDEX, RELATIONSHIPS_INDEX};

/// One document destined for the bulk request, with its target index and id.
#[derive(Debug, Clone)]
pub struct BulkOperation {
    pub index: String,
    pub id: String,
    pub document: serde_json::Value,
}

/// Outcome of a bulk write. A rejected item never fails the batch; it lands
/// here as a `BulkError` instead.
#[derive(Debug, Default)]
pub struct BulkReport {
    pub succeeded: usize,
    pub errors: Vec<BulkError>,
}

#[derive(Debug)]
pub struct BulkError {
    pub index: String,
    pub id: String,
    pub status: u16,
    pub reason: String,
}

impl std::fmt::Display for BulkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} ({}): {}", self.index, self.id, self.status, self.reason)
    }
}

/// Flatten a document set into bulk operations, chunks first, then entities,
/// then relationships. Chunk and entity documents carry their own ids;
/// relationship ids are assigned here from batch position.
pub fn build_operations(documents: &DocumentSet) -> Result<Vec<BulkOperation>> {
    let mut operations = Vec::new();

    for chunk in &documents.chunks {
        operations.push(BulkOperation {
            index: CHUNKS_INDEX.to_string(),
            id: chunk.element_id.clone(),
            document: serde_json::to_value(chunk).context("Failed to serialize chunk document")?,
        });
    }

    for entity in &documents.entities {
        operations.push(BulkOperation {
            index: ENTITIES_INDEX.to_string(),
            id: entity.entity_id.clone(),
            document: serde_json::to_value(entity).context("Failed to serialize entity document")?,
        });
    }

    for (i, relationship) in documents.relationships.iter().enumerate() {
        operations.push(BulkOperation {
            index: RELATIONSHIPS_INDEX.to_string(),
            id: format!("rel_{:03}", i + 1),
            document: serde_json::to_value(relationship)
                .context("Failed to serialize relationship document")?,
        });
    }

    Ok(operations)
}

/// Encode operations as NDJSON: an action line then a source line per
/// document, each newline-terminated (the trailing newline is mandatory).
pub fn encode_operations(operations: &[BulkOperation]) -> Result<String> {
    let mut body = String::new();

    for operation in operations {
        let action = json!({
            "index": {
                "_index": operation.index,
                "_id": operation.id,
            }
        });
        body.push_str(&serde_json::to_string(&action).context("Failed to encode bulk action")?);
        body.push('\n');
        body.push_str(
            &serde_json::to_string(&operation.document)
                .context("Failed to encode bulk document")?,
        );
        body.push('\n');
    }

    Ok(body)
}

#[derive(Deserialize)]
struct BulkResponse {
    items: Vec<BulkResponseItem>,
}

#[derive(Deserialize)]
struct BulkResponseItem {
    index: BulkItemResult,
}

#[derive(Deserialize)]
struct BulkItemResult {
    #[serde(rename = "_index")]
    index: String,
    #[serde(rename = "_id")]
    id: String,
    status: u16,
    error: Option<BulkItemFailure>,
}

#[derive(Deserialize)]
struct BulkItemFailure {
    #[serde(rename = "type")]
    error_type: String,
    reason: Option<String>,
}

/// Read per-item outcomes out of a bulk response body.
pub fn parse_response(body: &str) -> Result<BulkReport> {
    let response: BulkResponse =
        serde_json::from_str(body).context("Failed to parse bulk response")?;

    let mut report = BulkReport::default();
    for item in response.items {
        let result = item.index;
        match result.error {
            None => report.succeeded += 1,
            Some(failure) => {
                let reason = match failure.reason {
                    Some(reason) => format!("{}: {}", failure.error_type, reason),
                    None => failure.error_type,
                };
                report.errors.push(BulkError {
                    index: result.index,
                    id: result.id,
                    status: result.status,
                    reason,
                });
            }
        }
    }

    Ok(report)
}
