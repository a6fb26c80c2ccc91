use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::json;

use crate::bulk::{self, BulkOperation, BulkReport};
use crate::embeddings::EMBEDDING_DIMENSION;

pub const CHUNKS_INDEX: &str = "law_chunks";
pub const ENTITIES_INDEX: &str = "law_entities";
pub const RELATIONSHIPS_INDEX: &str = "law_relationships";

/// The bulk request carries the entire corpus in one round trip; give the
/// server more room than the default client timeout.
const BULK_TIMEOUT: Duration = Duration::from_secs(60);

pub struct OpenSearchIndexer {
    base_url: String,
    auth: Option<(String, String)>,
    client: reqwest::Client,
}

impl OpenSearchIndexer {
    pub fn new(
        base_url: String,
        auth: Option<(String, String)>,
        insecure: bool,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(insecure)
            .build()
            .context("Failed to build OpenSearch HTTP client")?;

        Ok(Self {
            base_url,
            auth,
            client,
        })
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Some((username, password)) => builder.basic_auth(username, Some(password)),
            None => builder,
        }
    }

    /// Create the three indices, skipping any that already exist.
    pub async fn ensure_indices(&self) -> Result<()> {
        let indices = [
            (CHUNKS_INDEX, chunks_index_body()),
            (ENTITIES_INDEX, entities_index_body()),
            (RELATIONSHIPS_INDEX, relationships_index_body()),
        ];

        for (name, body) in indices {
            self.create_index(name, body).await?;
        }

        Ok(())
    }

    async fn create_index(&self, name: &str, body: serde_json::Value) -> Result<()> {
        let url = format!("{}/{}", self.base_url, name);
        let response = self
            .request(self.client.put(&url))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to send create request for index {}", name))?;

        if response.status().is_success() {
            println!("Created index: {}", name);
            return Ok(());
        }

        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();

        if index_already_exists(&error_text) {
            println!("Index {} already exists, skipping create", name);
            return Ok(());
        }

        anyhow::bail!("Failed to create index {} ({}): {}", name, status, error_text);
    }

    /// Submit every operation as a single bulk request and report per-item
    /// outcomes. An empty batch sends nothing.
    pub async fn bulk_write(&self, operations: &[BulkOperation]) -> Result<BulkReport> {
        if operations.is_empty() {
            return Ok(BulkReport::default());
        }

        let body = bulk::encode_operations(operations)?;
        let url = format!("{}/_bulk?refresh=true", self.base_url);

        let response = self
            .request(self.client.post(&url))
            .header("content-type", "application/x-ndjson")
            .timeout(BULK_TIMEOUT)
            .body(body)
            .send()
            .await
            .context("Failed to send bulk request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Bulk request failed ({}): {}", status, error_text);
        }

        let text = response
            .text()
            .await
            .context("Failed to read bulk response")?;
        bulk::parse_response(&text)
    }
}

/// A create against an existing index is not a failure; detect the rejection
/// by its exception type, with a substring fallback for older servers.
fn index_already_exists(error_body: &str) -> bool {
    error_body.contains("resource_already_exists_exception")
        || error_body.to_lowercase().contains("already exists")
}

fn chunks_index_body() -> serde_json::Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "index.knn": true
        },
        "mappings": {
            "properties": {
                "element_id": {"type": "keyword"},
                "text": {"type": "text"},
                "filename": {"type": "keyword"},
                "page_number": {"type": "integer"},
                "entity_names": {"type": "keyword"},
                "text_embedding": {
                    "type": "knn_vector",
                    "dimension": EMBEDDING_DIMENSION,
                    "method": {
                        "name": "hnsw",
                        "engine": "lucene",
                        "space_type": "cosinesimil",
                        "parameters": {
                            "ef_construction": 128,
                            "m": 24
                        }
                    }
                }
            }
        }
    })
}

fn entities_index_body() -> serde_json::Value {
    json!({
        "settings": {
            "number_of_shards": 1
        },
        "mappings": {
            "properties": {
                "entity_id": {"type": "keyword"},
                "entity_name": {"type": "keyword"},
                "entity_type": {"type": "keyword"},
                "source_element_ids": {"type": "keyword"},
                "source_text_snippet": {"type": "text"},
                "filename": {"type": "keyword"},
                "page_number": {"type": "integer"}
            }
        }
    })
}

fn relationships_index_body() -> serde_json::Value {
    json!({
        "settings": {
            "number_of_shards": 1
        },
        "mappings": {
            "properties": {
                "from_entity": {"type": "keyword"},
                "to_entity": {"type": "keyword"},
                "relationship_type": {"type": "keyword"},
                "source_element_id": {"type": "keyword"},
                "source_text_snippet": {"type": "text"},
                "filename": {"type": "keyword"},
                "page_number": {"type": "integer"}
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_exists_detection() {
        let body = r#"{"error":{"type":"resource_already_exists_exception","reason":"index [law_chunks/abc] already exists"}}"#;
        assert!(index_already_exists(body));

        assert!(index_already_exists("index law_chunks Already Exists"));
        assert!(!index_already_exists(
            r#"{"error":{"type":"mapper_parsing_exception"}}"#
        ));
    }

    #[test]
    fn test_chunks_mapping_declares_knn_vector() {
        let body = chunks_index_body();

        assert_eq!(body.pointer("/settings/index.knn"), Some(&json!(true)));
        assert_eq!(
            body.pointer("/mappings/properties/text_embedding/dimension"),
            Some(&json!(1536))
        );
        assert_eq!(
            body.pointer("/mappings/properties/text_embedding/method/name"),
            Some(&json!("hnsw"))
        );
        assert_eq!(
            body.pointer("/mappings/properties/text_embedding/method/space_type"),
            Some(&json!("cosinesimil"))
        );
    }

    #[test]
    fn test_flat_mappings_have_no_knn_settings() {
        for body in [entities_index_body(), relationships_index_body()] {
            assert_eq!(body.pointer("/settings/number_of_shards"), Some(&json!(1)));
            assert!(body.pointer("/settings/index.knn").is_none());
        }
    }

    #[test]
    fn test_entity_mapping_covers_document_fields() {
        let body = entities_index_body();
        let properties = body
            .pointer("/mappings/properties")
            .and_then(|v| v.as_object())
            .unwrap();

        for field in [
            "entity_id",
            "entity_name",
            "entity_type",
            "source_element_ids",
            "source_text_snippet",
            "filename",
            "page_number",
        ] {
            assert!(properties.contains_key(field), "missing field {}", field);
        }
    }
}
