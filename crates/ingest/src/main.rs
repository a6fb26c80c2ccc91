use anyhow::Result;

use corpus::CorpusReader;
use index::{build_operations, EmbeddingClient, OpenSearchIndexer};
use resolve::DocumentBuilder;

mod config;

use config::IngestConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = IngestConfig::from_env()?;

    if !config.corpus_path.exists() {
        anyhow::bail!("Corpus file not found: {}", config.corpus_path.display());
    }

    let cases = CorpusReader::read_file(&config.corpus_path).await?;
    tracing::info!(
        cases = cases.len(),
        path = %config.corpus_path.display(),
        "Loaded corpus"
    );

    let embedding_client = EmbeddingClient::new(config.openai_api_key, config.truncation);
    if !embedding_client.is_enabled() {
        tracing::warn!("OPENAI_API_KEY not set, chunk embeddings will be zero vectors");
    }

    let indexer = OpenSearchIndexer::new(
        config.opensearch_url,
        config.opensearch_auth,
        config.opensearch_insecure,
    )?;
    indexer.ensure_indices().await?;

    let mut builder = DocumentBuilder::new();
    builder.fold_all(&cases, &embedding_client).await?;
    let documents = builder.finish();

    let operations = build_operations(&documents)?;
    let report = indexer.bulk_write(&operations).await?;

    if report.errors.is_empty() {
        println!(
            "Indexed {} chunks, {} entities, {} relationships.",
            documents.chunks.len(),
            documents.entities.len(),
            documents.relationships.len()
        );
    } else {
        for error in &report.errors {
            eprintln!("Bulk error: {}", error);
        }
        println!(
            "Indexed {} of {} documents ({} failed).",
            report.succeeded,
            operations.len(),
            report.errors.len()
        );
    }

    Ok(())
}
