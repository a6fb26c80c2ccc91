use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

use crate::case::{CaseRecord, Corpus};

pub struct CorpusReader;

impl CorpusReader {
    /// Load every case record from a corpus file.
    pub async fn read_file(path: &Path) -> Result<Vec<CaseRecord>> {
        let content = fs::read_to_string(path)
            .await
            .context(format!("Failed to read corpus file: {:?}", path))?;

        let corpus: Corpus = serde_json::from_str(&content)
            .context(format!("Failed to parse corpus file: {:?}", path))?;

        Ok(corpus.cases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_read_corpus_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "cases": [
                    {{
                        "filename": "case1.pdf",
                        "chunks": [{{"element_id": "c1", "text": "some text"}}],
                        "entities": [],
                        "relationships": []
                    }}
                ]
            }}"#
        )
        .unwrap();

        let cases = CorpusReader::read_file(file.path()).await.unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].filename, "case1.pdf");
        assert_eq!(cases[0].chunks[0].page_number, 1);
    }

    #[tokio::test]
    async fn test_missing_file_is_error() {
        let result = CorpusReader::read_file(Path::new("no/such/corpus.json")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_malformed_corpus_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json at all").unwrap();

        let result = CorpusReader::read_file(file.path()).await;
        assert!(result.is_err());
    }
}
