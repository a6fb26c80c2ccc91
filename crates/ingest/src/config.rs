use std::env;
use std::path::PathBuf;

use anyhow::Result;
use index::TruncationPolicy;

const DEFAULT_OPENSEARCH_URL: &str = "https://localhost:9200";
const DEFAULT_CORPUS_PATH: &str = "data/law-cases.json";

/// Runtime settings for one ingestion run, resolved from the environment
/// and the command line.
pub struct IngestConfig {
    pub opensearch_url: String,
    pub opensearch_auth: Option<(String, String)>,
    pub opensearch_insecure: bool,
    pub openai_api_key: Option<String>,
    pub truncation: TruncationPolicy,
    pub corpus_path: PathBuf,
}

impl IngestConfig {
    /// Resolve configuration. `.env.local` is loaded before `.env`, and
    /// since dotenv never overrides a variable that is already set, the
    /// local file wins on conflicts.
    pub fn from_env() -> Result<Self> {
        dotenvy::from_filename(".env.local").ok();
        dotenvy::dotenv().ok();

        let raw_url = env_var("OPENSEARCH_URL")
            .or_else(|| env_var("OPENSEARCH_NODE"))
            .unwrap_or_else(|| DEFAULT_OPENSEARCH_URL.to_string());
        let opensearch_url = normalize_url(&raw_url, env_flag("OPENSEARCH_USE_HTTP"));

        let username = env_var("OPENSEARCH_USERNAME").or_else(|| env_var("OPENSEARCH_USER"));
        let password = env_var("OPENSEARCH_PASSWORD");
        let opensearch_auth = username.zip(password);

        let truncation = match env_var("EMBEDDING_TRUNCATION") {
            Some(value) => value.parse()?,
            None => TruncationPolicy::Silent,
        };

        let corpus_path = env::args()
            .nth(1)
            .unwrap_or_else(|| DEFAULT_CORPUS_PATH.to_string())
            .into();

        Ok(Self {
            opensearch_url,
            opensearch_auth,
            opensearch_insecure: env_flag("OPENSEARCH_INSECURE"),
            openai_api_key: env_var("OPENAI_API_KEY"),
            truncation,
            corpus_path,
        })
    }
}

/// Read a variable, treating empty values as unset.
fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

fn env_flag(name: &str) -> bool {
    env_var(name).is_some_and(|value| value.to_lowercase() == "true")
}

/// Strip trailing slashes, and downgrade https to http when asked to (for
/// clusters that terminate TLS elsewhere).
fn normalize_url(raw: &str, use_http: bool) -> String {
    let url = raw.trim_end_matches('/');
    if use_http {
        if let Some(rest) = url.strip_prefix("https://") {
            return format!("http://{}", rest);
        }
    }
    url.to_string()
}
