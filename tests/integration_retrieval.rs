#![expect(
    clippy::tests_outside_test_module,
    reason = "integration tests are only compiled in test mode"
)]

// End-to-end retrieval over a profile record on disk
// Covers document preparation, index build, ranking and context assembly together

use async_trait::async_trait;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use profile_rag::config::Config;
use profile_rag::documents::{DocumentChunk, DocumentSource, prepare_documents};
use profile_rag::embeddings::{EmbeddingError, EmbeddingProvider, create_provider};
use profile_rag::profile::ProfileSource;
use profile_rag::retrieval::Retriever;

const VOCABULARY: [&str; 7] = [
    "portfolio",
    "technologies",
    "typescript",
    "rust",
    "hiking",
    "engineer",
    "university",
];

/// Bag-of-words over a fixed vocabulary
struct KeywordProvider;

#[async_trait]
impl EmbeddingProvider for KeywordProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let text = text.to_lowercase();
        Ok(VOCABULARY
            .iter()
            .map(|word| if text.contains(word) { 1.0 } else { 0.0 })
            .collect())
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

/// Reads the profile file without consulting `PROFILE_EMAIL`/`PROFILE_PHONE`
struct IsolatedProfile(ProfileSource);

impl DocumentSource for IsolatedProfile {
    fn load_documents(&self) -> profile_rag::Result<Vec<DocumentChunk>> {
        let record = self.0.load_with(|_| None)?;
        Ok(prepare_documents(&record))
    }
}

fn isolated_source(config: &Config) -> Arc<IsolatedProfile> {
    Arc::new(IsolatedProfile(ProfileSource::from_config(config)))
}

fn profile_json(extra_projects: &[serde_json::Value]) -> serde_json::Value {
    let mut projects = vec![json!({
        "name": "Portfolio Site",
        "description": "Personal site showcasing my work.",
        "technologies": ["TypeScript", "Next.js"]
    })];
    projects.extend_from_slice(extra_projects);

    json!({
        "name": "Jordan Lee",
        "title": "Software Engineer",
        "bio": "Builds reliable web applications.",
        "education": {
            "degree": "BSc Computer Science",
            "university": "State University",
            "duration": "2019 - 2023"
        },
        "skills": { "languages": ["Rust"] },
        "projects": projects,
        "interests": ["hiking"]
    })
}

fn write_profile(dir: &Path, profile: &serde_json::Value) {
    let content = serde_json::to_string_pretty(profile).expect("should serialize profile");
    std::fs::write(dir.join("profile.json"), content).expect("should write profile");
}

fn setup() -> (TempDir, Config) {
    let temp_dir = TempDir::new().expect("should create temp dir");
    write_profile(temp_dir.path(), &profile_json(&[]));

    let mut config = Config::load(temp_dir.path()).expect("should load default config");
    config.profile.subject = "Jordan".to_string();

    (temp_dir, config)
}

fn keyword_retriever(config: &Config) -> Retriever {
    Retriever::with_parts(config, isolated_source(config), Arc::new(KeywordProvider))
}

#[tokio::test]
async fn portfolio_question_retrieves_project_chunk() {
    let (_temp_dir, config) = setup();
    let retriever = keyword_retriever(&config);

    let retrieved = retriever
        .retrieve_context("What technologies did he use for his portfolio?", 5)
        .await
        .expect("should retrieve context");

    let ids: Vec<&str> = retrieved.chunks.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["project-0"]);
    assert!(retrieved.context.starts_with("[1] Project: Portfolio Site."));
    assert!(retrieved.context.contains("Technologies used: TypeScript, Next.js."));

    let prompt = retriever.build_system_prompt(&retrieved.context);
    assert!(prompt.contains("CONTEXT FROM Jordan'S PORTFOLIO:"));
    assert!(prompt.contains("[1] Project: Portfolio Site."));
}

#[tokio::test]
async fn off_topic_question_yields_no_context() {
    let (_temp_dir, config) = setup();
    let retriever = keyword_retriever(&config);

    let retrieved = retriever
        .retrieve("Who won the football match yesterday?")
        .await
        .expect("should retrieve context");

    assert!(retrieved.chunks.is_empty());
    assert!(retrieved.context.is_empty());

    let entries = retriever.index().snapshot().expect("index should be built");
    let ids: Vec<&str> = entries.iter().map(|e| e.chunk.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "profile-basic",
            "education",
            "skills-languages",
            "project-0",
            "interests"
        ]
    );
}

#[tokio::test]
async fn reset_rebuilds_from_edited_profile() {
    let (temp_dir, config) = setup();
    let retriever = keyword_retriever(&config);

    let before = retriever
        .retrieve_context("rust", 5)
        .await
        .expect("should retrieve context");
    let ids: Vec<&str> = before.chunks.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["skills-languages"]);

    write_profile(
        temp_dir.path(),
        &profile_json(&[json!({
            "name": "Rust CLI",
            "description": "Command line tooling written in Rust."
        })]),
    );

    // Still served from the first build until reset
    let stale = retriever
        .retrieve_context("rust", 5)
        .await
        .expect("should retrieve context");
    assert_eq!(stale.chunks.len(), 1);

    retriever.reset();

    let after = retriever
        .retrieve_context("rust", 5)
        .await
        .expect("should retrieve context");
    // Both chunks score 1.0, ties fall back to id order
    let ids: Vec<&str> = after.chunks.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["project-1", "skills-languages"]);
    assert!(after.context.starts_with("[1] Project: Rust CLI."));
}

#[tokio::test]
async fn missing_profile_fails_and_recovers_once_written() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = Config::load(temp_dir.path()).expect("should load default config");
    let retriever = keyword_retriever(&config);

    let result = retriever.retrieve_context("rust", 5).await;
    assert!(result.is_err());
    assert!(!retriever.status().initialized);

    write_profile(temp_dir.path(), &profile_json(&[]));

    let retrieved = retriever
        .retrieve_context("rust", 5)
        .await
        .expect("should retrieve after profile appears");
    assert_eq!(retrieved.chunks.len(), 1);
}

#[tokio::test]
async fn configured_ollama_provider_drives_retrieval() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "embeddings": [[0.6, 0.8]] })),
        )
        .mount(&server)
        .await;

    let (_temp_dir, mut config) = setup();
    let address = server.address();
    config.ollama.host = address.ip().to_string();
    config.ollama.port = address.port();

    let provider = create_provider(&config).expect("should create configured provider");
    assert_eq!(provider.name(), "ollama");
    let retriever = Retriever::with_parts(&config, isolated_source(&config), provider);
    let retrieved = retriever
        .retrieve_context("anything at all", 2)
        .await
        .expect("should retrieve context");

    // Every chunk scores 1.0, so ties fall back to id order
    let ids: Vec<&str> = retrieved.chunks.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["education", "interests"]);
    assert_eq!(retriever.status().vector_count, 5);
}
