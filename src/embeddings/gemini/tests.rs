use super::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> GeminiConfig {
    GeminiConfig {
        base_url: format!("{}/v1beta", server.uri()),
        model: "test-embed".to_string(),
        api_key_env: "PROFILE_RAG_TEST_UNSET_GEMINI_KEY".to_string(),
    }
}

#[test]
fn endpoint_includes_model_and_version() {
    let client = GeminiClient::with_api_key(&GeminiConfig::default(), "secret".to_string())
        .expect("should build client");

    assert_eq!(
        client.endpoint().as_str(),
        "https://generativelanguage.googleapis.com/v1beta/models/text-embedding-004:embedContent"
    );
    assert_eq!(client.name(), "gemini");
}

#[test]
fn debug_output_hides_api_key() {
    let client = GeminiClient::with_api_key(&GeminiConfig::default(), "top-secret".to_string())
        .expect("should build client");

    assert!(!format!("{client:?}").contains("top-secret"));
}

#[test]
fn missing_api_key_is_reported() {
    let config = GeminiConfig {
        api_key_env: "PROFILE_RAG_TEST_UNSET_GEMINI_KEY".to_string(),
        ..GeminiConfig::default()
    };

    let result = GeminiClient::new(&config);
    assert!(matches!(result, Err(EmbeddingError::MissingApiKey(name)) if name == config.api_key_env));
}

#[tokio::test]
async fn embed_posts_content_and_reads_values() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/test-embed:embedContent"))
        .and(header("x-goog-api-key", "secret"))
        .and(body_partial_json(json!({
            "model": "models/test-embed",
            "content": { "parts": [{ "text": "Where did he study?" }] }
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "embedding": { "values": [0.5, -0.5, 0.25] } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::with_api_key(&config_for(&server), "secret".to_string())
        .expect("should build client");
    let embedding = client
        .embed("Where did he study?")
        .await
        .expect("embedding should succeed");

    assert_eq!(embedding, vec![0.5, -0.5, 0.25]);
}

#[tokio::test]
async fn rate_limit_surfaces_as_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::with_api_key(&config_for(&server), "secret".to_string())
        .expect("should build client")
        .with_retry_delay(Duration::from_millis(10));

    let result = client.embed("anything").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn empty_values_are_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "embedding": { "values": [] } })),
        )
        .mount(&server)
        .await;

    let client = GeminiClient::with_api_key(&config_for(&server), "secret".to_string())
        .expect("should build client");

    assert!(client.embed("anything").await.is_err());
}
