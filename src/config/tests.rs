use super::*;
use tempfile::TempDir;

#[test]
fn empty_update_changes_nothing() {
    let update = ConfigUpdate::default();
    let mut config = Config::default();

    assert!(update.is_empty());
    update.apply(&mut config).expect("should apply empty update");
    assert_eq!(config, Config::default());
}

#[test]
fn update_sets_provider_and_retrieval_fields() {
    let update = ConfigUpdate {
        ollama_protocol: Some("https".to_string()),
        ollama_host: Some("embeddings.internal".to_string()),
        ollama_port: Some(8443),
        ollama_model: Some("mxbai-embed-large".to_string()),
        similarity_threshold: Some(0.45),
        top_k: Some(8),
    };
    let mut config = Config::default();

    assert!(!update.is_empty());
    update.apply(&mut config).expect("should apply update");

    assert_eq!(config.ollama.protocol, "https");
    assert_eq!(config.ollama.host, "embeddings.internal");
    assert_eq!(config.ollama.port, 8443);
    assert_eq!(config.ollama.model, "mxbai-embed-large");
    assert!((config.retrieval.similarity_threshold - 0.45).abs() < f32::EPSILON);
    assert_eq!(config.retrieval.top_k, 8);
}

#[test]
fn update_rejects_out_of_range_values() {
    let mut config = Config::default();

    let result = ConfigUpdate {
        top_k: Some(0),
        ..ConfigUpdate::default()
    }
    .apply(&mut config);
    assert!(matches!(result, Err(ConfigError::InvalidTopK(0))));

    let result = ConfigUpdate {
        similarity_threshold: Some(1.5),
        ..ConfigUpdate::default()
    }
    .apply(&mut config);
    assert!(matches!(
        result,
        Err(ConfigError::InvalidSimilarityThreshold(_))
    ));

    let result = ConfigUpdate {
        ollama_port: Some(0),
        ..ConfigUpdate::default()
    }
    .apply(&mut config);
    assert!(matches!(result, Err(ConfigError::InvalidPort(0))));

    assert_eq!(config.retrieval, RetrievalConfig::default());
    assert_eq!(config.ollama, OllamaConfig::default());
}

#[test]
fn applied_update_persists_through_save() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let mut config = Config::load(temp_dir.path()).expect("should load default config");

    ConfigUpdate {
        top_k: Some(3),
        similarity_threshold: Some(0.2),
        ..ConfigUpdate::default()
    }
    .apply(&mut config)
    .expect("should apply update");
    config.save().expect("should save config");

    let reloaded = Config::load(temp_dir.path()).expect("should reload config");
    assert_eq!(reloaded.retrieval.top_k, 3);
    assert!((reloaded.retrieval.similarity_threshold - 0.2).abs() < f32::EPSILON);
}
