// Configuration management module
// TOML settings for the embedding provider, retrieval tuning and profile source

pub mod settings;

#[cfg(test)]
mod tests;

use anyhow::Result;
use console::style;

pub use settings::{
    Config, ConfigError, EmbeddingConfig, GeminiConfig, OllamaConfig, ProfileConfig, ProviderKind,
    RetrievalConfig,
};

/// Values supplied on the command line for `config`; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigUpdate {
    pub ollama_protocol: Option<String>,
    pub ollama_host: Option<String>,
    pub ollama_port: Option<u16>,
    pub ollama_model: Option<String>,
    pub similarity_threshold: Option<f32>,
    pub top_k: Option<usize>,
}

impl ConfigUpdate {
    #[inline]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply every supplied value through the validating setters.
    ///
    /// Stops at the first invalid value; fields applied before it stay changed,
    /// so callers should only save on success.
    #[inline]
    pub fn apply(&self, config: &mut Config) -> Result<(), ConfigError> {
        if let Some(protocol) = &self.ollama_protocol {
            config.ollama.set_protocol(protocol.clone())?;
        }
        if let Some(host) = &self.ollama_host {
            config.ollama.set_host(host.clone())?;
        }
        if let Some(port) = self.ollama_port {
            config.ollama.set_port(port)?;
        }
        if let Some(model) = &self.ollama_model {
            config.ollama.set_model(model.clone())?;
        }
        if let Some(threshold) = self.similarity_threshold {
            config.retrieval.set_similarity_threshold(threshold)?;
        }
        if let Some(top_k) = self.top_k {
            config.retrieval.set_top_k(top_k)?;
        }
        Ok(())
    }
}

/// Get the configuration directory path
#[inline]
pub fn get_config_dir() -> Result<std::path::PathBuf, ConfigError> {
    Config::default_dir()
}

#[inline]
pub fn show_config(config: &Config) -> Result<()> {
    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("Embedding Provider:").bold().yellow());
    eprintln!("  Provider: {}", style(config.embedding.provider).cyan());
    match config.embedding.provider {
        ProviderKind::Ollama => {
            eprintln!("  Model: {}", style(&config.ollama.model).cyan());
            match config.ollama.ollama_url() {
                Ok(url) => eprintln!("  Ollama URL: {}", style(url).cyan()),
                Err(e) => eprintln!("  Ollama URL: {} ({})", style("Invalid").red(), e),
            }
        }
        ProviderKind::Gemini => {
            eprintln!("  Model: {}", style(&config.gemini.model).cyan());
            eprintln!("  Base URL: {}", style(&config.gemini.base_url).cyan());
            let key_state = if std::env::var_os(&config.gemini.api_key_env).is_some() {
                style("set").green()
            } else {
                style("missing").red()
            };
            eprintln!(
                "  API key ({}): {}",
                style(&config.gemini.api_key_env).cyan(),
                key_state
            );
        }
    }

    eprintln!();
    eprintln!("{}", style("Retrieval:").bold().yellow());
    eprintln!(
        "  Similarity threshold: {}",
        style(config.retrieval.similarity_threshold).cyan()
    );
    eprintln!("  Top K: {}", style(config.retrieval.top_k).cyan());

    eprintln!();
    eprintln!("{}", style("Profile:").bold().yellow());
    eprintln!("  Subject: {}", style(&config.profile.subject).cyan());
    eprintln!("  Path: {}", style(config.profile_path().display()).cyan());

    eprintln!();
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );

    Ok(())
}
