use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::warn;

use crate::config::{Config, ProviderKind};
use crate::documents::DocumentSource;
use crate::embeddings::{GeminiClient, OllamaClient};
use crate::profile::ProfileSource;
use crate::retrieval::Retriever;

fn spinner(message: &'static str) -> ProgressBar {
    if console::user_attended_stderr() {
        let bar = ProgressBar::new_spinner().with_message(message);
        if let Ok(template) = ProgressStyle::with_template("{spinner} {msg}") {
            bar.set_style(template);
        }
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    } else {
        ProgressBar::hidden()
    }
}

/// Build the index with a spinner on an attended terminal
async fn build_index(retriever: &Retriever) -> Result<()> {
    let bar = spinner("Embedding profile documents...");
    let result = retriever.initialize().await;
    bar.finish_and_clear();
    result.context("Failed to build vector index")
}

/// Print the chunks the profile record prepares into, without embedding them
#[inline]
pub fn show_chunks(config: &Config) -> Result<()> {
    let source = ProfileSource::from_config(config);
    let chunks = source
        .load_documents()
        .with_context(|| format!("Failed to load profile from {}", source.path().display()))?;

    println!("📄 {} document chunks", chunks.len());
    println!();
    for chunk in &chunks {
        println!(
            "{} {} ({})",
            style(&chunk.id).bold().cyan(),
            style(chunk.metadata.category).yellow(),
            style(&chunk.metadata.source).dim()
        );
        println!("   {}", chunk.content);
        println!();
    }

    Ok(())
}

/// Rank profile chunks against a query and print their scores
#[inline]
pub async fn search(config: &Config, query: &str, top_k: Option<usize>) -> Result<()> {
    let retriever = Retriever::from_config(config)?;
    build_index(&retriever).await?;

    let top_k = top_k.unwrap_or(config.retrieval.top_k);
    let hits = retriever.index().search_scored(query, top_k).await?;

    if hits.is_empty() {
        println!(
            "No chunks scored above the similarity threshold of {}",
            config.retrieval.similarity_threshold
        );
        return Ok(());
    }

    println!("🔍 Found {} relevant chunks for: {}", hits.len(), query);
    println!();
    for (rank, hit) in hits.iter().enumerate() {
        println!(
            "{}. {} [{:.4}]",
            rank + 1,
            style(&hit.chunk.id).bold().cyan(),
            hit.score
        );
        println!("   {}", hit.chunk.content);
    }

    Ok(())
}

/// Print the system prompt an answering model would receive for `query`
#[inline]
pub async fn ask(config: &Config, query: &str, top_k: Option<usize>) -> Result<()> {
    let retriever = Retriever::from_config(config)?;
    build_index(&retriever).await?;

    let top_k = top_k.unwrap_or(config.retrieval.top_k);
    let retrieved = retriever.retrieve_context(query, top_k).await?;
    println!("{}", retriever.build_system_prompt(&retrieved.context));

    Ok(())
}

/// Report provider reachability and the state of the profile record
#[inline]
pub async fn show_status(config: &Config) -> Result<()> {
    println!("📊 Profile RAG Status Report");
    println!("{}", "=".repeat(50));
    println!();

    println!("🤖 Embedding Provider ({}):", config.embedding.provider);
    match config.embedding.provider {
        ProviderKind::Ollama => match OllamaClient::new(&config.ollama) {
            Ok(client) => {
                let model = client.model().to_string();
                let health = tokio::task::spawn_blocking(move || client.health_check())
                    .await
                    .context("Health check task failed")?;
                match health {
                    Ok(()) => {
                        println!(
                            "   ✅ Ollama: Connected ({}:{})",
                            config.ollama.host, config.ollama.port
                        );
                        println!("   📋 Model: {}", model);
                    }
                    Err(e) => println!("   ⚠️  Ollama: Unreachable - {}", e),
                }
            }
            Err(e) => println!("   ❌ Ollama: Invalid configuration - {}", e),
        },
        ProviderKind::Gemini => match GeminiClient::new(&config.gemini) {
            Ok(client) => {
                println!("   ✅ Gemini: API key found");
                println!("   📋 Model: {}", config.gemini.model);
                println!("   🌐 Endpoint: {}", client.endpoint());
            }
            Err(e) => println!("   ❌ Gemini: {}", e),
        },
    }

    println!();
    println!("👤 Profile Record:");
    let source = ProfileSource::from_config(config);
    println!("   📁 Path: {}", source.path().display());
    match source.load() {
        Ok(record) => {
            println!("   ✅ Loaded profile for {}", record.name);
            match source.load_documents() {
                Ok(chunks) => println!("   📄 Chunks: {}", chunks.len()),
                Err(e) => println!("   ❌ Chunking failed - {}", e),
            }
        }
        Err(e) => println!("   ❌ {}", e),
    }

    println!();
    println!("🔎 Retrieval:");
    println!(
        "   Similarity threshold: {}",
        config.retrieval.similarity_threshold
    );
    println!("   Top K: {}", config.retrieval.top_k);

    Ok(())
}

/// Answer queries from stdin against one long-lived index.
///
/// `:reset` discards the index so edits to the profile are picked up,
/// `:status` reports its state and `:quit` exits.
#[inline]
pub async fn run_repl(config: &Config) -> Result<()> {
    let retriever = Retriever::from_config(config)?;
    build_index(&retriever).await?;

    eprintln!(
        "{}",
        style("Enter a question, or :reset, :status, :quit").dim()
    );

    repl_loop(&retriever, BufReader::new(tokio::io::stdin())).await
}

async fn repl_loop<R>(retriever: &Retriever, input: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let query = line.trim();
        match query {
            "" => {}
            ":quit" | ":q" => break,
            ":reset" => {
                retriever.reset();
                match build_index(retriever).await {
                    Ok(()) => {
                        let status = retriever.status();
                        eprintln!(
                            "{}",
                            style(format!("Index rebuilt with {} vectors", status.vector_count))
                                .green()
                        );
                    }
                    Err(e) => warn!("Rebuild failed, next query will retry: {:#}", e),
                }
            }
            ":status" => {
                let status = retriever.status();
                eprintln!(
                    "initialized: {}, vectors: {}",
                    status.initialized, status.vector_count
                );
            }
            _ => match retriever.retrieve(query).await {
                Ok(retrieved) if retrieved.chunks.is_empty() => {
                    println!("No relevant profile facts found.");
                }
                Ok(retrieved) => {
                    println!("{}", retrieved.context);
                    println!();
                }
                Err(e) => warn!("Retrieval failed: {}", e),
            },
        }
    }

    Ok(())
}
