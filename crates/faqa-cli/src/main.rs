//! FAQA CLI - Command-line interface
//!
//! Usage:
//!   faqa build [--dataset data1.csv] [--key-column Question]
//!   faqa ask <question> [--json]

use anyhow::Context;
use clap::{Parser, Subcommand};
use faqa_core::{logging::init_tracing, Answer, AppConfig, EmbeddingClient, LlmClient};
use faqa_rag::{create_llm_client, AnswerPipeline, PipelineConfig};
use faqa_vector::{create_embedding_client, IndexBuilder};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "faqa")]
#[command(about = "Answer questions from a FAQ dataset with retrieval-augmented generation")]
#[command(version)]
struct Cli {
    /// TOML configuration file (environment variables take precedence)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed the FAQ dataset and write the vector index
    Build {
        /// CSV dataset (defaults to the configured path)
        #[arg(long)]
        dataset: Option<PathBuf>,
        /// Column used as the retrieval key
        #[arg(long)]
        key_column: Option<String>,
    },
    /// Answer one question from the index
    Ask {
        /// Question to ask
        question: String,
        /// Print the answer and sources as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct AskOutput<'a> {
    answer: &'a str,
    sources: Vec<SourceOutput<'a>>,
    processing_time_ms: u64,
}

#[derive(Serialize)]
struct SourceOutput<'a> {
    row: usize,
    question: &'a str,
    score: f32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    init_tracing(&config.logging, "faqa=info");

    if let Err(e) = config.validate() {
        tracing::error!("{e}");
        std::process::exit(1);
    }

    let embedder: Arc<dyn EmbeddingClient> =
        Arc::from(create_embedding_client(&config.embedding, &config.credentials)?);

    match cli.command {
        Commands::Build {
            dataset,
            key_column,
        } => {
            let dataset = dataset.unwrap_or_else(|| config.dataset.path.clone());
            let key_column = key_column.unwrap_or_else(|| config.dataset.key_column.clone());

            let summary = IndexBuilder::new(embedder, &config.index.path)
                .with_answer_column(config.dataset.answer_column.clone())
                .build_index(&dataset, &key_column)
                .await
                .with_context(|| format!("building index from {}", dataset.display()))?;

            println!(
                "Indexed {} records ({} dimensions, {}) into {}",
                summary.records,
                summary.dimension,
                summary.embedding_model,
                summary.path.display()
            );
        }
        Commands::Ask { question, json } => {
            let llm: Arc<dyn LlmClient> =
                Arc::from(create_llm_client(&config.llm, &config.credentials)?);
            let pipeline = AnswerPipeline::new(
                &config.index.path,
                embedder,
                llm,
                PipelineConfig::from_app_config(&config),
            );

            let answer = pipeline.answer(&question).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&ask_output(&answer))?);
            } else {
                print_answer(&answer);
            }
        }
    }

    Ok(())
}

fn ask_output(answer: &Answer) -> AskOutput<'_> {
    AskOutput {
        answer: &answer.text,
        sources: answer
            .sources
            .iter()
            .map(|hit| SourceOutput {
                row: hit.record.row,
                question: &hit.record.question,
                score: hit.score,
            })
            .collect(),
        processing_time_ms: answer.processing_time_ms,
    }
}

fn print_answer(answer: &Answer) {
    println!("Answer\n{}", answer.text);

    if !answer.sources.is_empty() {
        println!("\nSources");
        for (rank, hit) in answer.sources.iter().enumerate() {
            println!(
                "  {}. [row {}] {} ({:.2})",
                rank + 1,
                hit.record.row,
                hit.record.question,
                hit.score
            );
        }
    }
}
