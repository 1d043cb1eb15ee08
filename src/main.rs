//! moa - CLI entry point.

use std::io::Write;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use futures_util::future::join_all;
use tracing_subscriber::EnvFilter;

use moa::config;
use moa::llm::{
    Message, ProviderKind, SamplingParams, build_provider, generate_with_references,
    stream_with_references, translate_text,
};
use moa::search::{DEFAULT_NUM_RESULTS, extract_full_texts, extract_snippets, google_search};

/// Mixture-of-agents generation, translation and web search.
#[derive(Parser, Debug)]
#[command(name = "moa")]
#[command(about = "Mixture-of-agents generation, translation and web search")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ask reference models, then aggregate their answers with one model
    Ask {
        /// Provider serving every model in this run
        #[arg(long, value_enum, default_value_t = ProviderKind::Groq)]
        provider: ProviderKind,

        /// Aggregator model
        #[arg(short, long)]
        model: String,

        /// Reference model (repeatable)
        #[arg(short = 'r', long = "reference-model")]
        reference_models: Vec<String>,

        /// Optional system prompt
        #[arg(long)]
        system: Option<String>,

        /// Maximum output tokens per completion
        #[arg(long, default_value_t = moa::llm::message::DEFAULT_MAX_TOKENS)]
        max_tokens: u32,

        /// Sampling temperature
        #[arg(long, default_value_t = moa::llm::message::DEFAULT_TEMPERATURE)]
        temperature: f32,

        /// Print the aggregated answer as it arrives
        #[arg(long)]
        stream: bool,

        /// The question
        prompt: String,
    },

    /// Translate text into the user's language
    Translate {
        /// Model used for translation (served by Groq)
        #[arg(short, long)]
        model: String,

        /// Text to translate
        text: String,
    },

    /// Search the web and print result snippets
    Search {
        /// Number of results
        #[arg(short, long, default_value_t = DEFAULT_NUM_RESULTS)]
        num: u32,

        /// Print each snippet with its link
        #[arg(long)]
        links: bool,

        /// Search query
        query: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Command::Ask {
            provider,
            model,
            reference_models,
            system,
            max_tokens,
            temperature,
            stream,
            prompt,
        } => {
            let mut messages = Vec::new();
            if let Some(system) = system {
                messages.push(Message::system(system));
            }
            messages.push(Message::user(prompt));

            let params = SamplingParams::new(max_tokens, temperature);
            run_ask(provider, &model, &reference_models, &messages, &params, stream).await
        }
        Command::Translate { model, text } => {
            let translated = translate_text(&text, &model).await;
            match translated {
                Some(output) if !output.is_empty() => {
                    println!("{}", output);
                    Ok(())
                }
                _ => bail!("Translation produced no result (see log for details)"),
            }
        }
        Command::Search { num, links, query } => {
            let results = google_search(&query, num)
                .await
                .context("Web search failed")?;

            let texts = if links {
                extract_full_texts(&results)
            } else {
                extract_snippets(&results)
            };

            if texts.is_empty() {
                println!("No results for '{}'.", query);
            }
            for (i, text) in texts.iter().enumerate() {
                println!("{}. {}\n", i + 1, text);
            }
            Ok(())
        }
    }
}

/// Query all reference models concurrently, then aggregate.
async fn run_ask(
    kind: ProviderKind,
    model: &str,
    reference_models: &[String],
    messages: &[Message],
    params: &SamplingParams,
    stream: bool,
) -> Result<()> {
    let provider = build_provider(kind);

    if !reference_models.is_empty() {
        eprintln!(
            "Querying {} reference model(s) on {}...",
            reference_models.len(),
            kind
        );
    }

    let outputs = join_all(
        reference_models
            .iter()
            .map(|reference| provider.complete(reference, messages, params)),
    )
    .await;

    let mut references = Vec::new();
    for (reference, output) in reference_models.iter().zip(outputs) {
        match output {
            Some(text) => references.push(text),
            None => eprintln!("Warning: {} produced no result, skipping it.", reference),
        }
    }

    if stream {
        let mut fragments =
            stream_with_references(provider.as_ref(), model, messages, &references, params);
        let mut stdout = std::io::stdout();
        while let Some(fragment) = fragments.next().await {
            let fragment = fragment.context("Streaming aggregation failed")?;
            write!(stdout, "{}", fragment)?;
            stdout.flush()?;
        }
        writeln!(stdout)?;
        return Ok(());
    }

    let answer =
        generate_with_references(provider.as_ref(), model, messages, &references, params).await;
    match answer {
        Some(output) if !output.is_empty() => {
            println!("{}", output);
            Ok(())
        }
        _ => bail!("{} produced no result (see log for details)", model),
    }
}

/// Log to stderr. `RUST_LOG` wins; otherwise `DEBUG` selects debug or warn.
fn init_tracing() {
    let default_level = if config::debug_enabled() {
        "debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
