use std::io;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use futures_util::StreamExt;

pub mod ask;
pub mod chat;
pub mod render;

use crate::chat::{ChatSession, HttpChatEndpoint};
use crate::core::{AppConfig, logging};
use crate::notify::{ConsoleNotifier, Notice, Notifier};
use render::ReplyPrinter;

#[derive(Subcommand)]
enum Command {
    /// Start an interactive study session
    Chat {
        /// Subject to focus the tutor on
        #[arg(long)]
        subject: Option<String>,
        /// Backend host, overrides STUDY_ASSISTANT_URL
        #[arg(long)]
        url: Option<String>,
    },
    /// Ask a single question and stream the answer
    Ask {
        /// Subject to focus the tutor on
        #[arg(long)]
        subject: Option<String>,
        /// Backend host, overrides STUDY_ASSISTANT_URL
        #[arg(long)]
        url: Option<String>,
        #[arg(required = true)]
        question: Vec<String>,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

fn with_overrides(
    mut config: AppConfig,
    subject: Option<String>,
    url: Option<String>,
) -> AppConfig {
    if let Some(subject) = subject.filter(|s| !s.trim().is_empty()) {
        config.subject = Some(subject);
    }
    if let Some(url) = url {
        config.api_hostname = url;
    }
    config
}

fn build_session(config: &AppConfig) -> Result<ChatSession> {
    if config.api_key.is_empty() {
        tracing::warn!("STUDY_ASSISTANT_KEY is not set, requests will not be authorized");
    }
    let endpoint = HttpChatEndpoint::new(config)?;
    tracing::debug!("Using chat endpoint {}", endpoint.url());

    Ok(ChatSession::from_config(
        config,
        Arc::new(endpoint),
        Arc::new(ConsoleNotifier),
    ))
}

/// Streams one reply to stdout. Returns false if the exchange was refused
/// or failed; failures have already been reported by the notifier.
async fn stream_reply(session: &ChatSession, input: &str) -> Result<bool> {
    let mut exchange = match session.send(input) {
        Ok(exchange) => exchange,
        Err(e) => {
            ConsoleNotifier.notify(Notice::info(&e.to_string()));
            return Ok(false);
        }
    };
    if session.awaiting_reply() {
        eprintln!("thinking...");
    }

    let mut printer = ReplyPrinter::new();
    let mut stdout = io::stdout();
    let mut succeeded = true;
    while let Some(snapshot) = exchange.next().await {
        match snapshot {
            Ok(transcript) => printer.render(&transcript, &mut stdout)?,
            Err(_) => succeeded = false,
        }
    }
    if printer.has_output() {
        println!();
    }

    Ok(succeeded)
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();
    logging::init_tracing();

    let config = AppConfig::from_env()?;

    // Handle each sub command
    match args.command {
        Some(Command::Chat { subject, url }) => {
            chat::run(with_overrides(config, subject, url)).await?;
        }
        Some(Command::Ask {
            subject,
            url,
            question,
        }) => {
            ask::run(with_overrides(config, subject, url), &question.join(" ")).await?;
        }
        None => {}
    }

    Ok(())
}
