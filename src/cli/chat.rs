use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use super::{build_session, stream_reply};
use crate::chat::prompts::banner;
use crate::core::AppConfig;

/// `/1`, `/2`, ... pick a suggested question, anything else is sent as
/// typed.
fn resolve_input(line: &str, suggestions: &[String]) -> String {
    line.trim()
        .strip_prefix('/')
        .and_then(|n| n.parse::<usize>().ok())
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| suggestions.get(i))
        .cloned()
        .unwrap_or_else(|| line.to_string())
}

pub async fn run(config: AppConfig) -> Result<()> {
    let session = build_session(&config)?;
    let mut rl = DefaultEditor::new()?;

    let suggestions = session.suggested_questions();
    println!("AI Study Assistant - {}", banner(session.subject()));
    println!("Ask anything, or pick a suggestion:");
    for (i, q) in suggestions.iter().enumerate() {
        println!("  /{} {}", i + 1, q);
    }

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());
                let input = resolve_input(&line, &suggestions);
                stream_reply(&session, &input).await?;
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    tracing::debug!(
        session_id = %session.id(),
        messages = session.transcript().len(),
        "Chat session closed"
    );

    Ok(())
}
