use anyhow::Result;
use study_assistant::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
