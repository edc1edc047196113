use anyhow::{Result, bail};

use super::{build_session, stream_reply};
use crate::core::AppConfig;

pub async fn run(config: AppConfig, question: &str) -> Result<()> {
    let session = build_session(&config)?;
    if !stream_reply(&session, question).await? {
        bail!("No answer from the study assistant");
    }
    Ok(())
}
