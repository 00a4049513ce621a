//! Cadence - recurring booking engine
//!
//! Reads one JSON command per line on stdin and answers with one JSON line on
//! stdout. Logs go to stderr.

use anyhow::Context;
use cadence_app::utils::logging::init_tracing;
use cadence_app::{handle_line, AppContext};
use cadence_infra::config;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();

    let config = config::load().context("failed to load configuration")?;
    init_tracing(&config.logging)?;
    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) => warn!(error = %e, "no .env loaded"),
    }

    let ctx = AppContext::new(config).context("failed to initialise application context")?;
    info!("cadence ready, reading commands from stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut handled: u64 = 0;

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut response = handle_line(&ctx, line).await;
        response.push('\n');
        stdout.write_all(response.as_bytes()).await.context("failed to write response")?;
        stdout.flush().await.context("failed to flush stdout")?;
        handled += 1;
    }

    info!(handled, "stdin closed, shutting down");
    Ok(())
}
