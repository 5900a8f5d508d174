//! Example: Using tracing for observability.
//!
//! Every search attempt, metadata check and body fetch emits tracing spans
//! and events.
//!
//! # Usage
//!
//! ```bash
//! export GMAIL_ACCESS_TOKEN="ya29.a0..."
//! export MAIL_SENDER="Example <noreply@example.com>"
//! # Set log level (trace, debug, info, warn, error)
//! export RUST_LOG=mail_finder=debug
//!
//! cargo run --example with_tracing
//! ```

use chrono::{Duration, Utc};
use mail_finder::matcher::RegexMatcher;
use mail_finder::{FinderConfig, GmailClient, GmailConfig, MessageFinder, SearchCriteria};
use std::env;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> mail_finder::Result<()> {
    dotenvy::dotenv().ok();

    // RUST_LOG controls levels, e.g. RUST_LOG=mail_finder=debug,info
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mail_finder=info")),
        )
        .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    let token =
        env::var("GMAIL_ACCESS_TOKEN").expect("GMAIL_ACCESS_TOKEN environment variable required");
    let sender = env::var("MAIL_SENDER").expect("MAIL_SENDER environment variable required");

    tracing::info!(sender = %sender, "Starting mail-finder example");

    let config = GmailConfig::builder().access_token(token).build()?;
    let finder_config = FinderConfig::builder()
        .max_attempts(3)
        .window_step(10)
        .attempt_delay(std::time::Duration::from_secs(2))
        .build()?;

    tracing::debug!(?finder_config, "Configuration built successfully");

    let finder = MessageFinder::new(GmailClient::new(config)?, finder_config);
    let criteria = SearchCriteria::new(sender, Utc::now() - Duration::hours(1));
    let matcher = RegexMatcher::with_description(r"(https://\S+)", "first https link")?;

    // Emits spans for the search loop, each API call and the extraction
    match finder.find_and_extract(&criteria, &matcher).await {
        Ok(link) => {
            tracing::info!(link = %link, "Found link");
            println!("\nFound link: {link}");
        }
        Err(e) => {
            tracing::warn!(error = %e, category = %e.category(), "No link found");
            println!("\nNo link found: {e}");
        }
    }

    tracing::info!("Example completed");

    Ok(())
}
