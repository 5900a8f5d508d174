//! Example: Proper error handling with retries.
//!
//! `MessageFinder` already widens its window across attempts. This example
//! wraps whole searches in an outer retry loop driven by
//! [`Error::is_retryable`], which covers messages that take longer to arrive.
//!
//! # Usage
//!
//! ```bash
//! export GMAIL_ACCESS_TOKEN="ya29.a0..."
//! export MAIL_SENDER="Example <noreply@example.com>"
//! cargo run --example error_handling
//! ```

use chrono::Utc;
use mail_finder::matcher::LabeledValueMatcher;
use mail_finder::{
    Error, ErrorCategory, FinderConfig, GmailClient, GmailConfig, MessageFinder, SearchCriteria,
};
use std::env;
use std::time::Duration;

const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_secs(2);

/// Search with automatic retry for transient failures
async fn find_with_retry(
    finder: &MessageFinder<GmailClient>,
    criteria: &SearchCriteria,
) -> Result<String, Error> {
    let matcher = LabeledValueMatcher::new("Sign In");
    let mut backoff = INITIAL_BACKOFF;
    let mut attempt = 1;

    loop {
        println!("Search {attempt}/{MAX_RETRIES}...");

        match finder.find_and_extract(criteria, &matcher).await {
            Ok(link) => return Ok(link),
            Err(e) => {
                println!("  Error: {e}");
                println!("  Category: {}", e.category());
                println!("  Retryable: {}", e.is_retryable());

                if !e.is_retryable() || attempt == MAX_RETRIES {
                    return Err(e);
                }

                println!("  Retrying in {backoff:?}...");
                tokio::time::sleep(backoff).await;
                backoff *= 2;
                attempt += 1;
            }
        }
    }
}

fn explain(error: &Error) {
    match error.category() {
        ErrorCategory::NotFound => {
            println!("No matching message yet (check the sender string and clock skew)");
        }
        ErrorCategory::Extraction => {
            println!("Message found, but it has no sign-in link: {error}");
        }
        ErrorCategory::Transport | ErrorCategory::Timeout => {
            println!("Mailbox unreachable: {error}");
        }
        ErrorCategory::Decode => {
            println!("Message body could not be decoded: {error}");
        }
        ErrorCategory::Configuration => {
            println!("Configuration error: {error}");
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let token =
        env::var("GMAIL_ACCESS_TOKEN").expect("GMAIL_ACCESS_TOKEN environment variable required");
    let sender = env::var("MAIL_SENDER").expect("MAIL_SENDER environment variable required");

    println!("Mail Finder - Error Handling Example\n");
    println!("====================================\n");

    let config = match GmailConfig::builder()
        .access_token(token)
        .list_timeout(Duration::from_secs(10))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            eprintln!("This error is NOT retryable - fix your configuration");
            std::process::exit(1);
        }
    };

    let client = match GmailClient::new(config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to build HTTP client: {e}");
            std::process::exit(1);
        }
    };

    let finder = MessageFinder::new(client, FinderConfig::default());
    let criteria = SearchCriteria::new(sender, Utc::now() - chrono::Duration::minutes(15));

    match find_with_retry(&finder, &criteria).await {
        Ok(link) => println!("\nSign-in link: {link}"),
        Err(e) => {
            eprintln!("\nGave up after retries");
            explain(&e);
            std::process::exit(1);
        }
    }

    println!("Done!");
}
