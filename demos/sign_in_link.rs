//! Basic example: Fetch a sign-in link from a recent email.
//!
//! Looks for a message from `MAIL_SENDER` sent in the last ten minutes and
//! prints the URL written as `Sign In ( ... )` in its body.
//!
//! # Usage
//!
//! ```bash
//! export GMAIL_ACCESS_TOKEN="ya29.a0..."
//! export MAIL_SENDER="Example <noreply@example.com>"
//! cargo run --example sign_in_link
//! ```
//!
//! The token needs the `gmail.readonly` scope.

use chrono::{Duration, Utc};
use mail_finder::matcher::LabeledValueMatcher;
use mail_finder::{FinderConfig, GmailClient, GmailConfig, MessageFinder, SearchCriteria};
use std::env;

#[tokio::main]
async fn main() -> mail_finder::Result<()> {
    dotenvy::dotenv().ok();

    let token =
        env::var("GMAIL_ACCESS_TOKEN").expect("GMAIL_ACCESS_TOKEN environment variable required");
    let sender = env::var("MAIL_SENDER").expect("MAIL_SENDER environment variable required");

    let config = GmailConfig::builder().access_token(token).build()?;
    let finder = MessageFinder::new(GmailClient::new(config)?, FinderConfig::default());

    println!("Looking for a message from {sender}...");

    let criteria = SearchCriteria::new(sender, Utc::now() - Duration::minutes(10));
    let link = finder
        .find_and_extract(&criteria, &LabeledValueMatcher::new("Sign In"))
        .await?;

    println!("Sign-in link: {link}");

    Ok(())
}
