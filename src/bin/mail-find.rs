//! Command line driver: find a message by sender and time, print its body or an
//! extracted value.
//!
//! ```bash
//! export GMAIL_ACCESS_TOKEN="ya29.a0..."
//! mail-find --sender "Example <noreply@example.com>" --max-age-secs 300 --label "Sign In"
//! ```
//!
//! Exit codes: 0 success, 2 no matching message, 3 pattern not found, 1 any other error.

use chrono::{DateTime, Utc};
use clap::Parser;
use mail_finder::matcher::{LabeledValueMatcher, Matcher, RegexMatcher};
use mail_finder::{
    Error, ErrorCategory, FinderConfig, GmailClient, GmailConfig, MessageFinder, SearchCriteria,
    Socks5Proxy,
};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "mail-find", version, about)]
struct Args {
    /// OAuth2 access token with Gmail read access
    #[arg(long, env = "GMAIL_ACCESS_TOKEN", hide_env_values = true)]
    access_token: String,

    /// Mailbox owner
    #[arg(long, default_value = "me")]
    user_id: String,

    /// Exact From header value to look for
    #[arg(long)]
    sender: String,

    /// Earliest acceptable send time (RFC 3339)
    #[arg(long, conflicts_with = "max_age_secs")]
    since: Option<DateTime<Utc>>,

    /// Earliest acceptable send time, relative to now
    #[arg(long, default_value_t = 600)]
    max_age_secs: u64,

    /// Listing attempts before giving up
    #[arg(long, default_value_t = 5)]
    max_attempts: u32,

    /// Window growth per attempt
    #[arg(long, default_value_t = 5)]
    window_step: usize,

    /// Pause between attempts, in milliseconds
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,

    /// Print the value written as `LABEL ( value )` instead of the whole body
    #[arg(long, conflicts_with = "pattern")]
    label: Option<String>,

    /// Print the first capture group of this regex instead of the whole body
    #[arg(long)]
    pattern: Option<String>,

    /// SOCKS5 proxy as host:port
    #[arg(long)]
    proxy: Option<String>,
}

impl Args {
    fn min_time(&self) -> DateTime<Utc> {
        self.since.unwrap_or_else(|| {
            let max_age = chrono::Duration::from_std(Duration::from_secs(self.max_age_secs))
                .unwrap_or(chrono::Duration::zero());
            Utc::now() - max_age
        })
    }

    fn matcher(&self) -> mail_finder::Result<Option<Box<dyn Matcher>>> {
        let matcher: Box<dyn Matcher> = match (&self.label, &self.pattern) {
            (Some(label), _) => Box::new(LabeledValueMatcher::new(label)),
            (None, Some(pattern)) => Box::new(RegexMatcher::new(pattern)?),
            (None, None) => return Ok(None),
        };
        Ok(Some(matcher))
    }

    fn socks_proxy(&self) -> mail_finder::Result<Option<Socks5Proxy>> {
        let Some(address) = &self.proxy else {
            return Ok(None);
        };
        let invalid = || Error::InvalidConfig {
            message: format!("proxy must be host:port, got '{address}'"),
        };
        let (host, port) = address.rsplit_once(':').ok_or_else(invalid)?;
        let port = port.parse().map_err(|_| invalid())?;
        Ok(Some(Socks5Proxy::new(host, port)))
    }
}

async fn run(args: &Args) -> mail_finder::Result<String> {
    let mut gmail = GmailConfig::builder()
        .access_token(&args.access_token)
        .user_id(&args.user_id);
    if let Some(proxy) = args.socks_proxy()? {
        gmail = gmail.proxy(proxy);
    }

    let config = FinderConfig::builder()
        .max_attempts(args.max_attempts)
        .window_step(args.window_step)
        .attempt_delay(Duration::from_millis(args.delay_ms))
        .build()?;

    let matcher = args.matcher()?;
    let finder = MessageFinder::new(GmailClient::new(gmail.build()?)?, config);
    let criteria = SearchCriteria::new(&args.sender, args.min_time());

    match matcher {
        Some(matcher) => finder.find_and_extract(&criteria, matcher.as_ref()).await,
        None => finder.find_text(&criteria).await,
    }
}

fn exit_code(error: &Error) -> ExitCode {
    match error.category() {
        ErrorCategory::NotFound => ExitCode::from(2),
        ErrorCategory::Extraction => ExitCode::from(3),
        _ => ExitCode::FAILURE,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mail_finder=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let args = Args::parse();

    match run(&args).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, category = %e.category(), "mail-find failed");
            eprintln!("error: {e}");
            exit_code(&e)
        }
    }
}
