//! functions-client
//!
//! Command-line client for an oracle "Functions" network.
//!
//! # Architecture Overview
//!
//! ```text
//!   request ──▶ secrets ──▶ blockchain (addReview) ──▶ RequestSent
//!                  │                                        │
//!                  ▼                                        ▼
//!            gist / remote                 fulfillment: listener → store → rendezvous
//!            verification                                   │
//!                                                           ▼
//!                                          Response | CallbackError | Timeout
//!
//!   fund ──▶ LINK balanceOf ──▶ transferAndCall ──▶ addConsumer
//!   score ──▶ completion API (local preview)
//! ```
//!
//! Exit code 0 on success, 1 on any error, including callback errors and
//! timeouts.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use functions_client::config::{env, load_or_default, required_address, ClientConfig};
use functions_client::lifecycle::startup;
use functions_client::observability::logging;
use functions_client::scoring::ScoringClient;
use functions_client::secrets::SecretsManager;
use functions_client::subscription::{parse_link_amount, SubscriptionManager};
use functions_client::{Error, RequestRunner};

#[derive(Parser)]
#[command(name = "functions-client")]
#[command(about = "Submit and track oracle Functions requests", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a review request and wait for its fulfillment
    Request {
        /// Review text to score (overrides functions.review_text)
        #[arg(short, long)]
        text: Option<String>,

        /// Subject id (overrides functions.subject_id)
        #[arg(long)]
        subject_id: Option<u64>,

        /// Seconds to wait for fulfillment (overrides rendezvous.timeout_secs)
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Fund the subscription and authorize the consumer contract
    Fund {
        /// LINK amount (overrides subscription.link_amount)
        #[arg(short, long)]
        amount: Option<String>,

        /// Only authorize the consumer, do not transfer LINK
        #[arg(long)]
        no_fund: bool,
    },
    /// Check user-hosted secrets documents against the oracle's node list
    VerifySecrets {
        /// Secrets URLs (default: secrets.urls)
        urls: Vec<String>,
    },
    /// Score a text directly against the completion API
    Score {
        /// Text to score (default: functions.review_text)
        text: Option<String>,
    },
    /// Delete a secrets gist left behind by an earlier run
    DeleteGist {
        /// Gist URL
        url: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            logging::init("info");
            let e = Error::from(e);
            tracing::error!(kind = e.kind(), error = %e, "Failed to load configuration");
            return ExitCode::from(e.exit_code());
        }
    };
    logging::init(&config.observability.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        chain_id = config.blockchain.chain_id,
        "functions-client starting"
    );

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(kind = e.kind(), error = %e, "Command failed");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(command: Commands, mut config: ClientConfig) -> functions_client::Result<()> {
    match command {
        Commands::Request {
            text,
            subject_id,
            timeout_secs,
        } => {
            if let Some(text) = text {
                config.functions.review_text = text;
            }
            if let Some(subject_id) = subject_id {
                config.functions.subject_id = subject_id;
            }
            if let Some(timeout_secs) = timeout_secs {
                config.rendezvous.timeout_secs = timeout_secs;
            }

            let fulfillment = RequestRunner::new(config)?.run().await?;
            print_json(&fulfillment.to_json())
        }
        Commands::Fund { amount, no_fund } => {
            let subscription = &config.subscription;
            let juels = parse_link_amount(amount.as_deref().unwrap_or(&subscription.link_amount))?;
            let link_token =
                required_address("subscription.link_token_address", &subscription.link_token_address)?;
            let registry =
                required_address("subscription.registry_address", &subscription.registry_address)?;
            let consumer =
                required_address("functions.consumer_address", &config.functions.consumer_address)?;

            let (tx, _) = startup::connect_signer(&config.blockchain).await?;
            SubscriptionManager::new(tx, link_token, registry)
                .fund_and_authorize(
                    config.functions.subscription_id,
                    consumer,
                    juels,
                    subscription.fund && !no_fund,
                )
                .await
        }
        Commands::VerifySecrets { urls } => {
            let urls = if urls.is_empty() {
                config.secrets.urls.clone()
            } else {
                urls
            };
            if urls.is_empty() {
                return Err(Error::Configuration("no secrets URLs to verify".into()));
            }
            let oracle =
                required_address("functions.oracle_address", &config.functions.oracle_address)?;

            let client = startup::connect_client(&config.blockchain).await?;
            SecretsManager::new(config.secrets)?
                .verify_remote(&urls, &client, oracle)
                .await?;
            tracing::info!(count = urls.len(), "Secrets documents verified");
            Ok(())
        }
        Commands::Score { text } => {
            let text = text.unwrap_or(config.functions.review_text);
            let api_key = env::require(env::OPENAI_API_KEY)?;
            let score = ScoringClient::new(config.scoring, api_key)?.score(&text).await?;
            print_json(&serde_json::json!({ "score": score }))
        }
        Commands::DeleteGist { url } => {
            SecretsManager::new(config.secrets)?
                .gist_client()?
                .delete(&url)
                .await?;
            Ok(())
        }
    }
}

fn print_json(value: &serde_json::Value) -> functions_client::Result<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| Error::Validation(format!("Cannot render output: {}", e)))?;
    println!("{}", text);
    Ok(())
}
