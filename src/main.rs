mod a2a;
mod agent;
mod auth;
mod classifier;
mod config;
mod error;
mod gmail;
mod models;
mod protocol;
mod router;
mod server;
mod source;
mod summarizer;

use crate::agent::EmailAgent;
use crate::config::{Config, DEFAULT_CONFIG_PATH};
use crate::gmail::GmailClient;
use crate::server::AppState;
use crate::source::{EmailSource, FallbackSource, SampleSource, SourceMode};
use anyhow::Context;
use google_gmail1::Gmail;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn setup_logging(debug: bool) {
    let default = if debug {
        "info,email_ethan=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn config_path(args: &[String]) -> String {
    args.iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .cloned()
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    setup_logging(args.iter().any(|arg| arg == "--debug"));

    let config = Config::load(config_path(&args))?;

    // Handle token reset
    if args.iter().any(|arg| arg == "--reset-token") {
        auth::RingStorage.clear_token().await?;
        println!("Token cleared. Run with --authorize to connect Gmail again.");
        return Ok(());
    }

    if args.iter().any(|arg| arg == "--authorize") {
        let secret = auth::Authenticator::load_secret(&config.gmail.credentials_path).await?;
        auth::Authenticator::authorize(secret).await?;
        println!("Gmail connected. Start the server without --authorize.");
        return Ok(());
    }

    let live = live_source(&config).await?;
    let inbox = match (config.gmail.source, live) {
        (SourceMode::Live, Some(live)) => FallbackSource::strict(live),
        (_, Some(live)) => FallbackSource::new(Some(live), SampleSource::default()),
        (_, None) => FallbackSource::sample_only(),
    };
    tracing::info!(
        mode = ?config.gmail.source,
        live = inbox.has_live(),
        "email source ready"
    );

    let state = Arc::new(AppState {
        agent: EmailAgent::new(Arc::new(inbox), config.limits),
        config,
    });

    server::serve(state).await
}

/// Resolves the configured source mode into an optional Gmail source.
async fn live_source(config: &Config) -> anyhow::Result<Option<Arc<dyn EmailSource>>> {
    let mode = config.gmail.source;
    if mode == SourceMode::Sample {
        return Ok(None);
    }

    if !auth::RingStorage.has_token().await {
        if mode == SourceMode::Live {
            anyhow::bail!("source = \"live\" but no Gmail token is stored; run with --authorize");
        }
        tracing::info!("no stored Gmail token, serving sample data");
        return Ok(None);
    }

    let secret = auth::Authenticator::load_secret(&config.gmail.credentials_path).await;
    let Some(secret) = degrade_in_auto(mode, secret, "Gmail credentials unavailable")? else {
        return Ok(None);
    };
    let authenticator = auth::Authenticator::authenticate(secret).await;
    let Some(authenticator) = degrade_in_auto(mode, authenticator, "Gmail sign-in failed")? else {
        return Ok(None);
    };

    let hub = Gmail::new(
        hyper::Client::builder().build(
            hyper_rustls::HttpsConnectorBuilder::new()
                .with_native_roots()
                .context("Failed to load native roots")?
                .https_only()
                .enable_http1()
                .build(),
        ),
        authenticator,
    );

    Ok(Some(Arc::new(GmailClient::new(hub))))
}

/// In `auto` mode a startup failure means "serve sample data"; otherwise it is fatal.
fn degrade_in_auto<T>(
    mode: SourceMode,
    result: anyhow::Result<T>,
    what: &str,
) -> anyhow::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if mode == SourceMode::Auto => {
            tracing::warn!(error = %format!("{:#}", e), "{}, serving sample data", what);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
