//! Go Marketplace CLI - Drive the cart store from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Show the persisted cart
//! gm-cli show
//!
//! # Add a product
//! gm-cli add --id 1 --title Shirt --image-url https://cdn.example/shirt.png --price 10
//!
//! # Change quantities
//! gm-cli increment 1
//! gm-cli decrement 1
//!
//! # Drop lines
//! gm-cli remove 1
//! gm-cli clear
//! ```
//!
//! # Environment Variables
//!
//! See `go_marketplace_cart::config` for storage settings. `SENTRY_DSN`
//! enables error tracking.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use go_marketplace_core::ProductId;
use rust_decimal::Decimal;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "gm-cli")]
#[command(author, version, about = "Go Marketplace cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart contents and totals
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        #[arg(long)]
        id: String,

        /// Product title
        #[arg(long)]
        title: String,

        /// Product image URL
        #[arg(long)]
        image_url: String,

        /// Unit price (e.g. 19.99)
        #[arg(long)]
        price: Decimal,
    },
    /// Add one unit to an existing line
    Increment {
        /// Product ID
        id: String,
    },
    /// Remove one unit from a line
    Decrement {
        /// Product ID
        id: String,
    },
    /// Drop a line entirely
    Remove {
        /// Product ID
        id: String,
    },
    /// Empty the cart
    Clear,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok()?;

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load .env before anything reads the environment
    let _ = dotenvy::dotenv();

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "go_marketplace_cli=info,go_marketplace_cart=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::cart::CommandError> {
    let session = commands::cart::CartSession::open().await?;

    match cli.command {
        Commands::Show => {
            session.show();
            return Ok(());
        }
        Commands::Add {
            id,
            title,
            image_url,
            price,
        } => session.add(id, title, image_url, price)?,
        Commands::Increment { id } => session.cart().increment(&ProductId::new(id)),
        Commands::Decrement { id } => session.cart().decrement(&ProductId::new(id)),
        Commands::Remove { id } => session.cart().remove(&ProductId::new(id)),
        Commands::Clear => session.cart().clear(),
    }

    session.commit().await
}
