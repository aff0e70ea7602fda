//! # Posting Rights CLI
//!
//! Inspect consolidated posting rights and edit access against the rights
//! database.
//!
//! ## Commands
//!
//! - `resolve` - Consolidated right of a user over a set of sources
//! - `can-edit` - Whether a user may edit a document
//! - `source-rights` - Every user's rights on a source
//! - `migrate` - Create or update the rights tables
//!
//! ## Configuration
//!
//! - `RIGHTS_CONFIG` - Path to the TOML configuration file
//! - `DATABASE_URL` - Overrides `database.url`
//! - `RUST_LOG` - Log filter (default: `logging.level` from the config)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reliefweb_rights::{
    Account, ContentKind, Document, DocumentId, ModerationStatus, RightsConfig, RightsEngine,
    SourceId, UserId,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// ReliefWeb posting rights CLI
#[derive(Parser)]
#[command(name = "rights-cli")]
#[command(about = "Inspect posting rights and edit access")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "RIGHTS_CONFIG")]
    config: Option<PathBuf>,

    /// Database URL (overrides config)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Consolidated right of a user over a set of sources
    Resolve {
        #[arg(long)]
        user: UserId,

        /// Content kind (job, training, report)
        #[arg(long)]
        kind: ContentKind,

        /// Source IDs (repeatable)
        #[arg(long = "source")]
        sources: Vec<SourceId>,
    },

    /// Whether a user may edit a document
    CanEdit {
        #[arg(long)]
        user: UserId,

        /// Document ID, omit for an unsaved document
        #[arg(long)]
        document: Option<DocumentId>,

        #[arg(long)]
        kind: ContentKind,

        /// Current moderation status of the document
        #[arg(long)]
        status: ModerationStatus,

        /// Target status to check against (defaults to the current one)
        #[arg(long)]
        target_status: Option<ModerationStatus>,

        #[arg(long)]
        owner: Option<UserId>,

        /// Source IDs (repeatable)
        #[arg(long = "source")]
        sources: Vec<SourceId>,
    },

    /// Every user's rights on a source
    SourceRights {
        #[arg(long)]
        source: SourceId,
    },

    /// Run database migrations
    Migrate,
}

#[derive(Serialize)]
struct EditAccess {
    user: UserId,
    document: Option<DocumentId>,
    status: ModerationStatus,
    allowed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => RightsConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path))?,
        None => RightsConfig::default(),
    };

    // Apply CLI overrides
    if let Some(url) = cli.database_url.clone() {
        config.database.url = url;
    }
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }

    config.validate().context("Invalid configuration")?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},reliefweb_rights={}", config.logging.level, config.logging.level).into()),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("rights-cli v{}", reliefweb_rights::VERSION);

    let store = open_store(&config).await?;
    let engine = RightsEngine::new(config, store.clone());
    let scope = engine.scope();

    match cli.command {
        Command::Resolve { user, kind, sources } => {
            let right = scope
                .resolve(&Account::new(user), kind, &sources)
                .await
                .context("Failed to resolve posting rights")?;
            print_json(&right)?;
        }
        Command::CanEdit {
            user,
            document,
            kind,
            status,
            target_status,
            owner,
            sources,
        } => {
            let mut doc = Document::new(kind, status);
            doc.id = document;
            doc.owner = owner;
            if !sources.is_empty() {
                doc = doc.with_sources(sources);
            }

            let target = target_status.unwrap_or(status);
            let allowed = scope
                .can_edit(&Account::new(user), &doc, target)
                .await
                .context("Failed to check edit access")?;

            print_json(&EditAccess {
                user,
                document,
                status: target,
                allowed,
            })?;
        }
        Command::SourceRights { source } => {
            let records = scope
                .rights_for_source(source)
                .await
                .context("Failed to list source rights")?;
            print_json(&records)?;
        }
        Command::Migrate => migrate(&store).await?,
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(feature = "postgres")]
type Store = reliefweb_rights::PostgresRightsStore;

#[cfg(feature = "postgres")]
async fn open_store(config: &RightsConfig) -> Result<Arc<Store>> {
    let store = Store::from_config(&config.database)
        .await
        .context("Failed to open rights database")?;
    Ok(Arc::new(store))
}

#[cfg(feature = "postgres")]
async fn migrate(store: &Store) -> Result<()> {
    store.run_migrations().await.context("Migration failed")?;
    info!("Migrations applied");
    Ok(())
}

#[cfg(not(feature = "postgres"))]
type Store = reliefweb_rights::InMemoryRightsStore;

#[cfg(not(feature = "postgres"))]
async fn open_store(_config: &RightsConfig) -> Result<Arc<Store>> {
    anyhow::bail!("rights-cli was built without the `postgres` feature")
}

#[cfg(not(feature = "postgres"))]
async fn migrate(_store: &Store) -> Result<()> {
    anyhow::bail!("rights-cli was built without the `postgres` feature")
}
