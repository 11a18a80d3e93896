//! `personcard`: fetch person card data and start chats from the terminal.
//!
//! # Usage
//!
//! ```text
//! personcard card 4562bcc8-be6c-4fef-b6c4-7c7e2e5b0a51 --mail adele@contoso.com
//! personcard card --entity person.json
//! personcard chat create --person <ID> --user <MY-ID>
//! personcard chat send --chat <CHAT-ID> --text "hello"
//! personcard cache clear
//! ```

mod settings;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use personcard::ChatMessageDraft;
use personcard_cache_sqlite::SqliteCardCache;
use personcard_core::entity::Entity;
use personcard_graph::{GraphClient, GraphConfig, StaticToken};
use serde::Serialize;
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "Person card data from the directory API")]
struct Cli {
  /// Path to the TOML settings file.
  #[arg(short, long, default_value = "personcard.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Fetch and print the card data for one entity.
  Card {
    /// Directory id of the entity.
    #[arg(required_unless_present = "entity")]
    id: Option<String>,

    /// Email address of the entity, used for mail and shared files.
    #[arg(long, conflicts_with = "entity")]
    mail: Option<String>,

    /// Raw directory JSON for the entity (user, person, contact or group).
    #[arg(long, value_name = "FILE", conflicts_with = "id")]
    entity: Option<PathBuf>,

    /// The entity is the signed-in user.
    #[arg(long)]
    me: bool,
  },

  /// One-on-one chat operations.
  Chat {
    #[command(subcommand)]
    action: ChatCommand,
  },

  /// Manage the local card cache.
  Cache {
    #[command(subcommand)]
    action: CacheCommand,
  },
}

#[derive(Subcommand)]
enum ChatCommand {
  /// Create a chat between the signed-in user and a person.
  Create {
    #[arg(long)]
    person: String,
    /// Directory id of the signed-in user.
    #[arg(long)]
    user: String,
  },
  /// Send a message into an existing chat.
  Send {
    #[arg(long)]
    chat: String,
    #[arg(long)]
    text: String,
    /// Send the text as HTML.
    #[arg(long)]
    html: bool,
  },
}

#[derive(Subcommand)]
enum CacheCommand {
  /// Drop one entry, or everything when no id is given.
  Clear {
    #[arg(long)]
    id: Option<String>,
  },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;

  match cli.command {
    Command::Card { id, mail, entity, me } => {
      let entity = match (entity, id) {
        (Some(path), _) => {
          let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("reading entity file {}", path.display()))?;
          let json = serde_json::from_str(&raw).context("parsing entity file")?;
          Entity::from_graph(&json).context("entity file is not a directory object")?
        }
        (None, Some(id)) => Entity::user(id, mail),
        (None, None) => anyhow::bail!("either an id or --entity is required"),
      };

      let graph = graph_client(&settings)?;
      let cache = open_cache(&settings).await?;
      let fetched =
        personcard::fetch_card_data(&graph, &cache, &entity, me, &settings.card_config())
          .await;

      for failure in &fetched.failures {
        tracing::info!(section = %failure.section, reason = ?failure.reason, "section unavailable");
      }
      print_json(&fetched)
    }

    Command::Chat { action: ChatCommand::Create { person, user } } => {
      let graph = graph_client(&settings)?;
      let chat = personcard::create_chat(&graph, &person, &user)
        .await
        .context("creating chat")?;
      tracing::info!(chat_id = %chat.id, "chat created");
      print_json(&chat)
    }

    Command::Chat { action: ChatCommand::Send { chat, text, html } } => {
      let graph = graph_client(&settings)?;
      let draft = if html { ChatMessageDraft::html(text) } else { ChatMessageDraft::text(text) };
      let message = personcard::send_message(&graph, &chat, &draft)
        .await
        .context("sending message")?;
      print_json(&message)
    }

    Command::Cache { action: CacheCommand::Clear { id } } => {
      let cache = open_cache(&settings).await?;
      match id {
        Some(id) => {
          let removed = cache.remove(&id).await.context("clearing cache entry")?;
          tracing::info!(%id, removed, "cache entry cleared");
        }
        None => {
          let removed = cache.clear().await.context("clearing cache")?;
          tracing::info!(removed, "cache cleared");
        }
      }
      Ok(())
    }
  }
}

fn graph_client(settings: &Settings) -> Result<GraphClient<StaticToken>> {
  GraphClient::new(
    GraphConfig { base_url: settings.graph_base_url.clone(), ..GraphConfig::default() },
    StaticToken::new(settings.access_token.clone()),
  )
  .context("failed to build HTTP client")
}

async fn open_cache(settings: &Settings) -> Result<SqliteCardCache> {
  let path = settings.cache_path();
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("creating cache directory {}", parent.display()))?;
  }
  SqliteCardCache::open(&path)
    .await
    .with_context(|| format!("failed to open cache at {path:?}"))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}
