//! zotrem Core Library
//!
//! Mirrors a Zotero library (collections, items, creators, tags) into a
//! hierarchical note graph as linked documents and attribute cards, and turns
//! copied Zotero annotations into inline links.
//!
//! # Architecture
//!
//! The plugin talks to two outside systems through traits:
//!
//! - [`Host`]: the note-taking application (nodes, settings, synced storage,
//!   clipboard, editor)
//! - [`LibrarySource`]: the Zotero Web API, implemented by [`ZoteroClient`]
//!
//! # Quick Start
//!
//! ```text
//! let host = LocalWorkspace::open(&config.data_dir)?;
//! let Activation::Ready(mut plugin) = Plugin::activate(host, ZoteroClient::from_settings).await? else { .. };
//! plugin.run(Command::UpdateCollections).await?;
//! ```
//!
//! # Modules
//!
//! - `plugin`: activation and command dispatch (main entry point)
//! - `sync`: collection and item reconciliation
//! - `state`: persisted key -> node mirror maps
//! - `fields`: item field roles for the attribute walk
//! - `nodes`: find-or-create helpers
//! - `annotation`: clipboard annotation parsing
//! - `zotero`: Web API models and client
//! - `host`: host trait and the local workspace implementation
//! - `settings`: plugin setting declarations
//! - `config`: application configuration

pub mod annotation;
pub mod config;
pub mod error;
pub mod fields;
pub mod host;
pub mod nodes;
pub mod plugin;
pub mod rich_text;
pub mod settings;
pub mod state;
pub mod sync;
pub mod zotero;

pub use annotation::Annotation;
pub use config::Config;
pub use error::{HostError, SyncError, ZoteroError};
pub use host::{CardType, Host, LocalWorkspace, Node, PracticeDirection};
pub use plugin::{Activation, Command, CommandOutcome, CommandSpec, Plugin};
pub use rich_text::{NodeId, RichText, RichTextElement};
pub use settings::{LibraryType, PluginSettings};
pub use state::SyncState;
pub use sync::{RootNodes, SyncReport, Synchronizer};
pub use zotero::{LibrarySource, ZoteroClient};
