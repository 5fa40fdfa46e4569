//! Host collaborator
//!
//! Everything the plugin needs from the note-taking application goes through
//! the [`Host`] trait: settings, command registration, the node graph, synced
//! storage, the clipboard, the editor and notifications.
//!
//! [`LocalWorkspace`] is a file-backed implementation used by the CLI and,
//! in its in-memory form, by tests.

mod local;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::HostResult;
use crate::plugin::CommandSpec;
use crate::rich_text::{NodeId, RichText};
use crate::settings::SettingSpec;

pub use local::{LocalWorkspace, Node};

/// Flashcard type of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    Concept,
    Descriptor,
    Default,
}

/// Which sides of a card are practiced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PracticeDirection {
    Forward,
    Backward,
    None,
    Both,
}

/// Capabilities the host application provides to the plugin
#[async_trait]
pub trait Host: Send + Sync {
    // ==================== Settings & commands ====================

    /// Declare a user-editable setting
    async fn register_setting(&mut self, setting: &SettingSpec) -> HostResult<()>;

    /// Read a setting value, falling back to its declared default
    async fn read_setting(&self, id: &str) -> HostResult<Option<String>>;

    /// Expose a command to the user
    async fn register_command(&mut self, command: &CommandSpec) -> HostResult<()>;

    // ==================== Node graph ====================

    /// Find a node whose text equals `text` under `parent`
    async fn find_node(&self, text: &RichText, parent: Option<&NodeId>)
        -> HostResult<Option<NodeId>>;

    /// Create an empty node at the top level
    async fn create_node(&mut self) -> HostResult<NodeId>;

    async fn set_text(&mut self, id: &NodeId, text: RichText) -> HostResult<()>;

    async fn set_back_text(&mut self, id: &NodeId, text: RichText) -> HostResult<()>;

    async fn set_parent(&mut self, id: &NodeId, parent: Option<&NodeId>) -> HostResult<()>;

    async fn set_is_document(&mut self, id: &NodeId, is_document: bool) -> HostResult<()>;

    async fn set_card_type(&mut self, id: &NodeId, card_type: CardType) -> HostResult<()>;

    async fn set_practice_direction(
        &mut self,
        id: &NodeId,
        direction: PracticeDirection,
    ) -> HostResult<()>;

    // ==================== Synced storage ====================

    /// Read an opaque blob from synced storage
    async fn get_persisted(&self, key: &str) -> HostResult<Option<serde_json::Value>>;

    /// Write (or clear, with `None`) an opaque blob in synced storage
    async fn set_persisted(&mut self, key: &str, value: Option<serde_json::Value>)
        -> HostResult<()>;

    // ==================== Editor & UI ====================

    async fn read_clipboard(&self) -> HostResult<String>;

    /// Insert markdown at the editor cursor
    async fn insert_markdown(&mut self, markdown: &str) -> HostResult<()>;

    /// Show a transient notification
    async fn toast(&mut self, message: &str) -> HostResult<()>;
}
