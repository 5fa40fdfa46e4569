//! Local workspace host
//!
//! A [`Host`] backed by plain data structures. Nodes and synced storage can be
//! persisted to the data directory:
//!
//! - `workspace.json` - the node graph
//! - `synced.json` - synced key-value storage
//!
//! Writes are atomic (write to temp file, then rename). Synced storage writes
//! are batched: the files are rewritten every [`FLUSH_EVERY`] writes, and the
//! caller flushes once at the end of a command. Without a directory the
//! workspace lives in memory only, which is what the tests use.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CardType, Host, PracticeDirection};
use crate::error::{HostError, HostResult};
use crate::plugin::CommandSpec;
use crate::rich_text::{NodeId, RichText};
use crate::settings::{self, SettingSpec};

const GRAPH_FILE: &str = "workspace.json";
const SYNCED_FILE: &str = "synced.json";

/// Synced storage writes between automatic flushes
pub const FLUSH_EVERY: usize = 50;

/// A node in the local graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub text: RichText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_text: Option<RichText>,
    pub parent: Option<NodeId>,
    #[serde(default)]
    pub is_document: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_type: Option<CardType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub practice_direction: Option<PracticeDirection>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Node {
    fn new(id: NodeId) -> Self {
        let now = Utc::now();
        Self {
            id,
            text: RichText::default(),
            back_text: None,
            parent: None,
            is_document: false,
            card_type: None,
            practice_direction: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// File-backed (or in-memory) host workspace
#[derive(Debug, Default)]
pub struct LocalWorkspace {
    /// Nodes in creation order
    nodes: Vec<Node>,
    /// Node id -> position in `nodes`
    index: HashMap<NodeId, usize>,
    synced: BTreeMap<String, serde_json::Value>,
    settings: HashMap<String, String>,
    declared_settings: Vec<SettingSpec>,
    commands: Vec<CommandSpec>,
    clipboard: Option<String>,
    inserted: Vec<String>,
    toasts: Vec<String>,
    mutations: usize,
    /// Synced storage writes since the last flush
    unflushed: AtomicUsize,
    dir: Option<PathBuf>,
}

impl LocalWorkspace {
    /// Create a workspace that is never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the workspace stored in `dir`, starting empty if nothing is there
    pub fn open(dir: impl Into<PathBuf>) -> HostResult<Self> {
        let dir = dir.into();
        let mut workspace = Self {
            dir: Some(dir.clone()),
            ..Self::default()
        };

        if let Some(nodes) = read_json::<Vec<Node>>(&dir.join(GRAPH_FILE))? {
            workspace.nodes = nodes;
            workspace.rebuild_index();
        }
        if let Some(synced) = read_json(&dir.join(SYNCED_FILE))? {
            workspace.synced = synced;
        }

        debug!(
            "Opened workspace at {:?} ({} nodes)",
            dir,
            workspace.nodes.len()
        );
        Ok(workspace)
    }

    /// Write nodes and synced storage to disk (no-op in memory)
    pub fn flush(&self) -> HostResult<()> {
        let Some(ref dir) = self.dir else {
            return Ok(());
        };

        write_json(&dir.join(GRAPH_FILE), &self.nodes)?;
        write_json(&dir.join(SYNCED_FILE), &self.synced)?;
        self.unflushed.store(0, Ordering::Relaxed);
        debug!("Flushed workspace to {:?}", dir);
        Ok(())
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.clone(), i))
            .collect();
    }

    // ==================== Caller-side setup ====================

    /// Set a setting value as if the user had edited it
    pub fn set_setting(&mut self, id: &str, value: impl Into<String>) {
        self.settings.insert(id.to_string(), value.into());
    }

    /// Builder form of [`set_setting`](Self::set_setting)
    pub fn with_setting(mut self, id: &str, value: impl Into<String>) -> Self {
        self.set_setting(id, value);
        self
    }

    /// Provide the text the next clipboard read returns
    pub fn set_clipboard(&mut self, text: impl Into<String>) {
        self.clipboard = Some(text.into());
    }

    // ==================== Inspection ====================

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// All nodes in creation order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Children of `parent` (top-level nodes for `None`) in creation order
    pub fn children(&self, parent: Option<&NodeId>) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|n| n.parent.as_ref() == parent)
            .collect()
    }

    /// Plain display text of a node, references rendered by name
    pub fn display_text(&self, id: &NodeId) -> String {
        self.node(id)
            .map(|n| n.text.render(|r| self.display_text(r)))
            .unwrap_or_else(|| id.to_string())
    }

    /// Number of node mutations performed so far
    pub fn mutation_count(&self) -> usize {
        self.mutations
    }

    /// Markdown inserted into the editor so far
    pub fn inserted(&self) -> &[String] {
        &self.inserted
    }

    /// Toast messages shown so far
    pub fn toasts(&self) -> &[String] {
        &self.toasts
    }

    pub fn commands(&self) -> &[CommandSpec] {
        &self.commands
    }

    pub fn declared_settings(&self) -> &[SettingSpec] {
        &self.declared_settings
    }

    /// Synced storage value, read synchronously
    pub fn persisted(&self, key: &str) -> Option<&serde_json::Value> {
        self.synced.get(key)
    }

    fn node_mut(&mut self, id: &NodeId) -> HostResult<&mut Node> {
        let i = *self
            .index
            .get(id)
            .ok_or_else(|| HostError::NodeNotFound(id.clone()))?;
        self.mutations += 1;
        let node = &mut self.nodes[i];
        node.updated_at = Utc::now();
        Ok(node)
    }
}

#[async_trait]
impl Host for LocalWorkspace {
    async fn register_setting(&mut self, setting: &SettingSpec) -> HostResult<()> {
        if !self.declared_settings.iter().any(|s| s.id == setting.id) {
            self.declared_settings.push(*setting);
        }
        Ok(())
    }

    async fn read_setting(&self, id: &str) -> HostResult<Option<String>> {
        if let Some(value) = self.settings.get(id) {
            return Ok(Some(value.clone()));
        }
        let default = self
            .declared_settings
            .iter()
            .find(|s| s.id == id)
            .or_else(|| settings::find_setting(id))
            .and_then(|s| s.default_value());
        Ok(default.map(str::to_string))
    }

    async fn register_command(&mut self, command: &CommandSpec) -> HostResult<()> {
        self.commands.retain(|c| c.id != command.id);
        self.commands.push(*command);
        Ok(())
    }

    async fn find_node(
        &self,
        text: &RichText,
        parent: Option<&NodeId>,
    ) -> HostResult<Option<NodeId>> {
        Ok(self
            .nodes
            .iter()
            .find(|n| n.parent.as_ref() == parent && &n.text == text)
            .map(|n| n.id.clone()))
    }

    async fn create_node(&mut self) -> HostResult<NodeId> {
        let id = NodeId::generate();
        self.index.insert(id.clone(), self.nodes.len());
        self.nodes.push(Node::new(id.clone()));
        self.mutations += 1;
        debug!("Created node {}", id);
        Ok(id)
    }

    async fn set_text(&mut self, id: &NodeId, text: RichText) -> HostResult<()> {
        self.node_mut(id)?.text = text;
        Ok(())
    }

    async fn set_back_text(&mut self, id: &NodeId, text: RichText) -> HostResult<()> {
        self.node_mut(id)?.back_text = Some(text);
        Ok(())
    }

    async fn set_parent(&mut self, id: &NodeId, parent: Option<&NodeId>) -> HostResult<()> {
        if let Some(parent) = parent {
            if !self.index.contains_key(parent) {
                return Err(HostError::NodeNotFound(parent.clone()));
            }
        }
        self.node_mut(id)?.parent = parent.cloned();
        Ok(())
    }

    async fn set_is_document(&mut self, id: &NodeId, is_document: bool) -> HostResult<()> {
        self.node_mut(id)?.is_document = is_document;
        Ok(())
    }

    async fn set_card_type(&mut self, id: &NodeId, card_type: CardType) -> HostResult<()> {
        self.node_mut(id)?.card_type = Some(card_type);
        Ok(())
    }

    async fn set_practice_direction(
        &mut self,
        id: &NodeId,
        direction: PracticeDirection,
    ) -> HostResult<()> {
        self.node_mut(id)?.practice_direction = Some(direction);
        Ok(())
    }

    async fn get_persisted(&self, key: &str) -> HostResult<Option<serde_json::Value>> {
        Ok(self.synced.get(key).cloned())
    }

    async fn set_persisted(
        &mut self,
        key: &str,
        value: Option<serde_json::Value>,
    ) -> HostResult<()> {
        match value {
            Some(value) => {
                self.synced.insert(key.to_string(), value);
            }
            None => {
                self.synced.remove(key);
            }
        }
        // The graph is written along with synced storage so the maps never
        // reference nodes missing on disk
        if self.unflushed.fetch_add(1, Ordering::Relaxed) + 1 >= FLUSH_EVERY {
            self.flush()?;
        }
        Ok(())
    }

    async fn read_clipboard(&self) -> HostResult<String> {
        self.clipboard
            .clone()
            .ok_or_else(|| HostError::Clipboard("no clipboard text provided".to_string()))
    }

    async fn insert_markdown(&mut self, markdown: &str) -> HostResult<()> {
        self.inserted.push(markdown.to_string());
        Ok(())
    }

    async fn toast(&mut self, message: &str) -> HostResult<()> {
        self.toasts.push(message.to_string());
        Ok(())
    }
}

/// Read a JSON file, returning `None` if it doesn't exist
fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> HostResult<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| HostError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(serde_json::from_str(&content)?))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> HostResult<()> {
    let data = serde_json::to_vec_pretty(value)?;
    atomic_write(path, &data).map_err(|source| HostError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Write data to a file atomically
///
/// Writes to a temp file in the same directory, syncs, then renames over the
/// target so the file is never left partially written.
fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    let mut file = File::create(&temp_path)?;
    file.write_all(data)?;
    file.sync_all()?;

    fs::rename(&temp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_find_node_matches_text_and_parent() {
        let mut ws = LocalWorkspace::in_memory();
        let root = ws.create_node().await.unwrap();
        ws.set_text(&root, "Root".into()).await.unwrap();

        let child = ws.create_node().await.unwrap();
        ws.set_text(&child, "Child".into()).await.unwrap();
        ws.set_parent(&child, Some(&root)).await.unwrap();

        let found = ws.find_node(&"Child".into(), Some(&root)).await.unwrap();
        assert_eq!(found, Some(child));
        assert!(ws.find_node(&"Child".into(), None).await.unwrap().is_none());
        assert_eq!(ws.find_node(&"Root".into(), None).await.unwrap(), Some(root));
    }

    #[tokio::test]
    async fn test_unknown_node_errors() {
        let mut ws = LocalWorkspace::in_memory();
        let missing = NodeId::new("missing");

        let err = ws.set_text(&missing, "x".into()).await.unwrap_err();
        assert!(matches!(err, HostError::NodeNotFound(_)));

        let node = ws.create_node().await.unwrap();
        let err = ws.set_parent(&node, Some(&missing)).await.unwrap_err();
        assert!(matches!(err, HostError::NodeNotFound(_)));
    }

    #[tokio::test]
    async fn test_mutation_count() {
        let mut ws = LocalWorkspace::in_memory();
        assert_eq!(ws.mutation_count(), 0);

        let node = ws.create_node().await.unwrap();
        ws.set_text(&node, "a".into()).await.unwrap();
        ws.set_is_document(&node, true).await.unwrap();
        assert_eq!(ws.mutation_count(), 3);

        // Reads don't count
        ws.find_node(&"a".into(), None).await.unwrap();
        ws.get_persisted("k").await.unwrap();
        assert_eq!(ws.mutation_count(), 3);
    }

    #[tokio::test]
    async fn test_setting_defaults_and_overrides() {
        let mut ws = LocalWorkspace::in_memory();
        assert_eq!(
            ws.read_setting(settings::ROOT_DOCUMENT_NAME).await.unwrap(),
            Some("Zotero Library".to_string())
        );

        ws.set_setting(settings::ROOT_DOCUMENT_NAME, "Library");
        assert_eq!(
            ws.read_setting(settings::ROOT_DOCUMENT_NAME).await.unwrap(),
            Some("Library".to_string())
        );
        assert!(ws.read_setting("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clipboard_and_ui() {
        let mut ws = LocalWorkspace::in_memory();
        assert!(matches!(
            ws.read_clipboard().await,
            Err(HostError::Clipboard(_))
        ));

        ws.set_clipboard("copied");
        assert_eq!(ws.read_clipboard().await.unwrap(), "copied");

        ws.insert_markdown("[a](b)").await.unwrap();
        ws.toast("hello").await.unwrap();
        assert_eq!(ws.inserted(), &["[a](b)".to_string()]);
        assert_eq!(ws.toasts(), &["hello".to_string()]);
    }

    #[tokio::test]
    async fn test_persistence_roundtrip() {
        let temp_dir = TempDir::new().unwrap();

        let node_id = {
            let mut ws = LocalWorkspace::open(temp_dir.path()).unwrap();
            let node = ws.create_node().await.unwrap();
            ws.set_text(&node, "Saved".into()).await.unwrap();
            ws.set_persisted("zoteroItemsMap", Some(serde_json::json!({"A": 1})))
                .await
                .unwrap();
            ws.flush().unwrap();
            node
        };

        let ws = LocalWorkspace::open(temp_dir.path()).unwrap();
        assert_eq!(ws.nodes().len(), 1);
        assert_eq!(ws.display_text(&node_id), "Saved");
        assert_eq!(
            ws.persisted("zoteroItemsMap"),
            Some(&serde_json::json!({"A": 1}))
        );
    }

    #[tokio::test]
    async fn test_persisted_writes_flush_in_batches() {
        let temp_dir = TempDir::new().unwrap();
        let synced_path = temp_dir.path().join("synced.json");
        let mut ws = LocalWorkspace::open(temp_dir.path()).unwrap();

        for i in 0..FLUSH_EVERY - 1 {
            ws.set_persisted("zoteroItemsMap", Some(serde_json::json!({ "n": i })))
                .await
                .unwrap();
        }
        assert!(!synced_path.exists());

        ws.set_persisted("zoteroItemsMap", Some(serde_json::json!({ "n": "last" })))
            .await
            .unwrap();
        let on_disk: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&synced_path).unwrap()).unwrap();
        assert_eq!(on_disk["zoteroItemsMap"]["n"], "last");

        // The counter restarts after a flush
        ws.set_persisted("zoteroItemsMap", None).await.unwrap();
        let on_disk: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&synced_path).unwrap()).unwrap();
        assert!(on_disk.get("zoteroItemsMap").is_some());
    }

    #[tokio::test]
    async fn test_clearing_persisted_value() {
        let mut ws = LocalWorkspace::in_memory();
        ws.set_persisted("k", Some(serde_json::json!([1, 2])))
            .await
            .unwrap();
        ws.set_persisted("k", None).await.unwrap();
        assert!(ws.get_persisted("k").await.unwrap().is_none());
    }

    #[test]
    fn test_open_missing_dir_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let ws = LocalWorkspace::open(temp_dir.path().join("nested")).unwrap();
        assert!(ws.nodes().is_empty());
        // Flushing creates the directory
        ws.flush().unwrap();
        assert!(temp_dir.path().join("nested").join("workspace.json").exists());
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir.path().join("a").join("b").join("file.json");

        atomic_write(&nested_path, b"{}").unwrap();

        assert_eq!(fs::read_to_string(&nested_path).unwrap(), "{}");
        assert!(!nested_path.with_extension("tmp").exists());
    }
}
