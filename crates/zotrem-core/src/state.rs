//! Sync state
//!
//! Mirror maps from remote keys to the local node created for them, kept in
//! host synced storage as two opaque JSON blobs:
//!
//! - `zoteroCollectionMap`: collection key -> `{collection, nodeId}`
//! - `zoteroItemsMap`: item key -> `{item, nodeId}`
//!
//! The state is loaded once per sync, merged record by record and persisted
//! after each phase (collections) or each item.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::HostResult;
use crate::host::Host;
use crate::rich_text::NodeId;
use crate::zotero::{Collection, Item};

pub const COLLECTION_MAP_KEY: &str = "zoteroCollectionMap";
pub const ITEMS_MAP_KEY: &str = "zoteroItemsMap";

/// A collection snapshot and the node mirroring it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionRecord {
    pub collection: Collection,
    pub node_id: NodeId,
}

/// An item snapshot and the node mirroring it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub item: Item,
    pub node_id: NodeId,
}

/// Both mirror maps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncState {
    collections: BTreeMap<String, CollectionRecord>,
    items: BTreeMap<String, ItemRecord>,
}

impl SyncState {
    /// Create an empty state (in-memory only)
    pub fn new() -> Self {
        Self::default()
    }

    /// Load both maps from host storage; missing blobs load as empty maps
    pub async fn load<H: Host + ?Sized>(host: &H) -> HostResult<Self> {
        let collections = match host.get_persisted(COLLECTION_MAP_KEY).await? {
            Some(value) => serde_json::from_value(value)?,
            None => BTreeMap::new(),
        };
        let items = match host.get_persisted(ITEMS_MAP_KEY).await? {
            Some(value) => serde_json::from_value(value)?,
            None => BTreeMap::new(),
        };
        Ok(Self { collections, items })
    }

    /// Clear both maps in host storage
    pub async fn reset<H: Host + ?Sized>(host: &mut H) -> HostResult<()> {
        host.set_persisted(COLLECTION_MAP_KEY, None).await?;
        host.set_persisted(ITEMS_MAP_KEY, None).await
    }

    pub async fn persist_collections<H: Host + ?Sized>(&self, host: &mut H) -> HostResult<()> {
        let value = serde_json::to_value(&self.collections)?;
        host.set_persisted(COLLECTION_MAP_KEY, Some(value)).await
    }

    pub async fn persist_items<H: Host + ?Sized>(&self, host: &mut H) -> HostResult<()> {
        let value = serde_json::to_value(&self.items)?;
        host.set_persisted(ITEMS_MAP_KEY, Some(value)).await
    }

    pub fn collection(&self, key: &str) -> Option<&CollectionRecord> {
        self.collections.get(key)
    }

    pub fn item(&self, key: &str) -> Option<&ItemRecord> {
        self.items.get(key)
    }

    /// Node mirroring the collection with `key`
    pub fn collection_node(&self, key: &str) -> Option<&NodeId> {
        self.collections.get(key).map(|r| &r.node_id)
    }

    /// Insert or replace a collection record
    pub fn merge_collection(&mut self, collection: Collection, node_id: NodeId) {
        self.collections.insert(
            collection.key.clone(),
            CollectionRecord {
                collection,
                node_id,
            },
        );
    }

    /// Insert or replace an item record
    pub fn merge_item(&mut self, item: Item, node_id: NodeId) {
        self.items
            .insert(item.key.clone(), ItemRecord { item, node_id });
    }

    pub fn collection_count(&self) -> usize {
        self.collections.len()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}
