//! Collection and item synchronization
//!
//! Mirrors the remote library into the node graph in two phases:
//!
//! 1. **Collections**: create a document node per unseen collection, rename
//!    nodes whose collection version changed, then move touched collections
//!    under their parent's node. The collection map is persisted once.
//! 2. **Items**: reconcile every top-level item against its record. New and
//!    changed items get their attribute cards (re)written; the item map is
//!    persisted after each item.
//!
//! Nothing is ever deleted. A version bump reprocesses every field of an
//! item.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{HostResult, SyncError};
use crate::fields::{self, FieldRole};
use crate::host::{CardType, Host, PracticeDirection};
use crate::nodes::{make_card, make_rem};
use crate::rich_text::{NodeId, RichText};
use crate::state::SyncState;
use crate::zotero::{Collection, Creator, Item, LibrarySource, Tag};

/// Names of the fixed child documents under the library root
pub const COLLECTIONS_ROOT: &str = "Collections";
pub const ITEMS_ROOT: &str = "Items";
pub const CREATORS_ROOT: &str = "Creators";
pub const TAGS_ROOT: &str = "Tags";

/// Front text of the tag and collection cards
const TAGS_CARD: &str = "Tags";
const COLLECTIONS_CARD: &str = "Collections";

/// Fixed nodes everything else hangs off
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootNodes {
    pub library: NodeId,
    pub collections: NodeId,
    pub items: NodeId,
    pub creators: NodeId,
    pub tags: NodeId,
}

impl RootNodes {
    /// Find or create the library root and its four children
    pub async fn build<H: Host + ?Sized>(host: &mut H, root_name: &str) -> HostResult<Self> {
        let library = make_rem(host, root_name.into(), None, true).await?;
        let collections = make_rem(host, COLLECTIONS_ROOT.into(), Some(&library), true).await?;
        let items = make_rem(host, ITEMS_ROOT.into(), Some(&library), true).await?;
        let creators = make_rem(host, CREATORS_ROOT.into(), Some(&library), false).await?;
        let tags = make_rem(host, TAGS_ROOT.into(), Some(&library), false).await?;

        Ok(Self {
            library,
            collections,
            items,
            creators,
            tags,
        })
    }
}

/// What a sync run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub collections_created: usize,
    pub collections_updated: usize,
    pub collections_unchanged: usize,
    pub items_created: usize,
    pub items_updated: usize,
    pub items_unchanged: usize,
}

/// Result of reconciling one remote object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated,
    Unchanged,
}

/// Runs one sync against a host
pub struct Synchronizer<'a, H: Host + ?Sized> {
    host: &'a mut H,
    roots: &'a RootNodes,
    state: SyncState,
    report: SyncReport,
}

impl<'a, H: Host + ?Sized> Synchronizer<'a, H> {
    /// Load the persisted state and prepare a run
    pub async fn new(host: &'a mut H, roots: &'a RootNodes) -> HostResult<Self> {
        let state = SyncState::load(&*host).await?;
        Ok(Self {
            host,
            roots,
            state,
            report: SyncReport::default(),
        })
    }

    /// Sync collections, then items
    pub async fn run<S: LibrarySource + ?Sized>(
        mut self,
        source: &S,
    ) -> Result<SyncReport, SyncError> {
        let collections = source.collections().await?;
        info!("Syncing {} collections", collections.len());
        self.sync_collections(collections).await?;

        let items = source.top_items().await?;
        info!("Syncing {} items", items.len());
        self.sync_items(items).await?;

        info!("Sync finished: {:?}", self.report);
        Ok(self.report)
    }

    // ==================== Collections ====================

    /// Reconcile, re-parent and persist collections
    pub async fn sync_collections(&mut self, collections: Vec<Collection>) -> HostResult<()> {
        let mut moved = Vec::new();

        for collection in collections {
            let key = collection.key.clone();
            let previous_parent = self
                .state
                .collection(&key)
                .map(|r| r.collection.parent_collection.clone());

            let outcome = self.reconcile_collection(collection).await?;
            match outcome {
                Outcome::Created => self.report.collections_created += 1,
                Outcome::Updated => self.report.collections_updated += 1,
                Outcome::Unchanged => self.report.collections_unchanged += 1,
            }

            let parent_changed = match previous_parent {
                None => true,
                Some(previous) => self
                    .state
                    .collection(&key)
                    .is_some_and(|r| r.collection.parent_collection != previous),
            };
            if outcome != Outcome::Unchanged && parent_changed {
                moved.push(key);
            }
        }

        // Parents may arrive after their children, so move in a second pass
        for key in &moved {
            self.reparent_collection(key).await?;
        }

        self.state.persist_collections(&mut *self.host).await
    }

    async fn reconcile_collection(&mut self, collection: Collection) -> HostResult<Outcome> {
        let existing = self
            .state
            .collection(&collection.key)
            .map(|r| (r.node_id.clone(), r.collection.version));

        match existing {
            None => {
                debug!("New collection {} '{}'", collection.key, collection.name);
                let node = make_rem(
                    &mut *self.host,
                    collection.name.as_str().into(),
                    Some(&self.roots.collections),
                    true,
                )
                .await?;
                self.state.merge_collection(collection, node);
                Ok(Outcome::Created)
            }
            Some((node, version)) if version != collection.version => {
                debug!(
                    "Collection {} changed (v{} -> v{})",
                    collection.key, version, collection.version
                );
                self.host
                    .set_text(&node, collection.name.as_str().into())
                    .await?;
                self.state.merge_collection(collection, node);
                Ok(Outcome::Updated)
            }
            Some(_) => Ok(Outcome::Unchanged),
        }
    }

    /// Move a collection node under its parent's node, or the collections root
    async fn reparent_collection(&mut self, key: &str) -> HostResult<()> {
        let Some(record) = self.state.collection(key) else {
            return Ok(());
        };
        let node = record.node_id.clone();

        let parent = match record.collection.parent_collection.as_deref() {
            Some(parent_key) => match self.state.collection_node(parent_key) {
                Some(parent) => parent.clone(),
                None => {
                    warn!(
                        "Parent collection {} of {} is unknown; leaving it in place",
                        parent_key, key
                    );
                    return Ok(());
                }
            },
            None => self.roots.collections.clone(),
        };

        self.host.set_parent(&node, Some(&parent)).await
    }

    // ==================== Items ====================

    /// Reconcile every item, persisting the map after each one
    pub async fn sync_items(&mut self, items: Vec<Item>) -> HostResult<()> {
        for item in items {
            match self.reconcile_item(item).await? {
                Outcome::Created => self.report.items_created += 1,
                Outcome::Updated => self.report.items_updated += 1,
                Outcome::Unchanged => self.report.items_unchanged += 1,
            }
            self.state.persist_items(&mut *self.host).await?;
        }
        Ok(())
    }

    /// Create or update the node of one item
    ///
    /// Creation and update share the attribute walk; they differ only in how
    /// the item node is obtained.
    async fn reconcile_item(&mut self, item: Item) -> HostResult<Outcome> {
        let existing = self
            .state
            .item(&item.key)
            .map(|r| (r.node_id.clone(), r.item.version));
        let title = RichText::plain(item.title().unwrap_or(&item.key));

        let (node, outcome) = match existing {
            Some((_, version)) if version == item.version => return Ok(Outcome::Unchanged),
            Some((node, _)) => {
                debug!("Item {} changed", item.key);
                self.host.set_text(&node, title).await?;
                (node, Outcome::Updated)
            }
            None => {
                debug!("New item {}", item.key);
                let node =
                    make_rem(&mut *self.host, title, Some(&self.roots.items), true).await?;
                (node, Outcome::Created)
            }
        };

        self.write_attributes(&node, &item).await?;
        self.state.merge_item(item, node);
        Ok(outcome)
    }

    /// Write one attribute card per mirrored field
    async fn write_attributes(&mut self, node: &NodeId, item: &Item) -> HostResult<()> {
        for (key, value) in &item.fields {
            match fields::classify(key, value) {
                FieldRole::Skip => {}
                FieldRole::Creators => self.write_creators(node, value).await?,
                FieldRole::Tags => self.write_tags(node, value).await?,
                FieldRole::Collections => self.write_collections(node, value).await?,
                FieldRole::Generic => self.write_generic(node, key, value).await?,
            }
        }
        Ok(())
    }

    /// One card per creator role, e.g. `Author: [[Jane Doe]], [[John Roe]]`
    async fn write_creators(&mut self, node: &NodeId, value: &Value) -> HostResult<()> {
        let mut roles: Vec<(String, Vec<String>)> = Vec::new();
        for creator in parse_entries::<Creator>(value, "creator") {
            let Some(name) = creator.display_name() else {
                warn!("Skipping creator without a name: {:?}", creator);
                continue;
            };
            match roles.iter().position(|(role, _)| *role == creator.creator_type) {
                Some(i) => roles[i].1.push(name),
                None => roles.push((creator.creator_type, vec![name])),
            }
        }

        for (role, names) in roles {
            let mut refs = Vec::with_capacity(names.len());
            for name in names {
                let creator = make_rem(
                    &mut *self.host,
                    name.into(),
                    Some(&self.roots.creators),
                    false,
                )
                .await?;
                refs.push(creator);
            }
            self.write_card(node, &fields::capitalize(&role), RichText::reference_list(&refs))
                .await?;
        }
        Ok(())
    }

    async fn write_tags(&mut self, node: &NodeId, value: &Value) -> HostResult<()> {
        let mut refs = Vec::new();
        for tag in parse_entries::<Tag>(value, "tag") {
            let tag_node =
                make_rem(&mut *self.host, tag.tag.into(), Some(&self.roots.tags), false).await?;
            refs.push(tag_node);
        }

        if refs.is_empty() {
            return Ok(());
        }
        self.write_card(node, TAGS_CARD, RichText::reference_list(&refs))
            .await
    }

    async fn write_collections(&mut self, node: &NodeId, value: &Value) -> HostResult<()> {
        let mut refs = Vec::new();
        for key in parse_entries::<String>(value, "collection key") {
            match self.state.collection_node(&key) {
                Some(collection) => refs.push(collection.clone()),
                None => warn!("Item refers to unknown collection {}", key),
            }
        }

        if refs.is_empty() {
            return Ok(());
        }
        self.write_card(node, COLLECTIONS_CARD, RichText::reference_list(&refs))
            .await
    }

    async fn write_generic(&mut self, node: &NodeId, key: &str, value: &Value) -> HostResult<()> {
        let Some(text) = fields::render_value(value) else {
            return Ok(());
        };
        self.write_card(node, &fields::capitalize(key), RichText::plain(text))
            .await
    }

    async fn write_card(&mut self, node: &NodeId, front: &str, back: RichText) -> HostResult<()> {
        make_card(
            &mut *self.host,
            front.into(),
            back,
            Some(node),
            CardType::Descriptor,
            PracticeDirection::None,
        )
        .await?;
        Ok(())
    }
}

/// Decode the elements of an array field, skipping malformed ones
fn parse_entries<T: serde::de::DeserializeOwned>(value: &Value, what: &str) -> Vec<T> {
    let Some(values) = value.as_array() else {
        return Vec::new();
    };
    values
        .iter()
        .filter_map(|v| match serde_json::from_value(v.clone()) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping malformed {}: {}", what, e);
                None
            }
        })
        .collect()
}
