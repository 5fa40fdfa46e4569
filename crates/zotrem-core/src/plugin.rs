//! Plugin lifecycle
//!
//! [`Plugin::activate`] mirrors what the host does when the plugin loads:
//!
//! 1. register the settings
//! 2. build the Zotero client from them (toast and abort on failure)
//! 3. find or create the root nodes
//! 4. register the three commands
//!
//! Commands are then dispatched through [`Plugin::run`].

use tracing::{info, warn};

use crate::annotation::{self, Annotation};
use crate::error::{HostResult, SyncError, ZoteroError};
use crate::host::Host;
use crate::settings::{self, PluginSettings};
use crate::state::SyncState;
use crate::sync::{RootNodes, SyncReport, Synchronizer};
use crate::zotero::LibrarySource;

/// Toast shown when the client can't be built
pub const ACTIVATION_FAILED: &str =
    "Cannot initialize zotero api, please make sure provided arguments are valid in plugin settings.";

/// Declaration of a command registered with the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub description: Option<&'static str>,
    /// Short code typed to invoke the command
    pub quick_code: Option<&'static str>,
}

/// User-invocable commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    PasteAnnotations,
    Reset,
    UpdateCollections,
}

impl Command {
    pub const ALL: [Command; 3] = [
        Command::PasteAnnotations,
        Command::Reset,
        Command::UpdateCollections,
    ];

    pub fn spec(&self) -> CommandSpec {
        match self {
            Command::PasteAnnotations => CommandSpec {
                id: "pasteZoteroAnnotations",
                name: "Paste Zotero Annotations",
                description: None,
                quick_code: Some("pza"),
            },
            Command::Reset => CommandSpec {
                id: "zoteroReset",
                name: "Zotero Reset",
                description: None,
                quick_code: None,
            },
            Command::UpdateCollections => CommandSpec {
                id: "updateZoteroCollections",
                name: "Update Zotero Collections",
                description: Some("This operation will NOT delete anything."),
                quick_code: None,
            },
        }
    }

    /// Look up a command by id, name or quick code
    pub fn find(query: &str) -> Option<Command> {
        Self::ALL.into_iter().find(|c| {
            let spec = c.spec();
            spec.id == query
                || spec.name.eq_ignore_ascii_case(query)
                || spec.quick_code == Some(query)
        })
    }
}

/// Result of running a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Annotation inserted, or `None` if the clipboard didn't parse
    Pasted(Option<Annotation>),
    Reset,
    Synced(SyncReport),
}

/// Result of activation
pub enum Activation<H, S> {
    Ready(Plugin<H, S>),
    /// The client could not be built; the user was notified
    Aborted { host: H, error: ZoteroError },
}

/// An activated plugin bound to a host and a library source
pub struct Plugin<H, S> {
    host: H,
    source: S,
    settings: PluginSettings,
    roots: RootNodes,
}

impl<H: Host, S: LibrarySource> Plugin<H, S> {
    /// Activate the plugin
    ///
    /// `connect` builds the library source from the loaded settings. Host
    /// failures are returned as errors; a `connect` failure shows a toast and
    /// yields [`Activation::Aborted`].
    pub async fn activate<F>(mut host: H, connect: F) -> HostResult<Activation<H, S>>
    where
        F: FnOnce(&PluginSettings) -> Result<S, ZoteroError>,
    {
        settings::register_all(&mut host).await?;
        let settings = PluginSettings::load(&host).await?;

        let source = match connect(&settings) {
            Ok(source) => source,
            Err(error) => {
                warn!("Cannot initialize Zotero client: {}", error);
                host.toast(ACTIVATION_FAILED).await?;
                return Ok(Activation::Aborted { host, error });
            }
        };

        let roots = RootNodes::build(&mut host, &settings.root_document_name).await?;

        for command in Command::ALL {
            host.register_command(&command.spec()).await?;
        }

        info!("Plugin activated (root '{}')", settings.root_document_name);
        Ok(Activation::Ready(Self {
            host,
            source,
            settings,
            roots,
        }))
    }

    /// Run a command
    pub async fn run(&mut self, command: Command) -> Result<CommandOutcome, SyncError> {
        info!("Running command '{}'", command.spec().name);
        match command {
            Command::PasteAnnotations => {
                let pasted = self.paste_annotation().await?;
                Ok(CommandOutcome::Pasted(pasted))
            }
            Command::Reset => {
                self.reset().await?;
                Ok(CommandOutcome::Reset)
            }
            Command::UpdateCollections => {
                let report = self.update_collections().await?;
                Ok(CommandOutcome::Synced(report))
            }
        }
    }

    /// Convert the clipboard's annotation into a link at the cursor
    pub async fn paste_annotation(&mut self) -> HostResult<Option<Annotation>> {
        let text = self.host.read_clipboard().await?;

        match annotation::parse(&text) {
            Some(parsed) => {
                self.host.insert_markdown(&parsed.to_markdown()).await?;
                Ok(Some(parsed))
            }
            None => {
                self.host.toast(&annotation::failure_message(&text)).await?;
                Ok(None)
            }
        }
    }

    /// Forget both mirror maps
    pub async fn reset(&mut self) -> HostResult<()> {
        SyncState::reset(&mut self.host).await
    }

    /// Mirror collections and items
    pub async fn update_collections(&mut self) -> Result<SyncReport, SyncError> {
        Synchronizer::new(&mut self.host, &self.roots)
            .await?
            .run(&self.source)
            .await
    }

    /// Deactivate the plugin; nothing to tear down
    pub async fn deactivate(self) -> H {
        self.host
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn settings(&self) -> &PluginSettings {
        &self.settings
    }

    pub fn roots(&self) -> &RootNodes {
        &self.roots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::LocalWorkspace;
    use crate::rich_text::{NodeId, RichText};
    use crate::state::{COLLECTION_MAP_KEY, ITEMS_MAP_KEY};
    use crate::zotero::{Collection, Item, ZoteroClient};
    use async_trait::async_trait;
    use serde_json::json;

    #[derive(Default)]
    struct FakeLibrary {
        collections: Vec<Collection>,
        items: Vec<Item>,
    }

    #[async_trait]
    impl LibrarySource for FakeLibrary {
        async fn collections(&self) -> Result<Vec<Collection>, ZoteroError> {
            Ok(self.collections.clone())
        }

        async fn top_items(&self) -> Result<Vec<Item>, ZoteroError> {
            Ok(self.items.clone())
        }
    }

    fn library() -> FakeLibrary {
        FakeLibrary {
            collections: vec![Collection {
                key: "C1".to_string(),
                version: 1,
                name: "Thesis".to_string(),
                parent_collection: None,
            }],
            items: vec![serde_json::from_value(json!({
                "key": "I1",
                "version": 1,
                "title": "Paper",
                "collections": ["C1"]
            }))
            .unwrap()],
        }
    }

    async fn activate(host: LocalWorkspace) -> Plugin<LocalWorkspace, FakeLibrary> {
        match Plugin::activate(host, |_| Ok(library())).await.unwrap() {
            Activation::Ready(plugin) => plugin,
            Activation::Aborted { error, .. } => panic!("activation aborted: {}", error),
        }
    }

    #[test]
    fn test_command_specs() {
        assert_eq!(Command::PasteAnnotations.spec().quick_code, Some("pza"));
        assert_eq!(Command::Reset.spec().name, "Zotero Reset");
        assert_eq!(
            Command::UpdateCollections.spec().description,
            Some("This operation will NOT delete anything.")
        );
    }

    #[test]
    fn test_command_find() {
        assert_eq!(Command::find("pza"), Some(Command::PasteAnnotations));
        assert_eq!(Command::find("zoteroReset"), Some(Command::Reset));
        assert_eq!(
            Command::find("update zotero collections"),
            Some(Command::UpdateCollections)
        );
        assert_eq!(Command::find("delete everything"), None);
    }

    #[tokio::test]
    async fn test_activation_registers_everything() {
        let plugin = activate(LocalWorkspace::in_memory()).await;
        let host = plugin.host();

        assert_eq!(host.declared_settings().len(), 5);
        let ids: Vec<&str> = host.commands().iter().map(|c| c.id).collect();
        assert_eq!(
            ids,
            vec!["pasteZoteroAnnotations", "zoteroReset", "updateZoteroCollections"]
        );

        let roots = plugin.roots();
        assert_eq!(host.display_text(&roots.library), "Zotero Library");
        let children: Vec<String> = host
            .children(Some(&roots.library))
            .iter()
            .map(|n| n.text.to_string())
            .collect();
        assert_eq!(children, vec!["Collections", "Items", "Creators", "Tags"]);
    }

    #[tokio::test]
    async fn test_activation_uses_root_name_setting() {
        let host = LocalWorkspace::in_memory().with_setting(settings::ROOT_DOCUMENT_NAME, "Papers");
        let plugin = activate(host).await;
        assert_eq!(plugin.host().display_text(&plugin.roots().library), "Papers");
        assert_eq!(plugin.settings().leading_char, "^");
    }

    #[tokio::test]
    async fn test_invalid_credentials_abort_with_toast() {
        let host = LocalWorkspace::in_memory();
        let activation = Plugin::activate(host, ZoteroClient::from_settings)
            .await
            .unwrap();

        let Activation::Aborted { host, error } = activation else {
            panic!("expected activation to abort");
        };
        assert!(matches!(error, ZoteroError::InvalidConfig(_)));
        assert_eq!(host.toasts(), &[ACTIVATION_FAILED.to_string()]);
        assert!(host.commands().is_empty());
        assert!(host.nodes().is_empty());
    }

    #[tokio::test]
    async fn test_valid_credentials_activate() {
        let host = LocalWorkspace::in_memory()
            .with_setting(settings::USER_OR_GROUP, "user")
            .with_setting(settings::USER_OR_GROUP_ID, "12345");
        let activation = Plugin::activate(host, ZoteroClient::from_settings)
            .await
            .unwrap();
        assert!(matches!(activation, Activation::Ready(_)));
    }

    #[tokio::test]
    async fn test_paste_inserts_markdown() {
        let mut plugin = activate(LocalWorkspace::in_memory()).await;
        plugin.host_mut().set_clipboard(
            "[📝 Note](zotero://select/library/items/N1) [Deng, 2018, p.24](zotero://select/library/items/I1) [pdf](zotero://open-pdf/library/items/QMVDILXN?page=33&annotation=5MCACPT3)",
        );

        let outcome = plugin.run(Command::PasteAnnotations).await.unwrap();

        assert!(matches!(outcome, CommandOutcome::Pasted(Some(_))));
        assert_eq!(
            plugin.host().inserted(),
            &["[🕮 Deng, 2018, p.24](zotero://open-pdf/library/items/QMVDILXN?page=33&annotation=5MCACPT3)".to_string()]
        );
        assert!(plugin.host().toasts().is_empty());
    }

    #[tokio::test]
    async fn test_paste_failure_toasts_clipboard() {
        let mut plugin = activate(LocalWorkspace::in_memory()).await;
        plugin.host_mut().set_clipboard("hello world");

        let outcome = plugin.run(Command::PasteAnnotations).await.unwrap();

        assert_eq!(outcome, CommandOutcome::Pasted(None));
        assert!(plugin.host().inserted().is_empty());
        assert_eq!(
            plugin.host().toasts(),
            &["Failed to parse data in clipboard: hello world".to_string()]
        );
    }

    #[tokio::test]
    async fn test_sync_then_reset() {
        let mut plugin = activate(LocalWorkspace::in_memory()).await;

        let outcome = plugin.run(Command::UpdateCollections).await.unwrap();
        let CommandOutcome::Synced(report) = outcome else {
            panic!("expected a sync report");
        };
        assert_eq!(report.collections_created, 1);
        assert_eq!(report.items_created, 1);

        let item_node = NodeId::new(
            plugin.host().persisted(ITEMS_MAP_KEY).unwrap()["I1"]["nodeId"]
                .as_str()
                .unwrap(),
        );
        let card = plugin
            .host()
            .children(Some(&item_node))
            .into_iter()
            .find(|n| n.text == RichText::plain("Collections"))
            .map(|n| n.id.clone())
            .unwrap();
        let back = plugin.host().node(&card).unwrap().back_text.clone().unwrap();
        let names: Vec<String> = back
            .references()
            .map(|id| plugin.host().display_text(id))
            .collect();
        assert_eq!(names, vec!["Thesis"]);

        plugin.run(Command::Reset).await.unwrap();
        assert!(plugin.host().persisted(COLLECTION_MAP_KEY).is_none());
        assert!(plugin.host().persisted(ITEMS_MAP_KEY).is_none());

        let CommandOutcome::Synced(report) = plugin.run(Command::UpdateCollections).await.unwrap()
        else {
            panic!("expected a sync report");
        };
        assert_eq!(report.collections_created, 1);
        assert_eq!(report.items_created, 1);
    }

    #[tokio::test]
    async fn test_deactivate_returns_host() {
        let plugin = activate(LocalWorkspace::in_memory()).await;
        let host = plugin.deactivate().await;
        assert_eq!(host.commands().len(), 3);
    }
}
