//! Plugin settings
//!
//! Declares the five user-facing settings and loads their current values from
//! the host into [`PluginSettings`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HostResult;
use crate::host::Host;

pub const ROOT_DOCUMENT_NAME: &str = "zoteroRootDocumentName";
pub const LEADING_CHAR: &str = "zoteroLeadingChar";
pub const API_KEY: &str = "zoteroApiKey";
pub const USER_OR_GROUP: &str = "zoteroUserOrGroup";
pub const USER_OR_GROUP_ID: &str = "userOrGroupId";

pub const DEFAULT_ROOT_DOCUMENT_NAME: &str = "Zotero Library";
pub const DEFAULT_LEADING_CHAR: &str = "^";

/// One choice of a dropdown setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropdownOption {
    pub key: &'static str,
    pub label: &'static str,
    pub value: &'static str,
}

/// Kind and default of a setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    String { default: &'static str },
    Dropdown {
        options: &'static [DropdownOption],
        default: Option<&'static str>,
    },
}

/// Declaration of a setting registered with the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingSpec {
    pub id: &'static str,
    pub title: &'static str,
    pub kind: SettingKind,
}

impl SettingSpec {
    pub fn default_value(&self) -> Option<&'static str> {
        match self.kind {
            SettingKind::String { default } => Some(default),
            SettingKind::Dropdown { default, .. } => default,
        }
    }
}

const LIBRARY_TYPE_OPTIONS: &[DropdownOption] = &[
    DropdownOption {
        key: "User",
        label: "User",
        value: "user",
    },
    DropdownOption {
        key: "Group",
        label: "Group",
        value: "group",
    },
];

/// All settings, in registration order
pub const SETTINGS: &[SettingSpec] = &[
    SettingSpec {
        id: ROOT_DOCUMENT_NAME,
        title: "Zotero Root Document Name",
        kind: SettingKind::String {
            default: DEFAULT_ROOT_DOCUMENT_NAME,
        },
    },
    SettingSpec {
        id: LEADING_CHAR,
        title: "Zotero Leading Char",
        kind: SettingKind::String {
            default: DEFAULT_LEADING_CHAR,
        },
    },
    SettingSpec {
        id: API_KEY,
        title: "Zotero API Key",
        kind: SettingKind::String { default: "" },
    },
    SettingSpec {
        id: USER_OR_GROUP,
        title: "Zotero User Or Group",
        kind: SettingKind::Dropdown {
            options: LIBRARY_TYPE_OPTIONS,
            default: None,
        },
    },
    SettingSpec {
        id: USER_OR_GROUP_ID,
        title: "Zotero User Or Group Id",
        kind: SettingKind::String { default: "" },
    },
];

/// Look up a setting declaration by id
pub fn find_setting(id: &str) -> Option<&'static SettingSpec> {
    SETTINGS.iter().find(|s| s.id == id)
}

/// Whether a Zotero library belongs to a user or a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryType {
    User,
    Group,
}

impl LibraryType {
    /// Path segment used by the Web API (`users` / `groups`)
    pub fn path_segment(&self) -> &'static str {
        match self {
            LibraryType::User => "users",
            LibraryType::Group => "groups",
        }
    }
}

impl FromStr for LibraryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(LibraryType::User),
            "group" => Ok(LibraryType::Group),
            other => Err(format!("expected 'user' or 'group', got '{}'", other)),
        }
    }
}

impl fmt::Display for LibraryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryType::User => f.write_str("user"),
            LibraryType::Group => f.write_str("group"),
        }
    }
}

/// Current values of the plugin settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginSettings {
    pub root_document_name: String,
    /// Declared for users but not consumed anywhere
    pub leading_char: String,
    pub api_key: String,
    /// Raw dropdown value; validated when the API client is built
    pub library_type: Option<String>,
    pub library_id: String,
}

impl PluginSettings {
    /// Read every setting from the host
    pub async fn load<H: Host + ?Sized>(host: &H) -> HostResult<Self> {
        let read = |id: &'static str| async move {
            host.read_setting(id).await.map(|v| v.unwrap_or_default())
        };

        Ok(Self {
            root_document_name: read(ROOT_DOCUMENT_NAME).await?,
            leading_char: read(LEADING_CHAR).await?,
            api_key: read(API_KEY).await?,
            library_type: host
                .read_setting(USER_OR_GROUP)
                .await?
                .filter(|v| !v.is_empty()),
            library_id: read(USER_OR_GROUP_ID).await?,
        })
    }
}

/// Register every setting with the host
pub async fn register_all<H: Host + ?Sized>(host: &mut H) -> HostResult<()> {
    for setting in SETTINGS {
        host.register_setting(setting).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::LocalWorkspace;

    #[test]
    fn test_declarations() {
        assert_eq!(SETTINGS.len(), 5);
        assert_eq!(
            find_setting(ROOT_DOCUMENT_NAME).unwrap().default_value(),
            Some("Zotero Library")
        );
        assert_eq!(find_setting(LEADING_CHAR).unwrap().default_value(), Some("^"));
        assert_eq!(find_setting(API_KEY).unwrap().default_value(), Some(""));
        assert_eq!(find_setting(USER_OR_GROUP).unwrap().default_value(), None);
        assert!(find_setting("unknown").is_none());
    }

    #[test]
    fn test_library_type_parse() {
        assert_eq!("user".parse::<LibraryType>(), Ok(LibraryType::User));
        assert_eq!(" Group ".parse::<LibraryType>(), Ok(LibraryType::Group));
        assert!("team".parse::<LibraryType>().is_err());
        assert_eq!(LibraryType::Group.path_segment(), "groups");
        assert_eq!(LibraryType::User.to_string(), "user");
    }

    #[tokio::test]
    async fn test_load_defaults() {
        let mut host = LocalWorkspace::in_memory();
        register_all(&mut host).await.unwrap();

        let settings = PluginSettings::load(&host).await.unwrap();
        assert_eq!(settings.root_document_name, "Zotero Library");
        assert_eq!(settings.leading_char, "^");
        assert_eq!(settings.api_key, "");
        assert_eq!(settings.library_type, None);
        assert_eq!(settings.library_id, "");
    }

    #[tokio::test]
    async fn test_load_overrides() {
        let mut host = LocalWorkspace::in_memory();
        register_all(&mut host).await.unwrap();
        host.set_setting(USER_OR_GROUP, "group");
        host.set_setting(USER_OR_GROUP_ID, "12345");
        host.set_setting(ROOT_DOCUMENT_NAME, "Papers");

        let settings = PluginSettings::load(&host).await.unwrap();
        assert_eq!(settings.root_document_name, "Papers");
        assert_eq!(settings.library_type.as_deref(), Some("group"));
        assert_eq!(settings.library_id, "12345");
    }
}
