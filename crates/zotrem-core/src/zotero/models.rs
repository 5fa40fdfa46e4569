//! Zotero Web API data models
//!
//! Only the fields the sync reads are typed. Items keep every other field
//! in API order so the attribute walk can turn them into cards.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Listing entry wrapper: `{key, version, library, links, meta, data}`
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

/// A collection in the remote library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub key: String,
    pub version: u64,
    pub name: String,
    /// Key of the enclosing collection; the API sends `false` for root ones
    #[serde(default, with = "parent_key")]
    pub parent_collection: Option<String>,
}

/// A top-level item in the remote library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub key: String,
    pub version: u64,
    /// Remaining fields of the item `data` object, in API order
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Item {
    /// Item title, if it has one
    pub fn title(&self) -> Option<&str> {
        self.fields.get("title").and_then(Value::as_str)
    }
}

/// An item creator
///
/// Creators come in two shapes: split (`firstName` + `lastName`) or single
/// field (`name`), e.g. institutions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub creator_type: String,
}

impl Creator {
    /// Display name: `First Last`, or the single-field name
    pub fn display_name(&self) -> Option<String> {
        match self.first_name.as_deref().filter(|s| !s.is_empty()) {
            Some(first) => {
                let last = self.last_name.as_deref().unwrap_or("");
                Some(format!("{} {}", first, last).trim_end().to_string())
            }
            None => self
                .name
                .clone()
                .or_else(|| self.last_name.clone())
                .filter(|s| !s.is_empty()),
        }
    }
}

/// An item tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub tag: String,
    /// 0 for manual tags, 1 for automatic ones
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<u8>,
}

/// `parentCollection` is either a key string or `false`
mod parent_key {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Key(String),
        Flag(serde::de::IgnoredAny),
    }

    pub fn serialize<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(key) => s.serialize_str(key),
            None => s.serialize_bool(false),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Option::<Raw>::deserialize(d)? {
            Some(Raw::Key(key)) if !key.is_empty() => Some(key),
            _ => None,
        })
    }
}
