//! Rich text for node content
//!
//! Node text is a sequence of plain-text runs and references to other nodes.
//! Attribute cards use reference lists on their back side, e.g. an `Author`
//! card pointing at one node per creator.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator placed between references in a reference list
pub const LIST_SEPARATOR: &str = ", ";

/// Identifier of a node in the host graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single run of rich text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RichTextElement {
    /// Plain text
    Text(String),
    /// Reference to another node
    Reference(NodeId),
}

/// Text content of a node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText(Vec<RichTextElement>);

impl RichText {
    /// Create rich text holding a single plain-text run
    pub fn plain(text: impl Into<String>) -> Self {
        Self(vec![RichTextElement::Text(text.into())])
    }

    /// Build a reference list: `ref, ref, ref`
    pub fn reference_list<'a>(ids: impl IntoIterator<Item = &'a NodeId>) -> Self {
        let mut elements = Vec::new();
        for id in ids {
            if !elements.is_empty() {
                elements.push(RichTextElement::Text(LIST_SEPARATOR.to_string()));
            }
            elements.push(RichTextElement::Reference(id.clone()));
        }
        Self(elements)
    }

    pub fn elements(&self) -> &[RichTextElement] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Node ids referenced by this text, in order
    pub fn references(&self) -> impl Iterator<Item = &NodeId> {
        self.0.iter().filter_map(|el| match el {
            RichTextElement::Reference(id) => Some(id),
            RichTextElement::Text(_) => None,
        })
    }

    /// Render as a plain string, resolving references with `resolve`
    pub fn render(&self, resolve: impl Fn(&NodeId) -> String) -> String {
        self.0
            .iter()
            .map(|el| match el {
                RichTextElement::Text(text) => text.clone(),
                RichTextElement::Reference(id) => format!("[[{}]]", resolve(id)),
            })
            .collect()
    }
}

impl From<&str> for RichText {
    fn from(text: &str) -> Self {
        Self::plain(text)
    }
}

impl From<String> for RichText {
    fn from(text: String) -> Self {
        Self::plain(text)
    }
}

impl fmt::Display for RichText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(|id| id.to_string()))
    }
}
