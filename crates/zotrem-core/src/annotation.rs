//! Zotero annotation links
//!
//! Zotero copies an annotation as markdown carrying a citation link into the
//! library and a `[pdf]` link that opens the PDF at the annotation:
//!
//! ```text
//! "quoted text" ([Deng, 2018, p. 24](zotero://select/library/items/ABCD)) ([pdf](zotero://open-pdf/library/items/QMVDILXN?page=33&annotation=5MCACPT3))
//! ```
//!
//! [`parse`] pulls out the citation label and the PDF link so they can be
//! inserted as a single inline reference.

use std::sync::OnceLock;

use regex::Regex;

/// Prefix of the inserted link label
pub const LABEL_PREFIX: &str = "🕮";

/// Citation label and deep link extracted from clipboard text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// e.g. `Deng, 2018, p. 24`
    pub label: String,
    /// e.g. `zotero://open-pdf/library/items/QMVDILXN?page=33&annotation=5MCACPT3`
    pub link: String,
}

impl Annotation {
    /// Markdown link inserted at the cursor
    pub fn to_markdown(&self) -> String {
        format!("[{} {}]({})", LABEL_PREFIX, self.label, self.link)
    }
}

fn link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[pdf\]\((.*?)\)").expect("Invalid regex"))
}

fn label_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[(.*?)\]\(zotero://select").expect("Invalid regex"))
}

/// Extract an annotation from clipboard text
///
/// Returns `None` unless both the `[pdf]` link and a `zotero://select`
/// citation are present. When several select links appear, the one closest
/// to the end (the citation, after any note links) is used.
pub fn parse(text: &str) -> Option<Annotation> {
    let link = link_regex().captures(text)?.get(1)?.as_str();
    let label = label_regex()
        .captures_iter(text)
        .last()?
        .get(1)?
        .as_str();

    Some(Annotation {
        label: label.to_string(),
        link: link.to_string(),
    })
}

/// Toast shown when the clipboard can't be parsed
pub fn failure_message(clipboard: &str) -> String {
    format!("Failed to parse data in clipboard: {}", clipboard)
}
