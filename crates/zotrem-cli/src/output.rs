//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use zotrem_core::{LocalWorkspace, NodeId, SyncReport};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// A node and its subtree, as printed by `zotrem tree`
#[derive(Debug, Serialize)]
pub struct TreeEntry {
    pub id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back: Option<String>,
    pub is_document: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeEntry>,
}

impl TreeEntry {
    /// Build the subtree rooted at `id`
    pub fn build(workspace: &LocalWorkspace, id: &NodeId) -> Option<Self> {
        let node = workspace.node(id)?;
        let resolve = |r: &NodeId| workspace.display_text(r);
        Some(Self {
            id: node.id.to_string(),
            text: node.text.render(resolve),
            back: node.back_text.as_ref().map(|b| b.render(resolve)),
            is_document: node.is_document,
            children: workspace
                .children(Some(id))
                .iter()
                .filter_map(|child| Self::build(workspace, &child.id))
                .collect(),
        })
    }

    /// All top-level subtrees
    pub fn forest(workspace: &LocalWorkspace) -> Vec<Self> {
        workspace
            .children(None)
            .iter()
            .filter_map(|node| Self::build(workspace, &node.id))
            .collect()
    }

    fn line(&self) -> String {
        match self.back {
            Some(ref back) => format!("{}: {}", self.text, truncate(back, 60)),
            None => self.text.clone(),
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a sync report
    pub fn print_report(&self, report: &SyncReport) {
        match self.format {
            OutputFormat::Human => {
                println!("Collections:");
                println!("  created:   {}", report.collections_created);
                println!("  updated:   {}", report.collections_updated);
                println!("  unchanged: {}", report.collections_unchanged);
                println!("Items:");
                println!("  created:   {}", report.items_created);
                println!("  updated:   {}", report.items_updated);
                println!("  unchanged: {}", report.items_unchanged);
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "collections": {
                            "created": report.collections_created,
                            "updated": report.collections_updated,
                            "unchanged": report.collections_unchanged
                        },
                        "items": {
                            "created": report.items_created,
                            "updated": report.items_updated,
                            "unchanged": report.items_unchanged
                        }
                    })
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print the workspace outline
    pub fn print_tree(&self, forest: &[TreeEntry]) {
        match self.format {
            OutputFormat::Human => {
                if forest.is_empty() {
                    println!("Workspace is empty.");
                    return;
                }
                for entry in forest {
                    print_entry(entry, 0);
                }
            }
            OutputFormat::Json => match serde_json::to_string_pretty(forest) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Failed to serialize tree: {}", e),
            },
            OutputFormat::Quiet => {
                for entry in forest {
                    println!("{}", entry.id);
                }
            }
        }
    }

    /// Print markdown inserted by the paste command
    pub fn print_inserted(&self, markdown: &str) {
        match self.format {
            OutputFormat::Human | OutputFormat::Quiet => println!("{}", markdown),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"inserted": markdown}));
            }
        }
    }

    /// Print a host notification
    pub fn toast(&self, message: &str) {
        match self.format {
            OutputFormat::Human => eprintln!("! {}", message),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"toast": message}));
            }
            OutputFormat::Quiet => eprintln!("{}", message),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_entry(entry: &TreeEntry, depth: usize) {
    let marker = if entry.is_document { "▸" } else { "•" };
    println!("{}{} {}", "  ".repeat(depth), marker, entry.line());
    for child in &entry.children {
        print_entry(child, depth + 1);
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
