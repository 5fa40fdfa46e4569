//! Zotero Web API access
//!
//! - `models`: collections, items, creators and tags as the API returns them
//! - `client`: paginated HTTP client and the [`LibrarySource`] seam

mod client;
mod models;

pub use client::{Library, LibrarySource, ZoteroClient, DEFAULT_API_URL};
pub use models::{Collection, Creator, Item, Tag};
