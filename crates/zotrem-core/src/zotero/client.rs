//! Zotero Web API client
//!
//! Reads collections and top-level items of a single user or group library.
//! Listings are paginated with `start`/`limit`; the client follows them until
//! `Total-Results` is reached or a short page comes back.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::models::{Collection, Envelope, Item};
use crate::error::ZoteroError;
use crate::settings::{LibraryType, PluginSettings};

/// Public Zotero API endpoint
pub const DEFAULT_API_URL: &str = "https://api.zotero.org";

/// API version requested with every call
const API_VERSION: &str = "3";

/// Largest page the API serves
const PAGE_LIMIT: usize = 100;

/// Request timeout in seconds
const REQUEST_TIMEOUT: u64 = 30;

/// Source of remote library data
///
/// Implemented by [`ZoteroClient`]; tests substitute a canned library.
#[async_trait]
pub trait LibrarySource: Send + Sync {
    /// All collections of the library
    async fn collections(&self) -> Result<Vec<Collection>, ZoteroError>;

    /// All top-level items of the library
    async fn top_items(&self) -> Result<Vec<Item>, ZoteroError>;
}

/// Library a client is scoped to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Library {
    pub kind: LibraryType,
    pub id: String,
}

impl Library {
    /// Validate a library type and numeric id
    pub fn new(kind: Option<&str>, id: &str) -> Result<Self, ZoteroError> {
        let kind: LibraryType = kind
            .ok_or_else(|| ZoteroError::InvalidConfig("library type is not set".to_string()))?
            .parse()
            .map_err(ZoteroError::InvalidConfig)?;

        let id = id.trim();
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
            return Err(ZoteroError::InvalidConfig(format!(
                "library id must be numeric, got '{}'",
                id
            )));
        }

        Ok(Self {
            kind,
            id: id.to_string(),
        })
    }

    /// Path prefix, e.g. `users/12345`
    pub fn prefix(&self) -> String {
        format!("{}/{}", self.kind.path_segment(), self.id)
    }
}

/// HTTP client for one Zotero library
#[derive(Debug, Clone)]
pub struct ZoteroClient {
    http: reqwest::Client,
    base_url: String,
    library: Library,
}

impl ZoteroClient {
    /// Create a client for the given credentials
    ///
    /// An empty API key is allowed (public libraries); a non-empty one must
    /// be alphanumeric.
    pub fn new(api_key: &str, library: Library) -> Result<Self, ZoteroError> {
        let api_key = api_key.trim();
        if !api_key.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ZoteroError::InvalidConfig(
                "API key must be alphanumeric".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert("Zotero-API-Version", HeaderValue::from_static(API_VERSION));
        if !api_key.is_empty() {
            let value = HeaderValue::from_str(api_key)
                .map_err(|e| ZoteroError::InvalidConfig(e.to_string()))?;
            headers.insert("Zotero-API-Key", value);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT))
            .user_agent(concat!("zotrem/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: DEFAULT_API_URL.to_string(),
            library,
        })
    }

    /// Create a client from plugin settings
    pub fn from_settings(settings: &PluginSettings) -> Result<Self, ZoteroError> {
        let library = Library::new(settings.library_type.as_deref(), &settings.library_id)?;
        Self::new(&settings.api_key, library)
    }

    /// Point the client at another API endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    /// Full URL of a library-relative path
    pub fn library_url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.library.prefix(), path)
    }

    /// Fetch every page of a listing
    async fn get_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ZoteroError> {
        let url = self.library_url(path);
        let mut results = Vec::new();
        let mut start = 0;

        loop {
            debug!("GET {} start={}", url, start);
            let response = self
                .http
                .get(&url)
                .query(&[("start", start), ("limit", PAGE_LIMIT)])
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ZoteroError::Status {
                    status: status.as_u16(),
                    url,
                    body,
                });
            }

            let total = total_results(response.headers());
            let body = response.text().await?;
            let page: Vec<T> = decode_page(&body)?;
            let fetched = page.len();
            results.extend(page);
            start += fetched;

            if is_last_page(fetched, start, total) {
                break;
            }
        }

        debug!("Fetched {} entries from {}", results.len(), path);
        Ok(results)
    }
}

#[async_trait]
impl LibrarySource for ZoteroClient {
    async fn collections(&self) -> Result<Vec<Collection>, ZoteroError> {
        self.get_all("collections").await
    }

    async fn top_items(&self) -> Result<Vec<Item>, ZoteroError> {
        self.get_all("items/top").await
    }
}

/// Decode a listing body and unwrap each entry's `data`
fn decode_page<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, ZoteroError> {
    let entries: Vec<Envelope<T>> = serde_json::from_str(body)?;
    Ok(entries.into_iter().map(|e| e.data).collect())
}

fn total_results(headers: &HeaderMap) -> Option<usize> {
    headers
        .get("Total-Results")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

fn is_last_page(fetched: usize, seen: usize, total: Option<usize>) -> bool {
    match total {
        Some(total) => fetched == 0 || seen >= total,
        None => fetched < PAGE_LIMIT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_library() -> Library {
        Library::new(Some("user"), "12345").unwrap()
    }

    #[test]
    fn test_library_validation() {
        assert_eq!(user_library().prefix(), "users/12345");
        assert_eq!(
            Library::new(Some("group"), " 42 ").unwrap().prefix(),
            "groups/42"
        );

        assert!(matches!(
            Library::new(None, "1"),
            Err(ZoteroError::InvalidConfig(_))
        ));
        assert!(Library::new(Some("team"), "1").is_err());
        assert!(Library::new(Some("user"), "").is_err());
        assert!(Library::new(Some("user"), "abc").is_err());
    }

    #[test]
    fn test_api_key_validation() {
        assert!(ZoteroClient::new("", user_library()).is_ok());
        assert!(ZoteroClient::new("P9NiFoyLeZu2bZNvvuQPDWsd", user_library()).is_ok());
        assert!(matches!(
            ZoteroClient::new("not a key!", user_library()),
            Err(ZoteroError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_settings() {
        let settings = PluginSettings {
            root_document_name: "Zotero Library".to_string(),
            leading_char: "^".to_string(),
            api_key: String::new(),
            library_type: Some("group".to_string()),
            library_id: "777".to_string(),
        };
        let client = ZoteroClient::from_settings(&settings).unwrap();
        assert_eq!(client.library().kind, LibraryType::Group);

        let unset = PluginSettings {
            library_type: None,
            ..settings
        };
        assert!(ZoteroClient::from_settings(&unset).is_err());
    }

    #[test]
    fn test_library_url() {
        let client = ZoteroClient::new("", user_library())
            .unwrap()
            .with_base_url("http://localhost:8080/");
        assert_eq!(
            client.library_url("items/top"),
            "http://localhost:8080/users/12345/items/top"
        );
    }

    #[test]
    fn test_decode_page() {
        let body = r#"[
            {"key": "A", "version": 3, "library": {}, "data": {"key": "A", "version": 3, "name": "Root", "parentCollection": false}},
            {"key": "B", "version": 5, "data": {"key": "B", "version": 5, "name": "Child", "parentCollection": "A"}}
        ]"#;
        let collections: Vec<Collection> = decode_page(body).unwrap();
        assert_eq!(collections.len(), 2);
        assert_eq!(collections[1].parent_collection.as_deref(), Some("A"));

        assert!(matches!(
            decode_page::<Collection>("{\"not\": \"a list\"}"),
            Err(ZoteroError::Decode(_))
        ));
    }

    #[test]
    fn test_total_results_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(total_results(&headers), None);
        headers.insert("Total-Results", HeaderValue::from_static("250"));
        assert_eq!(total_results(&headers), Some(250));
    }

    #[test]
    fn test_is_last_page() {
        assert!(!is_last_page(100, 100, Some(250)));
        assert!(is_last_page(50, 250, Some(250)));
        assert!(is_last_page(0, 100, Some(250)));
        assert!(!is_last_page(100, 100, None));
        assert!(is_last_page(3, 103, None));
    }
}
