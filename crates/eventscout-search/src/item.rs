use serde::{Deserialize, Serialize};

/// One search result. Providers may return a bare URL or an enriched
/// record; downstream stages accept either (spec §4.5).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SearchItem {
    Url(String),
    Record {
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        markdown: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        extracted: Option<serde_json::Value>,
    },
}

impl SearchItem {
    pub fn url(&self) -> &str {
        match self {
            SearchItem::Url(u) => u,
            SearchItem::Record { url, .. } => url,
        }
    }
}

/// Result of a unified search: the chosen provider's items plus the list
/// of providers that were attempted (for failure diagnostics).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SearchResponse {
    pub items: Vec<SearchItem>,
    pub providers: Vec<String>,
}
