use crate::item::SearchItem;
use crate::query::SearchRequest;
use async_trait::async_trait;
use eventscout_core::StageError;

/// One search backend (Firecrawl, Google CSE, or the static database).
#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn search(&self, req: &SearchRequest) -> Result<Vec<SearchItem>, StageError>;
}

/// A small static list filtered by keyword, used as the database provider
/// (spec §4.5: "a small static URL list is filtered by keyword").
pub struct DatabaseProvider {
    entries: Vec<(String, Vec<String>)>,
}

impl DatabaseProvider {
    pub fn new(entries: Vec<(String, Vec<String>)>) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl SearchProvider for DatabaseProvider {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn search(&self, req: &SearchRequest) -> Result<Vec<SearchItem>, StageError> {
        let needle = req.query.to_lowercase();
        let matches: Vec<SearchItem> = self
            .entries
            .iter()
            .filter(|(_, keywords)| keywords.iter().any(|k| needle.contains(&k.to_lowercase())))
            .take(req.limit.max(1))
            .map(|(url, _)| SearchItem::Url(url.clone()))
            .collect();
        Ok(matches)
    }
}
