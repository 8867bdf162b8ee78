//! Narrow collaborator interfaces the orchestrator needs beyond the ones
//! already defined by the component crates it wires together.

use async_trait::async_trait;
use eventscout_core::{StageError, UserProfile};

/// Loads the industry/ICP/competitor terms used to steer query-building and
/// prioritisation (spec §3's `UserProfile`). A thin seam so callers can back
/// it with a database, a config file, or (in tests/demos) a fixed value.
#[async_trait]
pub trait UserProfileStore: Send + Sync {
    async fn load(&self) -> Result<UserProfile, StageError>;
}

/// A `UserProfileStore` that always returns the same profile, handed to it
/// at construction time.
pub struct StaticUserProfileStore {
    profile: UserProfile,
}

impl StaticUserProfileStore {
    pub fn new(profile: UserProfile) -> Self {
        Self { profile }
    }
}

#[async_trait]
impl UserProfileStore for StaticUserProfileStore {
    async fn load(&self) -> Result<UserProfile, StageError> {
        Ok(self.profile.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_store_returns_fixed_profile() {
        let profile = UserProfile { industry_terms: vec!["fintech".to_string()], ..Default::default() };
        let store = StaticUserProfileStore::new(profile.clone());
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.industry_terms, profile.industry_terms);
    }
}
