use anyhow::Result;
use async_trait::async_trait;

use super::models::PlayRecord;

/// Trait that every play-by-play season source must implement.
#[async_trait]
pub trait SeasonSource: Send + Sync {
    /// Return every play of the given season, in file order.
    async fn load_season(&self, season: u16) -> Result<Vec<PlayRecord>>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}
