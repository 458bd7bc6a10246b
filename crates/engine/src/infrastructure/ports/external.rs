//! External service port traits (title metadata, profanity filtering).

use std::time::Duration;

use async_trait::async_trait;
use xsession_domain::TitleId;

use super::error::BackendError;
use super::types::{TitleCatalog, TitleMetadata};

// =============================================================================
// Title Metadata
// =============================================================================

/// Best-effort title metadata. Implementations never surface backend errors;
/// an unknown title yields empty values.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TitleMetadataPort: Send + Sync {
    async fn title_name(&self, title_id: TitleId) -> String;
    /// `data:` URI of the tile image, or empty.
    async fn title_icon(&self, title_id: TitleId) -> String;
    async fn title_info(&self, title_id: TitleId) -> Option<serde_json::Value>;
    /// All three at once, looking the catalog up a single time.
    async fn title_metadata(&self, title_id: TitleId) -> TitleMetadata;
}

/// Common shape of every metadata backend: a name for logs and its own time
/// budget.
pub trait BackendSource: Send + Sync {
    fn name(&self) -> &str;
    fn timeout(&self) -> Duration;
}

/// A source of marketplace catalog entries.
#[async_trait]
pub trait TitleCatalogSource: BackendSource {
    async fn fetch_catalog(&self, title_id: TitleId) -> Result<TitleCatalog, BackendError>;
}

/// A source of tile images. `tile_url` is the catalog's tile when one was found.
#[async_trait]
pub trait TitleIconSource: BackendSource {
    async fn fetch_icon(
        &self,
        title_id: TitleId,
        tile_url: Option<String>,
    ) -> Result<Vec<u8>, BackendError>;
}

/// A source of structured title records.
#[async_trait]
pub trait TitleInfoSource: BackendSource {
    async fn fetch_info(&self, title_id: TitleId) -> Result<serde_json::Value, BackendError>;
}

// =============================================================================
// Profanity
// =============================================================================

#[cfg_attr(test, mockall::automock)]
pub trait ProfanityPort: Send + Sync {
    /// `true` when the text contains nothing offensive.
    fn is_clean(&self, text: &str) -> bool;
}
