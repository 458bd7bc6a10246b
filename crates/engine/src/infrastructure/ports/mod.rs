//! Port traits for infrastructure boundaries.
//!
//! Ports exist for:
//! - Session and player storage (in-memory today, document store later)
//! - Title metadata (marketplace catalogs, image hosts)
//! - Profanity filtering

mod error;
mod external;
mod repos;
pub mod types;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::{PlayerRepo, SessionRepo};

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{
    BackendSource, ProfanityPort, TitleCatalogSource, TitleIconSource, TitleInfoSource,
    TitleMetadataPort,
};

pub use types::{CatalogImage, TitleCatalog, TitleMetadata};

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use repos::{MockPlayerRepo, MockSessionRepo};

#[cfg(test)]
pub use external::{MockProfanityPort, MockTitleMetadataPort};

// =============================================================================
// Error Types
// =============================================================================
pub use error::{BackendError, RepoError};
