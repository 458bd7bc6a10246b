//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    app_settings::AppSettings,
    ports::{PlayerRepo, ProfanityPort, SessionRepo, TitleMetadataPort},
    title_metadata::TitleMetadataService,
};
use crate::use_cases::{AggregateSessions, RegistryOps, SessionPropertyOps};

/// Main application state.
///
/// Holds all use cases.
/// Passed to HTTP handlers via Axum state.
pub struct App {
    pub use_cases: UseCases,
    pub title_metadata: Arc<TitleMetadataService>,
}

/// Container for all use cases.
pub struct UseCases {
    pub aggregate: Arc<AggregateSessions>,
    pub session_properties: Arc<SessionPropertyOps>,
    pub registry: Arc<RegistryOps>,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        settings: &AppSettings,
        session_repo: Arc<dyn SessionRepo>,
        player_repo: Arc<dyn PlayerRepo>,
        title_metadata: Arc<TitleMetadataService>,
        profanity: Arc<dyn ProfanityPort>,
    ) -> Self {
        let metadata_port: Arc<dyn TitleMetadataPort> = title_metadata.clone();

        let aggregate = Arc::new(
            AggregateSessions::new(
                session_repo.clone(),
                player_repo.clone(),
                metadata_port,
                profanity,
            )
            .with_report_metadata(settings.report_metadata())
            .with_concurrency(settings.aggregate_concurrency),
        );
        let session_properties = Arc::new(SessionPropertyOps::new(session_repo.clone()));
        let registry = Arc::new(RegistryOps::new(session_repo, player_repo));

        Self {
            use_cases: UseCases {
                aggregate,
                session_properties,
                registry,
            },
            title_metadata,
        }
    }
}
