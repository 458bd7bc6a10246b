//! Status-page aggregation.
//!
//! Turns the advertised sessions into a report grouped by title. Titles keep
//! the order they are first seen in and sessions keep input order within a
//! title. Lookups run concurrently but results are merged in input order, so
//! the report does not depend on which lookup finishes first.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use xsession_domain::{ReportMetadata, Session, SessionReport, SessionSummary, TitleGroup, TitleId};

use crate::infrastructure::ports::{
    PlayerRepo, ProfanityPort, RepoError, SessionRepo, TitleMetadata, TitleMetadataPort,
};

mod host;

pub use host::{HostResolver, ResolvedHost};

#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

pub struct AggregateSessions {
    sessions: Arc<dyn SessionRepo>,
    metadata: Arc<dyn TitleMetadataPort>,
    profanity: Arc<dyn ProfanityPort>,
    hosts: HostResolver,
    report_metadata: ReportMetadata,
    concurrency: usize,
}

impl AggregateSessions {
    pub fn new(
        sessions: Arc<dyn SessionRepo>,
        players: Arc<dyn PlayerRepo>,
        metadata: Arc<dyn TitleMetadataPort>,
        profanity: Arc<dyn ProfanityPort>,
    ) -> Self {
        Self {
            sessions,
            metadata,
            hosts: HostResolver::new(players, profanity.clone()),
            profanity,
            report_metadata: ReportMetadata::default(),
            concurrency: 1,
        }
    }

    /// Deployment details attached to every report.
    pub fn with_report_metadata(mut self, metadata: ReportMetadata) -> Self {
        self.report_metadata = metadata;
        self
    }

    /// Number of titles or sessions resolved at once.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Aggregate the current snapshot of advertised sessions.
    ///
    /// Only reading the snapshot can fail; everything after degrades to
    /// placeholders.
    pub async fn execute(&self) -> Result<SessionReport, AggregateError> {
        let sessions = self.sessions.find_all_advertised().await?;
        Ok(self.aggregate(&sessions).await)
    }

    pub async fn aggregate(&self, sessions: &[Session]) -> SessionReport {
        let mut seen = HashSet::new();
        let title_ids: Vec<TitleId> = sessions
            .iter()
            .map(|s| s.title_id)
            .filter(|id| seen.insert(*id))
            .collect();

        let title_lookups: Vec<_> = title_ids
            .into_iter()
            .map(|title_id| async move { (title_id, self.metadata.title_metadata(title_id).await) })
            .collect();
        let titles: HashMap<TitleId, TitleMetadata> = stream::iter(title_lookups)
            .buffered(self.concurrency)
            .collect()
            .await;

        let host_lookups: Vec<_> = sessions
            .iter()
            .map(|session| {
                let title_name = titles
                    .get(&session.title_id)
                    .map(|t| t.name.as_str())
                    .unwrap_or_default();
                self.hosts.resolve(session, title_name)
            })
            .collect();
        let hosts: Vec<ResolvedHost> = stream::iter(host_lookups)
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut report = SessionReport::new().with_metadata(self.report_metadata.clone());
        let no_details = TitleMetadata::default();

        for (session, host) in sessions.iter().zip(hosts) {
            let details = titles.get(&session.title_id).unwrap_or(&no_details);

            report.push_session(
                session.title_id,
                || {
                    TitleGroup::new(
                        session.title_id,
                        self.display_name(details, session),
                        details.icon.clone(),
                        details.info.clone(),
                    )
                },
                SessionSummary {
                    media_id: session.media_id.clone(),
                    version: session.version,
                    players: host.players,
                    total: session.total_slots(),
                    host_presence: host.presence,
                    host_gamertag: host.gamertag,
                    host_xuid: session.host_xuid(),
                },
            );
        }

        tracing::debug!(
            titles = report.titles.len(),
            sessions = report.session_count(),
            "Session report built"
        );
        for title in report.titles.iter().filter(|t| !t.name.is_empty()) {
            tracing::debug!(title_id = %title.title_id, name = %title.name, "Recent title");
        }

        report
    }

    /// Catalog name, else the session's own title when it is clean.
    fn display_name(&self, details: &TitleMetadata, session: &Session) -> String {
        if !details.name.is_empty() {
            return details.name.clone();
        }
        session
            .title
            .as_deref()
            .filter(|title| !title.is_empty() && self.profanity.is_clean(title))
            .unwrap_or_default()
            .to_string()
    }
}
