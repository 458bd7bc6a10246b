//! Aggregated status-page report.
//!
//! Field names are part of the public JSON contract consumed by the status
//! page and must not change.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ids::{TitleId, Xuid};

/// Per-session entry in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    #[serde(rename = "mediaId")]
    pub media_id: String,
    pub version: u32,
    /// Display names, host first.
    pub players: Vec<String>,
    pub total: u32,
    pub host_presence: String,
    pub host_gamertag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_xuid: Option<Xuid>,
}

/// One title and its live sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleGroup {
    pub title_id: TitleId,
    pub name: String,
    /// `data:` URI of the tile image, empty when unavailable.
    pub icon: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<serde_json::Value>,
    pub sessions: Vec<SessionSummary>,
}

impl TitleGroup {
    pub fn new(
        title_id: TitleId,
        name: impl Into<String>,
        icon: impl Into<String>,
        info: Option<serde_json::Value>,
    ) -> Self {
        Self {
            title_id,
            name: name.into(),
            icon: icon.into(),
            info,
            sessions: Vec::new(),
        }
    }
}

/// Deployment details shown in the status page footer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    #[serde(rename = "HEROKU_RELEASE_CREATED_AT", skip_serializing_if = "Option::is_none")]
    pub release_created_at: Option<String>,
    #[serde(rename = "HEROKU_BUILD_COMMIT", skip_serializing_if = "Option::is_none")]
    pub build_commit: Option<String>,
    #[serde(rename = "START_TIME", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
}

impl ReportMetadata {
    pub fn is_empty(&self) -> bool {
        [&self.release_created_at, &self.build_commit, &self.start_time]
            .into_iter()
            .all(|v| v.as_deref().map_or(true, str::is_empty))
    }
}

/// Titles in first-seen order, each with its sessions in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionReport {
    #[serde(rename = "Titles")]
    pub titles: Vec<TitleGroup>,
    #[serde(rename = "Metadata", skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ReportMetadata>,
    #[serde(skip)]
    index: HashMap<TitleId, usize>,
}

impl SessionReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach metadata unless every field is empty.
    pub fn with_metadata(mut self, metadata: ReportMetadata) -> Self {
        self.metadata = (!metadata.is_empty()).then_some(metadata);
        self
    }

    pub fn title(&self, title_id: TitleId) -> Option<&TitleGroup> {
        self.index.get(&title_id).map(|&i| &self.titles[i])
    }

    /// Append a session under its title, creating the group on first sight.
    ///
    /// `new_group` only runs when the title has not been seen yet, so the
    /// group's name, icon and info come from the first session of that title.
    pub fn push_session(
        &mut self,
        title_id: TitleId,
        new_group: impl FnOnce() -> TitleGroup,
        summary: SessionSummary,
    ) {
        let index = match self.index.get(&title_id) {
            Some(&i) => i,
            None => {
                self.titles.push(new_group());
                let i = self.titles.len() - 1;
                self.index.insert(title_id, i);
                i
            }
        };
        self.titles[index].sessions.push(summary);
    }

    pub fn session_count(&self) -> usize {
        self.titles.iter().map(|t| t.sessions.len()).sum()
    }
}
