//! Process settings read from the environment.
//!
//! `.env.local` and `.env` are loaded by the binary before these are read, so
//! every value can live in either place.

use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use xsession_domain::ReportMetadata;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_AGGREGATE_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSettings {
    pub server_host: String,
    pub server_port: u16,
    /// Sessions resolved in parallel during one report run.
    pub aggregate_concurrency: usize,
    /// Extra profanity terms, one per line.
    pub profanity_wordlist: Option<PathBuf>,
    /// `*` or a comma separated origin list; `None` disables CORS.
    pub cors_allowed_origins: Option<String>,
    pub release_created_at: Option<String>,
    pub build_commit: Option<String>,
    pub start_time: String,
}

impl AppSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let server_port = get("SERVER_PORT")
            .or_else(|| get("PORT"))
            .and_then(|port| match port.parse() {
                Ok(port) => Some(port),
                Err(e) => {
                    tracing::warn!(value = %port, error = %e, "Invalid port, using default");
                    None
                }
            })
            .unwrap_or(DEFAULT_PORT);

        let aggregate_concurrency = get("AGGREGATE_CONCURRENCY")
            .and_then(|value| value.parse::<usize>().ok())
            .unwrap_or(DEFAULT_AGGREGATE_CONCURRENCY)
            .max(1);

        Self {
            server_host: get("SERVER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            server_port,
            aggregate_concurrency,
            profanity_wordlist: get("PROFANITY_WORDLIST").map(PathBuf::from),
            cors_allowed_origins: get("CORS_ALLOWED_ORIGINS"),
            release_created_at: get("HEROKU_RELEASE_CREATED_AT"),
            build_commit: get("HEROKU_BUILD_COMMIT"),
            start_time: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Deployment details appended to every session report.
    pub fn report_metadata(&self) -> ReportMetadata {
        ReportMetadata {
            release_created_at: self.release_created_at.clone(),
            build_commit: self.build_commit.clone(),
            start_time: Some(self.start_time.clone()),
        }
    }
}
