//! In-memory session and player storage.
//!
//! Nothing is persisted. Sessions keep the order they were first saved in,
//! which is the order the report lists them.

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::RwLock;
use xsession_domain::{Player, Session, SessionId, TitleId, Xuid};

use crate::infrastructure::ports::{PlayerRepo, RepoError, SessionRepo};

#[derive(Default)]
pub struct InMemorySessionRepo {
    sessions: RwLock<Vec<Session>>,
}

impl InMemorySessionRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepo for InMemorySessionRepo {
    async fn find_all_advertised(&self) -> Result<Vec<Session>, RepoError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.iter().filter(|s| !s.deleted).cloned().collect())
    }

    async fn find(
        &self,
        title_id: TitleId,
        session_id: SessionId,
    ) -> Result<Option<Session>, RepoError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .iter()
            .find(|s| s.title_id == title_id && s.id == session_id)
            .cloned())
    }

    async fn save(&self, session: &Session) -> Result<(), RepoError> {
        let mut sessions = self.sessions.write().await;
        match sessions
            .iter_mut()
            .find(|s| s.title_id == session.title_id && s.id == session.id)
        {
            Some(existing) => *existing = session.clone(),
            None => sessions.push(session.clone()),
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryPlayerRepo {
    players: DashMap<Xuid, Player>,
}

impl InMemoryPlayerRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlayerRepo for InMemoryPlayerRepo {
    async fn find_by_xuid(&self, xuid: Xuid) -> Result<Option<Player>, RepoError> {
        Ok(self.players.get(&xuid).map(|p| p.value().clone()))
    }

    async fn save(&self, player: &Player) -> Result<(), RepoError> {
        self.players.insert(player.xuid, player.clone());
        Ok(())
    }
}
