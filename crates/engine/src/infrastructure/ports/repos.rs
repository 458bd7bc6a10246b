//! Repository port traits for session and player storage.

use async_trait::async_trait;
use xsession_domain::{Player, Session, SessionId, TitleId, Xuid};

use super::error::RepoError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepo: Send + Sync {
    /// All sessions currently advertised, in storage order.
    async fn find_all_advertised(&self) -> Result<Vec<Session>, RepoError>;
    async fn find(
        &self,
        title_id: TitleId,
        session_id: SessionId,
    ) -> Result<Option<Session>, RepoError>;
    async fn save(&self, session: &Session) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlayerRepo: Send + Sync {
    async fn find_by_xuid(&self, xuid: Xuid) -> Result<Option<Player>, RepoError>;
    async fn save(&self, player: &Player) -> Result<(), RepoError>;
}
