//! Session and player registration.

use std::sync::Arc;

use xsession_domain::{DomainError, Player, Session, Xuid};

use crate::infrastructure::ports::{PlayerRepo, RepoError, SessionRepo};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Invalid(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

/// Rich presence reported by a console for one signed-in player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceUpdate {
    pub xuid: Xuid,
    pub rich_presence: String,
}

pub struct RegistryOps {
    sessions: Arc<dyn SessionRepo>,
    players: Arc<dyn PlayerRepo>,
}

impl RegistryOps {
    pub fn new(sessions: Arc<dyn SessionRepo>, players: Arc<dyn PlayerRepo>) -> Self {
        Self { sessions, players }
    }

    /// Insert or replace a session keyed by title and session id.
    pub async fn upsert_session(&self, session: Session) -> Result<Session, RegistryError> {
        self.sessions.save(&session).await?;
        tracing::debug!(
            title_id = %session.title_id,
            session_id = %session.id,
            players = session.players.len(),
            "Session saved"
        );
        Ok(session)
    }

    /// Insert or replace a player keyed by XUID.
    pub async fn upsert_player(&self, player: Player) -> Result<Player, RegistryError> {
        if player.gamertag.trim().is_empty() {
            return Err(DomainError::validation("gamertag must not be empty").into());
        }
        self.players.save(&player).await?;
        Ok(player)
    }

    /// Store the reported rich presence of registered players.
    ///
    /// Updates for XUIDs the directory does not know are skipped. Returns the
    /// players that changed.
    pub async fn update_presences(
        &self,
        updates: Vec<PresenceUpdate>,
    ) -> Result<Vec<Player>, RegistryError> {
        let mut updated = Vec::with_capacity(updates.len());
        for update in updates {
            let Some(player) = self.players.find_by_xuid(update.xuid).await? else {
                tracing::debug!(xuid = %update.xuid, "Presence for unregistered player ignored");
                continue;
            };
            let player = player.with_rich_presence(update.rich_presence);
            self.players.save(&player).await?;
            updated.push(player);
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockPlayerRepo, MockSessionRepo};
    use xsession_domain::{SessionId, TitleId, Xuid};

    #[tokio::test]
    async fn saves_sessions() {
        let mut sessions = MockSessionRepo::new();
        sessions
            .expect_save()
            .withf(|s| s.id == SessionId::new(7))
            .times(1)
            .returning(|_| Ok(()));
        let ops = RegistryOps::new(Arc::new(sessions), Arc::new(MockPlayerRepo::new()));

        let saved = ops
            .upsert_session(Session::new(SessionId::new(7), TitleId::new(1)))
            .await
            .unwrap();
        assert_eq!(saved.title_id, TitleId::new(1));
    }

    #[tokio::test]
    async fn rejects_blank_gamertags() {
        let mut players = MockPlayerRepo::new();
        players.expect_save().never();
        let ops = RegistryOps::new(Arc::new(MockSessionRepo::new()), Arc::new(players));

        let result = ops.upsert_player(Player::new(Xuid::new(1), "  ")).await;
        assert!(matches!(result, Err(RegistryError::Invalid(_))));
    }

    #[tokio::test]
    async fn presence_updates_registered_players_only() {
        let chief = Xuid::new(1);
        let stranger = Xuid::new(2);

        let mut players = MockPlayerRepo::new();
        players
            .expect_find_by_xuid()
            .returning(move |xuid| Ok((xuid == chief).then(|| Player::new(chief, "Chief"))));
        players
            .expect_save()
            .withf(move |p| p.xuid == chief && p.rich_presence == "Slayer on Guardian")
            .times(1)
            .returning(|_| Ok(()));
        let ops = RegistryOps::new(Arc::new(MockSessionRepo::new()), Arc::new(players));

        let updated = ops
            .update_presences(vec![
                PresenceUpdate {
                    xuid: stranger,
                    rich_presence: "Menus".to_string(),
                },
                PresenceUpdate {
                    xuid: chief,
                    rich_presence: "Slayer on Guardian".to_string(),
                },
            ])
            .await
            .unwrap();

        assert_eq!(
            updated,
            vec![Player::new(chief, "Chief").with_rich_presence("Slayer on Guardian")]
        );
    }

    #[tokio::test]
    async fn surfaces_storage_errors() {
        let mut players = MockPlayerRepo::new();
        players
            .expect_save()
            .returning(|_| Err(RepoError::database("save_player", "disk full")));
        let ops = RegistryOps::new(Arc::new(MockSessionRepo::new()), Arc::new(players));

        let result = ops.upsert_player(Player::new(Xuid::new(1), "Chief")).await;
        assert!(matches!(result, Err(RegistryError::Repo(_))));
    }
}
