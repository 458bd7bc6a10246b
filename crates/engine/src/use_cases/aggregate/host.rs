//! Host identity and player-name resolution for one session.
//!
//! Client-reported data is often partial: the host XUID may be missing, the
//! host-name property may be absent or corrupt, and participants may never
//! have registered with the directory. Every path ends in a placeholder so a
//! session always renders.

use std::sync::Arc;

use xsession_domain::{Player, Session, Xuid};

use crate::infrastructure::ports::{PlayerRepo, ProfanityPort};

const HOST_PLACEHOLDER: &str = "Player 1";

/// Display identity of a session's host and its participants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedHost {
    pub gamertag: String,
    pub presence: String,
    /// Host first.
    pub players: Vec<String>,
}

pub struct HostResolver {
    players: Arc<dyn PlayerRepo>,
    profanity: Arc<dyn ProfanityPort>,
}

impl HostResolver {
    pub fn new(players: Arc<dyn PlayerRepo>, profanity: Arc<dyn ProfanityPort>) -> Self {
        Self { players, profanity }
    }

    pub async fn resolve(&self, session: &Session, title_name: &str) -> ResolvedHost {
        let gamertag = self.host_gamertag(session).await;
        let presence = self.host_presence(session, title_name).await;
        let players = self.player_names(session, &gamertag).await;

        ResolvedHost {
            gamertag,
            presence,
            players,
        }
    }

    /// First success wins:
    /// 1. the host-name property, when clean
    /// 2. the participant whose XUID is the session's host XUID
    /// 3. the first participant
    /// 4. `"Player 1"`
    ///
    /// An unregistered participant met in step 2 ends the search with the
    /// placeholder.
    pub async fn host_gamertag(&self, session: &Session) -> String {
        if let Some(name) = session.host_gamer_name() {
            if self.profanity.is_clean(name) {
                return name.to_string();
            }
            tracing::debug!(session_id = %session.id, "Host name property failed the filter");
        }

        for &xuid in &session.players {
            let Some(peer) = self.lookup(xuid).await else {
                return HOST_PLACEHOLDER.to_string();
            };
            if session.host_xuid() == Some(peer.xuid) && self.profanity.is_clean(&peer.gamertag) {
                return peer.gamertag;
            }
        }

        if let Some(&first) = session.players.first() {
            return match self.lookup(first).await {
                Some(peer) if self.profanity.is_clean(&peer.gamertag) => peer.gamertag,
                _ => HOST_PLACEHOLDER.to_string(),
            };
        }

        HOST_PLACEHOLDER.to_string()
    }

    /// The host's rich presence when it is set and clean, else
    /// `"Playing {title_name}"`.
    pub async fn host_presence(&self, session: &Session, title_name: &str) -> String {
        if let Some(host) = session.host_xuid() {
            if let Some(player) = self.lookup(host).await {
                let presence = player.rich_presence;
                if !presence.is_empty() && self.profanity.is_clean(&presence) {
                    return presence;
                }
            }
        }

        format!("Playing {title_name}")
    }

    /// Host first, then the remaining participants in join order.
    ///
    /// Only sessions with more than one participant list anyone besides the
    /// host. Unregistered participants become `"Local Player N"`, registered
    /// ones with unclean names become `"Player N"`. Without a host XUID the
    /// first participant is taken to be the host and skipped.
    pub async fn player_names(&self, session: &Session, host_gamertag: &str) -> Vec<String> {
        let mut names = vec![host_gamertag.to_string()];
        if session.players.len() <= 1 {
            return names;
        }

        let host = session.host_xuid();
        let mut local_placeholders = 0;
        let mut placeholders = 0;

        for (position, &xuid) in session.players.iter().enumerate() {
            let Some(peer) = self.lookup(xuid).await else {
                local_placeholders += 1;
                names.push(format!("Local Player {local_placeholders}"));
                continue;
            };

            let is_host = match host {
                Some(host) => host == peer.xuid,
                None => position == 0,
            };
            if is_host {
                continue;
            }

            if self.profanity.is_clean(&peer.gamertag) {
                names.push(peer.gamertag);
            } else {
                placeholders += 1;
                names.push(format!("Player {placeholders}"));
            }
        }

        names
    }

    /// Directory errors count as "not registered".
    async fn lookup(&self, xuid: Xuid) -> Option<Player> {
        match self.players.find_by_xuid(xuid).await {
            Ok(player) => player,
            Err(e) => {
                tracing::warn!(%xuid, error = %e, "Player directory lookup failed");
                None
            }
        }
    }
}
