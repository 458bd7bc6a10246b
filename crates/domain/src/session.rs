//! Advertised sessions and the players that appear in them.

use serde::{Deserialize, Serialize};

use crate::ids::{SessionId, TitleId, Xuid};
use crate::property::{keys, Property};

/// A context value set by the host (game mode, game type, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub context_id: u32,
    pub value: u32,
}

/// One live multiplayer session as stored by the session service.
///
/// Participants keep the order in which they joined; host resolution depends on
/// that order when no host XUID is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub title_id: TitleId,
    /// Host XUID as designated by the session itself.
    #[serde(default)]
    pub xuid: Option<Xuid>,
    /// Title string reported by the client, unverified.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub media_id: String,
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub public_slots_count: u32,
    #[serde(default)]
    pub private_slots_count: u32,
    /// Distinct participants in join order.
    #[serde(default, deserialize_with = "distinct_players")]
    pub players: Vec<Xuid>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub contexts: Vec<SessionContext>,
    #[serde(default)]
    pub properties: Vec<Property>,
}

impl Session {
    pub fn new(id: SessionId, title_id: TitleId) -> Self {
        Self {
            id,
            title_id,
            xuid: None,
            title: None,
            media_id: String::new(),
            version: 0,
            public_slots_count: 0,
            private_slots_count: 0,
            players: Vec::new(),
            deleted: false,
            contexts: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn host_xuid(&self) -> Option<Xuid> {
        self.xuid
    }

    pub fn total_slots(&self) -> u32 {
        self.public_slots_count
            .saturating_add(self.private_slots_count)
    }

    pub fn property(&self, attribute_key: u32) -> Option<&Property> {
        self.properties
            .iter()
            .find(|p| p.attribute_key() == attribute_key)
    }

    /// Host name advertised through the gamer-hostname property, if non-empty.
    pub fn host_gamer_name(&self) -> Option<&str> {
        self.property(keys::GAMER_HOSTNAME)
            .and_then(Property::as_utf16_string)
            .filter(|name| !name.is_empty())
    }

    /// Replace the participants, dropping repeats of an XUID already listed.
    pub fn set_players(&mut self, players: impl IntoIterator<Item = Xuid>) {
        self.players.clear();
        for xuid in players {
            if !self.players.contains(&xuid) {
                self.players.push(xuid);
            }
        }
    }

    /// Insert or replace properties, keyed by attribute key.
    pub fn add_properties(&mut self, properties: impl IntoIterator<Item = Property>) {
        for property in properties {
            match self
                .properties
                .iter_mut()
                .find(|p| p.attribute_key() == property.attribute_key())
            {
                Some(existing) => *existing = property,
                None => self.properties.push(property),
            }
        }
    }

    /// Insert or replace contexts, keyed by context id.
    pub fn set_contexts(&mut self, contexts: impl IntoIterator<Item = SessionContext>) {
        for context in contexts {
            match self
                .contexts
                .iter_mut()
                .find(|c| c.context_id == context.context_id)
            {
                Some(existing) => existing.value = context.value,
                None => self.contexts.push(context),
            }
        }
    }

    /// Contexts as canonical context records.
    pub fn context_properties(&self) -> Vec<Property> {
        self.contexts
            .iter()
            .map(|c| Property::context(c.context_id, c.value))
            .collect()
    }
}

fn distinct_players<'de, D>(deserializer: D) -> Result<Vec<Xuid>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let mut players = Vec::new();
    for xuid in Vec::<Xuid>::deserialize(deserializer)? {
        if !players.contains(&xuid) {
            players.push(xuid);
        }
    }
    Ok(players)
}

/// Directory entry for a signed-in player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub xuid: Xuid,
    pub gamertag: String,
    #[serde(default)]
    pub rich_presence: String,
}

impl Player {
    pub fn new(xuid: Xuid, gamertag: impl Into<String>) -> Self {
        Self {
            xuid,
            gamertag: gamertag.into(),
            rich_presence: String::new(),
        }
    }

    pub fn with_rich_presence(mut self, presence: impl Into<String>) -> Self {
        self.rich_presence = presence.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::prelude::{Engine as _, BASE64_STANDARD};

    fn hostname_property(name: &str) -> Property {
        let mut bytes = vec![0u8; 20];
        bytes[0..4].copy_from_slice(&keys::GAMER_HOSTNAME.to_le_bytes());
        bytes[4] = 4;
        bytes.extend(name.encode_utf16().flat_map(u16::to_be_bytes));
        Property::decode(&BASE64_STANDARD.encode(bytes)).unwrap()
    }

    fn session() -> Session {
        Session::new(SessionId::new(0xAB), TitleId::new(0x4D5307E6))
    }

    #[test]
    fn total_slots_adds_public_and_private() {
        let mut s = session();
        s.public_slots_count = 6;
        s.private_slots_count = 2;
        assert_eq!(s.total_slots(), 8);
    }

    #[test]
    fn host_gamer_name_reads_the_hostname_property() {
        let mut s = session();
        assert_eq!(s.host_gamer_name(), None);

        s.add_properties([hostname_property("")]);
        assert_eq!(s.host_gamer_name(), None);

        s.add_properties([hostname_property("Master Chief")]);
        assert_eq!(s.properties.len(), 1, "same key replaces");
        assert_eq!(s.host_gamer_name(), Some("Master Chief"));
    }

    #[test]
    fn contexts_upsert_and_encode() {
        let mut s = session();
        s.set_contexts([
            SessionContext { context_id: keys::CONTEXT_GAME_MODE, value: 1 },
            SessionContext { context_id: keys::CONTEXT_GAME_TYPE, value: 2 },
        ]);
        s.set_contexts([SessionContext { context_id: keys::CONTEXT_GAME_MODE, value: 9 }]);

        assert_eq!(s.contexts.len(), 2);
        let encoded: Vec<String> = s
            .context_properties()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(encoded[0], Property::encode_context(keys::CONTEXT_GAME_MODE, 9));
        assert_eq!(encoded[1], Property::encode_context(keys::CONTEXT_GAME_TYPE, 2));
    }

    #[test]
    fn set_players_keeps_first_seen_order_without_repeats() {
        let (a, b) = (Xuid::new(1), Xuid::new(2));
        let mut s = session();
        s.set_players([b, a, b, a]);
        assert_eq!(s.players, vec![b, a]);

        s.set_players([a, a]);
        assert_eq!(s.players, vec![a]);
    }

    #[test]
    fn deserialized_players_are_distinct() {
        let json = r#"{"id":"AB","titleId":"4D5307E6","players":["02","01","02"]}"#;
        let s: Session = serde_json::from_str(json).unwrap();
        assert_eq!(s.players, vec![Xuid::new(2), Xuid::new(1)]);
    }

    #[test]
    fn deserializes_with_defaults() {
        let json = r#"{"id":"00000000000000AB","titleId":"4D5307E6","players":["0009000000000001"]}"#;
        let s: Session = serde_json::from_str(json).unwrap();
        assert_eq!(s.players, vec![Xuid::new(0x0009_0000_0000_0001)]);
        assert_eq!(s.host_xuid(), None);
        assert!(s.properties.is_empty());
    }
}
