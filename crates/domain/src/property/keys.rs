//! Well-known attribute keys.
//!
//! Keys with bit `0x8000` set are system attributes defined by the platform;
//! everything else is title-defined and reported as "User-Defined".

// Properties
pub const PLAYER_PARTIAL_PLAY_PERCENTAGE: u32 = 0x1000_800C;
pub const PLAYER_SKILL_UPDATE_WEIGHTING_FACTOR: u32 = 0x1000_800D;
pub const SESSION_SKILL_BETA: u32 = 0x3000_800E;
pub const SESSION_SKILL_TAU: u32 = 0x3000_800F;
pub const SESSION_SKILL_DRAW_PROBABILITY: u32 = 0x1000_8010;
pub const RELATIVE_SCORE: u32 = 0x1000_800A;
pub const SESSION_TEAM: u32 = 0x1000_800B;
pub const RANK: u32 = 0x1000_8001;
pub const GAMER_NAME: u32 = 0x4000_8002;
pub const SESSION_ID: u32 = 0x2000_8003;
pub const GAMER_ZONE: u32 = 0x1000_8101;
pub const GAMER_COUNTRY: u32 = 0x1000_8102;
pub const GAMER_LANGUAGE: u32 = 0x1000_8103;
pub const GAMER_RATING: u32 = 0x5000_8104;
pub const GAMER_MU: u32 = 0x3000_8105;
pub const GAMER_SIGMA: u32 = 0x3000_8106;
pub const GAMER_PUID: u32 = 0x2000_8107;
pub const AFFILIATE_VALUE: u32 = 0x2000_8108;
/// The host's gamer name, advertised by clients that support properties.
pub const GAMER_HOSTNAME: u32 = 0x4000_8109;
pub const PLATFORM_TYPE: u32 = 0x1000_8201;
pub const PLATFORM_LOCK: u32 = 0x1000_8202;

// Contexts
pub const CONTEXT_PRESENCE: u32 = 0x0000_8001;
pub const CONTEXT_GAME_TYPE: u32 = 0x0000_800A;
pub const CONTEXT_GAME_MODE: u32 = 0x0000_800B;
pub const CONTEXT_SESSION_JOINABLE: u32 = 0x0000_800C;

/// Human-readable label for an attribute key.
pub fn friendly_name(key: u32) -> &'static str {
    match key {
        PLAYER_PARTIAL_PLAY_PERCENTAGE => "Player Partial Play Percentage",
        PLAYER_SKILL_UPDATE_WEIGHTING_FACTOR => "Player Skill Update Weighting Factor",
        SESSION_SKILL_BETA => "Session Skill Beta",
        SESSION_SKILL_TAU => "Session Skill Tau",
        SESSION_SKILL_DRAW_PROBABILITY => "Session Skill Draw Probability",
        RELATIVE_SCORE => "Relative Score",
        SESSION_TEAM => "Session Team",
        RANK => "Rank",
        GAMER_NAME => "Gamer Name",
        SESSION_ID => "Session ID",
        GAMER_ZONE => "Gamer Zone",
        GAMER_COUNTRY => "Gamer Country",
        GAMER_LANGUAGE => "Gamer Language",
        GAMER_RATING => "Gamer Rating",
        GAMER_MU => "Gamer Mu",
        GAMER_SIGMA => "Gamer Sigma",
        GAMER_PUID => "Gamer PUID",
        AFFILIATE_VALUE => "Affiliate Value",
        GAMER_HOSTNAME => "Gamer Hostname",
        PLATFORM_TYPE => "Platform Type",
        PLATFORM_LOCK => "Platform Lock",
        CONTEXT_PRESENCE => "Presence",
        CONTEXT_GAME_TYPE => "Game Type",
        CONTEXT_GAME_MODE => "Game Mode",
        CONTEXT_SESSION_JOINABLE => "Session Joinable",
        _ => "User-Defined",
    }
}
