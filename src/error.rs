//! Error types for the fallible edges of the game core.
//!
//! The simulation itself never fails: misuse (double destroy, stale body
//! handles, damage after destruction) is absorbed as a no-op. Only config
//! loading, persistence and leaderboard traffic return these.

/// Tuning file could not be used
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("tuning value '{name}' = {value} is outside {range}")]
    OutOfRange {
        name: &'static str,
        value: f32,
        range: &'static str,
    },
}

/// Save storage failure. Local state stays authoritative for the session.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("storage unavailable")]
    Unavailable,

    #[error("storage write failed: {0}")]
    Write(String),

    #[error("save format version {found} is not supported (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("save data could not be (de)serialized: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Leaderboard submission rejected or response unusable
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LeaderboardError {
    #[error("invalid nickname: {reason}")]
    InvalidNickname { reason: &'static str },

    #[error("score {0} is out of range")]
    ScoreOutOfRange(f32),

    #[error("levels completed {0} is out of range")]
    LevelsOutOfRange(u32),

    #[error("no leaderboard entry for this device")]
    UnknownDevice,

    #[error("could not encode leaderboard request: {0}")]
    Encode(String),

    #[error("malformed leaderboard response: {0}")]
    MalformedResponse(String),

    #[error("leaderboard request failed: {0}")]
    Rejected(String),

    #[error("leaderboard unreachable: {0}")]
    Network(String),

    #[error("bad leaderboard request: {0}")]
    BadRequest(String),
}
