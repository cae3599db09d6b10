//! Save storage
//!
//! Saves are a versioned JSON envelope written through a [`SaveStore`].
//! The browser build stores them in LocalStorage; native builds and tests
//! use [`MemoryStore`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;

/// Current save format version
pub const SAVE_VERSION: u32 = 1;

/// LocalStorage key for the progress book
pub const PROGRESS_KEY: &str = "castle_catapult_progress";

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    version: u32,
    data: T,
}

/// Wrap `value` in the current envelope
pub fn encode<T: Serialize>(value: &T) -> Result<String, PersistenceError> {
    let envelope = Envelope {
        version: SAVE_VERSION,
        data: value,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Unwrap an envelope, rejecting unknown versions
pub fn decode<T: DeserializeOwned>(json: &str) -> Result<T, PersistenceError> {
    #[derive(Deserialize)]
    struct Header {
        version: u32,
    }
    let header: Header = serde_json::from_str(json)?;
    if header.version != SAVE_VERSION {
        return Err(PersistenceError::UnsupportedVersion {
            found: header.version,
            expected: SAVE_VERSION,
        });
    }
    let envelope: Envelope<T> = serde_json::from_str(json)?;
    Ok(envelope.data)
}

/// Durable key-less blob storage for one save slot
pub trait SaveStore {
    /// `Ok(None)` when nothing was saved yet
    fn load(&self) -> Result<Option<String>, PersistenceError>;
    fn save(&mut self, data: &str) -> Result<(), PersistenceError>;
}

/// In-memory store (native builds, tests)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Option<String>,
    reject_writes: bool,
    writes: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: impl Into<String>) -> Self {
        Self {
            data: Some(data.into()),
            ..Self::default()
        }
    }

    /// A store whose writes always fail
    pub fn read_only() -> Self {
        Self {
            reject_writes: true,
            ..Self::default()
        }
    }

    pub fn contents(&self) -> Option<&str> {
        self.data.as_deref()
    }

    /// Successful writes so far
    pub fn writes(&self) -> u32 {
        self.writes
    }
}

impl SaveStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, PersistenceError> {
        Ok(self.data.clone())
    }

    fn save(&mut self, data: &str) -> Result<(), PersistenceError> {
        if self.reject_writes {
            return Err(PersistenceError::Write("store is read-only".into()));
        }
        self.data = Some(data.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// Browser LocalStorage slot
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    key: String,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage() -> Result<web_sys::Storage, PersistenceError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(PersistenceError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl SaveStore for LocalStorageStore {
    fn load(&self) -> Result<Option<String>, PersistenceError> {
        let storage = Self::storage()?;
        storage
            .get_item(&self.key)
            .map_err(|_| PersistenceError::Unavailable)
    }

    fn save(&mut self, data: &str) -> Result<(), PersistenceError> {
        let storage = Self::storage()?;
        storage
            .set_item(&self.key, data)
            .map_err(|e| PersistenceError::Write(format!("{e:?}")))?;
        log::info!("saved {} bytes to '{}'", data.len(), self.key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        level: u32,
        best: f32,
    }

    #[test]
    fn test_envelope_roundtrip() {
        let sample = Sample { level: 3, best: 75.0 };
        let json = encode(&sample).unwrap();
        assert!(json.contains("\"version\":1"));
        assert_eq!(decode::<Sample>(&json).unwrap(), sample);
    }

    #[test]
    fn test_rejects_future_version() {
        let json = r#"{"version":99,"data":{"level":1,"best":1.0}}"#;
        assert!(matches!(
            decode::<Sample>(json),
            Err(PersistenceError::UnsupportedVersion { found: 99, .. })
        ));
        assert!(matches!(
            decode::<Sample>("not json"),
            Err(PersistenceError::Serde(_))
        ));
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load().unwrap(), None);
        store.save("abc").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("abc"));
        assert_eq!(store.writes(), 1);

        let mut locked = MemoryStore::read_only();
        assert!(matches!(locked.save("x"), Err(PersistenceError::Write(_))));
        assert_eq!(locked.contents(), None);
    }
}
