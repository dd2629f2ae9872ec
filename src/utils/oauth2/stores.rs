use std::collections::HashMap;
use std::sync::Mutex;
use log::{debug, warn};
use crate::errors::AdapterError::ConfigError;
use crate::errors::AdapterResult;
use crate::utils::oauth2::StoredCredential;

const CREDENTIAL_KEY: &str = "oauth_token";

/// The host gateway's durable key-value store for small string blobs.
///
/// Durability and exclusive-write safety are the implementor's concern; the
/// adapter only reads and writes through this interface.
pub trait DataStore {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&self, key: &str, value: &str) -> AdapterResult<()>;
}

/// Load the persisted credential, if any.
///
/// A blob that fails to parse is logged and treated as absent: the only
/// recovery is re-authorization, so the caller gets the consent prompt again
/// instead of a hard error.
pub(crate) fn load_credential<S>(store: &S) -> Option<StoredCredential>
where
    S: DataStore,
{
    let blob = store.get(CREDENTIAL_KEY)?;
    match serde_json::from_str::<StoredCredential>(&blob) {
        Ok(credential) => {
            debug!("Loaded stored credential: {}", credential);
            Some(credential)
        }
        Err(e) => {
            warn!("Stored credential is unreadable, re-authorization required: {}", e);
            None
        }
    }
}

pub(crate) fn save_credential<S>(store: &S, credential: &StoredCredential) -> AdapterResult<()>
where
    S: DataStore,
{
    let blob = serde_json::to_string(credential)
        .map_err(|e| ConfigError(format!("Failed to serialize credential: {}", e)))?;
    store.put(CREDENTIAL_KEY, &blob)
}

/// In-memory [DataStore], for tests and single-process hosts.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DataStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) -> AdapterResult<()> {
        self.entries.lock().unwrap().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn test_credential_round_trip() {
        let store = MemoryStore::new();
        assert!(load_credential(&store).is_none());

        let credential = StoredCredential {
            scopes: vec!["https://www.googleapis.com/auth/drive".to_string()],
            access_token: "some-access-token".to_string(),
            refresh_token: None,
            expires_at: OffsetDateTime::from_unix_timestamp(1_719_392_000).unwrap(),
        };
        save_credential(&store, &credential).unwrap();

        let loaded = load_credential(&store).unwrap();
        assert_eq!(loaded.access_token, credential.access_token);
        assert_eq!(loaded.scopes, credential.scopes);
        assert_eq!(loaded.expires_at, credential.expires_at);
    }

    #[test]
    fn test_unreadable_blob_is_treated_as_absent() {
        let store = MemoryStore::new();
        store.put(CREDENTIAL_KEY, "{not json").unwrap();
        assert!(load_credential(&store).is_none());
    }
}
