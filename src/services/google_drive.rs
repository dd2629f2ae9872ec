//! Google Drive adapter facade.
//!
//! Exposes what the gateway consumes: [init_config] and [init] wrapping the
//! OAuth2 handshake, and [serialize_entry]/[deserialize_entry] for the cached
//! listing rows.

use std::collections::HashMap;
use log::warn;
use crate::errors::AdapterError::MalformedEntry;
use crate::errors::AdapterResult;
use crate::types::google_drive::RemoteEntry;
use crate::utils::envelope::{self, EntryEnvelope, EntryKind};
use crate::utils::oauth2::identity::{IdentityOutcome, IdentitySource};
use crate::utils::oauth2::stores::DataStore;
use crate::utils::oauth2::{
    complete_authorization, oauth_init_config, AuthorizationResponse, InitConfig, InitState,
    OAuthRequest,
};

const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

// The profile scope backs the identity check, the drive scope everything
// else; both are requested up front to keep the handshake single-pass.
const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/drive",
    "https://www.googleapis.com/auth/userinfo.profile",
];

const OAUTH_TEXT: &str = "Authorize access to your Google Drive account";

// Private-field keys of the serialized entry. Entries are cached one per
// remote file, so the keys stay short.
const DATA_KEY_ID: &str = "i";
const DATA_KEY_MIME: &str = "m";
const DATA_KEY_TARGET_ID: &str = "ti";
const DATA_KEY_TARGET_MIME: &str = "tm";
const DATA_KEY_THUMBNAIL: &str = "th";

/// Host-supplied OAuth application settings for this backend.
#[derive(Debug, Clone)]
pub struct GDriveConfig {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl GDriveConfig {
    pub fn new(client_id: &str, client_secret: &str, redirect_uri: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            redirect_uri: redirect_uri.to_string(),
        }
    }
}

fn oauth_request(config: &GDriveConfig) -> AdapterResult<OAuthRequest> {
    OAuthRequest::new(
        &config.client_id,
        &config.client_secret,
        GOOGLE_AUTH_URI,
        GOOGLE_TOKEN_URI,
        &config.redirect_uri,
        &SCOPES,
        true,
        OAUTH_TEXT,
    )
}

/// Drive the initialization handshake as far as the stored credential allows.
///
/// Without a usable credential the result carries the consent prompt. With
/// one, the identity check runs against the credential: a resolved principal
/// promotes the state to [InitState::Configured], while a failed lookup is
/// logged and leaves the adapter unconfigured without surfacing an error,
/// since the authorization itself may still be valid on a later retry.
pub async fn init_config<S, I>(config: &GDriveConfig,
                               store: &S,
                               identity: &I) -> AdapterResult<InitConfig>
where
    S: DataStore + Sync,
    I: IdentitySource + Sync,
{
    let request = oauth_request(config)?;
    let (mut init, client) = oauth_init_config(&request, store)?;
    let Some(client) = client else {
        return Ok(init);
    };

    match identity.display_name(&client).await {
        IdentityOutcome::Principal(name) => {
            init.state = InitState::Configured { principal: name };
        }
        IdentityOutcome::Unauthorized(reason) => {
            warn!("Identity lookup rejected, leaving adapter unconfigured: {}", reason);
        }
        IdentityOutcome::Unreachable(reason) => {
            warn!("Identity lookup unreachable, leaving adapter unconfigured: {}", reason);
        }
    }

    Ok(init)
}

/// Complete the handshake with the authorization code submitted by the user
/// and persist the minted credential.
pub async fn init<S>(config: &GDriveConfig,
                     store: &S,
                     response: &AuthorizationResponse) -> AdapterResult<()>
where
    S: DataStore + Sync,
{
    let request = oauth_request(config)?;
    complete_authorization(&request, store, response).await
}

/// Restore a [RemoteEntry] from its cached string form.
///
/// Envelope-level decode failures propagate unchanged. An entry without a
/// remote id is meaningless (every remote operation keys off it), so a
/// missing or empty `i` fails before anything is constructed. The other
/// private fields default to empty.
pub fn deserialize_entry(dat: &str) -> AdapterResult<RemoteEntry> {
    let envelope = envelope::decode(dat)?;
    let field = |key: &str| {
        envelope
            .fields
            .get(key)
            .map(String::as_str)
            .unwrap_or_default()
    };

    let id = field(DATA_KEY_ID);
    if id.is_empty() {
        return Err(MalformedEntry("cached entry has no remote id".to_string()));
    }

    let mut entry = RemoteEntry::new(
        id,
        field(DATA_KEY_MIME),
        &envelope.path,
        envelope.kind.is_dir(),
        envelope.size,
        envelope.mod_time,
    );
    entry.set_shortcut_fields(field(DATA_KEY_TARGET_ID), field(DATA_KEY_TARGET_MIME));

    Ok(entry.with_thumbnail(field(DATA_KEY_THUMBNAIL)))
}

/// Serialize a [RemoteEntry] for the listing cache. Optional fields are
/// written only when present; [deserialize_entry] restores the empty
/// defaults.
pub fn serialize_entry(entry: &RemoteEntry) -> AdapterResult<String> {
    let mut fields = HashMap::new();
    fields.insert(DATA_KEY_ID.to_string(), entry.id().to_string());
    fields.insert(DATA_KEY_MIME.to_string(), entry.mime().to_string());
    for (key, value) in [
        (DATA_KEY_TARGET_ID, entry.target_id()),
        (DATA_KEY_TARGET_MIME, entry.target_mime()),
        (DATA_KEY_THUMBNAIL, entry.thumbnail()),
    ] {
        if !value.is_empty() {
            fields.insert(key.to_string(), value.to_string());
        }
    }

    let envelope = EntryEnvelope {
        path: entry.path().to_string(),
        kind: if entry.is_dir() { EntryKind::Dir } else { EntryKind::File },
        size: entry.size(),
        mod_time: entry.mod_time(),
        fields,
    };

    envelope::encode(&envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reqwest::Client;
    use time::OffsetDateTime;
    use crate::errors::AdapterError;
    use crate::utils::oauth2::stores::MemoryStore;
    use crate::utils::oauth2::{CodeExchanger, StoredCredential};

    fn test_config() -> GDriveConfig {
        GDriveConfig::new("client-id", "client-secret", "http://localhost:8080/callback")
    }

    fn mod_time() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_719_392_000).unwrap()
    }

    async fn seed_credential(store: &MemoryStore) {
        let credential = StoredCredential {
            scopes: SCOPES.iter().map(|s| s.to_string()).collect(),
            access_token: "some-access-token".to_string(),
            refresh_token: Some("some-refresh-token".to_string()),
            expires_at: OffsetDateTime::now_utc() + time::Duration::hours(1),
        };

        struct Seed(StoredCredential);
        #[async_trait]
        impl CodeExchanger for Seed {
            async fn exchange(&self, _code: &str) -> AdapterResult<StoredCredential> {
                Ok(self.0.clone())
            }
        }

        let response = AuthorizationResponse { code: "4/seed-code".to_string() };
        complete_authorization(&Seed(credential), store, &response)
            .await
            .unwrap();
    }

    struct FixedIdentity(IdentityOutcome);

    #[async_trait]
    impl IdentitySource for FixedIdentity {
        async fn display_name(&self, _client: &Client) -> IdentityOutcome {
            self.0.clone()
        }
    }

    #[test]
    fn test_entry_round_trip() {
        let entry = RemoteEntry::file("1a2b", "application/pdf", "/docs/a.pdf", 1024, mod_time())
            .with_shortcut("3c4d", "application/pdf")
            .with_thumbnail("https://lh3.example.com/thumb");

        let encoded = serialize_entry(&entry).unwrap();
        let decoded = deserialize_entry(&encoded).unwrap();
        assert_eq!(decoded, entry);
    }

    #[test]
    fn test_entry_round_trip_with_default_optionals() {
        let entry = RemoteEntry::folder("0Adir", "/docs", mod_time());
        let encoded = serialize_entry(&entry).unwrap();
        // Absent optional fields are not written at all.
        assert!(!encoded.contains("\"ti\""));
        assert!(!encoded.contains("\"th\""));

        let decoded = deserialize_entry(&encoded).unwrap();
        assert_eq!(decoded, entry);
        assert!(decoded.is_dir());
        assert!(!decoded.is_shortcut());
        assert_eq!(decoded.thumbnail(), "");
    }

    #[test]
    fn test_deserialize_without_remote_id_fails() {
        let mut fields = HashMap::new();
        fields.insert("m".to_string(), "application/pdf".to_string());
        let envelope = EntryEnvelope {
            path: "/docs/a.pdf".to_string(),
            kind: EntryKind::File,
            size: 1024,
            mod_time: mod_time(),
            fields,
        };
        let encoded = envelope::encode(&envelope).unwrap();

        let error = deserialize_entry(&encoded).unwrap_err();
        assert!(matches!(error, AdapterError::MalformedEntry(_)));

        // An explicitly empty id is just as meaningless as a missing one.
        let mut fields = HashMap::new();
        fields.insert("i".to_string(), String::new());
        let envelope = EntryEnvelope {
            path: "/docs/a.pdf".to_string(),
            kind: EntryKind::File,
            size: 1024,
            mod_time: mod_time(),
            fields,
        };
        let encoded = envelope::encode(&envelope).unwrap();
        assert!(deserialize_entry(&encoded).is_err());
    }

    #[test]
    fn test_deserialize_accepts_one_sided_shortcut() {
        let mut fields = HashMap::new();
        fields.insert("i".to_string(), "1a2b".to_string());
        fields.insert("ti".to_string(), "3c4d".to_string());
        let envelope = EntryEnvelope {
            path: "/docs/link".to_string(),
            kind: EntryKind::File,
            size: 0,
            mod_time: mod_time(),
            fields,
        };
        let encoded = envelope::encode(&envelope).unwrap();

        // Decode tolerates the inconsistency; the validator flags it.
        let decoded = deserialize_entry(&encoded).unwrap();
        assert!(decoded.is_shortcut());
        assert!(!decoded.shortcut_fields_consistent());
    }

    #[test]
    fn test_deserialized_native_document_resolves_export() {
        let entry = RemoteEntry::file(
            "1a2b",
            "application/vnd.google-apps.document",
            "/docs/report",
            0,
            mod_time(),
        );
        let decoded = deserialize_entry(&serialize_entry(&entry).unwrap()).unwrap();

        let format = decoded.export_format().unwrap();
        assert_eq!(format.extension, "docx");
        assert_eq!(
            format.mime,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
    }

    #[tokio::test]
    async fn test_init_config_without_stored_credential() {
        let _ = env_logger::builder().is_test(true).try_init();
        let store = MemoryStore::new();
        let identity = FixedIdentity(IdentityOutcome::Principal("Alice Example".to_string()));

        let init = init_config(&test_config(), &store, &identity).await.unwrap();
        assert_eq!(init.state, InitState::AwaitingUserAuthorization);
        assert!(!init.is_configured());

        let prompt = init.auth_prompt.unwrap();
        assert!(prompt.url.contains("access_type=offline"));
        assert!(prompt.url.contains("userinfo.profile"));
        assert_eq!(prompt.text, OAUTH_TEXT);
    }

    #[tokio::test]
    async fn test_init_config_with_credential_and_reachable_identity() {
        let store = MemoryStore::new();
        seed_credential(&store).await;
        let identity = FixedIdentity(IdentityOutcome::Principal("Alice Example".to_string()));

        let init = init_config(&test_config(), &store, &identity).await.unwrap();
        assert!(init.is_configured());
        assert_eq!(init.principal(), Some("Alice Example"));
        assert!(init.auth_prompt.is_none());
    }

    #[tokio::test]
    async fn test_init_config_with_unreachable_identity() {
        let _ = env_logger::builder().is_test(true).try_init();
        let store = MemoryStore::new();
        seed_credential(&store).await;
        let identity =
            FixedIdentity(IdentityOutcome::Unreachable("connection refused".to_string()));

        // The identity failure is informational: no error, not configured.
        let init = init_config(&test_config(), &store, &identity).await.unwrap();
        assert_eq!(init.state, InitState::Unconfigured);
        assert!(!init.is_configured());
        assert!(init.auth_prompt.is_none());
    }

    #[tokio::test]
    async fn test_init_config_with_rejected_credential() {
        let store = MemoryStore::new();
        seed_credential(&store).await;
        let identity = FixedIdentity(IdentityOutcome::Unauthorized("401 Unauthorized".to_string()));

        let init = init_config(&test_config(), &store, &identity).await.unwrap();
        assert_eq!(init.state, InitState::Unconfigured);
        assert!(init.principal().is_none());
    }
}
