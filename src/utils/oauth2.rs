pub mod stores;
pub mod identity;

use std::fmt::{Display, Formatter};
use std::time::Duration;
use async_trait::async_trait;
use log::{debug, warn};
use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope,
    TokenResponse, TokenUrl,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use url::Url;
use crate::errors::AdapterError::{InvalidArgumentError, OAuth2Error};
use crate::errors::AdapterResult;
use crate::utils::oauth2::stores::{load_credential, save_credential, DataStore};
use crate::utils::reqwest::{get_client_with_token, AuthType};

/// One backend's OAuth2 authorization request.
///
/// Holds everything needed to build the user consent URL and to exchange the
/// resulting authorization code: endpoints, client credentials, redirect URI,
/// the scope list and the human-readable consent text.
#[derive(Debug)]
pub struct OAuthRequest {
    client_id: String,
    client_secret: String,
    auth_uri: String,
    token_uri: String,
    redirect_uri: String,
    scopes: Vec<String>,
    offline_access: bool,
    text: String,
}

impl OAuthRequest {
    pub fn new(client_id: &str,
               client_secret: &str,
               auth_uri: &str,
               token_uri: &str,
               redirect_uri: &str,
               scopes: &[&str],
               offline_access: bool,
               text: &str) -> AdapterResult<Self> {
        for uri in [auth_uri, token_uri, redirect_uri] {
            Url::parse(uri)
                .map_err(|e| InvalidArgumentError(format!("Invalid URI '{}': {}", uri, e)))?;
        }

        Ok(Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            auth_uri: auth_uri.to_string(),
            token_uri: token_uri.to_string(),
            redirect_uri: redirect_uri.to_string(),
            scopes: scopes.iter().map(|scope| scope.to_string()).collect(),
            offline_access,
            text: text.to_string(),
        })
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Build the consent prompt handed to the user. No network call is made.
    pub fn authorization_prompt(&self) -> AdapterResult<AuthPrompt> {
        let client = self.basic_client()?;
        let mut request = client.authorize_url(CsrfToken::new_random);
        for scope in &self.scopes {
            request = request.add_scope(Scope::new(scope.clone()));
        }
        if self.offline_access {
            // Offline access mints a refresh token so the adapter can renew
            // credentials unattended after the user session ends.
            request = request.add_extra_param("access_type", "offline");
        }
        let (url, _state) = request.url();

        Ok(AuthPrompt {
            url: url.to_string(),
            text: self.text.clone(),
        })
    }

    fn basic_client(&self) -> AdapterResult<BasicClient> {
        let auth_url = AuthUrl::new(self.auth_uri.clone())
            .map_err(|e| OAuth2Error(format!("Invalid auth URI: {}", e)))?;
        let token_url = TokenUrl::new(self.token_uri.clone())
            .map_err(|e| OAuth2Error(format!("Invalid token URI: {}", e)))?;
        let redirect_url = RedirectUrl::new(self.redirect_uri.clone())
            .map_err(|e| OAuth2Error(format!("Invalid redirect URI: {}", e)))?;

        let client = BasicClient::new(
            ClientId::new(self.client_id.clone()),
            Some(ClientSecret::new(self.client_secret.clone())),
            auth_url,
            Some(token_url),
        )
            .set_redirect_uri(redirect_url);

        Ok(client)
    }
}

/// Exchanges a user-submitted authorization code for a credential.
#[async_trait]
pub trait CodeExchanger {
    async fn exchange(&self, code: &str) -> AdapterResult<StoredCredential>;
}

#[async_trait]
impl CodeExchanger for OAuthRequest {
    async fn exchange(&self, code: &str) -> AdapterResult<StoredCredential> {
        let client = self.basic_client()?;
        let token = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(async_http_client)
            .await
            .map_err(|e| OAuth2Error(format!("Code exchange failed: {:?}", e)))?;

        let expires_in = token.expires_in().unwrap_or(Duration::from_secs(3600));
        let expires_at = OffsetDateTime::now_utc() + expires_in;

        Ok(StoredCredential {
            scopes: self.scopes.clone(),
            access_token: token.access_token().secret().to_owned(),
            refresh_token: token.refresh_token().map(|t| t.secret().to_owned()),
            expires_at,
        })
    }
}

/// Credential blob persisted in the host's key-value store.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct StoredCredential {
    pub(crate) scopes: Vec<String>,
    pub(crate) access_token: String,
    pub(crate) refresh_token: Option<String>,
    pub(crate) expires_at: OffsetDateTime,
}

impl StoredCredential {
    /// A credential is usable while it is unexpired, or for as long as a
    /// refresh token exists to renew it.
    pub fn is_usable(&self) -> bool {
        self.expires_at > OffsetDateTime::now_utc() || self.refresh_token.is_some()
    }
}

impl Display for StoredCredential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "StoredCredential\nscope: [{}]\naccess_token: *****\nrefresh_token: *****\nexpires_at: '{}'",
               self.scopes.join(", "), self.expires_at.unix_timestamp())
    }
}

/// Consent prompt shown to the user when authorization is still pending.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthPrompt {
    pub url: String,
    pub text: String,
}

/// Authorization data submitted back by the user after visiting the prompt.
#[derive(Debug, Clone)]
pub struct AuthorizationResponse {
    pub code: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InitState {
    Unconfigured,
    AwaitingUserAuthorization,
    Configured { principal: String },
}

/// Result of one initialization attempt.
#[derive(Debug, Clone)]
pub struct InitConfig {
    pub state: InitState,
    pub auth_prompt: Option<AuthPrompt>,
}

impl InitConfig {
    pub fn is_configured(&self) -> bool {
        matches!(self.state, InitState::Configured { .. })
    }

    pub fn principal(&self) -> Option<&str> {
        match &self.state {
            InitState::Configured { principal } => Some(principal),
            _ => None,
        }
    }
}

/// Determine the authorization status from the stored credential.
///
/// Without a usable credential, the returned [InitConfig] carries the consent
/// prompt and no client. With one, the state stays [InitState::Unconfigured]
/// until the caller verifies the principal through the returned bearer
/// client; no network call happens here.
pub fn oauth_init_config<S>(request: &OAuthRequest,
                            store: &S) -> AdapterResult<(InitConfig, Option<Client>)>
where
    S: DataStore,
{
    match load_credential(store) {
        Some(credential) if credential.is_usable() => {
            debug!("Stored credential found: {}", credential);
            let client = get_client_with_token(&credential.access_token, AuthType::Bearer)?;
            let init = InitConfig {
                state: InitState::Unconfigured,
                auth_prompt: None,
            };
            Ok((init, Some(client)))
        }
        stored => {
            if stored.is_some() {
                warn!("Stored credential expired without refresh token. Re-authorization required.");
            }
            let init = InitConfig {
                state: InitState::AwaitingUserAuthorization,
                auth_prompt: Some(request.authorization_prompt()?),
            };
            Ok((init, None))
        }
    }
}

/// Feed the user-submitted authorization code into the OAuth exchange and
/// persist the resulting credential. The only hard-error path of the
/// handshake: exchange and storage failures both propagate unchanged.
pub async fn complete_authorization<E, S>(exchanger: &E,
                                          store: &S,
                                          response: &AuthorizationResponse) -> AdapterResult<()>
where
    E: CodeExchanger + Sync,
    S: DataStore + Sync,
{
    let credential = exchanger.exchange(&response.code).await?;
    save_credential(store, &credential)
}
