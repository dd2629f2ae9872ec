use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use crate::types::google_drive::UserinfoResponse;

const USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Outcome of the post-authorization identity check.
///
/// The handshake collapses both failure arms into "not configured", but they
/// stay distinct here so the log line says whether the credential was
/// rejected or the endpoint was unreachable.
#[derive(Debug, Clone, PartialEq)]
pub enum IdentityOutcome {
    Principal(String),
    Unauthorized(String),
    Unreachable(String),
}

/// Resolves the authenticated account's display name through a
/// bearer-scoped client.
#[async_trait]
pub trait IdentitySource {
    async fn display_name(&self, client: &Client) -> IdentityOutcome;
}

/// Production lookup against the Google userinfo endpoint.
pub struct GoogleUserinfo {
    endpoint: String,
}

impl GoogleUserinfo {
    pub fn new() -> Self {
        Self {
            endpoint: USERINFO_ENDPOINT.to_string(),
        }
    }
}

impl Default for GoogleUserinfo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentitySource for GoogleUserinfo {
    async fn display_name(&self, client: &Client) -> IdentityOutcome {
        let response = match client.get(&self.endpoint).send().await {
            Ok(response) => response,
            Err(e) => {
                return IdentityOutcome::Unreachable(format!("Userinfo request failed: {}", e));
            }
        };

        match response.status() {
            status if status.is_success() => match response.json::<UserinfoResponse>().await {
                Ok(userinfo) => IdentityOutcome::Principal(userinfo.name),
                Err(e) => {
                    IdentityOutcome::Unreachable(format!("Userinfo response unreadable: {}", e))
                }
            },
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                IdentityOutcome::Unauthorized(format!("Userinfo rejected the credential: {}",
                                                      response.status()))
            }
            status => IdentityOutcome::Unreachable(format!("Userinfo returned {}", status)),
        }
    }
}
