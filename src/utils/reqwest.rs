use std::fmt::{Display, Formatter};
use reqwest::{header, Client};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use crate::errors::AdapterError::{BuilderError, InvalidArgumentError};
use crate::errors::AdapterResult;

#[derive(Debug, Clone, Copy)]
pub enum AuthType {
    Bearer,
}

impl Display for AuthType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bearer => write!(f, "Bearer"),
        }
    }
}

/// Build a [Client] that attaches the credential to every outgoing request.
///
/// This is the capability handed to the identity lookup after authorization:
/// callers never see the raw token again once the client is built.
pub fn get_client_with_token(token: &str, auth_type: AuthType) -> AdapterResult<Client> {
    let mut header_value = HeaderValue::from_str(&format!("{} {}", auth_type, token))
        .map_err(|e| InvalidArgumentError(format!("Failed to parse header value: {:#?}", e)))?;
    header_value.set_sensitive(true);
    let mut headers = header::HeaderMap::new();
    headers.insert(AUTHORIZATION, header_value);

    let client = Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| BuilderError(format!("Failed to build client: {:#?}", e)))?;

    Ok(client)
}
