//! Google Drive backend adapter for a multi-backend file gateway.
//!
//! The adapter covers three concerns:
//! - the OAuth2 initialization handshake that determines whether the backend
//!   is usable and who the authenticated principal is ([`services::google_drive::init_config`]),
//! - resolution of Google-native document types into exportable MIME types and
//!   file extensions ([`utils::export`]),
//! - a compact, versioned serialization of remote entries so directory
//!   listings can be cached without repeated API calls
//!   ([`services::google_drive::deserialize_entry`]).
//!
//! Network transport, listing/upload/download plumbing and the gateway's
//! backend registry live outside this crate and are reached through the
//! collaborator traits in [`utils::oauth2`].

pub mod errors;
pub mod services;
pub mod types;
pub mod utils;
