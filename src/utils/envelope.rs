//! Generic serialized form for cached backend entries.
//!
//! Every backend adapter persists its directory listings through this
//! envelope: a version tag, a `|` separator and a JSON object with
//! single/double-letter keys. Entries are cached at scale (one per remote
//! file), so the encoding favors compactness over self-description:
//!
//! ```text
//! 1|{"p":"/docs","t":"d","s":-1,"mt":1719392000000,"d":{"i":"..."}}
//! ```
//!
//! Backend-private fields travel in the `d` map and are opaque to this layer.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use crate::errors::AdapterError::MalformedEntry;
use crate::errors::AdapterResult;

const ENVELOPE_VERSION: &str = "1";

const KIND_FILE: &str = "f";
const KIND_DIR: &str = "d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

impl EntryKind {
    pub fn is_dir(&self) -> bool {
        matches!(self, EntryKind::Dir)
    }

    fn discriminator(&self) -> &'static str {
        match self {
            EntryKind::File => KIND_FILE,
            EntryKind::Dir => KIND_DIR,
        }
    }

    fn from_discriminator(tag: &str) -> AdapterResult<Self> {
        match tag {
            KIND_FILE => Ok(EntryKind::File),
            KIND_DIR => Ok(EntryKind::Dir),
            other => Err(MalformedEntry(format!("unknown entry kind '{}'", other))),
        }
    }
}

/// Decoded envelope: the backend-independent fields plus the private map.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryEnvelope {
    pub path: String,
    pub kind: EntryKind,
    pub size: i64,
    pub mod_time: OffsetDateTime,
    pub fields: HashMap<String, String>,
}

#[derive(Serialize, Deserialize)]
struct EnvelopeRepr {
    p: String,
    t: String,
    s: i64,
    // Unix milliseconds. The gateway's entry timestamps carry millisecond
    // precision, so round-trips are exact at that granularity.
    mt: i64,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    d: HashMap<String, String>,
}

pub fn encode(envelope: &EntryEnvelope) -> AdapterResult<String> {
    let repr = EnvelopeRepr {
        p: envelope.path.clone(),
        t: envelope.kind.discriminator().to_string(),
        s: envelope.size,
        mt: (envelope.mod_time.unix_timestamp_nanos() / 1_000_000) as i64,
        d: envelope.fields.clone(),
    };
    let body = serde_json::to_string(&repr)
        .map_err(|e| MalformedEntry(format!("failed to encode entry: {}", e)))?;

    Ok(format!("{}|{}", ENVELOPE_VERSION, body))
}

pub fn decode(dat: &str) -> AdapterResult<EntryEnvelope> {
    let (version, body) = dat
        .split_once('|')
        .ok_or_else(|| MalformedEntry("missing version tag".to_string()))?;
    if version != ENVELOPE_VERSION {
        return Err(MalformedEntry(format!("unsupported entry version '{}'", version)));
    }

    let repr = serde_json::from_str::<EnvelopeRepr>(body)
        .map_err(|e| MalformedEntry(format!("failed to parse entry: {}", e)))?;
    let mod_time = OffsetDateTime::from_unix_timestamp_nanos(repr.mt as i128 * 1_000_000)
        .map_err(|e| MalformedEntry(format!("entry timestamp out of range: {}", e)))?;

    Ok(EntryEnvelope {
        path: repr.p,
        kind: EntryKind::from_discriminator(&repr.t)?,
        size: repr.s,
        mod_time,
        fields: repr.d,
    })
}
