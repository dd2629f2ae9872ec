use serde::Deserialize;
use time::OffsetDateTime;
use crate::utils::export::{resolve_export, ExportFormat, FOLDER_MIME_TYPE};

/// Response body of the Google userinfo endpoint. Only the display name is
/// consumed; the rest of the payload is ignored.
#[derive(Deserialize, Debug)]
pub(crate) struct UserinfoResponse {
    pub(crate) name: String,
}

/// The adapter's view of one remote file or folder.
///
/// `target_id`/`target_mime` are populated together when the entry is a
/// shortcut to another remote object; `thumbnail` is an opaque preview
/// reference. All three default to empty.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteEntry {
    id: String,
    mime: String,
    path: String,
    is_dir: bool,
    size: i64,
    mod_time: OffsetDateTime,
    target_id: String,
    target_mime: String,
    thumbnail: String,
}

impl RemoteEntry {
    pub(crate) fn new(id: &str,
                      mime: &str,
                      path: &str,
                      is_dir: bool,
                      size: i64,
                      mod_time: OffsetDateTime) -> Self {
        Self {
            id: id.to_string(),
            mime: mime.to_string(),
            path: path.to_string(),
            is_dir,
            size,
            mod_time,
            target_id: String::new(),
            target_mime: String::new(),
            thumbnail: String::new(),
        }
    }

    pub fn file(id: &str, mime: &str, path: &str, size: i64, mod_time: OffsetDateTime) -> Self {
        Self::new(id, mime, path, false, size, mod_time)
    }

    /// Folders always carry the folder sentinel mime and no size semantics.
    pub fn folder(id: &str, path: &str, mod_time: OffsetDateTime) -> Self {
        Self::new(id, FOLDER_MIME_TYPE, path, true, -1, mod_time)
    }

    /// Mark the entry as a shortcut. Both target fields are set at once, so
    /// entries built through this method keep the paired-presence invariant.
    pub fn with_shortcut(mut self, target_id: &str, target_mime: &str) -> Self {
        self.target_id = target_id.to_string();
        self.target_mime = target_mime.to_string();
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: &str) -> Self {
        self.thumbnail = thumbnail.to_string();
        self
    }

    pub(crate) fn set_shortcut_fields(&mut self, target_id: &str, target_mime: &str) {
        self.target_id = target_id.to_string();
        self.target_mime = target_mime.to_string();
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    pub fn mod_time(&self) -> OffsetDateTime {
        self.mod_time
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn target_mime(&self) -> &str {
        &self.target_mime
    }

    pub fn thumbnail(&self) -> &str {
        &self.thumbnail
    }

    pub fn is_shortcut(&self) -> bool {
        !self.target_id.is_empty() || !self.target_mime.is_empty()
    }

    /// Shortcut fields must be populated as a pair. Decoding does not enforce
    /// this (cached rows from older gateways may be one-sided and are still
    /// servable after a live re-fetch), so callers that resolve shortcut
    /// targets should check it explicitly.
    pub fn shortcut_fields_consistent(&self) -> bool {
        self.target_id.is_empty() == self.target_mime.is_empty()
    }

    /// Export target when the entry is a native document, [None] when its
    /// bytes can be streamed directly.
    pub fn export_format(&self) -> Option<&'static ExportFormat> {
        resolve_export(&self.mime)
    }
}
