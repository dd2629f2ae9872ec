//! Export resolution for Google-native document types.
//!
//! Native documents (Docs, Sheets, Slides, ...) have no byte-stream
//! representation of their own; the Drive API must convert them server-side
//! before content can be fetched. This module owns the fixed mapping from the
//! native MIME type to the export MIME type requested from the API and the
//! extension presented to the gateway's filesystem layer.
//!
//! See https://developers.google.com/drive/api/v3/ref-export-formats
//! and https://developers.google.com/drive/api/v3/mime-types

/// MIME type Google Drive reports for folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Prefix shared by all Google-native (non-downloadable) types.
pub const GOOGLE_APP_PREFIX: &str = "application/vnd.google-apps.";

/// Export target for one native document type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportFormat {
    /// MIME type to request when exporting the document.
    pub mime: &'static str,
    /// Filename extension for the exported file.
    pub extension: &'static str,
}

static EXPORT_FORMATS: [(&str, ExportFormat); 5] = [
    (
        "application/vnd.google-apps.document",
        ExportFormat {
            mime: "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            extension: "docx",
        },
    ),
    (
        "application/vnd.google-apps.spreadsheet",
        ExportFormat {
            mime: "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            extension: "xlsx",
        },
    ),
    (
        "application/vnd.google-apps.presentation",
        ExportFormat {
            mime: "application/vnd.openxmlformats-officedocument.presentationml.presentation",
            extension: "pptx",
        },
    ),
    (
        "application/vnd.google-apps.drawing",
        ExportFormat {
            mime: "image/svg+xml",
            extension: "svg",
        },
    ),
    (
        "application/vnd.google-apps.script",
        ExportFormat {
            mime: "application/vnd.google-apps.script+json",
            extension: "json",
        },
    ),
];

/// Resolve the export target for a native document MIME type.
///
/// MIME types are matched exactly, case-sensitive. [None] means the file is
/// downloadable as-is; unknown `application/vnd.google-apps.*` types also
/// resolve to [None] so that future native types do not block downloads.
pub fn resolve_export(mime: &str) -> Option<&'static ExportFormat> {
    EXPORT_FORMATS
        .iter()
        .find(|(native, _)| *native == mime)
        .map(|(_, format)| format)
}

pub fn is_folder_mime(mime: &str) -> bool {
    mime == FOLDER_MIME_TYPE
}

pub fn is_native_app_mime(mime: &str) -> bool {
    mime.starts_with(GOOGLE_APP_PREFIX)
}
