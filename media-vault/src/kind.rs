//! Per-category upload policy
//!
//! Every [`MediaKind`] owns a [`KindPolicy`]: the MIME types it accepts and
//! the largest payload it will store. Extension resolution shares a single
//! MIME to extension table across all kinds.
//!
//! # Examples
//!
//! ```rust
//! use media_vault::kind::{resolve_extension, MediaKind};
//!
//! assert!(MediaKind::Image.validate(Some("image/png"), 1024).is_ok());
//! assert!(MediaKind::Image.validate(Some("image/gif"), 1024).is_err());
//!
//! assert_eq!(resolve_extension(Some("photo.PNG"), Some("image/png")).unwrap(), "png");
//! assert_eq!(resolve_extension(None, Some("application/pdf")).unwrap(), "pdf");
//! ```

use crate::error::{MediaError, MediaResult};
use serde::{Deserialize, Serialize};
use std::fmt;

const MIB: u64 = 1024 * 1024;

/// Category of an uploaded asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaKind {
    /// Still images; the only kind that gets resized variants
    Image,
    /// Video files, stored as-is
    Video,
    /// Audio files, stored as-is
    Audio,
    /// Office documents, PDFs and plain text
    Document,
}

/// Validation rules for one [`MediaKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindPolicy {
    /// Accepted MIME types, lower-case
    pub allowed_mime_types: &'static [&'static str],

    /// Maximum payload size in bytes (inclusive)
    pub max_bytes: u64,
}

const IMAGE_POLICY: KindPolicy = KindPolicy {
    allowed_mime_types: &["image/jpeg", "image/png", "image/webp"],
    max_bytes: 10 * MIB,
};

const VIDEO_POLICY: KindPolicy = KindPolicy {
    allowed_mime_types: &["video/mp4", "video/quicktime", "video/webm"],
    max_bytes: 500 * MIB,
};

const AUDIO_POLICY: KindPolicy = KindPolicy {
    allowed_mime_types: &[
        "audio/mpeg",
        "audio/mp4",
        "audio/aac",
        "audio/wav",
        "audio/x-wav",
        "audio/ogg",
        "audio/webm",
    ],
    max_bytes: 50 * MIB,
};

const DOCUMENT_POLICY: KindPolicy = KindPolicy {
    allowed_mime_types: &[
        "application/pdf",
        "application/msword",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "text/plain",
        "text/csv",
    ],
    max_bytes: 20 * MIB,
};

/// MIME type to file extension, consulted when the filename has none
const MIME_EXTENSIONS: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
    ("video/mp4", "mp4"),
    ("video/quicktime", "mov"),
    ("video/webm", "webm"),
    ("audio/mpeg", "mp3"),
    ("audio/mp4", "m4a"),
    ("audio/aac", "aac"),
    ("audio/wav", "wav"),
    ("audio/x-wav", "wav"),
    ("audio/ogg", "ogg"),
    ("audio/webm", "weba"),
    ("application/pdf", "pdf"),
    ("application/msword", "doc"),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "docx",
    ),
    (
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "xlsx",
    ),
    ("text/plain", "txt"),
    ("text/csv", "csv"),
];

impl MediaKind {
    /// All kinds, in declaration order
    pub const ALL: [Self; 4] = [Self::Image, Self::Video, Self::Audio, Self::Document];

    /// Returns the policy record for this kind
    #[must_use]
    pub const fn policy(self) -> &'static KindPolicy {
        match self {
            Self::Image => &IMAGE_POLICY,
            Self::Video => &VIDEO_POLICY,
            Self::Audio => &AUDIO_POLICY,
            Self::Document => &DOCUMENT_POLICY,
        }
    }

    /// Lower-case name used as a key path segment
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Document => "document",
        }
    }

    /// Whether uploads of this kind get resized variants
    #[must_use]
    pub const fn has_variants(self) -> bool {
        matches!(self, Self::Image)
    }

    /// Checks a MIME type and payload size against this kind's policy
    ///
    /// The MIME comparison is case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::Validation`] if the MIME type is missing or not
    /// accepted, or if `size` exceeds the kind's maximum.
    pub fn validate(self, mime_type: Option<&str>, size: u64) -> MediaResult<()> {
        let policy = self.policy();

        let mime = mime_type
            .map(normalize_mime)
            .filter(|m| !m.is_empty())
            .ok_or_else(|| MediaError::validation(format!("{self} upload is missing a content type")))?;

        if !policy.allowed_mime_types.contains(&mime.as_str()) {
            return Err(MediaError::validation(format!(
                "content type {mime} is not allowed for {self}; expected one of {:?}",
                policy.allowed_mime_types
            )));
        }

        if size > policy.max_bytes {
            return Err(MediaError::validation(format!(
                "{self} upload of {size} bytes exceeds limit of {} bytes",
                policy.max_bytes
            )));
        }

        Ok(())
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MediaKind {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            "document" => Ok(Self::Document),
            other => Err(MediaError::validation(format!("unknown media kind: {other}"))),
        }
    }
}

/// Trims and lower-cases a MIME type
#[must_use]
pub fn normalize_mime(mime: &str) -> String {
    mime.trim().to_ascii_lowercase()
}

/// Looks up the canonical extension for a MIME type
#[must_use]
pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    let mime = normalize_mime(mime);
    MIME_EXTENSIONS
        .iter()
        .find(|(m, _)| *m == mime)
        .map(|(_, ext)| *ext)
}

/// Picks the extension used for the stored original
///
/// The filename's trailing extension wins when it is present and made of
/// ASCII alphanumerics; it is lower-cased. Otherwise the MIME type is looked
/// up in the static extension table.
///
/// # Errors
///
/// Returns [`MediaError::Validation`] if neither source yields an extension.
pub fn resolve_extension(
    original_filename: Option<&str>,
    mime_type: Option<&str>,
) -> MediaResult<String> {
    if let Some(ext) = original_filename.and_then(filename_extension) {
        return Ok(ext);
    }

    mime_type
        .and_then(extension_for_mime)
        .map(str::to_string)
        .ok_or_else(|| {
            MediaError::validation(format!(
                "cannot determine file extension (filename: {original_filename:?}, content type: {mime_type:?})"
            ))
        })
}

fn filename_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.trim().rsplit_once('.')?;
    // Anything else would leak separators or whitespace into the object key
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_every_allowed_type_at_limit() {
        for kind in MediaKind::ALL {
            let policy = kind.policy();
            for mime in policy.allowed_mime_types {
                assert!(kind.validate(Some(mime), 0).is_ok(), "{kind} {mime}");
                assert!(kind.validate(Some(mime), policy.max_bytes).is_ok(), "{kind} {mime}");
            }
        }
    }

    #[test]
    fn test_validate_rejects_oversized() {
        for kind in MediaKind::ALL {
            let policy = kind.policy();
            let mime = policy.allowed_mime_types[0];
            let err = kind.validate(Some(mime), policy.max_bytes + 1).unwrap_err();
            assert!(err.is_validation());
        }
    }

    #[test]
    fn test_validate_is_case_insensitive() {
        assert!(MediaKind::Image.validate(Some("IMAGE/JPEG"), 10).is_ok());
        assert!(MediaKind::Document.validate(Some(" Application/PDF "), 10).is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_or_foreign_mime() {
        assert!(MediaKind::Image.validate(None, 10).unwrap_err().is_validation());
        assert!(MediaKind::Image.validate(Some(""), 10).unwrap_err().is_validation());
        assert!(MediaKind::Image.validate(Some("image/gif"), 10).unwrap_err().is_validation());
        assert!(MediaKind::Audio.validate(Some("application/pdf"), 10).is_err());
    }

    #[test]
    fn test_resolve_extension_prefers_filename() {
        assert_eq!(resolve_extension(Some("photo.PNG"), Some("image/png")).unwrap(), "png");
        assert_eq!(resolve_extension(Some("scan.jpeg"), Some("image/png")).unwrap(), "jpeg");
        assert_eq!(resolve_extension(Some("archive.tar.gz"), None).unwrap(), "gz");
    }

    #[test]
    fn test_resolve_extension_falls_back_to_mime() {
        assert_eq!(resolve_extension(None, Some("application/pdf")).unwrap(), "pdf");
        assert_eq!(resolve_extension(Some("README"), Some("text/plain")).unwrap(), "txt");
        assert_eq!(resolve_extension(Some("trailing."), Some("image/jpeg")).unwrap(), "jpg");
        assert_eq!(resolve_extension(Some("   "), Some("IMAGE/WEBP")).unwrap(), "webp");
        assert_eq!(resolve_extension(Some("evil.p/ng"), Some("image/png")).unwrap(), "png");
    }

    #[test]
    fn test_resolve_extension_unresolvable() {
        let err = resolve_extension(None, Some("application/unknown")).unwrap_err();
        assert!(err.is_validation());
        assert!(resolve_extension(None, None).is_err());
    }

    #[test]
    fn test_every_allowed_type_has_an_extension() {
        for kind in MediaKind::ALL {
            for mime in kind.policy().allowed_mime_types {
                assert!(extension_for_mime(mime).is_some(), "{mime}");
            }
        }
    }

    #[test]
    fn test_kind_parse_and_display() {
        assert_eq!("IMAGE".parse::<MediaKind>().unwrap(), MediaKind::Image);
        assert_eq!("document".parse::<MediaKind>().unwrap(), MediaKind::Document);
        assert!("spreadsheet".parse::<MediaKind>().is_err());
        assert_eq!(MediaKind::Audio.to_string(), "audio");
        assert!(MediaKind::Image.has_variants());
        assert!(!MediaKind::Video.has_variants());
    }
}
