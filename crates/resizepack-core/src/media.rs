//! Media types the pipeline can emit.

use serde::{Deserialize, Serialize};

/// A concrete encoded image format.
///
/// Only these three are ever produced. Inputs may declare any media type;
/// anything else is decoded by sniffing the bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Png,
    Jpeg,
    Webp,
}

impl MediaType {
    /// Parse a declared MIME string such as `image/png; charset=binary`.
    ///
    /// Matching is case-insensitive and ignores parameters. Returns `None` for
    /// types the encoder cannot produce (e.g. `image/heic`).
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/png" => Some(MediaType::Png),
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(MediaType::Jpeg),
            "image/webp" => Some(MediaType::Webp),
            _ => None,
        }
    }

    /// Canonical MIME string.
    pub fn mime(self) -> &'static str {
        match self {
            MediaType::Png => "image/png",
            MediaType::Jpeg => "image/jpeg",
            MediaType::Webp => "image/webp",
        }
    }

    /// File extension used for archive entries, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            MediaType::Png => "png",
            MediaType::Jpeg => "jpg",
            MediaType::Webp => "webp",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mime())
    }
}

/// Returns true for any `image/*` media type.
///
/// Uploaders use this to drop non-image files before they reach a batch.
pub fn is_image_media_type(mime: &str) -> bool {
    mime.trim().to_ascii_lowercase().starts_with("image/")
}
