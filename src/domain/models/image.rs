use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::shared::errors::{PipelineError, Result};

/// Mime type assumed when a source does not report one
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Image formats accepted from the media library
pub const SUPPORTED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
];

/// Quality factor requested from the camera and the picker (0.0 to 1.0)
pub const CAPTURE_QUALITY: f32 = 0.8;

const DATA_IMAGE_PREFIX: &str = "data:image";

static DATA_URI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^data:(image/[A-Za-z0-9.+-]+);base64,").expect("valid data uri pattern")
});

pub fn is_supported_type(mime_type: &str) -> bool {
    SUPPORTED_IMAGE_TYPES.contains(&mime_type.to_ascii_lowercase().as_str())
}

/// One acquired image, either inline (base64) or as a file reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    bytes_base64: Option<String>,
    source_uri: Option<PathBuf>,
    mime_type: String,
}

impl ImageDescriptor {
    /// Build a descriptor; fails when neither bytes nor a file reference are given
    pub fn new(
        bytes_base64: Option<String>,
        source_uri: Option<PathBuf>,
        mime_type: Option<String>,
    ) -> Result<Self> {
        let bytes_base64 = bytes_base64.filter(|b| !b.is_empty());
        if bytes_base64.is_none() && source_uri.is_none() {
            return Err(PipelineError::EncodingFailed(
                "image has neither inline bytes nor a file reference".to_string(),
            ));
        }

        Ok(Self {
            bytes_base64,
            source_uri,
            mime_type: mime_type
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
        })
    }

    pub fn from_base64(bytes_base64: impl Into<String>, mime_type: Option<String>) -> Result<Self> {
        Self::new(Some(bytes_base64.into()), None, mime_type)
    }

    pub fn from_uri(source_uri: impl Into<PathBuf>, mime_type: Option<String>) -> Result<Self> {
        Self::new(None, Some(source_uri.into()), mime_type)
    }

    pub fn bytes_base64(&self) -> Option<&str> {
        self.bytes_base64.as_deref()
    }

    pub fn source_uri(&self) -> Option<&Path> {
        self.source_uri.as_deref()
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Unprefixed base64 payload if the bytes are inline
    pub fn inline_payload(&self) -> Option<&str> {
        let bytes = self.bytes_base64.as_deref()?;
        Some(match EncodedImage::split(bytes) {
            Some((_, payload)) => payload,
            None => bytes,
        })
    }
}

/// A `data:<mime>;base64,<payload>` string ready for transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedImage(String);

impl EncodedImage {
    pub fn wrap(mime_type: &str, payload: &str) -> Self {
        Self(format!("data:{};base64,{}", mime_type, payload))
    }

    /// Wrap raw base64 unless it already carries a `data:image` prefix
    pub fn ensure_prefixed(image: &str) -> Self {
        if Self::has_prefix(image) {
            Self(image.to_string())
        } else {
            Self::wrap(DEFAULT_MIME_TYPE, image)
        }
    }

    pub fn has_prefix(image: &str) -> bool {
        image.starts_with(DATA_IMAGE_PREFIX)
    }

    /// Split a data URI into (mime, payload)
    pub fn split(image: &str) -> Option<(&str, &str)> {
        let caps = DATA_URI.captures(image)?;
        let whole = caps.get(0)?;
        let mime = caps.get(1)?;
        Some((mime.as_str(), &image[whole.end()..]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn mime_type(&self) -> Option<&str> {
        Self::split(&self.0).map(|(mime, _)| mime)
    }

    pub fn payload(&self) -> &str {
        Self::split(&self.0).map(|(_, payload)| payload).unwrap_or(&self.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for EncodedImage {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
