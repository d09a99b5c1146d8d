//! Image encoder
//!
//! Turns an acquired image into a single `data:<mime>;base64,<payload>`
//! string. Inline bytes are wrapped directly; file references are read
//! fully into memory first. Already-prefixed input is passed through
//! unchanged. No size validation happens here.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::domain::models::{EncodedImage, ImageDescriptor};
use crate::shared::errors::{PipelineError, Result};
use crate::shared::logging;

/// Encode inline bytes without touching the file system
///
/// Returns `None` when the descriptor only carries a file reference.
pub fn encode_inline(descriptor: &ImageDescriptor) -> Option<EncodedImage> {
    let bytes = descriptor.bytes_base64()?;

    if EncodedImage::has_prefix(bytes) {
        logging::log_encoded(descriptor.mime_type(), bytes.len(), true);
        return Some(EncodedImage::ensure_prefixed(bytes));
    }

    let encoded = EncodedImage::wrap(descriptor.mime_type(), bytes);
    logging::log_encoded(descriptor.mime_type(), encoded.len(), false);
    Some(encoded)
}

/// Encode raw file bytes
pub fn encode_bytes(bytes: &[u8], mime_type: &str) -> EncodedImage {
    EncodedImage::wrap(mime_type, &STANDARD.encode(bytes))
}

/// Encode a descriptor, reading its file reference when bytes are not inline
pub async fn encode(descriptor: &ImageDescriptor) -> Result<EncodedImage> {
    if let Some(encoded) = encode_inline(descriptor) {
        return Ok(encoded);
    }

    let path = descriptor.source_uri().ok_or_else(|| {
        PipelineError::EncodingFailed("image has neither inline bytes nor a file reference".to_string())
    })?;

    let bytes = tokio::fs::read(path).await.map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Failed to read image file");
        PipelineError::EncodingFailed(format!("{}: {}", path.display(), e))
    })?;

    let encoded = encode_bytes(&bytes, descriptor.mime_type());
    logging::log_encoded(descriptor.mime_type(), encoded.len(), false);
    Ok(encoded)
}
