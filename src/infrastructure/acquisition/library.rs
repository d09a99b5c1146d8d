//! File-system backed media library
//!
//! Stands in for the system picker on desktop and in the CLI: the "pick"
//! returns a file chosen up front (or `Cancelled` when none was).

use std::path::PathBuf;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::device::{MediaLibrary, PermissionStatus, PickedAsset, PickerOptions, PickerOutcome};
use super::media;
use crate::shared::errors::Result;

#[derive(Debug, Clone, Default)]
pub struct FileLibrary {
    selection: Option<PathBuf>,
    inline_base64: bool,
}

impl FileLibrary {
    pub fn new(selection: impl Into<PathBuf>) -> Self {
        Self {
            selection: Some(selection.into()),
            inline_base64: true,
        }
    }

    /// A library whose picker is always dismissed
    pub fn empty() -> Self {
        Self {
            selection: None,
            inline_base64: true,
        }
    }

    /// Return file references only, leaving the read to the encoder
    pub fn with_inline_base64(mut self, inline: bool) -> Self {
        self.inline_base64 = inline;
        self
    }
}

#[async_trait]
impl MediaLibrary for FileLibrary {
    async fn request_permission(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    fn supports_inline_base64(&self) -> bool {
        self.inline_base64
    }

    async fn launch_picker(&self, options: &PickerOptions) -> Result<PickerOutcome> {
        let Some(path) = self.selection.clone() else {
            return Ok(PickerOutcome::Cancelled);
        };

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                // Hand back the reference; the encoder reports the read failure
                tracing::debug!(path = %path.display(), error = %e, "Picked file not readable yet");
                return Ok(PickerOutcome::Picked(PickedAsset {
                    base64: None,
                    mime_type: Some(media::mime_from_extension(&path).to_string()),
                    uri: Some(path),
                }));
            }
        };

        let mime_type = media::sniff_mime(&bytes)
            .unwrap_or_else(|| media::mime_from_extension(&path))
            .to_string();

        if !(options.base64 && self.inline_base64) {
            return Ok(PickerOutcome::Picked(PickedAsset {
                base64: None,
                uri: Some(path),
                mime_type: Some(mime_type),
            }));
        }

        let (payload, mime_type) = match media::compress_jpeg(&bytes, options.quality) {
            Some(jpeg) => (jpeg, "image/jpeg".to_string()),
            None => (bytes, mime_type),
        };

        Ok(PickerOutcome::Picked(PickedAsset {
            base64: Some(STANDARD.encode(&payload)),
            uri: Some(path),
            mime_type: Some(mime_type),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("{}-{}", uuid::Uuid::new_v4(), name))
    }

    fn write_png(path: &PathBuf) {
        let img = image::RgbImage::from_pixel(8, 8, image::Rgb([120, 80, 40]));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        std::fs::write(path, out.into_inner()).unwrap();
    }

    #[tokio::test]
    async fn test_empty_library_cancels() {
        let outcome = FileLibrary::empty()
            .launch_picker(&PickerOptions::default())
            .await
            .unwrap();
        assert_eq!(outcome, PickerOutcome::Cancelled);
    }

    #[tokio::test]
    async fn test_pick_png_recompresses_to_jpeg() {
        let path = temp_path("leaf.png");
        write_png(&path);

        let outcome = FileLibrary::new(&path)
            .launch_picker(&PickerOptions::default())
            .await
            .unwrap();

        match outcome {
            PickerOutcome::Picked(asset) => {
                assert_eq!(asset.mime_type.as_deref(), Some("image/jpeg"));
                let bytes = STANDARD.decode(asset.base64.unwrap()).unwrap();
                assert_eq!(media::sniff_mime(&bytes), Some("image/jpeg"));
                assert_eq!(asset.uri, Some(path.clone()));
            }
            PickerOutcome::Cancelled => panic!("expected a picked asset"),
        }
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_reference_only_keeps_sniffed_mime() {
        let path = temp_path("leaf.bin");
        write_png(&path);

        let outcome = FileLibrary::new(&path)
            .with_inline_base64(false)
            .launch_picker(&PickerOptions::default())
            .await
            .unwrap();

        match outcome {
            PickerOutcome::Picked(asset) => {
                assert!(asset.base64.is_none());
                assert_eq!(asset.mime_type.as_deref(), Some("image/png"));
            }
            PickerOutcome::Cancelled => panic!("expected a picked asset"),
        }
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_undecodable_file_kept_as_is() {
        let path = temp_path("blob.jpg");
        std::fs::write(&path, b"ABC").unwrap();

        let outcome = FileLibrary::new(&path)
            .launch_picker(&PickerOptions::default())
            .await
            .unwrap();

        match outcome {
            PickerOutcome::Picked(asset) => {
                assert_eq!(asset.base64.as_deref(), Some("QUJD"));
                assert_eq!(asset.mime_type.as_deref(), Some("image/jpeg"));
            }
            PickerOutcome::Cancelled => panic!("expected a picked asset"),
        }
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_missing_file_returns_reference() {
        let path = temp_path("missing.jpg");
        let outcome = FileLibrary::new(&path)
            .launch_picker(&PickerOptions::default())
            .await
            .unwrap();

        match outcome {
            PickerOutcome::Picked(asset) => {
                assert!(asset.base64.is_none());
                assert_eq!(asset.uri, Some(path));
            }
            PickerOutcome::Cancelled => panic!("expected a picked asset"),
        }
    }
}
