//! Image acquisition
//!
//! Negotiates camera / media-library permissions and turns whatever the
//! device returns into an [`ImageDescriptor`]. Failures are reported to
//! the caller and never retried here.

pub mod device;
pub mod library;
pub mod media;

use std::sync::Arc;

pub use device::{
    CameraDevice, CaptureOptions, MediaLibrary, PermissionStatus, PickedAsset, PickerOptions,
    PickerOutcome,
};
pub use library::FileLibrary;

use crate::domain::models::ImageDescriptor;
use crate::domain::models::image::is_supported_type;
use crate::shared::errors::{PipelineError, Result};
use crate::shared::logging;

const CAMERA_RESOURCE: &str = "la cámara";
const LIBRARY_RESOURCE: &str = "la galería";

/// Result of a library pick
#[derive(Debug, Clone, PartialEq)]
pub enum Acquired {
    Image(ImageDescriptor),
    Cancelled,
}

pub struct ImageAcquisition {
    camera: Option<Arc<dyn CameraDevice>>,
    library: Option<Arc<dyn MediaLibrary>>,
    camera_active: bool,
}

impl ImageAcquisition {
    pub fn new() -> Self {
        Self {
            camera: None,
            library: None,
            camera_active: false,
        }
    }

    pub fn with_camera(mut self, camera: Arc<dyn CameraDevice>) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn with_library(mut self, library: Arc<dyn MediaLibrary>) -> Self {
        self.library = Some(library);
        self
    }

    pub fn is_camera_active(&self) -> bool {
        self.camera_active
    }

    /// Ensure camera permission and open the capture session
    pub async fn start_camera(&mut self) -> Result<()> {
        let camera = self
            .camera
            .as_ref()
            .ok_or_else(|| PipelineError::CaptureFailed("no camera available".to_string()))?;

        let mut status = camera.permission_status().await;
        if !status.is_granted() {
            status = camera.request_permission().await;
        }
        logging::log_permission("camera", status.is_granted());

        if !status.is_granted() {
            self.camera_active = false;
            return Err(PipelineError::PermissionDenied(CAMERA_RESOURCE.to_string()));
        }

        self.camera_active = true;
        Ok(())
    }

    pub fn stop_camera(&mut self) {
        self.camera_active = false;
    }

    /// Take a still frame from the open session
    pub async fn capture(&self) -> Result<ImageDescriptor> {
        let camera = match (&self.camera, self.camera_active) {
            (Some(camera), true) => camera,
            _ => {
                return Err(PipelineError::CaptureFailed(
                    "camera session not started".to_string(),
                ));
            }
        };

        let asset = camera
            .take_picture(&CaptureOptions::default())
            .await
            .map_err(|e| match e {
                PipelineError::CaptureFailed(_) => e,
                other => PipelineError::CaptureFailed(other.to_string()),
            })?;

        let descriptor = ImageDescriptor::new(asset.base64, asset.uri, asset.mime_type)
            .map_err(|_| PipelineError::CaptureFailed("camera returned an empty frame".to_string()))?;
        logging::log_image_acquired("camera", descriptor.mime_type(), descriptor.bytes_base64().is_some());
        Ok(descriptor)
    }

    /// Let the user choose an image from the media library
    pub async fn pick_from_library(&self) -> Result<Acquired> {
        let library = self
            .library
            .as_ref()
            .ok_or_else(|| PipelineError::PermissionDenied(LIBRARY_RESOURCE.to_string()))?;

        let status = library.request_permission().await;
        logging::log_permission("media_library", status.is_granted());
        if !status.is_granted() {
            return Err(PipelineError::PermissionDenied(LIBRARY_RESOURCE.to_string()));
        }

        let options = PickerOptions {
            base64: library.supports_inline_base64(),
            ..PickerOptions::default()
        };

        let asset = match library.launch_picker(&options).await? {
            PickerOutcome::Cancelled => {
                tracing::debug!("Picker dismissed");
                return Ok(Acquired::Cancelled);
            }
            PickerOutcome::Picked(asset) => asset,
        };

        if let Some(mime) = asset.mime_type.as_deref() {
            if !is_supported_type(mime) {
                tracing::warn!(mime_type = mime, "Rejected picked image with unsupported type");
                return Err(PipelineError::UnsupportedFormat(mime.to_string()));
            }
        }

        let descriptor = ImageDescriptor::new(asset.base64, asset.uri, asset.mime_type)?;
        logging::log_image_acquired(
            "media_library",
            descriptor.mime_type(),
            descriptor.bytes_base64().is_some(),
        );
        Ok(Acquired::Image(descriptor))
    }
}

impl Default for ImageAcquisition {
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::{FakeCamera, FakeLibrary};
    use super::*;

    #[tokio::test]
    async fn test_start_camera_and_capture() {
        let mut acq = ImageAcquisition::new().with_camera(Arc::new(FakeCamera::granted()));
        acq.start_camera().await.unwrap();
        assert!(acq.is_camera_active());

        let image = acq.capture().await.unwrap();
        assert_eq!(image.bytes_base64(), Some("RlJBTUU="));
        assert_eq!(image.mime_type(), "image/jpeg");
    }

    #[tokio::test]
    async fn test_camera_permission_denied() {
        let mut acq = ImageAcquisition::new().with_camera(Arc::new(FakeCamera::refusing()));
        let err = acq.start_camera().await.unwrap_err();
        assert!(matches!(err, PipelineError::PermissionDenied(_)));
        assert!(!acq.is_camera_active());
    }

    #[tokio::test]
    async fn test_capture_without_session_fails() {
        let acq = ImageAcquisition::new().with_camera(Arc::new(FakeCamera::granted()));
        let err = acq.capture().await.unwrap_err();
        assert!(matches!(err, PipelineError::CaptureFailed(_)));
    }

    #[tokio::test]
    async fn test_capture_sensor_failure() {
        let camera = FakeCamera {
            frame: None,
            ..FakeCamera::granted()
        };
        let mut acq = ImageAcquisition::new().with_camera(Arc::new(camera));
        acq.start_camera().await.unwrap();
        let err = acq.capture().await.unwrap_err();
        assert!(matches!(err, PipelineError::CaptureFailed(_)));
    }

    #[tokio::test]
    async fn test_pick_inline_asset() {
        let library = FakeLibrary::picking(PickedAsset {
            base64: Some("QUJD".into()),
            uri: None,
            mime_type: Some("image/png".into()),
        });
        let acq = ImageAcquisition::new().with_library(Arc::new(library));

        match acq.pick_from_library().await.unwrap() {
            Acquired::Image(image) => {
                assert_eq!(image.bytes_base64(), Some("QUJD"));
                assert_eq!(image.mime_type(), "image/png");
            }
            Acquired::Cancelled => panic!("expected an image"),
        }
    }

    #[tokio::test]
    async fn test_pick_reference_only_when_inline_unsupported() {
        let library = FakeLibrary {
            inline: false,
            ..FakeLibrary::picking(PickedAsset {
                base64: None,
                uri: Some("/tmp/photo.jpg".into()),
                mime_type: None,
            })
        };
        let acq = ImageAcquisition::new().with_library(Arc::new(library));

        match acq.pick_from_library().await.unwrap() {
            Acquired::Image(image) => {
                assert!(image.bytes_base64().is_none());
                assert_eq!(image.source_uri(), Some(std::path::Path::new("/tmp/photo.jpg")));
            }
            Acquired::Cancelled => panic!("expected an image"),
        }
    }

    #[tokio::test]
    async fn test_pick_cancelled() {
        let acq = ImageAcquisition::new().with_library(Arc::new(FakeLibrary::cancelling()));
        assert_eq!(acq.pick_from_library().await.unwrap(), Acquired::Cancelled);
    }

    #[tokio::test]
    async fn test_pick_permission_denied() {
        let library = FakeLibrary {
            status: PermissionStatus::Denied,
            ..FakeLibrary::cancelling()
        };
        let acq = ImageAcquisition::new().with_library(Arc::new(library));
        let err = acq.pick_from_library().await.unwrap_err();
        assert!(matches!(err, PipelineError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_pick_unsupported_format() {
        let library = FakeLibrary::picking(PickedAsset {
            base64: Some("R0lG".into()),
            uri: None,
            mime_type: Some("image/gif".into()),
        });
        let acq = ImageAcquisition::new().with_library(Arc::new(library));
        let err = acq.pick_from_library().await.unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat(m) if m == "image/gif"));
    }

    #[tokio::test]
    async fn test_pick_empty_asset_fails() {
        let library = FakeLibrary::picking(PickedAsset::default());
        let acq = ImageAcquisition::new().with_library(Arc::new(library));
        let err = acq.pick_from_library().await.unwrap_err();
        assert!(matches!(err, PipelineError::EncodingFailed(_)));
    }
}
