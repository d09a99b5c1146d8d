//! Camera and media-library seams
//!
//! Platform integrations implement these traits; the acquisition service
//! only talks to them through permission requests and capture/pick calls.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::models::CAPTURE_QUALITY;
use crate::shared::errors::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionStatus {
    Granted,
    Denied,
    #[default]
    Undetermined,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}

/// Options passed to the camera for a still frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureOptions {
    pub quality: f32,
    pub base64: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            quality: CAPTURE_QUALITY,
            base64: true,
        }
    }
}

/// Options passed to the system picker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickerOptions {
    pub quality: f32,
    pub base64: bool,
    pub images_only: bool,
    pub allows_editing: bool,
}

impl Default for PickerOptions {
    fn default() -> Self {
        Self {
            quality: CAPTURE_QUALITY,
            base64: true,
            images_only: true,
            allows_editing: false,
        }
    }
}

/// Raw asset returned by a camera or picker
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PickedAsset {
    pub base64: Option<String>,
    pub uri: Option<PathBuf>,
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PickerOutcome {
    Picked(PickedAsset),
    Cancelled,
}

#[async_trait]
pub trait CameraDevice: Send + Sync {
    async fn permission_status(&self) -> PermissionStatus;

    async fn request_permission(&self) -> PermissionStatus;

    /// Take one still frame from an open session
    async fn take_picture(&self, options: &CaptureOptions) -> Result<PickedAsset>;
}

#[async_trait]
pub trait MediaLibrary: Send + Sync {
    async fn request_permission(&self) -> PermissionStatus;

    /// Whether the picker can return inline base64
    fn supports_inline_base64(&self) -> bool {
        true
    }

    async fn launch_picker(&self, options: &PickerOptions) -> Result<PickerOutcome>;
}
