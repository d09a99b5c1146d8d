// Domain models: pure data, no I/O

pub mod category;
pub mod detection;
pub mod image;
pub mod record;

pub use category::{CategoryInfo, CategoryKey};
pub use detection::{
    CONNECTION_SUGGESTIONS, DEFAULT_NO_DETECTION_SUGGESTIONS, DetectionResult, NO_DETECTION_MESSAGE,
    Prediction, RawResponse, SERVER_ERROR_MESSAGE, UNEXPECTED_RESPONSE_MESSAGE,
};
pub use image::{
    CAPTURE_QUALITY, DEFAULT_MIME_TYPE, EncodedImage, ImageDescriptor, SUPPORTED_IMAGE_TYPES,
};
pub use record::{AcceptedDetection, DetectionRecord, GeoPoint};
