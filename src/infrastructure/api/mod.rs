// HTTP clients for the inference service and the main backend

pub mod backend;
pub mod detection_client;
pub mod network;
pub mod session;

pub use backend::BackendClient;
pub use detection_client::{DetectReply, DetectionClient, Detector, HealthStatus, TransportFailure};
pub use session::{FileTokenStore, StaticTokenStore, TokenStore};
