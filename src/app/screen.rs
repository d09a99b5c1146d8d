//! One capture/detection screen
//!
//! Drives acquire -> encode -> detect -> normalize against a
//! [`PresentationState`]. Acquisition and encoding errors come back as
//! alerts and leave the state where it was; a transport failure is
//! alerted and reverts to `Captured`; every normalized result is stored
//! in `Done`.

use std::sync::Arc;

use crate::domain::models::{AcceptedDetection, EncodedImage};
use crate::domain::services::{AnalysisTicket, Applied, PresentationState, encode, normalize};
use crate::infrastructure::acquisition::{Acquired, ImageAcquisition};
use crate::infrastructure::api::{DetectReply, Detector};
use crate::shared::errors::UserAlert;

pub const NO_IMAGE_MESSAGE: &str = "No hay imagen para analizar";
pub const NOT_READY_MESSAGE: &str = "Espera a que termine el análisis actual";

/// What a user action did to the screen
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenOutcome {
    /// State changed; re-render
    Updated,
    Unchanged,
    /// Show a blocking alert
    Alert(UserAlert),
}

pub struct DetectionScreen {
    state: PresentationState,
    acquisition: ImageAcquisition,
    detector: Arc<dyn Detector>,
}

impl DetectionScreen {
    pub fn new(acquisition: ImageAcquisition, detector: Arc<dyn Detector>) -> Self {
        Self {
            state: PresentationState::new(),
            acquisition,
            detector,
        }
    }

    pub fn state(&self) -> &PresentationState {
        &self.state
    }

    pub fn is_camera_active(&self) -> bool {
        self.acquisition.is_camera_active()
    }

    pub async fn start_camera(&mut self) -> ScreenOutcome {
        match self.acquisition.start_camera().await {
            Ok(()) => ScreenOutcome::Updated,
            Err(e) => ScreenOutcome::Alert(e.user_alert()),
        }
    }

    /// Take a photo and hold it for analysis
    pub async fn capture(&mut self) -> ScreenOutcome {
        let image = match self.acquisition.capture().await {
            Ok(image) => image,
            Err(e) => return ScreenOutcome::Alert(e.user_alert()),
        };
        if !self.state.acquire(image) {
            return ScreenOutcome::Unchanged;
        }
        self.acquisition.stop_camera();
        ScreenOutcome::Updated
    }

    /// Pick an image from the library; a dismissed picker changes nothing
    pub async fn pick_from_library(&mut self) -> ScreenOutcome {
        match self.acquisition.pick_from_library().await {
            Ok(Acquired::Image(image)) => {
                if self.state.acquire(image) {
                    ScreenOutcome::Updated
                } else {
                    ScreenOutcome::Unchanged
                }
            }
            Ok(Acquired::Cancelled) => ScreenOutcome::Unchanged,
            Err(e) => ScreenOutcome::Alert(e.user_alert()),
        }
    }

    /// Encode the held image and move to `Analyzing`
    ///
    /// Encoding happens before the transition, so an encoding error
    /// leaves the state in `Captured`.
    pub async fn prepare_submission(
        &mut self,
    ) -> std::result::Result<(AnalysisTicket, EncodedImage), UserAlert> {
        let Some(image) = self.state.image() else {
            return Err(UserAlert::new("Error", NO_IMAGE_MESSAGE));
        };
        if !self.state.can_submit() {
            return Err(UserAlert::new("Error", NOT_READY_MESSAGE));
        }

        let encoded = encode(image).await.map_err(|e| e.user_alert())?;
        let ticket = self
            .state
            .begin_analysis()
            .ok_or_else(|| UserAlert::new("Error", NOT_READY_MESSAGE))?;
        Ok((ticket, encoded))
    }

    /// Apply a detection reply obtained with `ticket`
    pub fn apply_reply(&mut self, ticket: AnalysisTicket, reply: DetectReply) -> ScreenOutcome {
        match reply {
            DetectReply::Response(raw) => match self.state.complete(ticket, normalize(&raw)) {
                Applied::Applied => ScreenOutcome::Updated,
                Applied::Stale | Applied::Rejected => ScreenOutcome::Unchanged,
            },
            DetectReply::TransportFailure(failure) => match self.state.transport_failed(ticket) {
                Applied::Applied => ScreenOutcome::Alert(UserAlert::new("Error", failure.message)),
                Applied::Stale | Applied::Rejected => ScreenOutcome::Unchanged,
            },
        }
    }

    /// Send the held image to the detector and store the outcome
    pub async fn submit(&mut self) -> ScreenOutcome {
        let (ticket, encoded) = match self.prepare_submission().await {
            Ok(prepared) => prepared,
            Err(alert) => return ScreenOutcome::Alert(alert),
        };
        let reply = self.detector.detect(encoded.as_str()).await;
        self.apply_reply(ticket, reply)
    }

    pub fn reset(&mut self) -> ScreenOutcome {
        if self.state.reset() {
            ScreenOutcome::Updated
        } else {
            ScreenOutcome::Unchanged
        }
    }

    /// Screen dismissed; late replies for earlier tickets are dropped
    pub fn close(&mut self) {
        self.acquisition.stop_camera();
        self.state.close();
    }

    pub fn accept(&mut self) -> Option<AcceptedDetection> {
        self.state.accept()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::domain::models::{CategoryKey, DetectionResult};
    use crate::domain::services::Phase;
    use crate::infrastructure::acquisition::PickedAsset;
    use crate::infrastructure::acquisition::fakes::{FakeCamera, FakeLibrary};
    use crate::infrastructure::api::network::TIMEOUT_MESSAGE;
    use crate::infrastructure::api::{DetectionClient, TransportFailure};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    struct FakeDetector {
        reply: DetectReply,
        seen: Mutex<Vec<String>>,
    }

    impl FakeDetector {
        fn replying(body: serde_json::Value) -> Arc<Self> {
            Arc::new(Self {
                reply: DetectReply::Response(body.into()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: DetectReply::TransportFailure(TransportFailure::new(message)),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Detector for FakeDetector {
        async fn detect(&self, image: &str) -> DetectReply {
            self.seen.lock().unwrap().push(image.to_string());
            self.reply.clone()
        }
    }

    fn success_body() -> serde_json::Value {
        json!({
            "success": true,
            "clasificacion_principal": {"categoria": "organico", "confianza": 92.4},
            "top_predicciones": [
                {"categoria": "organico", "confianza": 92.4},
                {"categoria": "reciclable", "confianza": 5.1}
            ]
        })
    }

    async fn captured_screen(detector: Arc<dyn Detector>) -> DetectionScreen {
        let acquisition = ImageAcquisition::new().with_camera(Arc::new(FakeCamera::granted()));
        let mut screen = DetectionScreen::new(acquisition, detector);
        assert_eq!(screen.start_camera().await, ScreenOutcome::Updated);
        assert_eq!(screen.capture().await, ScreenOutcome::Updated);
        screen
    }

    #[tokio::test]
    async fn test_capture_and_detect_success() {
        let detector = FakeDetector::replying(success_body());
        let mut screen = captured_screen(detector.clone()).await;
        assert!(!screen.is_camera_active());
        assert_eq!(screen.state().phase(), Phase::Captured);

        assert_eq!(screen.submit().await, ScreenOutcome::Updated);
        assert_eq!(screen.state().phase(), Phase::Done);
        let result = screen.state().result().unwrap();
        assert_eq!(result.category_key(), Some(CategoryKey::Organico));
        assert_eq!(result.display_confidence(), Some(92));
        assert_eq!(result.top_display_predictions().len(), 2);

        let seen = detector.seen.lock().unwrap();
        assert_eq!(seen.as_slice(), ["data:image/jpeg;base64,RlJBTUU="]);
    }

    #[tokio::test]
    async fn test_no_detection_lands_in_done() {
        let detector = FakeDetector::replying(json!({"success": false, "no_detection": true}));
        let mut screen = captured_screen(detector).await;

        assert_eq!(screen.submit().await, ScreenOutcome::Updated);
        assert_eq!(screen.state().phase(), Phase::Done);
        assert!(matches!(
            screen.state().result(),
            Some(DetectionResult::NoDetection { .. })
        ));
        assert!(screen.accept().is_none());
    }

    #[tokio::test]
    async fn test_transport_failure_reverts_to_captured() {
        let detector = FakeDetector::failing(TIMEOUT_MESSAGE);
        let mut screen = captured_screen(detector.clone()).await;

        assert_eq!(
            screen.submit().await,
            ScreenOutcome::Alert(UserAlert::new("Error", TIMEOUT_MESSAGE))
        );
        assert_eq!(screen.state().phase(), Phase::Captured);
        assert!(screen.state().result().is_none());

        // Same image can be resubmitted without reacquiring
        screen.submit().await;
        assert_eq!(detector.seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_submit_without_image() {
        let acquisition = ImageAcquisition::new();
        let mut screen = DetectionScreen::new(acquisition, FakeDetector::replying(success_body()));

        assert_eq!(
            screen.submit().await,
            ScreenOutcome::Alert(UserAlert::new("Error", NO_IMAGE_MESSAGE))
        );
        assert_eq!(screen.state().phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_encoding_failure_keeps_captured() {
        let library = FakeLibrary {
            inline: false,
            ..FakeLibrary::picking(PickedAsset {
                base64: None,
                uri: Some("/nonexistent/waste-lens/photo.jpg".into()),
                mime_type: None,
            })
        };
        let acquisition = ImageAcquisition::new().with_library(Arc::new(library));
        let detector = FakeDetector::replying(success_body());
        let mut screen = DetectionScreen::new(acquisition, detector.clone());

        assert_eq!(screen.pick_from_library().await, ScreenOutcome::Updated);
        match screen.submit().await {
            ScreenOutcome::Alert(alert) => {
                assert_eq!(alert.message, "No se pudo procesar la imagen seleccionada")
            }
            other => panic!("expected alert, got {:?}", other),
        }
        assert_eq!(screen.state().phase(), Phase::Captured);
        assert!(detector.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_pick_changes_nothing() {
        let acquisition = ImageAcquisition::new().with_library(Arc::new(FakeLibrary::cancelling()));
        let mut screen = DetectionScreen::new(acquisition, FakeDetector::replying(success_body()));

        assert_eq!(screen.pick_from_library().await, ScreenOutcome::Unchanged);
        assert_eq!(screen.state().phase(), Phase::Idle);
        assert!(screen.state().image().is_none());
    }

    #[tokio::test]
    async fn test_cancelled_pick_keeps_previous_image() {
        let detector = FakeDetector::replying(success_body());
        let acquisition = ImageAcquisition::new()
            .with_camera(Arc::new(FakeCamera::granted()))
            .with_library(Arc::new(FakeLibrary::cancelling()));
        let mut screen = DetectionScreen::new(acquisition, detector);
        screen.start_camera().await;
        screen.capture().await;
        let before = screen.state().image().cloned();

        assert_eq!(screen.pick_from_library().await, ScreenOutcome::Unchanged);
        assert_eq!(screen.state().phase(), Phase::Captured);
        assert_eq!(screen.state().image().cloned(), before);
    }

    #[tokio::test]
    async fn test_camera_permission_denied_alert() {
        let acquisition = ImageAcquisition::new().with_camera(Arc::new(FakeCamera::refusing()));
        let mut screen = DetectionScreen::new(acquisition, FakeDetector::replying(success_body()));

        assert_eq!(
            screen.start_camera().await,
            ScreenOutcome::Alert(UserAlert::new(
                "Permiso Denegado",
                "Se necesita acceso a la cámara"
            ))
        );
        assert_eq!(screen.state().phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_reply_after_close_is_discarded() {
        let mut screen = captured_screen(FakeDetector::replying(success_body())).await;
        let (ticket, _encoded) = screen.prepare_submission().await.unwrap();
        assert_eq!(screen.state().phase(), Phase::Analyzing);

        screen.close();
        let late = DetectReply::Response(success_body().into());
        assert_eq!(screen.apply_reply(ticket, late), ScreenOutcome::Unchanged);
        assert_eq!(screen.state().phase(), Phase::Idle);
        assert!(screen.state().result().is_none());
    }

    #[tokio::test]
    async fn test_accept_then_idle() {
        let mut screen = captured_screen(FakeDetector::replying(success_body())).await;
        screen.submit().await;

        let accepted = screen.accept().unwrap();
        assert_eq!(accepted.category, "organico");
        assert_eq!(accepted.category_label, "ORGÁNICO");
        assert_eq!(screen.state().phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_reset_from_done() {
        let mut screen = captured_screen(FakeDetector::replying(success_body())).await;
        screen.submit().await;
        assert_eq!(screen.reset(), ScreenOutcome::Updated);
        assert_eq!(screen.state().phase(), Phase::Idle);
        assert!(screen.state().image().is_none());
    }

    #[tokio::test]
    async fn test_real_client_timeout_reverts_to_captured() {
        use axum::Router;
        use axum::routing::post;

        let app = Router::new().route(
            "/api/ia/detect/",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = AppConfig::default()
            .with_api_base_url(format!("http://{}/api", addr))
            .with_detect_timeout(Duration::from_millis(200));
        let client = Arc::new(DetectionClient::new(&config).unwrap());
        let mut screen = captured_screen(client).await;

        match screen.submit().await {
            ScreenOutcome::Alert(alert) => assert_eq!(alert.message, TIMEOUT_MESSAGE),
            other => panic!("expected alert, got {:?}", other),
        }
        assert_eq!(screen.state().phase(), Phase::Captured);
        assert!(screen.state().result().is_none());
    }
}
