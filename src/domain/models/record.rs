use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::detection::display_percent;
use super::image::ImageDescriptor;

/// Device location attached to a saved detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// A successful result the user chose to keep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptedDetection {
    pub image: ImageDescriptor,
    pub category: String,
    pub category_label: String,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

impl AcceptedDetection {
    /// Payload for `POST /detecciones/`
    pub fn into_record(self, location: Option<GeoPoint>, tacho: Option<i64>) -> DetectionRecord {
        DetectionRecord {
            tacho,
            clasificacion: self.category,
            confianza_ia: display_percent(self.confidence),
            ubicacion_lat: location.map(|p| p.lat),
            ubicacion_lon: location.map(|p| p.lon),
            descripcion: format!("Detección IA: {}", self.category_label),
            imagen_base64: self.image.inline_payload().map(str::to_string),
        }
    }
}

/// Detection as stored by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub tacho: Option<i64>,
    pub clasificacion: String,
    pub confianza_ia: u8,
    pub ubicacion_lat: Option<f64>,
    pub ubicacion_lon: Option<f64>,
    pub descripcion: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imagen_base64: Option<String>,
}
