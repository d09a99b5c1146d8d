use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::category::{self, CategoryInfo, CategoryKey};

/// Shown when the server reports no detection without its own message
pub const NO_DETECTION_MESSAGE: &str = "No se detectaron objetos";

/// Shown when an error response carries no message
pub const SERVER_ERROR_MESSAGE: &str = "Error del servidor";

/// Shown when a response matches none of the known shapes
pub const UNEXPECTED_RESPONSE_MESSAGE: &str = "Respuesta inesperada del servidor";

/// Suggestions shown with a no-detection result when the server sends none
pub const DEFAULT_NO_DETECTION_SUGGESTIONS: &[&str] = &[
    "Asegúrate de que el objeto esté bien iluminado",
    "Intenta acercar más la cámara al objeto",
    "Verifica que el objeto esté en el centro de la imagen",
];

/// Suggestions attached to transport failures
pub const CONNECTION_SUGGESTIONS: &[&str] = &[
    "Verifica tu conexión a internet",
    "Intenta de nuevo en unos momentos",
];

/// Number of predictions displayed in result panels
pub const DISPLAYED_PREDICTIONS: usize = 3;

pub fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Loosely typed JSON body returned by the detection endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawResponse(Value);

impl RawResponse {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Top-level keys, for diagnostics
    pub fn keys(&self) -> Vec<String> {
        self.0
            .as_object()
            .map(|obj| obj.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl From<Value> for RawResponse {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Confidence rounded and clamped to 0..=100 for bars and labels
pub fn display_percent(confidence: f64) -> u8 {
    if confidence.is_nan() {
        return 0;
    }
    confidence.round().clamp(0.0, 100.0) as u8
}

/// One entry of the ranked predictions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Raw category string as sent by the server
    pub category: String,
    /// Confidence on the 0-100 scale, unclamped
    pub confidence: f64,
}

impl Prediction {
    pub fn new(category: impl Into<String>, confidence: f64) -> Self {
        Self {
            category: category.into(),
            confidence,
        }
    }

    /// Display metadata, matched case-insensitively
    pub fn display_info(&self) -> &'static CategoryInfo {
        category::lookup_lowercase(&self.category)
    }

    pub fn display_confidence(&self) -> u8 {
        display_percent(self.confidence)
    }
}

/// Normalized outcome of one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetectionResult {
    Success {
        category: String,
        confidence: f64,
        top_predictions: Vec<Prediction>,
        category_info: CategoryInfo,
    },
    NoDetection {
        message: String,
        suggestions: Vec<String>,
    },
    Failure {
        message: String,
        #[serde(default)]
        suggestions: Vec<String>,
    },
}

impl DetectionResult {
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
            suggestions: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DetectionResult::Success { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DetectionResult::Success { .. } => "success",
            DetectionResult::NoDetection { .. } => "no_detection",
            DetectionResult::Failure { .. } => "failure",
        }
    }

    /// Known category key of a success, if the server used one
    pub fn category_key(&self) -> Option<CategoryKey> {
        match self {
            DetectionResult::Success { category, .. } => CategoryKey::from_key(category),
            _ => None,
        }
    }

    /// Rounded, clamped confidence of a success
    pub fn display_confidence(&self) -> Option<u8> {
        match self {
            DetectionResult::Success { confidence, .. } => Some(display_percent(*confidence)),
            _ => None,
        }
    }

    /// First predictions shown in the ranking panel
    pub fn top_display_predictions(&self) -> &[Prediction] {
        match self {
            DetectionResult::Success { top_predictions, .. } => {
                &top_predictions[..top_predictions.len().min(DISPLAYED_PREDICTIONS)]
            }
            _ => &[],
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            DetectionResult::Success { .. } => None,
            DetectionResult::NoDetection { message, .. } | DetectionResult::Failure { message, .. } => {
                Some(message.as_str())
            }
        }
    }

    pub fn suggestions(&self) -> &[String] {
        match self {
            DetectionResult::Success { .. } => &[],
            DetectionResult::NoDetection { suggestions, .. }
            | DetectionResult::Failure { suggestions, .. } => suggestions,
        }
    }
}
