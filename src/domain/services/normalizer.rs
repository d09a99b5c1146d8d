//! Result normalizer
//!
//! Maps the heterogeneous detection response onto [`DetectionResult`].
//! The body is first decoded into an explicit wire shape; every branch
//! validates the fields it needs and anything else degrades to
//! `Failure`. Never panics, never performs I/O (beyond a diagnostic log
//! line for unknown shapes).

use serde::Deserialize;
use serde_json::Value;

use crate::domain::models::category::{self, CategoryInfo};
use crate::domain::models::detection::{
    DEFAULT_NO_DETECTION_SUGGESTIONS, NO_DETECTION_MESSAGE, UNEXPECTED_RESPONSE_MESSAGE,
    to_owned_list,
};
use crate::domain::models::{DetectionResult, Prediction, RawResponse};
use crate::shared::logging;

/// Top-level fields the endpoint may send; all optional, typed loosely
#[derive(Debug, Default, Deserialize)]
struct WireResponse {
    #[serde(default)]
    success: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    message: Option<Value>,
    #[serde(default)]
    no_detection: Option<Value>,
    #[serde(default)]
    suggestions: Option<Value>,
    #[serde(default)]
    clasificacion_principal: Option<Value>,
    #[serde(default)]
    category_info: Option<Value>,
    #[serde(default)]
    top_predicciones: Option<Value>,
    #[serde(default)]
    predictions: Option<Value>,
}

/// `{categoria, confianza}` entry of the primary endpoint
#[derive(Debug, Deserialize)]
struct WirePrediction {
    categoria: String,
    confianza: f64,
}

/// `{class, confidence}` entry of the alternate endpoint (0-1 scale)
#[derive(Debug, Deserialize)]
struct WireFractionPrediction {
    class: String,
    #[serde(alias = "score")]
    confidence: f64,
}

/// Interpretation of the `success` flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SuccessFlag {
    True,
    False,
    Missing,
}

impl WireResponse {
    fn success_flag(&self) -> SuccessFlag {
        match self.success.as_ref() {
            Some(Value::Bool(true)) => SuccessFlag::True,
            Some(Value::Bool(false)) => SuccessFlag::False,
            _ => SuccessFlag::Missing,
        }
    }

    fn has_error(&self) -> bool {
        error_value(self.error.as_ref()).is_some()
    }

    fn is_no_detection(&self) -> bool {
        matches!(self.no_detection, Some(Value::Bool(true)))
    }
}

/// Convert a 0-1 fraction to the 0-100 scale used internally
pub fn fraction_to_percent(confidence: f64) -> f64 {
    if (0.0..=1.0).contains(&confidence) {
        confidence * 100.0
    } else {
        confidence
    }
}

/// The `error` field if it carries something; null and blank strings count as absent
pub fn error_value(value: Option<&Value>) -> Option<&Value> {
    match value? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        other => Some(other),
    }
}

fn value_to_message(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Suggestions from the server, or the default list when absent or empty
pub fn suggestions_or_default(value: Option<&Value>) -> Vec<String> {
    let suggestions = string_list(value);
    if suggestions.is_empty() {
        to_owned_list(DEFAULT_NO_DETECTION_SUGGESTIONS)
    } else {
        suggestions
    }
}

fn parse_predictions(value: Option<&Value>) -> Vec<Prediction> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| serde_json::from_value::<WirePrediction>(item.clone()).ok())
            .map(|p| Prediction::new(p.categoria, p.confianza))
            .collect(),
        _ => Vec::new(),
    }
}

fn resolve_category_info(server_info: Option<&Value>, category: &str) -> CategoryInfo {
    server_info
        .filter(|v| v.is_object())
        .and_then(|v| serde_json::from_value::<CategoryInfo>(v.clone()).ok())
        .unwrap_or_else(|| category::lookup(category).clone())
}

fn unexpected(raw: &RawResponse) -> DetectionResult {
    logging::log_unexpected_shape(&raw.keys());
    DetectionResult::failure(UNEXPECTED_RESPONSE_MESSAGE)
}

fn normalize_primary(wire: &WireResponse, primary: &Value) -> Option<DetectionResult> {
    let primary: WirePrediction = serde_json::from_value(primary.clone()).ok()?;
    let category_info = resolve_category_info(wire.category_info.as_ref(), &primary.categoria);

    Some(DetectionResult::Success {
        top_predictions: parse_predictions(wire.top_predicciones.as_ref()),
        category: primary.categoria,
        confidence: primary.confianza,
        category_info,
    })
}

fn normalize_fraction_shape(wire: &WireResponse) -> Option<DetectionResult> {
    let Some(Value::Array(items)) = wire.predictions.as_ref() else {
        return None;
    };

    let mut predictions: Vec<Prediction> = items
        .iter()
        .filter_map(|item| serde_json::from_value::<WireFractionPrediction>(item.clone()).ok())
        .map(|p| Prediction::new(p.class, fraction_to_percent(p.confidence)))
        .collect();
    predictions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let main = predictions.first()?.clone();
    Some(DetectionResult::Success {
        category_info: category::lookup_lowercase(&main.category).clone(),
        category: main.category,
        confidence: main.confidence,
        top_predictions: predictions,
    })
}

/// Normalize one raw response
pub fn normalize(raw: &RawResponse) -> DetectionResult {
    if !raw.as_value().is_object() {
        return unexpected(raw);
    }

    let wire: WireResponse = match serde_json::from_value(raw.as_value().clone()) {
        Ok(wire) => wire,
        Err(_) => return unexpected(raw),
    };

    let flag = wire.success_flag();

    if flag == SuccessFlag::False && wire.has_error() {
        let message = error_value(wire.error.as_ref())
            .map(value_to_message)
            .unwrap_or_default();
        return DetectionResult::Failure {
            message,
            suggestions: string_list(wire.suggestions.as_ref()),
        };
    }

    if flag == SuccessFlag::False && wire.is_no_detection() {
        return DetectionResult::NoDetection {
            message: non_empty_string(wire.message.as_ref())
                .unwrap_or_else(|| NO_DETECTION_MESSAGE.to_string()),
            suggestions: suggestions_or_default(wire.suggestions.as_ref()),
        };
    }

    if flag == SuccessFlag::True {
        if let Some(result) = wire
            .clasificacion_principal
            .as_ref()
            .and_then(|primary| normalize_primary(&wire, primary))
        {
            return result;
        }
    }

    if flag != SuccessFlag::False && wire.clasificacion_principal.is_none() {
        if let Some(result) = normalize_fraction_shape(&wire) {
            return result;
        }
    }

    unexpected(raw)
}
