//! Structured logging for the detection pipeline
//!
//! Every stage logs through these helpers so that fields stay consistent
//! (`operation`, `attempt_id`, ...). Image payloads are never logged,
//! only their length.

/// Pipeline stage a log line belongs to
#[derive(Debug, Clone, Copy)]
pub enum LogOperation {
    Acquisition,
    Encoding,
    Detection,
    Normalization,
    Presentation,
    Persistence,
}

impl LogOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogOperation::Acquisition => "acquisition",
            LogOperation::Encoding => "encoding",
            LogOperation::Detection => "detection",
            LogOperation::Normalization => "normalization",
            LogOperation::Presentation => "presentation",
            LogOperation::Persistence => "persistence",
        }
    }
}

/// Install the global subscriber (binary only)
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Log a permission request outcome
pub fn log_permission(resource: &str, granted: bool) {
    if granted {
        tracing::debug!(
            operation = LogOperation::Acquisition.as_str(),
            resource = resource,
            "Permission granted"
        );
    } else {
        tracing::warn!(
            operation = LogOperation::Acquisition.as_str(),
            resource = resource,
            "Permission denied"
        );
    }
}

/// Log an acquired image
pub fn log_image_acquired(source: &str, mime_type: &str, inline: bool) {
    tracing::info!(
        operation = LogOperation::Acquisition.as_str(),
        source = source,
        mime_type = mime_type,
        inline_bytes = inline,
        "Image acquired"
    );
}

/// Log an encoding step
pub fn log_encoded(mime_type: &str, encoded_len: usize, passthrough: bool) {
    tracing::debug!(
        operation = LogOperation::Encoding.as_str(),
        mime_type = mime_type,
        encoded_len = encoded_len,
        passthrough = passthrough,
        "Image encoded"
    );
}

/// Log the start of a detection request
pub fn log_detection_start(attempt_id: &str, url: &str, payload_len: usize) {
    tracing::info!(
        operation = LogOperation::Detection.as_str(),
        attempt_id = attempt_id,
        url = url,
        payload_len = payload_len,
        "Sending image for classification"
    );
}

/// Log a received detection response
pub fn log_detection_response(attempt_id: &str, status: u16) {
    tracing::info!(
        operation = LogOperation::Detection.as_str(),
        attempt_id = attempt_id,
        status = status,
        "Detection response received"
    );
}

/// Log a transport-level failure (no response)
pub fn log_transport_failure(attempt_id: &str, error: &str) {
    tracing::error!(
        operation = LogOperation::Detection.as_str(),
        attempt_id = attempt_id,
        error = error,
        "Detection request failed"
    );
}

/// Log a response that matches none of the known shapes
pub fn log_unexpected_shape(keys: &[String]) {
    tracing::warn!(
        operation = LogOperation::Normalization.as_str(),
        keys = ?keys,
        "Unexpected detection response shape"
    );
}

/// Log a state machine transition
pub fn log_phase_transition(from: &str, to: &str) {
    tracing::debug!(
        operation = LogOperation::Presentation.as_str(),
        from = from,
        to = to,
        "Phase transition"
    );
}

/// Log a transition that is not allowed from the current phase
pub fn log_invalid_transition(phase: &str, action: &str) {
    tracing::warn!(
        operation = LogOperation::Presentation.as_str(),
        phase = phase,
        action = action,
        "Ignored action not valid in current phase"
    );
}

/// Log a result that arrived after its screen was reset or closed
pub fn log_stale_result_discarded(ticket_epoch: u64, current_epoch: u64) {
    tracing::info!(
        operation = LogOperation::Presentation.as_str(),
        ticket_epoch = ticket_epoch,
        current_epoch = current_epoch,
        "Discarded stale detection result"
    );
}

/// Log a persisted detection
pub fn log_detection_saved(category: &str, confidence: u8) {
    tracing::info!(
        operation = LogOperation::Persistence.as_str(),
        category = category,
        confidence = confidence,
        "Detection saved"
    );
}

/// Macro for creating a span around one detection attempt
#[macro_export]
macro_rules! attempt_span {
    ($attempt_id:expr) => {
        tracing::info_span!("detection_attempt", attempt_id = $attempt_id)
    };
}
