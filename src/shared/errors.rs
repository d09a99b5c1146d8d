use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Capture failed: {0}")]
    CaptureFailed(String),

    #[error("Encoding failed: {0}")]
    EncodingFailed(String),

    #[error("Unsupported image type: {0}")]
    UnsupportedFormat(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),
}

/// Title and body of a blocking alert shown by the screen layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAlert {
    pub title: String,
    pub message: String,
}

impl UserAlert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

impl PipelineError {
    /// Alert text shown to the user for this error
    pub fn user_alert(&self) -> UserAlert {
        match self {
            PipelineError::PermissionDenied(resource) => {
                UserAlert::new("Permiso Denegado", format!("Se necesita acceso a {}", resource))
            }
            PipelineError::CaptureFailed(_) => UserAlert::new("Error", "No se pudo capturar la foto"),
            PipelineError::EncodingFailed(_) | PipelineError::IoError(_) => {
                UserAlert::new("Error", "No se pudo procesar la imagen seleccionada")
            }
            PipelineError::UnsupportedFormat(mime) => UserAlert::new(
                "Formato no soportado",
                format!("Tipo no soportado: {}. Aceptados: JPEG, PNG, WebP", mime),
            ),
            PipelineError::Http { status, .. } => {
                UserAlert::new("Error", format!("Error del servidor ({})", status))
            }
            PipelineError::SerializationError(_) => {
                UserAlert::new("Error", "Respuesta inesperada del servidor")
            }
            PipelineError::RequestError(e) => {
                UserAlert::new("Error", crate::infrastructure::api::network::describe_request_error(e))
            }
        }
    }

    /// Whether the user can fix this by acquiring another image
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, PipelineError::PermissionDenied(_))
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
