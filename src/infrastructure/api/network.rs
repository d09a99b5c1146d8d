//! User-facing messages for network failures

use std::error::Error as StdError;

use crate::domain::models::SERVER_ERROR_MESSAGE;

pub const TIMEOUT_MESSAGE: &str = "Conexión tardó demasiado - servidor no responde";
pub const HOST_NOT_FOUND_MESSAGE: &str = "Servidor no encontrado - verifica la dirección IP";
pub const CONNECTION_REFUSED_MESSAGE: &str = "Conexión rechazada - servidor offline";
pub const CONNECTION_ERROR_MESSAGE: &str = "Error de conexión";
pub const GARBLED_RESPONSE_MESSAGE: &str = "Respuesta inválida del servidor";

fn is_dns_failure(error: &reqwest::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = error.source();
    while let Some(err) = source {
        let text = err.to_string().to_lowercase();
        if text.contains("dns error") || text.contains("failed to lookup") {
            return true;
        }
        source = err.source();
    }
    false
}

/// Message for a request that produced no usable response
pub fn describe_request_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        TIMEOUT_MESSAGE.to_string()
    } else if error.is_connect() {
        if is_dns_failure(error) {
            HOST_NOT_FOUND_MESSAGE.to_string()
        } else {
            CONNECTION_REFUSED_MESSAGE.to_string()
        }
    } else if let Some(status) = error.status() {
        status_message(status.as_u16())
    } else if error.is_decode() || error.is_body() {
        GARBLED_RESPONSE_MESSAGE.to_string()
    } else {
        CONNECTION_ERROR_MESSAGE.to_string()
    }
}

/// Message for an error status that came without a JSON body
pub fn status_message(status: u16) -> String {
    match status {
        404 => "Recurso no encontrado (404)".to_string(),
        500 => "Error en el servidor (500)".to_string(),
        _ => SERVER_ERROR_MESSAGE.to_string(),
    }
}
