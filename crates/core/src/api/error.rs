use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a backend call, already phrased for the error banner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("could not reach the analysis server: {0}")]
    Transport(String),

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("{0}")]
    Application(String),
}

impl ApiError {
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        ApiError::Status {
            status: status.as_u16(),
            message: error_message_from_body(status, body),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

/// Best human-readable message for a non-2xx response: a JSON `message` (or `error`)
/// field, then the raw body, then the status text.
pub fn error_message_from_body(status: StatusCode, body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(msg) = map.get(key).and_then(|v| v.as_str()) {
                let msg = msg.trim();
                if !msg.is_empty() {
                    return msg.to_string();
                }
            }
        }
    }

    let raw = body.trim();
    if !raw.is_empty() {
        return raw.to_string();
    }

    match status.canonical_reason() {
        Some(reason) => format!("HTTP {} {reason}", status.as_u16()),
        None => format!("HTTP {}", status.as_u16()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_structured_message() {
        let msg = error_message_from_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"status": "error", "message": "Falha ao gerar relatório no sistema."}"#,
        );
        assert_eq!(msg, "Falha ao gerar relatório no sistema.");
    }

    #[test]
    fn accepts_error_key() {
        let msg = error_message_from_body(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error": "setores indisponíveis"}"#);
        assert_eq!(msg, "setores indisponíveis");
    }

    #[test]
    fn falls_back_to_raw_body() {
        let msg = error_message_from_body(StatusCode::BAD_GATEWAY, "upstream timed out\n");
        assert_eq!(msg, "upstream timed out");

        let msg = error_message_from_body(StatusCode::BAD_REQUEST, r#"{"message": ""}"#);
        assert_eq!(msg, r#"{"message": ""}"#);
    }

    #[test]
    fn falls_back_to_status_text() {
        let msg = error_message_from_body(StatusCode::SERVICE_UNAVAILABLE, "  ");
        assert_eq!(msg, "HTTP 503 Service Unavailable");
    }

    #[test]
    fn display_is_the_banner_text() {
        let err = ApiError::from_response(StatusCode::NOT_FOUND, r#"{"message": "Empresa não encontrada"}"#);
        assert_eq!(err.to_string(), "Empresa não encontrada");
    }
}
