use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::upstream::FetchError;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Upstream error: {0}")]
    Upstream(#[from] FetchError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Validation(e) => {
                let messages: Vec<String> = e
                    .field_errors()
                    .into_iter()
                    .map(|(field, errors)| {
                        let msgs: Vec<&str> = errors
                            .iter()
                            .filter_map(|err| err.message.as_ref().map(|m| m.as_ref()))
                            .collect();
                        if msgs.is_empty() {
                            let codes: Vec<&str> =
                                errors.iter().map(|err| err.code.as_ref()).collect();
                            format!("{}: {}", field, codes.join(", "))
                        } else {
                            format!("{}: {}", field, msgs.join(", "))
                        }
                    })
                    .collect();
                (StatusCode::BAD_REQUEST, messages.join("; "))
            }
            AppError::Upstream(e) => match e.status() {
                Some(401) => (StatusCode::UNAUTHORIZED, "Upstream rejected credentials".into()),
                Some(403) => (StatusCode::FORBIDDEN, "Upstream denied access".into()),
                Some(404) => (StatusCode::NOT_FOUND, "Upstream resource not found".into()),
                _ => {
                    tracing::error!("Upstream error: {}", e);
                    (StatusCode::BAD_GATEWAY, "School API unavailable".into())
                }
            },
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
