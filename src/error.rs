use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::content::ContentError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Content error: {0}")]
    Content(#[from] ContentError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),

            AppError::InvalidQuery(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                axum::Json(serde_json::json!({ "err": err })),
            )
                .into_response(),

            AppError::Template(err) => {
                tracing::error!(?err, "could not render template");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }

            AppError::Content(err) => {
                tracing::error!(%err, "content store unavailable");
                (StatusCode::BAD_GATEWAY, "Content unavailable").into_response()
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(AppError::NotFound.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::InvalidQuery("bad".into()).into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::Template(tera::Error::msg("boom")).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let err = ContentError::Status {
            status: reqwest::StatusCode::BAD_REQUEST,
            body: "syntax error".into(),
        };
        assert_eq!(
            AppError::Content(err).into_response().status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
