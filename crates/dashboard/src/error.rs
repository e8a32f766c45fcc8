use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use core_types::CoreError;
use loader::LoaderError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error("Invalid filter: {0}")]
    Filter(#[from] CoreError),
    #[error("Invalid filter: {0}")]
    InvalidQuery(String),
}

impl AppError {
    /// The HTTP status a request failing with this error answers with.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Loader(LoaderError::DataUnavailable { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Loader(LoaderError::MalformedInput { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Loader(LoaderError::Io { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Filter(_) | AppError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// The message shown to the user. Data problems name the file at fault.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Loader(LoaderError::Io { table, .. }) => {
                format!("The {table} file could not be read.")
            }
            other => other.to_string(),
        }
    }

    /// Logs the error at a level matching its status.
    pub fn log(&self) {
        if self.status().is_server_error() {
            tracing::error!(error = ?self, "Request failed.");
        } else {
            tracing::warn!(error = %self, "Request rejected.");
        }
    }
}

/// Converts our custom `AppError` into a JSON error response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let body = Json(json!({ "error": self.user_message() }));
        (self.status(), body).into_response()
    }
}
