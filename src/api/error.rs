use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use thiserror::Error;

use super::{auth::AuthError, envelope::ErrorBody};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),

    #[error("Not found")]
    NotFound,
    #[error("Unprocessable entity: {0}")]
    Unprocessable(String),
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Could not authorize request: {0}")]
    Auth(#[from] AuthError),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Auth(e) => e.status(),
            Error::DbErr(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Error::Auth(e) if e.status() == StatusCode::UNAUTHORIZED => e.to_string(),
            Error::NotFound => "resource not found".to_string(),
            Error::Unprocessable(_) => "unprocessable".to_string(),
            Error::BadRequest(_) => "bad request".to_string(),
            _ => "internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, %status, "Request rejected");
        }
        let body = ErrorBody {
            success: false,
            error: status.as_u16(),
            message: self.message(),
        };
        (status, Json(body)).into_response()
    }
}
