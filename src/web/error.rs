use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use sea_orm::DbErr;
use thiserror::Error;

use super::{
    extract::FormError,
    templates::{BadRequestPage, NotFoundPage, ServerErrorPage},
};

#[derive(Error, Debug)]
pub enum PageError {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),
    #[error("Not found")]
    NotFound,
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("Could not render template: {0}")]
    Render(#[from] askama::Error),
}

impl PageError {
    fn status(&self) -> StatusCode {
        match self {
            PageError::NotFound => StatusCode::NOT_FOUND,
            PageError::Form(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.status();
        let page = match self {
            PageError::NotFound => NotFoundPage.render(),
            PageError::Form(e) => {
                tracing::debug!(error = %e, "Rejected form submission");
                BadRequestPage.render()
            }
            _ => {
                tracing::error!(error = %self, "Could not serve page");
                ServerErrorPage.render()
            }
        };
        match page {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Could not render error page");
                (status, status.canonical_reason().unwrap_or_default()).into_response()
            }
        }
    }
}
