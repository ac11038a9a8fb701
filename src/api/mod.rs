pub mod auth;
pub mod drinks;
pub mod envelope;
pub mod error;
pub mod extract;

use axum::{
    http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Router,
};
use sea_orm::DbConn;
use std::sync::Arc;
use time::UtcOffset;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use base::setting::{Settings, SettingsError};
pub use error::Error;

use crate::web;
use auth::Authority;

#[derive(Clone)]
pub struct AppState {
    pub db: DbConn,
    pub authority: Arc<Authority>,
    /// Zone show times are entered and displayed in.
    pub zone: UtcOffset,
}

impl AppState {
    pub fn new(db: DbConn, settings: &Settings) -> Result<Self, SettingsError> {
        Ok(Self {
            db,
            authority: Arc::new(Authority::from_settings(&settings.auth)),
            zone: settings.directory.zone()?,
        })
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(AllowOrigin::mirror_request())
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);
    let tracing = TraceLayer::new_for_http();
    Router::new()
        .merge(drinks::router())
        .merge(web::router())
        .fallback(web::not_found)
        .layer(cors)
        .layer(tracing)
        .with_state(state)
}
