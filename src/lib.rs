pub mod api;
pub mod web;

pub use api::{router, AppState};
