pub mod agenda;
mod artists;
pub mod error;
pub mod extract;
pub mod forms;
mod shows;
pub mod templates;
mod venues;

use askama::Template;
use axum::{
    response::Html,
    routing::{get, post},
    Router,
};
use sea_orm::sea_query::{BinOper, Expr, Func, IntoColumnRef, SimpleExpr};

use crate::api::AppState;
use error::PageError;
use templates::HomePage;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/venues", get(venues::venues))
        .route("/venues/search", post(venues::search))
        .route(
            "/venues/create",
            get(venues::create_form).post(venues::create),
        )
        .route("/venues/:id", get(venues::venue).delete(venues::delete))
        .route("/venues/:id/edit", get(venues::edit_form).post(venues::edit))
        .route("/artists", get(artists::artists))
        .route("/artists/search", post(artists::search))
        .route(
            "/artists/create",
            get(artists::create_form).post(artists::create),
        )
        .route("/artists/:id", get(artists::artist).delete(artists::delete))
        .route(
            "/artists/:id/edit",
            get(artists::edit_form).post(artists::edit),
        )
        .route("/shows", get(shows::shows))
        .route("/shows/search", post(shows::search))
        .route("/shows/create", get(shows::create_form).post(shows::create))
}

fn render<T: Template>(template: &T) -> Result<Html<String>, PageError> {
    Ok(Html(template.render()?))
}

/// Case-insensitive substring match; an empty term matches everything.
///
/// Both sides go through the database's `LOWER`, which only folds ASCII on
/// SQLite.
fn name_matches<C: IntoColumnRef>(column: C, term: &str) -> SimpleExpr {
    let pattern = format!("%{}%", term.trim());
    Expr::expr(Func::lower(Expr::col(column)))
        .binary(BinOper::Like, Func::lower(Expr::val(pattern)))
}

pub async fn index() -> Result<Html<String>, PageError> {
    render(&HomePage::default())
}

pub async fn not_found() -> PageError {
    PageError::NotFound
}
