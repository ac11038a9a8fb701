use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use sea_orm::{
    sea_query::Condition, ActiveValue::Set, DbConn, DbErr, EntityTrait, LoaderTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use thiserror::Error;
use time::UtcOffset;

use entity::{
    ArtistColumn, ArtistEntity, Show, ShowActive, ShowColumn, ShowEntity, VenueColumn, VenueEntity,
};

use super::{
    agenda,
    error::PageError,
    extract::Form,
    forms::{NewShow, SearchForm, ShowForm},
    name_matches, render,
    templates::{Flash, HomePage, Listing, ShowFormPage, ShowsPage},
};
use crate::api::AppState;

#[derive(Error, Debug)]
enum ListingError {
    #[error("No venue with id {0}")]
    MissingVenue(i32),
    #[error("No artist with id {0}")]
    MissingArtist(i32),
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),
}

async fn listings(db: &DbConn, zone: UtcOffset, shows: Vec<Show>) -> Result<Vec<Listing>, DbErr> {
    let venues = shows.load_one(VenueEntity, db).await?;
    let artists = shows.load_one(ArtistEntity, db).await?;
    Ok(shows
        .into_iter()
        .zip(venues.into_iter().zip(artists))
        .map(|(show, (venue, artist))| {
            let (artist_name, artist_image_link) = artist
                .map(|a| (a.name, a.image_link.unwrap_or_default()))
                .unwrap_or_default();
            Listing {
                venue_id: show.venue_id,
                venue_name: venue.map(|v| v.name).unwrap_or_default(),
                artist_id: show.artist_id,
                artist_name,
                artist_image_link,
                start_time: agenda::format_start_time(show.start_time, zone),
            }
        })
        .collect())
}

pub async fn shows(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    let shows = ShowEntity::find()
        .order_by_asc(ShowColumn::StartTime)
        .all(&state.db)
        .await?;
    render(&ShowsPage {
        shows: listings(&state.db, state.zone, shows).await?,
        search_term: String::new(),
    })
}

pub async fn search(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Result<Html<String>, PageError> {
    let shows = ShowEntity::find()
        .inner_join(VenueEntity)
        .inner_join(ArtistEntity)
        .filter(
            Condition::any()
                .add(name_matches(
                    (VenueEntity, VenueColumn::Name),
                    &form.search_term,
                ))
                .add(name_matches(
                    (ArtistEntity, ArtistColumn::Name),
                    &form.search_term,
                )),
        )
        .order_by_asc(ShowColumn::StartTime)
        .all(&state.db)
        .await?;
    tracing::debug!(term = %form.search_term, count = shows.len(), "Searched shows");
    render(&ShowsPage {
        shows: listings(&state.db, state.zone, shows).await?,
        search_term: form.search_term,
    })
}

pub async fn create_form(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    render(&ShowFormPage {
        form: ShowForm::starting_now(state.zone),
        errors: Vec::new(),
    })
}

async fn insert(db: &DbConn, show: &NewShow) -> Result<(), ListingError> {
    let tx = db.begin().await?;
    VenueEntity::find_by_id(show.venue_id)
        .one(&tx)
        .await?
        .ok_or(ListingError::MissingVenue(show.venue_id))?;
    ArtistEntity::find_by_id(show.artist_id)
        .one(&tx)
        .await?
        .ok_or(ListingError::MissingArtist(show.artist_id))?;
    ShowEntity::insert(ShowActive {
        venue_id: Set(show.venue_id),
        artist_id: Set(show.artist_id),
        start_time: Set(show.start_time),
    })
    .exec(&tx)
    .await?;
    tx.commit().await?;
    Ok(())
}

pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<ShowForm>,
) -> Result<Response, PageError> {
    let show = match form.to_show(state.zone) {
        Ok(show) => show,
        Err(errors) => {
            let page = render(&ShowFormPage { form, errors })?;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };
    let flash = match insert(&state.db, &show).await {
        Ok(()) => {
            tracing::info!(
                venue = show.venue_id,
                artist = show.artist_id,
                start_time = %show.start_time,
                "Listed show"
            );
            Flash::success("Show was successfully listed!".to_string())
        }
        Err(e) => {
            tracing::error!(error = %e, "Could not list show");
            Flash::error("An error occurred. Show could not be listed.".to_string())
        }
    };
    Ok(render(&HomePage {
        flashes: vec![flash],
    })?
    .into_response())
}
