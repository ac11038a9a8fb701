use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, DbErr, EntityTrait, LoaderTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use time::OffsetDateTime;

use entity::{ArtistEntity, ShowColumn, ShowEntity, Venue, VenueColumn, VenueEntity};

use super::{
    agenda,
    error::PageError,
    extract::{Form, Path},
    forms::{SearchForm, VenueForm},
    name_matches, render,
    templates::{
        Appearance, Flash, HomePage, Profile, SearchPage, Summary, VenueFormPage, VenuePage,
        VenuesPage,
    },
};
use crate::api::{
    envelope::{Deleted, Envelope},
    extract::{Json, Path as ApiPath},
    AppState, Error,
};

async fn summaries(db: &DbConn, venues: Vec<Venue>) -> Result<Vec<Summary>, DbErr> {
    let shows = venues.load_many(ShowEntity, db).await?;
    let now = OffsetDateTime::now_utc();
    Ok(venues
        .iter()
        .zip(shows)
        .map(|(venue, shows)| Summary::of(venue, &shows, now))
        .collect())
}

pub async fn venues(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    let venues = VenueEntity::find()
        .order_by_asc(VenueColumn::City)
        .order_by_asc(VenueColumn::State)
        .order_by_asc(VenueColumn::Name)
        .all(&state.db)
        .await?;
    let areas: Vec<(String, String)> = venues
        .iter()
        .map(|v| (v.city.to_owned(), v.state.to_owned()))
        .collect();
    let summaries = summaries(&state.db, venues).await?;
    let areas = agenda::group_by_area(
        areas
            .into_iter()
            .zip(summaries)
            .map(|((city, state), summary)| (city, state, summary)),
    );
    render(&VenuesPage { areas })
}

pub async fn search(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Result<Html<String>, PageError> {
    let venues = VenueEntity::find()
        .filter(name_matches(VenueColumn::Name, &form.search_term))
        .order_by_asc(VenueColumn::Name)
        .all(&state.db)
        .await?;
    tracing::debug!(term = %form.search_term, count = venues.len(), "Searched venues");
    render(&SearchPage {
        kind: "venues",
        search_term: form.search_term,
        results: summaries(&state.db, venues).await?,
    })
}

pub async fn venue(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Html<String>, PageError> {
    let venue = VenueEntity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(PageError::NotFound)?;
    let shows = ShowEntity::find()
        .filter(ShowColumn::VenueId.eq(id))
        .order_by_asc(ShowColumn::StartTime)
        .find_also_related(ArtistEntity)
        .all(&state.db)
        .await?;
    let (past, upcoming) = agenda::partition(shows, OffsetDateTime::now_utc());
    let zone = state.zone;
    render(&VenuePage {
        venue: Profile {
            id: venue.id,
            name: venue.name,
            genres: venue.genres.0,
            city: venue.city,
            state: venue.state,
            address: venue.address,
            phone: venue.phone.unwrap_or_default(),
            website: venue.website.unwrap_or_default(),
            facebook_link: venue.facebook_link.unwrap_or_default(),
            image_link: venue.image_link.unwrap_or_default(),
            seeking: venue.seeking_talent,
            seeking_description: venue.seeking_description.unwrap_or_default(),
            past_shows: Appearance::all(&past, zone),
            upcoming_shows: Appearance::all(&upcoming, zone),
        },
    })
}

fn create_page(form: VenueForm, errors: Vec<String>) -> VenueFormPage {
    VenueFormPage::new(
        "List a new venue".to_string(),
        "/venues/create".to_string(),
        form,
        errors,
    )
}

fn edit_page(id: i32, form: VenueForm, errors: Vec<String>) -> VenueFormPage {
    VenueFormPage::new(
        format!("Edit venue {}", form.name),
        format!("/venues/{}/edit", id),
        form,
        errors,
    )
}

fn unprocessable(page: VenueFormPage) -> Result<Response, PageError> {
    Ok((StatusCode::UNPROCESSABLE_ENTITY, render(&page)?).into_response())
}

pub async fn create_form() -> Result<Html<String>, PageError> {
    render(&create_page(VenueForm::default(), Vec::new()))
}

async fn insert(db: &DbConn, form: &VenueForm) -> Result<Venue, DbErr> {
    let tx = db.begin().await?;
    let venue = form.to_active().insert(&tx).await?;
    tx.commit().await?;
    Ok(venue)
}

pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<VenueForm>,
) -> Result<Response, PageError> {
    let errors = form.errors();
    if !errors.is_empty() {
        return unprocessable(create_page(form, errors));
    }
    let name = form.name.to_owned();
    let flash = match insert(&state.db, &form).await {
        Ok(venue) => {
            tracing::info!(id = venue.id, name = %venue.name, "Listed venue");
            Flash::success(format!("Venue {} was successfully listed!", name))
        }
        Err(e) => {
            tracing::error!(error = %e, %name, "Could not list venue");
            Flash::error(format!("An error occurred. Venue {} could not be listed.", name))
        }
    };
    Ok(render(&HomePage {
        flashes: vec![flash],
    })?
    .into_response())
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Html<String>, PageError> {
    let venue = VenueEntity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(PageError::NotFound)?;
    render(&edit_page(id, VenueForm::from(&venue), Vec::new()))
}

pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<VenueForm>,
) -> Result<Response, PageError> {
    let tx = state.db.begin().await?;
    VenueEntity::find_by_id(id)
        .one(&tx)
        .await?
        .ok_or(PageError::NotFound)?;
    let errors = form.errors();
    if !errors.is_empty() {
        tx.rollback().await?;
        return unprocessable(edit_page(id, form, errors));
    }
    let mut active = form.to_active();
    active.id = Set(id);
    match active.update(&tx).await {
        Ok(venue) => {
            tx.commit().await?;
            tracing::info!(id, name = %venue.name, "Updated venue");
            Ok(Redirect::to(&format!("/venues/{}", id)).into_response())
        }
        Err(e) => {
            tx.rollback().await?;
            tracing::error!(error = %e, id, "Could not update venue");
            let message = format!("Venue {} could not be updated.", form.name);
            unprocessable(edit_page(id, form, vec![message]))
        }
    }
}

pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<Envelope<Deleted>>, Error> {
    let tx = state.db.begin().await?;
    let venue = VenueEntity::find_by_id(id)
        .one(&tx)
        .await?
        .ok_or(Error::NotFound)?;
    let shows = ShowEntity::delete_many()
        .filter(ShowColumn::VenueId.eq(id))
        .exec(&tx)
        .await?;
    venue.delete(&tx).await?;
    tx.commit().await?;
    tracing::info!(id, shows = shows.rows_affected, "Deleted venue");
    Ok(Json(Envelope::new(Deleted { delete: id })))
}
