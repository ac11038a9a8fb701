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

use entity::{Artist, ArtistColumn, ArtistEntity, ShowColumn, ShowEntity, VenueEntity};

use super::{
    agenda,
    error::PageError,
    extract::{Form, Path},
    forms::{ArtistForm, SearchForm},
    name_matches, render,
    templates::{
        Appearance, ArtistFormPage, ArtistPage, ArtistsPage, Flash, HomePage, Profile,
        SearchPage, Summary,
    },
};
use crate::api::{
    envelope::{Deleted, Envelope},
    extract::{Json, Path as ApiPath},
    AppState, Error,
};

async fn summaries(db: &DbConn, artists: Vec<Artist>) -> Result<Vec<Summary>, DbErr> {
    let shows = artists.load_many(ShowEntity, db).await?;
    let now = OffsetDateTime::now_utc();
    Ok(artists
        .iter()
        .zip(shows)
        .map(|(artist, shows)| Summary::of(artist, &shows, now))
        .collect())
}

pub async fn artists(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    let artists = ArtistEntity::find()
        .order_by_asc(ArtistColumn::Name)
        .all(&state.db)
        .await?;
    render(&ArtistsPage {
        artists: summaries(&state.db, artists).await?,
    })
}

pub async fn search(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Result<Html<String>, PageError> {
    let artists = ArtistEntity::find()
        .filter(name_matches(ArtistColumn::Name, &form.search_term))
        .order_by_asc(ArtistColumn::Name)
        .all(&state.db)
        .await?;
    tracing::debug!(term = %form.search_term, count = artists.len(), "Searched artists");
    render(&SearchPage {
        kind: "artists",
        search_term: form.search_term,
        results: summaries(&state.db, artists).await?,
    })
}

pub async fn artist(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Html<String>, PageError> {
    let artist = ArtistEntity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(PageError::NotFound)?;
    let shows = ShowEntity::find()
        .filter(ShowColumn::ArtistId.eq(id))
        .order_by_asc(ShowColumn::StartTime)
        .find_also_related(VenueEntity)
        .all(&state.db)
        .await?;
    let (past, upcoming) = agenda::partition(shows, OffsetDateTime::now_utc());
    let zone = state.zone;
    render(&ArtistPage {
        artist: Profile {
            id: artist.id,
            name: artist.name,
            genres: artist.genres.0,
            city: artist.city,
            state: artist.state,
            address: String::new(),
            phone: artist.phone.unwrap_or_default(),
            website: artist.website.unwrap_or_default(),
            facebook_link: artist.facebook_link.unwrap_or_default(),
            image_link: artist.image_link.unwrap_or_default(),
            seeking: artist.seeking_venue,
            seeking_description: artist.seeking_description.unwrap_or_default(),
            past_shows: Appearance::all(&past, zone),
            upcoming_shows: Appearance::all(&upcoming, zone),
        },
    })
}

fn create_page(form: ArtistForm, errors: Vec<String>) -> ArtistFormPage {
    ArtistFormPage::new(
        "List a new artist".to_string(),
        "/artists/create".to_string(),
        form,
        errors,
    )
}

fn edit_page(id: i32, form: ArtistForm, errors: Vec<String>) -> ArtistFormPage {
    ArtistFormPage::new(
        format!("Edit artist {}", form.name),
        format!("/artists/{}/edit", id),
        form,
        errors,
    )
}

fn unprocessable(page: ArtistFormPage) -> Result<Response, PageError> {
    Ok((StatusCode::UNPROCESSABLE_ENTITY, render(&page)?).into_response())
}

pub async fn create_form() -> Result<Html<String>, PageError> {
    render(&create_page(ArtistForm::default(), Vec::new()))
}

async fn insert(db: &DbConn, form: &ArtistForm) -> Result<Artist, DbErr> {
    let tx = db.begin().await?;
    let artist = form.to_active().insert(&tx).await?;
    tx.commit().await?;
    Ok(artist)
}

pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<ArtistForm>,
) -> Result<Response, PageError> {
    let errors = form.errors();
    if !errors.is_empty() {
        return unprocessable(create_page(form, errors));
    }
    let name = form.name.to_owned();
    let flash = match insert(&state.db, &form).await {
        Ok(artist) => {
            tracing::info!(id = artist.id, name = %artist.name, "Listed artist");
            Flash::success(format!("Artist {} was successfully listed!", name))
        }
        Err(e) => {
            tracing::error!(error = %e, %name, "Could not list artist");
            Flash::error(format!(
                "An error occurred. Artist {} could not be listed.",
                name
            ))
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
    let artist = ArtistEntity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(PageError::NotFound)?;
    render(&edit_page(id, ArtistForm::from(&artist), Vec::new()))
}

pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<ArtistForm>,
) -> Result<Response, PageError> {
    let tx = state.db.begin().await?;
    ArtistEntity::find_by_id(id)
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
        Ok(artist) => {
            tx.commit().await?;
            tracing::info!(id, name = %artist.name, "Updated artist");
            Ok(Redirect::to(&format!("/artists/{}", id)).into_response())
        }
        Err(e) => {
            tx.rollback().await?;
            tracing::error!(error = %e, id, "Could not update artist");
            let message = format!("Artist {} could not be updated.", form.name);
            unprocessable(edit_page(id, form, vec![message]))
        }
    }
}

pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<Envelope<Deleted>>, Error> {
    let tx = state.db.begin().await?;
    let artist = ArtistEntity::find_by_id(id)
        .one(&tx)
        .await?
        .ok_or(Error::NotFound)?;
    let shows = ShowEntity::delete_many()
        .filter(ShowColumn::ArtistId.eq(id))
        .exec(&tx)
        .await?;
    artist.delete(&tx).await?;
    tx.commit().await?;
    tracing::info!(id, shows = shows.rows_affected, "Deleted artist");
    Ok(Json(Envelope::new(Deleted { delete: id })))
}
