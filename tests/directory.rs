mod common;

use axum::http::{Method, StatusCode};
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;

use common::{app, form_request, json_request, TestApp};

const HOP: &str = "name=The+Musical+Hop&city=San+Francisco&state=CA&address=1015+Folsom+Street\
&phone=123-123-1234&genres=Jazz&genres=Reggae&seeking_talent=y";
const PARK: &str = "name=Park+Square+Live+Music+%26+Coffee&city=San+Francisco&state=CA\
&address=34+Whiskey+Moore+Ave&genres=Folk";
const PETALS: &str = "name=Guns+N+Petals&city=San+Francisco&state=CA&genres=Rock+n+Roll";

async fn seed(app: &TestApp) {
    for venue in [HOP, PARK] {
        let (status, body) = app.post_form("/venues/create", venue).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("was successfully listed!"), "{}", body);
    }
    let (status, body) = app.post_form("/artists/create", PETALS).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Artist Guns N Petals was successfully listed!"));
}

#[tokio::test]
async fn home_page_renders() {
    let app = app().await;
    let (status, body) = app.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<h1>Stagedoor</h1>"));
}

#[tokio::test]
async fn unknown_pages_are_not_found() {
    let app = app().await;
    let (status, body) = app.get("/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("404"));
    let (status, _) = app.get("/venues/42").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get("/venues/hop").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn venues_are_listed_by_area() {
    let app = app().await;
    seed(&app).await;
    let (status, body) = app.get("/venues").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.matches("San Francisco, CA").count(), 1);
    assert!(body.contains("The Musical Hop"));
    assert!(body.contains("Park Square Live Music &amp; Coffee"));
}

#[tokio::test]
async fn duplicate_venue_is_flashed() {
    let app = app().await;
    seed(&app).await;
    let (status, body) = app.post_form("/venues/create", HOP).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("An error occurred. Venue The Musical Hop could not be listed."));
    let count = entity::VenueEntity::find().count(&app.db).await.unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn invalid_venue_is_rerendered() {
    let app = app().await;
    let (status, body) = app
        .post_form(
            "/venues/create",
            "name=Nowhere&city=Atlantis&state=XX&address=&genres=Polka",
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.contains("Address is required."));
    assert!(body.contains("Polka is not a known genre."));
    assert!(body.contains("value=\"Atlantis\""));
    let count = entity::VenueEntity::find().count(&app.db).await.unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn search_is_case_insensitive() {
    let app = app().await;
    seed(&app).await;
    let (status, body) = app.post_form("/venues/search", "search_term=HOP").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Number of search results for \"HOP\": 1"));
    assert!(body.contains("The Musical Hop"));

    let (_, body) = app.post_form("/venues/search", "search_term=").await;
    assert!(body.contains(": 2</h3>"));

    let (_, body) = app.post_form("/artists/search", "search_term=petal").await;
    assert!(body.contains("Guns N Petals"));
}

#[tokio::test]
async fn shows_are_split_into_past_and_upcoming() {
    let app = app().await;
    seed(&app).await;
    for start_time in ["2019-05-21+21%3A30%3A00", "2199-01-01T20%3A00"] {
        let (status, body) = app
            .post_form(
                "/shows/create",
                &format!("artist_id=1&venue_id=1&start_time={}", start_time),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        if start_time.starts_with("2019") {
            assert!(body.contains("Show was successfully listed!"), "{}", body);
        } else {
            // same artist at the same venue again
            assert!(body.contains("An error occurred. Show could not be listed."));
        }
    }
    let (status, body) = app
        .post_form(
            "/shows/create",
            "artist_id=1&venue_id=2&start_time=2199-01-01T20%3A00",
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Show was successfully listed!"));

    let (_, body) = app.get("/venues/1").await;
    assert!(body.contains("0 Upcoming Shows"));
    assert!(body.contains("1 Past Shows"));
    assert!(body.contains("Tue May 21, 2019 9:30PM"));

    let (_, body) = app.get("/artists/1").await;
    assert!(body.contains("1 Upcoming Shows"));
    assert!(body.contains("1 Past Shows"));

    let (_, body) = app.get("/shows").await;
    assert!(body.contains("Guns N Petals"));
    assert_eq!(body.matches("playing at").count(), 2);

    let (_, body) = app.post_form("/shows/search", "search_term=park").await;
    assert_eq!(body.matches("playing at").count(), 1);
}

#[tokio::test]
async fn shows_need_existing_venue_and_artist() {
    let app = app().await;
    seed(&app).await;
    let (status, body) = app
        .post_form(
            "/shows/create",
            "artist_id=9&venue_id=1&start_time=2199-01-01+20%3A00",
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("An error occurred. Show could not be listed."));

    let (status, body) = app
        .post_form("/shows/create", "artist_id=x&venue_id=1&start_time=soon")
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.contains("Artist ID must be a positive number."));

    let count = entity::ShowEntity::find().count(&app.db).await.unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn editing_redirects_to_the_venue() {
    let app = app().await;
    seed(&app).await;
    let (status, body) = app.get("/venues/1/edit").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("value=\"The Musical Hop\""));
    assert!(body.contains("<option value=\"Jazz\" selected>"));

    let (status, location) = app
        .redirect(form_request("/venues/1/edit", &HOP.replace("Folsom", "Mission")))
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/venues/1"));

    let venue = entity::VenueEntity::find_by_id(1)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(venue.address, "1015 Mission Street");
    assert!(venue.seeking_talent);
}

#[tokio::test]
async fn deleting_a_venue_removes_its_shows() {
    let app = app().await;
    seed(&app).await;
    let (_, body) = app
        .post_form(
            "/shows/create",
            "artist_id=1&venue_id=1&start_time=2199-01-01+20%3A00",
        )
        .await;
    assert!(body.contains("Show was successfully listed!"));

    let (status, body) = app
        .send_json(json_request(Method::DELETE, "/venues/1", None, None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "delete": 1}));
    let count = entity::ShowEntity::find().count(&app.db).await.unwrap();
    assert_eq!(count, 0);

    let (status, body) = app
        .send_json(json_request(Method::DELETE, "/venues/1", None, None))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "resource not found");

    let (status, _) = app
        .send_json(json_request(Method::DELETE, "/artists/1", None, None))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn editing_an_artist_redirects_to_the_artist() {
    let app = app().await;
    seed(&app).await;
    let (status, body) = app.get("/artists/1/edit").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("value=\"Guns N Petals\""));

    let edited = format!(
        "{}&phone=326-123-5000&seeking_venue=on",
        PETALS.replace("San+Francisco", "Oakland")
    );
    let (status, location) = app.redirect(form_request("/artists/1/edit", &edited)).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/artists/1"));

    let artist = entity::ArtistEntity::find_by_id(1)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(artist.city, "Oakland");
    assert_eq!(artist.phone.as_deref(), Some("326-123-5000"));
    assert!(artist.seeking_venue);
}

#[tokio::test]
async fn edit_conflicts_rerender_the_form() {
    let app = app().await;
    seed(&app).await;
    let (status, body) = app
        .post_form(
            "/venues/2/edit",
            &PARK.replace("Park+Square+Live+Music+%26+Coffee", "The+Musical+Hop"),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.contains("Venue The Musical Hop could not be updated."));
    let venue = entity::VenueEntity::find_by_id(2)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(venue.name, "Park Square Live Music & Coffee");

    let (status, _) = app
        .post_form("/artists/create", "name=Matt+Quevedo&city=New+York&state=NY&genres=Jazz")
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app
        .post_form("/artists/2/edit", "name=Guns+N+Petals&city=New+York&state=NY&genres=Jazz")
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.contains("Artist Guns N Petals could not be updated."));
    let artist = entity::ArtistEntity::find_by_id(2)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(artist.name, "Matt Quevedo");
}

#[tokio::test]
async fn editing_a_missing_row_is_not_found() {
    let app = app().await;
    let (status, body) = app.post_form("/venues/99/edit", "name=").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("<h1>404</h1>"));
    let (status, _) = app.post_form("/artists/99/edit", PETALS).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_an_artist_removes_its_shows() {
    let app = app().await;
    seed(&app).await;
    for venue_id in [1, 2] {
        let (_, body) = app
            .post_form(
                "/shows/create",
                &format!("artist_id=1&venue_id={}&start_time=2199-01-01+20%3A00", venue_id),
            )
            .await;
        assert!(body.contains("Show was successfully listed!"));
    }

    let (status, body) = app
        .send_json(json_request(Method::DELETE, "/artists/1", None, None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "delete": 1}));
    let shows = entity::ShowEntity::find().count(&app.db).await.unwrap();
    assert_eq!(shows, 0);
    let venues = entity::VenueEntity::find().count(&app.db).await.unwrap();
    assert_eq!(venues, 2);

    let (status, _) = app.get("/artists/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, body) = app.get("/venues/1").await;
    assert!(body.contains("0 Upcoming Shows"));
}

#[tokio::test]
async fn unreadable_forms_render_the_error_page() {
    let app = app().await;
    let (status, body) = app
        .post_form("/venues/create", "name=The+Hop&name=The+Other+Hop")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("<h1>400</h1>"));
    let count = entity::VenueEntity::find().count(&app.db).await.unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn search_matches_non_ascii_names() {
    let app = app().await;
    let (status, _) = app
        .post_form(
            "/venues/create",
            "name=Le+Petit+%C3%89cho&city=New+Orleans&state=LA&address=1+Rue+Royale&genres=Jazz",
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app
        .post_form("/venues/search", "search_term=%C3%89CHO")
        .await;
    assert!(body.contains("Le Petit Écho"), "{}", body);
}
