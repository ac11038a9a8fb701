use askama::Template;
use time::{OffsetDateTime, UtcOffset};

use entity::{Artist, Show, Venue};

use super::{
    agenda::{self, Area},
    forms::{choices, ArtistForm, Choice, ShowForm, VenueForm, GENRES, STATES},
};

pub struct Flash {
    pub category: &'static str,
    pub message: String,
}

impl Flash {
    pub fn success(message: String) -> Self {
        Self {
            category: "success",
            message,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            category: "danger",
            message,
        }
    }
}

#[derive(Template, Default)]
#[template(path = "pages/home.html")]
pub struct HomePage {
    pub flashes: Vec<Flash>,
}

/// Either side of a show.
pub trait Billed {
    fn id(&self) -> i32;
    fn name(&self) -> &str;
    fn image_link(&self) -> Option<&str>;
}

impl Billed for Venue {
    fn id(&self) -> i32 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn image_link(&self) -> Option<&str> {
        self.image_link.as_deref()
    }
}

impl Billed for Artist {
    fn id(&self) -> i32 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn image_link(&self) -> Option<&str> {
        self.image_link.as_deref()
    }
}

/// A venue or artist in a list, with its number of upcoming shows.
pub struct Summary {
    pub id: i32,
    pub name: String,
    pub num_upcoming_shows: usize,
}

impl Summary {
    pub fn of<T: Billed>(billed: &T, shows: &[Show], now: OffsetDateTime) -> Self {
        Self {
            id: billed.id(),
            name: billed.name().to_owned(),
            num_upcoming_shows: agenda::count_upcoming(shows, now),
        }
    }
}

#[derive(Template)]
#[template(path = "pages/venues.html")]
pub struct VenuesPage {
    pub areas: Vec<Area<Summary>>,
}

#[derive(Template)]
#[template(path = "pages/artists.html")]
pub struct ArtistsPage {
    pub artists: Vec<Summary>,
}

#[derive(Template)]
#[template(path = "pages/search.html")]
pub struct SearchPage {
    /// Path prefix of the listed resources, `venues` or `artists`.
    pub kind: &'static str,
    pub search_term: String,
    pub results: Vec<Summary>,
}

/// The other side of a show: the artist on a venue page, the venue on an
/// artist page.
pub struct Appearance {
    pub id: i32,
    pub name: String,
    pub image_link: String,
    pub start_time: String,
}

impl Appearance {
    pub fn of<T: Billed>(other: &T, show: &Show, zone: UtcOffset) -> Self {
        Self {
            id: other.id(),
            name: other.name().to_owned(),
            image_link: other.image_link().unwrap_or_default().to_owned(),
            start_time: agenda::format_start_time(show.start_time, zone),
        }
    }

    /// Shows whose other side is gone are left out.
    pub fn all<T: Billed>(shows: &[(Show, Option<T>)], zone: UtcOffset) -> Vec<Self> {
        shows
            .iter()
            .filter_map(|(show, other)| other.as_ref().map(|o| Self::of(o, show, zone)))
            .collect()
    }
}

pub struct Profile {
    pub id: i32,
    pub name: String,
    pub genres: Vec<String>,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: String,
    pub website: String,
    pub facebook_link: String,
    pub image_link: String,
    pub seeking: bool,
    pub seeking_description: String,
    pub past_shows: Vec<Appearance>,
    pub upcoming_shows: Vec<Appearance>,
}

#[derive(Template)]
#[template(path = "pages/venue.html")]
pub struct VenuePage {
    pub venue: Profile,
}

#[derive(Template)]
#[template(path = "pages/artist.html")]
pub struct ArtistPage {
    pub artist: Profile,
}

pub struct Listing {
    pub venue_id: i32,
    pub venue_name: String,
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: String,
    pub start_time: String,
}

#[derive(Template)]
#[template(path = "pages/shows.html")]
pub struct ShowsPage {
    pub shows: Vec<Listing>,
    pub search_term: String,
}

#[derive(Template)]
#[template(path = "forms/venue.html")]
pub struct VenueFormPage {
    pub heading: String,
    pub action: String,
    pub form: VenueForm,
    pub states: Vec<Choice>,
    pub genres: Vec<Choice>,
    pub errors: Vec<String>,
}

impl VenueFormPage {
    pub fn new(heading: String, action: String, form: VenueForm, errors: Vec<String>) -> Self {
        let states = choices(STATES, &[form.state.as_str()]);
        let genres = {
            let selected: Vec<&str> = form.genres.iter().map(String::as_str).collect();
            choices(GENRES, &selected)
        };
        Self {
            heading,
            action,
            form,
            states,
            genres,
            errors,
        }
    }
}

#[derive(Template)]
#[template(path = "forms/artist.html")]
pub struct ArtistFormPage {
    pub heading: String,
    pub action: String,
    pub form: ArtistForm,
    pub states: Vec<Choice>,
    pub genres: Vec<Choice>,
    pub errors: Vec<String>,
}

impl ArtistFormPage {
    pub fn new(heading: String, action: String, form: ArtistForm, errors: Vec<String>) -> Self {
        let states = choices(STATES, &[form.state.as_str()]);
        let genres = {
            let selected: Vec<&str> = form.genres.iter().map(String::as_str).collect();
            choices(GENRES, &selected)
        };
        Self {
            heading,
            action,
            form,
            states,
            genres,
            errors,
        }
    }
}

#[derive(Template)]
#[template(path = "forms/show.html")]
pub struct ShowFormPage {
    pub form: ShowForm,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "errors/400.html")]
pub struct BadRequestPage;

#[derive(Template)]
#[template(path = "errors/404.html")]
pub struct NotFoundPage;

#[derive(Template)]
#[template(path = "errors/500.html")]
pub struct ServerErrorPage;
