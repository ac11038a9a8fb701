use sea_orm::{ActiveValue::NotSet, Set};
use serde::{Deserialize, Deserializer};
use serde_valid::{
    validation::{Error as Invalid, Errors},
    Validate,
};
use time::{
    format_description::{well_known::Rfc3339, FormatItem},
    macros::format_description,
    OffsetDateTime, PrimitiveDateTime, UtcOffset,
};
use url::Url;

use entity::{Artist, ArtistActive, Genres, Venue, VenueActive};

pub const GENRES: &[&str] = &[
    "Alternative",
    "Blues",
    "Classical",
    "Country",
    "Electronic",
    "Folk",
    "Funk",
    "Hip-Hop",
    "Heavy Metal",
    "Instrumental",
    "Jazz",
    "Musical Theatre",
    "Pop",
    "Punk",
    "R&B",
    "Reggae",
    "Rock n Roll",
    "Soul",
    "Other",
];

pub const STATES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "DC", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MT", "NE", "NV", "NH", "NJ", "NM", "NY", "NC", "ND", "OH", "OK", "OR",
    "MD", "MA", "MI", "MN", "MS", "MO", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA", "WA",
    "WV", "WI", "WY",
];

const NAIVE_FORMATS: [&[FormatItem<'static>]; 4] = [
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
];

/// An option of a select input, as rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub value: &'static str,
    pub selected: bool,
}

pub fn choices(options: &'static [&'static str], selected: &[&str]) -> Vec<Choice> {
    options
        .iter()
        .map(|&value| Choice {
            value,
            selected: selected.contains(&value),
        })
        .collect()
}

fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.map_or(false, |v| {
        matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "y" | "yes" | "on" | "true" | "1"
        )
    }))
}

fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Values {
        Many(Vec<String>),
        One(String),
    }

    let values = match Values::deserialize(deserializer)? {
        Values::Many(values) => values,
        Values::One(value) => vec![value],
    };
    Ok(values
        .into_iter()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .collect())
}

fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(value.trim().to_owned())
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}

pub fn is_link(value: &str) -> bool {
    Url::parse(value).map_or(false, |url| {
        matches!(url.scheme(), "http" | "https") && url.has_host()
    })
}

fn http_link(value: &str) -> Result<(), Invalid> {
    if value.is_empty() || is_link(value) {
        Ok(())
    } else {
        Err(Invalid::Custom("Links must be http(s) URLs.".to_string()))
    }
}

fn known_state(value: &str) -> Result<(), Invalid> {
    if STATES.contains(&value) {
        Ok(())
    } else {
        Err(Invalid::Custom(
            "State must be one of the listed states.".to_string(),
        ))
    }
}

fn known_genres(values: &[String]) -> Result<(), Invalid> {
    match values.iter().find(|g| !GENRES.contains(&g.as_str())) {
        Some(genre) => Err(Invalid::Custom(format!("{} is not a known genre.", genre))),
        None => Ok(()),
    }
}

fn start_time_shape(value: &str) -> Result<(), Invalid> {
    parse_start_time(value, UtcOffset::UTC)
        .map(|_| ())
        .ok_or_else(|| {
            Invalid::Custom("Start time must look like 2019-05-21 21:30:00.".to_string())
        })
}

/// Flattens validation errors into the messages shown above a form.
pub fn messages(errors: &Errors) -> Vec<String> {
    let mut out = Vec::new();
    collect(errors, &mut out);
    out
}

fn collect(errors: &Errors, out: &mut Vec<String>) {
    match errors {
        Errors::Object(object) => {
            collect_all(&object.errors, out);
            object.properties.values().for_each(|e| collect(e, out));
        }
        Errors::Array(array) => {
            collect_all(&array.errors, out);
            array.items.values().for_each(|e| collect(e, out));
        }
        Errors::NewType(errors) => collect_all(errors, out),
    }
}

fn collect_all(errors: &[Invalid], out: &mut Vec<String>) {
    for error in errors {
        match error {
            Invalid::Properties(object) => {
                collect_all(&object.errors, out);
                object.properties.values().for_each(|e| collect(e, out));
            }
            Invalid::Items(array) => {
                collect_all(&array.errors, out);
                array.items.values().for_each(|e| collect(e, out));
            }
            error => out.push(error.to_string()),
        }
    }
}

fn errors_of(form: &impl Validate) -> Vec<String> {
    form.validate().err().map(|e| messages(&e)).unwrap_or_default()
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct VenueForm {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(min_length = 1, message = "Name is required.")]
    pub name: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(min_length = 1, message = "City is required.")]
    pub city: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(custom(known_state))]
    pub state: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(min_length = 1, message = "Address is required.")]
    pub address: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(pattern = r"^(\d{3}-\d{3}-\d{4})?$", message = "Phone must look like 555-555-5555.")]
    pub phone: String,
    #[serde(default, deserialize_with = "string_list")]
    #[validate(min_items = 1, message = "At least one genre is required.")]
    #[validate(custom(known_genres))]
    pub genres: Vec<String>,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(custom(http_link))]
    pub image_link: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(custom(http_link))]
    pub facebook_link: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(custom(http_link))]
    pub website: String,
    #[serde(default, deserialize_with = "checkbox")]
    pub seeking_talent: bool,
    #[serde(default, deserialize_with = "trimmed")]
    pub seeking_description: String,
}

impl VenueForm {
    pub fn errors(&self) -> Vec<String> {
        errors_of(self)
    }

    pub fn to_active(&self) -> VenueActive {
        VenueActive {
            id: NotSet,
            name: Set(self.name.to_owned()),
            city: Set(self.city.to_owned()),
            state: Set(self.state.to_owned()),
            address: Set(self.address.to_owned()),
            phone: Set(optional(&self.phone)),
            image_link: Set(optional(&self.image_link)),
            facebook_link: Set(optional(&self.facebook_link)),
            website: Set(optional(&self.website)),
            seeking_talent: Set(self.seeking_talent),
            seeking_description: Set(optional(&self.seeking_description)),
            genres: Set(Genres::from(self.genres.to_owned())),
        }
    }
}

impl From<&Venue> for VenueForm {
    fn from(venue: &Venue) -> Self {
        Self {
            name: venue.name.to_owned(),
            city: venue.city.to_owned(),
            state: venue.state.to_owned(),
            address: venue.address.to_owned(),
            phone: venue.phone.to_owned().unwrap_or_default(),
            genres: venue.genres.0.to_owned(),
            image_link: venue.image_link.to_owned().unwrap_or_default(),
            facebook_link: venue.facebook_link.to_owned().unwrap_or_default(),
            website: venue.website.to_owned().unwrap_or_default(),
            seeking_talent: venue.seeking_talent,
            seeking_description: venue.seeking_description.to_owned().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ArtistForm {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(min_length = 1, message = "Name is required.")]
    pub name: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(min_length = 1, message = "City is required.")]
    pub city: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(custom(known_state))]
    pub state: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(pattern = r"^(\d{3}-\d{3}-\d{4})?$", message = "Phone must look like 555-555-5555.")]
    pub phone: String,
    #[serde(default, deserialize_with = "string_list")]
    #[validate(min_items = 1, message = "At least one genre is required.")]
    #[validate(custom(known_genres))]
    pub genres: Vec<String>,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(custom(http_link))]
    pub image_link: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(custom(http_link))]
    pub facebook_link: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(custom(http_link))]
    pub website: String,
    #[serde(default, deserialize_with = "checkbox")]
    pub seeking_venue: bool,
    #[serde(default, deserialize_with = "trimmed")]
    pub seeking_description: String,
}

impl ArtistForm {
    pub fn errors(&self) -> Vec<String> {
        errors_of(self)
    }

    pub fn to_active(&self) -> ArtistActive {
        ArtistActive {
            id: NotSet,
            name: Set(self.name.to_owned()),
            city: Set(self.city.to_owned()),
            state: Set(self.state.to_owned()),
            phone: Set(optional(&self.phone)),
            image_link: Set(optional(&self.image_link)),
            facebook_link: Set(optional(&self.facebook_link)),
            website: Set(optional(&self.website)),
            seeking_venue: Set(self.seeking_venue),
            seeking_description: Set(optional(&self.seeking_description)),
            genres: Set(Genres::from(self.genres.to_owned())),
        }
    }
}

impl From<&Artist> for ArtistForm {
    fn from(artist: &Artist) -> Self {
        Self {
            name: artist.name.to_owned(),
            city: artist.city.to_owned(),
            state: artist.state.to_owned(),
            phone: artist.phone.to_owned().unwrap_or_default(),
            genres: artist.genres.0.to_owned(),
            image_link: artist.image_link.to_owned().unwrap_or_default(),
            facebook_link: artist.facebook_link.to_owned().unwrap_or_default(),
            website: artist.website.to_owned().unwrap_or_default(),
            seeking_venue: artist.seeking_venue,
            seeking_description: artist.seeking_description.to_owned().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ShowForm {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(pattern = r"^[1-9]\d{0,8}$", message = "Artist ID must be a positive number.")]
    pub artist_id: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(pattern = r"^[1-9]\d{0,8}$", message = "Venue ID must be a positive number.")]
    pub venue_id: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(custom(start_time_shape))]
    pub start_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShow {
    pub venue_id: i32,
    pub artist_id: i32,
    /// UTC
    pub start_time: OffsetDateTime,
}

/// Naive datetimes are read in `zone`; the result is always in UTC.
pub fn parse_start_time(value: &str, zone: UtcOffset) -> Option<OffsetDateTime> {
    let value = value.trim();
    if let Ok(instant) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(instant.to_offset(UtcOffset::UTC));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(value, *format).ok())
        .map(|naive| naive.assume_offset(zone).to_offset(UtcOffset::UTC))
}

impl ShowForm {
    /// An empty form whose start time defaults to the current time.
    pub fn starting_now(zone: UtcOffset) -> Self {
        let now = OffsetDateTime::now_utc().to_offset(zone);
        Self {
            start_time: now
                .format(NAIVE_FORMATS[0])
                .unwrap_or_default(),
            ..Self::default()
        }
    }

    pub fn to_show(&self, zone: UtcOffset) -> Result<NewShow, Vec<String>> {
        let errors = errors_of(self);
        let artist_id = self.artist_id.parse::<i32>().ok();
        let venue_id = self.venue_id.parse::<i32>().ok();
        let start_time = parse_start_time(&self.start_time, zone);
        match (artist_id, venue_id, start_time) {
            (Some(artist_id), Some(venue_id), Some(start_time)) if errors.is_empty() => Ok(NewShow {
                venue_id,
                artist_id,
                start_time,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default, deserialize_with = "trimmed")]
    pub search_term: String,
}
