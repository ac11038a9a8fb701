use time::{format_description::FormatItem, macros::format_description, OffsetDateTime, UtcOffset};

use entity::Show;

const DISPLAY_FORMAT: &[FormatItem<'static>] = format_description!(
    "[weekday repr:short] [month repr:short] [day padding:none], [year] [hour repr:12 padding:none]:[minute][period]"
);

pub trait Scheduled {
    fn start_time(&self) -> OffsetDateTime;
}

impl Scheduled for Show {
    fn start_time(&self) -> OffsetDateTime {
        self.start_time
    }
}

impl<T> Scheduled for (Show, T) {
    fn start_time(&self) -> OffsetDateTime {
        self.0.start_time
    }
}

/// A show starting exactly now is already past.
pub fn is_upcoming(start: OffsetDateTime, now: OffsetDateTime) -> bool {
    start > now
}

/// Splits shows into `(past, upcoming)`, keeping their order.
pub fn partition<T: Scheduled>(shows: Vec<T>, now: OffsetDateTime) -> (Vec<T>, Vec<T>) {
    shows
        .into_iter()
        .partition(|show| !is_upcoming(show.start_time(), now))
}

pub fn count_upcoming<T: Scheduled>(shows: &[T], now: OffsetDateTime) -> usize {
    shows
        .iter()
        .filter(|show| is_upcoming(show.start_time(), now))
        .count()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Area<T> {
    pub city: String,
    pub state: String,
    pub venues: Vec<T>,
}

/// Groups consecutive entries sharing a `(city, state)` pair; the input is
/// expected to be sorted by that pair.
pub fn group_by_area<T>(entries: impl IntoIterator<Item = (String, String, T)>) -> Vec<Area<T>> {
    let mut areas: Vec<Area<T>> = Vec::new();
    for (city, state, entry) in entries {
        if let Some(area) = areas.last_mut() {
            if area.city == city && area.state == state {
                area.venues.push(entry);
                continue;
            }
        }
        areas.push(Area {
            city,
            state,
            venues: vec![entry],
        });
    }
    areas
}

pub fn format_start_time(start: OffsetDateTime, zone: UtcOffset) -> String {
    start
        .to_offset(zone)
        .format(DISPLAY_FORMAT)
        .unwrap_or_else(|_| start.to_string())
}
