use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Genre names attached to a venue or an artist, stored as a JSON list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Genres(pub Vec<String>);

impl Genres {
    pub fn contains(&self, genre: &str) -> bool {
        self.0.iter().any(|g| g == genre)
    }
}

impl From<Vec<String>> for Genres {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}

impl Display for Genres {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}
