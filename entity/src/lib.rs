pub mod artist;
pub mod drink;
mod genres;
pub mod show;
pub mod venue;

pub use genres::Genres;

pub use artist::ActiveModel as ArtistActive;
pub use artist::Column as ArtistColumn;
pub use artist::Entity as ArtistEntity;
pub use artist::Model as Artist;
pub use drink::ActiveModel as DrinkActive;
pub use drink::Column as DrinkColumn;
pub use drink::Entity as DrinkEntity;
pub use drink::Model as Drink;
pub use drink::{Ingredient, Recipe};
pub use show::ActiveModel as ShowActive;
pub use show::Column as ShowColumn;
pub use show::Entity as ShowEntity;
pub use show::Model as Show;
pub use venue::ActiveModel as VenueActive;
pub use venue::Column as VenueColumn;
pub use venue::Entity as VenueEntity;
pub use venue::Model as Venue;
