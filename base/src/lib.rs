pub mod database;
pub mod setting;
pub mod util;

pub const CLI_NAME: &str = "stagedoor";
pub const VERSION: &str = "0.1.0";

// logging constants
pub const STAGEDOOR_LOGLEVEL: &str = "STAGEDOOR_LOGLEVEL";
