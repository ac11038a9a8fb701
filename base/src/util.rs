use eyre::{eyre, Result};
use lazy_static::lazy_static;
use std::fs::create_dir_all;
use std::io;
use std::path::Path;
use time::{format_description::FormatItem, macros::format_description, UtcOffset};

pub fn path_to_str(path: &Path) -> Result<String> {
    Ok(String::from(path.to_str().ok_or_else(|| {
        eyre!("Could not convert path to string: {:?}", path)
    })?))
}

pub fn mkdirp<P: AsRef<Path>>(path: P) -> io::Result<()> {
    if let Err(e) = create_dir_all(path) {
        if e.kind() != io::ErrorKind::AlreadyExists {
            return Err(e);
        }
    }
    Ok(())
}

lazy_static! {
    static ref OFFSET_FORMAT: &'static [FormatItem<'static>] =
        format_description!("[offset_hour sign:mandatory]:[offset_minute]");
}

pub fn parse_offset(s: &str) -> Option<UtcOffset> {
    match s.trim() {
        "Z" | "z" | "UTC" | "utc" => Some(UtcOffset::UTC),
        s => UtcOffset::parse(s, *OFFSET_FORMAT).ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets() {
        assert_eq!(parse_offset("+00:00"), Some(UtcOffset::UTC));
        assert_eq!(parse_offset("UTC"), Some(UtcOffset::UTC));
        assert_eq!(
            parse_offset("+05:30"),
            Some(UtcOffset::from_hms(5, 30, 0).unwrap())
        );
        assert_eq!(parse_offset("-08:00").map(|o| o.whole_hours()), Some(-8));
        assert_eq!(parse_offset("five"), None);
        assert_eq!(parse_offset("05:00"), None);
    }
}
