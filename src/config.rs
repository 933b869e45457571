//! Environment-driven configuration

use chrono::FixedOffset;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub db_path: PathBuf,
    /// Offset applied to all date resolution and commit parsing.
    pub utc_offset: FixedOffset,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("TRAILHEAD_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8000);

        let db_path = env::var("TRAILHEAD_DB_PATH").map(PathBuf::from).unwrap_or_else(|_| {
            let home = env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".trailhead").join("trailhead.db")
        });

        let utc_offset = env::var("TRAILHEAD_UTC_OFFSET")
            .ok()
            .and_then(|s| parse_offset(&s))
            .unwrap_or_else(utc);

        Self {
            port,
            db_path,
            utc_offset,
        }
    }
}

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).expect("zero offset is valid")
}

/// Parse offsets of the form `+03:00` / `-05:30` / `04:00`.
pub fn parse_offset(s: &str) -> Option<FixedOffset> {
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => (1, s),
    };
    let (hours, minutes) = rest.split_once(':')?;
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
