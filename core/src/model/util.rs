use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use eyre::{eyre, Context, Result};

/// milliseconds since UNIX epoch
pub fn datetime_to_db_repr(d: &DateTime<Utc>) -> i64 {
    d.timestamp_millis()
}

/// From milliseconds since UNIX epoch
pub fn datetime_from_db_repr(unix_millis: i64) -> Result<DateTime<Utc>> {
    match Utc.timestamp_millis_opt(unix_millis) {
        chrono::LocalResult::Single(dt) => Ok(dt),
        _ => Err(eyre!(
            "error converting unix millis epoch to DateTime: {}",
            unix_millis
        )),
    }
}

const DB_DATE_FORMAT: &str = "%Y-%m-%d";

pub fn date_to_db_repr(d: &NaiveDate) -> String {
    d.format(DB_DATE_FORMAT).to_string()
}

pub fn date_from_db_repr(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DB_DATE_FORMAT)
        .wrap_err_with(|| format!("error parsing date from db value '{}'", s))
}
