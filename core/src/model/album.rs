use chrono::{DateTime, NaiveDate, Utc};

use super::{AlbumId, TrackId, Upload};

/// An album document together with its embedded tracks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Album {
    pub id: AlbumId,
    pub name: String,
    pub description: String,
    pub date: NaiveDate,
    pub tracks: Vec<Track>,
    /// Incremented on every write, checked before the track list is replaced
    pub revision: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    /// Public URL of the uploaded audio file
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAlbum {
    pub name: String,
    pub description: String,
    pub date: NaiveDate,
}

/// Partial update, `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlbumUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

impl AlbumUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.date.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct NewTrack {
    pub name: String,
    pub upload: Upload,
}
