use diesel::{AsChangeset, Insertable, Queryable, Selectable};
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::{
    util::{date_from_db_repr, date_to_db_repr, datetime_from_db_repr, datetime_to_db_repr},
    Album, AlbumUpdate, Track,
};

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable)]
#[diesel(table_name = super::super::schema::Album)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DbAlbum {
    pub album_id: String,
    pub name: String,
    pub description: String,
    pub release_date: String,
    pub tracks: String,
    pub revision: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Track sub-document as stored inside `Album.tracks`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbTrack {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Eq, AsChangeset)]
#[diesel(table_name = super::super::schema::Album)]
pub struct DbAlbumChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub release_date: Option<String>,
}

impl From<&AlbumUpdate> for DbAlbumChanges {
    fn from(value: &AlbumUpdate) -> Self {
        DbAlbumChanges {
            name: value.name.clone(),
            description: value.description.clone(),
            release_date: value.date.as_ref().map(date_to_db_repr),
        }
    }
}

impl From<&Track> for DbTrack {
    fn from(value: &Track) -> Self {
        DbTrack {
            id: value.id.to_string(),
            name: value.name.clone(),
            file: value.file.clone(),
        }
    }
}

impl TryFrom<DbTrack> for Track {
    type Error = eyre::Report;

    fn try_from(value: DbTrack) -> Result<Self, Self::Error> {
        Ok(Track {
            id: value.id.parse()?,
            name: value.name,
            file: value.file,
        })
    }
}

pub fn tracks_to_db_repr(tracks: &[Track]) -> Result<String> {
    let db_tracks: Vec<DbTrack> = tracks.iter().map(DbTrack::from).collect();
    serde_json::to_string(&db_tracks).wrap_err("error serializing track list")
}

pub fn tracks_from_db_repr(s: &str) -> Result<Vec<Track>> {
    let db_tracks: Vec<DbTrack> =
        serde_json::from_str(s).wrap_err("error deserializing track list from db value")?;
    db_tracks
        .into_iter()
        .map(|db_track| db_track.try_into())
        .collect::<Result<Vec<_>>>()
}

impl TryFrom<&Album> for DbAlbum {
    type Error = eyre::Report;

    fn try_from(value: &Album) -> Result<Self, Self::Error> {
        Ok(DbAlbum {
            album_id: value.id.to_string(),
            name: value.name.clone(),
            description: value.description.clone(),
            release_date: date_to_db_repr(&value.date),
            tracks: tracks_to_db_repr(&value.tracks)?,
            revision: value.revision,
            created_at: datetime_to_db_repr(&value.created_at),
            updated_at: datetime_to_db_repr(&value.updated_at),
        })
    }
}

impl TryFrom<DbAlbum> for Album {
    type Error = eyre::Report;

    fn try_from(value: DbAlbum) -> Result<Self, Self::Error> {
        Ok(Album {
            id: value.album_id.parse()?,
            name: value.name,
            description: value.description,
            date: date_from_db_repr(&value.release_date)?,
            tracks: tracks_from_db_repr(&value.tracks)?,
            revision: value.revision,
            created_at: datetime_from_db_repr(value.created_at)?,
            updated_at: datetime_from_db_repr(value.updated_at)?,
        })
    }
}
