use chrono::Utc;
use tracing::{debug, instrument, warn, Instrument};

use crate::{
    interact,
    model::{
        repository::{self, album::TracksWrite, db::DbPool},
        track_list::{self, TrackListError},
        Album, AlbumId, AlbumUpdate, NewAlbum, NewTrack, Track, TrackId,
    },
};

use super::storage::{Storage, StorageError, StorageProvider};

pub const ALBUM_NOT_FOUND: &str = "Album with id does not exist";
pub const TRACK_NOT_FOUND: &str = "Track with id does not exist";
pub const TRACK_ALREADY_EXISTS: &str = "Track with id already exists";
pub const CONCURRENT_MODIFICATION: &str = "Album was modified concurrently, retry the request";

#[derive(thiserror::Error, Debug)]
pub enum AlbumError {
    #[error("{}", .0.join(", "))]
    NotFound(Vec<String>),
    #[error("{}", .0.join(", "))]
    BadRequest(Vec<String>),
    #[error("album {0} was modified concurrently")]
    Conflict(AlbumId),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] eyre::Report),
}

impl AlbumError {
    pub fn album_not_found() -> AlbumError {
        AlbumError::NotFound(vec![ALBUM_NOT_FOUND.to_owned()])
    }

    pub fn track_not_found() -> AlbumError {
        AlbumError::NotFound(vec![TRACK_NOT_FOUND.to_owned()])
    }

    /// Messages that can be shown to clients. Empty for internal errors.
    pub fn client_messages(&self) -> Vec<String> {
        match self {
            AlbumError::NotFound(messages) | AlbumError::BadRequest(messages) => messages.clone(),
            AlbumError::Conflict(_) => vec![CONCURRENT_MODIFICATION.to_owned()],
            AlbumError::Storage(_) | AlbumError::Other(_) => Vec::new(),
        }
    }
}

impl From<TrackListError> for AlbumError {
    fn from(value: TrackListError) -> Self {
        match value {
            TrackListError::NotFound(_) => AlbumError::track_not_found(),
            TrackListError::DuplicateId(_) => {
                AlbumError::BadRequest(vec![TRACK_ALREADY_EXISTS.to_owned()])
            }
        }
    }
}

/// Create/read/update/delete for albums and the tracks embedded in them.
///
/// Track operations read the whole album, edit a copy of its track list and
/// write the list back only if the album's revision is unchanged.
#[derive(Clone)]
pub struct AlbumService {
    pool: DbPool,
    storage: Storage,
}

impl AlbumService {
    pub fn new(pool: DbPool, storage: Storage) -> AlbumService {
        AlbumService { pool, storage }
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn create_album(&self, new_album: NewAlbum) -> Result<Album, AlbumError> {
        let now = Utc::now();
        let album = Album {
            id: AlbumId::generate(),
            name: new_album.name,
            description: new_album.description,
            date: new_album.date,
            tracks: Vec::new(),
            revision: 0,
            created_at: now,
            updated_at: now,
        };
        let conn = self.pool.get().in_current_span().await?;
        let album_copy = album.clone();
        interact!(conn, move |conn| {
            repository::album::insert_album(conn, &album_copy)
        })
        .await??;
        Ok(album)
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn get_album(&self, album_id: &AlbumId) -> Result<Album, AlbumError> {
        self.load_album(album_id).await
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn list_albums(&self) -> Result<Vec<Album>, AlbumError> {
        let conn = self.pool.get().in_current_span().await?;
        let albums = interact!(conn, move |conn| repository::album::get_all_albums(conn)).await??;
        Ok(albums)
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn update_album(
        &self,
        album_id: &AlbumId,
        update: AlbumUpdate,
    ) -> Result<Album, AlbumError> {
        let conn = self.pool.get().in_current_span().await?;
        let id = album_id.clone();
        interact!(conn, move |conn| {
            repository::album::update_album_fields(conn, &id, &update, Utc::now())
        })
        .await??
        .ok_or_else(AlbumError::album_not_found)
    }

    /// Succeeds whether or not the album existed.
    #[instrument(skip(self), level = "debug")]
    pub async fn delete_album(&self, album_id: &AlbumId) -> Result<(), AlbumError> {
        let conn = self.pool.get().in_current_span().await?;
        let id = album_id.clone();
        let deleted =
            interact!(conn, move |conn| repository::album::delete_album(conn, &id)).await??;
        debug!(deleted, "delete album");
        Ok(())
    }

    /// Uploads the track's file and appends the track to the album.
    ///
    /// Nothing is uploaded if the album does not exist. If the album can not be
    /// saved after the upload, the uploaded object is removed again.
    #[instrument(skip(self), level = "debug")]
    pub async fn add_track(
        &self,
        album_id: &AlbumId,
        new_track: NewTrack,
    ) -> Result<Album, AlbumError> {
        self.add_track_with_id(album_id, TrackId::generate(), new_track)
            .await
    }

    async fn add_track_with_id(
        &self,
        album_id: &AlbumId,
        track_id: TrackId,
        new_track: NewTrack,
    ) -> Result<Album, AlbumError> {
        self.load_album(album_id).await?;
        let stored = self.storage.upload(&new_track.upload).await?;
        let track = Track {
            id: track_id,
            name: new_track.name,
            file: stored.url.clone(),
        };
        let result = self.append_track(album_id, track).await;
        if let Err(err) = &result {
            debug!(key = %stored.key, "removing orphaned upload after error: {}", err);
            if let Err(delete_err) = self.storage.delete(&stored.key).await {
                warn!(
                    key = %stored.key,
                    "could not remove orphaned upload: {:?}",
                    delete_err
                );
            }
        }
        result
    }

    async fn append_track(&self, album_id: &AlbumId, track: Track) -> Result<Album, AlbumError> {
        let album = self.load_album(album_id).await?;
        let tracks = track_list::with_appended(&album.tracks, track)?;
        self.save_tracks(&album, tracks).await
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn get_track(
        &self,
        album_id: &AlbumId,
        track_id: &TrackId,
    ) -> Result<Track, AlbumError> {
        let album = self.load_album(album_id).await?;
        track_list::find(&album.tracks, track_id)
            .cloned()
            .ok_or_else(AlbumError::track_not_found)
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn list_tracks(&self, album_id: &AlbumId) -> Result<Vec<Track>, AlbumError> {
        let album = self.load_album(album_id).await?;
        Ok(album.tracks)
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn update_track(
        &self,
        album_id: &AlbumId,
        track_id: &TrackId,
        name: String,
    ) -> Result<Album, AlbumError> {
        let album = self.load_album(album_id).await?;
        let tracks = track_list::with_renamed(&album.tracks, track_id, name)?;
        self.save_tracks(&album, tracks).await
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn delete_track(
        &self,
        album_id: &AlbumId,
        track_id: &TrackId,
    ) -> Result<Album, AlbumError> {
        let album = self.load_album(album_id).await?;
        let tracks = track_list::without(&album.tracks, track_id)?;
        self.save_tracks(&album, tracks).await
    }

    async fn load_album(&self, album_id: &AlbumId) -> Result<Album, AlbumError> {
        let conn = self.pool.get().in_current_span().await?;
        let id = album_id.clone();
        interact!(conn, move |conn| repository::album::get_album(conn, &id))
            .await??
            .ok_or_else(AlbumError::album_not_found)
    }

    /// Writes `tracks` back to `album`, guarded by the revision `album` was read at.
    async fn save_tracks(&self, album: &Album, tracks: Vec<Track>) -> Result<Album, AlbumError> {
        let conn = self.pool.get().in_current_span().await?;
        let id = album.id.clone();
        let revision = album.revision;
        let write = interact!(conn, move |conn| {
            repository::album::replace_tracks(conn, &id, revision, &tracks, Utc::now())
        })
        .await??;
        match write {
            TracksWrite::Written(album) => Ok(album),
            TracksWrite::Missing => Err(AlbumError::album_not_found()),
            TracksWrite::StaleRevision => {
                warn!(album_id = %album.id, revision, "album changed while editing tracks");
                Err(AlbumError::Conflict(album.id.clone()))
            }
        }
    }
}
