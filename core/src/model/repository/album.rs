use chrono::{DateTime, Utc};
use diesel::prelude::*;
use eyre::{Context, Result};
use tracing::instrument;

use crate::model::{util::datetime_to_db_repr, Album, AlbumId, AlbumUpdate, Track};

use super::db::DbConn;
use super::db_entity::{tracks_to_db_repr, DbAlbum, DbAlbumChanges};
use super::schema;

/// Result of writing a new track list back to an album document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TracksWrite {
    Written(Album),
    /// The document changed since it was read, nothing was written
    StaleRevision,
    Missing,
}

#[instrument(skip(conn, album), fields(album_id = %album.id), level = "debug")]
pub fn insert_album(conn: &mut DbConn, album: &Album) -> Result<()> {
    use schema::Album;
    let db_album: DbAlbum = album.try_into()?;
    diesel::insert_into(Album::table)
        .values(&db_album)
        .execute(conn)
        .wrap_err("could not insert into table Album")?;
    Ok(())
}

#[instrument(skip(conn), level = "debug")]
pub fn get_album(conn: &mut DbConn, album_id: &AlbumId) -> Result<Option<Album>> {
    use schema::Album;
    let db_album: Option<DbAlbum> = Album::table
        .find(album_id.as_str())
        .select(DbAlbum::as_select())
        .first(conn)
        .optional()
        .wrap_err("could not query single row from table Album")?;
    db_album.map(|db_album| db_album.try_into()).transpose()
}

/// Get all albums ordered by created_at (ascending)
#[instrument(skip(conn), level = "debug")]
pub fn get_all_albums(conn: &mut DbConn) -> Result<Vec<Album>> {
    use schema::Album;
    let db_albums: Vec<DbAlbum> = Album::table
        .select(DbAlbum::as_select())
        .order((Album::created_at.asc(), Album::album_id.asc()))
        .load(conn)
        .wrap_err("could not query table Album")?;
    db_albums
        .into_iter()
        .map(|db_album| db_album.try_into())
        .collect::<Result<Vec<_>>>()
}

/// Overwrites the fields set in `update` and returns the album after the update,
/// or None if there is no album with this id.
#[instrument(skip(conn), level = "debug")]
pub fn update_album_fields(
    conn: &mut DbConn,
    album_id: &AlbumId,
    update: &AlbumUpdate,
    now: DateTime<Utc>,
) -> Result<Option<Album>> {
    use schema::Album;
    let changes = DbAlbumChanges::from(update);
    let db_album: Option<DbAlbum> = diesel::update(Album::table.find(album_id.as_str()))
        .set((
            changes,
            Album::revision.eq(Album::revision + 1_i64),
            Album::updated_at.eq(datetime_to_db_repr(&now)),
        ))
        .returning(DbAlbum::as_returning())
        .get_result(conn)
        .optional()
        .wrap_err("could not update table Album")?;
    db_album.map(|db_album| db_album.try_into()).transpose()
}

/// Replaces the embedded track list if the stored revision still equals
/// `expected_revision`.
#[instrument(skip(conn, tracks), fields(num_tracks = tracks.len()), level = "debug")]
pub fn replace_tracks(
    conn: &mut DbConn,
    album_id: &AlbumId,
    expected_revision: i64,
    tracks: &[Track],
    now: DateTime<Utc>,
) -> Result<TracksWrite> {
    use schema::Album;
    let tracks_json = tracks_to_db_repr(tracks)?;
    let written: Option<DbAlbum> = diesel::update(
        Album::table
            .filter(Album::album_id.eq(album_id.as_str()))
            .filter(Album::revision.eq(expected_revision)),
    )
    .set((
        Album::tracks.eq(tracks_json),
        Album::revision.eq(expected_revision + 1),
        Album::updated_at.eq(datetime_to_db_repr(&now)),
    ))
    .returning(DbAlbum::as_returning())
    .get_result(conn)
    .optional()
    .wrap_err("could not update column Album.tracks")?;
    if let Some(db_album) = written {
        return Ok(TracksWrite::Written(db_album.try_into()?));
    }
    let still_exists: i64 = Album::table
        .filter(Album::album_id.eq(album_id.as_str()))
        .count()
        .get_result(conn)
        .wrap_err("could not query table Album")?;
    if still_exists > 0 {
        Ok(TracksWrite::StaleRevision)
    } else {
        Ok(TracksWrite::Missing)
    }
}

/// Returns whether a row was deleted
#[instrument(skip(conn), level = "debug")]
pub fn delete_album(conn: &mut DbConn, album_id: &AlbumId) -> Result<bool> {
    use schema::Album;
    let num_deleted = diesel::delete(Album::table.find(album_id.as_str()))
        .execute(conn)
        .wrap_err("could not delete from table Album")?;
    Ok(num_deleted > 0)
}
