use axum::{
    extract::State,
    routing::{get, post},
    Router,
};

use crate::{
    app_state::SharedState,
    envelope::{Envelope, Enveloped},
    extract::{AddTrack, AlbumPath, TrackPath, Validated},
    http_error::ApiResult,
    schema::{Album, RenameTrackRequest, Track},
};

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/album/:album_id/track", post(add_track))
        .route("/album/:album_id/tracks", get(get_all_tracks))
        .route(
            "/album/:album_id/track/:track_id",
            get(get_track).put(rename_track).delete(delete_track),
        )
}

/// Uploads the `song` file and appends it to the album as a new track.
#[utoipa::path(
    post,
    path = "/api/album/{album_id}/track",
    params(("album_id" = String, Path, description = "24 character hex id")),
    request_body(content = crate::schema::AddTrackForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Track added successfully", body = Album),
        (status = 400, body = crate::envelope::ErrorsEnvelope),
        (status = 409, body = crate::envelope::ErrorsEnvelope),
        (status = 413, body = crate::envelope::ErrorsEnvelope),
        (status = 500, body = crate::envelope::ServerErrorEnvelope),
    ),
)]
#[tracing::instrument(skip(app_state))]
pub async fn add_track(
    State(app_state): State<SharedState>,
    AddTrack(album_id, form): AddTrack,
) -> ApiResult<Enveloped<Album>> {
    let album = app_state.albums.add_track(&album_id, form.into()).await?;
    Ok(Envelope::new(album.into(), "Track added successfully"))
}

#[utoipa::path(
    get,
    path = "/api/album/{album_id}/tracks",
    params(("album_id" = String, Path, description = "24 character hex id")),
    responses(
        (status = 200, description = "Tracks retrieved successfully", body = Vec<Track>),
        (status = 400, body = crate::envelope::ErrorsEnvelope),
        (status = 500, body = crate::envelope::ServerErrorEnvelope),
    ),
)]
#[tracing::instrument(skip(app_state))]
pub async fn get_all_tracks(
    State(app_state): State<SharedState>,
    AlbumPath(album_id): AlbumPath,
) -> ApiResult<Enveloped<Vec<Track>>> {
    let tracks: Vec<Track> = app_state
        .albums
        .list_tracks(&album_id)
        .await?
        .into_iter()
        .map(Track::from)
        .collect();
    Ok(Envelope::new(tracks, "Tracks retrieved successfully"))
}

#[utoipa::path(
    get,
    path = "/api/album/{album_id}/track/{track_id}",
    params(
        ("album_id" = String, Path, description = "24 character hex id"),
        ("track_id" = String, Path, description = "24 character hex id"),
    ),
    responses(
        (status = 200, description = "Track retrieved successfully", body = Track),
        (status = 400, body = crate::envelope::ErrorsEnvelope),
        (status = 500, body = crate::envelope::ServerErrorEnvelope),
    ),
)]
#[tracing::instrument(skip(app_state))]
pub async fn get_track(
    State(app_state): State<SharedState>,
    TrackPath(album_id, track_id): TrackPath,
) -> ApiResult<Enveloped<Track>> {
    let track = app_state.albums.get_track(&album_id, &track_id).await?;
    Ok(Envelope::new(track.into(), "Track retrieved successfully"))
}

#[utoipa::path(
    put,
    path = "/api/album/{album_id}/track/{track_id}",
    params(
        ("album_id" = String, Path, description = "24 character hex id"),
        ("track_id" = String, Path, description = "24 character hex id"),
    ),
    request_body = RenameTrackRequest,
    responses(
        (status = 200, description = "Track updated successfully", body = Album),
        (status = 400, body = crate::envelope::ErrorsEnvelope),
        (status = 409, body = crate::envelope::ErrorsEnvelope),
        (status = 500, body = crate::envelope::ServerErrorEnvelope),
    ),
)]
#[tracing::instrument(skip(app_state))]
pub async fn rename_track(
    State(app_state): State<SharedState>,
    TrackPath(album_id, track_id): TrackPath,
    Validated(request): Validated<RenameTrackRequest>,
) -> ApiResult<Enveloped<Album>> {
    let album = app_state
        .albums
        .update_track(&album_id, &track_id, request.name)
        .await?;
    Ok(Envelope::new(album.into(), "Track updated successfully"))
}

/// The stored file of the track is kept.
#[utoipa::path(
    delete,
    path = "/api/album/{album_id}/track/{track_id}",
    params(
        ("album_id" = String, Path, description = "24 character hex id"),
        ("track_id" = String, Path, description = "24 character hex id"),
    ),
    responses(
        (status = 200, description = "Track deleted successfully", body = Album),
        (status = 400, body = crate::envelope::ErrorsEnvelope),
        (status = 409, body = crate::envelope::ErrorsEnvelope),
        (status = 500, body = crate::envelope::ServerErrorEnvelope),
    ),
)]
#[tracing::instrument(skip(app_state))]
pub async fn delete_track(
    State(app_state): State<SharedState>,
    TrackPath(album_id, track_id): TrackPath,
) -> ApiResult<Enveloped<Album>> {
    let album = app_state
        .albums
        .delete_track(&album_id, &track_id)
        .await?;
    Ok(Envelope::new(album.into(), "Track deleted successfully"))
}
