use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};

use crate::{
    app_state::SharedState,
    envelope::{Envelope, Enveloped},
    extract::{AlbumPath, Validated},
    http_error::ApiResult,
    schema::{Album, CreateAlbumRequest, UpdateAlbumRequest},
};

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/album", post(create_album))
        .route("/albums", get(get_all_albums))
        .route(
            "/album/:album_id",
            get(get_album).put(update_album).delete(delete_album),
        )
}

#[utoipa::path(
    post,
    path = "/api/album",
    request_body = CreateAlbumRequest,
    responses(
        (status = 201, description = "Album created successfully", body = Album),
        (status = 400, body = crate::envelope::ErrorsEnvelope),
        (status = 500, body = crate::envelope::ServerErrorEnvelope),
    ),
)]
#[tracing::instrument(skip(app_state))]
pub async fn create_album(
    State(app_state): State<SharedState>,
    Validated(request): Validated<CreateAlbumRequest>,
) -> ApiResult<(StatusCode, Enveloped<Album>)> {
    let album = app_state.albums.create_album(request.into()).await?;
    Ok((
        StatusCode::CREATED,
        Envelope::new(album.into(), "Album created successfully"),
    ))
}

#[utoipa::path(
    get,
    path = "/api/albums",
    responses(
        (status = 200, description = "Albums retrieved successfully", body = Vec<Album>),
        (status = 500, body = crate::envelope::ServerErrorEnvelope),
    ),
)]
#[tracing::instrument(skip(app_state))]
pub async fn get_all_albums(
    State(app_state): State<SharedState>,
) -> ApiResult<Enveloped<Vec<Album>>> {
    let albums: Vec<Album> = app_state
        .albums
        .list_albums()
        .await?
        .into_iter()
        .map(Album::from)
        .collect();
    Ok(Envelope::new(albums, "Albums retrieved successfully"))
}

#[utoipa::path(
    get,
    path = "/api/album/{album_id}",
    params(("album_id" = String, Path, description = "24 character hex id")),
    responses(
        (status = 200, description = "Album retrieved successfully", body = Album),
        (status = 400, body = crate::envelope::ErrorsEnvelope),
        (status = 500, body = crate::envelope::ServerErrorEnvelope),
    ),
)]
#[tracing::instrument(skip(app_state))]
pub async fn get_album(
    State(app_state): State<SharedState>,
    AlbumPath(album_id): AlbumPath,
) -> ApiResult<Enveloped<Album>> {
    let album = app_state.albums.get_album(&album_id).await?;
    Ok(Envelope::new(album.into(), "Album retrieved successfully"))
}

#[utoipa::path(
    put,
    path = "/api/album/{album_id}",
    params(("album_id" = String, Path, description = "24 character hex id")),
    request_body = UpdateAlbumRequest,
    responses(
        (status = 200, description = "Album updated successfully", body = Album),
        (status = 400, body = crate::envelope::ErrorsEnvelope),
        (status = 500, body = crate::envelope::ServerErrorEnvelope),
    ),
)]
#[tracing::instrument(skip(app_state))]
pub async fn update_album(
    State(app_state): State<SharedState>,
    AlbumPath(album_id): AlbumPath,
    Validated(request): Validated<UpdateAlbumRequest>,
) -> ApiResult<Enveloped<Album>> {
    let album = app_state
        .albums
        .update_album(&album_id, request.into())
        .await?;
    Ok(Envelope::new(album.into(), "Album updated successfully"))
}

/// Responds with success whether or not the album existed.
#[utoipa::path(
    delete,
    path = "/api/album/{album_id}",
    params(("album_id" = String, Path, description = "24 character hex id")),
    responses(
        (status = 200, description = "Album deleted successfully"),
        (status = 400, body = crate::envelope::ErrorsEnvelope),
        (status = 500, body = crate::envelope::ServerErrorEnvelope),
    ),
)]
#[tracing::instrument(skip(app_state))]
pub async fn delete_album(
    State(app_state): State<SharedState>,
    AlbumPath(album_id): AlbumPath,
) -> ApiResult<Enveloped<()>> {
    app_state.albums.delete_album(&album_id).await?;
    Ok(Envelope::new((), "Album deleted successfully"))
}
