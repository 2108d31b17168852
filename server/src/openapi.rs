use utoipa::OpenApi;

use crate::{envelope, routes, schema};

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::album::create_album,
        routes::album::get_all_albums,
        routes::album::get_album,
        routes::album::update_album,
        routes::album::delete_album,
        routes::track::add_track,
        routes::track::get_all_tracks,
        routes::track::get_track,
        routes::track::rename_track,
        routes::track::delete_track,
    ),
    components(schemas(
        schema::Album,
        schema::Track,
        schema::CreateAlbumRequest,
        schema::UpdateAlbumRequest,
        schema::RenameTrackRequest,
        schema::AddTrackForm,
        envelope::ErrorsEnvelope,
        envelope::ServerErrorEnvelope,
    )),
    tags((name = "trackbox"))
)]
pub struct ApiDoc;
