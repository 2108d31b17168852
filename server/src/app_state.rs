use std::sync::Arc;

use trackbox_core::core::album_service::AlbumService;

pub struct AppState {
    pub albums: AlbumService,
}

pub type SharedState = Arc<AppState>;
