use axum::{extract::DefaultBodyLimit, http::Method, routing::get, Json, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use utoipa::OpenApi;

use crate::{app_state::SharedState, openapi::ApiDoc};

pub mod album;
pub mod track;

#[cfg(test)]
mod test;

async fn get_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .merge(album::router())
        .merge(track::router())
        .route("/openapi.json", get(get_openapi))
}

/// The complete application: the API under `/api` with body limit, tracing and CORS layers.
pub fn app(shared_state: SharedState, max_upload_size: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_origin(Any);
    Router::new()
        .nest("/api", api_router())
        .layer(DefaultBodyLimit::max(max_upload_size))
        .layer(
            ServiceBuilder::new()
                .set_x_request_id(MakeRequestUuid)
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().include_headers(true))
                        .on_response(DefaultOnResponse::new().include_headers(true)),
                )
                .propagate_x_request_id(),
        )
        .layer(cors)
        .with_state(shared_state)
}
