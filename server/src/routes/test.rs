use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use camino::Utf8PathBuf as PathBuf;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use trackbox_core::{
    core::{
        album_service::{AlbumService, ALBUM_NOT_FOUND, CONCURRENT_MODIFICATION, TRACK_NOT_FOUND},
        storage::{LocalFileStorage, Storage},
    },
    model::{repository::db, AlbumId},
};

use crate::{
    app_state::AppState,
    http_error::{INTERNAL_SERVER_ERROR, PAYLOAD_TOO_LARGE},
    validation::{
        ALBUM_DATE_REQUIRED, ALBUM_DESCRIPTION_REQUIRED, ALBUM_NAME_REQUIRED,
        ALBUM_NAME_TOO_SHORT, BODY_NOT_AN_OBJECT, INVALID_ALBUM_ID, INVALID_TRACK_ID,
        TRACK_FILE_REQUIRED, TRACK_NAME_REQUIRED,
    },
};

use super::app;

const BOUNDARY: &str = "trackbox-test-boundary";

struct TestApp {
    router: Router,
    uploads: PathBuf,
    _dir: TempDir,
}

async fn test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("trackbox.db");
    let pool = db::setup_db_pool(db_path.to_str().unwrap()).await.unwrap();
    let uploads = PathBuf::from_path_buf(dir.path().join("uploads")).unwrap();
    let storage: Storage = LocalFileStorage::new(
        uploads.clone(),
        Some("http://localhost:3000/uploads".to_owned()),
    )
    .into();
    let state = Arc::new(AppState {
        albums: AlbumService::new(pool, storage),
    });
    TestApp {
        router: app(state, 1024 * 1024),
        uploads,
        _dir: dir,
    }
}

async fn read_response(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        read_response(response).await
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    async fn send_json(&self, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(json_request(method, uri, body)).await
    }

    async fn create_demo_album(&self) -> String {
        let (status, body) = self
            .send_json(
                "POST",
                "/api/album",
                json!({ "name": "Demo", "description": "A demo", "date": "2024-01-01" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["data"]["id"].as_str().unwrap().to_owned()
    }

    async fn add_track(&self, album_id: &str, parts: &[FormPart<'_>]) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri(format!("/api/album/{}/track", album_id))
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(multipart_body(parts)))
                .unwrap(),
        )
        .await
    }
}

enum FormPart<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

fn multipart_body(parts: &[FormPart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            FormPart::Text(name, value) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                        name, value
                    )
                    .as_bytes(),
                );
            }
            FormPart::File(name, file_name, contents) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: audio/mpeg\r\n\r\n",
                        name, file_name
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(contents);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn errors(messages: &[&str]) -> Value {
    json!({ "success": false, "errors": messages })
}

#[tokio::test]
async fn create_album_responds_with_envelope() {
    let app = test_app().await;
    let (status, body) = app
        .send_json(
            "POST",
            "/api/album",
            json!({ "name": "Demo", "description": "A demo", "date": "2024-01-01" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], json!("Album created successfully"));
    assert_eq!(body["data"]["name"], json!("Demo"));
    assert_eq!(body["data"]["date"], json!("2024-01-01"));
    assert_eq!(body["data"]["tracks"], json!([]));
    let id = body["data"]["id"].as_str().unwrap();
    assert!(id.parse::<AlbumId>().is_ok());
    assert!(body["data"].get("revision").is_none());

    let (status, body) = app.get("/api/albums").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Albums retrieved successfully"));
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn create_album_with_invalid_body() {
    let app = test_app().await;
    let (status, body) = app
        .send_json("POST", "/api/album", json!({ "name": 1, "date": "soon" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        errors(&[
            ALBUM_NAME_REQUIRED,
            ALBUM_DESCRIPTION_REQUIRED,
            ALBUM_DATE_REQUIRED
        ])
    );

    let (status, body) = app
        .send_json("POST", "/api/album", json!(["not", "an", "object"]))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, errors(&[BODY_NOT_AN_OBJECT]));

    let (status, body) = app.get("/api/albums").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn invalid_ids_are_rejected() {
    let app = test_app().await;
    let (status, body) = app.get("/api/album/not-an-id").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, errors(&[INVALID_ALBUM_ID]));

    let (status, body) = app.get("/api/album/xyz/track/123").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, errors(&[INVALID_ALBUM_ID, INVALID_TRACK_ID]));

    let album_id = app.create_demo_album().await;
    let (status, body) = app
        .get(&format!("/api/album/{}/track/123", album_id))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, errors(&[INVALID_TRACK_ID]));
}

#[tokio::test]
async fn missing_album() {
    let app = test_app().await;
    let missing = AlbumId::generate();
    let (status, body) = app.get(&format!("/api/album/{}", missing)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, errors(&[ALBUM_NOT_FOUND]));

    let (status, body) = app
        .send_json(
            "PUT",
            &format!("/api/album/{}", missing),
            json!({ "name": "Renamed" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, errors(&[ALBUM_NOT_FOUND]));

    let (status, body) = app.delete(&format!("/api/album/{}", missing)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "success": true, "data": null, "message": "Album deleted successfully" })
    );
}

#[tokio::test]
async fn update_album() {
    let app = test_app().await;
    let album_id = app.create_demo_album().await;
    let uri = format!("/api/album/{}", album_id);

    let (status, body) = app.send_json("PUT", &uri, json!({ "name": "x" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, errors(&[ALBUM_NAME_TOO_SHORT]));

    let (status, body) = app
        .send_json("PUT", &uri, json!({ "name": "Renamed", "date": "2023-05-06" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Album updated successfully"));
    assert_eq!(body["data"]["name"], json!("Renamed"));
    assert_eq!(body["data"]["description"], json!("A demo"));
    assert_eq!(body["data"]["date"], json!("2023-05-06"));

    let (status, body) = app.delete(&uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], Value::Null);
    let (status, _) = app.get(&uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn track_lifecycle() {
    let app = test_app().await;
    let album_id = app.create_demo_album().await;

    let (status, body) = app
        .add_track(
            &album_id,
            &[
                FormPart::Text("name", "Intro"),
                FormPart::File("song", "intro.mp3", b"ID3 intro"),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Track added successfully"));
    let track = &body["data"]["tracks"][0];
    assert_eq!(track["name"], json!("Intro"));
    let file = track["file"].as_str().unwrap();
    assert!(file.starts_with("http://localhost:3000/uploads/"));
    assert!(file.ends_with(".mp3"));
    let key = file.rsplit('/').next().unwrap();
    let stored = tokio::fs::read(app.uploads.join(key)).await.unwrap();
    assert_eq!(stored, b"ID3 intro");
    let track_id = track["id"].as_str().unwrap().to_owned();

    let (status, body) = app
        .add_track(
            &album_id,
            &[
                FormPart::File("song", "outro.ogg", b"OggS outro"),
                FormPart::Text("name", "Outro"),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tracks"].as_array().unwrap().len(), 2);

    let track_uri = format!("/api/album/{}/track/{}", album_id, track_id);
    let (status, body) = app
        .send_json("PUT", &track_uri, json!({ "name": "Overture" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Track updated successfully"));
    assert_eq!(body["data"]["tracks"][0]["name"], json!("Overture"));
    assert_eq!(body["data"]["tracks"][0]["file"], json!(file));

    let (status, body) = app.get(&track_uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Track retrieved successfully"));
    assert_eq!(body["data"]["name"], json!("Overture"));

    let (status, body) = app.delete(&track_uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Track deleted successfully"));

    let (status, body) = app
        .get(&format!("/api/album/{}/tracks", album_id))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Tracks retrieved successfully"));
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|track| track["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Outro"]);

    let (status, body) = app.get(&track_uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, errors(&[TRACK_NOT_FOUND]));
}

#[tokio::test]
async fn add_track_form_validation() {
    let app = test_app().await;
    let album_id = app.create_demo_album().await;

    let (status, body) = app
        .add_track(&album_id, &[FormPart::Text("name", "Intro")])
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, errors(&[TRACK_FILE_REQUIRED]));

    let (status, body) = app
        .add_track(
            &album_id,
            &[
                FormPart::Text("name", ""),
                FormPart::File("song", "a.mp3", b"x"),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, errors(&[TRACK_NAME_REQUIRED]));

    let (status, body) = app
        .add_track(
            &AlbumId::generate().to_string(),
            &[
                FormPart::Text("name", "Intro"),
                FormPart::File("song", "a.mp3", b"x"),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, errors(&[ALBUM_NOT_FOUND]));
    assert!(!app.uploads.exists());
}

#[tokio::test]
async fn add_track_reports_path_and_form_errors_together() {
    let app = test_app().await;
    let (status, body) = app
        .add_track("not-an-id", &[FormPart::Text("name", "Intro")])
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, errors(&[INVALID_ALBUM_ID, TRACK_FILE_REQUIRED]));
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let app = test_app().await;
    let album_id = app.create_demo_album().await;
    let song = vec![0u8; 2 * 1024 * 1024];

    let (status, body) = app
        .add_track(
            &album_id,
            &[
                FormPart::Text("name", "Intro"),
                FormPart::File("song", "big.mp3", &song),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body, errors(&[PAYLOAD_TOO_LARGE]));
    assert!(!app.uploads.exists());

    let (_, body) = app.get(&format!("/api/album/{}", album_id)).await;
    assert_eq!(body["data"]["tracks"], json!([]));
}

#[tokio::test]
async fn concurrent_renames_conflict() {
    let app = test_app().await;
    let album_id = app.create_demo_album().await;
    let (_, body) = app
        .add_track(
            &album_id,
            &[
                FormPart::Text("name", "Intro"),
                FormPart::File("song", "intro.mp3", b"ID3 intro"),
            ],
        )
        .await;
    let track_id = body["data"]["tracks"][0]["id"].as_str().unwrap().to_owned();
    let track_uri = format!("/api/album/{}/track/{}", album_id, track_id);

    let mut renames = tokio::task::JoinSet::new();
    for i in 0..16 {
        let router = app.router.clone();
        let request = json_request("PUT", &track_uri, json!({ "name": format!("Take {}", i) }));
        renames.spawn(async move { read_response(router.oneshot(request).await.unwrap()).await });
    }
    let mut succeeded = Vec::new();
    while let Some(result) = renames.join_next().await {
        let (status, body) = result.unwrap();
        match status {
            StatusCode::OK => succeeded.push(body["data"]["tracks"][0]["name"].clone()),
            StatusCode::CONFLICT => {
                assert_eq!(body, errors(&[CONCURRENT_MODIFICATION]))
            }
            other => panic!("unexpected status {} with body {}", other, body),
        }
    }
    assert!(!succeeded.is_empty());

    let (status, body) = app.get(&track_uri).await;
    assert_eq!(status, StatusCode::OK);
    assert!(succeeded.contains(&body["data"]["name"]));
}

#[tokio::test]
async fn storage_failure_is_an_internal_error() {
    let app = test_app().await;
    let album_id = app.create_demo_album().await;
    // a plain file where the upload directory should be
    tokio::fs::write(&app.uploads, b"in the way").await.unwrap();

    let (status, body) = app
        .add_track(
            &album_id,
            &[
                FormPart::Text("name", "Intro"),
                FormPart::File("song", "a.mp3", b"x"),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": INTERNAL_SERVER_ERROR }));
}

#[tokio::test]
async fn serves_openapi_document() {
    let app = test_app().await;
    let (status, body) = app.get("/api/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]
        .as_object()
        .unwrap()
        .contains_key("/api/album/{album_id}/track/{track_id}"));
}
