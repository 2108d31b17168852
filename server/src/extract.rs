use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Multipart, Path, Request},
    http::{request::Parts, StatusCode},
    Json,
};
use serde_json::Value;
use tracing::debug;

use trackbox_core::model::{AlbumId, TrackId, Upload};

use crate::{
    http_error::HttpError,
    schema::AddTrackForm,
    validation::{
        Validate, ValidationErrors, BODY_NOT_AN_OBJECT, BODY_NOT_A_FORM, INVALID_ALBUM_ID,
        INVALID_TRACK_ID, TRACK_FILE_REQUIRED, TRACK_NAME_REQUIRED,
    },
};

/// `/album/:album_id`
#[derive(Debug, Clone)]
pub struct AlbumPath(pub AlbumId);

/// `/album/:album_id/track/:track_id`
#[derive(Debug, Clone)]
pub struct TrackPath(pub AlbumId, pub TrackId);

#[async_trait]
impl<S> FromRequestParts<S> for AlbumPath
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(album_id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ValidationErrors::single(INVALID_ALBUM_ID))?;
        let album_id = album_id
            .parse()
            .map_err(|_| ValidationErrors::single(INVALID_ALBUM_ID))?;
        Ok(AlbumPath(album_id))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for TrackPath
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path((album_id, track_id)) = Path::<(String, String)>::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                let mut errors = ValidationErrors::single(INVALID_ALBUM_ID);
                errors.push(INVALID_TRACK_ID);
                errors
            })?;
        let album_id = album_id.parse::<AlbumId>();
        let track_id = track_id.parse::<TrackId>();
        match (album_id, track_id) {
            (Ok(album_id), Ok(track_id)) => Ok(TrackPath(album_id, track_id)),
            (album_id, track_id) => {
                let mut errors = ValidationErrors::default();
                if album_id.is_err() {
                    errors.push(INVALID_ALBUM_ID);
                }
                if track_id.is_err() {
                    errors.push(INVALID_TRACK_ID);
                }
                Err(errors.into())
            }
        }
    }
}

/// JSON object body that passed `T`'s validation rules.
#[derive(Debug, Clone)]
pub struct Validated<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Validated<T>
where
    S: Send + Sync,
    T: Validate,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| {
                debug!("rejected body: {}", rejection.body_text());
                ValidationErrors::single(BODY_NOT_AN_OBJECT)
            })?;
        let Value::Object(body) = body else {
            return Err(ValidationErrors::single(BODY_NOT_AN_OBJECT).into());
        };
        Ok(Validated(T::validate(&body)?))
    }
}

/// Reading the form failed with `status`, `message` unless the body was too large.
fn form_error(status: StatusCode, message: &'static str) -> HttpError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        HttpError::PayloadTooLarge
    } else {
        ValidationErrors::single(message).into()
    }
}

#[async_trait]
impl<S> FromRequest<S> for AddTrackForm
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rejection| {
                debug!("rejected form: {}", rejection.body_text());
                form_error(rejection.status(), BODY_NOT_A_FORM)
            })?;

        let mut name: Option<String> = None;
        let mut song: Option<Upload> = None;
        while let Some(field) = multipart.next_field().await.map_err(|err| {
            debug!("error reading form: {}", err);
            form_error(err.status(), BODY_NOT_A_FORM)
        })? {
            let field_name = field.name().unwrap_or_default().to_owned();
            match field_name.as_str() {
                "name" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|err| form_error(err.status(), TRACK_NAME_REQUIRED))?;
                    name = Some(text);
                }
                "song" => {
                    let Some(original_name) = field.file_name().map(str::to_owned) else {
                        continue;
                    };
                    let mime_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_owned();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|err| form_error(err.status(), TRACK_FILE_REQUIRED))?;
                    song = Some(Upload {
                        bytes,
                        original_name,
                        mime_type,
                    });
                }
                other => debug!("ignoring form field '{}'", other),
            }
        }

        match (name.filter(|name| !name.is_empty()), song) {
            (Some(name), Some(song)) => Ok(AddTrackForm { name, song }),
            (name, song) => {
                let mut errors = ValidationErrors::default();
                if name.is_none() {
                    errors.push(TRACK_NAME_REQUIRED);
                }
                if song.is_none() {
                    errors.push(TRACK_FILE_REQUIRED);
                }
                Err(errors.into())
            }
        }
    }
}

/// Album id and form of an add track request, with the errors of both reported together.
#[derive(Debug, Clone)]
pub struct AddTrack(pub AlbumId, pub AddTrackForm);

#[async_trait]
impl<S> FromRequest<S> for AddTrack
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();
        let album_path = AlbumPath::from_request_parts(&mut parts, state).await;
        let form = AddTrackForm::from_request(Request::from_parts(parts, body), state).await;
        match (album_path, form) {
            (Ok(AlbumPath(album_id)), Ok(form)) => Ok(AddTrack(album_id, form)),
            (Err(HttpError::Validation(mut errors)), Err(HttpError::Validation(form_errors))) => {
                errors.extend(form_errors);
                Err(errors.into())
            }
            (Err(err), _) | (_, Err(err)) => Err(err),
        }
    }
}
