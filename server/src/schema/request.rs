use chrono::NaiveDate;
use utoipa::ToSchema;

use trackbox_core::model::{AlbumUpdate, NewAlbum, NewTrack, Upload};

use crate::validation::{
    date_field, required, string_field, FieldRules, JsonObject, Validate, ValidationErrors,
    ALBUM_DATE_REQUIRED, ALBUM_DESCRIPTION_REQUIRED, ALBUM_NAME_REQUIRED, CREATE_ALBUM,
    TRACK_NAME, TRACK_NAME_REQUIRED, UPDATE_ALBUM,
};

#[derive(Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct CreateAlbumRequest {
    pub name: String,
    pub description: String,
    /// ISO 8601 date or date-time
    #[schema(value_type = String, example = "2024-01-01")]
    pub date: NaiveDate,
}

impl Validate for CreateAlbumRequest {
    const RULES: &'static [FieldRules] = CREATE_ALBUM;

    fn from_checked(body: &JsonObject) -> Result<Self, ValidationErrors> {
        Ok(CreateAlbumRequest {
            name: required(string_field(body, "name"), ALBUM_NAME_REQUIRED)?,
            description: required(string_field(body, "description"), ALBUM_DESCRIPTION_REQUIRED)?,
            date: required(date_field(body, "date"), ALBUM_DATE_REQUIRED)?,
        })
    }
}

impl From<CreateAlbumRequest> for NewAlbum {
    fn from(value: CreateAlbumRequest) -> Self {
        NewAlbum {
            name: value.name,
            description: value.description,
            date: value.date,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, ToSchema)]
pub struct UpdateAlbumRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<String>, example = "2024-01-01")]
    pub date: Option<NaiveDate>,
}

impl Validate for UpdateAlbumRequest {
    const RULES: &'static [FieldRules] = UPDATE_ALBUM;

    fn from_checked(body: &JsonObject) -> Result<Self, ValidationErrors> {
        Ok(UpdateAlbumRequest {
            name: string_field(body, "name"),
            description: string_field(body, "description"),
            date: date_field(body, "date"),
        })
    }
}

impl From<UpdateAlbumRequest> for AlbumUpdate {
    fn from(value: UpdateAlbumRequest) -> Self {
        AlbumUpdate {
            name: value.name,
            description: value.description,
            date: value.date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct RenameTrackRequest {
    pub name: String,
}

impl Validate for RenameTrackRequest {
    const RULES: &'static [FieldRules] = TRACK_NAME;

    fn from_checked(body: &JsonObject) -> Result<Self, ValidationErrors> {
        Ok(RenameTrackRequest {
            name: required(string_field(body, "name"), TRACK_NAME_REQUIRED)?,
        })
    }
}

/// `multipart/form-data` body of the add track endpoint
#[derive(Debug, Clone, ToSchema)]
pub struct AddTrackForm {
    pub name: String,
    /// The audio file
    #[schema(value_type = String, format = Binary)]
    pub song: Upload,
}

impl From<AddTrackForm> for NewTrack {
    fn from(value: AddTrackForm) -> Self {
        NewTrack {
            name: value.name,
            upload: value.song,
        }
    }
}
