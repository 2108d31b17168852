use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use trackbox_core::model;

#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash, ToSchema)]
pub struct Album {
    #[schema(example = "65e1f0a2c3d4e5f601234567")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub date: NaiveDate,
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash, ToSchema)]
pub struct Track {
    #[schema(example = "65e1f0a2c3d4e5f601234568")]
    pub id: String,
    pub name: String,
    /// Public URL of the audio file
    pub file: String,
}

impl From<model::Album> for Album {
    fn from(value: model::Album) -> Self {
        Album {
            id: value.id.to_string(),
            name: value.name,
            description: value.description,
            date: value.date,
            tracks: value.tracks.into_iter().map(Track::from).collect(),
        }
    }
}

impl From<model::Track> for Track {
    fn from(value: model::Track) -> Self {
        Track {
            id: value.id.to_string(),
            name: value.name,
            file: value.file,
        }
    }
}
