//! Edits on an album's embedded track list.
//!
//! Every function takes the current list by reference and returns a new list,
//! so a failed edit never touches the album that was loaded from the store.

use super::{Track, TrackId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackListError {
    #[error("no track with id {0} in album")]
    NotFound(TrackId),
    #[error("track with id {0} is already in album")]
    DuplicateId(TrackId),
}

pub fn find<'a>(tracks: &'a [Track], id: &TrackId) -> Option<&'a Track> {
    tracks.iter().find(|track| &track.id == id)
}

fn position(tracks: &[Track], id: &TrackId) -> Result<usize, TrackListError> {
    tracks
        .iter()
        .position(|track| &track.id == id)
        .ok_or_else(|| TrackListError::NotFound(id.clone()))
}

pub fn with_appended(tracks: &[Track], track: Track) -> Result<Vec<Track>, TrackListError> {
    if find(tracks, &track.id).is_some() {
        return Err(TrackListError::DuplicateId(track.id));
    }
    let mut new_tracks = Vec::with_capacity(tracks.len() + 1);
    new_tracks.extend_from_slice(tracks);
    new_tracks.push(track);
    Ok(new_tracks)
}

/// Replaces the name of one track, keeping its position and file.
pub fn with_renamed(
    tracks: &[Track],
    id: &TrackId,
    name: String,
) -> Result<Vec<Track>, TrackListError> {
    let idx = position(tracks, id)?;
    let mut new_tracks = tracks.to_vec();
    new_tracks[idx].name = name;
    Ok(new_tracks)
}

pub fn without(tracks: &[Track], id: &TrackId) -> Result<Vec<Track>, TrackListError> {
    let idx = position(tracks, id)?;
    let mut new_tracks = tracks.to_vec();
    new_tracks.remove(idx);
    Ok(new_tracks)
}
