//! Unique listeners per track.
//!
//! Input lines are five-field play events; by default the track id sits at
//! index 2 and the user id at index 3. Output is
//! `trackId<TAB>uniqueListenerCount` for every track seen.

use crate::engine::{Emitter, Job, Mapper, Reducer, Values};
use crate::record::{split_fields, RecordError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const JOB_NAME: &str = "Unique listeners per track";

/// Exact field count of a play-event line.
pub const PLAY_EVENT_FIELDS: usize = 5;

/// Where the track and user ids live in a play-event line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayEventLayout {
    pub track_id_field: usize,
    pub user_id_field: usize,
}

impl Default for PlayEventLayout {
    fn default() -> Self {
        Self {
            track_id_field: 2,
            user_id_field: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayEvent {
    pub track_id: i32,
    pub user_id: i32,
}

impl PlayEvent {
    pub fn parse(line: &str, layout: &PlayEventLayout) -> Result<Self, RecordError> {
        let fields = split_fields(line);
        if fields.len() != PLAY_EVENT_FIELDS {
            return Err(RecordError::FieldCount {
                expected: PLAY_EVENT_FIELDS,
                found: fields.len(),
            });
        }

        Ok(Self {
            track_id: parse_id("track_id", fields[layout.track_id_field])?,
            user_id: parse_id("user_id", fields[layout.user_id_field])?,
        })
    }
}

fn parse_id(field: &'static str, value: &str) -> Result<i32, RecordError> {
    value.parse().map_err(|source| RecordError::Integer {
        field,
        value: value.to_string(),
        source,
    })
}

/// Emits `(trackId, userId)` for every well-formed play event.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlayEventMapper {
    pub layout: PlayEventLayout,
}

impl Mapper for PlayEventMapper {
    type Key = i32;
    type Value = i32;

    fn map(&self, line: &str, emitter: &mut Emitter<i32, i32>) -> Result<(), RecordError> {
        let event = PlayEvent::parse(line, &self.layout)?;
        emitter.emit(event.track_id, event.user_id);
        Ok(())
    }
}

/// Counts the distinct user ids seen for a track.
#[derive(Debug, Default, Clone, Copy)]
pub struct UniqueListenersReducer;

impl Reducer<i32, i32> for UniqueListenersReducer {
    type Output = usize;

    fn reduce(&self, _track_id: &i32, user_ids: Values<'_, i32>) -> Option<usize> {
        let listeners: HashSet<i32> = user_ids.collect();
        Some(listeners.len())
    }
}

pub fn job(layout: PlayEventLayout) -> Job<PlayEventMapper, UniqueListenersReducer> {
    Job::new(JOB_NAME, PlayEventMapper { layout }, UniqueListenersReducer)
}
