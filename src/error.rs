//! Error types shared by every engine component.
//!
//! Per-entity failures (one group, one teacher) carry the entity identifier
//! and, where relevant, the size-hint method label, so a batch driver can
//! report them and retry the entity in isolation.

use crate::models::WeekDay;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the timetabling engine and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A (day, start, duration) triple that does not fit in the week grid.
    #[error("invalid interval on {day}: start slot {start}, {duration} half-hours")]
    InvalidInterval {
        day: WeekDay,
        start: usize,
        duration: i64,
    },

    /// A clock time that is not on a half-hour boundary of a 24h day.
    #[error("invalid clock time '{0}'")]
    InvalidClockTime(String),

    /// The reference group-set has no group with the requested short name.
    #[error("no group '{short_name}' in group-set '{groupset}'")]
    ReferenceGroupNotFound { groupset: String, short_name: String },

    /// The external scheduler has no instructor row for this teacher.
    #[error("no external instructor with uid '{external_uid}'")]
    UnknownExternalTeacher { external_uid: String },

    /// The external scheduler has several instructor rows for this teacher.
    #[error("{matches} external instructors share uid '{external_uid}'")]
    AmbiguousExternalTeacher { external_uid: String, matches: usize },

    /// An encoded preference string that does not cover the whole week.
    #[error("preference string for '{teacher}' has {length} slots")]
    MalformedPreferences { teacher: String, length: usize },

    /// More than one live size hint exists for one (group, method) pair.
    #[error("{count} size hints for group '{group}' with method '{method}'")]
    DuplicateSizeHint {
        group: String,
        method: String,
        count: usize,
    },

    /// A collaborator lookup by id found nothing.
    #[error("unknown {kind} '{id}'")]
    UnknownEntity { kind: &'static str, id: String },

    /// Generic collaborator failure.
    #[error("storage failure: {0}")]
    Storage(String),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Config(#[from] Box<figment::Error>),
}

impl Error {
    pub(crate) fn unknown(kind: &'static str, id: impl Into<String>) -> Self {
        Self::UnknownEntity {
            kind,
            id: id.into(),
        }
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}
