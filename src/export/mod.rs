//! Export of teacher time preferences to the external scheduler.
//!
//! A teacher's preferences are encoded as one symbol per week slot
//! ([`WEEK_SLOTS`] characters, Monday 00:00 first). Each level has a strong
//! and a weak symbol; the strong one is used when the preference's raw
//! weight exceeds [`STRONG_WEIGHT_THRESHOLD`](crate::models::STRONG_WEIGHT_THRESHOLD).
//!
//! Publishing replaces every time-preference row of the teacher's external
//! instructor with a single new row, inside one external transaction.

mod grid;

pub use grid::PreferenceGrid;

use serde::{Deserialize, Serialize};

use crate::batch::BatchReport;
use crate::config::{EngineConfig, LevelSymbols};
use crate::error::{Error, Result};
use crate::models::{Teacher, TimePreference, WEEK_SLOTS};
use crate::store::{AvailabilitySource, ExternalScheduler, TimePrefRow, EXTERNAL_PREF_LEVEL_ID};

/// Result of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedPreferences {
    pub teacher: String,
    pub owner_id: i64,
    pub unique_id: i64,
    /// Rows deleted before the insert.
    pub replaced: usize,
}

/// Encodes and publishes time preferences.
#[derive(Debug, Clone, Default)]
pub struct TimePreferenceEncoder {
    symbols: LevelSymbols,
}

impl TimePreferenceEncoder {
    pub fn new(symbols: LevelSymbols) -> Self {
        Self { symbols }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.level_symbols)
    }

    /// Encodes the teacher's preferences within `preference_set`.
    pub fn encode<S>(&self, store: &S, teacher_id: &str, preference_set: &str) -> Result<String>
    where
        S: AvailabilitySource + ?Sized,
    {
        let preferences = store.teacher_preferences(teacher_id, preference_set)?;
        tracing::debug!(
            teacher = teacher_id,
            preference_set,
            preferences = preferences.len(),
            "encoding time preferences"
        );
        self.encode_preferences(&preferences)
    }

    /// Encodes preferences in order; later ones overwrite earlier ones.
    pub fn encode_preferences(&self, preferences: &[TimePreference]) -> Result<String> {
        let mut grid = PreferenceGrid::filled(self.symbols.neutral());
        for preference in preferences {
            let symbol = self.symbols.symbol(preference.level, preference.is_strong());
            grid.paint(preference.slots()?, symbol);
        }
        Ok(grid.render())
    }

    /// Replaces the teacher's external preference rows with `encoded`.
    ///
    /// The teacher's external uid must match exactly one instructor row.
    pub fn publish<X>(&self, scheduler: &mut X, teacher: &Teacher, encoded: &str) -> Result<PublishedPreferences>
    where
        X: ExternalScheduler + ?Sized,
    {
        let length = encoded.chars().count();
        if length != WEEK_SLOTS {
            return Err(Error::MalformedPreferences {
                teacher: teacher.id.clone(),
                length,
            });
        }

        let owner_id = match scheduler.instructor_ids(&teacher.external_uid)?.as_slice() {
            [] => {
                return Err(Error::UnknownExternalTeacher {
                    external_uid: teacher.external_uid.clone(),
                })
            }
            [id] => *id,
            ids => {
                return Err(Error::AmbiguousExternalTeacher {
                    external_uid: teacher.external_uid.clone(),
                    matches: ids.len(),
                })
            }
        };

        let published = scheduler.with_transaction(|writer| {
            let replaced = writer.delete_owner_rows(owner_id)?;
            let unique_id = writer.next_unique_id()?;
            writer.insert_row(&TimePrefRow {
                unique_id,
                owner_id,
                pref_level_id: EXTERNAL_PREF_LEVEL_ID,
                preference: encoded.to_string(),
                time_pattern_id: None,
            })?;
            Ok(PublishedPreferences {
                teacher: teacher.id.clone(),
                owner_id,
                unique_id,
                replaced,
            })
        })?;

        tracing::info!(
            teacher = %teacher.id,
            owner_id,
            unique_id = published.unique_id,
            replaced = published.replaced,
            "published time preferences"
        );
        Ok(published)
    }

    /// Encodes and publishes every teacher independently.
    pub fn publish_all<S, X>(
        &self,
        store: &S,
        scheduler: &mut X,
        teachers: &[Teacher],
        preference_set: &str,
    ) -> BatchReport<PublishedPreferences>
    where
        S: AvailabilitySource + ?Sized,
        X: ExternalScheduler + ?Sized,
    {
        let mut report = BatchReport::new();
        for teacher in teachers {
            let result = self
                .encode(store, &teacher.id, preference_set)
                .and_then(|encoded| self.publish(scheduler, teacher, &encoded));
            report.record(&teacher.id, None, result);
        }
        tracing::info!(
            published = report.succeeded.len(),
            failed = report.failed.len(),
            "preference export finished"
        );
        report
    }
}
