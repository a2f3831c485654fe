//! Collaborator interfaces.
//!
//! The engine owns no storage. Everything it reads or writes goes through
//! the narrow synchronous traits below, so it can run against a database,
//! an import pipeline or the bundled [`MemoryStore`].
//!
//! # Traits
//!
//! - [`TimetableStore`]: group/activity/realization graph, group attachment
//! - [`EnrollmentSource`]: enrollment records and group membership
//! - [`SizeHintStore`]: group size hints
//! - [`AvailabilitySource`]: allocations and time preferences of teachers
//! - [`ExternalScheduler`]: the external scheduler's instructor and
//!   time-preference tables, written inside a transaction

mod memory;
mod schema;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteScheduler;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::Result;
use crate::models::{
    Activity, ActivityRealization, Allocation, EnrollmentFilter, Group, GroupSizeHint,
    StudentEnrollment, TimePreference, Timetable,
};

/// Read/write access to the group-activity-realization graph.
pub trait TimetableStore {
    fn activity(&self, id: &str) -> Result<Activity>;

    fn group(&self, id: &str) -> Result<Group>;

    fn realization(&self, id: &str) -> Result<ActivityRealization>;

    /// Candidate groups of an activity.
    fn activity_groups(&self, activity_id: &str) -> Result<Vec<Group>>;

    /// All realizations of an activity.
    fn activity_realizations(&self, activity_id: &str) -> Result<Vec<ActivityRealization>>;

    /// Attaches a group to a realization. Attaching twice is a no-op.
    fn attach_group(&mut self, realization_id: &str, group_id: &str) -> Result<()>;

    /// Groups attached to a realization, in attachment order.
    fn realization_groups(&self, realization_id: &str) -> Result<Vec<Group>> {
        self.realization(realization_id)?
            .groups
            .iter()
            .map(|id| self.group(id))
            .collect()
    }

    /// IDs of groups attached to realizations of `activity_id` other than
    /// `realization_id`.
    fn groups_on_other_realizations(
        &self,
        activity_id: &str,
        realization_id: &str,
    ) -> Result<HashSet<String>> {
        Ok(self
            .activity_realizations(activity_id)?
            .into_iter()
            .filter(|r| r.id != realization_id)
            .flat_map(|r| r.groups)
            .collect())
    }
}

/// Enrollment data imported from the student information system.
pub trait EnrollmentSource {
    /// Group with the given short name in a group-set.
    fn find_group(&self, groupset: &str, short_name: &str) -> Result<Option<Group>>;

    /// Student IDs that are members of a group.
    fn group_students(&self, group_id: &str) -> Result<Vec<String>>;

    /// Subject codes of the activities a group is linked to.
    fn group_subjects(&self, group_id: &str) -> Result<Vec<String>>;

    fn enrollments(&self, filter: &EnrollmentFilter) -> Result<Vec<StudentEnrollment>>;
}

/// Storage for group size hints.
pub trait SizeHintStore {
    /// Live hints for (group, method).
    fn size_hints(&self, group_id: &str, method: &str) -> Result<Vec<GroupSizeHint>>;

    /// Deletes every hint for the hint's (group, method) and inserts it,
    /// as one atomic step.
    fn replace_size_hint(&mut self, hint: GroupSizeHint) -> Result<()>;
}

/// Teaching allocations and time preferences of teachers.
pub trait AvailabilitySource {
    /// Allocations in `timetable` whose realization lists the teacher.
    fn teacher_allocations(&self, teacher_id: &str, timetable: &Timetable)
        -> Result<Vec<Allocation>>;

    /// Preferences of the teacher within a preference set, in stored order.
    fn teacher_preferences(
        &self,
        teacher_id: &str,
        preference_set: &str,
    ) -> Result<Vec<TimePreference>>;
}

/// Preference level id written with every row (the external "neutral" level).
pub const EXTERNAL_PREF_LEVEL_ID: i64 = 1;

/// One row of the external scheduler's time-preference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePrefRow {
    pub unique_id: i64,
    pub owner_id: i64,
    pub pref_level_id: i64,
    pub preference: String,
    pub time_pattern_id: Option<i64>,
}

/// Writes performed inside one external transaction.
pub trait PreferenceWriter {
    /// Allocates a fresh row identifier from the external sequence.
    fn next_unique_id(&mut self) -> Result<i64>;

    /// Deletes all time-preference rows of an owner, returning how many.
    fn delete_owner_rows(&mut self, owner_id: i64) -> Result<usize>;

    fn insert_row(&mut self, row: &TimePrefRow) -> Result<()>;
}

/// The external scheduling system.
pub trait ExternalScheduler {
    /// Owner ids of instructor rows whose external uid matches.
    fn instructor_ids(&self, external_uid: &str) -> Result<Vec<i64>>;

    /// Time-preference rows currently stored for an owner.
    fn owner_rows(&self, owner_id: i64) -> Result<Vec<TimePrefRow>>;

    /// Runs `f` in a transaction. Its writes become visible only if it
    /// returns `Ok`; on `Err` nothing is applied.
    fn with_transaction<R, F>(&mut self, f: F) -> Result<R>
    where
        F: FnOnce(&mut dyn PreferenceWriter) -> Result<R>;
}
