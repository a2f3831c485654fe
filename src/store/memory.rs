//! In-memory implementation of every collaborator trait.

use std::collections::BTreeMap;

use super::{
    AvailabilitySource, EnrollmentSource, ExternalScheduler, PreferenceWriter, SizeHintStore,
    TimePrefRow, TimetableStore,
};
use crate::error::{Error, Result};
use crate::models::{
    Activity, ActivityRealization, Allocation, EnrollmentFilter, Group, GroupSizeHint,
    StudentEnrollment, TimePreference, Timetable,
};

/// A self-contained store holding the whole timetable graph in memory.
///
/// Iteration order is deterministic (keyed by id), which keeps the
/// engine's output reproducible.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    groups: BTreeMap<String, Group>,
    activities: BTreeMap<String, Activity>,
    realizations: BTreeMap<String, ActivityRealization>,
    members: BTreeMap<String, Vec<String>>,
    enrollments: Vec<StudentEnrollment>,
    hints: Vec<GroupSizeHint>,
    allocations: Vec<Allocation>,
    preferences: Vec<TimePreference>,
    instructors: Vec<(i64, String)>,
    time_prefs: Vec<TimePrefRow>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    pub fn with_group(mut self, group: Group) -> Self {
        self.add_group(group);
        self
    }

    pub fn with_activity(mut self, activity: Activity) -> Self {
        self.activities.insert(activity.id.clone(), activity);
        self
    }

    pub fn with_realization(mut self, realization: ActivityRealization) -> Self {
        self.realizations
            .insert(realization.id.clone(), realization);
        self
    }

    /// Records `student` as a member of `group_id`.
    pub fn with_member(mut self, group_id: impl Into<String>, student: impl Into<String>) -> Self {
        self.members
            .entry(group_id.into())
            .or_default()
            .push(student.into());
        self
    }

    pub fn with_enrollment(mut self, enrollment: StudentEnrollment) -> Self {
        self.enrollments.push(enrollment);
        self
    }

    pub fn with_allocation(mut self, allocation: Allocation) -> Self {
        self.allocations.push(allocation);
        self
    }

    pub fn with_preference(mut self, preference: TimePreference) -> Self {
        self.preferences.push(preference);
        self
    }

    /// Registers an external instructor row and returns its owner id.
    pub fn add_instructor(&mut self, external_uid: impl Into<String>) -> i64 {
        let id = self.allocate_id();
        self.instructors.push((id, external_uid.into()));
        id
    }

    pub fn add_group(&mut self, group: Group) {
        self.groups.insert(group.id.clone(), group);
    }

    /// Inserts a hint without replacing existing ones.
    pub fn push_size_hint(&mut self, hint: GroupSizeHint) {
        self.hints.push(hint);
    }

    /// All stored hints.
    pub fn all_size_hints(&self) -> &[GroupSizeHint] {
        &self.hints
    }

    /// All external time-preference rows.
    pub fn time_pref_rows(&self) -> &[TimePrefRow] {
        &self.time_prefs
    }

    fn allocate_id(&mut self) -> i64 {
        if self.next_id == 0 {
            self.next_id = 1;
        }
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl TimetableStore for MemoryStore {
    fn activity(&self, id: &str) -> Result<Activity> {
        self.activities
            .get(id)
            .cloned()
            .ok_or_else(|| Error::unknown("activity", id))
    }

    fn group(&self, id: &str) -> Result<Group> {
        self.groups
            .get(id)
            .cloned()
            .ok_or_else(|| Error::unknown("group", id))
    }

    fn realization(&self, id: &str) -> Result<ActivityRealization> {
        self.realizations
            .get(id)
            .cloned()
            .ok_or_else(|| Error::unknown("realization", id))
    }

    fn activity_groups(&self, activity_id: &str) -> Result<Vec<Group>> {
        self.activity(activity_id)?
            .groups
            .iter()
            .map(|id| self.group(id))
            .collect()
    }

    fn activity_realizations(&self, activity_id: &str) -> Result<Vec<ActivityRealization>> {
        Ok(self
            .realizations
            .values()
            .filter(|r| r.activity_id == activity_id)
            .cloned()
            .collect())
    }

    fn attach_group(&mut self, realization_id: &str, group_id: &str) -> Result<()> {
        if !self.groups.contains_key(group_id) {
            return Err(Error::unknown("group", group_id));
        }
        let realization = self
            .realizations
            .get_mut(realization_id)
            .ok_or_else(|| Error::unknown("realization", realization_id))?;
        if !realization.has_group(group_id) {
            realization.groups.push(group_id.to_string());
        }
        Ok(())
    }
}

impl EnrollmentSource for MemoryStore {
    fn find_group(&self, groupset: &str, short_name: &str) -> Result<Option<Group>> {
        Ok(self
            .groups
            .values()
            .find(|g| g.groupset == groupset && g.short_name == short_name)
            .cloned())
    }

    fn group_students(&self, group_id: &str) -> Result<Vec<String>> {
        Ok(self.members.get(group_id).cloned().unwrap_or_default())
    }

    fn group_subjects(&self, group_id: &str) -> Result<Vec<String>> {
        let mut subjects: Vec<String> = self
            .activities
            .values()
            .filter(|a| a.groups.iter().any(|g| g == group_id))
            .map(|a| a.subject.clone())
            .collect();
        subjects.sort();
        subjects.dedup();
        Ok(subjects)
    }

    fn enrollments(&self, filter: &EnrollmentFilter) -> Result<Vec<StudentEnrollment>> {
        Ok(self
            .enrollments
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect())
    }
}

impl SizeHintStore for MemoryStore {
    fn size_hints(&self, group_id: &str, method: &str) -> Result<Vec<GroupSizeHint>> {
        Ok(self
            .hints
            .iter()
            .filter(|h| h.group == group_id && h.method == method)
            .cloned()
            .collect())
    }

    fn replace_size_hint(&mut self, hint: GroupSizeHint) -> Result<()> {
        self.hints
            .retain(|h| !(h.group == hint.group && h.method == hint.method));
        self.hints.push(hint);
        Ok(())
    }
}

impl AvailabilitySource for MemoryStore {
    fn teacher_allocations(
        &self,
        teacher_id: &str,
        timetable: &Timetable,
    ) -> Result<Vec<Allocation>> {
        Ok(self
            .allocations
            .iter()
            .filter(|a| a.timetable == timetable.id)
            .filter(|a| {
                self.realizations
                    .get(&a.realization)
                    .is_some_and(|r| r.teachers.iter().any(|t| t == teacher_id))
            })
            .cloned()
            .collect())
    }

    fn teacher_preferences(
        &self,
        teacher_id: &str,
        preference_set: &str,
    ) -> Result<Vec<TimePreference>> {
        Ok(self
            .preferences
            .iter()
            .filter(|p| p.teacher == teacher_id && p.preference_set == preference_set)
            .cloned()
            .collect())
    }
}

/// Staged copy of the external tables, applied on commit.
struct MemoryTransaction {
    rows: Vec<TimePrefRow>,
    next_id: i64,
}

impl PreferenceWriter for MemoryTransaction {
    fn next_unique_id(&mut self) -> Result<i64> {
        let id = self.next_id;
        self.next_id += 1;
        Ok(id)
    }

    fn delete_owner_rows(&mut self, owner_id: i64) -> Result<usize> {
        let before = self.rows.len();
        self.rows.retain(|r| r.owner_id != owner_id);
        Ok(before - self.rows.len())
    }

    fn insert_row(&mut self, row: &TimePrefRow) -> Result<()> {
        if self.rows.iter().any(|r| r.unique_id == row.unique_id) {
            return Err(Error::Storage(format!(
                "duplicate time_pref uniqueid {}",
                row.unique_id
            )));
        }
        self.rows.push(row.clone());
        Ok(())
    }
}

impl ExternalScheduler for MemoryStore {
    fn instructor_ids(&self, external_uid: &str) -> Result<Vec<i64>> {
        Ok(self
            .instructors
            .iter()
            .filter(|(_, uid)| uid == external_uid)
            .map(|(id, _)| *id)
            .collect())
    }

    fn owner_rows(&self, owner_id: i64) -> Result<Vec<TimePrefRow>> {
        Ok(self
            .time_prefs
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect())
    }

    fn with_transaction<R, F>(&mut self, f: F) -> Result<R>
    where
        F: FnOnce(&mut dyn PreferenceWriter) -> Result<R>,
    {
        let mut tx = MemoryTransaction {
            rows: self.time_prefs.clone(),
            next_id: self.next_id.max(1),
        };
        let out = f(&mut tx)?;
        self.time_prefs = tx.rows;
        self.next_id = tx.next_id;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_is_idempotent() {
        let mut store = MemoryStore::new()
            .with_group(Group::new("g1", "G1"))
            .with_activity(Activity::new("a1", "S1", "LV").with_group("g1"))
            .with_realization(ActivityRealization::new("r1", "a1", 30));

        store.attach_group("r1", "g1").unwrap();
        store.attach_group("r1", "g1").unwrap();
        assert_eq!(store.realization("r1").unwrap().groups, vec!["g1"]);
        assert!(store.attach_group("r1", "missing").is_err());
        assert!(store.attach_group("missing", "g1").is_err());
    }

    #[test]
    fn test_groups_on_other_realizations() {
        let store = MemoryStore::new()
            .with_group(Group::new("g1", "G1"))
            .with_group(Group::new("g2", "G2"))
            .with_activity(Activity::new("a1", "S1", "LV").with_group("g1").with_group("g2"))
            .with_realization(ActivityRealization::new("r1", "a1", 30).with_group("g1"))
            .with_realization(ActivityRealization::new("r2", "a1", 30).with_group("g2"));

        let others = store.groups_on_other_realizations("a1", "r1").unwrap();
        assert_eq!(others.len(), 1);
        assert!(others.contains("g2"));
    }

    #[test]
    fn test_failed_transaction_is_discarded() {
        let mut store = MemoryStore::new();
        let owner = store.add_instructor("42");

        let result: Result<()> = store.with_transaction(|w| {
            let id = w.next_unique_id()?;
            w.insert_row(&TimePrefRow {
                unique_id: id,
                owner_id: owner,
                pref_level_id: 1,
                preference: "2".into(),
                time_pattern_id: None,
            })?;
            Err(Error::Storage("boom".into()))
        });

        assert!(result.is_err());
        assert!(store.time_pref_rows().is_empty());
    }

    #[test]
    fn test_group_subjects_are_distinct() {
        let store = MemoryStore::new()
            .with_group(Group::new("g1", "G1"))
            .with_activity(Activity::new("a1", "S1", "P").with_group("g1"))
            .with_activity(Activity::new("a2", "S1", "LV").with_group("g1"))
            .with_activity(Activity::new("a3", "S2", "LV").with_group("g1"));

        assert_eq!(store.group_subjects("g1").unwrap(), vec!["S1", "S2"]);
    }
}
