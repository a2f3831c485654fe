//! Structural validation of timetable data.
//!
//! Checks the group/activity/realization graph before any assignment runs.
//! Detects:
//! - Duplicate IDs
//! - References to unknown groups, parents and activities
//! - Cycles in the group parent tree
//! - A group attached to two realizations of the same activity
//! - Allocations and preferences that do not fit in the week grid
//!
//! Every problem is reported; validation does not stop at the first one.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.3 (Depth-first search)

use crate::models::{Activity, ActivityRealization, Allocation, Group, TimePreference};
use std::collections::{HashMap, HashSet};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A group names a parent that doesn't exist.
    InvalidParent,
    /// The group parent tree contains a cycle.
    CyclicParent,
    /// An activity or realization references a group that doesn't exist.
    InvalidGroupReference,
    /// A realization references an activity that doesn't exist.
    InvalidActivityReference,
    /// A group is attached to more than one realization of an activity.
    GroupOnSeveralRealizations,
    /// An interval does not fit in its day.
    InvalidInterval,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the group/activity/realization graph.
///
/// Checks:
/// 1. No duplicate group, activity or realization IDs
/// 2. Every group parent exists
/// 3. The parent tree has no cycles
/// 4. Activities and realizations only reference existing groups
/// 5. Realizations only reference existing activities
/// 6. No group sits on two realizations of the same activity
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_timetable(
    groups: &[Group],
    activities: &[Activity],
    realizations: &[ActivityRealization],
) -> ValidationResult {
    let mut errors = Vec::new();

    let mut group_ids = HashSet::new();
    for g in groups {
        if !group_ids.insert(g.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate group ID: {}", g.id),
            ));
        }
    }

    let mut activity_ids = HashSet::new();
    for a in activities {
        if !activity_ids.insert(a.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate activity ID: {}", a.id),
            ));
        }
    }

    let mut realization_ids = HashSet::new();
    for r in realizations {
        if !realization_ids.insert(r.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate realization ID: {}", r.id),
            ));
        }
    }

    // Parent references
    for g in groups {
        if let Some(parent) = &g.parent {
            if !group_ids.contains(parent.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidParent,
                    format!("Group '{}' references unknown parent '{}'", g.id, parent),
                ));
            }
        }
    }

    if let Some(cycle_err) = detect_parent_cycles(groups) {
        errors.push(cycle_err);
    }

    for a in activities {
        for gid in &a.groups {
            if !group_ids.contains(gid.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidGroupReference,
                    format!("Activity '{}' references unknown group '{}'", a.id, gid),
                ));
            }
        }
    }

    // Realization references and per-activity exclusivity
    let mut placed: HashMap<(&str, &str), &str> = HashMap::new();
    for r in realizations {
        if !activity_ids.contains(r.activity_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidActivityReference,
                format!(
                    "Realization '{}' references unknown activity '{}'",
                    r.id, r.activity_id
                ),
            ));
        }
        for gid in &r.groups {
            if !group_ids.contains(gid.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidGroupReference,
                    format!("Realization '{}' references unknown group '{}'", r.id, gid),
                ));
            }
            let key = (r.activity_id.as_str(), gid.as_str());
            match placed.get(&key) {
                Some(&other) if other != r.id => {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::GroupOnSeveralRealizations,
                        format!(
                            "Group '{}' is on realizations '{}' and '{}' of activity '{}'",
                            gid, other, r.id, r.activity_id
                        ),
                    ));
                }
                Some(_) => {}
                None => {
                    placed.insert(key, r.id.as_str());
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates that every allocation and preference fits in its day.
pub fn validate_intervals(allocations: &[Allocation], preferences: &[TimePreference]) -> ValidationResult {
    let mut errors = Vec::new();

    for a in allocations {
        if let Err(e) = a.slots() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidInterval,
                format!("Allocation of realization '{}': {e}", a.realization),
            ));
        }
    }

    for p in preferences {
        if let Err(e) = p.slots() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidInterval,
                format!("Preference of teacher '{}': {e}", p.teacher),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Detects cycles in the group parent tree using DFS.
///
/// Edges run from parent to child. A back edge to a node still on the
/// recursion stack closes a cycle.
fn detect_parent_cycles(groups: &[Group]) -> Option<ValidationError> {
    let mut adj: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut all_ids: Vec<&str> = Vec::new();

    for g in groups {
        all_ids.push(&g.id);
        if let Some(parent) = &g.parent {
            adj.entry(parent.as_str()).or_default().push(g.id.as_str());
        }
    }

    let mut visited = HashSet::new();
    let mut in_stack = HashSet::new();

    for &node in &all_ids {
        if !visited.contains(node) && has_cycle_dfs(node, &adj, &mut visited, &mut in_stack) {
            return Some(ValidationError::new(
                ValidationErrorKind::CyclicParent,
                format!("Parent cycle detected involving group '{node}'"),
            ));
        }
    }

    None
}

fn has_cycle_dfs<'a>(
    node: &'a str,
    adj: &HashMap<&'a str, Vec<&'a str>>,
    visited: &mut HashSet<&'a str>,
    in_stack: &mut HashSet<&'a str>,
) -> bool {
    visited.insert(node);
    in_stack.insert(node);

    if let Some(children) = adj.get(node) {
        for &next in children {
            if in_stack.contains(next) {
                return true;
            }
            if !visited.contains(next) && has_cycle_dfs(next, adj, visited, in_stack) {
                return true;
            }
        }
    }

    in_stack.remove(node);
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClockTime, PreferenceLevel, WeekDay};

    fn sample_groups() -> Vec<Group> {
        vec![
            Group::new("ri", "RI_1").with_size(60),
            Group::new("ri-lv-1", "RI_1_LV_01").with_parent("ri").with_size(15),
            Group::new("ri-lv-2", "RI_1_LV_02").with_parent("ri").with_size(15),
        ]
    }

    fn sample_activities() -> Vec<Activity> {
        vec![Activity::new("prog-lv", "PROG", "LV")
            .with_group("ri-lv-1")
            .with_group("ri-lv-2")]
    }

    fn sample_realizations() -> Vec<ActivityRealization> {
        vec![
            ActivityRealization::new("r1", "prog-lv", 15).with_group("ri-lv-1"),
            ActivityRealization::new("r2", "prog-lv", 15).with_group("ri-lv-2"),
        ]
    }

    fn kinds(errors: &[ValidationError]) -> Vec<ValidationErrorKind> {
        errors.iter().map(|e| e.kind.clone()).collect()
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_timetable(&sample_groups(), &sample_activities(), &sample_realizations()).is_ok());
    }

    #[test]
    fn test_duplicate_ids() {
        let mut groups = sample_groups();
        groups.push(Group::new("ri", "RI_1"));
        let mut realizations = sample_realizations();
        realizations.push(ActivityRealization::new("r1", "prog-lv", 15));

        let errors = validate_timetable(&groups, &sample_activities(), &realizations).unwrap_err();
        assert_eq!(
            kinds(&errors),
            vec![ValidationErrorKind::DuplicateId, ValidationErrorKind::DuplicateId]
        );
        assert!(errors[1].message.contains("realization"));
    }

    #[test]
    fn test_unknown_parent() {
        let mut groups = sample_groups();
        groups.push(Group::new("orphan", "X").with_parent("nowhere"));

        let errors = validate_timetable(&groups, &[], &[]).unwrap_err();
        assert_eq!(kinds(&errors), vec![ValidationErrorKind::InvalidParent]);
    }

    #[test]
    fn test_parent_cycle() {
        let groups = vec![
            Group::new("a", "A").with_parent("c"),
            Group::new("b", "B").with_parent("a"),
            Group::new("c", "C").with_parent("b"),
            Group::new("d", "D"),
        ];

        let errors = validate_timetable(&groups, &[], &[]).unwrap_err();
        assert_eq!(kinds(&errors), vec![ValidationErrorKind::CyclicParent]);
    }

    #[test]
    fn test_self_parent_is_a_cycle() {
        let groups = vec![Group::new("a", "A").with_parent("a")];
        let errors = validate_timetable(&groups, &[], &[]).unwrap_err();
        assert_eq!(kinds(&errors), vec![ValidationErrorKind::CyclicParent]);
    }

    #[test]
    fn test_unknown_references() {
        let activities = vec![Activity::new("x", "S", "LV").with_group("ghost")];
        let realizations = vec![ActivityRealization::new("r", "missing", 10).with_group("ri")];

        let errors = validate_timetable(&sample_groups(), &activities, &realizations).unwrap_err();
        assert_eq!(
            kinds(&errors),
            vec![
                ValidationErrorKind::InvalidGroupReference,
                ValidationErrorKind::InvalidActivityReference,
            ]
        );
    }

    #[test]
    fn test_group_on_two_realizations() {
        let mut realizations = sample_realizations();
        realizations.push(ActivityRealization::new("r3", "prog-lv", 15).with_group("ri-lv-1"));

        let errors =
            validate_timetable(&sample_groups(), &sample_activities(), &realizations).unwrap_err();
        assert_eq!(kinds(&errors), vec![ValidationErrorKind::GroupOnSeveralRealizations]);
        assert!(errors[0].message.contains("'r1' and 'r3'"));
    }

    #[test]
    fn test_same_group_on_different_activities_is_fine() {
        let activities = vec![
            Activity::new("lv", "PROG", "LV").with_group("ri"),
            Activity::new("av", "PROG", "AV").with_group("ri"),
        ];
        let realizations = vec![
            ActivityRealization::new("r1", "lv", 60).with_group("ri"),
            ActivityRealization::new("r2", "av", 60).with_group("ri"),
        ];
        assert!(validate_timetable(&sample_groups(), &activities, &realizations).is_ok());
    }

    #[test]
    fn test_invalid_intervals() {
        let late = ClockTime::hour(23).unwrap();
        let allocations = vec![
            Allocation::new("r1", "tt", WeekDay::Mon, ClockTime::hour(8).unwrap(), 2),
            Allocation::new("r2", "tt", WeekDay::Sun, late, 2),
        ];
        let preferences = vec![
            TimePreference::new("t1", "ps", WeekDay::Fri, late, 1, PreferenceLevel::Hate),
            TimePreference::new("t2", "ps", WeekDay::Fri, late, 0, PreferenceLevel::Hate),
        ];

        let errors = validate_intervals(&allocations, &preferences).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].message.contains("'r2'"));
        assert!(errors[1].message.contains("'t2'"));
    }
}
