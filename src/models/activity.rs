//! Activity and realization models.
//!
//! An activity (e.g. "Programming 1, lab work") lists the groups that must
//! attend it. Its realizations are the concrete sections those groups are
//! split into, each with a target capacity and assigned teachers.

use serde::{Deserialize, Serialize};

/// Student count at which a realization is considered large.
pub const LARGE_REALIZATION_THRESHOLD: u32 = 24;

/// A teaching activity of a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Unique activity identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Subject code this activity teaches.
    pub subject: String,
    /// Activity type short name (e.g. `"P"` lectures, `"LV"` labs, `"AV"` tutorials).
    pub activity_type: String,
    /// Candidate groups.
    pub groups: Vec<String>,
}

impl Activity {
    /// Creates an activity for a subject.
    pub fn new(
        id: impl Into<String>,
        subject: impl Into<String>,
        activity_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            subject: subject.into(),
            activity_type: activity_type.into(),
            groups: Vec::new(),
        }
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a candidate group.
    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.groups.push(group_id.into());
        self
    }
}

/// A concrete section of an activity.
///
/// # Invariants
/// - Belongs to exactly one activity.
/// - A group is attached to at most one realization of the same activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRealization {
    /// Unique realization identifier.
    pub id: String,
    /// Owning activity.
    pub activity_id: String,
    /// Target capacity (students).
    pub intended_size: u32,
    /// Attached group IDs, in attachment order.
    pub groups: Vec<String>,
    /// Assigned teacher IDs.
    pub teachers: Vec<String>,
}

impl ActivityRealization {
    /// Creates an empty realization.
    pub fn new(id: impl Into<String>, activity_id: impl Into<String>, intended_size: u32) -> Self {
        Self {
            id: id.into(),
            activity_id: activity_id.into(),
            intended_size,
            groups: Vec::new(),
            teachers: Vec::new(),
        }
    }

    /// Attaches a group.
    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.groups.push(group_id.into());
        self
    }

    /// Assigns a teacher.
    pub fn with_teacher(mut self, teacher_id: impl Into<String>) -> Self {
        self.teachers.push(teacher_id.into());
        self
    }

    /// Whether a group is attached.
    pub fn has_group(&self, group_id: &str) -> bool {
        self.groups.iter().any(|g| g == group_id)
    }

    /// Whether any teacher is assigned.
    pub fn has_teachers(&self) -> bool {
        !self.teachers.is_empty()
    }
}

/// How a realization is staffed relative to its size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RealizationKind {
    /// Small group with a single teacher.
    SmallGroups,
    /// Large group with two assistants.
    TwoAssistants,
    /// Large group with one assistant and demonstrators.
    AssistantWithDemonstrators,
    /// Anything else (e.g. two assistants on a small group).
    Other,
}

impl RealizationKind {
    /// Classifies a realization by its student and teacher counts.
    ///
    /// Demonstrators are not always recorded, so any large realization not
    /// staffed by exactly two teachers counts as assistant + demonstrators.
    pub fn classify(students: u32, teachers: usize) -> Self {
        let large = students >= LARGE_REALIZATION_THRESHOLD;
        match (large, teachers) {
            (false, 1) => Self::SmallGroups,
            (true, 2) => Self::TwoAssistants,
            (true, _) => Self::AssistantWithDemonstrators,
            _ => Self::Other,
        }
    }

    /// Short code used by the external announcement data.
    pub fn code(self) -> &'static str {
        match self {
            Self::SmallGroups => "MAJHNE",
            Self::TwoAssistants => "ASISTENTA",
            Self::AssistantWithDemonstrators => "DEMONSTRATOR",
            Self::Other => "DRUGO",
        }
    }
}
