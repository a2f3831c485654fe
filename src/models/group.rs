//! Student group model.
//!
//! Groups are cohorts of students identified by study programme and class
//! year. Top-level groups (e.g. everyone attending a lecture) may own
//! sub-groups (lab sections), forming a tree via `parent`.

use serde::{Deserialize, Serialize};

/// A student group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Unique group identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Short name, unique within a group-set (used for year-to-year matching).
    pub short_name: String,
    /// Group-set (versioned collection of groups) this group belongs to.
    pub groupset: String,
    /// Expected headcount. `0` when unknown.
    pub size: u32,
    /// Class year of the students.
    pub classyear: u32,
    /// Study programme short name (e.g. `"BUN-RI"`).
    pub study: String,
    /// Ordering key within a (classyear, study) cohort.
    pub groupnum: u32,
    /// Owning group, if this is a sub-group.
    pub parent: Option<String>,
}

impl Group {
    /// Creates a group with the given ID and short name.
    pub fn new(id: impl Into<String>, short_name: impl Into<String>) -> Self {
        let short_name = short_name.into();
        Self {
            id: id.into(),
            name: short_name.clone(),
            short_name,
            groupset: String::new(),
            size: 0,
            classyear: 1,
            study: String::new(),
            groupnum: 0,
            parent: None,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the group-set.
    pub fn in_groupset(mut self, groupset: impl Into<String>) -> Self {
        self.groupset = groupset.into();
        self
    }

    /// Sets the headcount.
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    /// Sets the cohort: study programme and class year.
    pub fn with_cohort(mut self, study: impl Into<String>, classyear: u32) -> Self {
        self.study = study.into();
        self.classyear = classyear;
        self
    }

    /// Sets the ordering key within the cohort.
    pub fn with_groupnum(mut self, groupnum: u32) -> Self {
        self.groupnum = groupnum;
        self
    }

    /// Makes this a sub-group of `parent`.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Cohort key used for bucketing: (classyear, study).
    pub fn cohort(&self) -> (u32, &str) {
        (self.classyear, self.study.as_str())
    }
}

/// Total headcount of a set of groups, saturating at `u32::MAX`.
pub fn total_size<'a>(groups: impl IntoIterator<Item = &'a Group>) -> u32 {
    groups.into_iter().fold(0, |acc, g| acc.saturating_add(g.size))
}
