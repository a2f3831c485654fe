//! Group size estimation.
//!
//! Derives an expected headcount for a group and stores it as a
//! [`GroupSizeHint`] labelled by the estimation method, so estimates from
//! different sources coexist per group.
//!
//! # Methods
//!
//! - **Historical**: find the same-named group in a reference group-set
//!   (e.g. last year's timetable), take its students, and count how many
//!   of them are enrolled (with an allowed enrollment type) in the current
//!   group-set.
//! - **Enrollments**: infer the group's subjects (from its activities),
//!   study and class year, and count distinct students enrolled with those
//!   attributes.
//!
//! Recomputing a method replaces its previous hint; hints never accumulate.
//!
//! Resolved hints feed [`subgroups`] planning, which splits a top-level
//! group into lab/tutorial sections.

pub mod subgroups;

use std::collections::BTreeSet;

use crate::batch::BatchReport;
use crate::error::{Error, Result};
use crate::models::{
    describe_types, EnrollmentFilter, EnrollmentType, Group, GroupSizeHint,
};
use crate::store::{EnrollmentSource, SizeHintStore};

/// How a size hint is computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EstimationMethod {
    /// Match by short name in `reference`, count students enrolled in `current`.
    Historical {
        reference: String,
        current: String,
        types: Vec<EnrollmentType>,
    },
    /// Count enrollments in `groupset` matching the group's subjects,
    /// study and class year. `types: None` accepts every enrollment type.
    Enrollments {
        groupset: String,
        types: Option<Vec<EnrollmentType>>,
        label: Option<String>,
    },
}

impl EstimationMethod {
    /// Human-readable label under which hints are stored.
    pub fn label(&self) -> String {
        match self {
            Self::Historical {
                reference,
                current,
                types,
            } => format!(
                "group from {reference} enrolled in {current} with enrollment types {}",
                describe_types(Some(types.as_slice()))
            ),
            Self::Enrollments {
                groupset,
                types,
                label,
            } => label.clone().unwrap_or_else(|| {
                format!(
                    "enrollments from {groupset} for types {}",
                    describe_types(types.as_deref())
                )
            }),
        }
    }
}

/// Computes and stores group size hints.
#[derive(Debug, Clone)]
pub struct GroupSizeEstimator {
    default_types: Vec<EnrollmentType>,
}

impl GroupSizeEstimator {
    /// Creates an estimator whose methods default to `default_types`.
    pub fn new(default_types: Vec<EnrollmentType>) -> Self {
        Self { default_types }
    }

    /// Historical matching with the default enrollment types.
    pub fn historical(
        &self,
        reference: impl Into<String>,
        current: impl Into<String>,
    ) -> EstimationMethod {
        EstimationMethod::Historical {
            reference: reference.into(),
            current: current.into(),
            types: self.default_types.clone(),
        }
    }

    /// Enrollment filtering with the default enrollment types.
    pub fn enrollments(&self, groupset: impl Into<String>) -> EstimationMethod {
        EstimationMethod::Enrollments {
            groupset: groupset.into(),
            types: Some(self.default_types.clone()),
            label: None,
        }
    }

    /// Computes the hint for one group and replaces any previous hint of
    /// the same method.
    pub fn estimate<S>(
        &self,
        store: &mut S,
        group: &Group,
        method: &EstimationMethod,
    ) -> Result<GroupSizeHint>
    where
        S: EnrollmentSource + SizeHintStore + ?Sized,
    {
        let label = method.label();
        tracing::info!(group = %group.id, method = %label, "calculating size hint");

        let size = match method {
            EstimationMethod::Historical {
                reference,
                current,
                types,
            } => {
                let old_group = store.find_group(reference, &group.short_name)?.ok_or_else(|| {
                    Error::ReferenceGroupNotFound {
                        groupset: reference.clone(),
                        short_name: group.short_name.clone(),
                    }
                })?;
                let students = store.group_students(&old_group.id)?;
                tracing::debug!(
                    reference_group = %old_group.id,
                    students = students.len(),
                    "matched reference group"
                );
                let filter = EnrollmentFilter {
                    students: Some(students),
                    types: Some(types.clone()),
                    ..EnrollmentFilter::groupset(current.clone())
                };
                count_students(store, &filter)?
            }
            EstimationMethod::Enrollments {
                groupset, types, ..
            } => {
                let subjects = store.group_subjects(&group.id)?;
                tracing::debug!(
                    study = %group.study,
                    classyear = group.classyear,
                    subjects = ?subjects,
                    "inferred group enrollment attributes"
                );
                let filter = EnrollmentFilter {
                    subjects: Some(subjects),
                    study: Some(group.study.clone()),
                    classyear: Some(group.classyear),
                    types: types.clone(),
                    ..EnrollmentFilter::groupset(groupset.clone())
                };
                count_students(store, &filter)?
            }
        };

        let hint = GroupSizeHint::new(&group.id, label, size);
        store.replace_size_hint(hint.clone())?;
        tracing::info!(group = %group.id, size, "size hint calculated");
        Ok(hint)
    }

    /// Estimates every group independently; failures are reported per group.
    pub fn estimate_all<S>(
        &self,
        store: &mut S,
        groups: &[Group],
        method: &EstimationMethod,
    ) -> BatchReport<GroupSizeHint>
    where
        S: EnrollmentSource + SizeHintStore + ?Sized,
    {
        let label = method.label();
        let mut report = BatchReport::new();
        for group in groups {
            let result = self.estimate(store, group, method);
            report.record(&group.id, Some(label.as_str()), result);
        }
        report
    }
}

fn count_students<S>(store: &S, filter: &EnrollmentFilter) -> Result<u32>
where
    S: EnrollmentSource + ?Sized,
{
    let students: BTreeSet<String> = store
        .enrollments(filter)?
        .into_iter()
        .map(|e| e.student)
        .collect();
    Ok(students.len() as u32)
}

/// Returns the hint of the first method in `methods` that has one.
///
/// More than one live hint for a method violates the one-hint-per-method
/// invariant and fails with [`Error::DuplicateSizeHint`].
pub fn resolve_hint<S>(store: &S, group_id: &str, methods: &[String]) -> Result<Option<GroupSizeHint>>
where
    S: SizeHintStore + ?Sized,
{
    for method in methods {
        let mut hints = store.size_hints(group_id, method)?;
        match hints.len() {
            0 => continue,
            1 => return Ok(hints.pop()),
            count => {
                return Err(Error::DuplicateSizeHint {
                    group: group_id.to_string(),
                    method: method.clone(),
                    count,
                })
            }
        }
    }
    Ok(None)
}
