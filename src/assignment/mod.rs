//! Group-to-realization assignment.
//!
//! Fills an activity realization with student groups up to a capacity,
//! cohort by cohort. This is a first-fit walk, not an optimal packing:
//!
//! 1. Candidates are the activity's groups not yet attached to any of its
//!    realizations.
//! 2. A realization that already has groups only grows within the studies
//!    it already holds (and may then span several cohorts of them).
//! 3. Candidates are bucketed into [`Cohort`]s by (class year, study),
//!    each sorted by `groupnum`, and the cohorts are ordered by
//!    [`CohortOrdering`].
//! 4. Groups are attached while they fit. A group that does not fit is
//!    skipped and never revisited in the same call.
//! 5. Without mixing, the walk ends with the first cohort.
//!
//! Runs over the same candidate set always attach the same groups in the
//! same order. Assignment for realizations of one activity must be
//! serialized by the caller.

mod ordering;

pub use ordering::{ClassYear, Cohort, CohortOrdering, CohortRule, CohortScore, StudyRank};

use std::collections::{BTreeMap, BTreeSet};

use crate::config::{EngineConfig, StudyPriorities};
use crate::error::Result;
use crate::models::{total_size, Group, RealizationKind};
use crate::store::TimetableStore;

/// Attaches groups to realizations.
#[derive(Debug, Clone)]
pub struct RealizationAssigner {
    ordering: CohortOrdering,
}

impl RealizationAssigner {
    /// Assigner ordering cohorts by study rank, then class year.
    pub fn new(priorities: StudyPriorities) -> Self {
        Self {
            ordering: CohortOrdering::by_study_priority(priorities),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.study_priorities.clone())
    }

    /// Replaces the cohort ordering.
    pub fn with_ordering(mut self, ordering: CohortOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Fills `realization_id` up to `target_size` (default: its intended
    /// size) and returns the newly attached groups in attachment order.
    pub fn assign<S>(
        &self,
        store: &mut S,
        realization_id: &str,
        target_size: Option<u32>,
        allow_mixed_studies: bool,
    ) -> Result<Vec<Group>>
    where
        S: TimetableStore + ?Sized,
    {
        let realization = store.realization(realization_id)?;
        let capacity = target_size.unwrap_or(realization.intended_size);
        let attached = store.realization_groups(realization_id)?;
        let mut current = total_size(&attached);

        let taken = store.groups_on_other_realizations(&realization.activity_id, realization_id)?;
        let mut candidates: Vec<Group> = store
            .activity_groups(&realization.activity_id)?
            .into_iter()
            .filter(|g| !taken.contains(&g.id) && !realization.has_group(&g.id))
            .collect();

        let mut allow_mixed = allow_mixed_studies;
        if !attached.is_empty() {
            allow_mixed = true;
            let studies: BTreeSet<&str> = attached.iter().map(|g| g.study.as_str()).collect();
            candidates.retain(|g| studies.contains(g.study.as_str()));
        }

        let cohorts = self.cohorts(candidates);
        tracing::debug!(
            realization = realization_id,
            capacity,
            current,
            cohorts = cohorts.len(),
            allow_mixed,
            "assigning groups"
        );

        let mut added = Vec::new();
        'walk: for cohort in cohorts {
            for group in cohort.groups {
                if current >= capacity {
                    break 'walk;
                }
                if let Some(next) = current.checked_add(group.size).filter(|&n| n <= capacity) {
                    store.attach_group(realization_id, &group.id)?;
                    current = next;
                    tracing::debug!(
                        realization = realization_id,
                        group = %group.id,
                        size = group.size,
                        current,
                        "attached group"
                    );
                    added.push(group);
                } else {
                    tracing::trace!(group = %group.id, size = group.size, "group does not fit, skipping");
                }
            }
            if !allow_mixed {
                break;
            }
        }

        tracing::info!(
            realization = realization_id,
            attached = added.len(),
            size = current,
            capacity,
            "assignment finished"
        );
        Ok(added)
    }

    /// Buckets candidates by cohort and returns the cohorts in fill order.
    pub fn cohorts(&self, candidates: Vec<Group>) -> Vec<Cohort> {
        let mut buckets: BTreeMap<(u32, String), Cohort> = BTreeMap::new();
        for group in candidates {
            buckets
                .entry((group.classyear, group.study.clone()))
                .or_insert_with(|| Cohort::new(group.classyear, &group.study))
                .groups
                .push(group);
        }

        let mut cohorts: Vec<Cohort> = buckets.into_values().collect();
        for cohort in &mut cohorts {
            cohort
                .groups
                .sort_by(|a, b| a.groupnum.cmp(&b.groupnum).then_with(|| a.id.cmp(&b.id)));
        }
        self.ordering.sort(&mut cohorts);
        cohorts
    }
}

/// Groups of a set of activities that still need a staffed realization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnallocatedGroups {
    /// Sorted by id.
    pub groups: Vec<Group>,
    pub students: u32,
}

/// Per activity, the groups not attached to any of its realizations plus
/// the groups on its realizations without teachers; unioned over
/// `activity_ids`.
pub fn unallocated_groups<S>(store: &S, activity_ids: &[&str]) -> Result<UnallocatedGroups>
where
    S: TimetableStore + ?Sized,
{
    let mut unallocated = BTreeSet::new();

    for &activity_id in activity_ids {
        let mut attached = BTreeSet::new();
        for realization in store.activity_realizations(activity_id)? {
            if !realization.has_teachers() {
                unallocated.extend(realization.groups.iter().cloned());
            }
            attached.extend(realization.groups);
        }
        unallocated.extend(
            store
                .activity_groups(activity_id)?
                .into_iter()
                .map(|g| g.id)
                .filter(|id| !attached.contains(id)),
        );
    }

    let groups = unallocated
        .iter()
        .map(|id| store.group(id))
        .collect::<Result<Vec<_>>>()?;
    let students = total_size(&groups);
    Ok(UnallocatedGroups { groups, students })
}

/// Staffing kind of a realization from its attached groups and teachers.
pub fn realization_kind<S>(store: &S, realization_id: &str) -> Result<RealizationKind>
where
    S: TimetableStore + ?Sized,
{
    let realization = store.realization(realization_id)?;
    let students = total_size(&store.realization_groups(realization_id)?);
    Ok(RealizationKind::classify(students, realization.teachers.len()))
}
