//! Splitting top-level groups into lab and tutorial subgroups.
//!
//! A top-level group's resolved size hint is cut into chunks, largest
//! first, using the chunk sizes configured for the activity type. Every
//! chunk becomes one subgroup that inherits the parent's cohort.

use serde::{Deserialize, Serialize};

use super::resolve_hint;
use crate::config::SubgroupConfig;
use crate::error::Result;
use crate::models::Group;
use crate::store::SizeHintStore;

/// Splits `total` greedily into `chunks` (largest first).
///
/// A chunk size is reused while it still fits and never revisited once it
/// stops fitting. Whatever the configured sizes cannot cover is emitted as
/// single-student chunks.
pub fn split_into_sizes(total: u32, chunks: &[u32]) -> Vec<u32> {
    let chunks: Vec<u32> = chunks.iter().copied().filter(|&c| c > 0).collect();
    let mut sizes = Vec::new();
    let mut remaining = total;
    let mut pos = 0;

    while remaining > 0 {
        match chunks.get(pos) {
            Some(&chunk) if chunk <= remaining => {
                sizes.push(chunk);
                remaining -= chunk;
            }
            Some(_) => pos += 1,
            None => {
                sizes.push(1);
                remaining -= 1;
            }
        }
    }
    sizes
}

/// A subgroup to be created under a top-level group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubgroupPlan {
    pub parent: String,
    pub activity_type: String,
    /// 1-based position among the parent's subgroups of this type.
    pub index: u32,
    pub name: String,
    pub short_name: String,
    pub size: u32,
}

impl SubgroupPlan {
    /// Materializes the plan as a group with the given id.
    pub fn to_group(&self, id: impl Into<String>, parent: &Group) -> Group {
        Group::new(id, &self.short_name)
            .with_name(&self.name)
            .in_groupset(&parent.groupset)
            .with_size(self.size)
            .with_cohort(&parent.study, parent.classyear)
            .with_groupnum(self.index)
            .with_parent(&parent.id)
    }
}

/// Plans subgroups for each top-level group and activity type.
///
/// The size comes from the first of `methods` with a live hint. Groups
/// without a hint are skipped. With `keep_empty`, a hint of zero yields a
/// single empty subgroup instead of none.
pub fn plan_subgroups<S>(
    store: &S,
    groups: &[Group],
    activity_types: &[&str],
    methods: &[String],
    config: &SubgroupConfig,
    keep_empty: bool,
) -> Result<Vec<SubgroupPlan>>
where
    S: SizeHintStore + ?Sized,
{
    let mut plans = Vec::new();

    for group in groups {
        let Some(hint) = resolve_hint(store, &group.id, methods)? else {
            tracing::debug!(group = %group.id, "no size hint, skipping");
            continue;
        };

        for &activity_type in activity_types {
            let chunks = config.chunks_for(&group.short_name, activity_type);
            let mut sizes = split_into_sizes(hint.size, chunks);
            if sizes.is_empty() && keep_empty {
                sizes.push(0);
            }
            tracing::debug!(
                group = %group.id,
                activity_type,
                size = hint.size,
                sizes = ?sizes,
                "planned subgroups"
            );

            plans.extend(sizes.into_iter().enumerate().map(|(i, size)| {
                let index = i as u32 + 1;
                SubgroupPlan {
                    parent: group.id.clone(),
                    activity_type: activity_type.to_string(),
                    index,
                    name: format!("{}, {activity_type}, skupina {index}", group.name),
                    short_name: format!("{}_{activity_type}_{index:02}", group.short_name),
                    size,
                }
            }));
        }
    }

    Ok(plans)
}
