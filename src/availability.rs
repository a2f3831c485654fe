//! Teacher availability over the week grid.
//!
//! A slot is busy for a teacher when one of their allocations in the
//! timetable covers it (weight 1.0) or when one of their time preferences
//! at a busy level covers it (the preference's adjusted weight). A slot
//! may carry several entries; weights are never merged.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::Result;
use crate::models::{PreferenceLevel, Slot, Timetable, WeekDay, WeekGrid};
use crate::store::AvailabilitySource;

/// Weight of a slot taken by a committed allocation.
pub const ALLOCATION_WEIGHT: f64 = 1.0;

/// One busy entry: a global slot index and the weight it is busy with.
#[derive(Debug, Clone, Copy)]
pub struct BusySlot {
    pub slot: Slot,
    pub weight: f64,
}

impl BusySlot {
    pub fn new(slot: Slot, weight: f64) -> Self {
        Self { slot, weight }
    }
}

impl PartialEq for BusySlot {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for BusySlot {}

impl PartialOrd for BusySlot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BusySlot {
    fn cmp(&self, other: &Self) -> Ordering {
        self.slot
            .cmp(&other.slot)
            .then_with(|| self.weight.total_cmp(&other.weight))
    }
}

/// Busy entries per day. Every weekday is present.
pub type BusyHours = BTreeMap<WeekDay, BTreeSet<BusySlot>>;

/// Free slots per day. Every weekday is present.
pub type FreeHours = BTreeMap<WeekDay, BTreeSet<Slot>>;

/// Busy slots of a teacher in a timetable.
///
/// `levels` selects which preference levels count as busy, usually
/// [`PreferenceLevel::BUSY`].
pub fn busy_hours<S>(
    store: &S,
    teacher_id: &str,
    timetable: &Timetable,
    levels: &[PreferenceLevel],
) -> Result<BusyHours>
where
    S: AvailabilitySource + ?Sized,
{
    let mut busy: BusyHours = WeekDay::ALL.iter().map(|&d| (d, BTreeSet::new())).collect();

    for allocation in store.teacher_allocations(teacher_id, timetable)? {
        let entries = busy.entry(allocation.day).or_default();
        for slot in allocation.slots()? {
            entries.insert(BusySlot::new(slot, ALLOCATION_WEIGHT));
        }
    }

    for preference in store.teacher_preferences(teacher_id, &timetable.preference_set)? {
        if !levels.contains(&preference.level) {
            continue;
        }
        let entries = busy.entry(preference.day).or_default();
        for slot in preference.slots()? {
            entries.insert(BusySlot::new(slot, preference.adjusted_weight));
        }
    }

    tracing::debug!(
        teacher = teacher_id,
        timetable = %timetable.id,
        entries = busy.values().map(BTreeSet::len).sum::<usize>(),
        "busy hours computed"
    );
    Ok(busy)
}

/// Free slots of a teacher: every slot minus those busy with a weight of
/// at least `threshold`.
pub fn free_hours<S>(
    store: &S,
    teacher_id: &str,
    timetable: &Timetable,
    levels: &[PreferenceLevel],
    threshold: f64,
) -> Result<FreeHours>
where
    S: AvailabilitySource + ?Sized,
{
    let busy = busy_hours(store, teacher_id, timetable, levels)?;
    Ok(free_from_busy(&busy, threshold))
}

/// Free slots implied by a busy mapping.
pub fn free_from_busy(busy: &BusyHours, threshold: f64) -> FreeHours {
    WeekDay::ALL
        .iter()
        .map(|&day| {
            let blocked: BTreeSet<Slot> = busy
                .get(&day)
                .into_iter()
                .flatten()
                .filter(|b| b.weight >= threshold)
                .map(|b| b.slot)
                .collect();
            let free = WeekGrid::day_slots(day)
                .filter(|s| !blocked.contains(s))
                .collect();
            (day, free)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityRealization, Allocation, ClockTime, TimePreference};
    use crate::store::MemoryStore;
    use rand::{Rng, SeedableRng};

    fn at(h: u32) -> ClockTime {
        ClockTime::hour(h).unwrap()
    }

    fn timetable() -> Timetable {
        Timetable::new("tt", "2024", "ps")
    }

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_realization(ActivityRealization::new("r1", "a", 20).with_teacher("t1"))
            .with_realization(ActivityRealization::new("r2", "a", 20).with_teacher("t2"))
            .with_allocation(Allocation::new("r1", "tt", WeekDay::Mon, at(8), 2))
            .with_allocation(Allocation::new("r1", "other", WeekDay::Tue, at(8), 2))
            .with_allocation(Allocation::new("r2", "tt", WeekDay::Wed, at(8), 2))
            .with_preference(
                TimePreference::new("t1", "ps", WeekDay::Mon, at(9), 1, PreferenceLevel::Cannot)
                    .with_weight(1.5, 0.8),
            )
            .with_preference(TimePreference::new(
                "t1",
                "ps",
                WeekDay::Fri,
                at(12),
                1,
                PreferenceLevel::Like,
            ))
            .with_preference(
                TimePreference::new("t1", "ps", WeekDay::Thu, at(10), 1, PreferenceLevel::Hate)
                    .with_weight(0.5, 0.3),
            )
    }

    #[test]
    fn test_busy_hours() {
        let busy = busy_hours(&store(), "t1", &timetable(), &PreferenceLevel::BUSY).unwrap();
        assert_eq!(busy.len(), 7);

        let mon: Vec<(Slot, f64)> = busy[&WeekDay::Mon].iter().map(|b| (b.slot, b.weight)).collect();
        // 08:00-10:00 allocated, 09:00-10:00 also Cannot at 0.8.
        assert_eq!(
            mon,
            vec![(16, 1.0), (17, 1.0), (18, 0.8), (18, 1.0), (19, 0.8), (19, 1.0)]
        );
        assert!(busy[&WeekDay::Tue].is_empty());
        assert!(busy[&WeekDay::Wed].is_empty());
        assert!(busy[&WeekDay::Fri].is_empty());
        assert_eq!(busy[&WeekDay::Thu].len(), 2);
    }

    #[test]
    fn test_free_hours_threshold() {
        let store = store();
        let levels = PreferenceLevel::BUSY;

        let free = free_hours(&store, "t1", &timetable(), &levels, 0.0).unwrap();
        assert_eq!(free[&WeekDay::Mon].len(), 44);
        assert_eq!(free[&WeekDay::Thu].len(), 46);
        assert_eq!(free[&WeekDay::Sun].len(), 48);

        let free = free_hours(&store, "t1", &timetable(), &levels, 0.5).unwrap();
        assert_eq!(free[&WeekDay::Thu].len(), 48);

        let free = free_hours(&store, "t1", &timetable(), &levels, 0.9).unwrap();
        // Only the allocation (1.0) still blocks Monday.
        assert_eq!(free[&WeekDay::Mon].len(), 44);
        assert!(!free[&WeekDay::Mon].contains(&18));
    }

    #[test]
    fn test_invalid_preference_interval() {
        let store = MemoryStore::new().with_preference(TimePreference::new(
            "t1",
            "ps",
            WeekDay::Mon,
            at(23),
            2,
            PreferenceLevel::Hate,
        ));
        assert!(busy_hours(&store, "t1", &timetable(), &PreferenceLevel::BUSY).is_err());
    }

    #[test]
    fn test_free_and_busy_cover_every_slot() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let mut store = MemoryStore::new();
        for _ in 0..40 {
            let day = WeekDay::ALL[rng.random_range(0..7)];
            let start = rng.random_range(0..20);
            let level = PreferenceLevel::ALL[rng.random_range(0..PreferenceLevel::ALL.len())];
            let adjusted: f64 = rng.random();
            store = store.with_preference(
                TimePreference::new("t", "ps", day, at(start), rng.random_range(1..4), level)
                    .with_weight(1.0, adjusted),
            );
        }

        let busy = busy_hours(&store, "t", &timetable(), &PreferenceLevel::BUSY).unwrap();
        for threshold in [0.0, 0.25, 0.5, 0.75, 1.0] {
            let free = free_from_busy(&busy, threshold);
            for day in WeekDay::ALL {
                let blocked: BTreeSet<Slot> = busy[&day]
                    .iter()
                    .filter(|b| b.weight >= threshold)
                    .map(|b| b.slot)
                    .collect();
                let all: BTreeSet<Slot> = WeekGrid::day_slots(day).collect();
                let union: BTreeSet<Slot> = free[&day].union(&blocked).copied().collect();
                assert_eq!(union, all);
                assert!(free[&day].is_disjoint(&blocked));
            }
        }
    }
}
