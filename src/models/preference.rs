//! Teacher time preferences and committed allocations.
//!
//! Both are expressed as (day, start, duration) intervals where the
//! duration is in clock hours. The grid works in half-hours, see
//! [`half_hours`](TimePreference::half_hours).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

use super::{ClockTime, Slot, WeekDay, WeekGrid};
use crate::error::Result;

/// Weight above which a preference is the strong variant of its level.
pub const STRONG_WEIGHT_THRESHOLD: f64 = 1.0;

/// Qualitative preference scale, from most to least averse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PreferenceLevel {
    Hate,
    #[serde(rename = "CANT")]
    Cannot,
    Dislike,
    Neutral,
    Like,
    Love,
}

impl PreferenceLevel {
    pub const ALL: [PreferenceLevel; 6] = [
        PreferenceLevel::Hate,
        PreferenceLevel::Cannot,
        PreferenceLevel::Dislike,
        PreferenceLevel::Neutral,
        PreferenceLevel::Like,
        PreferenceLevel::Love,
    ];

    /// Levels that make a teacher unavailable by default.
    pub const BUSY: [PreferenceLevel; 2] = [PreferenceLevel::Cannot, PreferenceLevel::Hate];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hate => "HATE",
            Self::Cannot => "CANT",
            Self::Dislike => "DISLIKE",
            Self::Neutral => "NEUTRAL",
            Self::Like => "LIKE",
            Self::Love => "LOVE",
        }
    }
}

impl fmt::Display for PreferenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A weighted time preference of a teacher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePreference {
    pub teacher: String,
    /// Preference set (planning round) this entry belongs to.
    pub preference_set: String,
    pub day: WeekDay,
    pub start: ClockTime,
    /// Duration in clock hours.
    pub duration: u32,
    pub level: PreferenceLevel,
    /// Raw weight; above [`STRONG_WEIGHT_THRESHOLD`] marks the strong variant.
    pub weight: f64,
    /// Weight normalized into `[0, 1]` by the preference collector.
    pub adjusted_weight: f64,
}

impl TimePreference {
    /// Creates a preference with weight 1.0.
    pub fn new(
        teacher: impl Into<String>,
        preference_set: impl Into<String>,
        day: WeekDay,
        start: ClockTime,
        duration: u32,
        level: PreferenceLevel,
    ) -> Self {
        Self {
            teacher: teacher.into(),
            preference_set: preference_set.into(),
            day,
            start,
            duration,
            level,
            weight: 1.0,
            adjusted_weight: 1.0,
        }
    }

    /// Sets raw and normalized weights.
    pub fn with_weight(mut self, weight: f64, adjusted_weight: f64) -> Self {
        self.weight = weight;
        self.adjusted_weight = adjusted_weight;
        self
    }

    /// Whether this is the strong variant of its level.
    #[inline]
    pub fn is_strong(&self) -> bool {
        self.weight > STRONG_WEIGHT_THRESHOLD
    }

    /// Duration in half-hour units.
    #[inline]
    pub fn half_hours(&self) -> i64 {
        i64::from(self.duration) * 2
    }

    /// Week slots covered by this preference.
    pub fn slots(&self) -> Result<Range<Slot>> {
        WeekGrid::slots_for_interval(self.day, self.start, self.half_hours())
    }
}

/// A committed teaching slot of a realization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub realization: String,
    pub timetable: String,
    pub day: WeekDay,
    pub start: ClockTime,
    /// Duration in clock hours.
    pub duration: u32,
}

impl Allocation {
    pub fn new(
        realization: impl Into<String>,
        timetable: impl Into<String>,
        day: WeekDay,
        start: ClockTime,
        duration: u32,
    ) -> Self {
        Self {
            realization: realization.into(),
            timetable: timetable.into(),
            day,
            start,
            duration,
        }
    }

    /// Week slots occupied by this allocation.
    pub fn slots(&self) -> Result<Range<Slot>> {
        WeekGrid::slots_for_interval(self.day, self.start, i64::from(self.duration) * 2)
    }
}

/// A timetable planning round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timetable {
    pub id: String,
    pub groupset: String,
    pub preference_set: String,
}

impl Timetable {
    pub fn new(
        id: impl Into<String>,
        groupset: impl Into<String>,
        preference_set: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            groupset: groupset.into(),
            preference_set: preference_set.into(),
        }
    }
}

/// A teacher known to the timetabling system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: String,
    pub name: String,
    /// Identifier the external scheduler stores as `external_uid`.
    pub external_uid: String,
}

impl Teacher {
    /// Creates a teacher whose external uid equals its id.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: String::new(),
            external_uid: id.clone(),
            id,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_external_uid(mut self, uid: impl Into<String>) -> Self {
        self.external_uid = uid.into();
        self
    }
}
