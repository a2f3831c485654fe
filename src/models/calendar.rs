//! Weekly calendar grid.
//!
//! A week is a fixed sequence of half-hour slots: 7 days × 48 slots/day
//! = 336 slots. Every other component speaks in slot indices.
//!
//! # Slot Model
//! `slot = day_index * 48 + half_hour_index`, where `day_index` is 0 for
//! Monday and `half_hour_index` is 0 for 00:00.
//!
//! Intervals are half-open: `[start, start + duration)` and must end on or
//! before the end of their own day. The grid never clamps.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Index of a half-hour slot within the week, in `[0, WEEK_SLOTS)`.
pub type Slot = usize;

/// Days per week covered by the grid.
pub const DAYS_PER_WEEK: usize = 7;
/// Half-hour slots per day.
pub const SLOTS_PER_DAY: usize = 48;
/// Half-hour slots per week.
pub const WEEK_SLOTS: usize = DAYS_PER_WEEK * SLOTS_PER_DAY;

/// Day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WeekDay {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl WeekDay {
    /// All days, Monday first.
    pub const ALL: [WeekDay; DAYS_PER_WEEK] = [
        WeekDay::Mon,
        WeekDay::Tue,
        WeekDay::Wed,
        WeekDay::Thu,
        WeekDay::Fri,
        WeekDay::Sat,
        WeekDay::Sun,
    ];

    /// Position within the week (Monday = 0).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mon => "MON",
            Self::Tue => "TUE",
            Self::Wed => "WED",
            Self::Thu => "THU",
            Self::Fri => "FRI",
            Self::Sat => "SAT",
            Self::Sun => "SUN",
        }
    }
}

impl fmt::Display for WeekDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A wall-clock time on a half-hour boundary (`HH:00` or `HH:30`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    /// Creates a clock time, rejecting anything off the half-hour grid.
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        if hour >= 24 || (minute != 0 && minute != 30) {
            return Err(Error::InvalidClockTime(format!("{hour:02}:{minute:02}")));
        }
        Ok(Self {
            hour: hour as u8,
            minute: minute as u8,
        })
    }

    /// Full hour (`HH:00`).
    pub fn hour(hour: u32) -> Result<Self> {
        Self::new(hour, 0)
    }

    /// Clock time of a half-hour index within a day.
    pub fn from_half_hour(index: usize) -> Result<Self> {
        Self::new((index / 2) as u32, (index % 2) as u32 * 30)
    }

    /// Half-hour index within the day, in `[0, SLOTS_PER_DAY)`.
    #[inline]
    pub fn half_hour_index(self) -> usize {
        self.hour as usize * 2 + self.minute as usize / 30
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ClockTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidClockTime(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;
        let hour = h.parse().map_err(|_| invalid())?;
        let minute = m.parse().map_err(|_| invalid())?;
        Self::new(hour, minute)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

/// Conversions between (day, clock time) and week slot indices.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekGrid;

impl WeekGrid {
    /// Slot index of a (day, time) pair.
    ///
    /// Injective over valid inputs and always in `[0, WEEK_SLOTS)`.
    #[inline]
    pub fn slot_index(day: WeekDay, time: ClockTime) -> Slot {
        day.index() * SLOTS_PER_DAY + time.half_hour_index()
    }

    /// The `duration` consecutive slots starting at `slot_index(day, start)`.
    ///
    /// `duration` is in half-hour units. Fails with
    /// [`Error::InvalidInterval`] when `duration <= 0` or the interval runs
    /// past the end of `day`.
    pub fn slots_for_interval(day: WeekDay, start: ClockTime, duration: i64) -> Result<Range<Slot>> {
        let offset = start.half_hour_index();
        let invalid = || Error::InvalidInterval {
            day,
            start: Self::slot_index(day, start),
            duration,
        };
        if duration <= 0 {
            return Err(invalid());
        }
        let end = offset
            .checked_add(duration as usize)
            .filter(|&end| end <= SLOTS_PER_DAY)
            .ok_or_else(invalid)?;
        let base = day.index() * SLOTS_PER_DAY;
        Ok(base + offset..base + end)
    }

    /// All slots of a day.
    #[inline]
    pub fn day_slots(day: WeekDay) -> Range<Slot> {
        let base = day.index() * SLOTS_PER_DAY;
        base..base + SLOTS_PER_DAY
    }

    /// Day a slot belongs to, or `None` for slots outside the week.
    pub fn day_of(slot: Slot) -> Option<WeekDay> {
        WeekDay::ALL.get(slot / SLOTS_PER_DAY).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn t(h: u32, m: u32) -> ClockTime {
        ClockTime::new(h, m).unwrap()
    }

    #[test]
    fn test_slot_index() {
        assert_eq!(WeekGrid::slot_index(WeekDay::Mon, t(0, 0)), 0);
        assert_eq!(WeekGrid::slot_index(WeekDay::Mon, t(7, 30)), 15);
        assert_eq!(WeekGrid::slot_index(WeekDay::Tue, t(0, 0)), 48);
        assert_eq!(WeekGrid::slot_index(WeekDay::Sun, t(23, 30)), WEEK_SLOTS - 1);
    }

    #[test]
    fn test_slot_index_injective() {
        let mut seen = HashSet::new();
        for day in WeekDay::ALL {
            for idx in 0..SLOTS_PER_DAY {
                let slot = WeekGrid::slot_index(day, ClockTime::from_half_hour(idx).unwrap());
                assert!(slot < WEEK_SLOTS);
                assert!(seen.insert(slot), "slot {slot} produced twice");
            }
        }
        assert_eq!(seen.len(), WEEK_SLOTS);
    }

    #[test]
    fn test_slots_for_interval() {
        let slots = WeekGrid::slots_for_interval(WeekDay::Wed, t(8, 0), 4).unwrap();
        assert_eq!(slots.collect::<Vec<_>>(), vec![112, 113, 114, 115]);
    }

    #[test]
    fn test_interval_to_end_of_day() {
        let slots = WeekGrid::slots_for_interval(WeekDay::Sun, t(23, 0), 2).unwrap();
        assert_eq!(slots, 334..336);
    }

    #[test]
    fn test_invalid_intervals() {
        assert!(matches!(
            WeekGrid::slots_for_interval(WeekDay::Mon, t(8, 0), 0),
            Err(Error::InvalidInterval { .. })
        ));
        assert!(matches!(
            WeekGrid::slots_for_interval(WeekDay::Mon, t(8, 0), -2),
            Err(Error::InvalidInterval { .. })
        ));
        // Crosses midnight.
        assert!(matches!(
            WeekGrid::slots_for_interval(WeekDay::Mon, t(23, 30), 2),
            Err(Error::InvalidInterval { .. })
        ));
        assert!(WeekGrid::slots_for_interval(WeekDay::Sun, t(23, 30), 2).is_err());
    }

    #[test]
    fn test_clock_time_validation() {
        assert!(ClockTime::new(24, 0).is_err());
        assert!(ClockTime::new(7, 15).is_err());
        assert_eq!("07:30".parse::<ClockTime>().unwrap(), t(7, 30));
        assert!("7h".parse::<ClockTime>().is_err());
        assert_eq!(t(9, 0).to_string(), "09:00");
    }

    #[test]
    fn test_day_of() {
        assert_eq!(WeekGrid::day_of(0), Some(WeekDay::Mon));
        assert_eq!(WeekGrid::day_of(100), Some(WeekDay::Wed));
        assert_eq!(WeekGrid::day_of(WEEK_SLOTS), None);
        assert_eq!(WeekGrid::day_slots(WeekDay::Fri), 192..240);
    }

    #[test]
    fn test_clock_time_serde() {
        let json = serde_json::to_string(&t(12, 30)).unwrap();
        assert_eq!(json, "\"12:30\"");
        let back: ClockTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t(12, 30));
        assert!(serde_json::from_str::<ClockTime>("\"12:10\"").is_err());
    }
}
