//! Timetabling domain models.
//!
//! Plain records describing the inputs and outputs of the engine. They
//! carry no persistence logic; reading and writing them is the job of the
//! collaborators in [`crate::store`].
//!
//! # Domain Mappings
//!
//! | u-timetable | Faculty timetable |
//! |-------------|-------------------|
//! | Group | Student cohort / lab section |
//! | Activity | Lectures, labs or tutorials of a subject |
//! | ActivityRealization | One scheduled section of an activity |
//! | TimePreference | A teacher's weighted wish for a time interval |
//! | Allocation | A committed teaching slot |

mod activity;
mod calendar;
mod enrollment;
mod group;
mod preference;

pub use activity::{
    Activity, ActivityRealization, RealizationKind, LARGE_REALIZATION_THRESHOLD,
};
pub use calendar::{ClockTime, Slot, WeekDay, WeekGrid, DAYS_PER_WEEK, SLOTS_PER_DAY, WEEK_SLOTS};
pub use enrollment::{
    describe_types, EnrollmentFilter, EnrollmentType, GroupSizeHint, StudentEnrollment,
};
pub use group::{total_size, Group};
pub use preference::{
    Allocation, PreferenceLevel, Teacher, TimePreference, Timetable, STRONG_WEIGHT_THRESHOLD,
};
