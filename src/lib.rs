//! Course timetabling engine.
//!
//! Assigns student groups to scheduled sections of activities, estimates
//! group sizes from enrollment data, computes teacher availability over the
//! weekly half-hour grid and exports teacher time preferences to an
//! external scheduling system.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Group`, `Activity`, `ActivityRealization`,
//!   `StudentEnrollment`, `TimePreference`, `Allocation`, `WeekGrid`
//! - **`assignment`**: First-fit filling of realizations with groups, cohort by cohort
//! - **`sizing`**: Group size hints (historical matching, enrollment
//!   filtering) and subgroup planning
//! - **`availability`**: Busy and free slots of a teacher
//! - **`export`**: Encoding and publishing of time preferences
//! - **`store`**: Collaborator traits, an in-memory store and a SQLite
//!   backend for the external scheduler's tables
//! - **`config`**: Institutional tables (study priorities, preference
//!   alphabet, subgroup chunks)
//! - **`validation`**: Input integrity checks (duplicate IDs, parent cycles, references)
//!
//! # Architecture
//!
//! The engine owns no storage and runs synchronously. Each operation reads
//! and writes through the traits in [`store`]; one call handles one logical
//! unit (one realization, one group, one teacher). Batch drivers isolate
//! per-entity failures in a [`batch::BatchReport`].
//!
//! # References
//!
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"
//! - Schaerf (1999), "A Survey of Automated Timetabling"

pub mod assignment;
pub mod availability;
pub mod batch;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod sizing;
pub mod store;
pub mod validation;

pub use error::{Error, Result};
