//! Durability and lifecycle scoring.
//!
//! Everything here is a total function over caller-supplied snapshots: missing purchase dates,
//! unknown materials and unknown maintenance types degrade to table defaults rather than errors.

pub mod reminders;
pub mod scorer;
pub mod spending;
pub mod tables;
pub mod usage;

pub use reminders::{
    build_reminder, cost_by_type, is_overdue, is_upcoming, latest_per_item_and_type,
    reminder_priority,
};
pub use scorer::{DurabilityScorer, MAX_DURABILITY, MIN_DURABILITY};
pub use spending::spending_stats;
pub use tables::DurabilityTables;
pub use usage::wear_stats;
