use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::clothing::ClothingItemId;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaintenanceRecordId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceType {
    Washing,
    DryCleaning,
    Repair,
    Polishing,
    Waterproof,
    Storage,
    Other,
}

impl MaintenanceType {
    pub const ALL: [MaintenanceType; 7] = [
        Self::Washing,
        Self::DryCleaning,
        Self::Repair,
        Self::Polishing,
        Self::Waterproof,
        Self::Storage,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Washing => "washing",
            Self::DryCleaning => "dry_cleaning",
            Self::Repair => "repair",
            Self::Polishing => "polishing",
            Self::Waterproof => "waterproof",
            Self::Storage => "storage",
            Self::Other => "other",
        }
    }

    /// Lenient decoding for stored rows: anything unrecognised is treated as `Other`.
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or(Self::Other)
    }
}

impl fmt::Display for MaintenanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaintenanceType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "washing" => Ok(Self::Washing),
            "dry_cleaning" => Ok(Self::DryCleaning),
            "repair" => Ok(Self::Repair),
            "polishing" => Ok(Self::Polishing),
            "waterproof" => Ok(Self::Waterproof),
            "storage" => Ok(Self::Storage),
            "other" => Ok(Self::Other),
            other => Err(DomainError::InvalidInput(format!(
                "unsupported maintenance type `{other}` (expected washing|dry_cleaning|repair|polishing|waterproof|storage|other)"
            ))),
        }
    }
}

/// One care event performed on an item. `next_maintenance_date` is derived from
/// `maintenance_type` and `maintenance_date` and is only ever written by the scorer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub id: MaintenanceRecordId,
    pub clothing_item_id: ClothingItemId,
    pub maintenance_type: MaintenanceType,
    pub cost: Decimal,
    pub maintenance_date: NaiveDate,
    pub effectiveness_score: Option<u8>,
    pub next_maintenance_date: NaiveDate,
    pub service_provider: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderPriority {
    Low,
    Medium,
    High,
    Urgent,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceReminder {
    pub record_id: MaintenanceRecordId,
    pub clothing_item_id: ClothingItemId,
    pub clothing_item_name: String,
    pub maintenance_type: MaintenanceType,
    pub next_maintenance_date: NaiveDate,
    pub days_overdue: i64,
    pub priority: ReminderPriority,
}
