use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::clothing::ClothingItemId;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WearRecordId(pub String);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WearIntensity {
    Light,
    #[default]
    Normal,
    Heavy,
}

impl WearIntensity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Normal => "normal",
            Self::Heavy => "heavy",
        }
    }

    pub fn damage_factor(&self) -> f64 {
        match self {
            Self::Light => 0.5,
            Self::Normal => 1.0,
            Self::Heavy => 2.0,
        }
    }
}

impl FromStr for WearIntensity {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "normal" => Ok(Self::Normal),
            "heavy" => Ok(Self::Heavy),
            other => Err(DomainError::InvalidInput(format!(
                "unsupported wear intensity `{other}` (expected light|normal|heavy)"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WearRecord {
    pub id: WearRecordId,
    pub clothing_item_id: ClothingItemId,
    pub wear_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub duration_hours: Option<f64>,
    pub intensity: WearIntensity,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WearStats {
    pub total_wears: u64,
    pub items_worn: u64,
    pub last_wear_date: Option<DateTime<Utc>>,
    pub wears_by_category: BTreeMap<String, u64>,
}
