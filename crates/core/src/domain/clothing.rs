use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::category::CategoryId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClothingItemId(pub String);

/// A garment owned by exactly one user.
///
/// `wear_count`, `last_worn_date` and `durability_score` are derived state owned by the
/// durability scorer; callers outside the lifecycle module only read them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClothingItem {
    pub id: ClothingItemId,
    pub owner_id: OwnerId,
    pub category_id: CategoryId,
    pub name: String,
    pub brand: String,
    pub color: String,
    pub material: String,
    pub price: Decimal,
    pub purchase_date: Option<NaiveDate>,
    pub wear_count: u32,
    pub durability_score: f64,
    pub last_worn_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub is_favorite: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClothingItem {
    pub fn belongs_to(&self, owner_id: &OwnerId) -> bool {
        &self.owner_id == owner_id
    }

    pub fn deactivate(&mut self, at: DateTime<Utc>) {
        self.is_active = false;
        self.updated_at = at;
    }
}
