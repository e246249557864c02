use std::collections::BTreeMap;

use chrono::{DateTime, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::clothing::ClothingItemId;

pub const DEFAULT_CURRENCY: &str = "CNY";

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PurchaseRecordId(pub String);

/// Where, when and for how much an item was bought. An item has at most one purchase record.
///
/// `discount_percent` and `warranty_expiry` are derived; call [`PurchaseRecord::refresh`] after
/// changing prices, the purchase date or the warranty period.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub id: PurchaseRecordId,
    pub clothing_item_id: ClothingItemId,
    pub purchase_price: Decimal,
    pub original_price: Option<Decimal>,
    pub discount_percent: Decimal,
    pub store_name: Option<String>,
    pub online_store: Option<String>,
    pub order_number: Option<String>,
    pub payment_method: Option<String>,
    pub currency: String,
    pub purchase_date: NaiveDate,
    pub warranty_months: Option<u32>,
    pub warranty_expiry: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PurchaseRecord {
    /// Percentage saved against the original price, two decimals. Zero without a usable
    /// original price.
    pub fn computed_discount(&self) -> Decimal {
        match self.original_price {
            Some(original) if original > Decimal::ZERO => {
                ((original - self.purchase_price) / original * Decimal::ONE_HUNDRED).round_dp(2)
            }
            _ => Decimal::ZERO,
        }
    }

    pub fn refresh(mut self) -> Self {
        self.discount_percent = self.computed_discount();
        self.warranty_expiry = self
            .warranty_months
            .filter(|months| *months > 0)
            .and_then(|months| self.purchase_date.checked_add_months(Months::new(months)));
        self
    }

    pub fn is_under_warranty(&self, today: NaiveDate) -> bool {
        self.warranty_expiry.is_some_and(|expiry| today < expiry)
    }

    /// Store used for grouping: the online store wins over the physical one.
    pub fn store(&self) -> Option<&str> {
        [self.online_store.as_deref(), self.store_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|store| !store.is_empty())
    }
}

/// Optional narrowing for purchase listings. Both date bounds are inclusive; `store` matches a
/// substring of [`PurchaseRecord::store`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct PurchaseFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub store: Option<String>,
}

impl PurchaseFilter {
    pub fn matches(&self, record: &PurchaseRecord) -> bool {
        let after_start = self.from.map_or(true, |from| record.purchase_date >= from);
        let before_end = self.to.map_or(true, |to| record.purchase_date <= to);
        let at_store = self
            .store
            .as_deref()
            .map_or(true, |wanted| record.store().is_some_and(|store| store.contains(wanted)));
        after_start && before_end && at_store
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpendingStats {
    pub total_spent: Decimal,
    pub purchase_count: u64,
    pub average_price: Decimal,
    pub year: i32,
    /// `YYYY-MM` keys, restricted to `year`.
    pub by_month: BTreeMap<String, Decimal>,
    pub by_category: BTreeMap<String, Decimal>,
    pub by_store: BTreeMap<String, Decimal>,
}
