use std::collections::HashMap;

use chrono::Datelike;
use rust_decimal::Decimal;

use crate::catalog::CategoryHierarchy;
use crate::domain::clothing::{ClothingItem, ClothingItemId};
use crate::domain::purchase::{PurchaseRecord, SpendingStats};

const UNCATEGORIZED: &str = "未分类";
const UNKNOWN_STORE: &str = "未知";

/// Spending over an owner's purchase records. Totals, the average and the category and store
/// breakdowns cover every record; the monthly breakdown only covers `year`.
pub fn spending_stats(
    records: &[PurchaseRecord],
    items: &[ClothingItem],
    categories: &CategoryHierarchy,
    year: i32,
) -> SpendingStats {
    let items_by_id: HashMap<&ClothingItemId, &ClothingItem> =
        items.iter().map(|item| (&item.id, item)).collect();

    let mut stats = SpendingStats { year, ..SpendingStats::default() };
    for record in records {
        let amount = record.purchase_price;
        stats.total_spent += amount;
        stats.purchase_count += 1;

        if record.purchase_date.year() == year {
            let month = record.purchase_date.format("%Y-%m").to_string();
            *stats.by_month.entry(month).or_insert(Decimal::ZERO) += amount;
        }

        let category = items_by_id
            .get(&record.clothing_item_id)
            .and_then(|item| categories.name_of(&item.category_id))
            .unwrap_or(UNCATEGORIZED);
        *stats.by_category.entry(category.to_string()).or_insert(Decimal::ZERO) += amount;

        let store = record.store().unwrap_or(UNKNOWN_STORE);
        *stats.by_store.entry(store.to_string()).or_insert(Decimal::ZERO) += amount;
    }

    if stats.purchase_count > 0 {
        stats.average_price =
            (stats.total_spent / Decimal::from(stats.purchase_count)).round_dp(2);
    }
    stats
}
