use std::collections::{HashMap, HashSet};

use crate::catalog::CategoryHierarchy;
use crate::domain::clothing::{ClothingItem, ClothingItemId};
use crate::domain::wear::{WearRecord, WearStats};

const UNCATEGORIZED: &str = "未分类";

/// Aggregates an owner's wear history. Records that point at unknown items still count towards
/// the total and land under the uncategorised bucket.
pub fn wear_stats(
    records: &[WearRecord],
    items: &[ClothingItem],
    categories: &CategoryHierarchy,
) -> WearStats {
    let items_by_id: HashMap<&ClothingItemId, &ClothingItem> =
        items.iter().map(|item| (&item.id, item)).collect();

    let mut stats = WearStats::default();
    let mut worn = HashSet::new();

    for record in records {
        stats.total_wears += 1;
        worn.insert(&record.clothing_item_id);
        if stats.last_wear_date.map_or(true, |last| record.wear_date > last) {
            stats.last_wear_date = Some(record.wear_date);
        }

        let category_name = items_by_id
            .get(&record.clothing_item_id)
            .and_then(|item| categories.name_of(&item.category_id))
            .unwrap_or(UNCATEGORIZED);
        *stats.wears_by_category.entry(category_name.to_string()).or_insert(0) += 1;
    }

    stats.items_worn = worn.len() as u64;
    stats
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::wear_stats;
    use crate::catalog::CategoryHierarchy;
    use crate::domain::category::{Category, CategoryId};
    use crate::domain::clothing::{ClothingItem, ClothingItemId, OwnerId};
    use crate::domain::wear::{WearIntensity, WearRecord, WearRecordId};

    fn item(id: &str, category: &str) -> ClothingItem {
        let now = Utc::now();
        ClothingItem {
            id: ClothingItemId(id.to_string()),
            owner_id: OwnerId("user-1".to_string()),
            category_id: CategoryId(category.to_string()),
            name: id.to_string(),
            brand: String::new(),
            color: String::new(),
            material: String::new(),
            price: Decimal::ZERO,
            purchase_date: None,
            wear_count: 0,
            durability_score: 100.0,
            last_worn_date: None,
            notes: None,
            is_favorite: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn wear(id: &str, item: &str, day: u32) -> WearRecord {
        let at = Utc.with_ymd_and_hms(2024, 5, day, 8, 0, 0).single().expect("timestamp");
        WearRecord {
            id: WearRecordId(id.to_string()),
            clothing_item_id: ClothingItemId(item.to_string()),
            wear_date: at,
            notes: None,
            duration_hours: None,
            intensity: WearIntensity::Normal,
            created_at: at,
        }
    }

    #[test]
    fn stats_count_totals_distinct_items_and_categories() {
        let categories = CategoryHierarchy::new(vec![
            Category::new(CategoryId("tops".to_string()), "上衣", None, 1),
            Category::new(CategoryId("shoes".to_string()), "鞋子", None, 2),
        ]);
        let items = vec![item("shirt", "tops"), item("sneaker", "shoes")];
        let records = vec![
            wear("w1", "shirt", 1),
            wear("w2", "shirt", 9),
            wear("w3", "sneaker", 4),
            wear("w4", "deleted", 2),
        ];

        let stats = wear_stats(&records, &items, &categories);

        assert_eq!(stats.total_wears, 4);
        assert_eq!(stats.items_worn, 3);
        assert_eq!(stats.wears_by_category.get("上衣"), Some(&2));
        assert_eq!(stats.wears_by_category.get("鞋子"), Some(&1));
        assert_eq!(stats.wears_by_category.get("未分类"), Some(&1));
        assert_eq!(stats.last_wear_date, Some(records[1].wear_date));
    }

    #[test]
    fn empty_history_yields_zeroed_stats() {
        let stats = wear_stats(&[], &[], &CategoryHierarchy::default());
        assert_eq!(stats.total_wears, 0);
        assert!(stats.last_wear_date.is_none());
    }
}
