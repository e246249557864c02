use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::domain::clothing::ClothingItem;
use crate::domain::maintenance::{MaintenanceRecord, MaintenanceType};
use crate::domain::wear::WearRecord;
use crate::lifecycle::tables::DurabilityTables;

pub const MAX_DURABILITY: f64 = 100.0;
pub const MIN_DURABILITY: f64 = 0.0;

const DAYS_PER_YEAR: f64 = 365.0;
const LONG_WEAR_HOURS: f64 = 8.0;
const SHORT_WEAR_HOURS: f64 = 4.0;

/// Pure durability and maintenance calculations over a set of lookup tables.
#[derive(Clone, Debug, Default)]
pub struct DurabilityScorer {
    tables: DurabilityTables,
}

impl DurabilityScorer {
    pub fn new(tables: DurabilityTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &DurabilityTables {
        &self.tables
    }

    /// Scores an item in `[0, 100]` as of `as_of`. Missing purchase dates, unknown materials
    /// and unknown categories fall back to their defaults.
    pub fn compute_durability(
        &self,
        item: &ClothingItem,
        maintenance_count: u32,
        as_of: NaiveDate,
    ) -> f64 {
        let wear_damage = f64::from(item.wear_count) * self.tables.wear_rate(&item.category_id);
        let time_damage = item
            .purchase_date
            .map(|purchased| (as_of - purchased).num_days().max(0) as f64 / DAYS_PER_YEAR)
            .map(|years| years * self.tables.time_damage_per_year.max(0.0))
            .unwrap_or(0.0);
        let maintenance_bonus =
            f64::from(maintenance_count) * self.tables.maintenance_bonus_per_event.max(0.0);
        let material_factor = self.tables.material_factor(&item.material);

        let raw = (MAX_DURABILITY - wear_damage - time_damage + maintenance_bonus) * material_factor;
        if raw.is_nan() {
            return MIN_DURABILITY;
        }
        round2(raw).clamp(MIN_DURABILITY, MAX_DURABILITY)
    }

    /// Applies one wear to the item. The score is computed from the incremented item, so the
    /// returned value never pairs a new wear count with a stale score.
    pub fn record_wear(
        &self,
        mut item: ClothingItem,
        maintenance_count: u32,
        now: DateTime<Utc>,
    ) -> ClothingItem {
        item.wear_count = item.wear_count.saturating_add(1);
        item.last_worn_date = Some(now);
        item.durability_score = self.compute_durability(&item, maintenance_count, now.date_naive());
        item.updated_at = now;
        item
    }

    /// Recomputes the score without touching wear state, e.g. after maintenance changes.
    pub fn rescore(
        &self,
        mut item: ClothingItem,
        maintenance_count: u32,
        now: DateTime<Utc>,
    ) -> ClothingItem {
        item.durability_score = self.compute_durability(&item, maintenance_count, now.date_naive());
        item.updated_at = now;
        item
    }

    pub fn next_maintenance_date(
        &self,
        maintenance_type: MaintenanceType,
        performed_on: NaiveDate,
    ) -> NaiveDate {
        let offset = self.tables.maintenance_offset_days(maintenance_type);
        performed_on.checked_add_days(Days::new(offset)).unwrap_or(performed_on)
    }

    /// Refreshes the derived due date after a record was created or edited.
    pub fn schedule(&self, mut record: MaintenanceRecord) -> MaintenanceRecord {
        record.next_maintenance_date =
            self.next_maintenance_date(record.maintenance_type, record.maintenance_date);
        record
    }

    /// Price divided by wears, or the full price while the item has never been worn.
    pub fn cost_per_wear(&self, item: &ClothingItem) -> Decimal {
        if item.wear_count == 0 {
            return item.price;
        }
        (item.price / Decimal::from(item.wear_count)).round_dp(2)
    }

    /// Informational damage estimate for a single wear.
    pub fn wear_damage(&self, record: &WearRecord) -> f64 {
        let duration_factor = match record.duration_hours {
            Some(hours) if hours > LONG_WEAR_HOURS => 1.2,
            Some(hours) if hours < SHORT_WEAR_HOURS => 0.8,
            _ => 1.0,
        };
        round2(record.intensity.damage_factor() * duration_factor)
    }

    pub fn maintenance_effect(&self, record: &MaintenanceRecord) -> f64 {
        self.tables.maintenance_effect(record.maintenance_type, record.effectiveness_score)
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::DurabilityScorer;
    use crate::domain::category::CategoryId;
    use crate::domain::clothing::{ClothingItem, ClothingItemId, OwnerId};
    use crate::domain::maintenance::{MaintenanceRecord, MaintenanceRecordId, MaintenanceType};
    use crate::domain::wear::{WearIntensity, WearRecord, WearRecordId};
    use crate::lifecycle::tables::DurabilityTables;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn item(material: &str, wear_count: u32, purchase_date: Option<NaiveDate>) -> ClothingItem {
        let now = Utc::now();
        ClothingItem {
            id: ClothingItemId("item-1".to_string()),
            owner_id: OwnerId("user-1".to_string()),
            category_id: CategoryId("cat-tops".to_string()),
            name: "oxford shirt".to_string(),
            brand: "Muji".to_string(),
            color: "white".to_string(),
            material: material.to_string(),
            price: Decimal::new(29900, 2),
            purchase_date,
            wear_count,
            durability_score: 100.0,
            last_worn_date: None,
            notes: None,
            is_favorite: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn maintenance(kind: MaintenanceType, on: NaiveDate) -> MaintenanceRecord {
        let now = Utc::now();
        MaintenanceRecord {
            id: MaintenanceRecordId("m-1".to_string()),
            clothing_item_id: ClothingItemId("item-1".to_string()),
            maintenance_type: kind,
            cost: Decimal::ZERO,
            maintenance_date: on,
            effectiveness_score: None,
            next_maintenance_date: on,
            service_provider: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn brand_new_item_scores_full_marks() {
        let scorer = DurabilityScorer::default();
        assert_eq!(scorer.compute_durability(&item("棉", 0, None), 0, date(2024, 1, 1)), 100.0);
    }

    #[test]
    fn wear_and_age_reduce_score_before_material_factor() {
        let scorer = DurabilityScorer::default();
        // 10 wears and exactly one year: (100 - 10 - 5) * 0.9
        let worn = item("聚酯纤维", 10, Some(date(2023, 1, 1)));
        assert_eq!(scorer.compute_durability(&worn, 0, date(2024, 1, 1)), 76.5);
    }

    #[test]
    fn material_bonus_never_exceeds_hundred() {
        let scorer = DurabilityScorer::default();
        let leather = item("真皮", 2, None);
        assert_eq!(scorer.compute_durability(&leather, 0, date(2024, 1, 1)), 100.0);
    }

    #[test]
    fn heavy_wear_is_clamped_at_zero() {
        let scorer = DurabilityScorer::default();
        let shredded = item("丝绸", 500, Some(date(2000, 1, 1)));
        assert_eq!(scorer.compute_durability(&shredded, 0, date(2024, 1, 1)), 0.0);
    }

    #[test]
    fn future_purchase_date_does_not_add_durability() {
        let scorer = DurabilityScorer::default();
        let preorder = item("棉", 0, Some(date(2030, 1, 1)));
        assert_eq!(scorer.compute_durability(&preorder, 0, date(2024, 1, 1)), 100.0);
    }

    #[test]
    fn score_is_monotonic_in_wear_count() {
        let scorer = DurabilityScorer::default();
        let as_of = date(2024, 6, 1);
        for material in ["真皮", "丝绸", "棉", "mystery"] {
            let mut previous = f64::MAX;
            for wears in 0..200 {
                let worn = item(material, wears, Some(date(2022, 3, 4)));
                let score = scorer.compute_durability(&worn, 0, as_of);
                assert!((0.0..=100.0).contains(&score));
                assert!(score <= previous, "{material} at {wears} wears went up");
                previous = score;
            }
        }
    }

    #[test]
    fn category_rate_comes_from_injected_tables() {
        let tables =
            DurabilityTables::default().with_wear_rate(CategoryId("cat-tops".to_string()), 3.0);
        let scorer = DurabilityScorer::new(tables);
        assert_eq!(scorer.compute_durability(&item("棉", 10, None), 0, date(2024, 1, 1)), 70.0);
    }

    #[test]
    fn record_wear_scores_the_incremented_item() {
        let scorer = DurabilityScorer::default();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).single().expect("timestamp");
        let before = item("棉", 4, None);

        let after = scorer.record_wear(before, 0, now);

        assert_eq!(after.wear_count, 5);
        assert_eq!(after.last_worn_date, Some(now));
        assert_eq!(after.durability_score, scorer.compute_durability(&after, 0, now.date_naive()));
        assert_eq!(after.durability_score, 95.0);
    }

    #[test]
    fn maintenance_due_dates_follow_offset_table() {
        let scorer = DurabilityScorer::default();
        let on = date(2024, 1, 1);
        assert_eq!(scorer.next_maintenance_date(MaintenanceType::Washing, on), date(2024, 1, 31));
        assert_eq!(scorer.next_maintenance_date(MaintenanceType::Repair, on), date(2024, 6, 29));
        assert_eq!(scorer.next_maintenance_date(MaintenanceType::Other, on), date(2024, 3, 31));
    }

    #[test]
    fn schedule_recomputes_after_edit() {
        let scorer = DurabilityScorer::default();
        let mut record = scorer.schedule(maintenance(MaintenanceType::Washing, date(2024, 1, 1)));
        assert_eq!(record.next_maintenance_date, date(2024, 1, 31));

        record.maintenance_type = MaintenanceType::Waterproof;
        let record = scorer.schedule(record);
        assert_eq!(record.next_maintenance_date, date(2024, 12, 31));
    }

    #[test]
    fn cost_per_wear_never_divides_by_zero() {
        let scorer = DurabilityScorer::default();
        assert_eq!(scorer.cost_per_wear(&item("棉", 0, None)), Decimal::new(29900, 2));
        assert_eq!(scorer.cost_per_wear(&item("棉", 3, None)), Decimal::new(9967, 2));
    }

    #[test]
    fn wear_damage_uses_intensity_and_duration() {
        let scorer = DurabilityScorer::default();
        let mut record = WearRecord {
            id: WearRecordId("w-1".to_string()),
            clothing_item_id: ClothingItemId("item-1".to_string()),
            wear_date: Utc::now(),
            notes: None,
            duration_hours: None,
            intensity: WearIntensity::Normal,
            created_at: Utc::now(),
        };
        assert_eq!(scorer.wear_damage(&record), 1.0);

        record.intensity = WearIntensity::Heavy;
        record.duration_hours = Some(10.0);
        assert_eq!(scorer.wear_damage(&record), 2.4);

        record.intensity = WearIntensity::Light;
        record.duration_hours = Some(2.0);
        assert_eq!(scorer.wear_damage(&record), 0.4);
    }
}
