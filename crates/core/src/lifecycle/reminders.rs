use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::maintenance::{MaintenanceRecord, MaintenanceReminder, ReminderPriority};

/// Priority of a reminder relative to `today`. Overdue records escalate with age; upcoming
/// records escalate as the due date approaches.
pub fn reminder_priority(next_due: NaiveDate, today: NaiveDate) -> (i64, ReminderPriority) {
    if next_due < today {
        let days_overdue = (today - next_due).num_days();
        let priority = match days_overdue {
            d if d > 30 => ReminderPriority::Urgent,
            d if d > 14 => ReminderPriority::High,
            d if d > 7 => ReminderPriority::Medium,
            _ => ReminderPriority::Low,
        };
        return (days_overdue, priority);
    }

    let days_until = (next_due - today).num_days();
    let priority = match days_until {
        d if d <= 3 => ReminderPriority::High,
        d if d <= 7 => ReminderPriority::Medium,
        _ => ReminderPriority::Low,
    };
    (0, priority)
}

pub fn build_reminder(
    record: &MaintenanceRecord,
    item_name: &str,
    today: NaiveDate,
) -> MaintenanceReminder {
    let (days_overdue, priority) = reminder_priority(record.next_maintenance_date, today);
    MaintenanceReminder {
        record_id: record.id.clone(),
        clothing_item_id: record.clothing_item_id.clone(),
        clothing_item_name: item_name.to_string(),
        maintenance_type: record.maintenance_type,
        next_maintenance_date: record.next_maintenance_date,
        days_overdue,
        priority,
    }
}

pub fn is_overdue(record: &MaintenanceRecord, today: NaiveDate) -> bool {
    record.next_maintenance_date < today
}

/// Due today or within the next `days` days.
pub fn is_upcoming(record: &MaintenanceRecord, today: NaiveDate, days: u32) -> bool {
    let until = (record.next_maintenance_date - today).num_days();
    (0..=i64::from(days)).contains(&until)
}

/// Only the latest record per item and type drives reminders; older ones are superseded.
pub fn latest_per_item_and_type(records: &[MaintenanceRecord]) -> Vec<&MaintenanceRecord> {
    let mut latest: BTreeMap<(&str, &str), &MaintenanceRecord> = BTreeMap::new();
    for record in records {
        let key = (record.clothing_item_id.0.as_str(), record.maintenance_type.as_str());
        match latest.get(&key) {
            Some(current) if current.maintenance_date >= record.maintenance_date => {}
            _ => {
                latest.insert(key, record);
            }
        }
    }
    let mut selected: Vec<&MaintenanceRecord> = latest.into_values().collect();
    selected.sort_by(|a, b| {
        a.next_maintenance_date.cmp(&b.next_maintenance_date).then_with(|| a.id.0.cmp(&b.id.0))
    });
    selected
}

pub fn cost_by_type(records: &[MaintenanceRecord]) -> BTreeMap<String, Decimal> {
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    for record in records {
        *totals.entry(record.maintenance_type.as_str().to_string()).or_insert(Decimal::ZERO) +=
            record.cost;
    }
    totals
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    use super::{cost_by_type, is_upcoming, latest_per_item_and_type, reminder_priority};
    use crate::domain::clothing::ClothingItemId;
    use crate::domain::maintenance::{
        MaintenanceRecord, MaintenanceRecordId, MaintenanceType, ReminderPriority,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn record(
        id: &str,
        item: &str,
        kind: MaintenanceType,
        on: NaiveDate,
        next: NaiveDate,
        cost: Decimal,
    ) -> MaintenanceRecord {
        let now = Utc::now();
        MaintenanceRecord {
            id: MaintenanceRecordId(id.to_string()),
            clothing_item_id: ClothingItemId(item.to_string()),
            maintenance_type: kind,
            cost,
            maintenance_date: on,
            effectiveness_score: None,
            next_maintenance_date: next,
            service_provider: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn overdue_priority_escalates_with_age() {
        let today = date(2024, 3, 1);
        assert_eq!(reminder_priority(date(2024, 1, 1), today), (60, ReminderPriority::Urgent));
        assert_eq!(reminder_priority(date(2024, 2, 10), today), (20, ReminderPriority::High));
        assert_eq!(reminder_priority(date(2024, 2, 20), today), (10, ReminderPriority::Medium));
        assert_eq!(reminder_priority(date(2024, 2, 25), today), (5, ReminderPriority::Low));
    }

    #[test]
    fn upcoming_priority_escalates_near_due_date() {
        let today = date(2024, 3, 1);
        assert_eq!(reminder_priority(date(2024, 3, 1), today), (0, ReminderPriority::High));
        assert_eq!(reminder_priority(date(2024, 3, 4), today), (0, ReminderPriority::High));
        assert_eq!(reminder_priority(date(2024, 3, 8), today), (0, ReminderPriority::Medium));
        assert_eq!(reminder_priority(date(2024, 4, 1), today), (0, ReminderPriority::Low));
    }

    #[test]
    fn upcoming_window_is_inclusive() {
        let today = date(2024, 3, 1);
        let due = record(
            "m-1",
            "item-1",
            MaintenanceType::Washing,
            date(2024, 2, 7),
            date(2024, 3, 8),
            Decimal::ZERO,
        );
        assert!(is_upcoming(&due, today, 7));
        assert!(!is_upcoming(&due, today, 6));
    }

    #[test]
    fn newer_record_supersedes_older_one_of_same_type() {
        let washing = MaintenanceType::Washing;
        let zero = Decimal::ZERO;
        let records = vec![
            record("old", "item-1", washing, date(2024, 1, 1), date(2024, 1, 31), zero),
            record("new", "item-1", washing, date(2024, 2, 1), date(2024, 3, 2), zero),
            record("fix", "item-1", MaintenanceType::Repair, date(2024, 1, 1), date(2024, 6, 29), zero),
        ];

        let latest: Vec<&str> =
            latest_per_item_and_type(&records).iter().map(|r| r.id.0.as_str()).collect();
        assert_eq!(latest, vec!["new", "fix"]);
    }

    #[test]
    fn costs_are_summed_per_type() {
        let on = date(2024, 1, 1);
        let records = vec![
            record("a", "item-1", MaintenanceType::DryCleaning, on, on, Decimal::new(4500, 2)),
            record("b", "item-2", MaintenanceType::DryCleaning, on, on, Decimal::new(5550, 2)),
            record("c", "item-2", MaintenanceType::Repair, on, on, Decimal::new(2000, 2)),
        ];

        let totals = cost_by_type(&records);
        assert_eq!(totals.get("dry_cleaning"), Some(&Decimal::new(10050, 2)));
        assert_eq!(totals.get("repair"), Some(&Decimal::new(2000, 2)));
        assert_eq!(totals.len(), 2);
    }
}
