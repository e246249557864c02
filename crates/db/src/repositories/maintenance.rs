use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Sqlite};
use tracing::info;

use wardrobe_core::domain::clothing::{ClothingItem, ClothingItemId, OwnerId};
use wardrobe_core::domain::maintenance::{MaintenanceRecord, MaintenanceRecordId, MaintenanceType};
use wardrobe_core::lifecycle::DurabilityScorer;

use super::clothing::{row_to_item, ITEM_COLUMNS};
use super::codec::{column, date, format_date, money, timestamp};
use super::{MaintenanceRepository, RepositoryError};
use crate::DbPool;

const MAINTENANCE_COLUMNS: &str = "maintenance_record.id, maintenance_record.clothing_item_id, \
     maintenance_record.maintenance_type, maintenance_record.cost, \
     maintenance_record.maintenance_date, maintenance_record.effectiveness_score, \
     maintenance_record.next_maintenance_date, maintenance_record.service_provider, \
     maintenance_record.notes, maintenance_record.created_at, maintenance_record.updated_at";

pub struct SqlMaintenanceRepository {
    pool: DbPool,
}

impl SqlMaintenanceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_record(row: &SqliteRow) -> Result<MaintenanceRecord, RepositoryError> {
    let maintenance_type: String = column(row, "maintenance_type")?;
    let cost: String = column(row, "cost")?;
    let maintenance_date: String = column(row, "maintenance_date")?;
    let effectiveness_score: Option<i64> = column(row, "effectiveness_score")?;
    let next_maintenance_date: String = column(row, "next_maintenance_date")?;
    let created_at: String = column(row, "created_at")?;
    let updated_at: String = column(row, "updated_at")?;

    let effectiveness_score = effectiveness_score
        .map(|score| {
            u8::try_from(score)
                .map_err(|_| RepositoryError::Decode(format!("invalid effectiveness {score}")))
        })
        .transpose()?;

    Ok(MaintenanceRecord {
        id: MaintenanceRecordId(column(row, "id")?),
        clothing_item_id: ClothingItemId(column(row, "clothing_item_id")?),
        maintenance_type: MaintenanceType::parse_lenient(&maintenance_type),
        cost: money(&cost)?,
        maintenance_date: date(&maintenance_date)?,
        effectiveness_score,
        next_maintenance_date: date(&next_maintenance_date)?,
        service_provider: column(row, "service_provider")?,
        notes: column(row, "notes")?,
        created_at: timestamp(&created_at)?,
        updated_at: timestamp(&updated_at)?,
    })
}

async fn upsert_record<'e, E>(executor: E, record: &MaintenanceRecord) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO maintenance_record (id, clothing_item_id, maintenance_type, cost,
                                         maintenance_date, effectiveness_score,
                                         next_maintenance_date, service_provider, notes,
                                         created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
             maintenance_type = excluded.maintenance_type,
             cost = excluded.cost,
             maintenance_date = excluded.maintenance_date,
             effectiveness_score = excluded.effectiveness_score,
             next_maintenance_date = excluded.next_maintenance_date,
             service_provider = excluded.service_provider,
             notes = excluded.notes,
             updated_at = excluded.updated_at",
    )
    .bind(&record.id.0)
    .bind(&record.clothing_item_id.0)
    .bind(record.maintenance_type.as_str())
    .bind(record.cost.to_string())
    .bind(format_date(record.maintenance_date))
    .bind(record.effectiveness_score.map(i64::from))
    .bind(format_date(record.next_maintenance_date))
    .bind(&record.service_provider)
    .bind(&record.notes)
    .bind(record.created_at.to_rfc3339())
    .bind(record.updated_at.to_rfc3339())
    .execute(executor)
    .await?;
    Ok(())
}

#[async_trait::async_trait]
impl MaintenanceRepository for SqlMaintenanceRepository {
    async fn find_by_id(
        &self,
        id: &MaintenanceRecordId,
    ) -> Result<Option<MaintenanceRecord>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {MAINTENANCE_COLUMNS} FROM maintenance_record WHERE maintenance_record.id = ?"
        ))
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn save_and_rescore(
        &self,
        record: MaintenanceRecord,
        scorer: &DurabilityScorer,
    ) -> Result<ClothingItem, RepositoryError> {
        let now = record.updated_at;
        let item_id = record.clothing_item_id.0.clone();
        let mut tx = self.pool.begin().await?;

        let claimed =
            sqlx::query("UPDATE clothing_item SET updated_at = ? WHERE id = ? AND is_active = 1")
                .bind(now.to_rfc3339())
                .bind(&item_id)
                .execute(&mut *tx)
                .await?;
        if claimed.rows_affected() == 0 {
            return Err(RepositoryError::not_found("clothing item", item_id));
        }

        upsert_record(&mut *tx, &record).await?;

        let row = sqlx::query(&format!("SELECT {ITEM_COLUMNS} FROM clothing_item WHERE id = ?"))
            .bind(&item_id)
            .fetch_one(&mut *tx)
            .await?;
        let item = row_to_item(&row)?;
        let maintenance_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(1) FROM maintenance_record WHERE clothing_item_id = ?",
        )
        .bind(&item_id)
        .fetch_one(&mut *tx)
        .await?;

        let rescored =
            scorer.rescore(item, u32::try_from(maintenance_count).unwrap_or(u32::MAX), now);
        sqlx::query("UPDATE clothing_item SET durability_score = ?, updated_at = ? WHERE id = ?")
            .bind(rescored.durability_score)
            .bind(rescored.updated_at.to_rfc3339())
            .bind(&item_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            event_name = "wardrobe.maintenance.recorded",
            item_id = %item_id,
            record_id = %record.id.0,
            maintenance_type = record.maintenance_type.as_str(),
            next_maintenance_date = %record.next_maintenance_date,
            durability_score = rescored.durability_score,
            "maintenance recorded"
        );

        Ok(rescored)
    }

    async fn list_for_item(
        &self,
        item_id: &ClothingItemId,
    ) -> Result<Vec<MaintenanceRecord>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {MAINTENANCE_COLUMNS} FROM maintenance_record
             WHERE maintenance_record.clothing_item_id = ?
             ORDER BY maintenance_record.maintenance_date DESC, maintenance_record.id ASC"
        ))
        .bind(&item_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_record).collect()
    }

    async fn list_for_owner(
        &self,
        owner_id: &OwnerId,
    ) -> Result<Vec<MaintenanceRecord>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {MAINTENANCE_COLUMNS} FROM maintenance_record
             JOIN clothing_item ON clothing_item.id = maintenance_record.clothing_item_id
             WHERE clothing_item.owner_id = ? AND clothing_item.is_active = 1
             ORDER BY maintenance_record.next_maintenance_date ASC, maintenance_record.id ASC"
        ))
        .bind(&owner_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_record).collect()
    }

    async fn count_for_item(&self, item_id: &ClothingItemId) -> Result<u32, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(1) FROM maintenance_record WHERE clothing_item_id = ?",
        )
        .bind(&item_id.0)
        .fetch_one(&self.pool)
        .await?;

        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    use wardrobe_core::domain::category::{Category, CategoryId};
    use wardrobe_core::domain::clothing::{ClothingItem, ClothingItemId, OwnerId};
    use wardrobe_core::domain::maintenance::{
        MaintenanceRecord, MaintenanceRecordId, MaintenanceType,
    };
    use wardrobe_core::lifecycle::{DurabilityScorer, DurabilityTables};

    use super::{upsert_record, SqlMaintenanceRepository};
    use crate::repositories::{
        CategoryRepository, ClothingItemRepository, MaintenanceRepository, RepositoryError,
        SqlCategoryRepository, SqlClothingItemRepository,
    };
    use crate::{connect_with_settings, migrations, DbPool};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    async fn setup() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        SqlCategoryRepository::new(pool.clone())
            .save(Category::new(CategoryId("cat-outerwear".to_string()), "外套", None, 1))
            .await
            .expect("category");
        let items = SqlClothingItemRepository::new(pool.clone());
        for (id, owner, active) in [("coat", "user-1", true), ("old", "user-1", false)] {
            let now = Utc::now();
            items
                .save(ClothingItem {
                    id: ClothingItemId(id.to_string()),
                    owner_id: OwnerId(owner.to_string()),
                    category_id: CategoryId("cat-outerwear".to_string()),
                    name: id.to_string(),
                    brand: String::new(),
                    color: String::new(),
                    material: "羊毛".to_string(),
                    price: Decimal::new(120000, 2),
                    purchase_date: None,
                    wear_count: 0,
                    durability_score: 100.0,
                    last_worn_date: None,
                    notes: None,
                    is_favorite: false,
                    is_active: active,
                    created_at: now,
                    updated_at: now,
                })
                .await
                .expect("item");
        }
        pool
    }

    fn record(id: &str, item: &str, kind: MaintenanceType, on: NaiveDate) -> MaintenanceRecord {
        let now = Utc::now();
        DurabilityScorer::default().schedule(MaintenanceRecord {
            id: MaintenanceRecordId(id.to_string()),
            clothing_item_id: ClothingItemId(item.to_string()),
            maintenance_type: kind,
            cost: Decimal::new(4550, 2),
            maintenance_date: on,
            effectiveness_score: Some(8),
            next_maintenance_date: on,
            service_provider: Some("corner cleaners".to_string()),
            notes: None,
            created_at: now,
            updated_at: now,
        })
    }

    async fn insert(pool: &DbPool, record: MaintenanceRecord) {
        upsert_record(pool, &record).await.expect("insert maintenance record");
    }

    #[tokio::test]
    async fn insert_and_find_round_trip() {
        let pool = setup().await;
        let repo = SqlMaintenanceRepository::new(pool.clone());
        let cleaning = record("m-1", "coat", MaintenanceType::DryCleaning, date(2024, 1, 1));

        insert(&pool, cleaning.clone()).await;
        let found = repo.find_by_id(&cleaning.id).await.expect("find").expect("record");

        assert_eq!(found, cleaning);
        assert_eq!(found.next_maintenance_date, date(2024, 3, 31));
    }

    #[tokio::test]
    async fn update_overwrites_schedule_and_counts_per_item() {
        let pool = setup().await;
        let repo = SqlMaintenanceRepository::new(pool.clone());
        let coat = ClothingItemId("coat".to_string());
        insert(&pool, record("m-1", "coat", MaintenanceType::Washing, date(2024, 1, 1))).await;
        insert(&pool, record("m-2", "coat", MaintenanceType::Repair, date(2024, 2, 1))).await;

        let edited = record("m-1", "coat", MaintenanceType::Waterproof, date(2024, 1, 1));
        repo.save_and_rescore(edited, &DurabilityScorer::default()).await.expect("update");

        let found = repo
            .find_by_id(&MaintenanceRecordId("m-1".to_string()))
            .await
            .expect("find")
            .expect("record");
        assert_eq!(found.maintenance_type, MaintenanceType::Waterproof);
        assert_eq!(found.next_maintenance_date, date(2024, 12, 31));
        assert_eq!(repo.count_for_item(&coat).await.expect("count"), 2);
        assert_eq!(repo.list_for_item(&coat).await.expect("list")[0].id.0, "m-2");
    }

    #[tokio::test]
    async fn save_and_rescore_updates_score_but_keeps_wear_state() {
        let pool = setup().await;
        let repo = SqlMaintenanceRepository::new(pool.clone());
        let items = SqlClothingItemRepository::new(pool);
        let coat_id = ClothingItemId("coat".to_string());
        let mut coat = items.find_by_id(&coat_id).await.expect("find").expect("coat");
        coat.wear_count = 20;
        items.save(coat).await.expect("save worn coat");

        let bonus = DurabilityScorer::new(DurabilityTables {
            maintenance_bonus_per_event: 2.0,
            ..DurabilityTables::default()
        });
        let repair = record("m-1", "coat", MaintenanceType::Repair, date(2024, 1, 1));
        let rescored = repo.save_and_rescore(repair, &bonus).await.expect("save and rescore");

        // (100 - 20 + 2) * 1.1 for wool
        assert_eq!(rescored.durability_score, 90.2);
        let stored = items.find_by_id(&coat_id).await.expect("find").expect("coat");
        assert_eq!(stored.wear_count, 20);
        assert_eq!(stored.durability_score, 90.2);
        assert_eq!(repo.count_for_item(&coat_id).await.expect("count"), 1);
    }

    #[tokio::test]
    async fn save_and_rescore_rejects_inactive_items_without_writing() {
        let repo = SqlMaintenanceRepository::new(setup().await);
        let result = repo
            .save_and_rescore(
                record("m-1", "old", MaintenanceType::Washing, date(2024, 1, 1)),
                &DurabilityScorer::default(),
            )
            .await;

        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
        assert!(repo
            .find_by_id(&MaintenanceRecordId("m-1".to_string()))
            .await
            .expect("find")
            .is_none());
    }

    #[tokio::test]
    async fn owner_listing_skips_inactive_items() {
        let pool = setup().await;
        let repo = SqlMaintenanceRepository::new(pool.clone());
        insert(&pool, record("m-1", "coat", MaintenanceType::Washing, date(2024, 1, 1))).await;
        insert(&pool, record("m-2", "old", MaintenanceType::Washing, date(2024, 1, 1))).await;

        let listed = repo.list_for_owner(&OwnerId("user-1".to_string())).await.expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].clothing_item_id.0, "coat");
    }

    #[tokio::test]
    async fn unknown_stored_type_decodes_as_other() {
        let pool = setup().await;
        let repo = SqlMaintenanceRepository::new(pool.clone());
        insert(&pool, record("m-1", "coat", MaintenanceType::Washing, date(2024, 1, 1))).await;
        sqlx::query("UPDATE maintenance_record SET maintenance_type = 'steam' WHERE id = 'm-1'")
            .execute(&pool)
            .await
            .expect("corrupt type");

        let found = repo
            .find_by_id(&MaintenanceRecordId("m-1".to_string()))
            .await
            .expect("find")
            .expect("record");
        assert_eq!(found.maintenance_type, MaintenanceType::Other);
    }
}
