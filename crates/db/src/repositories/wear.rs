use sqlx::sqlite::SqliteRow;
use tracing::info;

use wardrobe_core::domain::clothing::{ClothingItem, ClothingItemId, OwnerId};
use wardrobe_core::domain::wear::{WearIntensity, WearRecord, WearRecordId};
use wardrobe_core::lifecycle::DurabilityScorer;

use super::clothing::{row_to_item, ITEM_COLUMNS};
use super::codec::{column, timestamp};
use super::{RepositoryError, WearRepository};
use crate::DbPool;

const WEAR_COLUMNS: &str =
    "wear_record.id, wear_record.clothing_item_id, wear_record.wear_date, wear_record.notes, \
     wear_record.duration_hours, wear_record.intensity, wear_record.created_at";

pub struct SqlWearRepository {
    pool: DbPool,
}

impl SqlWearRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_wear(row: &SqliteRow) -> Result<WearRecord, RepositoryError> {
    let wear_date: String = column(row, "wear_date")?;
    let intensity: String = column(row, "intensity")?;
    let created_at: String = column(row, "created_at")?;

    Ok(WearRecord {
        id: WearRecordId(column(row, "id")?),
        clothing_item_id: ClothingItemId(column(row, "clothing_item_id")?),
        wear_date: timestamp(&wear_date)?,
        notes: column(row, "notes")?,
        duration_hours: column(row, "duration_hours")?,
        intensity: intensity
            .parse::<WearIntensity>()
            .map_err(|e| RepositoryError::Decode(e.to_string()))?,
        created_at: timestamp(&created_at)?,
    })
}

#[async_trait::async_trait]
impl WearRepository for SqlWearRepository {
    async fn record_wear(
        &self,
        owner_id: &OwnerId,
        record: WearRecord,
        scorer: &DurabilityScorer,
    ) -> Result<ClothingItem, RepositoryError> {
        let now = record.created_at;
        let mut tx = self.pool.begin().await?;

        // Writing first takes SQLite's write lock, so concurrent wears on the same item queue
        // behind this transaction instead of reading a stale wear count.
        let claimed = sqlx::query(
            "UPDATE clothing_item SET updated_at = ?
             WHERE id = ? AND owner_id = ? AND is_active = 1",
        )
        .bind(now.to_rfc3339())
        .bind(&record.clothing_item_id.0)
        .bind(&owner_id.0)
        .execute(&mut *tx)
        .await?;
        if claimed.rows_affected() == 0 {
            return Err(RepositoryError::not_found("clothing item", &record.clothing_item_id.0));
        }

        let row = sqlx::query(&format!("SELECT {ITEM_COLUMNS} FROM clothing_item WHERE id = ?"))
            .bind(&record.clothing_item_id.0)
            .fetch_one(&mut *tx)
            .await?;
        let item = row_to_item(&row)?;

        let maintenance_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(1) FROM maintenance_record WHERE clothing_item_id = ?",
        )
        .bind(&record.clothing_item_id.0)
        .fetch_one(&mut *tx)
        .await?;

        let maintenance_count = u32::try_from(maintenance_count).unwrap_or(u32::MAX);
        let updated = scorer.record_wear(item, maintenance_count, now);

        sqlx::query(
            "UPDATE clothing_item
             SET wear_count = ?, last_worn_date = ?, durability_score = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(i64::from(updated.wear_count))
        .bind(updated.last_worn_date.map(|dt| dt.to_rfc3339()))
        .bind(updated.durability_score)
        .bind(updated.updated_at.to_rfc3339())
        .bind(&updated.id.0)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO wear_record (id, clothing_item_id, wear_date, notes, duration_hours,
                                      intensity, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id.0)
        .bind(&record.clothing_item_id.0)
        .bind(record.wear_date.to_rfc3339())
        .bind(&record.notes)
        .bind(record.duration_hours)
        .bind(record.intensity.as_str())
        .bind(record.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            event_name = "wardrobe.wear.recorded",
            item_id = %updated.id.0,
            wear_count = updated.wear_count,
            durability_score = updated.durability_score,
            "wear recorded"
        );

        Ok(updated)
    }

    async fn list_for_item(
        &self,
        item_id: &ClothingItemId,
    ) -> Result<Vec<WearRecord>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {WEAR_COLUMNS} FROM wear_record
             WHERE wear_record.clothing_item_id = ?
             ORDER BY wear_record.wear_date DESC, wear_record.id ASC"
        ))
        .bind(&item_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_wear).collect()
    }

    async fn list_for_owner(&self, owner_id: &OwnerId) -> Result<Vec<WearRecord>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {WEAR_COLUMNS} FROM wear_record
             JOIN clothing_item ON clothing_item.id = wear_record.clothing_item_id
             WHERE clothing_item.owner_id = ?
             ORDER BY wear_record.wear_date DESC, wear_record.id ASC"
        ))
        .bind(&owner_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_wear).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;

    use wardrobe_core::domain::category::{Category, CategoryId};
    use wardrobe_core::domain::clothing::{ClothingItem, ClothingItemId, OwnerId};
    use wardrobe_core::domain::wear::{WearIntensity, WearRecord, WearRecordId};
    use wardrobe_core::lifecycle::DurabilityScorer;

    use super::SqlWearRepository;
    use crate::repositories::{
        CategoryRepository, ClothingItemRepository, RepositoryError, SqlCategoryRepository,
        SqlClothingItemRepository, WearRepository,
    };
    use crate::{connect_with_settings, migrations, DbPool};

    async fn setup(max_connections: u32, url: &str) -> DbPool {
        let pool = connect_with_settings(url, max_connections, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        SqlCategoryRepository::new(pool.clone())
            .save(Category::new(CategoryId("cat-tops".to_string()), "上衣", None, 1))
            .await
            .expect("category");
        SqlClothingItemRepository::new(pool.clone()).save(shirt()).await.expect("item");
        pool
    }

    fn shirt() -> ClothingItem {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().expect("timestamp");
        ClothingItem {
            id: ClothingItemId("item-1".to_string()),
            owner_id: OwnerId("user-1".to_string()),
            category_id: CategoryId("cat-tops".to_string()),
            name: "oxford shirt".to_string(),
            brand: "Muji".to_string(),
            color: "white".to_string(),
            material: "棉".to_string(),
            price: Decimal::new(29900, 2),
            purchase_date: None,
            wear_count: 0,
            durability_score: 100.0,
            last_worn_date: None,
            notes: None,
            is_favorite: false,
            is_active: true,
            created_at: created,
            updated_at: created,
        }
    }

    fn wear(id: &str, item: &str, at: chrono::DateTime<Utc>) -> WearRecord {
        WearRecord {
            id: WearRecordId(id.to_string()),
            clothing_item_id: ClothingItemId(item.to_string()),
            wear_date: at,
            notes: None,
            duration_hours: Some(9.0),
            intensity: WearIntensity::Heavy,
            created_at: at,
        }
    }

    #[tokio::test]
    async fn record_wear_updates_item_and_persists_record() {
        let pool = setup(1, "sqlite::memory:").await;
        let repo = SqlWearRepository::new(pool.clone());
        let owner = OwnerId("user-1".to_string());
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).single().expect("timestamp");

        let updated = repo
            .record_wear(&owner, wear("w-1", "item-1", at), &DurabilityScorer::default())
            .await
            .expect("record wear");

        assert_eq!(updated.wear_count, 1);
        assert_eq!(updated.last_worn_date, Some(at));
        assert_eq!(updated.durability_score, 99.0);

        let stored = SqlClothingItemRepository::new(pool)
            .find_by_id(&updated.id)
            .await
            .expect("find")
            .expect("item");
        assert_eq!(stored, updated);

        let records = repo.list_for_item(&updated.id).await.expect("list");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].intensity, WearIntensity::Heavy);
        assert_eq!(records[0].duration_hours, Some(9.0));
    }

    #[tokio::test]
    async fn record_wear_rejects_foreign_or_missing_items_without_writing() {
        let pool = setup(1, "sqlite::memory:").await;
        let repo = SqlWearRepository::new(pool.clone());
        let scorer = DurabilityScorer::default();

        let stranger = OwnerId("user-2".to_string());
        let result = repo.record_wear(&stranger, wear("w-1", "item-1", Utc::now()), &scorer).await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));

        let owner = OwnerId("user-1".to_string());
        let result = repo.record_wear(&owner, wear("w-2", "ghost", Utc::now()), &scorer).await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));

        let item = SqlClothingItemRepository::new(pool)
            .find_by_id(&ClothingItemId("item-1".to_string()))
            .await
            .expect("find")
            .expect("item");
        assert_eq!(item.wear_count, 0);
        assert!(repo.list_for_owner(&owner).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn duplicate_record_id_rolls_back_item_update() {
        let pool = setup(1, "sqlite::memory:").await;
        let repo = SqlWearRepository::new(pool.clone());
        let owner = OwnerId("user-1".to_string());
        let scorer = DurabilityScorer::default();
        let at = Utc::now();

        repo.record_wear(&owner, wear("w-1", "item-1", at), &scorer).await.expect("first");
        let second = repo.record_wear(&owner, wear("w-1", "item-1", at), &scorer).await;
        assert!(second.is_err());

        let item = SqlClothingItemRepository::new(pool)
            .find_by_id(&ClothingItemId("item-1".to_string()))
            .await
            .expect("find")
            .expect("item");
        assert_eq!(item.wear_count, 1);
    }

    #[tokio::test]
    async fn concurrent_wears_are_serialized() {
        let dir = tempfile::tempdir().expect("tempdir");
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("wear.db").display());
        let pool = setup(4, &url).await;
        let repo = Arc::new(SqlWearRepository::new(pool.clone()));
        let scorer = Arc::new(DurabilityScorer::default());
        let start = Utc::now();

        let mut handles = Vec::new();
        for n in 0..8 {
            let repo = Arc::clone(&repo);
            let scorer = Arc::clone(&scorer);
            handles.push(tokio::spawn(async move {
                let at = start + Duration::minutes(n);
                repo.record_wear(
                    &OwnerId("user-1".to_string()),
                    wear(&format!("w-{n}"), "item-1", at),
                    &scorer,
                )
                .await
            }));
        }
        for handle in handles {
            handle.await.expect("join").expect("record wear");
        }

        let item = SqlClothingItemRepository::new(pool)
            .find_by_id(&ClothingItemId("item-1".to_string()))
            .await
            .expect("find")
            .expect("item");
        assert_eq!(item.wear_count, 8);
        assert_eq!(
            item.durability_score,
            DurabilityScorer::default().compute_durability(&item, 0, start.date_naive())
        );
    }
}
