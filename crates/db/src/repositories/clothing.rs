use std::collections::HashMap;

use sqlx::sqlite::SqliteRow;

use wardrobe_core::domain::category::CategoryId;
use wardrobe_core::domain::clothing::{ClothingItem, ClothingItemId, OwnerId};
use wardrobe_core::lifecycle::DurabilityScorer;

use super::codec::{column, format_date, money, optional_date, optional_timestamp, timestamp};
use super::{ClothingItemRepository, ItemScope, RepositoryError};
use crate::DbPool;

pub(crate) const ITEM_COLUMNS: &str = "id, owner_id, category_id, name, brand, color, material, \
     price, purchase_date, wear_count, durability_score, last_worn_date, notes, is_favorite, \
     is_active, created_at, updated_at";

pub struct SqlClothingItemRepository {
    pool: DbPool,
}

impl SqlClothingItemRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn row_to_item(row: &SqliteRow) -> Result<ClothingItem, RepositoryError> {
    let price: String = column(row, "price")?;
    let wear_count: i64 = column(row, "wear_count")?;
    let created_at: String = column(row, "created_at")?;
    let updated_at: String = column(row, "updated_at")?;

    Ok(ClothingItem {
        id: ClothingItemId(column(row, "id")?),
        owner_id: OwnerId(column(row, "owner_id")?),
        category_id: CategoryId(column(row, "category_id")?),
        name: column(row, "name")?,
        brand: column(row, "brand")?,
        color: column(row, "color")?,
        material: column(row, "material")?,
        price: money(&price)?,
        purchase_date: optional_date(column(row, "purchase_date")?)?,
        wear_count: u32::try_from(wear_count)
            .map_err(|_| RepositoryError::Decode(format!("invalid wear_count {wear_count}")))?,
        durability_score: column(row, "durability_score")?,
        last_worn_date: optional_timestamp(column(row, "last_worn_date")?)?,
        notes: column(row, "notes")?,
        is_favorite: column(row, "is_favorite")?,
        is_active: column(row, "is_active")?,
        created_at: timestamp(&created_at)?,
        updated_at: timestamp(&updated_at)?,
    })
}

#[async_trait::async_trait]
impl ClothingItemRepository for SqlClothingItemRepository {
    async fn find_by_id(
        &self,
        id: &ClothingItemId,
    ) -> Result<Option<ClothingItem>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {ITEM_COLUMNS} FROM clothing_item WHERE id = ?"))
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_item).transpose()
    }

    async fn list_by_owner(
        &self,
        owner_id: &OwnerId,
        scope: ItemScope,
    ) -> Result<Vec<ClothingItem>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM clothing_item
             WHERE owner_id = ? {}
             ORDER BY name ASC, id ASC",
            scope.sql_filter()
        ))
        .bind(&owner_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_item).collect()
    }

    async fn save(&self, item: ClothingItem) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO clothing_item (id, owner_id, category_id, name, brand, color, material,
                                        price, purchase_date, wear_count, durability_score,
                                        last_worn_date, notes, is_favorite, is_active,
                                        created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 category_id = excluded.category_id,
                 name = excluded.name,
                 brand = excluded.brand,
                 color = excluded.color,
                 material = excluded.material,
                 price = excluded.price,
                 purchase_date = excluded.purchase_date,
                 wear_count = excluded.wear_count,
                 durability_score = excluded.durability_score,
                 last_worn_date = excluded.last_worn_date,
                 notes = excluded.notes,
                 is_favorite = excluded.is_favorite,
                 is_active = excluded.is_active,
                 updated_at = excluded.updated_at",
        )
        .bind(&item.id.0)
        .bind(&item.owner_id.0)
        .bind(&item.category_id.0)
        .bind(&item.name)
        .bind(&item.brand)
        .bind(&item.color)
        .bind(&item.material)
        .bind(item.price.to_string())
        .bind(item.purchase_date.map(format_date))
        .bind(i64::from(item.wear_count))
        .bind(item.durability_score)
        .bind(item.last_worn_date.map(|dt| dt.to_rfc3339()))
        .bind(&item.notes)
        .bind(item.is_favorite)
        .bind(item.is_active)
        .bind(item.created_at.to_rfc3339())
        .bind(item.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_details(
        &self,
        changes: &ClothingItem,
        scorer: Option<&DurabilityScorer>,
    ) -> Result<ClothingItem, RepositoryError> {
        let now = changes.updated_at;
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE clothing_item SET
                 category_id = ?, name = ?, brand = ?, color = ?, material = ?, price = ?,
                 purchase_date = ?, notes = ?, is_favorite = ?, updated_at = ?
             WHERE id = ? AND is_active = 1",
        )
        .bind(&changes.category_id.0)
        .bind(&changes.name)
        .bind(&changes.brand)
        .bind(&changes.color)
        .bind(&changes.material)
        .bind(changes.price.to_string())
        .bind(changes.purchase_date.map(format_date))
        .bind(&changes.notes)
        .bind(changes.is_favorite)
        .bind(now.to_rfc3339())
        .bind(&changes.id.0)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(RepositoryError::not_found("clothing item", changes.id.0.clone()));
        }

        let row = sqlx::query(&format!("SELECT {ITEM_COLUMNS} FROM clothing_item WHERE id = ?"))
            .bind(&changes.id.0)
            .fetch_one(&mut *tx)
            .await?;
        let mut item = row_to_item(&row)?;

        if let Some(scorer) = scorer {
            let maintenance_count: i64 = sqlx::query_scalar(
                "SELECT COUNT(1) FROM maintenance_record WHERE clothing_item_id = ?",
            )
            .bind(&changes.id.0)
            .fetch_one(&mut *tx)
            .await?;
            item = scorer.rescore(item, u32::try_from(maintenance_count).unwrap_or(u32::MAX), now);
            sqlx::query("UPDATE clothing_item SET durability_score = ? WHERE id = ?")
                .bind(item.durability_score)
                .bind(&changes.id.0)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(item)
    }

    async fn count_active_by_category(
        &self,
        owner_id: Option<&OwnerId>,
    ) -> Result<HashMap<CategoryId, u64>, RepositoryError> {
        let rows = match owner_id {
            Some(owner_id) => {
                sqlx::query(
                    "SELECT category_id, COUNT(1) AS item_count FROM clothing_item
                     WHERE is_active = 1 AND owner_id = ?
                     GROUP BY category_id",
                )
                .bind(&owner_id.0)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT category_id, COUNT(1) AS item_count FROM clothing_item
                     WHERE is_active = 1
                     GROUP BY category_id",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        let mut counts = HashMap::with_capacity(rows.len());
        for row in &rows {
            let category_id: String = column(row, "category_id")?;
            let item_count: i64 = column(row, "item_count")?;
            counts.insert(CategoryId(category_id), item_count.max(0) as u64);
        }
        Ok(counts)
    }
}
