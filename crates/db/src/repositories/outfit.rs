use sqlx::sqlite::SqliteRow;

use wardrobe_core::domain::clothing::{ClothingItemId, OwnerId};
use wardrobe_core::domain::outfit::{ItemRole, Outfit, OutfitId, OutfitItem, WeatherType};

use super::codec::{column, timestamp};
use super::{OutfitRepository, RepositoryError};
use crate::DbPool;

pub struct SqlOutfitRepository {
    pool: DbPool,
}

impl SqlOutfitRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn load_items(&self, outfit_id: &str) -> Result<Vec<OutfitItem>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT clothing_item_id, role, layer_order FROM outfit_item
             WHERE outfit_id = ? ORDER BY layer_order ASC",
        )
        .bind(outfit_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_outfit_item).collect()
    }
}

fn row_to_outfit_item(row: &SqliteRow) -> Result<OutfitItem, RepositoryError> {
    let role: String = column(row, "role")?;
    let layer_order: i64 = column(row, "layer_order")?;

    Ok(OutfitItem {
        clothing_item_id: ClothingItemId(column(row, "clothing_item_id")?),
        role: role.parse::<ItemRole>().map_err(|e| RepositoryError::Decode(e.to_string()))?,
        layer_order: u32::try_from(layer_order)
            .map_err(|_| RepositoryError::Decode(format!("invalid layer_order {layer_order}")))?,
    })
}

fn row_to_outfit(row: &SqliteRow, items: Vec<OutfitItem>) -> Result<Outfit, RepositoryError> {
    let weather: Option<String> = column(row, "weather")?;
    let rating: Option<i64> = column(row, "rating")?;
    let created_at: String = column(row, "created_at")?;
    let updated_at: String = column(row, "updated_at")?;

    let weather = weather
        .map(|value| {
            value.parse::<WeatherType>().map_err(|e| RepositoryError::Decode(e.to_string()))
        })
        .transpose()?;
    let rating = rating
        .map(|value| {
            u8::try_from(value)
                .map_err(|_| RepositoryError::Decode(format!("invalid rating {value}")))
        })
        .transpose()?;

    Ok(Outfit {
        id: OutfitId(column(row, "id")?),
        owner_id: OwnerId(column(row, "owner_id")?),
        name: column(row, "name")?,
        occasion: column(row, "occasion")?,
        weather,
        items,
        rating,
        created_at: timestamp(&created_at)?,
        updated_at: timestamp(&updated_at)?,
    })
}

#[async_trait::async_trait]
impl OutfitRepository for SqlOutfitRepository {
    async fn find_by_id(&self, id: &OutfitId) -> Result<Option<Outfit>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, owner_id, name, occasion, weather, rating, created_at, updated_at
             FROM outfit WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => {
                let items = self.load_items(&id.0).await?;
                Ok(Some(row_to_outfit(r, items)?))
            }
            None => Ok(None),
        }
    }

    /// Upserts the outfit and replaces its item list in one transaction.
    async fn save(&self, outfit: Outfit) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO outfit (id, owner_id, name, occasion, weather, rating, created_at,
                                 updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 occasion = excluded.occasion,
                 weather = excluded.weather,
                 rating = excluded.rating,
                 updated_at = excluded.updated_at",
        )
        .bind(&outfit.id.0)
        .bind(&outfit.owner_id.0)
        .bind(&outfit.name)
        .bind(&outfit.occasion)
        .bind(outfit.weather.map(|weather| weather.as_str()))
        .bind(outfit.rating.map(i64::from))
        .bind(outfit.created_at.to_rfc3339())
        .bind(outfit.updated_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM outfit_item WHERE outfit_id = ?")
            .bind(&outfit.id.0)
            .execute(&mut *tx)
            .await?;

        for item in &outfit.items {
            sqlx::query(
                "INSERT INTO outfit_item (outfit_id, clothing_item_id, role, layer_order)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(&outfit.id.0)
            .bind(&item.clothing_item_id.0)
            .bind(item.role.as_str())
            .bind(i64::from(item.layer_order))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<Outfit>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, owner_id, name, occasion, weather, rating, created_at, updated_at
             FROM outfit WHERE owner_id = ? ORDER BY created_at DESC, id ASC",
        )
        .bind(&owner_id.0)
        .fetch_all(&self.pool)
        .await?;

        let mut outfits = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: String = column(row, "id")?;
            let items = self.load_items(&id).await?;
            outfits.push(row_to_outfit(row, items)?);
        }
        Ok(outfits)
    }
}
