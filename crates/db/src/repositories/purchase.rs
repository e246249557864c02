use sqlx::sqlite::SqliteRow;

use wardrobe_core::domain::clothing::{ClothingItemId, OwnerId};
use wardrobe_core::domain::purchase::{PurchaseRecord, PurchaseRecordId};

use super::codec::{column, date, format_date, money, optional_date, timestamp};
use super::{PurchaseRepository, RepositoryError};
use crate::DbPool;

const PURCHASE_COLUMNS: &str = "purchase_record.id, purchase_record.clothing_item_id, \
     purchase_record.purchase_price, purchase_record.original_price, \
     purchase_record.discount_percent, purchase_record.store_name, purchase_record.online_store, \
     purchase_record.order_number, purchase_record.payment_method, purchase_record.currency, \
     purchase_record.purchase_date, purchase_record.warranty_months, \
     purchase_record.warranty_expiry, purchase_record.notes, purchase_record.created_at, \
     purchase_record.updated_at";

pub struct SqlPurchaseRepository {
    pool: DbPool,
}

impl SqlPurchaseRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_purchase(row: &SqliteRow) -> Result<PurchaseRecord, RepositoryError> {
    let purchase_price: String = column(row, "purchase_price")?;
    let original_price: Option<String> = column(row, "original_price")?;
    let discount_percent: String = column(row, "discount_percent")?;
    let purchase_date: String = column(row, "purchase_date")?;
    let warranty_months: Option<i64> = column(row, "warranty_months")?;
    let created_at: String = column(row, "created_at")?;
    let updated_at: String = column(row, "updated_at")?;

    let warranty_months = warranty_months
        .map(|months| {
            u32::try_from(months)
                .map_err(|_| RepositoryError::Decode(format!("invalid warranty {months}")))
        })
        .transpose()?;

    Ok(PurchaseRecord {
        id: PurchaseRecordId(column(row, "id")?),
        clothing_item_id: ClothingItemId(column(row, "clothing_item_id")?),
        purchase_price: money(&purchase_price)?,
        original_price: original_price.as_deref().map(money).transpose()?,
        discount_percent: money(&discount_percent)?,
        store_name: column(row, "store_name")?,
        online_store: column(row, "online_store")?,
        order_number: column(row, "order_number")?,
        payment_method: column(row, "payment_method")?,
        currency: column(row, "currency")?,
        purchase_date: date(&purchase_date)?,
        warranty_months,
        warranty_expiry: optional_date(column(row, "warranty_expiry")?)?,
        notes: column(row, "notes")?,
        created_at: timestamp(&created_at)?,
        updated_at: timestamp(&updated_at)?,
    })
}

#[async_trait::async_trait]
impl PurchaseRepository for SqlPurchaseRepository {
    async fn find_by_id(
        &self,
        id: &PurchaseRecordId,
    ) -> Result<Option<PurchaseRecord>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchase_record WHERE purchase_record.id = ?"
        ))
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_purchase).transpose()
    }

    async fn find_by_item(
        &self,
        item_id: &ClothingItemId,
    ) -> Result<Option<PurchaseRecord>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchase_record
             WHERE purchase_record.clothing_item_id = ?"
        ))
        .bind(&item_id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_purchase).transpose()
    }

    async fn insert(&self, record: PurchaseRecord) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO purchase_record (id, clothing_item_id, purchase_price, original_price,
                                          discount_percent, store_name, online_store,
                                          order_number, payment_method, currency, purchase_date,
                                          warranty_months, warranty_expiry, notes, created_at,
                                          updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id.0)
        .bind(&record.clothing_item_id.0)
        .bind(record.purchase_price.to_string())
        .bind(record.original_price.map(|price| price.to_string()))
        .bind(record.discount_percent.to_string())
        .bind(&record.store_name)
        .bind(&record.online_store)
        .bind(&record.order_number)
        .bind(&record.payment_method)
        .bind(&record.currency)
        .bind(format_date(record.purchase_date))
        .bind(record.warranty_months.map(i64::from))
        .bind(record.warranty_expiry.map(format_date))
        .bind(&record.notes)
        .bind(record.created_at.to_rfc3339())
        .bind(record.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(error)) if error.is_unique_violation() => {
                Err(RepositoryError::Conflict(format!(
                    "clothing item `{}` already has a purchase record",
                    record.clothing_item_id.0
                )))
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn update(&self, record: PurchaseRecord) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE purchase_record SET
                 purchase_price = ?, original_price = ?, discount_percent = ?, store_name = ?,
                 online_store = ?, order_number = ?, payment_method = ?, currency = ?,
                 purchase_date = ?, warranty_months = ?, warranty_expiry = ?, notes = ?,
                 updated_at = ?
             WHERE id = ?",
        )
        .bind(record.purchase_price.to_string())
        .bind(record.original_price.map(|price| price.to_string()))
        .bind(record.discount_percent.to_string())
        .bind(&record.store_name)
        .bind(&record.online_store)
        .bind(&record.order_number)
        .bind(&record.payment_method)
        .bind(&record.currency)
        .bind(format_date(record.purchase_date))
        .bind(record.warranty_months.map(i64::from))
        .bind(record.warranty_expiry.map(format_date))
        .bind(&record.notes)
        .bind(record.updated_at.to_rfc3339())
        .bind(&record.id.0)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("purchase record", record.id.0));
        }
        Ok(())
    }

    async fn delete(&self, id: &PurchaseRecordId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM purchase_record WHERE id = ?")
            .bind(&id.0)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("purchase record", id.0.clone()));
        }
        Ok(())
    }

    async fn list_for_owner(
        &self,
        owner_id: &OwnerId,
    ) -> Result<Vec<PurchaseRecord>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchase_record
             JOIN clothing_item ON clothing_item.id = purchase_record.clothing_item_id
             WHERE clothing_item.owner_id = ?
             ORDER BY purchase_record.purchase_date DESC, purchase_record.id ASC"
        ))
        .bind(&owner_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_purchase).collect()
    }
}
