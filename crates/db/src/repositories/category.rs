use sqlx::sqlite::SqliteRow;

use wardrobe_core::domain::category::{Category, CategoryId};

use super::codec::{column, timestamp};
use super::{CategoryRepository, RepositoryError};
use crate::DbPool;

pub struct SqlCategoryRepository {
    pool: DbPool,
}

impl SqlCategoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_category(row: &SqliteRow) -> Result<Category, RepositoryError> {
    let parent_id: Option<String> = column(row, "parent_id")?;
    let created_at: String = column(row, "created_at")?;
    let updated_at: String = column(row, "updated_at")?;

    Ok(Category {
        id: CategoryId(column(row, "id")?),
        name: column(row, "name")?,
        description: column(row, "description")?,
        parent_id: parent_id.map(CategoryId),
        sort_order: column(row, "sort_order")?,
        is_active: column(row, "is_active")?,
        created_at: timestamp(&created_at)?,
        updated_at: timestamp(&updated_at)?,
    })
}

#[async_trait::async_trait]
impl CategoryRepository for SqlCategoryRepository {
    async fn find_by_id(&self, id: &CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, description, parent_id, sort_order, is_active, created_at, updated_at
             FROM category WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_category).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, name, description, parent_id, sort_order, is_active, created_at, updated_at
             FROM category ORDER BY sort_order ASC, name ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_category).collect()
    }

    async fn save(&self, category: Category) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO category (id, name, description, parent_id, sort_order, is_active,
                                   created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 description = excluded.description,
                 parent_id = excluded.parent_id,
                 sort_order = excluded.sort_order,
                 is_active = excluded.is_active,
                 updated_at = excluded.updated_at",
        )
        .bind(&category.id.0)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.parent_id.as_ref().map(|parent| parent.0.as_str()))
        .bind(category.sort_order)
        .bind(category.is_active)
        .bind(category.created_at.to_rfc3339())
        .bind(category.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use wardrobe_core::domain::category::{Category, CategoryId};

    use super::SqlCategoryRepository;
    use crate::repositories::CategoryRepository;
    use crate::{connect_with_settings, migrations};

    async fn setup() -> SqlCategoryRepository {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        SqlCategoryRepository::new(pool)
    }

    fn category(id: &str, name: &str, parent: Option<&str>, sort_order: i32) -> Category {
        let mut category = Category::new(
            CategoryId(id.to_string()),
            name,
            parent.map(|p| CategoryId(p.to_string())),
            sort_order,
        );
        category.description = Some(format!("{name} description"));
        category
    }

    #[tokio::test]
    async fn save_and_find_round_trip() {
        let repo = setup().await;
        let shoes = category("cat-shoes", "鞋子", None, 3);
        let boots = category("cat-boots", "靴子", Some("cat-shoes"), 2);

        repo.save(shoes.clone()).await.expect("save root");
        repo.save(boots.clone()).await.expect("save child");

        let found = repo.find_by_id(&boots.id).await.expect("find").expect("exists");
        assert_eq!(found.name, "靴子");
        assert_eq!(found.parent_id, Some(CategoryId("cat-shoes".to_string())));
        assert_eq!(found.description.as_deref(), Some("靴子 description"));
        assert!(found.is_active);

        let missing = repo.find_by_id(&CategoryId("nope".to_string())).await.expect("find");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn save_upserts_parent_and_active_flag() {
        let repo = setup().await;
        repo.save(category("a", "A", None, 1)).await.expect("save a");
        repo.save(category("b", "B", None, 2)).await.expect("save b");
        let mut moved = category("c", "C", Some("a"), 1);
        repo.save(moved.clone()).await.expect("save c");

        moved.parent_id = Some(CategoryId("b".to_string()));
        moved.is_active = false;
        moved.updated_at = Utc::now();
        repo.save(moved).await.expect("update c");

        let found = repo.find_by_id(&CategoryId("c".to_string())).await.expect("find").expect("c");
        assert_eq!(found.parent_id, Some(CategoryId("b".to_string())));
        assert!(!found.is_active);
        assert_eq!(repo.list_all().await.expect("list").len(), 3);
    }

    #[tokio::test]
    async fn unknown_parent_violates_foreign_key() {
        let repo = setup().await;
        let result = repo.save(category("orphan", "Orphan", Some("ghost"), 1)).await;
        assert!(result.is_err());
    }
}
