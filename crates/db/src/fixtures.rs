use chrono::Utc;
use sqlx::Row;

use wardrobe_core::catalog::{seed_categories, CATEGORY_SEEDS};

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

/// Deterministic two-level category catalog shipped with every installation.
///
/// Loading is an upsert by id, so reloading restores names, parents and ordering of the seeded
/// rows without touching categories created by users.
pub struct CategorySeedDataset;

impl CategorySeedDataset {
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let categories = seed_categories(Utc::now());
        let mut tx = pool.begin().await?;

        for category in &categories {
            sqlx::query(
                "INSERT INTO category (id, name, description, parent_id, sort_order, is_active,
                                       created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, 1, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET
                     name = excluded.name,
                     description = excluded.description,
                     parent_id = excluded.parent_id,
                     sort_order = excluded.sort_order,
                     is_active = 1,
                     updated_at = excluded.updated_at",
            )
            .bind(&category.id.0)
            .bind(&category.name)
            .bind(&category.description)
            .bind(category.parent_id.as_ref().map(|parent| parent.0.as_str()))
            .bind(category.sort_order)
            .bind(category.created_at.to_rfc3339())
            .bind(category.updated_at.to_rfc3339())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let roots = categories.iter().filter(|category| category.is_root()).count();
        Ok(SeedResult { categories_seeded: categories.len(), roots_seeded: roots })
    }

    /// Checks that every seeded row exists, is active and still points at its seeded parent.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::with_capacity(CATEGORY_SEEDS.len());

        for seed in CATEGORY_SEEDS {
            let row = sqlx::query(
                "SELECT name, parent_id, sort_order, is_active FROM category WHERE id = ?",
            )
            .bind(seed.id)
            .fetch_optional(pool)
            .await?;

            let matches = match row {
                Some(row) => {
                    let name: String =
                        row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
                    let parent_id: Option<String> = row
                        .try_get("parent_id")
                        .map_err(|e| RepositoryError::Decode(e.to_string()))?;
                    let sort_order: i32 = row
                        .try_get("sort_order")
                        .map_err(|e| RepositoryError::Decode(e.to_string()))?;
                    let is_active: bool = row
                        .try_get("is_active")
                        .map_err(|e| RepositoryError::Decode(e.to_string()))?;

                    name == seed.name
                        && parent_id.as_deref() == seed.parent_id
                        && sort_order == seed.sort_order
                        && is_active
                }
                None => false,
            };
            checks.push((seed.id, matches));
        }

        let all_present = checks.iter().all(|(_, ok)| *ok);
        Ok(VerificationResult { all_present, checks })
    }

    /// Removes seeded rows from a test database. Rows still referenced by items are kept.
    pub async fn clean(pool: &DbPool) -> Result<(), RepositoryError> {
        let mut tx = pool.begin().await?;

        for seed in CATEGORY_SEEDS.iter().rev() {
            sqlx::query(
                "DELETE FROM category
                 WHERE id = ?
                   AND NOT EXISTS (SELECT 1 FROM clothing_item WHERE category_id = category.id)
                   AND NOT EXISTS (SELECT 1 FROM category AS child WHERE child.parent_id = category.id)",
            )
            .bind(seed.id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedResult {
    pub categories_seeded: usize,
    pub roots_seeded: usize,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{CategoryRepository, SqlCategoryRepository};
    use crate::{connect_with_settings, migrations};
    use wardrobe_core::CategoryHierarchy;

    #[tokio::test]
    async fn verify_seed_contract_and_idempotency() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30)
            .await
            .expect("connect to test database");
        migrations::run_pending(&pool).await.expect("run migrations");

        let first = CategorySeedDataset::load(&pool).await.expect("load seed catalog");
        let first_verification = CategorySeedDataset::verify(&pool).await.expect("verify");
        assert!(first_verification.all_present);
        assert_eq!(first.categories_seeded, CATEGORY_SEEDS.len());
        assert_eq!(first.roots_seeded, 6);

        let second = CategorySeedDataset::load(&pool).await.expect("reload seed catalog");
        let second_verification = CategorySeedDataset::verify(&pool).await.expect("re-verify");
        assert!(second_verification.all_present);
        assert_eq!(first, second);
        assert_eq!(first_verification.checks, second_verification.checks);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM category")
            .fetch_one(&pool)
            .await
            .expect("count categories");
        assert_eq!(count as usize, CATEGORY_SEEDS.len());
    }

    #[tokio::test]
    async fn verification_detects_drifted_rows() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("run migrations");
        CategorySeedDataset::load(&pool).await.expect("load seed catalog");

        sqlx::query("UPDATE category SET is_active = 0 WHERE id = 'cat-shoes-boots'")
            .execute(&pool)
            .await
            .expect("deactivate boots");

        let verification = CategorySeedDataset::verify(&pool).await.expect("verify");
        assert!(!verification.all_present);
        assert!(verification.checks.contains(&("cat-shoes-boots", false)));

        CategorySeedDataset::load(&pool).await.expect("reload restores seed");
        assert!(CategorySeedDataset::verify(&pool).await.expect("verify").all_present);
    }

    #[tokio::test]
    async fn seeded_catalog_builds_a_tree() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("run migrations");
        CategorySeedDataset::load(&pool).await.expect("load seed catalog");

        let repo = SqlCategoryRepository::new(pool.clone());
        let hierarchy = CategoryHierarchy::new(repo.list_all().await.expect("list categories"));
        let tree = hierarchy.build_tree();

        assert_eq!(tree.len(), 6);
        assert_eq!(
            hierarchy.resolve_path(&wardrobe_core::CategoryId("cat-shoes-boots".to_string())),
            Some("鞋子 > 靴子".to_string())
        );
    }

    #[tokio::test]
    async fn clean_removes_unreferenced_seed_rows() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("run migrations");
        CategorySeedDataset::load(&pool).await.expect("load seed catalog");

        CategorySeedDataset::clean(&pool).await.expect("clean");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM category")
            .fetch_one(&pool)
            .await
            .expect("count categories");
        assert_eq!(count, 0);
    }
}
