use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use wardrobe_core::domain::category::{Category, CategoryId};
use wardrobe_core::domain::clothing::{ClothingItem, ClothingItemId, OwnerId};
use wardrobe_core::domain::maintenance::{MaintenanceRecord, MaintenanceRecordId};
use wardrobe_core::domain::outfit::{Outfit, OutfitId};
use wardrobe_core::domain::purchase::{PurchaseRecord, PurchaseRecordId};
use wardrobe_core::domain::wear::WearRecord;
use wardrobe_core::errors::{ApplicationError, DomainError};
use wardrobe_core::lifecycle::DurabilityScorer;

pub mod category;
pub mod clothing;
mod codec;
pub mod maintenance;
pub mod memory;
pub mod outfit;
pub mod purchase;
pub mod wear;

pub use category::SqlCategoryRepository;
pub use clothing::SqlClothingItemRepository;
pub use maintenance::SqlMaintenanceRepository;
pub use memory::{InMemoryCategoryRepository, InMemoryOutfitRepository, InMemoryWardrobeRepository};
pub use outfit::SqlOutfitRepository;
pub use purchase::SqlPurchaseRepository;
pub use wear::SqlWearRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("{entity} `{id}` was not found")]
    NotFound { entity: &'static str, id: String },
    #[error("conflict: {0}")]
    Conflict(String),
}

impl RepositoryError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { entity, id: id.into() }
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound { entity, id } => {
                ApplicationError::Domain(DomainError::NotFound { entity, id })
            }
            RepositoryError::Conflict(message) => {
                ApplicationError::Domain(DomainError::InvalidOperation(message))
            }
            other => ApplicationError::Persistence(other.to_string()),
        }
    }
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_by_id(&self, id: &CategoryId) -> Result<Option<Category>, RepositoryError>;
    /// Every category, active or not; the hierarchy decides what to show.
    async fn list_all(&self) -> Result<Vec<Category>, RepositoryError>;
    async fn save(&self, category: Category) -> Result<(), RepositoryError>;
}

/// Which of an owner's items a listing returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemScope {
    Active,
    Favorites,
    /// Active and deactivated items; history views still need to resolve retired items.
    All,
}

impl ItemScope {
    pub fn includes(self, item: &ClothingItem) -> bool {
        match self {
            Self::Active => item.is_active,
            Self::Favorites => item.is_active && item.is_favorite,
            Self::All => true,
        }
    }

    fn sql_filter(self) -> &'static str {
        match self {
            Self::Active => "AND is_active = 1",
            Self::Favorites => "AND is_active = 1 AND is_favorite = 1",
            Self::All => "",
        }
    }
}

#[async_trait]
pub trait ClothingItemRepository: Send + Sync {
    async fn find_by_id(&self, id: &ClothingItemId)
        -> Result<Option<ClothingItem>, RepositoryError>;

    /// Items of one owner within `scope`, ordered by name.
    async fn list_by_owner(
        &self,
        owner_id: &OwnerId,
        scope: ItemScope,
    ) -> Result<Vec<ClothingItem>, RepositoryError>;

    async fn save(&self, item: ClothingItem) -> Result<(), RepositoryError>;

    /// Writes the descriptive fields of an active item (category, name, brand, color, material,
    /// price, purchase date, notes and the favorite flag) without touching its wear state. With
    /// a scorer, the stored item is rescored in the same unit.
    async fn update_details(
        &self,
        changes: &ClothingItem,
        scorer: Option<&DurabilityScorer>,
    ) -> Result<ClothingItem, RepositoryError>;

    /// Active item counts per category, optionally restricted to one owner.
    async fn count_active_by_category(
        &self,
        owner_id: Option<&OwnerId>,
    ) -> Result<HashMap<CategoryId, u64>, RepositoryError>;
}

#[async_trait]
pub trait WearRepository: Send + Sync {
    /// Persists `record` and applies the wear to its item as one unit. The item must be active
    /// and owned by `owner_id`; `record.created_at` is used as the wear instant.
    async fn record_wear(
        &self,
        owner_id: &OwnerId,
        record: WearRecord,
        scorer: &DurabilityScorer,
    ) -> Result<ClothingItem, RepositoryError>;

    async fn list_for_item(
        &self,
        item_id: &ClothingItemId,
    ) -> Result<Vec<WearRecord>, RepositoryError>;

    async fn list_for_owner(&self, owner_id: &OwnerId) -> Result<Vec<WearRecord>, RepositoryError>;
}

#[async_trait]
pub trait MaintenanceRepository: Send + Sync {
    async fn find_by_id(
        &self,
        id: &MaintenanceRecordId,
    ) -> Result<Option<MaintenanceRecord>, RepositoryError>;

    /// Upserts `record` and rescores its item with the new maintenance count as one unit. Only
    /// the item's score and `updated_at` are written, so a concurrent wear is never lost.
    async fn save_and_rescore(
        &self,
        record: MaintenanceRecord,
        scorer: &DurabilityScorer,
    ) -> Result<ClothingItem, RepositoryError>;

    async fn list_for_item(
        &self,
        item_id: &ClothingItemId,
    ) -> Result<Vec<MaintenanceRecord>, RepositoryError>;

    /// Records for the owner's active items.
    async fn list_for_owner(
        &self,
        owner_id: &OwnerId,
    ) -> Result<Vec<MaintenanceRecord>, RepositoryError>;

    async fn count_for_item(&self, item_id: &ClothingItemId) -> Result<u32, RepositoryError>;
}

#[async_trait]
pub trait OutfitRepository: Send + Sync {
    async fn find_by_id(&self, id: &OutfitId) -> Result<Option<Outfit>, RepositoryError>;
    async fn save(&self, outfit: Outfit) -> Result<(), RepositoryError>;
    async fn list_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<Outfit>, RepositoryError>;
}

#[async_trait]
pub trait PurchaseRepository: Send + Sync {
    async fn find_by_id(
        &self,
        id: &PurchaseRecordId,
    ) -> Result<Option<PurchaseRecord>, RepositoryError>;

    async fn find_by_item(
        &self,
        item_id: &ClothingItemId,
    ) -> Result<Option<PurchaseRecord>, RepositoryError>;

    /// Fails with `Conflict` when the item already has a purchase record.
    async fn insert(&self, record: PurchaseRecord) -> Result<(), RepositoryError>;

    async fn update(&self, record: PurchaseRecord) -> Result<(), RepositoryError>;

    async fn delete(&self, id: &PurchaseRecordId) -> Result<(), RepositoryError>;

    /// Records for every item the owner has had, active or not, newest purchase first.
    async fn list_for_owner(
        &self,
        owner_id: &OwnerId,
    ) -> Result<Vec<PurchaseRecord>, RepositoryError>;
}
