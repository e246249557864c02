use std::collections::HashMap;

use tokio::sync::RwLock;

use wardrobe_core::domain::category::{Category, CategoryId};
use wardrobe_core::domain::clothing::{ClothingItem, ClothingItemId, OwnerId};
use wardrobe_core::domain::maintenance::{MaintenanceRecord, MaintenanceRecordId};
use wardrobe_core::domain::outfit::{Outfit, OutfitId};
use wardrobe_core::domain::purchase::{PurchaseRecord, PurchaseRecordId};
use wardrobe_core::domain::wear::WearRecord;
use wardrobe_core::lifecycle::DurabilityScorer;

use super::{
    CategoryRepository, ClothingItemRepository, ItemScope, MaintenanceRepository,
    OutfitRepository, PurchaseRepository, RepositoryError, WearRepository,
};

#[derive(Default)]
pub struct InMemoryCategoryRepository {
    categories: RwLock<HashMap<String, Category>>,
}

#[async_trait::async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn find_by_id(&self, id: &CategoryId) -> Result<Option<Category>, RepositoryError> {
        let categories = self.categories.read().await;
        Ok(categories.get(&id.0).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = self.categories.read().await;
        let mut all: Vec<Category> = categories.values().cloned().collect();
        all.sort_by(|a, b| a.sibling_key().cmp(&b.sibling_key()));
        Ok(all)
    }

    async fn save(&self, category: Category) -> Result<(), RepositoryError> {
        let mut categories = self.categories.write().await;
        categories.insert(category.id.0.clone(), category);
        Ok(())
    }
}

#[derive(Default)]
struct WardrobeState {
    items: HashMap<String, ClothingItem>,
    wears: Vec<WearRecord>,
    maintenance: HashMap<String, MaintenanceRecord>,
    purchases: HashMap<String, PurchaseRecord>,
}

impl WardrobeState {
    fn maintenance_count(&self, item_id: &str) -> u32 {
        let count =
            self.maintenance.values().filter(|record| record.clothing_item_id.0 == item_id).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    fn is_owned_active(&self, item_id: &str, owner_id: &OwnerId) -> bool {
        self.items.get(item_id).is_some_and(|item| item.belongs_to(owner_id) && item.is_active)
    }
}

/// Items and their wear, maintenance and purchase records behind a single lock, so a wear
/// updates the item and appends its record under one write guard.
#[derive(Default)]
pub struct InMemoryWardrobeRepository {
    state: RwLock<WardrobeState>,
}

#[async_trait::async_trait]
impl ClothingItemRepository for InMemoryWardrobeRepository {
    async fn find_by_id(
        &self,
        id: &ClothingItemId,
    ) -> Result<Option<ClothingItem>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.items.get(&id.0).cloned())
    }

    async fn list_by_owner(
        &self,
        owner_id: &OwnerId,
        scope: ItemScope,
    ) -> Result<Vec<ClothingItem>, RepositoryError> {
        let state = self.state.read().await;
        let mut items: Vec<ClothingItem> = state
            .items
            .values()
            .filter(|item| item.belongs_to(owner_id) && scope.includes(item))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.0.cmp(&b.id.0)));
        Ok(items)
    }

    async fn save(&self, item: ClothingItem) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        state.items.insert(item.id.0.clone(), item);
        Ok(())
    }

    async fn update_details(
        &self,
        changes: &ClothingItem,
        scorer: Option<&DurabilityScorer>,
    ) -> Result<ClothingItem, RepositoryError> {
        let mut state = self.state.write().await;
        let maintenance_count = state.maintenance_count(&changes.id.0);
        let item = match state.items.get_mut(&changes.id.0) {
            Some(item) if item.is_active => item,
            _ => return Err(RepositoryError::not_found("clothing item", changes.id.0.clone())),
        };

        item.category_id = changes.category_id.clone();
        item.name = changes.name.clone();
        item.brand = changes.brand.clone();
        item.color = changes.color.clone();
        item.material = changes.material.clone();
        item.price = changes.price;
        item.purchase_date = changes.purchase_date;
        item.notes = changes.notes.clone();
        item.is_favorite = changes.is_favorite;
        item.updated_at = changes.updated_at;
        if let Some(scorer) = scorer {
            *item = scorer.rescore(item.clone(), maintenance_count, changes.updated_at);
        }
        Ok(item.clone())
    }

    async fn count_active_by_category(
        &self,
        owner_id: Option<&OwnerId>,
    ) -> Result<HashMap<CategoryId, u64>, RepositoryError> {
        let state = self.state.read().await;
        let mut counts = HashMap::new();
        for item in state.items.values() {
            let owned = owner_id.map_or(true, |owner| item.belongs_to(owner));
            if item.is_active && owned {
                *counts.entry(item.category_id.clone()).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}

#[async_trait::async_trait]
impl WearRepository for InMemoryWardrobeRepository {
    async fn record_wear(
        &self,
        owner_id: &OwnerId,
        record: WearRecord,
        scorer: &DurabilityScorer,
    ) -> Result<ClothingItem, RepositoryError> {
        let mut state = self.state.write().await;
        let item_id = record.clothing_item_id.0.clone();
        if !state.is_owned_active(&item_id, owner_id) {
            return Err(RepositoryError::not_found("clothing item", item_id));
        }

        let maintenance_count = state.maintenance_count(&item_id);
        let item = state
            .items
            .get(&item_id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("clothing item", item_id.clone()))?;
        let updated = scorer.record_wear(item, maintenance_count, record.created_at);

        state.items.insert(item_id, updated.clone());
        state.wears.push(record);
        Ok(updated)
    }

    async fn list_for_item(
        &self,
        item_id: &ClothingItemId,
    ) -> Result<Vec<WearRecord>, RepositoryError> {
        let state = self.state.read().await;
        let mut records: Vec<WearRecord> = state
            .wears
            .iter()
            .filter(|record| &record.clothing_item_id == item_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.wear_date.cmp(&a.wear_date).then_with(|| a.id.0.cmp(&b.id.0)));
        Ok(records)
    }

    async fn list_for_owner(&self, owner_id: &OwnerId) -> Result<Vec<WearRecord>, RepositoryError> {
        let state = self.state.read().await;
        let mut records: Vec<WearRecord> = state
            .wears
            .iter()
            .filter(|record| {
                state
                    .items
                    .get(&record.clothing_item_id.0)
                    .is_some_and(|item| item.belongs_to(owner_id))
            })
            .cloned()
            .collect();
        records.sort_by(|a, b| b.wear_date.cmp(&a.wear_date).then_with(|| a.id.0.cmp(&b.id.0)));
        Ok(records)
    }
}

#[async_trait::async_trait]
impl MaintenanceRepository for InMemoryWardrobeRepository {
    async fn find_by_id(
        &self,
        id: &MaintenanceRecordId,
    ) -> Result<Option<MaintenanceRecord>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.maintenance.get(&id.0).cloned())
    }

    async fn save_and_rescore(
        &self,
        record: MaintenanceRecord,
        scorer: &DurabilityScorer,
    ) -> Result<ClothingItem, RepositoryError> {
        let mut state = self.state.write().await;
        let item_id = record.clothing_item_id.0.clone();
        let item = match state.items.get(&item_id) {
            Some(item) if item.is_active => item.clone(),
            _ => return Err(RepositoryError::not_found("clothing item", item_id)),
        };

        let now = record.updated_at;
        state.maintenance.insert(record.id.0.clone(), record);
        let rescored = scorer.rescore(item, state.maintenance_count(&item_id), now);
        state.items.insert(item_id, rescored.clone());
        Ok(rescored)
    }

    async fn list_for_item(
        &self,
        item_id: &ClothingItemId,
    ) -> Result<Vec<MaintenanceRecord>, RepositoryError> {
        let state = self.state.read().await;
        let mut records: Vec<MaintenanceRecord> = state
            .maintenance
            .values()
            .filter(|record| &record.clothing_item_id == item_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            b.maintenance_date.cmp(&a.maintenance_date).then_with(|| a.id.0.cmp(&b.id.0))
        });
        Ok(records)
    }

    async fn list_for_owner(
        &self,
        owner_id: &OwnerId,
    ) -> Result<Vec<MaintenanceRecord>, RepositoryError> {
        let state = self.state.read().await;
        let mut records: Vec<MaintenanceRecord> = state
            .maintenance
            .values()
            .filter(|record| state.is_owned_active(&record.clothing_item_id.0, owner_id))
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            a.next_maintenance_date
                .cmp(&b.next_maintenance_date)
                .then_with(|| a.id.0.cmp(&b.id.0))
        });
        Ok(records)
    }

    async fn count_for_item(&self, item_id: &ClothingItemId) -> Result<u32, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.maintenance_count(&item_id.0))
    }
}

#[async_trait::async_trait]
impl PurchaseRepository for InMemoryWardrobeRepository {
    async fn find_by_id(
        &self,
        id: &PurchaseRecordId,
    ) -> Result<Option<PurchaseRecord>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.purchases.get(&id.0).cloned())
    }

    async fn find_by_item(
        &self,
        item_id: &ClothingItemId,
    ) -> Result<Option<PurchaseRecord>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.purchases.values().find(|record| &record.clothing_item_id == item_id).cloned())
    }

    async fn insert(&self, record: PurchaseRecord) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        if !state.items.contains_key(&record.clothing_item_id.0) {
            return Err(RepositoryError::not_found("clothing item", &record.clothing_item_id.0));
        }
        if state.purchases.values().any(|other| other.clothing_item_id == record.clothing_item_id)
        {
            return Err(RepositoryError::Conflict(format!(
                "clothing item `{}` already has a purchase record",
                record.clothing_item_id.0
            )));
        }
        state.purchases.insert(record.id.0.clone(), record);
        Ok(())
    }

    async fn update(&self, record: PurchaseRecord) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        match state.purchases.get_mut(&record.id.0) {
            Some(stored) => {
                let clothing_item_id = stored.clothing_item_id.clone();
                let created_at = stored.created_at;
                *stored = PurchaseRecord { clothing_item_id, created_at, ..record };
                Ok(())
            }
            None => Err(RepositoryError::not_found("purchase record", record.id.0)),
        }
    }

    async fn delete(&self, id: &PurchaseRecordId) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        state
            .purchases
            .remove(&id.0)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("purchase record", id.0.clone()))
    }

    async fn list_for_owner(
        &self,
        owner_id: &OwnerId,
    ) -> Result<Vec<PurchaseRecord>, RepositoryError> {
        let state = self.state.read().await;
        let mut records: Vec<PurchaseRecord> = state
            .purchases
            .values()
            .filter(|record| {
                state
                    .items
                    .get(&record.clothing_item_id.0)
                    .is_some_and(|item| item.belongs_to(owner_id))
            })
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            b.purchase_date.cmp(&a.purchase_date).then_with(|| a.id.0.cmp(&b.id.0))
        });
        Ok(records)
    }
}

#[derive(Default)]
pub struct InMemoryOutfitRepository {
    outfits: RwLock<HashMap<String, Outfit>>,
}

#[async_trait::async_trait]
impl OutfitRepository for InMemoryOutfitRepository {
    async fn find_by_id(&self, id: &OutfitId) -> Result<Option<Outfit>, RepositoryError> {
        let outfits = self.outfits.read().await;
        Ok(outfits.get(&id.0).cloned())
    }

    async fn save(&self, outfit: Outfit) -> Result<(), RepositoryError> {
        let mut outfits = self.outfits.write().await;
        outfits.insert(outfit.id.0.clone(), outfit);
        Ok(())
    }

    async fn list_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<Outfit>, RepositoryError> {
        let outfits = self.outfits.read().await;
        let mut owned: Vec<Outfit> =
            outfits.values().filter(|outfit| &outfit.owner_id == owner_id).cloned().collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.0.cmp(&b.id.0)));
        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    use wardrobe_core::domain::category::{Category, CategoryId};
    use wardrobe_core::domain::clothing::{ClothingItem, ClothingItemId, OwnerId};
    use wardrobe_core::domain::maintenance::{
        MaintenanceRecord, MaintenanceRecordId, MaintenanceType,
    };
    use wardrobe_core::domain::wear::{WearIntensity, WearRecord, WearRecordId};
    use wardrobe_core::lifecycle::{DurabilityScorer, DurabilityTables};

    use crate::repositories::{
        CategoryRepository, ClothingItemRepository, InMemoryCategoryRepository,
        InMemoryWardrobeRepository, ItemScope, RepositoryError, WearRepository,
    };

    fn item(id: &str, owner: &str, name: &str) -> ClothingItem {
        let now = Utc::now();
        ClothingItem {
            id: ClothingItemId(id.to_string()),
            owner_id: OwnerId(owner.to_string()),
            category_id: CategoryId("cat-tops".to_string()),
            name: name.to_string(),
            brand: String::new(),
            color: String::new(),
            material: "棉".to_string(),
            price: Decimal::new(5000, 2),
            purchase_date: None,
            wear_count: 0,
            durability_score: 100.0,
            last_worn_date: None,
            notes: None,
            is_favorite: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn wear(id: &str, item: &str) -> WearRecord {
        let now = Utc::now();
        WearRecord {
            id: WearRecordId(id.to_string()),
            clothing_item_id: ClothingItemId(item.to_string()),
            wear_date: now,
            notes: None,
            duration_hours: None,
            intensity: WearIntensity::Normal,
            created_at: now,
        }
    }

    #[tokio::test]
    async fn in_memory_category_repo_round_trip() {
        let repo = InMemoryCategoryRepository::default();
        let category = Category::new(CategoryId("cat-tops".to_string()), "上衣", None, 1);

        repo.save(category.clone()).await.expect("save category");
        let found = repo.find_by_id(&category.id).await.expect("find category");

        assert_eq!(found, Some(category));
    }

    #[tokio::test]
    async fn in_memory_items_list_active_by_name() {
        let repo = InMemoryWardrobeRepository::default();
        repo.save(item("1", "user-1", "tee")).await.expect("save");
        repo.save(item("2", "user-1", "coat")).await.expect("save");
        repo.save(item("3", "user-2", "scarf")).await.expect("save");
        let mut retired = item("4", "user-1", "anorak");
        retired.deactivate(Utc::now());
        repo.save(retired).await.expect("save");

        let names: Vec<String> = repo
            .list_by_owner(&OwnerId("user-1".to_string()), ItemScope::Active)
            .await
            .expect("list")
            .into_iter()
            .map(|item| item.name)
            .collect();
        assert_eq!(names, vec!["coat".to_string(), "tee".to_string()]);
    }

    #[tokio::test]
    async fn in_memory_wear_is_applied_under_one_guard() {
        let repo = Arc::new(InMemoryWardrobeRepository::default());
        repo.save(item("1", "user-1", "tee")).await.expect("save");
        let scorer = Arc::new(DurabilityScorer::default());

        let mut handles = Vec::new();
        for n in 0..16 {
            let repo = Arc::clone(&repo);
            let scorer = Arc::clone(&scorer);
            handles.push(tokio::spawn(async move {
                let owner = OwnerId("user-1".to_string());
                repo.record_wear(&owner, wear(&format!("w-{n}"), "1"), &scorer).await
            }));
        }
        for handle in handles {
            handle.await.expect("join").expect("wear");
        }

        let stored = ClothingItemRepository::find_by_id(&*repo, &ClothingItemId("1".to_string()))
            .await
            .expect("find")
            .expect("item");
        assert_eq!(stored.wear_count, 16);
        assert_eq!(stored.durability_score, 84.0);
        assert_eq!(repo.list_for_item(&stored.id).await.expect("list").len(), 16);
    }

    #[tokio::test]
    async fn in_memory_wear_rejects_other_owners() {
        let repo = InMemoryWardrobeRepository::default();
        repo.save(item("1", "user-1", "tee")).await.expect("save");

        let stranger = OwnerId("user-2".to_string());
        let scorer = DurabilityScorer::default();
        let result = repo.record_wear(&stranger, wear("w-1", "1"), &scorer).await;

        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
        let owner = OwnerId("user-1".to_string());
        assert!(repo.list_for_owner(&owner).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn in_memory_wear_listing_is_newest_first() {
        let repo = InMemoryWardrobeRepository::default();
        repo.save(item("1", "user-1", "tee")).await.expect("save");
        let scorer = DurabilityScorer::default();
        let owner = OwnerId("user-1".to_string());

        let mut older = wear("w-old", "1");
        older.wear_date = Utc::now() - Duration::days(3);
        repo.record_wear(&owner, older, &scorer).await.expect("wear");
        repo.record_wear(&owner, wear("w-new", "1"), &scorer).await.expect("wear");

        let ids: Vec<String> = repo
            .list_for_owner(&owner)
            .await
            .expect("list")
            .into_iter()
            .map(|record| record.id.0)
            .collect();
        assert_eq!(ids, vec!["w-new".to_string(), "w-old".to_string()]);
    }

    #[tokio::test]
    async fn in_memory_maintenance_rescore_counts_the_new_record() {
        let repo = InMemoryWardrobeRepository::default();
        let mut worn = item("1", "user-1", "tee");
        worn.wear_count = 10;
        repo.save(worn).await.expect("save");
        let scorer = DurabilityScorer::new(DurabilityTables {
            maintenance_bonus_per_event: 1.5,
            ..DurabilityTables::default()
        });

        let now = Utc::now();
        let on = now.date_naive();
        let record = scorer.schedule(MaintenanceRecord {
            id: MaintenanceRecordId("m-1".to_string()),
            clothing_item_id: ClothingItemId("1".to_string()),
            maintenance_type: MaintenanceType::Washing,
            cost: Decimal::ZERO,
            maintenance_date: on,
            effectiveness_score: None,
            next_maintenance_date: on,
            service_provider: None,
            notes: None,
            created_at: now,
            updated_at: now,
        });

        let rescored = crate::repositories::MaintenanceRepository::save_and_rescore(
            &repo, record, &scorer,
        )
        .await
        .expect("rescore");
        assert_eq!(rescored.wear_count, 10);
        assert_eq!(rescored.durability_score, 91.5);
        let count = crate::repositories::MaintenanceRepository::count_for_item(&repo, &rescored.id)
            .await
            .expect("count");
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn in_memory_purchases_are_unique_per_item() {
        use wardrobe_core::domain::purchase::{PurchaseRecord, PurchaseRecordId};

        use crate::repositories::PurchaseRepository;

        let repo = InMemoryWardrobeRepository::default();
        repo.save(item("1", "user-1", "tee")).await.expect("save");
        let now = Utc::now();
        let record = |id: &str| PurchaseRecord {
            id: PurchaseRecordId(id.to_string()),
            clothing_item_id: ClothingItemId("1".to_string()),
            purchase_price: Decimal::new(7900, 2),
            original_price: None,
            discount_percent: Decimal::ZERO,
            store_name: None,
            online_store: Some("京东".to_string()),
            order_number: None,
            payment_method: None,
            currency: "CNY".to_string(),
            purchase_date: now.date_naive(),
            warranty_months: None,
            warranty_expiry: None,
            notes: None,
            created_at: now,
            updated_at: now,
        };

        PurchaseRepository::insert(&repo, record("p-1")).await.expect("insert");
        let duplicate = PurchaseRepository::insert(&repo, record("p-2")).await;
        assert!(matches!(duplicate, Err(RepositoryError::Conflict(_))));

        let owner = OwnerId("user-1".to_string());
        let listed = PurchaseRepository::list_for_owner(&repo, &owner).await.expect("list");
        assert_eq!(listed.len(), 1);
        let stranger = OwnerId("user-2".to_string());
        assert!(PurchaseRepository::list_for_owner(&repo, &stranger)
            .await
            .expect("list")
            .is_empty());
    }
}
