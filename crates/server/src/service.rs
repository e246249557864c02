//! Wardrobe operations behind the HTTP handlers. Each call loads the snapshots it needs,
//! applies the rules from `wardrobe-core` and writes the result back through the repositories.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use wardrobe_core::catalog::{CategoryHierarchy, CategoryNode, CategoryStat};
use wardrobe_core::domain::category::{Category, CategoryId};
use wardrobe_core::domain::clothing::{ClothingItem, ClothingItemId, OwnerId};
use wardrobe_core::domain::maintenance::{
    MaintenanceRecord, MaintenanceRecordId, MaintenanceReminder, MaintenanceType,
};
use wardrobe_core::domain::outfit::{ItemRole, Outfit, OutfitId, OutfitRecommendation, WeatherType};
use wardrobe_core::domain::purchase::{
    PurchaseFilter, PurchaseRecord, PurchaseRecordId, SpendingStats, DEFAULT_CURRENCY,
};
use wardrobe_core::domain::wear::{WearIntensity, WearRecord, WearRecordId, WearStats};
use wardrobe_core::errors::{ApplicationError, DomainError};
use wardrobe_core::lifecycle::{self, DurabilityScorer, MAX_DURABILITY};
use wardrobe_core::recommendation::RecommendationEngine;
use wardrobe_db::repositories::{
    CategoryRepository, ClothingItemRepository, ItemScope, MaintenanceRepository,
    OutfitRepository, PurchaseRepository, SqlCategoryRepository, SqlClothingItemRepository,
    SqlMaintenanceRepository, SqlOutfitRepository, SqlPurchaseRepository, SqlWearRepository,
    WearRepository,
};
use wardrobe_db::DbPool;

pub type ServiceResult<T> = Result<T, ApplicationError>;

pub const DEFAULT_REMINDER_WINDOW_DAYS: u32 = 7;

#[derive(Clone)]
pub struct Repositories {
    pub categories: Arc<dyn CategoryRepository>,
    pub items: Arc<dyn ClothingItemRepository>,
    pub wears: Arc<dyn WearRepository>,
    pub maintenance: Arc<dyn MaintenanceRepository>,
    pub outfits: Arc<dyn OutfitRepository>,
    pub purchases: Arc<dyn PurchaseRepository>,
}

impl Repositories {
    pub fn sql(pool: DbPool) -> Self {
        Self {
            categories: Arc::new(SqlCategoryRepository::new(pool.clone())),
            items: Arc::new(SqlClothingItemRepository::new(pool.clone())),
            wears: Arc::new(SqlWearRepository::new(pool.clone())),
            maintenance: Arc::new(SqlMaintenanceRepository::new(pool.clone())),
            outfits: Arc::new(SqlOutfitRepository::new(pool.clone())),
            purchases: Arc::new(SqlPurchaseRepository::new(pool)),
        }
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        use wardrobe_db::repositories::{
            InMemoryCategoryRepository, InMemoryOutfitRepository, InMemoryWardrobeRepository,
        };

        let wardrobe = Arc::new(InMemoryWardrobeRepository::default());
        Self {
            categories: Arc::new(InMemoryCategoryRepository::default()),
            items: wardrobe.clone(),
            wears: wardrobe.clone(),
            maintenance: wardrobe.clone(),
            outfits: Arc::new(InMemoryOutfitRepository::default()),
            purchases: wardrobe,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<CategoryId>,
    pub sort_order: Option<i32>,
}

/// Partial update. A present `parent_id` is applied with the same rules as a move; moving
/// back to the root goes through `move_category`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub parent_id: Option<CategoryId>,
    pub sort_order: Option<i32>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewClothingItem {
    pub category_id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub material: String,
    #[serde(default)]
    pub price: Decimal,
    pub purchase_date: Option<NaiveDate>,
    pub notes: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
}

/// Partial item update. Wear state and the durability score are never taken from the caller.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ItemChanges {
    pub category_id: Option<CategoryId>,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub color: Option<String>,
    pub material: Option<String>,
    pub price: Option<Decimal>,
    pub purchase_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub is_favorite: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewWear {
    pub wear_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub duration_hours: Option<f64>,
    pub intensity: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewMaintenance {
    pub maintenance_type: String,
    #[serde(default)]
    pub cost: Decimal,
    pub maintenance_date: Option<NaiveDate>,
    pub effectiveness_score: Option<u8>,
    pub service_provider: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MaintenanceChanges {
    pub maintenance_type: Option<String>,
    pub cost: Option<Decimal>,
    pub maintenance_date: Option<NaiveDate>,
    pub effectiveness_score: Option<u8>,
    pub service_provider: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewPurchase {
    pub purchase_price: Decimal,
    pub original_price: Option<Decimal>,
    pub store_name: Option<String>,
    pub online_store: Option<String>,
    pub order_number: Option<String>,
    pub payment_method: Option<String>,
    pub currency: Option<String>,
    /// Defaults to the item's purchase date, then today.
    pub purchase_date: Option<NaiveDate>,
    pub warranty_months: Option<u32>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PurchaseChanges {
    pub purchase_price: Option<Decimal>,
    pub original_price: Option<Decimal>,
    pub store_name: Option<String>,
    pub online_store: Option<String>,
    pub order_number: Option<String>,
    pub payment_method: Option<String>,
    pub currency: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_months: Option<u32>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewOutfitItem {
    pub clothing_item_id: ClothingItemId,
    pub role: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewOutfit {
    pub name: String,
    pub occasion: Option<String>,
    pub weather: Option<String>,
    pub items: Vec<NewOutfitItem>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LifecycleSummary {
    pub item_id: ClothingItemId,
    pub durability_score: f64,
    pub cost_per_wear: Decimal,
    pub wear_count: u32,
    pub last_worn_date: Option<DateTime<Utc>>,
    pub maintenance_count: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecordedWear {
    pub record: WearRecord,
    pub item: ClothingItem,
    pub estimated_damage: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReminderReport {
    pub window_days: u32,
    pub overdue: Vec<MaintenanceReminder>,
    pub upcoming: Vec<MaintenanceReminder>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MaintenanceCosts {
    pub total_cost: Decimal,
    pub record_count: usize,
    pub by_type: BTreeMap<String, Decimal>,
}

#[derive(Clone)]
pub struct WardrobeService {
    repositories: Repositories,
    scorer: DurabilityScorer,
    engine: RecommendationEngine,
}

impl WardrobeService {
    pub fn new(repositories: Repositories, scorer: DurabilityScorer) -> Self {
        Self { repositories, scorer, engine: RecommendationEngine::new() }
    }

    async fn hierarchy(&self) -> ServiceResult<CategoryHierarchy> {
        Ok(CategoryHierarchy::new(self.repositories.categories.list_all().await?))
    }

    async fn require_active_category(&self, id: &CategoryId) -> ServiceResult<()> {
        let category = self.repositories.categories.find_by_id(id).await?;
        if !category.is_some_and(|category| category.is_active) {
            return Err(DomainError::InvalidInput(format!(
                "category `{}` does not exist or is inactive",
                id.0
            ))
            .into());
        }
        Ok(())
    }

    pub async fn category_tree(&self) -> ServiceResult<Vec<CategoryNode>> {
        Ok(self.hierarchy().await?.build_tree())
    }

    pub async fn create_category(&self, input: NewCategory) -> ServiceResult<Category> {
        let name = required_text(&input.name, "category name")?;
        self.hierarchy().await?.validate_parent(input.parent_id.as_ref())?;

        let mut category = Category::new(
            CategoryId(Uuid::new_v4().to_string()),
            name,
            input.parent_id,
            input.sort_order.unwrap_or(0),
        );
        category.description = input.description;
        self.repositories.categories.save(category.clone()).await?;

        info!(
            event_name = "catalog.category.created",
            category_id = %category.id.0,
            parent_id = category.parent_id.as_ref().map(|id| id.0.as_str()).unwrap_or("root"),
            "category created"
        );
        Ok(category)
    }

    pub async fn update_category(
        &self,
        id: &CategoryId,
        changes: CategoryChanges,
    ) -> ServiceResult<Category> {
        let mut hierarchy = self.hierarchy().await?;
        let mut category = match changes.parent_id {
            Some(parent_id) => hierarchy.move_category(id, Some(parent_id), Utc::now())?,
            None => hierarchy
                .get(id)
                .cloned()
                .ok_or_else(|| DomainError::not_found("category", id.0.clone()))?,
        };

        if let Some(name) = changes.name {
            category.name = required_text(&name, "category name")?.to_string();
        }
        if let Some(description) = changes.description {
            category.description = Some(description);
        }
        if let Some(sort_order) = changes.sort_order {
            category.sort_order = sort_order;
        }
        category.updated_at = Utc::now();

        self.repositories.categories.save(category.clone()).await?;
        Ok(category)
    }

    pub async fn category_path(&self, id: &CategoryId) -> ServiceResult<String> {
        self.hierarchy()
            .await?
            .resolve_path(id)
            .ok_or_else(|| DomainError::not_found("category", id.0.clone()).into())
    }

    pub async fn move_category(
        &self,
        id: &CategoryId,
        new_parent_id: Option<CategoryId>,
    ) -> ServiceResult<Category> {
        let mut hierarchy = self.hierarchy().await?;
        let moved = hierarchy.move_category(id, new_parent_id, Utc::now())?;
        self.repositories.categories.save(moved.clone()).await?;

        info!(
            event_name = "catalog.category.moved",
            category_id = %moved.id.0,
            parent_id = moved.parent_id.as_ref().map(|id| id.0.as_str()).unwrap_or("root"),
            "category moved"
        );
        Ok(moved)
    }

    pub async fn delete_category(&self, id: &CategoryId) -> ServiceResult<Category> {
        let counts = self.repositories.items.count_active_by_category(None).await?;
        let active_items = counts.get(id).copied().unwrap_or(0);

        let mut hierarchy = self.hierarchy().await?;
        let removed = hierarchy.deactivate(id, active_items, Utc::now())?;
        self.repositories.categories.save(removed.clone()).await?;

        info!(
            event_name = "catalog.category.deactivated",
            category_id = %id.0,
            "category deactivated"
        );
        Ok(removed)
    }

    pub async fn category_stats(
        &self,
        owner_id: Option<&OwnerId>,
    ) -> ServiceResult<Vec<CategoryStat>> {
        let counts = self.repositories.items.count_active_by_category(owner_id).await?;
        Ok(self.hierarchy().await?.stats(&counts))
    }

    pub async fn list_items(&self, owner_id: &OwnerId) -> ServiceResult<Vec<ClothingItem>> {
        Ok(self.repositories.items.list_by_owner(owner_id, ItemScope::Active).await?)
    }

    pub async fn create_item(
        &self,
        owner_id: OwnerId,
        input: NewClothingItem,
    ) -> ServiceResult<ClothingItem> {
        let name = required_text(&input.name, "item name")?.to_string();
        non_negative_money(input.price, "price")?;
        self.require_active_category(&input.category_id).await?;

        let now = Utc::now();
        let item = self.scorer.rescore(
            ClothingItem {
                id: ClothingItemId(Uuid::new_v4().to_string()),
                owner_id,
                category_id: input.category_id,
                name,
                brand: input.brand,
                color: input.color,
                material: input.material,
                price: input.price,
                purchase_date: input.purchase_date,
                wear_count: 0,
                durability_score: MAX_DURABILITY,
                last_worn_date: None,
                notes: input.notes,
                is_favorite: input.is_favorite,
                is_active: true,
                created_at: now,
                updated_at: now,
            },
            0,
            now,
        );
        self.repositories.items.save(item.clone()).await?;

        info!(
            event_name = "wardrobe.item.created",
            owner_id = %item.owner_id.0,
            item_id = %item.id.0,
            durability_score = item.durability_score,
            "clothing item created"
        );
        Ok(item)
    }

    /// Active item owned by `owner_id`. Foreign and deactivated items are reported as missing.
    pub async fn item(
        &self,
        owner_id: &OwnerId,
        item_id: &ClothingItemId,
    ) -> ServiceResult<ClothingItem> {
        match self.repositories.items.find_by_id(item_id).await? {
            Some(item) if item.belongs_to(owner_id) && item.is_active => Ok(item),
            _ => Err(DomainError::not_found("clothing item", item_id.0.clone()).into()),
        }
    }

    pub async fn delete_item(
        &self,
        owner_id: &OwnerId,
        item_id: &ClothingItemId,
    ) -> ServiceResult<ClothingItem> {
        let mut item = self.item(owner_id, item_id).await?;
        item.deactivate(Utc::now());
        self.repositories.items.save(item.clone()).await?;
        Ok(item)
    }

    /// Applies `changes` to an active item. A new category, material or purchase date changes
    /// the inputs of the durability score, so the item is rescored in the same write.
    pub async fn update_item(
        &self,
        owner_id: &OwnerId,
        item_id: &ClothingItemId,
        changes: ItemChanges,
    ) -> ServiceResult<ClothingItem> {
        let mut item = self.item(owner_id, item_id).await?;
        let mut rescore = false;

        if let Some(category_id) = changes.category_id {
            if category_id != item.category_id {
                self.require_active_category(&category_id).await?;
                item.category_id = category_id;
                rescore = true;
            }
        }
        if let Some(name) = changes.name {
            item.name = required_text(&name, "item name")?.to_string();
        }
        if let Some(brand) = changes.brand {
            item.brand = brand;
        }
        if let Some(color) = changes.color {
            item.color = color;
        }
        if let Some(material) = changes.material {
            rescore |= material != item.material;
            item.material = material;
        }
        if let Some(price) = changes.price {
            non_negative_money(price, "price")?;
            item.price = price;
        }
        if let Some(purchase_date) = changes.purchase_date {
            rescore |= item.purchase_date != Some(purchase_date);
            item.purchase_date = Some(purchase_date);
        }
        if let Some(notes) = changes.notes {
            item.notes = Some(notes);
        }
        if let Some(is_favorite) = changes.is_favorite {
            item.is_favorite = is_favorite;
        }
        item.updated_at = Utc::now();

        let scorer = rescore.then_some(&self.scorer);
        let updated = self.repositories.items.update_details(&item, scorer).await?;

        info!(
            event_name = "wardrobe.item.updated",
            owner_id = %owner_id.0,
            item_id = %updated.id.0,
            rescored = rescore,
            durability_score = updated.durability_score,
            "clothing item updated"
        );
        Ok(updated)
    }

    pub async fn toggle_favorite(
        &self,
        owner_id: &OwnerId,
        item_id: &ClothingItemId,
    ) -> ServiceResult<ClothingItem> {
        let mut item = self.item(owner_id, item_id).await?;
        item.is_favorite = !item.is_favorite;
        item.updated_at = Utc::now();
        Ok(self.repositories.items.update_details(&item, None).await?)
    }

    pub async fn favorites(&self, owner_id: &OwnerId) -> ServiceResult<Vec<ClothingItem>> {
        Ok(self.repositories.items.list_by_owner(owner_id, ItemScope::Favorites).await?)
    }

    pub async fn lifecycle(
        &self,
        owner_id: &OwnerId,
        item_id: &ClothingItemId,
    ) -> ServiceResult<LifecycleSummary> {
        let item = self.item(owner_id, item_id).await?;
        let maintenance_count = self.repositories.maintenance.count_for_item(item_id).await?;
        let today = Utc::now().date_naive();

        Ok(LifecycleSummary {
            item_id: item.id.clone(),
            durability_score: self.scorer.compute_durability(&item, maintenance_count, today),
            cost_per_wear: self.scorer.cost_per_wear(&item),
            wear_count: item.wear_count,
            last_worn_date: item.last_worn_date,
            maintenance_count,
        })
    }

    pub async fn record_wear(
        &self,
        owner_id: &OwnerId,
        item_id: &ClothingItemId,
        input: NewWear,
    ) -> ServiceResult<RecordedWear> {
        let intensity = match input.intensity.as_deref() {
            Some(raw) => raw.parse::<WearIntensity>()?,
            None => WearIntensity::default(),
        };
        if let Some(hours) = input.duration_hours {
            if !hours.is_finite() || hours < 0.0 {
                return Err(DomainError::InvalidInput(format!(
                    "duration_hours must be a non-negative number, got {hours}"
                ))
                .into());
            }
        }

        let now = Utc::now();
        let record = WearRecord {
            id: WearRecordId(Uuid::new_v4().to_string()),
            clothing_item_id: item_id.clone(),
            wear_date: input.wear_date.unwrap_or(now),
            notes: input.notes,
            duration_hours: input.duration_hours,
            intensity,
            created_at: now,
        };
        let item =
            self.repositories.wears.record_wear(owner_id, record.clone(), &self.scorer).await?;
        let estimated_damage = self.scorer.wear_damage(&record);

        Ok(RecordedWear { record, item, estimated_damage })
    }

    pub async fn wear_history(
        &self,
        owner_id: &OwnerId,
        item_id: &ClothingItemId,
    ) -> ServiceResult<Vec<WearRecord>> {
        self.item(owner_id, item_id).await?;
        Ok(self.repositories.wears.list_for_item(item_id).await?)
    }

    pub async fn wear_stats(&self, owner_id: &OwnerId) -> ServiceResult<WearStats> {
        let records = self.repositories.wears.list_for_owner(owner_id).await?;
        // retired items keep their wear history and category
        let items = self.repositories.items.list_by_owner(owner_id, ItemScope::All).await?;
        let hierarchy = self.hierarchy().await?;
        Ok(lifecycle::wear_stats(&records, &items, &hierarchy))
    }

    pub async fn add_maintenance(
        &self,
        owner_id: &OwnerId,
        item_id: &ClothingItemId,
        input: NewMaintenance,
    ) -> ServiceResult<MaintenanceRecord> {
        let item = self.item(owner_id, item_id).await?;
        let maintenance_type = input.maintenance_type.parse::<MaintenanceType>()?;
        non_negative_money(input.cost, "cost")?;
        validate_effectiveness(input.effectiveness_score)?;

        let now = Utc::now();
        let performed_on = input.maintenance_date.unwrap_or_else(|| now.date_naive());
        let record = self.scorer.schedule(MaintenanceRecord {
            id: MaintenanceRecordId(Uuid::new_v4().to_string()),
            clothing_item_id: item.id,
            maintenance_type,
            cost: input.cost,
            maintenance_date: performed_on,
            effectiveness_score: input.effectiveness_score,
            next_maintenance_date: performed_on,
            service_provider: input.service_provider,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        });

        self.repositories.maintenance.save_and_rescore(record.clone(), &self.scorer).await?;
        Ok(record)
    }

    pub async fn update_maintenance(
        &self,
        owner_id: &OwnerId,
        record_id: &MaintenanceRecordId,
        changes: MaintenanceChanges,
    ) -> ServiceResult<MaintenanceRecord> {
        let mut record = self
            .repositories
            .maintenance
            .find_by_id(record_id)
            .await?
            .ok_or_else(|| DomainError::not_found("maintenance record", record_id.0.clone()))?;
        // records of another owner's items are reported as missing
        let item = self.repositories.items.find_by_id(&record.clothing_item_id).await?;
        if !item.is_some_and(|item| item.belongs_to(owner_id) && item.is_active) {
            return Err(DomainError::not_found("maintenance record", record_id.0.clone()).into());
        }

        if let Some(raw) = changes.maintenance_type {
            record.maintenance_type = raw.parse()?;
        }
        if let Some(cost) = changes.cost {
            non_negative_money(cost, "cost")?;
            record.cost = cost;
        }
        if let Some(performed_on) = changes.maintenance_date {
            record.maintenance_date = performed_on;
        }
        if changes.effectiveness_score.is_some() {
            validate_effectiveness(changes.effectiveness_score)?;
            record.effectiveness_score = changes.effectiveness_score;
        }
        if let Some(provider) = changes.service_provider {
            record.service_provider = Some(provider);
        }
        if let Some(notes) = changes.notes {
            record.notes = Some(notes);
        }
        record.updated_at = Utc::now();
        let record = self.scorer.schedule(record);

        self.repositories.maintenance.save_and_rescore(record.clone(), &self.scorer).await?;
        Ok(record)
    }

    pub async fn maintenance_history(
        &self,
        owner_id: &OwnerId,
        item_id: &ClothingItemId,
    ) -> ServiceResult<Vec<MaintenanceRecord>> {
        self.item(owner_id, item_id).await?;
        Ok(self.repositories.maintenance.list_for_item(item_id).await?)
    }

    pub async fn maintenance_reminders(
        &self,
        owner_id: &OwnerId,
        window_days: u32,
        today: NaiveDate,
    ) -> ServiceResult<ReminderReport> {
        let records = self.repositories.maintenance.list_for_owner(owner_id).await?;
        let names: HashMap<ClothingItemId, String> = self
            .repositories
            .items
            .list_by_owner(owner_id, ItemScope::Active)
            .await?
            .into_iter()
            .map(|item| (item.id, item.name))
            .collect();

        let mut report = ReminderReport { window_days, overdue: Vec::new(), upcoming: Vec::new() };
        for record in lifecycle::latest_per_item_and_type(&records) {
            let name = names.get(&record.clothing_item_id).map(String::as_str).unwrap_or_default();
            if lifecycle::is_overdue(record, today) {
                report.overdue.push(lifecycle::build_reminder(record, name, today));
            } else if lifecycle::is_upcoming(record, today, window_days) {
                report.upcoming.push(lifecycle::build_reminder(record, name, today));
            }
        }
        Ok(report)
    }

    pub async fn maintenance_costs(&self, owner_id: &OwnerId) -> ServiceResult<MaintenanceCosts> {
        let records = self.repositories.maintenance.list_for_owner(owner_id).await?;
        let by_type = lifecycle::cost_by_type(&records);
        Ok(MaintenanceCosts {
            total_cost: by_type.values().copied().sum(),
            record_count: records.len(),
            by_type,
        })
    }

    pub async fn add_purchase(
        &self,
        owner_id: &OwnerId,
        item_id: &ClothingItemId,
        input: NewPurchase,
    ) -> ServiceResult<PurchaseRecord> {
        let item = self.item(owner_id, item_id).await?;
        validate_prices(input.purchase_price, input.original_price)?;
        if self.repositories.purchases.find_by_item(item_id).await?.is_some() {
            return Err(DomainError::InvalidOperation(format!(
                "clothing item `{}` already has a purchase record",
                item_id.0
            ))
            .into());
        }

        let now = Utc::now();
        let record = PurchaseRecord {
            id: PurchaseRecordId(Uuid::new_v4().to_string()),
            clothing_item_id: item.id,
            purchase_price: input.purchase_price,
            original_price: input.original_price,
            discount_percent: Decimal::ZERO,
            store_name: input.store_name,
            online_store: input.online_store,
            order_number: input.order_number,
            payment_method: input.payment_method,
            currency: currency_code(input.currency.as_deref())?,
            purchase_date: input
                .purchase_date
                .or(item.purchase_date)
                .unwrap_or_else(|| now.date_naive()),
            warranty_months: input.warranty_months,
            warranty_expiry: None,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        }
        .refresh();
        self.repositories.purchases.insert(record.clone()).await?;

        info!(
            event_name = "wardrobe.purchase.recorded",
            owner_id = %owner_id.0,
            item_id = %record.clothing_item_id.0,
            purchase_id = %record.id.0,
            purchase_price = %record.purchase_price,
            "purchase recorded"
        );
        Ok(record)
    }

    /// Purchase record of one of the owner's items, retired items included.
    pub async fn purchase(
        &self,
        owner_id: &OwnerId,
        record_id: &PurchaseRecordId,
    ) -> ServiceResult<PurchaseRecord> {
        let missing = || DomainError::not_found("purchase record", record_id.0.clone());
        let record =
            self.repositories.purchases.find_by_id(record_id).await?.ok_or_else(missing)?;
        let item = self.repositories.items.find_by_id(&record.clothing_item_id).await?;
        if !item.is_some_and(|item| item.belongs_to(owner_id)) {
            return Err(missing().into());
        }
        Ok(record)
    }

    pub async fn item_purchase(
        &self,
        owner_id: &OwnerId,
        item_id: &ClothingItemId,
    ) -> ServiceResult<PurchaseRecord> {
        self.item(owner_id, item_id).await?;
        self.repositories
            .purchases
            .find_by_item(item_id)
            .await?
            .ok_or_else(|| DomainError::not_found("purchase record", item_id.0.clone()).into())
    }

    pub async fn purchases(
        &self,
        owner_id: &OwnerId,
        filter: PurchaseFilter,
    ) -> ServiceResult<Vec<PurchaseRecord>> {
        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            if from > to {
                return Err(DomainError::InvalidInput(format!(
                    "date range starts after it ends: {from} > {to}"
                ))
                .into());
            }
        }
        let records = self.repositories.purchases.list_for_owner(owner_id).await?;
        Ok(records.into_iter().filter(|record| filter.matches(record)).collect())
    }

    pub async fn update_purchase(
        &self,
        owner_id: &OwnerId,
        record_id: &PurchaseRecordId,
        changes: PurchaseChanges,
    ) -> ServiceResult<PurchaseRecord> {
        let mut record = self.purchase(owner_id, record_id).await?;

        if let Some(price) = changes.purchase_price {
            record.purchase_price = price;
        }
        if changes.original_price.is_some() {
            record.original_price = changes.original_price;
        }
        validate_prices(record.purchase_price, record.original_price)?;
        if let Some(store_name) = changes.store_name {
            record.store_name = Some(store_name);
        }
        if let Some(online_store) = changes.online_store {
            record.online_store = Some(online_store);
        }
        if let Some(order_number) = changes.order_number {
            record.order_number = Some(order_number);
        }
        if let Some(payment_method) = changes.payment_method {
            record.payment_method = Some(payment_method);
        }
        if let Some(currency) = changes.currency {
            record.currency = currency_code(Some(&currency))?;
        }
        if let Some(purchase_date) = changes.purchase_date {
            record.purchase_date = purchase_date;
        }
        if changes.warranty_months.is_some() {
            record.warranty_months = changes.warranty_months;
        }
        if let Some(notes) = changes.notes {
            record.notes = Some(notes);
        }
        record.updated_at = Utc::now();
        let record = record.refresh();

        self.repositories.purchases.update(record.clone()).await?;
        Ok(record)
    }

    pub async fn delete_purchase(
        &self,
        owner_id: &OwnerId,
        record_id: &PurchaseRecordId,
    ) -> ServiceResult<PurchaseRecord> {
        let record = self.purchase(owner_id, record_id).await?;
        self.repositories.purchases.delete(record_id).await?;

        info!(
            event_name = "wardrobe.purchase.deleted",
            owner_id = %owner_id.0,
            purchase_id = %record_id.0,
            "purchase deleted"
        );
        Ok(record)
    }

    /// Spending over every purchase of the owner, with the monthly breakdown for `year`
    /// (the current year when absent).
    pub async fn spending_stats(
        &self,
        owner_id: &OwnerId,
        year: Option<i32>,
    ) -> ServiceResult<SpendingStats> {
        let year = year.unwrap_or_else(|| Utc::now().year());
        let records = self.repositories.purchases.list_for_owner(owner_id).await?;
        let items = self.repositories.items.list_by_owner(owner_id, ItemScope::All).await?;
        let hierarchy = self.hierarchy().await?;
        Ok(lifecycle::spending_stats(&records, &items, &hierarchy, year))
    }

    pub async fn recommend(
        &self,
        owner_id: &OwnerId,
        weather: Option<&str>,
    ) -> ServiceResult<OutfitRecommendation> {
        let weather = weather
            .ok_or_else(|| DomainError::InvalidInput("weather is required".to_string()))?;
        let weather = weather.parse::<WeatherType>()?;
        let inventory =
            self.repositories.items.list_by_owner(owner_id, ItemScope::Active).await?;
        let hierarchy = self.hierarchy().await?;

        Ok(self.engine.recommend_for(&inventory, &hierarchy, weather, Utc::now())?)
    }

    pub async fn create_outfit(
        &self,
        owner_id: OwnerId,
        input: NewOutfit,
    ) -> ServiceResult<Outfit> {
        let weather = input.weather.as_deref().map(str::parse::<WeatherType>).transpose()?;

        let mut entries = Vec::with_capacity(input.items.len());
        for entry in input.items {
            let role = entry.role.as_deref().map(str::parse::<ItemRole>).transpose()?;
            let item = self
                .repositories
                .items
                .find_by_id(&entry.clothing_item_id)
                .await?
                .ok_or_else(|| {
                    DomainError::InvalidInput(format!(
                        "clothing item `{}` is not available to owner `{}`",
                        entry.clothing_item_id.0, owner_id.0
                    ))
                })?;
            entries.push((item, role));
        }

        let outfit =
            Outfit::compose(owner_id, &input.name, input.occasion, weather, entries, Utc::now())?;
        self.repositories.outfits.save(outfit.clone()).await?;

        info!(
            event_name = "wardrobe.outfit.created",
            owner_id = %outfit.owner_id.0,
            outfit_id = %outfit.id.0,
            item_count = outfit.items.len(),
            "outfit saved"
        );
        Ok(outfit)
    }

    pub async fn rate_outfit(
        &self,
        owner_id: &OwnerId,
        outfit_id: &OutfitId,
        rating: u8,
    ) -> ServiceResult<Outfit> {
        let mut outfit = match self.repositories.outfits.find_by_id(outfit_id).await? {
            Some(outfit) if &outfit.owner_id == owner_id => outfit,
            _ => return Err(DomainError::not_found("outfit", outfit_id.0.clone()).into()),
        };
        outfit.rate(rating, Utc::now())?;
        self.repositories.outfits.save(outfit.clone()).await?;
        Ok(outfit)
    }

    pub async fn list_outfits(&self, owner_id: &OwnerId) -> ServiceResult<Vec<Outfit>> {
        Ok(self.repositories.outfits.list_by_owner(owner_id).await?)
    }
}

fn required_text<'a>(value: &'a str, field: &str) -> Result<&'a str, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(trimmed)
}

fn non_negative_money(amount: Decimal, field: &str) -> Result<(), DomainError> {
    if amount < Decimal::ZERO {
        return Err(DomainError::InvalidInput(format!("{field} must not be negative")));
    }
    Ok(())
}

fn validate_prices(
    purchase_price: Decimal,
    original_price: Option<Decimal>,
) -> Result<(), DomainError> {
    non_negative_money(purchase_price, "purchase_price")?;
    if let Some(original_price) = original_price {
        non_negative_money(original_price, "original_price")?;
    }
    Ok(())
}

/// Three-letter currency code, upper-cased; absent or blank means the default currency.
fn currency_code(raw: Option<&str>) -> Result<String, DomainError> {
    let code = raw.map(str::trim).filter(|code| !code.is_empty()).unwrap_or(DEFAULT_CURRENCY);
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(DomainError::InvalidInput(format!(
            "currency must be a three-letter code, got `{code}`"
        )));
    }
    Ok(code.to_ascii_uppercase())
}

fn validate_effectiveness(score: Option<u8>) -> Result<(), DomainError> {
    match score {
        Some(score) if !(1..=10).contains(&score) => Err(DomainError::InvalidInput(format!(
            "effectiveness_score must be between 1 and 10, got {score}"
        ))),
        _ => Ok(()),
    }
}
