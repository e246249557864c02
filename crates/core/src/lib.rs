pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod lifecycle;
pub mod recommendation;

pub use catalog::{CategoryHierarchy, CategoryNode, CategoryStat};
pub use domain::category::{Category, CategoryId};
pub use domain::clothing::{ClothingItem, ClothingItemId, OwnerId};
pub use domain::maintenance::{
    MaintenanceRecord, MaintenanceRecordId, MaintenanceReminder, MaintenanceType,
    ReminderPriority,
};
pub use domain::outfit::{
    ItemRole, Outfit, OutfitId, OutfitItem, OutfitRecommendation, Position, RecommendedItem,
    WeatherInfo, WeatherType,
};
pub use domain::purchase::{PurchaseFilter, PurchaseRecord, PurchaseRecordId, SpendingStats};
pub use domain::wear::{WearIntensity, WearRecord, WearRecordId, WearStats};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use lifecycle::{DurabilityScorer, DurabilityTables};
pub use recommendation::RecommendationEngine;
