use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::clothing::{ClothingItem, ClothingItemId, OwnerId};
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherType {
    Sunny,
    Rainy,
    Cloudy,
    Snowy,
    Foggy,
    Windy,
}

impl WeatherType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sunny => "sunny",
            Self::Rainy => "rainy",
            Self::Cloudy => "cloudy",
            Self::Snowy => "snowy",
            Self::Foggy => "foggy",
            Self::Windy => "windy",
        }
    }
}

impl fmt::Display for WeatherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeatherType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sunny" => Ok(Self::Sunny),
            "rainy" => Ok(Self::Rainy),
            "cloudy" => Ok(Self::Cloudy),
            "snowy" => Ok(Self::Snowy),
            "foggy" => Ok(Self::Foggy),
            "windy" => Ok(Self::Windy),
            other => Err(DomainError::InvalidInput(format!(
                "unsupported weather `{other}` (expected sunny|rainy|cloudy|snowy|foggy|windy)"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Top,
    Bottom,
    Outer,
    Inner,
    Shoes,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecommendedItem {
    #[serde(rename = "id")]
    pub item_id: ClothingItemId,
    pub name: String,
    pub brand: String,
    pub color: String,
    pub category_name: String,
    pub position: Position,
    pub layer: u8,
    pub confidence: f64,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherInfo {
    pub temperature: i32,
    pub condition: WeatherType,
    pub description: String,
}

/// Generated per request and never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutfitRecommendation {
    pub recommended_items: Vec<RecommendedItem>,
    pub weather_summary: WeatherInfo,
    pub occasion: String,
    pub confidence: f64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutfitId(pub String);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemRole {
    #[default]
    Main,
    Accent,
    Base,
    Outer,
    Inner,
    Bottom,
    Shoes,
    Accessory,
}

impl ItemRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Accent => "accent",
            Self::Base => "base",
            Self::Outer => "outer",
            Self::Inner => "inner",
            Self::Bottom => "bottom",
            Self::Shoes => "shoes",
            Self::Accessory => "accessory",
        }
    }
}

impl FromStr for ItemRole {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "main" => Ok(Self::Main),
            "accent" => Ok(Self::Accent),
            "base" => Ok(Self::Base),
            "outer" => Ok(Self::Outer),
            "inner" => Ok(Self::Inner),
            "bottom" => Ok(Self::Bottom),
            "shoes" => Ok(Self::Shoes),
            "accessory" => Ok(Self::Accessory),
            other => Err(DomainError::InvalidInput(format!("unsupported item role `{other}`"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutfitItem {
    pub clothing_item_id: ClothingItemId,
    pub role: ItemRole,
    pub layer_order: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outfit {
    pub id: OutfitId,
    pub owner_id: OwnerId,
    pub name: String,
    pub occasion: Option<String>,
    pub weather: Option<WeatherType>,
    pub items: Vec<OutfitItem>,
    pub rating: Option<u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Outfit {
    /// Assembles a saved outfit from items the owner already holds. Items keep the order they
    /// were given in, which becomes their layer order starting at 1.
    pub fn compose(
        owner_id: OwnerId,
        name: &str,
        occasion: Option<String>,
        weather: Option<WeatherType>,
        entries: Vec<(ClothingItem, Option<ItemRole>)>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::InvalidInput("outfit name must not be empty".to_string()));
        }
        if entries.is_empty() {
            return Err(DomainError::InvalidInput(
                "an outfit needs at least one clothing item".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let mut items = Vec::with_capacity(entries.len());
        for (index, (item, role)) in entries.into_iter().enumerate() {
            if !item.belongs_to(&owner_id) || !item.is_active {
                return Err(DomainError::InvalidInput(format!(
                    "clothing item `{}` is not available to owner `{}`",
                    item.id.0, owner_id.0
                )));
            }
            if !seen.insert(item.id.0.clone()) {
                return Err(DomainError::InvalidInput(format!(
                    "clothing item `{}` appears more than once",
                    item.id.0
                )));
            }
            items.push(OutfitItem {
                clothing_item_id: item.id,
                role: role.unwrap_or_default(),
                layer_order: index as u32 + 1,
            });
        }

        Ok(Self {
            id: OutfitId(Uuid::new_v4().to_string()),
            owner_id,
            name: name.to_string(),
            occasion,
            weather,
            items,
            rating: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn rate(&mut self, rating: u8, now: DateTime<Utc>) -> Result<(), DomainError> {
        if !(1..=5).contains(&rating) {
            return Err(DomainError::InvalidInput(format!(
                "rating must be between 1 and 5, got {rating}"
            )));
        }
        self.rating = Some(rating);
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::{ItemRole, Outfit, WeatherType};
    use crate::domain::category::CategoryId;
    use crate::domain::clothing::{ClothingItem, ClothingItemId, OwnerId};
    use crate::errors::DomainError;

    fn item(id: &str, owner: &str) -> ClothingItem {
        let now = Utc::now();
        ClothingItem {
            id: ClothingItemId(id.to_string()),
            owner_id: OwnerId(owner.to_string()),
            category_id: CategoryId("cat-tops".to_string()),
            name: format!("item {id}"),
            brand: "Uniqlo".to_string(),
            color: "navy".to_string(),
            material: "棉".to_string(),
            price: Decimal::new(9900, 2),
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

    #[test]
    fn weather_parsing_rejects_unknown_values() {
        assert_eq!(" Rainy ".parse::<WeatherType>(), Ok(WeatherType::Rainy));
        assert!(matches!(
            "tornado".parse::<WeatherType>(),
            Err(DomainError::InvalidInput(message)) if message.contains("tornado")
        ));
    }

    #[test]
    fn compose_assigns_layer_order_and_default_role() {
        let owner = OwnerId("user-1".to_string());
        let outfit = Outfit::compose(
            owner,
            "office monday",
            Some("work".to_string()),
            None,
            vec![(item("a", "user-1"), None), (item("b", "user-1"), Some(ItemRole::Shoes))],
            Utc::now(),
        )
        .expect("compose");

        assert_eq!(outfit.items.len(), 2);
        assert_eq!(outfit.items[0].layer_order, 1);
        assert_eq!(outfit.items[0].role, ItemRole::Main);
        assert_eq!(outfit.items[1].layer_order, 2);
        assert_eq!(outfit.items[1].role, ItemRole::Shoes);
    }

    #[test]
    fn compose_rejects_items_owned_by_someone_else() {
        let result = Outfit::compose(
            OwnerId("user-1".to_string()),
            "borrowed",
            None,
            None,
            vec![(item("a", "user-2"), None)],
            Utc::now(),
        );

        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn compose_rejects_duplicates_and_empty_lists() {
        let owner = OwnerId("user-1".to_string());
        let duplicate = Outfit::compose(
            owner.clone(),
            "twice",
            None,
            None,
            vec![(item("a", "user-1"), None), (item("a", "user-1"), None)],
            Utc::now(),
        );
        assert!(matches!(duplicate, Err(DomainError::InvalidInput(_))));

        let empty = Outfit::compose(owner, "nothing", None, None, Vec::new(), Utc::now());
        assert!(matches!(empty, Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn rating_outside_one_to_five_is_rejected() {
        let mut outfit = Outfit::compose(
            OwnerId("user-1".to_string()),
            "weekend",
            None,
            Some(WeatherType::Sunny),
            vec![(item("a", "user-1"), None)],
            Utc::now(),
        )
        .expect("compose");

        assert!(matches!(outfit.rate(0, Utc::now()), Err(DomainError::InvalidInput(_))));
        assert!(matches!(outfit.rate(6, Utc::now()), Err(DomainError::InvalidInput(_))));
        outfit.rate(4, Utc::now()).expect("rate");
        assert_eq!(outfit.rating, Some(4));
    }

    #[test]
    fn recommended_item_serializes_wire_names() {
        let recommended = super::RecommendedItem {
            item_id: ClothingItemId("item-1".to_string()),
            name: "raincoat".to_string(),
            brand: "Uniqlo".to_string(),
            color: "navy".to_string(),
            category_name: "外套".to_string(),
            position: super::Position::Outer,
            layer: 2,
            confidence: 0.95,
            reason: "雨天需要防水外套".to_string(),
        };

        let json = serde_json::to_value(&recommended).expect("serialize");
        assert_eq!(json["id"], "item-1");
        assert_eq!(json["position"], "outer");
        assert!(json.get("item_id").is_none());
        assert_eq!(serde_json::to_value(WeatherType::Rainy).expect("serialize"), "rainy");
    }
}
