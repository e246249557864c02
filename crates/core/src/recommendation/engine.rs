use chrono::{DateTime, Utc};
use tracing::debug;

use super::strategy::{rules_for, weather_profile};
use super::{RecommendationResult, DEFAULT_OCCASION, NO_MATCH_REASON};
use crate::catalog::CategoryHierarchy;
use crate::domain::clothing::ClothingItem;
use crate::domain::outfit::{OutfitRecommendation, RecommendedItem, WeatherInfo, WeatherType};
use crate::errors::DomainError;
use crate::lifecycle::scorer::round2;

/// Stateless: every call builds its answer from the inventory and categories it is handed.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationEngine;

impl RecommendationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Validates a raw weather value and recommends for it.
    pub fn recommend(
        &self,
        inventory: &[ClothingItem],
        categories: &CategoryHierarchy,
        weather: &str,
    ) -> RecommendationResult {
        let weather = weather.parse::<WeatherType>()?;
        self.recommend_for(inventory, categories, weather, Utc::now())
    }

    pub fn recommend_for(
        &self,
        inventory: &[ClothingItem],
        categories: &CategoryHierarchy,
        weather: WeatherType,
        now: DateTime<Utc>,
    ) -> RecommendationResult {
        if inventory.is_empty() {
            return Err(DomainError::EmptyInventory);
        }

        let mut recommended_items = Vec::new();
        for rule in rules_for(weather) {
            // first match in input order wins; no ranking beyond that
            let candidate = inventory.iter().find(|item| {
                categories.name_of(&item.category_id) == Some(rule.category_name)
            });
            let Some(item) = candidate else {
                continue;
            };

            recommended_items.push(RecommendedItem {
                item_id: item.id.clone(),
                name: item.name.clone(),
                brand: item.brand.clone(),
                color: item.color.clone(),
                category_name: rule.category_name.to_string(),
                position: rule.position,
                layer: rule.layer,
                confidence: rule.confidence,
                reason: rule.reason.to_string(),
            });
        }

        let profile = weather_profile(weather);
        let confidence = overall_confidence(&recommended_items);
        let reason = if recommended_items.is_empty() {
            NO_MATCH_REASON.to_string()
        } else {
            format!(
                "基于{}的天气条件，为您推荐了{}件单品的搭配方案",
                profile.description,
                recommended_items.len()
            )
        };

        debug!(
            event_name = "recommendation.generated",
            weather = %weather,
            inventory_size = inventory.len(),
            recommended = recommended_items.len(),
            confidence,
            "outfit recommendation generated"
        );

        Ok(OutfitRecommendation {
            recommended_items,
            weather_summary: WeatherInfo {
                temperature: profile.temperature,
                condition: weather,
                description: profile.description.to_string(),
            },
            occasion: DEFAULT_OCCASION.to_string(),
            confidence,
            reason,
            created_at: now,
        })
    }
}

fn overall_confidence(items: &[RecommendedItem]) -> f64 {
    if items.is_empty() {
        return 0.0;
    }
    let total: f64 = items.iter().map(|item| item.confidence).sum();
    round2(total / items.len() as f64)
}
