//! Weather-driven outfit recommendation.
//!
//! Selection is table driven: each weather value maps to an ordered list of category rules and
//! the first inventory item in each matching category is emitted.

mod engine;
mod strategy;

pub use engine::RecommendationEngine;
pub use strategy::{rules_for, weather_profile, StrategyRule, WeatherProfile};

use crate::domain::outfit::OutfitRecommendation;
use crate::errors::DomainError;

pub type RecommendationResult = Result<OutfitRecommendation, DomainError>;

/// Occasion attached to every generated recommendation.
pub const DEFAULT_OCCASION: &str = "日常";

/// Reason used when no inventory item matched the weather's rules.
pub const NO_MATCH_REASON: &str = "暂无合适的推荐";
