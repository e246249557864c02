use std::collections::HashMap;

use crate::config::LifecycleConfig;
use crate::domain::category::CategoryId;
use crate::domain::maintenance::MaintenanceType;

pub const DEFAULT_WEAR_RATE: f64 = 1.0;
pub const DEFAULT_TIME_DAMAGE_PER_YEAR: f64 = 5.0;
pub const DEFAULT_MATERIAL_FACTOR: f64 = 1.0;
pub const DEFAULT_MAINTENANCE_OFFSET_DAYS: u64 = 90;

/// Material multipliers, keyed by lower-cased material name. Chinese and English names
/// share a factor.
const MATERIAL_FACTORS: &[(&str, f64)] = &[
    ("真皮", 1.2),
    ("leather", 1.2),
    ("羊毛", 1.1),
    ("wool", 1.1),
    ("棉", 1.0),
    ("cotton", 1.0),
    ("聚酯纤维", 0.9),
    ("polyester", 0.9),
    ("尼龙", 1.1),
    ("nylon", 1.1),
    ("丝绸", 0.8),
    ("silk", 0.8),
    ("麻", 1.0),
    ("linen", 1.0),
];

const MAINTENANCE_OFFSET_DAYS: &[(MaintenanceType, u64)] = &[
    (MaintenanceType::Washing, 30),
    (MaintenanceType::DryCleaning, 90),
    (MaintenanceType::Repair, 180),
    (MaintenanceType::Polishing, 60),
    (MaintenanceType::Waterproof, 365),
    (MaintenanceType::Storage, 180),
];

const MAINTENANCE_EFFECTS: &[(MaintenanceType, f64)] = &[
    (MaintenanceType::Washing, 2.0),
    (MaintenanceType::DryCleaning, 3.0),
    (MaintenanceType::Repair, 5.0),
    (MaintenanceType::Polishing, 2.5),
    (MaintenanceType::Waterproof, 1.5),
    (MaintenanceType::Storage, 1.0),
    (MaintenanceType::Other, 1.5),
];

/// Lookup tables consumed by the durability scorer. Every lookup falls back to a documented
/// default instead of failing.
#[derive(Clone, Debug, PartialEq)]
pub struct DurabilityTables {
    pub material_factors: HashMap<String, f64>,
    pub wear_rates: HashMap<CategoryId, f64>,
    pub default_wear_rate: f64,
    pub time_damage_per_year: f64,
    pub maintenance_bonus_per_event: f64,
    pub maintenance_offsets: HashMap<MaintenanceType, u64>,
    pub maintenance_effects: HashMap<MaintenanceType, f64>,
}

impl Default for DurabilityTables {
    fn default() -> Self {
        Self {
            material_factors: MATERIAL_FACTORS
                .iter()
                .map(|(material, factor)| ((*material).to_string(), *factor))
                .collect(),
            wear_rates: HashMap::new(),
            default_wear_rate: DEFAULT_WEAR_RATE,
            time_damage_per_year: DEFAULT_TIME_DAMAGE_PER_YEAR,
            maintenance_bonus_per_event: 0.0,
            maintenance_offsets: MAINTENANCE_OFFSET_DAYS.iter().copied().collect(),
            maintenance_effects: MAINTENANCE_EFFECTS.iter().copied().collect(),
        }
    }
}

impl DurabilityTables {
    pub fn from_config(config: &LifecycleConfig) -> Self {
        let mut tables = Self {
            default_wear_rate: config.default_wear_rate,
            time_damage_per_year: config.time_damage_per_year,
            maintenance_bonus_per_event: config.maintenance_bonus_per_event,
            ..Self::default()
        };
        for (material, factor) in &config.material_factors {
            tables = tables.with_material_factor(material, *factor);
        }
        for (category_id, rate) in &config.category_wear_rates {
            tables = tables.with_wear_rate(CategoryId(category_id.clone()), *rate);
        }
        tables
    }

    pub fn with_material_factor(mut self, material: &str, factor: f64) -> Self {
        self.material_factors.insert(normalize_material(material), factor);
        self
    }

    pub fn with_wear_rate(mut self, category_id: CategoryId, rate: f64) -> Self {
        self.wear_rates.insert(category_id, rate);
        self
    }

    pub fn material_factor(&self, material: &str) -> f64 {
        self.material_factors
            .get(&normalize_material(material))
            .copied()
            .filter(|factor| factor.is_finite())
            .unwrap_or(DEFAULT_MATERIAL_FACTOR)
            .max(0.0)
    }

    pub fn wear_rate(&self, category_id: &CategoryId) -> f64 {
        self.wear_rates
            .get(category_id)
            .copied()
            .unwrap_or(self.default_wear_rate)
            .max(0.0)
    }

    pub fn maintenance_offset_days(&self, maintenance_type: MaintenanceType) -> u64 {
        self.maintenance_offsets
            .get(&maintenance_type)
            .copied()
            .unwrap_or(DEFAULT_MAINTENANCE_OFFSET_DAYS)
    }

    /// Relative benefit of a maintenance event, scaled by an optional 1..=10 effectiveness score.
    pub fn maintenance_effect(
        &self,
        maintenance_type: MaintenanceType,
        effectiveness_score: Option<u8>,
    ) -> f64 {
        let base = self.maintenance_effects.get(&maintenance_type).copied().unwrap_or(1.0);
        match effectiveness_score {
            Some(score) if score > 0 => base * f64::from(score.min(10)) / 10.0,
            _ => base,
        }
    }
}

fn normalize_material(material: &str) -> String {
    material.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::DurabilityTables;
    use crate::config::LifecycleConfig;
    use crate::domain::category::CategoryId;
    use crate::domain::maintenance::MaintenanceType;

    #[test]
    fn material_lookup_is_case_and_whitespace_insensitive() {
        let tables = DurabilityTables::default();
        assert_eq!(tables.material_factor(" Leather "), 1.2);
        assert_eq!(tables.material_factor("丝绸"), 0.8);
        assert_eq!(tables.material_factor("unobtainium"), 1.0);
    }

    #[test]
    fn unknown_maintenance_type_uses_ninety_days() {
        let tables = DurabilityTables::default();
        assert_eq!(tables.maintenance_offset_days(MaintenanceType::Washing), 30);
        assert_eq!(tables.maintenance_offset_days(MaintenanceType::Waterproof), 365);
        assert_eq!(tables.maintenance_offset_days(MaintenanceType::Other), 90);
    }

    #[test]
    fn maintenance_effect_scales_with_effectiveness() {
        let tables = DurabilityTables::default();
        assert_eq!(tables.maintenance_effect(MaintenanceType::Repair, None), 5.0);
        assert_eq!(tables.maintenance_effect(MaintenanceType::Repair, Some(0)), 5.0);
        assert_eq!(tables.maintenance_effect(MaintenanceType::Repair, Some(5)), 2.5);
    }

    #[test]
    fn config_overrides_layer_on_top_of_defaults() {
        let mut config = LifecycleConfig::default();
        config.default_wear_rate = 0.5;
        config.material_factors.insert("Denim".to_string(), 1.15);
        config.category_wear_rates.insert("cat-shoes".to_string(), 2.0);

        let tables = DurabilityTables::from_config(&config);
        assert_eq!(tables.material_factor("denim"), 1.15);
        assert_eq!(tables.material_factor("wool"), 1.1);
        assert_eq!(tables.wear_rate(&CategoryId("cat-shoes".to_string())), 2.0);
        assert_eq!(tables.wear_rate(&CategoryId("cat-tops".to_string())), 0.5);
    }

    #[test]
    fn negative_rates_are_floored_at_zero() {
        let tables = DurabilityTables::default()
            .with_wear_rate(CategoryId("odd".to_string()), -3.0)
            .with_material_factor("void", -1.0);
        assert_eq!(tables.wear_rate(&CategoryId("odd".to_string())), 0.0);
        assert_eq!(tables.material_factor("void"), 0.0);
    }
}
