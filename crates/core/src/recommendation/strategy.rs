use crate::domain::outfit::{Position, WeatherType};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyRule {
    pub category_name: &'static str,
    pub position: Position,
    pub layer: u8,
    pub confidence: f64,
    pub reason: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherProfile {
    pub temperature: i32,
    pub description: &'static str,
}

const fn rule(
    category_name: &'static str,
    position: Position,
    layer: u8,
    confidence: f64,
    reason: &'static str,
) -> StrategyRule {
    StrategyRule { category_name, position, layer, confidence, reason }
}

const SUNNY_RULES: &[StrategyRule] = &[
    rule("上衣", Position::Top, 1, 0.9, "晴天适合轻薄透气的上衣"),
    rule("裤子", Position::Bottom, 1, 0.9, "晴天适合轻便的下装"),
    rule("鞋子", Position::Shoes, 1, 0.8, "晴天可选择透气的鞋子"),
];

const RAINY_RULES: &[StrategyRule] = &[
    rule("外套", Position::Outer, 2, 0.95, "雨天需要防水外套"),
    rule("裤子", Position::Bottom, 1, 0.8, "雨天适合不易湿的下装"),
    rule("鞋子", Position::Shoes, 1, 0.9, "雨天需要防水鞋"),
];

const SNOWY_RULES: &[StrategyRule] = &[
    rule("外套", Position::Outer, 3, 0.95, "雪天需要保暖外套"),
    rule("内衣", Position::Inner, 1, 0.9, "雪天需要保暖内衣"),
    rule("靴子", Position::Shoes, 1, 0.9, "雪天需要保暖防滑靴"),
];

/// Generic top and bottom for weather without a dedicated table.
const FALLBACK_RULES: &[StrategyRule] = &[
    rule("上衣", Position::Top, 1, 0.7, "基础搭配"),
    rule("裤子", Position::Bottom, 1, 0.7, "基础搭配"),
];

pub fn rules_for(weather: WeatherType) -> &'static [StrategyRule] {
    match weather {
        WeatherType::Sunny => SUNNY_RULES,
        WeatherType::Rainy => RAINY_RULES,
        WeatherType::Snowy => SNOWY_RULES,
        WeatherType::Cloudy | WeatherType::Foggy | WeatherType::Windy => FALLBACK_RULES,
    }
}

pub fn weather_profile(weather: WeatherType) -> WeatherProfile {
    let (temperature, description) = match weather {
        WeatherType::Sunny => (25, "晴朗温暖，适合轻薄衣物"),
        WeatherType::Rainy => (18, "阴雨天气，注意防水保暖"),
        WeatherType::Cloudy => (20, "多云天气，温度适中"),
        WeatherType::Snowy => (0, "雪天寒冷，注意保暖防滑"),
        WeatherType::Foggy => (15, "雾天湿润，注意保暖"),
        WeatherType::Windy => (15, "大风天气，注意防风保暖"),
    };
    WeatherProfile { temperature, description }
}
