//! Icon categories inferred from the provider's free-text condition.
//!
//! Rules are checked top to bottom and the first match wins, so a
//! "Thundery Showers" outlook lands on `Thunderstorm` rather than `Rain`.

use serde::{Deserialize, Serialize};

/// Icon category shown next to a forecast day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IconCategory {
    Thunderstorm,
    Rain,
    Cloudy,
    Sunny,
    #[default]
    PartlyCloudy,
}

impl IconCategory {
    /// Map a condition string to its category.
    pub fn from_condition(condition: &str) -> Self {
        let condition = condition.to_lowercase();
        CONDITION_RULES
            .iter()
            .find(|(applies, _)| applies(condition.as_str()))
            .map(|(_, category)| *category)
            .unwrap_or_default()
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Thunderstorm => "Thunderstorm",
            Self::Rain => "Rain",
            Self::Cloudy => "Cloudy",
            Self::Sunny => "Sunny",
            Self::PartlyCloudy => "Partly Cloudy",
        }
    }

    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Thunderstorm => "cloud_lightning",
            Self::Rain => "cloud_rain",
            Self::Cloudy => "cloud",
            Self::Sunny => "sun",
            Self::PartlyCloudy => "cloud_sun",
        }
    }
}

type ConditionRule = (fn(&str) -> bool, IconCategory);

/// Ordered precedence table. Inputs are already lowercased.
const CONDITION_RULES: &[ConditionRule] = &[
    (mentions_thunder, IconCategory::Thunderstorm),
    (mentions_rain, IconCategory::Rain),
    (mentions_cloud, IconCategory::Cloudy),
    (mentions_fair, IconCategory::Sunny),
];

fn contains_any(condition: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| condition.contains(term))
}

fn mentions_thunder(condition: &str) -> bool {
    contains_any(condition, &["thunder", "lightning"])
}

fn mentions_rain(condition: &str) -> bool {
    contains_any(condition, &["rain", "shower", "drizzle"])
}

fn mentions_cloud(condition: &str) -> bool {
    contains_any(condition, &["cloudy", "overcast"])
}

fn mentions_fair(condition: &str) -> bool {
    contains_any(condition, &["sunny", "fair", "clear"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thunder_beats_rain() {
        assert_eq!(
            IconCategory::from_condition("Thundery Showers"),
            IconCategory::Thunderstorm
        );
        assert_eq!(
            IconCategory::from_condition("Afternoon rain with thunder"),
            IconCategory::Thunderstorm
        );
    }

    #[test]
    fn test_rain_terms() {
        assert_eq!(IconCategory::from_condition("Showers"), IconCategory::Rain);
        assert_eq!(IconCategory::from_condition("Light Rain"), IconCategory::Rain);
        assert_eq!(IconCategory::from_condition("Drizzle"), IconCategory::Rain);
    }

    #[test]
    fn test_cloudy_beats_sunny() {
        assert_eq!(
            IconCategory::from_condition("Cloudy, turning sunny later"),
            IconCategory::Cloudy
        );
        assert_eq!(
            IconCategory::from_condition("Sunny then cloudy"),
            IconCategory::Cloudy
        );
    }

    #[test]
    fn test_fair_and_sunny() {
        assert_eq!(IconCategory::from_condition("Fair"), IconCategory::Sunny);
        assert_eq!(IconCategory::from_condition("Fair & Warm"), IconCategory::Sunny);
        assert_eq!(IconCategory::from_condition("SUNNY"), IconCategory::Sunny);
    }

    #[test]
    fn test_unknown_defaults_to_partly_cloudy() {
        assert_eq!(IconCategory::from_condition("Hazy"), IconCategory::PartlyCloudy);
        assert_eq!(IconCategory::from_condition("Windy"), IconCategory::PartlyCloudy);
        assert_eq!(IconCategory::from_condition(""), IconCategory::PartlyCloudy);
    }

    #[test]
    fn test_partly_cloudy_text_is_cloudy() {
        // "Partly Cloudy" contains "cloudy" and resolves through the cloud rule
        assert_eq!(
            IconCategory::from_condition("Partly Cloudy"),
            IconCategory::Cloudy
        );
    }

    #[test]
    fn test_icon_names() {
        assert_eq!(IconCategory::Thunderstorm.icon_name(), "cloud_lightning");
        assert_eq!(IconCategory::Sunny.icon_name(), "sun");
        assert_eq!(IconCategory::default().icon_name(), "cloud_sun");
        assert_eq!(IconCategory::PartlyCloudy.description(), "Partly Cloudy");
    }
}
