//! Priority level entity model with customizable names.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Default priority level names, indexed by level.
const DEFAULT_NAMES: [&str; 10] = [
    "Lowest",
    "Very Low",
    "Low",
    "Below Normal",
    "Normal",
    "Above Normal",
    "High",
    "Very High",
    "Critical",
    "Urgent",
];

/// Default priority level colors, indexed by level.
const DEFAULT_COLORS: [&str; 10] = [
    "#9E9E9E", // Gray
    "#8BC34A", // Light Green
    "#4CAF50", // Green
    "#CDDC39", // Lime
    "#FFEB3B", // Yellow
    "#FFC107", // Amber
    "#FF9800", // Orange
    "#FF5722", // Deep Orange
    "#F44336", // Red
    "#B71C1C", // Dark Red
];

/// A customizable priority level definition. The ten levels (1-10) are
/// fixed; only name and color are mutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PriorityLevel {
    /// The priority level number (1-10, primary key).
    pub level: i32,
    /// Display name.
    pub name: String,
    /// Hex color like `#FF9800`.
    pub color: Option<String>,
}

impl PriorityLevel {
    /// The ten default priority levels for initial database seeding.
    pub fn defaults() -> Vec<Self> {
        (1..=10)
            .map(|level| Self {
                level,
                name: DEFAULT_NAMES[(level - 1) as usize].to_string(),
                color: Some(DEFAULT_COLORS[(level - 1) as usize].to_string()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_all_levels() {
        let defaults = PriorityLevel::defaults();
        assert_eq!(defaults.len(), 10);
        assert_eq!(defaults[0].level, 1);
        assert_eq!(defaults[0].name, "Lowest");
        assert_eq!(defaults[9].level, 10);
        assert_eq!(defaults[9].name, "Urgent");
        assert!(defaults.iter().all(|p| p.color.is_some()));
    }
}
