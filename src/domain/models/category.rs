//! Waste category taxonomy and its display metadata
//!
//! The table is built once and never mutated; lookups for unknown keys
//! fall back to `inorganico`.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKey {
    Organico,
    Reciclable,
    Inorganico,
}

impl CategoryKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKey::Organico => "organico",
            CategoryKey::Reciclable => "reciclable",
            CategoryKey::Inorganico => "inorganico",
        }
    }

    /// Exact key match (no case folding)
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "organico" => Some(CategoryKey::Organico),
            "reciclable" => Some(CategoryKey::Reciclable),
            "inorganico" => Some(CategoryKey::Inorganico),
            _ => None,
        }
    }

    pub fn all() -> &'static [CategoryKey] {
        &[CategoryKey::Organico, CategoryKey::Reciclable, CategoryKey::Inorganico]
    }
}

impl std::fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display metadata for one category
///
/// Also deserialized from the server's optional `category_info`, which may
/// use the Spanish field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(default, rename = "bgColor", alias = "bg_color")]
    pub bg_color: String,
    #[serde(default, alias = "descripcion")]
    pub description: String,
    #[serde(default, alias = "ejemplos")]
    pub examples: String,
}

impl CategoryInfo {
    fn entry(
        label: &str,
        icon: &str,
        color: &str,
        bg_color: &str,
        description: &str,
        examples: &str,
    ) -> Self {
        Self {
            label: label.to_string(),
            icon: icon.to_string(),
            color: color.to_string(),
            bg_color: bg_color.to_string(),
            description: description.to_string(),
            examples: examples.to_string(),
        }
    }
}

static CATEGORY_TABLE: Lazy<HashMap<CategoryKey, CategoryInfo>> = Lazy::new(|| {
    HashMap::from([
        (
            CategoryKey::Organico,
            CategoryInfo::entry(
                "ORGÁNICO",
                "🍃",
                "#10b981",
                "#d1fae5",
                "Residuos biodegradables de origen natural",
                "Frutas, verduras, cáscaras, restos de comida, hojas",
            ),
        ),
        (
            CategoryKey::Reciclable,
            CategoryInfo::entry(
                "RECICLABLE",
                "♻️",
                "#3b82f6",
                "#dbeafe",
                "Materiales que pueden ser procesados nuevamente",
                "Papel, cartón, plástico, vidrio, metal",
            ),
        ),
        (
            CategoryKey::Inorganico,
            CategoryInfo::entry(
                "INORGÁNICO",
                "🗑️",
                "#6b7280",
                "#f3f4f6",
                "Residuos no biodegradables",
                "Plásticos no reciclables, residuos sanitarios",
            ),
        ),
    ])
});

/// Metadata for a known category
pub fn info_for(key: CategoryKey) -> &'static CategoryInfo {
    // The table holds every key
    &CATEGORY_TABLE[&key]
}

/// Metadata for a raw category string, falling back to `inorganico`
pub fn lookup(category: &str) -> &'static CategoryInfo {
    info_for(CategoryKey::from_key(category).unwrap_or(CategoryKey::Inorganico))
}

/// Same as [`lookup`] but case-insensitive
pub fn lookup_lowercase(category: &str) -> &'static CategoryInfo {
    lookup(&category.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_has_exactly_three_entries() {
        assert_eq!(CATEGORY_TABLE.len(), 3);
        for key in CategoryKey::all() {
            assert!(CATEGORY_TABLE.contains_key(key));
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(info_for(CategoryKey::Organico).label, "ORGÁNICO");
        assert_eq!(info_for(CategoryKey::Reciclable).label, "RECICLABLE");
        assert_eq!(info_for(CategoryKey::Inorganico).label, "INORGÁNICO");
    }

    #[test]
    fn test_unknown_falls_back_to_inorganico() {
        assert_eq!(lookup("plastico_raro"), info_for(CategoryKey::Inorganico));
        assert_eq!(lookup(""), info_for(CategoryKey::Inorganico));
    }

    #[test]
    fn test_lookup_is_case_sensitive_unless_asked() {
        assert_eq!(lookup("Reciclable"), info_for(CategoryKey::Inorganico));
        assert_eq!(lookup_lowercase("Reciclable"), info_for(CategoryKey::Reciclable));
    }

    #[test]
    fn test_server_info_accepts_spanish_fields() {
        let info: CategoryInfo = serde_json::from_value(serde_json::json!({
            "label": "ORGÁNICO",
            "color": "#10b981",
            "bgColor": "#d1fae5",
            "descripcion": "desc",
            "ejemplos": "ej"
        }))
        .unwrap();
        assert_eq!(info.description, "desc");
        assert_eq!(info.examples, "ej");
        assert_eq!(info.bg_color, "#d1fae5");
        assert!(info.icon.is_empty());
    }

    #[test]
    fn test_key_roundtrip_str() {
        for key in CategoryKey::all() {
            assert_eq!(CategoryKey::from_key(key.as_str()), Some(*key));
        }
    }
}
