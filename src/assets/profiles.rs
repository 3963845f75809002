//! Asset category profiles and the registry that holds them.
//!
//! Built-in categories are embedded at compile time. A directory of JSON
//! files can add or override entries before generation starts; the
//! registry is read-only while placement runs.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, WorldError};

const DEFAULT_CATEGORIES_JSON: &str = include_str!("../../data/defaults/categories.json");

/// Category used when a requested name is not registered.
pub const FALLBACK_CATEGORY: &str = "tree";

/// Linear RGB, each channel in [0, 1].
pub type Rgb = [f64; 3];

/// Siting rule applied on top of the height/slope window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementKind {
    Land,
    Water,
    Sky,
    WaterBody,
    WaterFlow,
    WaterCrossing,
    LandDepression,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryProfile {
    pub height_range: (f64, f64),
    pub width_range: (f64, f64),
    pub color_range: (Rgb, Rgb),
    #[serde(rename = "placement", alias = "placement_kind")]
    pub placement_kind: PlacementKind,
    pub min_height: f64,
    pub max_height: f64,
    pub min_slope: f64,
    pub max_slope: f64,
}

impl CategoryProfile {
    /// Check that every range is ordered and colours are in [0, 1].
    pub fn validate(&self, category: &str) -> Result<()> {
        let fail = |reason: String| {
            Err(WorldError::InvalidProfile { category: category.to_string(), reason })
        };

        let pairs = [
            ("height_range", self.height_range),
            ("width_range", self.width_range),
            ("height window", (self.min_height, self.max_height)),
            ("slope window", (self.min_slope, self.max_slope)),
        ];
        for (name, (lo, hi)) in pairs {
            if !(lo.is_finite() && hi.is_finite()) {
                return fail(format!("{} must be finite", name));
            }
            if lo > hi {
                return fail(format!("{} is reversed ({} > {})", name, lo, hi));
            }
        }

        let (low, high) = self.color_range;
        for channel in 0..3 {
            if !(0.0..=1.0).contains(&low[channel]) || !(0.0..=1.0).contains(&high[channel]) {
                return fail(format!("color channel {} outside [0, 1]", channel));
            }
            if low[channel] > high[channel] {
                return fail(format!("color channel {} is reversed", channel));
            }
        }
        Ok(())
    }
}

/// On-disk shape of one category definition.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CategoryFile {
    pub asset_type: String,
    pub properties: CategoryProfile,
}

#[derive(Deserialize)]
struct CategoriesFile {
    categories: Vec<CategoryFile>,
}

/// Category name -> profile lookup.
#[derive(Clone, Debug)]
pub struct CategoryRegistry {
    profiles: HashMap<String, CategoryProfile>,
    /// Registration order, for deterministic iteration
    names: Vec<String>,
}

impl CategoryRegistry {
    /// Registry with the built-in categories compiled into the binary.
    pub fn defaults() -> Self {
        let file: CategoriesFile = serde_json::from_str(DEFAULT_CATEGORIES_JSON)
            .expect("Failed to parse embedded categories.json");

        let mut registry = Self { profiles: HashMap::new(), names: Vec::new() };
        for entry in file.categories {
            registry.put(entry.asset_type, entry.properties);
        }
        registry
    }

    /// Defaults merged with every `*.json` definition found in `dir`.
    pub fn load_from(dir: &Path) -> Result<Self> {
        let mut registry = Self::defaults();
        registry.load_dir(dir)?;
        Ok(registry)
    }

    /// Add or override categories from `dir`. Files are read in name order;
    /// a file that fails to parse or validate is skipped with a warning.
    /// Returns the number of definitions accepted.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().map_or(false, |ext| ext == "json"))
            .collect();
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            let parsed = std::fs::read_to_string(&path)
                .map_err(WorldError::from)
                .and_then(|contents| serde_json::from_str::<CategoryFile>(&contents).map_err(WorldError::from))
                .and_then(|entry| self.insert(&entry.asset_type, entry.properties));
            match parsed {
                Ok(()) => loaded += 1,
                Err(e) => warn!(file = %path.display(), error = %e, "skipping category definition"),
            }
        }
        debug!(loaded, dir = %dir.display(), "loaded custom categories");
        Ok(loaded)
    }

    /// Write one `<name>.json` file per category.
    pub fn save_dir(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        for name in &self.names {
            let entry = CategoryFile {
                asset_type: name.clone(),
                properties: self.profiles[name].clone(),
            };
            let json = serde_json::to_string_pretty(&entry)?;
            std::fs::write(dir.join(format!("{}.json", name)), json)?;
        }
        Ok(())
    }

    /// Validate and register a profile, replacing any existing entry.
    pub fn insert(&mut self, name: &str, profile: CategoryProfile) -> Result<()> {
        if name.is_empty() {
            return Err(WorldError::InvalidProfile {
                category: name.to_string(),
                reason: "category name is empty".to_string(),
            });
        }
        profile.validate(name)?;
        self.put(name.to_string(), profile);
        Ok(())
    }

    fn put(&mut self, name: String, profile: CategoryProfile) {
        if !self.profiles.contains_key(&name) {
            self.names.push(name.clone());
        }
        self.profiles.insert(name, profile);
    }

    /// Strict lookup.
    pub fn get(&self, name: &str) -> Result<&CategoryProfile> {
        self.profiles
            .get(name)
            .ok_or_else(|| WorldError::UnknownCategory(name.to_string()))
    }

    /// Lookup that degrades to the fallback profile. The flag is true when
    /// the fallback was used.
    pub fn profile_or_default(&self, name: &str) -> (&CategoryProfile, bool) {
        match self.profiles.get(name) {
            Some(profile) => (profile, false),
            None => {
                warn!(category = name, fallback = FALLBACK_CATEGORY, "unknown asset category, using fallback profile");
                (&self.profiles[FALLBACK_CATEGORY], true)
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pebble() -> CategoryProfile {
        CategoryProfile {
            height_range: (0.01, 0.05),
            width_range: (0.01, 0.05),
            color_range: ([0.4, 0.4, 0.4], [0.6, 0.6, 0.6]),
            placement_kind: PlacementKind::Land,
            min_height: 0.0,
            max_height: 1.0,
            min_slope: 0.0,
            max_slope: 1.0,
        }
    }

    #[test]
    fn test_builtin_categories() {
        let registry = CategoryRegistry::defaults();
        assert_eq!(registry.len(), 22);
        assert_eq!(registry.names()[0], "tree");
        assert!(registry.contains(FALLBACK_CATEGORY));

        let bridge = registry.get("bridge").unwrap();
        assert_eq!(bridge.placement_kind, PlacementKind::WaterCrossing);
        let valley = registry.get("valley").unwrap();
        assert_eq!(valley.placement_kind, PlacementKind::LandDepression);
        assert_eq!(registry.get("river").unwrap().min_slope, 0.05);
    }

    #[test]
    fn test_builtin_profiles_are_valid() {
        let registry = CategoryRegistry::defaults();
        for name in registry.names() {
            registry.get(name).unwrap().validate(name).unwrap();
        }
    }

    #[test]
    fn test_unknown_category_falls_back_to_tree() {
        let registry = CategoryRegistry::defaults();
        let (profile, fell_back) = registry.profile_or_default("dragon");
        assert!(fell_back);
        assert_eq!(profile, registry.get("tree").unwrap());
        assert!(matches!(registry.get("dragon"), Err(WorldError::UnknownCategory(_))));

        let (_, fell_back) = registry.profile_or_default("rock");
        assert!(!fell_back);
    }

    #[test]
    fn test_validation_rejects_bad_shapes() {
        let mut reversed = pebble();
        reversed.height_range = (2.0, 1.0);
        assert!(reversed.validate("pebble").is_err());

        let mut bright = pebble();
        bright.color_range.1 = [1.5, 0.0, 0.0];
        assert!(bright.validate("pebble").is_err());

        let mut window = pebble();
        window.min_slope = 0.9;
        window.max_slope = 0.1;
        assert!(window.validate("pebble").is_err());
    }

    #[test]
    fn test_placement_kind_serialises_snake_case() {
        let json = serde_json::to_string(&PlacementKind::WaterCrossing).unwrap();
        assert_eq!(json, "\"water_crossing\"");
        let kind: PlacementKind = serde_json::from_str("\"land_depression\"").unwrap();
        assert_eq!(kind, PlacementKind::LandDepression);
    }

    #[test]
    fn test_save_and_reload_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = CategoryRegistry::defaults();
        registry.insert("pebble", pebble()).unwrap();
        registry.save_dir(dir.path()).unwrap();

        let reloaded = CategoryRegistry::load_from(dir.path()).unwrap();
        assert_eq!(reloaded.len(), 23);
        assert_eq!(reloaded.get("pebble").unwrap(), &pebble());
    }

    #[test]
    fn test_load_dir_skips_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        let good = CategoryFile { asset_type: "pebble".to_string(), properties: pebble() };
        std::fs::write(dir.path().join("a_pebble.json"), serde_json::to_string(&good).unwrap()).unwrap();
        std::fs::write(dir.path().join("b_broken.json"), "{ not json").unwrap();
        let mut bad = good.clone();
        bad.asset_type = "reversed".to_string();
        bad.properties.width_range = (3.0, 1.0);
        std::fs::write(dir.path().join("c_reversed.json"), serde_json::to_string(&bad).unwrap()).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut registry = CategoryRegistry::defaults();
        let loaded = registry.load_dir(dir.path()).unwrap();
        assert_eq!(loaded, 1);
        assert!(registry.contains("pebble"));
        assert!(!registry.contains("reversed"));
    }

    #[test]
    fn test_override_keeps_registration_order() {
        let mut registry = CategoryRegistry::defaults();
        registry.insert("tree", pebble()).unwrap();
        assert_eq!(registry.len(), 22);
        assert_eq!(registry.names()[0], "tree");
        assert_eq!(registry.get("tree").unwrap(), &pebble());
    }
}
