use std::fs;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::model::Category;

/// Tunables for the force simulation. Every field has a default so a config
/// file only needs to name what it overrides.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    pub link_distance: f32,
    pub link_strength: f32,
    pub charge_strength: f32,
    pub charge_min_distance: f32,
    pub barnes_hut_theta: f32,
    pub collision_padding: f32,
    pub collision_strength: f32,
    pub center_strength: f32,
    pub velocity_damping: f32,
    pub max_speed: f32,
    pub seed_radius: f32,
    pub initial_energy: f32,
    pub energy_decay: f32,
    pub energy_min: f32,
    pub cooling_threshold: f32,
    pub reheat_energy: f32,
    pub drag_energy_target: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            link_distance: 70.0,
            link_strength: 0.35,
            charge_strength: 220.0,
            charge_min_distance: 4.0,
            barnes_hut_theta: 0.72,
            collision_padding: 3.0,
            collision_strength: 0.7,
            center_strength: 0.08,
            velocity_damping: 0.6,
            max_speed: 48.0,
            seed_radius: 24.0,
            initial_energy: 1.0,
            // 1 - 0.001^(1/300): roughly 300 ticks from full energy to rest.
            energy_decay: 0.0228,
            energy_min: 0.001,
            cooling_threshold: 0.1,
            reheat_energy: 0.3,
            drag_energy_target: 0.3,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RadiusProfile {
    pub base: f32,
    pub slope: f32,
    pub min: f32,
    pub max: f32,
}

impl Default for RadiusProfile {
    fn default() -> Self {
        Self {
            base: 6.0,
            slope: 1.5,
            min: 6.0,
            max: 28.0,
        }
    }
}

impl RadiusProfile {
    pub fn radius(self, degree: usize) -> f32 {
        let raw = self.base + degree as f32 * self.slope;
        // max-then-min instead of clamp so an inverted profile cannot panic.
        raw.max(self.min).min(self.max.max(self.min))
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RadiusConfig {
    pub source: RadiusProfile,
    pub target: RadiusProfile,
}

impl Default for RadiusConfig {
    fn default() -> Self {
        Self {
            source: RadiusProfile::default(),
            target: RadiusProfile {
                base: 8.0,
                slope: 0.8,
                min: 8.0,
                max: 36.0,
            },
        }
    }
}

impl RadiusConfig {
    pub fn profile(&self, category: Category) -> RadiusProfile {
        match category {
            Category::Source => self.source,
            Category::Target => self.target,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewConfig {
    pub min_scale: f32,
    pub max_scale: f32,
    pub zoom_sensitivity: f32,
    pub hit_padding: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 8.0,
            zoom_sensitivity: 0.0018,
            hit_padding: 3.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub layout: LayoutConfig,
    pub radius: RadiusConfig,
    pub view: ViewConfig,
}

impl Settings {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("invalid settings JSON")
    }

    pub fn load(path: Option<&str>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
        let settings = Self::from_json(&raw).with_context(|| format!("in settings file {path}"))?;
        info!(path, "loaded settings");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_keep_defaults() {
        let settings =
            Settings::from_json(r#"{"layout": {"link_distance": 120.0}, "view": {"max_scale": 4}}"#)
                .unwrap();

        assert_eq!(settings.layout.link_distance, 120.0);
        assert_eq!(
            settings.layout.charge_strength,
            LayoutConfig::default().charge_strength
        );
        assert_eq!(settings.view.max_scale, 4.0);
        assert_eq!(settings.radius, RadiusConfig::default());
    }

    #[test]
    fn radius_grows_with_degree_and_saturates() {
        let profile = RadiusProfile {
            base: 4.0,
            slope: 2.0,
            min: 6.0,
            max: 12.0,
        };

        assert_eq!(profile.radius(0), 6.0);
        assert_eq!(profile.radius(2), 8.0);
        assert_eq!(profile.radius(3), 10.0);
        assert_eq!(profile.radius(50), 12.0);
    }

    #[test]
    fn inverted_radius_profile_does_not_panic() {
        let profile = RadiusProfile {
            base: 10.0,
            slope: 1.0,
            min: 20.0,
            max: 5.0,
        };
        assert_eq!(profile.radius(3), 20.0);
    }

    #[test]
    fn missing_settings_file_is_an_error() {
        assert!(Settings::load(Some("/nonexistent/relgraph.json")).is_err());
        assert_eq!(Settings::load(None).unwrap(), Settings::default());
    }
}
