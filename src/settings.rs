//! Persistent settings for the fraud checker.

use crate::api::{DEFAULT_API_BASE, DEFAULT_MODEL};
use crate::graph::SimulationConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// User-tunable settings, saved as JSON in the platform config directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Backend
    pub api_base_url: String,
    pub model_name: String,

    // Display
    pub node_radius: f32,
    pub show_edge_labels: bool,

    // Physics
    pub charge_strength: f32,
    pub link_distance: f32,
    pub velocity_decay: f32,
    pub alpha_min: f32,
    pub drag_alpha_target: f32,
    pub theta: f32,
}

impl Default for Settings {
    fn default() -> Self {
        let physics = SimulationConfig::default();
        Self {
            api_base_url: DEFAULT_API_BASE.to_string(),
            model_name: DEFAULT_MODEL.to_string(),

            node_radius: 10.0,
            show_edge_labels: true,

            charge_strength: physics.charge_strength,
            link_distance: physics.link_distance,
            velocity_decay: physics.velocity_decay,
            alpha_min: physics.alpha_min,
            drag_alpha_target: physics.drag_alpha_target,
            theta: physics.theta,
        }
    }
}

const ALPHA_MIN_FLOOR: f32 = 1e-6;
const ALPHA_MIN_CEIL: f32 = 0.5;

impl Settings {
    /// Get the path to the settings file
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("wallet-graph");
            p.push("settings.json");
            p
        })
    }

    /// Load settings from disk, returning defaults if file doesn't exist or is invalid
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            warn!("could not determine config directory, using defaults");
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match Self::read_from(&path) {
            Ok(settings) => {
                info!(path = %path.display(), "loaded settings");
                settings
            }
            Err(e) => {
                warn!("{e:#}, using defaults");
                Self::default()
            }
        }
    }

    /// Save settings to disk
    pub fn save(&self) {
        let Some(path) = Self::config_path() else {
            warn!("could not determine config directory, settings not saved");
            return;
        };

        match self.write_to(&path) {
            Ok(()) => info!(path = %path.display(), "saved settings"),
            Err(e) => warn!("{e:#}"),
        }
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse settings file {}", path.display()))
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create config directory {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("failed to serialize settings")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write settings file {}", path.display()))
    }

    /// Command line values win over persisted ones for this run
    pub fn apply_overrides(&mut self, api_url: Option<String>, model: Option<String>) {
        if let Some(url) = api_url {
            self.api_base_url = url;
        }
        if let Some(model) = model {
            self.model_name = model;
        }
    }

    /// Physics parameters with out-of-range values pulled back into range.
    ///
    /// `alpha_min` must stay strictly between 0 and 1 or the layout either
    /// never settles or never cools; non-finite values fall back to defaults.
    pub fn simulation_config(&self) -> SimulationConfig {
        let defaults = SimulationConfig::default();
        let finite_or = |value: f32, fallback: f32| if value.is_finite() { value } else { fallback };

        let alpha_min = finite_or(self.alpha_min, defaults.alpha_min).clamp(ALPHA_MIN_FLOOR, ALPHA_MIN_CEIL);
        SimulationConfig {
            charge_strength: finite_or(self.charge_strength, defaults.charge_strength),
            link_distance: finite_or(self.link_distance, defaults.link_distance).max(0.0),
            velocity_decay: finite_or(self.velocity_decay, defaults.velocity_decay).clamp(0.0, 1.0),
            alpha_min,
            alpha_decay: SimulationConfig::decay_for(alpha_min),
            drag_alpha_target: finite_or(self.drag_alpha_target, defaults.drag_alpha_target).clamp(0.0, 1.0),
            theta: finite_or(self.theta, defaults.theta).max(0.0),
            ..defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::simulation::SimulationPhase;
    use crate::graph::types::{ApiEdge, ApiNode, GraphPayload};
    use crate::graph::Viewer;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn partial_file_fills_in_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"link_distance": 150.0, "model_name": "other.joblib"}"#).unwrap();
        assert_eq!(settings.link_distance, 150.0);
        assert_eq!(settings.model_name, "other.joblib");
        assert_eq!(settings.api_base_url, DEFAULT_API_BASE);
        assert_eq!(settings.charge_strength, -200.0);
        assert!(settings.show_edge_labels);
    }

    #[test]
    fn default_physics_match_simulation_defaults() {
        assert_eq!(Settings::default().simulation_config(), SimulationConfig::default());
    }

    #[test]
    fn out_of_range_physics_are_clamped() {
        let settings: Settings =
            serde_json::from_str(r#"{"alpha_min": -0.1, "drag_alpha_target": 4.0, "velocity_decay": -1.0}"#)
                .unwrap();
        let config = settings.simulation_config();
        assert_eq!(config.alpha_min, ALPHA_MIN_FLOOR);
        assert!(config.alpha_decay > 0.0 && config.alpha_decay < 1.0);
        assert_eq!(config.drag_alpha_target, 1.0);
        assert_eq!(config.velocity_decay, 0.0);

        let settings = Settings {
            alpha_min: f32::NAN,
            ..Settings::default()
        };
        assert_eq!(settings.simulation_config().alpha_min, SimulationConfig::default().alpha_min);
    }

    #[test]
    fn any_stored_alpha_min_still_settles() {
        let payload = GraphPayload {
            nodes: ["A", "B"]
                .iter()
                .map(|id| ApiNode {
                    id: id.to_string(),
                    label: id.to_string(),
                })
                .collect(),
            edges: vec![ApiEdge {
                source: "A".into(),
                target: "B".into(),
                value: 1.0,
                timestamp: "t".into(),
            }],
        };

        for json in [r#"{"alpha_min": 0.0}"#, r#"{"alpha_min": -0.1}"#, r#"{"alpha_min": 1.0}"#] {
            let settings: Settings = serde_json::from_str(json).unwrap();
            let mut viewer = Viewer::new(settings.simulation_config(), settings.node_radius);
            let mut rng = StdRng::seed_from_u64(5);
            viewer.show(&payload, &mut rng).unwrap();

            let mut frames = 0;
            while viewer.frame() {
                frames += 1;
                assert!(frames < 1000, "{json} did not settle");
            }
            assert_eq!(viewer.phase(), Some(SimulationPhase::Settled), "{json}");
            for marker in viewer.scene().markers() {
                assert!(marker.center.x.is_finite() && marker.center.y.is_finite(), "{json}");
            }
        }
    }

    #[test]
    fn cli_overrides_replace_only_given_values() {
        let mut settings = Settings::default();
        settings.apply_overrides(Some("http://10.0.0.2:8000".into()), None);
        assert_eq!(settings.api_base_url, "http://10.0.0.2:8000");
        assert_eq!(settings.model_name, DEFAULT_MODEL);
    }

    #[test]
    fn save_and_reload_through_file() {
        let path = std::env::temp_dir()
            .join(format!("wallet-graph-test-{}", std::process::id()))
            .join("settings.json");
        let settings = Settings {
            node_radius: 14.0,
            show_edge_labels: false,
            ..Settings::default()
        };
        settings.write_to(&path).unwrap();
        assert_eq!(Settings::read_from(&path).unwrap(), settings);

        std::fs::write(&path, "not json").unwrap();
        assert!(Settings::read_from(&path).is_err());
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
