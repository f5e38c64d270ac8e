//! Game configuration (window, graphics, input, and simulation tuning). Loaded from
//! config.ron at startup.

use serde::{Deserialize, Serialize};

/// Persistent game settings. Loaded from `config.ron` in the current directory (or next to the binary).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Window width in logical pixels.
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    /// Window height in logical pixels.
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    /// Enable vsync (recommended to avoid tearing).
    #[serde(default = "default_true")]
    pub vsync: bool,
    /// Start in fullscreen.
    #[serde(default)]
    pub fullscreen: bool,
    /// Mouse sensitivity multiplier (1.0 = default).
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,
}

fn default_window_width() -> u32 {
    1280
}
fn default_window_height() -> u32 {
    720
}
fn default_true() -> bool {
    true
}
fn default_sensitivity() -> f32 {
    1.0
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            vsync: default_true(),
            fullscreen: false,
            sensitivity: default_sensitivity(),
        }
    }
}

impl GameConfig {
    /// Load config from `config.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        let path = config_path();
        if let Ok(data) = std::fs::read_to_string(&path) {
            match ron::from_str(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            }
        }
        Self::default()
    }

    /// Save current config to `config.ron`. Logs on error.
    pub fn save(&self) {
        let path = config_path();
        if let Ok(s) = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            if let Err(e) = std::fs::write(&path, s) {
                log::warn!("Could not write config to {:?}: {}", path, e);
            }
        }
    }
}

fn config_path() -> std::path::PathBuf {
    std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from(".")).join("config.ron")
}

/// Simulation tuning, loaded the same way as [`GameConfig`] (`sim_config.ron`): the
/// ring system's shape parameters and the RNG seed that makes a run replayable. The
/// constants in `crate::constants` are the compiled-in defaults mirrored here; a
/// deployment can retune them without a rebuild by editing the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Seeds the single `StdRng` threaded through the world tick. Two runs with the
    /// same seed and the same inputs replay identically.
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub ring: RingConfig,
}

/// Mirrors `procgen::RingParameters`'s five scalar fields (holes are runtime state,
/// added via `RingSystem::add_hole`, and are not persisted here).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RingConfig {
    #[serde(default = "default_half_thickness")]
    pub half_thickness: f64,
    #[serde(default = "default_inner_radius")]
    pub inner_radius: f64,
    #[serde(default = "default_outer_radius_base")]
    pub outer_radius_base: f64,
    #[serde(default = "default_density_max")]
    pub density_max: f64,
    #[serde(default = "default_density_factor")]
    pub density_factor: f64,
}

fn default_seed() -> u64 {
    0xC0FF_EE00_1234_5678
}
fn default_half_thickness() -> f64 {
    50.0
}
fn default_inner_radius() -> f64 {
    8_000.0
}
fn default_outer_radius_base() -> f64 {
    20_000.0
}
fn default_density_max() -> f64 {
    30.0
}
fn default_density_factor() -> f64 {
    0.01
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            half_thickness: default_half_thickness(),
            inner_radius: default_inner_radius(),
            outer_radius_base: default_outer_radius_base(),
            density_max: default_density_max(),
            density_factor: default_density_factor(),
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self { seed: default_seed(), ring: RingConfig::default() }
    }
}

impl RingConfig {
    pub fn to_ring_parameters(&self) -> procgen::RingParameters {
        procgen::RingParameters {
            half_thickness: self.half_thickness,
            inner_radius: self.inner_radius,
            outer_radius_base: self.outer_radius_base,
            density_max: self.density_max,
            density_factor: self.density_factor,
            holes: Vec::new(),
        }
    }
}

impl SimConfig {
    /// Load from `sim_config.ron`. If the file is missing or invalid, returns default
    /// tuning (logged via `log::warn!`, never aborts startup).
    pub fn load() -> Self {
        let path = sim_config_path();
        if let Ok(data) = std::fs::read_to_string(&path) {
            match ron::from_str(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid sim config at {:?}: {}, using defaults", path, e),
            }
        }
        Self::default()
    }

    pub fn save(&self) {
        let path = sim_config_path();
        if let Ok(s) = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            if let Err(e) = std::fs::write(&path, s) {
                log::warn!("Could not write sim config to {:?}: {}", path, e);
            }
        }
    }
}

fn sim_config_path() -> std::path::PathBuf {
    std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from(".")).join("sim_config.ron")
}
