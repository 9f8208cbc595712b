use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub gesture: GestureConfig,
    pub scene: SceneConfig,
}

/// Tunables for the gesture/transform core. All distances are in the
/// detector's normalized [0,1] coordinate units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Pinch distance below this means Rotate mode, at/above means Scale mode.
    pub pinch_threshold: f32,
    /// Raw pinch distance * this = target scale.
    pub zoom_sensitivity: f32,
    /// Exponential smoothing factor toward the target scale, in (0, 1].
    pub lerp_factor: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    /// Midpoint delta * this = orientation delta (radians).
    pub rotation_sensitivity: f32,
    /// Clamped scale below this -> Dense, else Sparse.
    pub density_breakpoint: f32,
    pub dense_birth_rate: f32,
    pub sparse_birth_rate: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub window_width: usize,
    pub window_height: usize,
    pub core_color_hex: String,
    pub ring_color_hex: String,
    pub ring_birth_rate: f32,
    pub core_life_span: f32,
    pub ring_life_span: f32,
    /// Seconds for one full idle revolution.
    pub idle_spin_period: f32,
    pub camera_distance: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            pinch_threshold: 0.06,
            zoom_sensitivity: 15.0,
            lerp_factor: 0.1,
            min_scale: 0.5,
            max_scale: 4.0,
            rotation_sensitivity: 5.0,
            density_breakpoint: 1.0,
            dense_birth_rate: 8000.0,
            sparse_birth_rate: 4000.0,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            window_width: 960,
            window_height: 720,
            core_color_hex: "#FFCC66".to_string(), // Gold
            ring_color_hex: "#FFFFFF".to_string(),
            ring_birth_rate: 8000.0,
            core_life_span: 1.5,
            ring_life_span: 2.0,
            idle_spin_period: 20.0,
            camera_distance: 10.0,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gesture: GestureConfig::default(),
            scene: SceneConfig::default(),
        }
    }
}

impl GestureConfig {
    /// Out-of-range values are a setup contract violation, rejected here once
    /// rather than checked per frame.
    pub fn validate(&self) -> Result<()> {
        if !(self.lerp_factor > 0.0 && self.lerp_factor <= 1.0) {
            bail!("lerp_factor must be in (0, 1], got {}", self.lerp_factor);
        }
        if self.min_scale > self.max_scale {
            bail!(
                "min_scale ({}) must not exceed max_scale ({})",
                self.min_scale,
                self.max_scale
            );
        }
        if self.pinch_threshold <= 0.0 {
            bail!("pinch_threshold must be positive, got {}", self.pinch_threshold);
        }
        if self.dense_birth_rate < 0.0 || self.sparse_birth_rate < 0.0 {
            bail!("birth rates must not be negative");
        }
        Ok(())
    }
}

impl AppConfig {
    const PATH: &'static str = "config.json";

    pub fn load() -> Result<Self> {
        let config = if Path::new(Self::PATH).exists() {
            let content = fs::read_to_string(Self::PATH)?;
            match serde_json::from_str::<AppConfig>(&content) {
                Ok(c) => {
                    println!("Loaded configuration from {}", Self::PATH);
                    c
                }
                Err(e) => {
                    println!("Error parsing config: {}. Loading defaults.", e);
                    Self::default()
                }
            }
        } else {
            println!("Configuration file not found. Creating default at {}", Self::PATH);
            Self::default()
        };

        config.gesture.validate()?;

        // Always save back to ensure new fields are populated in the file
        config.save()?;

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(Self::PATH, content)?;
        Ok(())
    }
}

pub fn parse_hex(hex: &str) -> (u8, u8, u8) {
    if hex.len() == 7 && hex.starts_with('#') {
        let r = u8::from_str_radix(&hex[1..3], 16).unwrap_or(255);
        let g = u8::from_str_radix(&hex[3..5], 16).unwrap_or(255);
        let b = u8::from_str_radix(&hex[5..7], 16).unwrap_or(255);
        (r, g, b)
    } else {
        (255, 255, 255) // Default White
    }
}
