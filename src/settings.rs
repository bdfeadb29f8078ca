//! Quality presets and viewer preferences
//!
//! Persisted separately from the sequence config in LocalStorage. Nothing
//! here may change what the simulation computes, only how much of it is drawn.

use serde::{Deserialize, Serialize};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

/// Mesh tessellation tier handed to the geometry builders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryDetail {
    Low,
    Medium,
    High,
}

/// Renderer options a preset maps to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityOptions {
    pub pixel_ratio_cap: f32,
    pub antialias_enabled: bool,
    pub shadows_enabled: bool,
    pub geometry_detail: GeometryDetail,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Like `from_str`, but unknown names fall back to the default preset
    pub fn parse_or_default(s: &str) -> Self {
        Self::from_str(s).unwrap_or_else(|| {
            let fallback = Self::default();
            log::warn!("Unknown quality preset {:?}; using {}", s, fallback.as_str());
            fallback
        })
    }

    /// Renderer options for this preset
    pub fn options(&self) -> QualityOptions {
        match self {
            QualityPreset::Low => QualityOptions {
                pixel_ratio_cap: 1.0,
                antialias_enabled: false,
                shadows_enabled: false,
                geometry_detail: GeometryDetail::Low,
            },
            QualityPreset::Medium => QualityOptions {
                pixel_ratio_cap: 1.5,
                antialias_enabled: true,
                shadows_enabled: false,
                geometry_detail: GeometryDetail::Medium,
            },
            QualityPreset::High => QualityOptions {
                pixel_ratio_cap: 2.0,
                antialias_enabled: true,
                shadows_enabled: true,
                geometry_detail: GeometryDetail::High,
            },
        }
    }

    /// Particle pool size per emitter
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 150,
            QualityPreset::Medium => 600,
            QualityPreset::High => 2000,
        }
    }

    /// Whether the distant starfield is drawn
    pub fn starfield_enabled(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

/// Viewer preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Camera shake through the near rush and impact
    pub screen_shake: bool,
    /// Fire, smoke and debris particles
    pub particles: bool,
    /// White flash at impact
    pub impact_flash: bool,

    // === HUD ===
    /// Show phase/progress readout
    pub show_status: bool,

    // === Accessibility ===
    /// Reduced motion (no shake, softened flash)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            screen_shake: true,
            particles: true,
            impact_flash: true,
            show_status: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset (applies preset defaults)
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;
        if preset == QualityPreset::Low {
            self.impact_flash = false;
        }
    }

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Flash strength multiplier (reduced motion softens it)
    pub fn flash_scale(&self) -> f32 {
        match (self.impact_flash, self.reduced_motion) {
            (false, _) => 0.0,
            (true, true) => 0.3,
            (true, false) => 1.0,
        }
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "impact_cinematic_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Stored settings unreadable ({e}); using defaults"),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_from_str() {
        assert_eq!(QualityPreset::from_str("HIGH"), Some(QualityPreset::High));
        assert_eq!(QualityPreset::from_str(" med "), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::from_str("ultra"), None);
    }

    #[test]
    fn test_unknown_preset_coerced() {
        assert_eq!(QualityPreset::parse_or_default("ultra"), QualityPreset::Medium);
        assert_eq!(QualityPreset::parse_or_default("low"), QualityPreset::Low);
    }

    #[test]
    fn test_preset_options() {
        let low = QualityPreset::Low.options();
        let high = QualityPreset::High.options();
        assert!(!low.antialias_enabled && !low.shadows_enabled);
        assert!(high.antialias_enabled && high.shadows_enabled);
        assert!(high.pixel_ratio_cap > low.pixel_ratio_cap);
        assert_eq!(high.geometry_detail, GeometryDetail::High);
    }

    #[test]
    fn test_reduced_motion_disables_shake() {
        let settings = Settings {
            reduced_motion: true,
            ..Default::default()
        };
        assert!(!settings.effective_screen_shake());
        assert_eq!(settings.flash_scale(), 0.3);
    }

    #[test]
    fn test_low_preset_drops_flash() {
        let settings = Settings::from_preset(QualityPreset::Low);
        assert_eq!(settings.flash_scale(), 0.0);
        assert_eq!(settings.max_particles(), 150);
    }

    #[test]
    fn test_particles_off() {
        let settings = Settings {
            particles: false,
            ..Default::default()
        };
        assert_eq!(settings.max_particles(), 0);
    }

    #[test]
    fn test_show_status_round_trips() {
        let settings = Settings {
            show_status: false,
            ..Default::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        let restored: Settings = serde_json::from_str(&json).unwrap();
        assert!(!restored.show_status);
        assert!(Settings::default().show_status);
    }

    #[test]
    fn test_settings_tolerate_missing_fields() {
        let settings: Settings = serde_json::from_str(r#"{"quality":"High"}"#).unwrap();
        assert_eq!(settings.quality, QualityPreset::High);
        assert!(settings.screen_shake);
    }
}
