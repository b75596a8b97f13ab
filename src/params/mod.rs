//! The parameter set driving every generator and updater.
//!
//! [`ParamSet`] is plain data with serde support; files use the camelCase key
//! names of the editor's control panel. Missing keys take their defaults, so a
//! file containing only `{"pattern": "Waves"}` is valid.

mod keys;

pub use keys::{ChangeKind, ParamKey, ParamValue};

use crate::color::HexColor;
use crate::error::ParamError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Upper bound on particle entities per pattern.
pub const MAX_ENTITY_COUNT: u32 = 4000;
/// Upper bound on terrain segments along x.
pub const MAX_SEGMENTS_X: u32 = 600;
/// Upper bound on terrain segments along y.
pub const MAX_SEGMENTS_Y: u32 = 400;
/// Hard loop bound of the raymarcher.
pub const MAX_RAYMARCH_STEPS: u32 = 512;
/// Upper bound on swirl centers.
pub const MAX_SWIRL_CENTERS: u32 = 64;

/// The visual archetypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PatternKind {
    Particles,
    #[default]
    Vortex,
    FlowField,
    Lissajous,
    Fireflies,
    Waves,
    DistortingPlane,
    WireframeTerrain,
    Raymarching,
}

impl PatternKind {
    /// Every archetype, in definition order.
    pub const ALL: [PatternKind; 9] = [
        PatternKind::Particles,
        PatternKind::Vortex,
        PatternKind::FlowField,
        PatternKind::Lissajous,
        PatternKind::Fireflies,
        PatternKind::Waves,
        PatternKind::DistortingPlane,
        PatternKind::WireframeTerrain,
        PatternKind::Raymarching,
    ];

    /// The archetypes offered by the pattern selector.
    pub const SELECTABLE: [PatternKind; 8] = [
        PatternKind::Vortex,
        PatternKind::FlowField,
        PatternKind::Lissajous,
        PatternKind::Fireflies,
        PatternKind::Waves,
        PatternKind::DistortingPlane,
        PatternKind::WireframeTerrain,
        PatternKind::Raymarching,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PatternKind::Particles => "Particles",
            PatternKind::Vortex => "Vortex",
            PatternKind::FlowField => "Flow Field",
            PatternKind::Lissajous => "Lissajous",
            PatternKind::Fireflies => "Fireflies",
            PatternKind::Waves => "Waves",
            PatternKind::DistortingPlane => "Distorting Plane",
            PatternKind::WireframeTerrain => "Wireframe Terrain",
            PatternKind::Raymarching => "Raymarching",
        }
    }

    /// Exact lookup by display name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    /// Lookup that falls back to [`PatternKind::Vortex`] for unknown names.
    pub fn parse_or_default(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            tracing::warn!(pattern = name, "unknown pattern, falling back to Vortex");
            PatternKind::default()
        })
    }

    /// Archetypes made of independent point entities.
    pub fn is_particle(&self) -> bool {
        matches!(
            self,
            PatternKind::Particles
                | PatternKind::Vortex
                | PatternKind::FlowField
                | PatternKind::Lissajous
                | PatternKind::Fireflies
        )
    }

    /// Archetypes rendered through a shader surface.
    pub fn is_shader(&self) -> bool {
        matches!(self, PatternKind::DistortingPlane | PatternKind::Raymarching)
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for PatternKind {
    fn from(value: String) -> Self {
        PatternKind::parse_or_default(&value)
    }
}

impl From<PatternKind> for String {
    fn from(value: PatternKind) -> Self {
        value.name().to_string()
    }
}

/// Motion style selector. Stored and exported, not interpreted by the updaters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionMode {
    #[default]
    Swirl,
    Float,
    Burst,
}

impl MotionMode {
    pub fn variants() -> &'static [&'static str] {
        &["swirl", "float", "burst"]
    }

    pub fn name(&self) -> &'static str {
        match self {
            MotionMode::Swirl => "swirl",
            MotionMode::Float => "float",
            MotionMode::Burst => "burst",
        }
    }
}

/// Complete editor configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParamSet {
    pub pattern: PatternKind,
    pub color_a: HexColor,
    pub color_b: HexColor,
    /// Entity count for particle archetypes.
    pub count: u32,
    /// Point size in pixels.
    pub size: f32,
    /// Global speed multiplier (1.0 = normal).
    pub speed: f32,
    /// Spatial extent used by Lissajous amplitudes and mesh dimensions.
    pub spread: f32,
    pub background: HexColor,
    pub motion: MotionMode,
    pub color_speed: f32,
    /// Draw a CSS gradient between the two colors behind the scene.
    pub gradient: bool,
    /// Gradient angle in degrees.
    pub gradient_angle: f32,
    /// Number of swirl centers for orbit archetypes.
    pub centers: u32,
    pub circular_speed: f32,
    pub swirl_intensity: f32,
    pub radial_wobble: f32,
    pub shader_distortion: f32,
    pub shader_speed: f32,
    pub wave_height: f32,
    pub wave_speed: f32,
    pub terrain_segments_x: u32,
    pub terrain_segments_y: u32,
    pub terrain_scale: f32,
    pub terrain_height: f32,
    pub terrain_speed: f32,
    pub terrain_wireframe: bool,
    pub raymarch_steps: u32,
    pub raymarch_max_distance: f32,
    pub raymarch_epsilon: f32,
    pub raymarch_light_x: f32,
    pub raymarch_light_y: f32,
    pub raymarch_light_z: f32,
    pub ray_sphere_mod_amp: f32,
    pub ray_sphere_mod_freq: f32,
    pub ray_noise_scale: f32,
    pub ray_noise_speed: f32,
    pub ray_noise_intensity: f32,
    /// Flow field wrap bound as a fraction of the frustum extent.
    pub flow_wrap_fraction: f32,
    /// Swirl center jitter as a fraction of the frustum extent.
    pub center_jitter: f32,
}

impl Default for ParamSet {
    fn default() -> Self {
        Self {
            pattern: PatternKind::Vortex,
            color_a: HexColor::from_rgb8(0x00, 0xaa, 0xff),
            color_b: HexColor::from_rgb8(0xff, 0x44, 0xaa),
            count: 1200,
            size: 3.0,
            speed: 1.0,
            spread: 600.0,
            background: HexColor::from_rgb8(0x0b, 0x0b, 0x0b),
            motion: MotionMode::Swirl,
            color_speed: 0.6,
            gradient: true,
            gradient_angle: 135.0,
            centers: 3,
            circular_speed: 1.0,
            swirl_intensity: 1.0,
            radial_wobble: 0.6,
            shader_distortion: 1.6,
            shader_speed: 1.0,
            wave_height: 18.0,
            wave_speed: 1.0,
            terrain_segments_x: 200,
            terrain_segments_y: 100,
            terrain_scale: 1.8,
            terrain_height: 120.0,
            terrain_speed: 0.9,
            terrain_wireframe: true,
            raymarch_steps: 80,
            raymarch_max_distance: 2000.0,
            raymarch_epsilon: 0.001,
            raymarch_light_x: 200.0,
            raymarch_light_y: 300.0,
            raymarch_light_z: 400.0,
            ray_sphere_mod_amp: 40.0,
            ray_sphere_mod_freq: 1.6,
            ray_noise_scale: 0.8,
            ray_noise_speed: 0.6,
            ray_noise_intensity: 1.2,
            flow_wrap_fraction: 0.7,
            center_jitter: 0.06,
        }
    }
}

impl ParamSet {
    /// Defaults with a different archetype selected.
    pub fn with_pattern(pattern: PatternKind) -> Self {
        Self {
            pattern,
            ..Default::default()
        }
    }

    // ========== Capacity accessors ==========

    /// Entity count clamped to `1..=MAX_ENTITY_COUNT`.
    pub fn entity_count(&self) -> usize {
        self.count.clamp(1, MAX_ENTITY_COUNT) as usize
    }

    /// Swirl center count clamped to `1..=MAX_SWIRL_CENTERS`.
    pub fn center_count(&self) -> usize {
        self.centers.clamp(1, MAX_SWIRL_CENTERS) as usize
    }

    /// Terrain segments clamped to `2..=MAX`.
    pub fn terrain_segments(&self) -> (usize, usize) {
        (
            self.terrain_segments_x.clamp(2, MAX_SEGMENTS_X) as usize,
            self.terrain_segments_y.clamp(2, MAX_SEGMENTS_Y) as usize,
        )
    }

    /// Raymarch step count bounded by the loop limit.
    pub fn raymarch_step_limit(&self) -> u32 {
        self.raymarch_steps.min(MAX_RAYMARCH_STEPS)
    }

    /// Light position as a vector.
    pub fn light_position(&self) -> glam::Vec3 {
        glam::Vec3::new(
            self.raymarch_light_x,
            self.raymarch_light_y,
            self.raymarch_light_z,
        )
    }

    // ========== Persistence ==========

    /// Parse a parameter set from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ParamError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ParamError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save the parameter set to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ParamError> {
        let path = path.as_ref();
        let json = self.to_json()?;
        fs::write(path, json).map_err(|source| ParamError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    /// Load a parameter set from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParamError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ParamError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_roundtrip() {
        let params = ParamSet::default();
        let json = params.to_json().unwrap();
        let back = ParamSet::from_json(&json).unwrap();
        assert_eq!(params, back);
    }

    #[test]
    fn test_json_uses_editor_keys() {
        let json = ParamSet::default().to_json().unwrap();
        for key in [
            "\"colorA\"",
            "\"terrainSegmentsX\"",
            "\"raymarchLightZ\"",
            "\"raySphereModAmp\"",
            "\"flowWrapFraction\"",
        ] {
            assert!(json.contains(key), "missing {key}");
        }
        assert!(json.contains("\"pattern\": \"Vortex\""));
        assert!(json.contains("\"motion\": \"swirl\""));
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let params = ParamSet::from_json(r#"{"pattern": "Flow Field", "count": 50}"#).unwrap();
        assert_eq!(params.pattern, PatternKind::FlowField);
        assert_eq!(params.count, 50);
        assert_eq!(params.spread, 600.0);
        assert_eq!(params.color_a.to_hex(), "#00aaff");
    }

    #[test]
    fn test_unknown_pattern_falls_back() {
        let params = ParamSet::from_json(r#"{"pattern": "Layered Parallax"}"#).unwrap();
        assert_eq!(params.pattern, PatternKind::Vortex);
        assert_eq!(PatternKind::parse_or_default("wireframe terrain"), PatternKind::WireframeTerrain);
    }

    #[test]
    fn test_bad_color_is_an_error() {
        let err = ParamSet::from_json(r#"{"colorA": "blue"}"#).unwrap_err();
        assert!(matches!(err, ParamError::Parse(_)));
    }

    #[test]
    fn test_capacity_accessors_clamp() {
        let params = ParamSet {
            count: 1_000_000,
            centers: 0,
            terrain_segments_x: 1,
            terrain_segments_y: 9999,
            raymarch_steps: 4096,
            ..Default::default()
        };
        assert_eq!(params.entity_count(), MAX_ENTITY_COUNT as usize);
        assert_eq!(params.center_count(), 1);
        assert_eq!(params.terrain_segments(), (2, MAX_SEGMENTS_Y as usize));
        assert_eq!(params.raymarch_step_limit(), MAX_RAYMARCH_STEPS);
    }

    #[test]
    fn test_wrap_and_jitter_defaults() {
        let params = ParamSet::default();
        assert_eq!(params.flow_wrap_fraction, 0.7);
        assert_eq!(params.center_jitter, 0.06);
    }

    #[test]
    fn test_selectable_excludes_particles() {
        assert_eq!(PatternKind::SELECTABLE.len(), 8);
        assert!(!PatternKind::SELECTABLE.contains(&PatternKind::Particles));
        assert!(PatternKind::ALL.iter().all(|k| PatternKind::from_name(k.name()) == Some(*k)));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("backdrop-params-{}.json", std::process::id()));
        let params = ParamSet::with_pattern(PatternKind::Raymarching);
        params.save(&path).unwrap();
        let loaded = ParamSet::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, params);

        let missing = ParamSet::load(path.with_extension("missing"));
        assert!(matches!(missing, Err(ParamError::Io { .. })));
    }
}
