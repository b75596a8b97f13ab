//! Named parameter keys and change notifications.
//!
//! The control panel identifies each control by a [`ParamKey`] and sends a
//! [`ParamValue`]. Applying the value reports whether the change needs a full
//! regeneration of the active pattern or can be applied in place.

use super::{
    MotionMode, ParamSet, PatternKind, MAX_ENTITY_COUNT, MAX_RAYMARCH_STEPS, MAX_SEGMENTS_X,
    MAX_SEGMENTS_Y, MAX_SWIRL_CENTERS,
};
use crate::color::HexColor;
use crate::error::ParamError;
use std::ops::RangeInclusive;

/// How a parameter change must be applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    /// Buffers must be regenerated.
    Structural,
    /// Existing buffers are updated in place.
    Cosmetic,
}

/// A typed value carried by a change notification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamValue {
    Number(f32),
    Bool(bool),
    Color(HexColor),
    Pattern(PatternKind),
    Motion(MotionMode),
}

impl ParamValue {
    fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Number(_) => "number",
            ParamValue::Bool(_) => "bool",
            ParamValue::Color(_) => "color",
            ParamValue::Pattern(_) => "pattern",
            ParamValue::Motion(_) => "motion",
        }
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        ParamValue::Number(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<HexColor> for ParamValue {
    fn from(v: HexColor) -> Self {
        ParamValue::Color(v)
    }
}

impl From<PatternKind> for ParamValue {
    fn from(v: PatternKind) -> Self {
        ParamValue::Pattern(v)
    }
}

impl From<MotionMode> for ParamValue {
    fn from(v: MotionMode) -> Self {
        ParamValue::Motion(v)
    }
}

macro_rules! param_keys {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// One key per entry of the parameter set.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum ParamKey {
            $($variant,)*
        }

        impl ParamKey {
            /// Every key, in control panel order.
            pub const ALL: &'static [ParamKey] = &[$(ParamKey::$variant,)*];

            /// The JSON / control name.
            pub fn name(&self) -> &'static str {
                match self {
                    $(ParamKey::$variant => $name,)*
                }
            }

            /// Reverse lookup of [`ParamKey::name`].
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(ParamKey::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

param_keys! {
    Pattern => "pattern",
    ColorA => "colorA",
    ColorB => "colorB",
    Count => "count",
    Size => "size",
    Speed => "speed",
    Spread => "spread",
    Background => "background",
    Motion => "motion",
    ColorSpeed => "colorSpeed",
    Gradient => "gradient",
    GradientAngle => "gradientAngle",
    Centers => "centers",
    CircularSpeed => "circularSpeed",
    SwirlIntensity => "swirlIntensity",
    RadialWobble => "radialWobble",
    ShaderDistortion => "shaderDistortion",
    ShaderSpeed => "shaderSpeed",
    WaveHeight => "waveHeight",
    WaveSpeed => "waveSpeed",
    TerrainSegmentsX => "terrainSegmentsX",
    TerrainSegmentsY => "terrainSegmentsY",
    TerrainScale => "terrainScale",
    TerrainHeight => "terrainHeight",
    TerrainSpeed => "terrainSpeed",
    TerrainWireframe => "terrainWireframe",
    RaymarchSteps => "raymarchSteps",
    RaymarchMaxDistance => "raymarchMaxDistance",
    RaymarchEpsilon => "raymarchEpsilon",
    RaymarchLightX => "raymarchLightX",
    RaymarchLightY => "raymarchLightY",
    RaymarchLightZ => "raymarchLightZ",
    RaySphereModAmp => "raySphereModAmp",
    RaySphereModFreq => "raySphereModFreq",
    RayNoiseScale => "rayNoiseScale",
    RayNoiseSpeed => "rayNoiseSpeed",
    RayNoiseIntensity => "rayNoiseIntensity",
    FlowWrapFraction => "flowWrapFraction",
    CenterJitter => "centerJitter",
}

impl ParamKey {
    /// Documented control range for numeric keys.
    ///
    /// The control panel clamps to these; the engine itself does not.
    pub fn range(&self) -> Option<RangeInclusive<f32>> {
        use ParamKey::*;
        let range = match self {
            Count => 100.0..=4000.0,
            Size => 0.5..=20.0,
            Speed => 0.1..=3.0,
            Spread => 100.0..=2000.0,
            ColorSpeed => 0.0..=3.0,
            GradientAngle => 0.0..=360.0,
            Centers => 1.0..=8.0,
            CircularSpeed => 0.0..=4.0,
            SwirlIntensity => 0.0..=3.0,
            RadialWobble => 0.0..=2.0,
            ShaderDistortion | ShaderSpeed => 0.0..=4.0,
            WaveHeight => 0.0..=200.0,
            WaveSpeed => 0.0..=4.0,
            TerrainSegmentsX => 8.0..=600.0,
            TerrainSegmentsY => 4.0..=400.0,
            TerrainScale => 0.2..=6.0,
            TerrainHeight => 0.0..=600.0,
            TerrainSpeed => 0.0..=4.0,
            RaymarchSteps => 8.0..=256.0,
            RaymarchMaxDistance => 100.0..=5000.0,
            RaymarchEpsilon => 0.0001..=0.01,
            RaymarchLightX | RaymarchLightY | RaymarchLightZ => -2000.0..=2000.0,
            RaySphereModAmp => 0.0..=300.0,
            RaySphereModFreq => 0.0..=8.0,
            RayNoiseScale => 0.05..=4.0,
            RayNoiseSpeed | RayNoiseIntensity => 0.0..=4.0,
            FlowWrapFraction => 0.1..=2.0,
            CenterJitter => 0.0..=0.5,
            Pattern | ColorA | ColorB | Background | Motion | Gradient | TerrainWireframe => {
                return None
            }
        };
        Some(range)
    }

    /// Whether changing this key forces regeneration.
    pub fn change_kind(&self) -> ChangeKind {
        use ParamKey::*;
        match self {
            Pattern | Count | Spread | Centers | TerrainSegmentsX | TerrainSegmentsY
            | CenterJitter => ChangeKind::Structural,
            _ => ChangeKind::Cosmetic,
        }
    }

    /// Whether the control panel shows this key while `kind` is selected.
    pub fn visible_for(&self, kind: PatternKind) -> bool {
        use ParamKey::*;
        match self {
            Pattern | ColorA | ColorB | Background | Gradient | GradientAngle => true,
            Centers | CircularSpeed | SwirlIntensity | RadialWobble | Count | Speed | Spread
            | Motion | ColorSpeed | FlowWrapFraction | CenterJitter => kind.is_particle(),
            Size => {
                kind.is_particle()
                    || matches!(kind, PatternKind::Waves | PatternKind::DistortingPlane)
            }
            WaveHeight | WaveSpeed => kind == PatternKind::Waves,
            ShaderDistortion | ShaderSpeed => kind == PatternKind::DistortingPlane,
            TerrainSegmentsX | TerrainSegmentsY | TerrainScale | TerrainHeight | TerrainSpeed
            | TerrainWireframe => kind == PatternKind::WireframeTerrain,
            RaymarchSteps | RaymarchMaxDistance | RaymarchEpsilon | RaymarchLightX
            | RaymarchLightY | RaymarchLightZ | RaySphereModAmp | RaySphereModFreq
            | RayNoiseScale | RayNoiseSpeed | RayNoiseIntensity => kind == PatternKind::Raymarching,
        }
    }

    fn expected(&self) -> &'static str {
        use ParamKey::*;
        match self {
            Pattern => "pattern",
            ColorA | ColorB | Background => "color",
            Motion => "motion",
            Gradient | TerrainWireframe => "bool",
            _ => "number",
        }
    }
}

/// Round and clamp a control value onto an integer capacity.
fn to_count(value: f32, min: u32, max: u32) -> u32 {
    let rounded = value.round();
    if rounded.is_nan() {
        return min;
    }
    rounded.clamp(min as f32, max as f32) as u32
}

impl ParamSet {
    /// Read the current value of `key`.
    pub fn get(&self, key: ParamKey) -> ParamValue {
        use ParamKey::*;
        match key {
            Pattern => ParamValue::Pattern(self.pattern),
            ColorA => ParamValue::Color(self.color_a),
            ColorB => ParamValue::Color(self.color_b),
            Background => ParamValue::Color(self.background),
            Motion => ParamValue::Motion(self.motion),
            Gradient => ParamValue::Bool(self.gradient),
            TerrainWireframe => ParamValue::Bool(self.terrain_wireframe),
            Count => ParamValue::Number(self.count as f32),
            Centers => ParamValue::Number(self.centers as f32),
            TerrainSegmentsX => ParamValue::Number(self.terrain_segments_x as f32),
            TerrainSegmentsY => ParamValue::Number(self.terrain_segments_y as f32),
            RaymarchSteps => ParamValue::Number(self.raymarch_steps as f32),
            _ => ParamValue::Number(self.number_slot(key).unwrap_or_default()),
        }
    }

    /// Apply a change notification and classify it.
    ///
    /// Integer keys round and clamp to their capacity maxima. A value of the
    /// wrong type leaves the set untouched and returns an error.
    pub fn set(&mut self, key: ParamKey, value: ParamValue) -> Result<ChangeKind, ParamError> {
        use ParamKey::*;
        let mismatch = || ParamError::TypeMismatch {
            key: key.name(),
            expected: key.expected(),
            found: value.type_name(),
        };

        match (key, value) {
            (Pattern, ParamValue::Pattern(v)) => self.pattern = v,
            (ColorA, ParamValue::Color(v)) => self.color_a = v,
            (ColorB, ParamValue::Color(v)) => self.color_b = v,
            (Background, ParamValue::Color(v)) => self.background = v,
            (Motion, ParamValue::Motion(v)) => self.motion = v,
            (Gradient, ParamValue::Bool(v)) => self.gradient = v,
            (TerrainWireframe, ParamValue::Bool(v)) => self.terrain_wireframe = v,
            (Count, ParamValue::Number(v)) => self.count = to_count(v, 1, MAX_ENTITY_COUNT),
            (Centers, ParamValue::Number(v)) => self.centers = to_count(v, 1, MAX_SWIRL_CENTERS),
            (TerrainSegmentsX, ParamValue::Number(v)) => {
                self.terrain_segments_x = to_count(v, 2, MAX_SEGMENTS_X)
            }
            (TerrainSegmentsY, ParamValue::Number(v)) => {
                self.terrain_segments_y = to_count(v, 2, MAX_SEGMENTS_Y)
            }
            (RaymarchSteps, ParamValue::Number(v)) => {
                self.raymarch_steps = to_count(v, 1, MAX_RAYMARCH_STEPS)
            }
            (_, ParamValue::Number(v)) => match self.number_slot_mut(key) {
                Some(slot) => *slot = v,
                None => return Err(mismatch()),
            },
            _ => return Err(mismatch()),
        }

        tracing::trace!(key = key.name(), ?value, "parameter changed");
        Ok(key.change_kind())
    }
}

macro_rules! number_slots {
    ($($key:ident => $field:ident),* $(,)?) => {
        impl ParamSet {
            fn number_slot(&self, key: ParamKey) -> Option<f32> {
                match key {
                    $(ParamKey::$key => Some(self.$field),)*
                    _ => None,
                }
            }

            fn number_slot_mut(&mut self, key: ParamKey) -> Option<&mut f32> {
                match key {
                    $(ParamKey::$key => Some(&mut self.$field),)*
                    _ => None,
                }
            }
        }
    };
}

number_slots! {
    Size => size,
    Speed => speed,
    Spread => spread,
    ColorSpeed => color_speed,
    GradientAngle => gradient_angle,
    CircularSpeed => circular_speed,
    SwirlIntensity => swirl_intensity,
    RadialWobble => radial_wobble,
    ShaderDistortion => shader_distortion,
    ShaderSpeed => shader_speed,
    WaveHeight => wave_height,
    WaveSpeed => wave_speed,
    TerrainScale => terrain_scale,
    TerrainHeight => terrain_height,
    TerrainSpeed => terrain_speed,
    RaymarchMaxDistance => raymarch_max_distance,
    RaymarchEpsilon => raymarch_epsilon,
    RaymarchLightX => raymarch_light_x,
    RaymarchLightY => raymarch_light_y,
    RaymarchLightZ => raymarch_light_z,
    RaySphereModAmp => ray_sphere_mod_amp,
    RaySphereModFreq => ray_sphere_mod_freq,
    RayNoiseScale => ray_noise_scale,
    RayNoiseSpeed => ray_noise_speed,
    RayNoiseIntensity => ray_noise_intensity,
    FlowWrapFraction => flow_wrap_fraction,
    CenterJitter => center_jitter,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_roundtrip() {
        for key in ParamKey::ALL {
            assert_eq!(ParamKey::from_name(key.name()), Some(*key));
        }
        assert_eq!(ParamKey::ALL.len(), 39);
        assert_eq!(ParamKey::from_name("nope"), None);
    }

    #[test]
    fn test_every_key_is_readable() {
        let params = ParamSet::default();
        for key in ParamKey::ALL {
            let value = params.get(*key);
            let mut copy = params.clone();
            assert!(copy.set(*key, value).is_ok(), "{}", key.name());
            assert_eq!(copy, params);
        }
    }

    #[test]
    fn test_change_classification() {
        let mut params = ParamSet::default();
        assert_eq!(
            params.set(ParamKey::Count, 500.0.into()).unwrap(),
            ChangeKind::Structural
        );
        assert_eq!(
            params.set(ParamKey::Pattern, PatternKind::Waves.into()).unwrap(),
            ChangeKind::Structural
        );
        assert_eq!(
            params.set(ParamKey::ColorSpeed, 1.5.into()).unwrap(),
            ChangeKind::Cosmetic
        );
        assert_eq!(
            params
                .set(ParamKey::ColorA, HexColor::from_rgb8(1, 2, 3).into())
                .unwrap(),
            ChangeKind::Cosmetic
        );
        assert_eq!(params.count, 500);
        assert_eq!(params.color_speed, 1.5);
    }

    #[test]
    fn test_integer_keys_round_and_clamp() {
        let mut params = ParamSet::default();
        params.set(ParamKey::Count, 99.6.into()).unwrap();
        assert_eq!(params.count, 100);
        params.set(ParamKey::Count, 1.0e9.into()).unwrap();
        assert_eq!(params.count, MAX_ENTITY_COUNT);
        params.set(ParamKey::TerrainSegmentsX, f32::NAN.into()).unwrap();
        assert_eq!(params.terrain_segments_x, 2);
        params.set(ParamKey::RaymarchSteps, 10_000.0.into()).unwrap();
        assert_eq!(params.raymarch_steps, MAX_RAYMARCH_STEPS);
    }

    #[test]
    fn test_type_mismatch_leaves_set_untouched() {
        let mut params = ParamSet::default();
        let err = params.set(ParamKey::Count, true.into()).unwrap_err();
        assert_eq!(err.to_string(), "parameter count expects number, got bool");

        let err = params.set(ParamKey::Gradient, 1.0.into()).unwrap_err();
        assert!(matches!(err, ParamError::TypeMismatch { key: "gradient", .. }));
        assert_eq!(params, ParamSet::default());
    }

    #[test]
    fn test_ranges_contain_defaults() {
        let params = ParamSet::default();
        for key in ParamKey::ALL {
            if let (Some(range), ParamValue::Number(v)) = (key.range(), params.get(*key)) {
                assert!(range.contains(&v), "{} default {v} outside range", key.name());
            }
        }
    }

    #[test]
    fn test_visibility_by_pattern() {
        assert!(ParamKey::Centers.visible_for(PatternKind::Vortex));
        assert!(!ParamKey::Centers.visible_for(PatternKind::Waves));
        assert!(ParamKey::TerrainHeight.visible_for(PatternKind::WireframeTerrain));
        assert!(ParamKey::RayNoiseScale.visible_for(PatternKind::Raymarching));
        assert!(!ParamKey::RayNoiseScale.visible_for(PatternKind::DistortingPlane));
        assert!(ParamKey::ColorA.visible_for(PatternKind::Raymarching));
    }
}
