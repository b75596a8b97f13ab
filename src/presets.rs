//! Parameter presets

use crate::color::HexColor;
use crate::params::{MotionMode, ParamSet, PatternKind};

pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub params: fn() -> ParamSet,
}

pub static PRESETS: &[Preset] = &[
    Preset {
        name: "Deep Vortex",
        description: "Three glowing swirl centers with slow spiral drift",
        params: || ParamSet {
            pattern: PatternKind::Vortex,
            count: 1800,
            size: 2.5,
            centers: 3,
            swirl_intensity: 1.4,
            ..Default::default()
        },
    },
    Preset {
        name: "Starfield Orbits",
        description: "Many small orbits without spiral, depth tested",
        params: || ParamSet {
            pattern: PatternKind::Particles,
            color_a: HexColor::from_rgb8(0xff, 0xff, 0xff),
            color_b: HexColor::from_rgb8(0x66, 0x88, 0xff),
            count: 2500,
            size: 1.5,
            centers: 6,
            circular_speed: 0.6,
            color_speed: 0.2,
            gradient: false,
            ..Default::default()
        },
    },
    Preset {
        name: "Silk Currents",
        description: "Flow field drifting across a wide wrap area",
        params: || ParamSet {
            pattern: PatternKind::FlowField,
            color_a: HexColor::from_rgb8(0x22, 0xd3, 0xee),
            color_b: HexColor::from_rgb8(0xa7, 0x8b, 0xfa),
            count: 3000,
            size: 2.0,
            circular_speed: 1.5,
            flow_wrap_fraction: 0.9,
            motion: MotionMode::Float,
            ..Default::default()
        },
    },
    Preset {
        name: "Harmonograph",
        description: "Lissajous curves with a smooth index gradient",
        params: || ParamSet {
            pattern: PatternKind::Lissajous,
            count: 1500,
            spread: 900.0,
            speed: 0.6,
            ..Default::default()
        },
    },
    Preset {
        name: "Summer Night",
        description: "Warm flickering fireflies on a dark background",
        params: || ParamSet {
            pattern: PatternKind::Fireflies,
            color_a: HexColor::from_rgb8(0xff, 0xd1, 0x66),
            color_b: HexColor::from_rgb8(0x9a, 0xff, 0x6b),
            background: HexColor::from_rgb8(0x05, 0x08, 0x10),
            count: 600,
            size: 3.5,
            gradient: false,
            ..Default::default()
        },
    },
    Preset {
        name: "Ocean Swell",
        description: "Tall, slow waves",
        params: || ParamSet {
            pattern: PatternKind::Waves,
            color_a: HexColor::from_rgb8(0x00, 0x4e, 0x92),
            color_b: HexColor::from_rgb8(0x00, 0xd4, 0xff),
            wave_height: 40.0,
            wave_speed: 0.5,
            spread: 800.0,
            ..Default::default()
        },
    },
    Preset {
        name: "Liquid Sheet",
        description: "Shader-displaced plane with strong distortion",
        params: || ParamSet {
            pattern: PatternKind::DistortingPlane,
            shader_distortion: 2.4,
            shader_speed: 0.7,
            ..Default::default()
        },
    },
    Preset {
        name: "Synthwave Grid",
        description: "Neon wireframe terrain rolling toward the camera",
        params: || ParamSet {
            pattern: PatternKind::WireframeTerrain,
            color_a: HexColor::from_rgb8(0xff, 0x00, 0xcc),
            color_b: HexColor::from_rgb8(0x33, 0x33, 0xff),
            background: HexColor::from_rgb8(0x0d, 0x02, 0x21),
            terrain_segments_x: 120,
            terrain_segments_y: 60,
            terrain_height: 80.0,
            terrain_speed: 1.4,
            ..Default::default()
        },
    },
    Preset {
        name: "Molten Orb",
        description: "Raymarched sphere with heavy surface noise",
        params: || ParamSet {
            pattern: PatternKind::Raymarching,
            color_a: HexColor::from_rgb8(0xff, 0x6a, 0x00),
            color_b: HexColor::from_rgb8(0xff, 0xe0, 0x66),
            ray_sphere_mod_amp: 70.0,
            ray_noise_intensity: 2.0,
            raymarch_steps: 120,
            ..Default::default()
        },
    },
];

/// Look up a preset by name, ignoring case.
pub fn find(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}
