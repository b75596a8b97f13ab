//! Integration tests for the `#[derive(ShaderUniforms)]` macro.
//!
//! These verify the generated declarations, entry order and value conversion
//! by using the derived implementations from outside the crate.

use backdrop::uniforms::{ShaderUniforms, UniformValue};
use glam::{Vec2, Vec3};

#[derive(backdrop::ShaderUniforms, Clone, Copy, Debug)]
struct Glow {
    time: f32,
    resolution: Vec2,
    color_a: Vec3,
    steps: u32,
    use_gradient: bool,
    #[uniform(name = "uIntensity")]
    intensity: f32,
}

fn glow() -> Glow {
    Glow {
        time: 1.5,
        resolution: Vec2::new(800.0, 600.0),
        color_a: Vec3::new(0.0, 0.5, 1.0),
        steps: 64,
        use_gradient: true,
        intensity: 0.25,
    }
}

#[test]
fn test_declarations_in_field_order() {
    assert_eq!(
        Glow::GLSL_DECLARATIONS,
        "uniform float time;\n\
         uniform vec2 resolution;\n\
         uniform vec3 colorA;\n\
         uniform float steps;\n\
         uniform float useGradient;\n\
         uniform float uIntensity;\n"
    );
}

#[test]
fn test_entries_convert_values() {
    let entries = glow().entries();
    let names: Vec<_> = entries.iter().map(|(n, _)| *n).collect();
    assert_eq!(
        names,
        ["time", "resolution", "colorA", "steps", "useGradient", "uIntensity"]
    );
    assert_eq!(entries[3].1, UniformValue::F32(64.0));
    assert_eq!(entries[4].1, UniformValue::F32(1.0));
}

#[test]
fn test_get_by_glsl_name() {
    let g = glow();
    assert_eq!(g.get("colorA"), Some(UniformValue::Vec3(Vec3::new(0.0, 0.5, 1.0))));
    assert_eq!(g.get("uIntensity"), Some(UniformValue::F32(0.25)));
    assert_eq!(g.get("intensity"), None);
}

#[test]
fn test_false_flag_is_zero() {
    let g = Glow {
        use_gradient: false,
        ..glow()
    };
    assert_eq!(g.get("useGradient"), Some(UniformValue::F32(0.0)));
}

#[test]
fn test_std140_layout() {
    let bytes = glow().to_bytes();
    // time @0, resolution @8, colorA @16, steps @28, useGradient @32, uIntensity @36
    assert_eq!(bytes.len(), 48);
    let read = |offset: usize| f32::from_ne_bytes(bytes[offset..offset + 4].try_into().unwrap());
    assert_eq!(read(0), 1.5);
    assert_eq!(read(8), 800.0);
    assert_eq!(read(20), 0.5);
    assert_eq!(read(28), 64.0);
    assert_eq!(read(36), 0.25);
}

#[test]
fn test_engine_records_match_programs() {
    use backdrop::patterns::{DistortingPlane, PlaneUniforms, RaymarchUniforms, Raymarching};

    let plane = DistortingPlane::vertex_shader();
    assert!(plane.starts_with(PlaneUniforms::GLSL_DECLARATIONS));
    for (name, _) in PlaneUniforms::from_params(&Default::default(), 0.0).entries() {
        assert!(plane.contains(&format!(" {name};\n")), "{name} not declared");
    }

    let fragment = Raymarching::fragment_shader();
    assert!(fragment.starts_with("precision highp float;\n"));
    assert!(fragment.contains(RaymarchUniforms::GLSL_DECLARATIONS));
}
