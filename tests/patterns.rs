//! Integration tests for the pattern engine.

use backdrop::patterns::{wave_height, Pattern};
use backdrop::prelude::*;
use backdrop::sanitize::is_finite_buffer;
use glam::Vec3;

fn run(pattern: &mut Pattern, params: &ParamSet, viewport: &Viewport, steps: usize, dt: f32) {
    let mut frame = FrameTime::ZERO;
    pattern.update(&FrameContext::new(frame, params, viewport));
    for _ in 0..steps {
        frame = frame.next(dt);
        pattern.update(&FrameContext::new(frame, params, viewport));
    }
}

/// Parameter sets at the edges of the documented control ranges.
fn edge_params(kind: PatternKind) -> Vec<ParamSet> {
    let low = ParamSet {
        pattern: kind,
        count: 100,
        size: 0.5,
        speed: 0.1,
        spread: 100.0,
        color_speed: 0.0,
        centers: 1,
        circular_speed: 0.0,
        swirl_intensity: 0.0,
        wave_height: 0.0,
        wave_speed: 0.0,
        terrain_segments_x: 8,
        terrain_segments_y: 4,
        terrain_scale: 0.2,
        terrain_height: 0.0,
        flow_wrap_fraction: 0.1,
        center_jitter: 0.0,
        ..Default::default()
    };
    let high = ParamSet {
        pattern: kind,
        count: 4000,
        size: 20.0,
        speed: 3.0,
        spread: 2000.0,
        color_speed: 3.0,
        centers: 8,
        circular_speed: 4.0,
        swirl_intensity: 3.0,
        wave_height: 200.0,
        wave_speed: 4.0,
        terrain_segments_x: 600,
        terrain_segments_y: 400,
        terrain_scale: 6.0,
        terrain_height: 600.0,
        terrain_speed: 4.0,
        flow_wrap_fraction: 2.0,
        center_jitter: 0.5,
        shader_distortion: 4.0,
        shader_speed: 4.0,
        ..Default::default()
    };
    vec![ParamSet::with_pattern(kind), low, high]
}

#[test]
fn test_updates_stay_finite_without_sanitizer() {
    let viewport = Viewport::new(1280, 720);
    let mut spawn = SpawnContext::seeded(99);
    for kind in PatternKind::ALL {
        for params in edge_params(kind) {
            for dt in [0.0, 1.0 / 60.0, 0.25] {
                let mut pattern = Pattern::generate(&params, &viewport, &mut spawn);
                run(&mut pattern, &params, &viewport, 20, dt);
                assert!(
                    is_finite_buffer(pattern.positions()),
                    "{kind} produced non-finite positions at dt {dt}"
                );
                if let Some(cloud) = pattern.points() {
                    assert!(is_finite_buffer(&cloud.colors), "{kind} colors");
                }
            }
        }
    }
}

#[test]
fn test_regeneration_preserves_lengths() {
    let params = ParamSet::default();
    let viewport = Viewport::default();
    let mut spawn = SpawnContext::seeded(5);
    for kind in PatternKind::ALL {
        let a = Pattern::generate_kind(kind, &params, &viewport, &mut spawn);
        let b = Pattern::generate_kind(kind, &params, &viewport, &mut spawn);
        assert_eq!(a.element_count(), b.element_count(), "{kind}");
        assert_eq!(a.points().is_some(), b.points().is_some());
        assert_eq!(a.mesh().is_some(), b.mesh().is_some());
        if let (Some(ca), Some(cb)) = (a.points(), b.points()) {
            assert_eq!(ca.colors.len(), cb.colors.len());
        }
    }
}

#[test]
fn test_lissajous_is_pure_in_time() {
    let params = ParamSet::with_pattern(PatternKind::Lissajous);
    let viewport = Viewport::default();
    let mut pattern = Pattern::generate(&params, &viewport, &mut SpawnContext::seeded(8));

    let at = FrameTime::new(3.7, 0.016);
    pattern.update(&FrameContext::new(at, &params, &viewport));
    let first = pattern.positions().to_vec();

    pattern.update(&FrameContext::new(FrameTime::new(9.0, 0.5), &params, &viewport));
    pattern.update(&FrameContext::new(at, &params, &viewport));
    assert_eq!(pattern.positions(), &first[..]);
}

#[test]
fn test_waves_closed_form_at_zero() {
    let params = ParamSet {
        pattern: PatternKind::Waves,
        spread: 600.0,
        ..Default::default()
    };
    let viewport = Viewport::default();
    let mut pattern = Pattern::generate(&params, &viewport, &mut SpawnContext::seeded(1));
    let mesh = pattern.mesh().expect("waves has a mesh");
    assert_eq!(mesh.base()[0].z, 0.0);
    let bx = mesh.base()[0].x;

    pattern.update(&FrameContext::new(FrameTime::ZERO, &params, &viewport));
    let z = pattern.positions()[0].z;
    let expected = (bx * 0.008).sin() * params.wave_height + params.wave_height / 3.0;
    assert_eq!(z, expected);
    assert_eq!(z, wave_height(bx, 0, 0.0, &params));
}

#[test]
fn test_sanitizer_repairs_single_mesh_nan() {
    let params = ParamSet::with_pattern(PatternKind::WireframeTerrain);
    let viewport = Viewport::default();
    let mut pattern = Pattern::generate(&params, &viewport, &mut SpawnContext::seeded(2));
    let k = 123;
    let expected = match &mut pattern {
        Pattern::WireframeTerrain(terrain) => {
            terrain.mesh.positions[k].y = f32::NAN;
            terrain.mesh.base()[k].y
        }
        _ => unreachable!(),
    };
    let report = pattern.sanitize();
    assert_eq!(report.repaired, 1);
    assert_eq!(pattern.positions()[k].y, expected);
    assert!(is_finite_buffer(pattern.positions()));
}

#[test]
fn test_sanitizer_discards_particle_entities() {
    let params = ParamSet::with_pattern(PatternKind::FlowField);
    let viewport = Viewport::default();
    let mut pattern = Pattern::generate(&params, &viewport, &mut SpawnContext::seeded(3));
    if let Pattern::FlowField(flow) = &mut pattern {
        flow.cloud.positions[0].x = f32::INFINITY;
        flow.cloud.positions[10].z = f32::NAN;
    }
    let report = pattern.sanitize();
    assert_eq!(report.discarded_entities, 2);
    assert_eq!(pattern.element_count(), params.entity_count() - 2);
    match &pattern {
        Pattern::FlowField(flow) => {
            assert_eq!(flow.seeds().len(), flow.cloud.len());
            assert_eq!(flow.cloud.colors.len(), flow.cloud.len());
        }
        _ => unreachable!(),
    }
}

#[test]
fn test_sanitizer_drops_mesh_with_no_finite_vertex() {
    let params = ParamSet::with_pattern(PatternKind::Waves);
    let viewport = Viewport::default();
    let mut pattern = Pattern::generate(&params, &viewport, &mut SpawnContext::seeded(4));
    if let Pattern::Waves(waves) = &mut pattern {
        waves.mesh.positions.fill(Vec3::NAN);
    }
    let report = pattern.sanitize();
    assert!(report.discarded_surface);
    assert_eq!(report.repaired, 0);
}

#[test]
fn test_lissajous_layout_spread_before_first_frame() {
    let params = ParamSet::with_pattern(PatternKind::Lissajous);
    let viewport = Viewport::default();
    let pattern = Pattern::generate(&params, &viewport, &mut SpawnContext::seeded(10));
    let positions = pattern.positions();
    let stacked = positions
        .iter()
        .filter(|p| p.x == 0.0 && p.y == 0.0)
        .count();
    assert_eq!(stacked, 0);
    let min_x = positions.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
    let max_x = positions.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
    assert!(max_x - min_x > params.spread * 0.5);
}
