//! Flow field: points drifting along a smooth, time-varying direction field.

use super::FrameContext;
use crate::buffers::{PointCloud, PointMaterial};
use crate::params::ParamSet;
use crate::sanitize::{non_finite_indices, Sanitize, SanitizeReport};
use crate::spawn::SpawnContext;
use crate::viewport::Viewport;
use glam::{Vec2, Vec3};
use std::f32::consts::PI;

#[derive(Clone, Debug)]
pub struct FlowField {
    pub cloud: PointCloud,
    seeds: Vec<f32>,
}

/// Flow direction angle at `p` for an entity with seed `s`.
///
/// A blend of two sinusoids; no lattice noise is involved.
#[inline]
pub fn flow_angle(p: Vec2, s: f32, t: f32) -> f32 {
    ((p.x * 0.003 + t * 0.6) + s).sin() * PI + ((p.y * 0.002 - t * 0.4) * 0.7 + s).cos() * PI * 0.5
}

/// Toroidal wrap into `[-bound, bound]`.
#[inline]
fn wrap(v: f32, bound: f32) -> f32 {
    if v > bound {
        -bound
    } else if v < -bound {
        bound
    } else {
        v
    }
}

impl FlowField {
    pub fn generate(params: &ParamSet, viewport: &Viewport, spawn: &mut SpawnContext) -> Self {
        let frustum = viewport.frustum();
        let count = params.entity_count();
        let a = params.color_a.rgb();
        let b = params.color_b.rgb();

        let mut cloud =
            PointCloud::with_capacity(count, PointMaterial::overlay(params.size * 0.9, 0.9));
        let mut seeds = Vec::with_capacity(count);
        for _ in 0..count {
            let p = spawn.in_box(frustum.width * 1.1, frustum.height * 1.1, 300.0);
            cloud.push(p, a.lerp(b, spawn.random()));
            seeds.push(spawn.random_range(0.0, 1000.0));
        }

        Self { cloud, seeds }
    }

    pub fn update(&mut self, ctx: &FrameContext) {
        let params = ctx.params;
        let t = ctx.frame.elapsed;
        let frustum = ctx.viewport.frustum();
        let bound_x = frustum.width * params.flow_wrap_fraction;
        let bound_y = frustum.height * params.flow_wrap_fraction;
        let step = 40.0 * params.circular_speed * ctx.frame.delta;
        let a = params.color_a.rgb();
        let b = params.color_b.rgb();

        for (i, &s) in self.seeds.iter().enumerate() {
            let p = self.cloud.positions[i].truncate();
            let angle = flow_angle(p, s, t);
            let x = wrap(p.x + angle.cos() * step, bound_x);
            let y = wrap(p.y + angle.sin() * step, bound_y);

            self.cloud.positions[i] = Vec3::new(x, y, ((x + y) * 0.002 + t * 0.8).sin() * 60.0);
            self.cloud.colors[i] = a.lerp(b, ((t * 0.2 + s).sin() + 1.0) * 0.5);
        }
    }

    pub fn seeds(&self) -> &[f32] {
        &self.seeds
    }
}

impl Sanitize for FlowField {
    fn sanitize(&mut self) -> SanitizeReport {
        let bad = non_finite_indices(&self.cloud.positions);
        for &i in bad.iter().rev() {
            self.cloud.swap_remove(i);
            self.seeds.swap_remove(i);
        }
        SanitizeReport::discarded(bad.len())
    }
}
