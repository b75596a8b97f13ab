//! The pattern engine.
//!
//! Every archetype is a state struct with a generator and an in-place
//! updater. [`Pattern`] wraps one of them and dispatches with a single
//! `match`; the scene holds at most one `Pattern` at a time and dropping it
//! releases every buffer the archetype allocated.
//!
//! # Lifecycle
//!
//! ```ignore
//! let mut spawn = SpawnContext::seeded(7);
//! let mut pattern = Pattern::generate(&params, &viewport, &mut spawn);
//!
//! let mut frame = FrameTime::ZERO;
//! loop {
//!     frame = frame.next(1.0 / 60.0);
//!     pattern.update(&FrameContext::new(frame, &params, &viewport));
//!     let report = pattern.sanitize();
//! }
//! ```

mod fireflies;
mod flow;
mod lissajous;
mod mesh;
mod orbit;
mod shader;

pub use fireflies::{twinkle, Fireflies};
pub use flow::{flow_angle, FlowField};
pub use lissajous::Lissajous;
pub use mesh::{terrain_height, wave_height, Terrain, Waves, WAVE_SEGMENTS};
pub use orbit::{OrbitStyle, OrbitSwarm};
pub use shader::{
    program, DistortingPlane, PlaneUniforms, RaymarchUniforms, Raymarching, PLANE_FRAGMENT_BODY,
    PLANE_SEGMENTS, PLANE_VERTEX_BODY, QUAD_VERTEX, RAYMARCH_FRAGMENT_BODY,
};

use crate::buffers::{MeshSurface, PointCloud, PointMaterial};
use crate::color::offset_hsl;
use crate::params::{ParamSet, PatternKind};
use crate::sanitize::{Sanitize, SanitizeReport};
use crate::spawn::SpawnContext;
use crate::time::FrameTime;
use crate::viewport::Viewport;
use glam::Vec3;

/// Read-only inputs to one update pass.
#[derive(Clone, Copy, Debug)]
pub struct FrameContext<'a> {
    pub frame: FrameTime,
    pub params: &'a ParamSet,
    pub viewport: &'a Viewport,
}

impl<'a> FrameContext<'a> {
    pub fn new(frame: FrameTime, params: &'a ParamSet, viewport: &'a Viewport) -> Self {
        Self {
            frame,
            params,
            viewport,
        }
    }
}

/// Hue and lightness oscillation around a stored base color.
///
/// Always derived from `base`, never from the previous frame's color, so it
/// cannot drift.
#[inline]
pub fn cycle_color(base: Vec3, t: f32, color_speed: f32, index: usize) -> Vec3 {
    let i = index as f32;
    let dh = (t * color_speed + i * 0.02).sin() * 0.12;
    let dl = (t * color_speed * (2.0 / 3.0) + i * 0.01).cos() * 0.04;
    offset_hsl(base, dh, 0.0, dl)
}

/// Point material of a particle archetype at point size `size`.
///
/// `None` for mesh and shader archetypes.
pub fn point_material(kind: PatternKind, size: f32) -> Option<PointMaterial> {
    match kind {
        PatternKind::Particles => Some(PointMaterial::normal(size, 0.95)),
        PatternKind::Vortex => Some(PointMaterial::additive(size, 0.95)),
        PatternKind::FlowField => Some(PointMaterial::overlay(size * 0.9, 0.9)),
        PatternKind::Lissajous => Some(PointMaterial::overlay(size, 0.95)),
        PatternKind::Fireflies => Some(PointMaterial::additive(size * 1.8, 0.9)),
        _ => None,
    }
}

/// The active archetype and its owned buffers.
#[derive(Clone, Debug)]
pub enum Pattern {
    Particles(OrbitSwarm),
    Vortex(OrbitSwarm),
    FlowField(FlowField),
    Lissajous(Lissajous),
    Fireflies(Fireflies),
    Waves(Waves),
    DistortingPlane(DistortingPlane),
    WireframeTerrain(Terrain),
    Raymarching(Raymarching),
}

impl Pattern {
    /// Generate the archetype selected in `params`.
    pub fn generate(params: &ParamSet, viewport: &Viewport, spawn: &mut SpawnContext) -> Self {
        Self::generate_kind(params.pattern, params, viewport, spawn)
    }

    /// Generate a specific archetype.
    pub fn generate_kind(
        kind: PatternKind,
        params: &ParamSet,
        viewport: &Viewport,
        spawn: &mut SpawnContext,
    ) -> Self {
        match kind {
            PatternKind::Particles => Pattern::Particles(OrbitSwarm::generate(
                OrbitStyle::Particles,
                params,
                viewport,
                spawn,
            )),
            PatternKind::Vortex => Pattern::Vortex(OrbitSwarm::generate(
                OrbitStyle::Vortex,
                params,
                viewport,
                spawn,
            )),
            PatternKind::FlowField => {
                Pattern::FlowField(FlowField::generate(params, viewport, spawn))
            }
            PatternKind::Lissajous => Pattern::Lissajous(Lissajous::generate(params, spawn)),
            PatternKind::Fireflies => {
                Pattern::Fireflies(Fireflies::generate(params, viewport, spawn))
            }
            PatternKind::Waves => Pattern::Waves(Waves::generate(params)),
            PatternKind::DistortingPlane => {
                Pattern::DistortingPlane(DistortingPlane::generate(params))
            }
            PatternKind::WireframeTerrain => Pattern::WireframeTerrain(Terrain::generate(params)),
            PatternKind::Raymarching => Pattern::Raymarching(Raymarching::generate(params, viewport)),
        }
    }

    pub fn kind(&self) -> PatternKind {
        match self {
            Pattern::Particles(_) => PatternKind::Particles,
            Pattern::Vortex(_) => PatternKind::Vortex,
            Pattern::FlowField(_) => PatternKind::FlowField,
            Pattern::Lissajous(_) => PatternKind::Lissajous,
            Pattern::Fireflies(_) => PatternKind::Fireflies,
            Pattern::Waves(_) => PatternKind::Waves,
            Pattern::DistortingPlane(_) => PatternKind::DistortingPlane,
            Pattern::WireframeTerrain(_) => PatternKind::WireframeTerrain,
            Pattern::Raymarching(_) => PatternKind::Raymarching,
        }
    }

    /// Advance the buffers to `ctx.frame`.
    pub fn update(&mut self, ctx: &FrameContext) {
        match self {
            Pattern::Particles(s) | Pattern::Vortex(s) => s.update(ctx),
            Pattern::FlowField(f) => f.update(ctx),
            Pattern::Lissajous(l) => l.update(ctx),
            Pattern::Fireflies(f) => f.update(ctx),
            Pattern::Waves(w) => w.update(ctx),
            Pattern::DistortingPlane(p) => p.update(ctx),
            Pattern::WireframeTerrain(t) => t.update(ctx),
            Pattern::Raymarching(r) => r.update(ctx),
        }
    }

    /// Apply an endpoint color change in place.
    ///
    /// Archetypes that derive colors from the parameters every frame pick the
    /// change up on their next update; shader uniforms are refreshed now.
    pub fn recolor(&mut self, params: &ParamSet) {
        match self {
            Pattern::Particles(s) | Pattern::Vortex(s) => s.recolor(params),
            Pattern::Lissajous(l) => l.recolor(params),
            Pattern::Waves(w) => w.recolor(params),
            Pattern::WireframeTerrain(t) => t.recolor(params),
            Pattern::DistortingPlane(p) => {
                p.surface.uniforms.color_a = params.color_a.rgb();
                p.surface.uniforms.color_b = params.color_b.rgb();
            }
            Pattern::Raymarching(r) => {
                r.surface.uniforms.color_a = params.color_a.rgb();
                r.surface.uniforms.color_b = params.color_b.rgb();
                r.surface.uniforms.bg_color = params.background.rgb();
            }
            Pattern::FlowField(_) | Pattern::Fireflies(_) => {}
        }
    }

    /// Apply a point size change, keeping each archetype's size factor.
    pub fn set_point_size(&mut self, size: f32) {
        let material = point_material(self.kind(), size);
        if let (Some(material), Some(cloud)) = (material, self.points_mut()) {
            cloud.material = material;
        }
    }

    pub fn points(&self) -> Option<&PointCloud> {
        match self {
            Pattern::Particles(s) | Pattern::Vortex(s) => Some(&s.cloud),
            Pattern::FlowField(f) => Some(&f.cloud),
            Pattern::Lissajous(l) => Some(&l.cloud),
            Pattern::Fireflies(f) => Some(&f.cloud),
            _ => None,
        }
    }

    fn points_mut(&mut self) -> Option<&mut PointCloud> {
        match self {
            Pattern::Particles(s) | Pattern::Vortex(s) => Some(&mut s.cloud),
            Pattern::FlowField(f) => Some(&mut f.cloud),
            Pattern::Lissajous(l) => Some(&mut l.cloud),
            Pattern::Fireflies(f) => Some(&mut f.cloud),
            _ => None,
        }
    }

    pub fn mesh(&self) -> Option<&MeshSurface> {
        match self {
            Pattern::Waves(w) => Some(&w.mesh),
            Pattern::WireframeTerrain(t) => Some(&t.mesh),
            _ => None,
        }
    }

    /// Live position buffer. Empty for shader surfaces.
    pub fn positions(&self) -> &[Vec3] {
        if let Some(cloud) = self.points() {
            &cloud.positions
        } else if let Some(mesh) = self.mesh() {
            &mesh.positions
        } else {
            &[]
        }
    }

    /// Entities for point clouds, vertices for meshes, 0 for shader surfaces.
    pub fn element_count(&self) -> usize {
        self.positions().len()
    }
}

impl Sanitize for Pattern {
    fn sanitize(&mut self) -> SanitizeReport {
        let report = match self {
            Pattern::Particles(s) | Pattern::Vortex(s) => s.sanitize(),
            Pattern::FlowField(f) => f.sanitize(),
            Pattern::Lissajous(l) => l.sanitize(),
            Pattern::Fireflies(f) => f.sanitize(),
            Pattern::Waves(w) => w.sanitize(),
            Pattern::DistortingPlane(p) => p.sanitize(),
            Pattern::WireframeTerrain(t) => t.sanitize(),
            Pattern::Raymarching(r) => r.sanitize(),
        };
        if report.discarded_entities > 0 || report.discarded_surface {
            tracing::warn!(
                pattern = %self.kind(),
                entities = report.discarded_entities,
                surface = report.discarded_surface,
                "discarded non-finite geometry"
            );
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_every_kind() {
        let params = ParamSet::default();
        let viewport = Viewport::default();
        let mut spawn = SpawnContext::seeded(1);
        for kind in PatternKind::ALL {
            let pattern = Pattern::generate_kind(kind, &params, &viewport, &mut spawn);
            assert_eq!(pattern.kind(), kind);
            if kind.is_particle() {
                assert_eq!(pattern.element_count(), params.entity_count());
            } else if kind.is_shader() {
                assert_eq!(pattern.element_count(), 0);
            } else {
                assert!(pattern.mesh().is_some());
            }
        }
    }

    #[test]
    fn test_generated_materials_match_point_material() {
        let params = ParamSet::default();
        let viewport = Viewport::default();
        let mut spawn = SpawnContext::seeded(4);
        for kind in PatternKind::ALL {
            let pattern = Pattern::generate_kind(kind, &params, &viewport, &mut spawn);
            assert_eq!(
                pattern.points().map(|c| c.material),
                point_material(kind, params.size),
                "{kind}"
            );
        }
    }

    #[test]
    fn test_cycle_color_is_periodic_not_cumulative() {
        let base = Vec3::new(0.2, 0.5, 0.9);
        let a = cycle_color(base, 1.0, 0.6, 3);
        let b = cycle_color(base, 1.0, 0.6, 3);
        assert_eq!(a, b);
        let c = cycle_color(base, 0.0, 0.0, 0);
        // At t = 0 with zero phase only the lightness term (cos 0 * 0.04) applies.
        assert!((crate::color::rgb_to_hsl(c).z - (crate::color::rgb_to_hsl(base).z + 0.04)).abs() < 1e-4);
    }

    #[test]
    fn test_point_size_factors() {
        let viewport = Viewport::default();
        let mut spawn = SpawnContext::seeded(2);
        let params = ParamSet::with_pattern(PatternKind::Fireflies);
        let mut pattern = Pattern::generate(&params, &viewport, &mut spawn);
        pattern.set_point_size(4.0);
        assert_eq!(pattern.points().map(|c| c.material.size), Some(7.2));
    }
}
