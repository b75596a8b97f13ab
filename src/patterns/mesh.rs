//! Displaced grid meshes: Waves and Wireframe Terrain.
//!
//! Displacement is a closed-form function of each vertex's base position and
//! the elapsed time; the previous frame's z is never read.

use super::FrameContext;
use crate::buffers::{GridSpec, MeshSurface, Transform};
use crate::params::ParamSet;
use crate::sanitize::{repair, Sanitize, SanitizeReport};
use glam::Vec3;

/// Fixed resolution of the wave sheet.
pub const WAVE_SEGMENTS: (usize, usize) = (200, 40);

/// Fill `colors` with a gradient along vertex index order.
fn gradient_colors(colors: &mut [Vec3], params: &ParamSet) {
    let a = params.color_a.rgb();
    let b = params.color_b.rgb();
    let n = colors.len().max(1) as f32;
    for (i, color) in colors.iter_mut().enumerate() {
        *color = a.lerp(b, i as f32 / n);
    }
}

/// Sanitize a mesh: repair from base, or drop it when no vertex is finite.
fn sanitize_mesh(mesh: &mut MeshSurface) -> SanitizeReport {
    let (positions, base) = mesh.split_mut();
    if !positions.is_empty() && positions.iter().all(|p| !p.is_finite()) {
        return SanitizeReport::surface_discarded(0);
    }
    SanitizeReport::repaired(repair(positions, base))
}

/// Wave height at vertex `index` with base x `bx`.
#[inline]
pub fn wave_height(bx: f32, index: usize, t: f32, params: &ParamSet) -> f32 {
    let travel = t * params.wave_speed;
    ((bx + travel * 40.0) * 0.008).sin() * params.wave_height
        + ((index as f32 + travel * 30.0) * 0.02).cos() * params.wave_height / 3.0
}

/// Terrain height at base position `(bx, by)`.
#[inline]
pub fn terrain_height(bx: f32, by: f32, t: f32, params: &ParamSet) -> f32 {
    let f = (bx + by) * 0.005 * params.terrain_scale + t * params.terrain_speed * 0.6;
    f.sin() * params.terrain_height
}

/// A tilted sheet of layered sine waves.
#[derive(Clone, Debug)]
pub struct Waves {
    pub mesh: MeshSurface,
}

impl Waves {
    pub fn generate(params: &ParamSet) -> Self {
        let grid = GridSpec::new(
            (params.spread * 2.0).min(1400.0),
            params.spread.min(600.0),
            WAVE_SEGMENTS.0,
            WAVE_SEGMENTS.1,
        );
        let transform = Transform {
            rotation_x: -0.5,
            ..Default::default()
        };
        let mut mesh = MeshSurface::from_grid(grid, transform);
        gradient_colors(&mut mesh.colors, params);
        Self { mesh }
    }

    pub fn update(&mut self, ctx: &FrameContext) {
        let t = ctx.frame.elapsed;
        let (positions, base) = self.mesh.split_mut();
        for (i, (p, b)) in positions.iter_mut().zip(base).enumerate() {
            *p = Vec3::new(b.x, b.y, wave_height(b.x, i, t, ctx.params));
        }
    }

    pub fn recolor(&mut self, params: &ParamSet) {
        gradient_colors(&mut self.mesh.colors, params);
    }
}

impl Sanitize for Waves {
    fn sanitize(&mut self) -> SanitizeReport {
        sanitize_mesh(&mut self.mesh)
    }
}

/// A tilted, optionally wireframe terrain sheet.
#[derive(Clone, Debug)]
pub struct Terrain {
    pub mesh: MeshSurface,
}

impl Terrain {
    pub fn generate(params: &ParamSet) -> Self {
        let (segments_x, segments_y) = params.terrain_segments();
        let grid = GridSpec::new(
            (params.spread * 2.0).min(1600.0),
            (params.spread * 1.2).min(900.0),
            segments_x,
            segments_y,
        );
        let transform = Transform {
            rotation_x: -0.6,
            translation: Vec3::new(0.0, -80.0, 0.0),
            ..Default::default()
        };
        let mut mesh = MeshSurface::from_grid(grid, transform);
        mesh.wireframe = params.terrain_wireframe;
        gradient_colors(&mut mesh.colors, params);
        Self { mesh }
    }

    pub fn update(&mut self, ctx: &FrameContext) {
        let t = ctx.frame.elapsed;
        let (positions, base) = self.mesh.split_mut();
        for (p, b) in positions.iter_mut().zip(base) {
            *p = Vec3::new(b.x, b.y, terrain_height(b.x, b.y, t, ctx.params));
        }
        self.mesh.wireframe = ctx.params.terrain_wireframe;
    }

    pub fn recolor(&mut self, params: &ParamSet) {
        gradient_colors(&mut self.mesh.colors, params);
    }
}

impl Sanitize for Terrain {
    fn sanitize(&mut self) -> SanitizeReport {
        sanitize_mesh(&mut self.mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FrameTime;
    use crate::viewport::Viewport;

    #[test]
    fn test_wave_dimensions() {
        let params = ParamSet {
            spread: 600.0,
            ..Default::default()
        };
        let w = Waves::generate(&params);
        assert_eq!(w.mesh.grid.width, 1200.0);
        assert_eq!(w.mesh.grid.height, 600.0);
        assert_eq!(w.mesh.vertex_count(), 201 * 41);
        assert!(w.mesh.base().iter().all(|p| p.z == 0.0));
    }

    #[test]
    fn test_terrain_segments_clamped() {
        let params = ParamSet {
            terrain_segments_x: 1,
            terrain_segments_y: 1,
            ..Default::default()
        };
        let t = Terrain::generate(&params);
        assert_eq!(t.mesh.vertex_count(), 9);
        assert_eq!(t.mesh.transform.translation.y, -80.0);
    }

    #[test]
    fn test_terrain_mirrors_wireframe_flag() {
        let mut params = ParamSet::default();
        let viewport = Viewport::default();
        let mut t = Terrain::generate(&params);
        assert!(t.mesh.wireframe);
        params.terrain_wireframe = false;
        t.update(&FrameContext::new(FrameTime::new(1.0, 0.1), &params, &viewport));
        assert!(!t.mesh.wireframe);
    }

    #[test]
    fn test_terrain_height_closed_form() {
        let params = ParamSet::default();
        let viewport = Viewport::default();
        let mut t = Terrain::generate(&params);
        t.update(&FrameContext::new(FrameTime::new(2.5, 0.1), &params, &viewport));
        let b = t.mesh.base()[17];
        let expected = ((b.x + b.y) * 0.005 * 1.8 + 2.5 * 0.9 * 0.6).sin() * 120.0;
        assert!((t.mesh.positions[17].z - expected).abs() < 1e-4);
    }

    #[test]
    fn test_mesh_repairs_from_base() {
        let mut w = Waves::generate(&ParamSet::default());
        w.mesh.positions[3] = Vec3::new(f32::NAN, 1.0, f32::INFINITY);
        let report = w.sanitize();
        assert_eq!(report.repaired, 2);
        assert!(!report.discarded_surface);
        assert_eq!(w.mesh.positions[3], Vec3::new(w.mesh.base()[3].x, 1.0, 0.0));
    }

    #[test]
    fn test_mesh_without_finite_vertex_is_discarded() {
        let mut t = Terrain::generate(&ParamSet::default());
        t.mesh.positions.fill(Vec3::NAN);
        let report = t.sanitize();
        assert!(report.discarded_surface);
        assert_eq!(report.repaired, 0);
    }

    #[test]
    fn test_gradient_colors_start_at_a() {
        let params = ParamSet::default();
        let w = Waves::generate(&params);
        assert_eq!(w.mesh.colors[0], params.color_a.rgb());
    }
}
