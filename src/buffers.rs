//! Attribute buffers owned by pattern instances.
//!
//! Three surface shapes exist:
//!
//! - [`PointCloud`] - one position and one color per entity, plus a material
//! - [`MeshSurface`] - a fixed-topology grid with an immutable base copy of
//!   its rest positions
//! - [`ShaderSurface`] - a quad whose look lives entirely in a typed uniform
//!   record
//!
//! Buffers are plain `Vec<Vec3>` so updaters can index them directly. The
//! render collaborator reads them as raw bytes through the `*_bytes` views.

use glam::{Mat4, Quat, Vec2, Vec3};

/// How overlapping points combine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Standard alpha blending.
    #[default]
    Normal,
    /// Colors add up, overlapping points glow.
    Additive,
}

impl BlendMode {
    /// The matching three.js blending constant.
    pub fn three_js_constant(&self) -> &'static str {
        match self {
            BlendMode::Normal => "THREE.NormalBlending",
            BlendMode::Additive => "THREE.AdditiveBlending",
        }
    }
}

/// Draw state for a point cloud.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointMaterial {
    /// Point size in pixels.
    pub size: f32,
    pub opacity: f32,
    pub blend: BlendMode,
    pub depth_test: bool,
    pub depth_write: bool,
}

impl PointMaterial {
    /// Translucent points with depth testing on and depth writes off.
    pub fn normal(size: f32, opacity: f32) -> Self {
        Self {
            size,
            opacity,
            blend: BlendMode::Normal,
            depth_test: true,
            depth_write: false,
        }
    }

    /// Points drawn without depth testing.
    pub fn overlay(size: f32, opacity: f32) -> Self {
        Self {
            depth_test: false,
            ..Self::normal(size, opacity)
        }
    }

    /// Glowing points: additive and no depth test.
    pub fn additive(size: f32, opacity: f32) -> Self {
        Self {
            blend: BlendMode::Additive,
            ..Self::overlay(size, opacity)
        }
    }
}

/// Object transform applied by the renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Rotation about the x axis, in radians.
    pub rotation_x: f32,
    pub translation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            rotation_x: 0.0,
            translation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Model matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            Quat::from_rotation_x(self.rotation_x),
            self.translation,
        )
    }
}

/// Per-entity point buffers.
#[derive(Clone, Debug, PartialEq)]
pub struct PointCloud {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Vec3>,
    pub material: PointMaterial,
}

impl PointCloud {
    pub fn with_capacity(count: usize, material: PointMaterial) -> Self {
        Self {
            positions: Vec::with_capacity(count),
            colors: Vec::with_capacity(count),
            material,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Add one entity.
    pub fn push(&mut self, position: Vec3, color: Vec3) {
        self.positions.push(position);
        self.colors.push(color);
    }

    /// Remove entity `index`, moving the last entity into its slot.
    pub fn swap_remove(&mut self, index: usize) {
        self.positions.swap_remove(index);
        self.colors.swap_remove(index);
    }

    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn color_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }
}

/// Dimensions and resolution of a flat grid in the xy plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridSpec {
    pub width: f32,
    pub height: f32,
    pub segments_x: usize,
    pub segments_y: usize,
}

impl GridSpec {
    pub fn new(width: f32, height: f32, segments_x: usize, segments_y: usize) -> Self {
        Self {
            width,
            height,
            segments_x: segments_x.max(1),
            segments_y: segments_y.max(1),
        }
    }

    /// `(sx + 1)(sy + 1)`.
    pub fn vertex_count(&self) -> usize {
        (self.segments_x + 1) * (self.segments_y + 1)
    }

    /// Two triangles per cell.
    pub fn index_count(&self) -> usize {
        self.segments_x * self.segments_y * 6
    }

    /// Rest positions, row-major from the top-left corner.
    ///
    /// x runs from `-width/2` to `width/2`, y from `height/2` down to
    /// `-height/2`, z is 0.
    pub fn positions(&self) -> Vec<Vec3> {
        let seg_w = self.width / self.segments_x as f32;
        let seg_h = self.height / self.segments_y as f32;
        let half_w = self.width / 2.0;
        let half_h = self.height / 2.0;

        let mut out = Vec::with_capacity(self.vertex_count());
        for iy in 0..=self.segments_y {
            let y = half_h - iy as f32 * seg_h;
            for ix in 0..=self.segments_x {
                out.push(Vec3::new(ix as f32 * seg_w - half_w, y, 0.0));
            }
        }
        out
    }

    /// Texture coordinates matching [`GridSpec::positions`]; v is 1 at the top.
    pub fn uvs(&self) -> Vec<Vec2> {
        let mut out = Vec::with_capacity(self.vertex_count());
        for iy in 0..=self.segments_y {
            let v = 1.0 - iy as f32 / self.segments_y as f32;
            for ix in 0..=self.segments_x {
                out.push(Vec2::new(ix as f32 / self.segments_x as f32, v));
            }
        }
        out
    }

    /// Triangle list, `(a, b, d)` and `(b, c, d)` per cell.
    pub fn indices(&self) -> Vec<u32> {
        let gx1 = (self.segments_x + 1) as u32;
        let mut out = Vec::with_capacity(self.index_count());
        for iy in 0..self.segments_y as u32 {
            for ix in 0..self.segments_x as u32 {
                let a = ix + gx1 * iy;
                let b = ix + gx1 * (iy + 1);
                let c = (ix + 1) + gx1 * (iy + 1);
                let d = (ix + 1) + gx1 * iy;
                out.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }
        out
    }
}

/// A displaced grid mesh.
///
/// `base` is written once at generation and never mutated; updaters derive
/// `positions` from it every frame and the sanitizer repairs from it.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshSurface {
    pub grid: GridSpec,
    base: Vec<Vec3>,
    pub positions: Vec<Vec3>,
    pub colors: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub transform: Transform,
    pub wireframe: bool,
}

impl MeshSurface {
    /// Build the rest grid. Colors start white.
    pub fn from_grid(grid: GridSpec, transform: Transform) -> Self {
        let base = grid.positions();
        let positions = base.clone();
        let colors = vec![Vec3::ONE; base.len()];
        Self {
            grid,
            indices: grid.indices(),
            base,
            positions,
            colors,
            transform,
            wireframe: false,
        }
    }

    /// Immutable rest positions.
    #[inline]
    pub fn base(&self) -> &[Vec3] {
        &self.base
    }

    /// Live positions and the base they derive from, borrowed together.
    #[inline]
    pub fn split_mut(&mut self) -> (&mut [Vec3], &[Vec3]) {
        (&mut self.positions, &self.base)
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn color_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// A quad drawn by a shader program parameterized by `U`.
#[derive(Clone, Debug, PartialEq)]
pub struct ShaderSurface<U> {
    /// Quad corners in model space, top-left first, row-major.
    pub corners: [Vec3; 4],
    /// Tessellation of the quad for vertex displacement.
    pub segments: usize,
    pub transform: Transform,
    pub uniforms: U,
    pub transparent: bool,
}

impl<U> ShaderSurface<U> {
    /// A 2×2 quad centered on the origin.
    pub fn quad(segments: usize, transform: Transform, uniforms: U) -> Self {
        Self {
            corners: [
                Vec3::new(-1.0, 1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
            ],
            segments: segments.max(1),
            transform,
            uniforms,
            transparent: false,
        }
    }

    /// The tessellated quad as a grid.
    pub fn grid(&self) -> GridSpec {
        GridSpec::new(2.0, 2.0, self.segments, self.segments)
    }

    pub fn corner_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.corners)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_layout() {
        let grid = GridSpec::new(4.0, 2.0, 2, 1);
        let pos = grid.positions();
        assert_eq!(pos.len(), grid.vertex_count());
        assert_eq!(pos[0], Vec3::new(-2.0, 1.0, 0.0));
        assert_eq!(pos[2], Vec3::new(2.0, 1.0, 0.0));
        assert_eq!(pos[5], Vec3::new(2.0, -1.0, 0.0));
    }

    #[test]
    fn test_grid_indices() {
        let grid = GridSpec::new(1.0, 1.0, 1, 1);
        assert_eq!(grid.indices(), vec![0, 2, 1, 2, 3, 1]);

        let grid = GridSpec::new(1.0, 1.0, 3, 2);
        let indices = grid.indices();
        assert_eq!(indices.len(), grid.index_count());
        assert!(indices.iter().all(|&i| (i as usize) < grid.vertex_count()));
    }

    #[test]
    fn test_uvs_match_positions() {
        let grid = GridSpec::new(2.0, 2.0, 4, 4);
        let uvs = grid.uvs();
        assert_eq!(uvs[0], Vec2::new(0.0, 1.0));
        assert_eq!(uvs[uvs.len() - 1], Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_point_cloud_swap_remove() {
        let mut cloud = PointCloud::with_capacity(3, PointMaterial::normal(1.0, 1.0));
        cloud.push(Vec3::X, Vec3::ONE);
        cloud.push(Vec3::Y, Vec3::ZERO);
        cloud.push(Vec3::Z, Vec3::ONE);
        cloud.swap_remove(0);
        assert_eq!(cloud.positions, vec![Vec3::Z, Vec3::Y]);
        assert_eq!(cloud.position_bytes().len(), 2 * 12);
    }

    #[test]
    fn test_mesh_base_is_snapshot() {
        let mut mesh = MeshSurface::from_grid(GridSpec::new(2.0, 2.0, 2, 2), Transform::default());
        let (positions, base) = mesh.split_mut();
        positions[0].z = 5.0;
        assert_eq!(base[0].z, 0.0);
        assert_eq!(mesh.index_bytes().len(), mesh.indices.len() * 4);
    }

    #[test]
    fn test_materials() {
        let m = PointMaterial::additive(2.0, 0.9);
        assert_eq!(m.blend, BlendMode::Additive);
        assert!(!m.depth_test);
        assert!(PointMaterial::normal(1.0, 1.0).depth_test);
    }
}
