//! Viewport facts and frustum fitting.
//!
//! Particle generators scatter entities over the rectangle the camera can see
//! at depth zero, so the initial layout fills the screen whatever its shape.

/// Read-only camera and surface facts consumed by generators and updaters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Width / height.
    pub aspect: f32,
    /// Distance from the camera to the z = 0 plane.
    pub camera_distance: f32,
    pub width_px: u32,
    pub height_px: u32,
}

/// Visible rectangle at the z = 0 plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frustum {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1600, 900)
    }
}

impl Viewport {
    /// Perspective camera at the editor's default placement (50 degrees, z = 800).
    pub fn new(width_px: u32, height_px: u32) -> Self {
        let mut viewport = Self {
            fov_degrees: 50.0,
            aspect: 1.0,
            camera_distance: 800.0,
            width_px,
            height_px,
        };
        viewport.resize(width_px, height_px);
        viewport
    }

    /// Update pixel dimensions and the derived aspect ratio.
    pub fn resize(&mut self, width_px: u32, height_px: u32) {
        self.width_px = width_px.max(1);
        self.height_px = height_px.max(1);
        self.aspect = self.width_px as f32 / self.height_px as f32;
    }

    /// `height = 2·tan(fov/2)·distance`, `width = height·aspect`.
    pub fn frustum(&self) -> Frustum {
        let height = 2.0 * (self.fov_degrees.to_radians() / 2.0).tan() * self.camera_distance;
        Frustum {
            width: height * self.aspect,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frustum_matches_closed_form() {
        let vp = Viewport::new(1000, 500);
        let f = vp.frustum();
        let expected_h = 2.0 * (25.0f32).to_radians().tan() * 800.0;
        assert!((f.height - expected_h).abs() < 1e-3);
        assert!((f.width - expected_h * 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut vp = Viewport::default();
        vp.resize(300, 600);
        assert_eq!(vp.aspect, 0.5);
        // Zero sizes never produce a degenerate aspect.
        vp.resize(0, 0);
        assert_eq!(vp.aspect, 1.0);
    }
}
