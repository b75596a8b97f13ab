//! Fireflies: jittering points with a noisy twinkle.
//!
//! The color mix is redrawn every frame from a generator-owned RNG, so the
//! flicker is intentionally not smooth.

use super::FrameContext;
use crate::buffers::{PointCloud, PointMaterial};
use crate::params::ParamSet;
use crate::sanitize::{non_finite_indices, Sanitize, SanitizeReport};
use crate::spawn::SpawnContext;
use crate::viewport::Viewport;
use rand::rngs::SmallRng;
use rand::Rng;

#[derive(Clone, Debug)]
pub struct Fireflies {
    pub cloud: PointCloud,
    intensity: Vec<f32>,
    rng: SmallRng,
}

/// Brightness weight in `0..=intensity`.
#[inline]
pub fn twinkle(t: f32, index: usize, intensity: f32) -> f32 {
    ((t * 3.0 + index as f32 * 0.5).sin() * 0.5 + 0.5) * intensity
}

impl Fireflies {
    pub fn generate(params: &ParamSet, viewport: &Viewport, spawn: &mut SpawnContext) -> Self {
        let frustum = viewport.frustum();
        let count = params.entity_count();
        let a = params.color_a.rgb();
        let b = params.color_b.rgb();

        let mut cloud =
            PointCloud::with_capacity(count, PointMaterial::additive(params.size * 1.8, 0.9));
        let mut intensity = Vec::with_capacity(count);
        for _ in 0..count {
            let p = spawn.in_box(frustum.width, frustum.height, 200.0);
            cloud.push(p, a.lerp(b, spawn.random()));
            intensity.push(spawn.random());
        }

        Self {
            cloud,
            intensity,
            rng: spawn.fork(),
        }
    }

    pub fn update(&mut self, ctx: &FrameContext) {
        let params = ctx.params;
        let t = ctx.frame.elapsed;
        let jitter = params.circular_speed * ctx.frame.delta;
        let a = params.color_a.rgb();
        let b = params.color_b.rgb();

        for (i, &weight) in self.intensity.iter().enumerate() {
            let fi = i as f32;
            let p = &mut self.cloud.positions[i];
            p.x += (t * 0.7 + fi).sin() * 0.2 * jitter;
            p.y += (t * 0.6 + fi * 0.7).cos() * 0.18 * jitter;
            p.z = (t * 0.9 + fi * 0.3).sin() * 60.0;

            let glow = twinkle(t, i, weight);
            let base = a.lerp(b, self.rng.gen::<f32>());
            self.cloud.colors[i] = base * (0.6 + glow * 0.8);
        }
    }

    pub fn intensities(&self) -> &[f32] {
        &self.intensity
    }
}

impl Sanitize for Fireflies {
    fn sanitize(&mut self) -> SanitizeReport {
        let bad = non_finite_indices(&self.cloud.positions);
        for &i in bad.iter().rev() {
            self.cloud.swap_remove(i);
            self.intensity.swap_remove(i);
        }
        SanitizeReport::discarded(bad.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FrameTime;

    #[test]
    fn test_twinkle_range() {
        for i in 0..50 {
            let w = twinkle(i as f32 * 0.37, i, 0.8);
            assert!((0.0..=0.8).contains(&w));
        }
    }

    #[test]
    fn test_brightness_bounded() {
        let params = ParamSet {
            count: 200,
            ..Default::default()
        };
        let viewport = Viewport::default();
        let mut f = Fireflies::generate(&params, &viewport, &mut SpawnContext::seeded(31));
        f.update(&FrameContext::new(FrameTime::new(2.0, 0.016), &params, &viewport));

        let brightest = params.color_a.rgb().max(params.color_b.rgb()) * 1.4;
        for c in &f.cloud.colors {
            assert!(c.cmple(brightest + 1e-5).all());
            assert!(c.cmpge(glam::Vec3::ZERO).all());
        }
        assert!(f.cloud.positions.iter().all(|p| p.z.abs() <= 60.0));
    }

    #[test]
    fn test_material() {
        let params = ParamSet::default();
        let f = Fireflies::generate(&params, &Viewport::default(), &mut SpawnContext::seeded(32));
        assert_eq!(f.cloud.material.size, params.size * 1.8);
        assert_eq!(f.intensities().len(), params.entity_count());
    }
}
