//! Lissajous curves: every point traces a closed parametric figure.
//!
//! Positions are evaluated from the elapsed time each frame rather than
//! integrated, so re-evaluating the same time yields the same buffers.

use super::FrameContext;
use crate::buffers::{PointCloud, PointMaterial};
use crate::params::ParamSet;
use crate::sanitize::{non_finite_indices, Sanitize, SanitizeReport};
use crate::spawn::{progress, SpawnContext};
use glam::{Vec2, Vec3};
use std::f32::consts::TAU;

#[derive(Clone, Debug)]
pub struct Lissajous {
    pub cloud: PointCloud,
    /// Integer frequency pair per entity.
    frequencies: Vec<Vec2>,
    phase: Vec<f32>,
    amplitude: Vec2,
}

impl Lissajous {
    pub fn generate(params: &ParamSet, spawn: &mut SpawnContext) -> Self {
        let count = params.entity_count();
        let a = params.color_a.rgb();
        let b = params.color_b.rgb();

        let mut cloud = PointCloud::with_capacity(count, PointMaterial::overlay(params.size, 0.95));
        let mut frequencies = Vec::with_capacity(count);
        let mut phase = Vec::with_capacity(count);
        for i in 0..count {
            frequencies.push(Vec2::new(
                spawn.random_int(1, 6) as f32,
                spawn.random_int(1, 6) as f32,
            ));
            phase.push(spawn.random_range(0.0, TAU));
            cloud.push(Vec3::ZERO, a.lerp(b, progress(i, count)));
        }

        let mut lissajous = Self {
            cloud,
            frequencies,
            phase,
            amplitude: Vec2::new(
                (params.spread * 1.2).min(1200.0),
                (params.spread * 0.8).min(800.0),
            ),
        };
        lissajous.place(0.0);
        lissajous
    }

    /// Point `i` of its curve at time `t`.
    #[inline]
    fn curve(&self, i: usize, t: f32) -> Vec3 {
        let f = self.frequencies[i];
        let ph = self.phase[i];
        let half = self.amplitude * 0.5;
        Vec3::new(
            (f.x * t * 0.6 + ph).sin() * half.x,
            (f.y * t * 0.55 + ph * 0.8).sin() * half.y,
            ((f.x + f.y) * t * 0.15 + ph).cos() * 80.0,
        )
    }

    fn place(&mut self, t: f32) {
        for i in 0..self.cloud.len() {
            self.cloud.positions[i] = self.curve(i, t);
        }
    }

    /// Evaluate every curve at `ctx.frame.elapsed`.
    pub fn update(&mut self, ctx: &FrameContext) {
        let t = ctx.frame.elapsed;
        let a = ctx.params.color_a.rgb();
        let b = ctx.params.color_b.rgb();

        self.place(t);
        for (i, color) in self.cloud.colors.iter_mut().enumerate() {
            let mix = ((t * 0.3 + i as f32 * 0.02).sin() + 1.0) * 0.5;
            *color = a.lerp(b, mix);
        }
    }

    pub fn recolor(&mut self, params: &ParamSet) {
        let a = params.color_a.rgb();
        let b = params.color_b.rgb();
        let n = self.cloud.len();
        for (i, color) in self.cloud.colors.iter_mut().enumerate() {
            *color = a.lerp(b, progress(i, n));
        }
    }

    pub fn frequencies(&self) -> &[Vec2] {
        &self.frequencies
    }

    pub fn amplitude(&self) -> Vec2 {
        self.amplitude
    }
}

impl Sanitize for Lissajous {
    fn sanitize(&mut self) -> SanitizeReport {
        let bad = non_finite_indices(&self.cloud.positions);
        for &i in bad.iter().rev() {
            self.cloud.swap_remove(i);
            self.frequencies.swap_remove(i);
            self.phase.swap_remove(i);
        }
        SanitizeReport::discarded(bad.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FrameTime;
    use crate::viewport::Viewport;

    #[test]
    fn test_frequencies_are_small_integers() {
        let params = ParamSet::default();
        let l = Lissajous::generate(&params, &mut SpawnContext::seeded(21));
        for f in l.frequencies() {
            assert_eq!(f.x.fract(), 0.0);
            assert!((1.0..=6.0).contains(&f.x) && (1.0..=6.0).contains(&f.y));
        }
    }

    #[test]
    fn test_amplitude_caps() {
        let params = ParamSet {
            spread: 2000.0,
            ..Default::default()
        };
        let l = Lissajous::generate(&params, &mut SpawnContext::seeded(22));
        assert_eq!(l.amplitude(), Vec2::new(1200.0, 800.0));
    }

    #[test]
    fn test_initial_colors_follow_index() {
        let params = ParamSet {
            count: 5,
            ..Default::default()
        };
        let l = Lissajous::generate(&params, &mut SpawnContext::seeded(23));
        assert_eq!(l.cloud.colors[0], params.color_a.rgb());
        assert!((l.cloud.colors[4] - params.color_b.rgb()).abs().max_element() < 1e-6);
    }

    #[test]
    fn test_generate_places_points_on_their_curves() {
        let params = ParamSet::default();
        let viewport = Viewport::default();
        let mut l = Lissajous::generate(&params, &mut SpawnContext::seeded(25));
        let at_origin = l
            .cloud
            .positions
            .iter()
            .filter(|p| p.x == 0.0 && p.y == 0.0)
            .count();
        assert_eq!(at_origin, 0);

        let generated = l.cloud.positions.clone();
        l.update(&FrameContext::new(FrameTime::ZERO, &params, &viewport));
        assert_eq!(l.cloud.positions, generated);
    }

    #[test]
    fn test_positions_bounded_by_amplitude() {
        let params = ParamSet::default();
        let viewport = Viewport::default();
        let mut l = Lissajous::generate(&params, &mut SpawnContext::seeded(24));
        l.update(&FrameContext::new(FrameTime::new(12.3, 0.016), &params, &viewport));
        let half = l.amplitude() * 0.5;
        for p in &l.cloud.positions {
            assert!(p.x.abs() <= half.x + 1e-3 && p.y.abs() <= half.y + 1e-3);
        }
    }
}
