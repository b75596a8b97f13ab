//! Orbiting swarms: the Particles and Vortex archetypes.
//!
//! Entities are scattered over the frustum, each assigned to one of a few
//! swirl centers. The orbit radius, angular velocity and spiral rate are
//! drawn once at generation and kept for the entity's lifetime.

use super::{cycle_color, FrameContext};
use crate::buffers::{PointCloud, PointMaterial};
use crate::params::ParamSet;
use crate::sanitize::{non_finite_indices, Sanitize, SanitizeReport};
use crate::spawn::SpawnContext;
use crate::viewport::Viewport;
use glam::{Vec2, Vec3};

/// Which orbit archetype a swarm renders as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrbitStyle {
    /// Soft points, forward-only rotation, no spiral drift.
    Particles,
    /// Glowing points spinning both ways with radial drift.
    Vortex,
}

/// Orbit state for every entity.
#[derive(Clone, Debug)]
pub struct OrbitSwarm {
    pub style: OrbitStyle,
    pub cloud: PointCloud,
    /// Colors the cycling is computed from.
    base_colors: Vec<Vec3>,
    /// Endpoint mix factor behind each base color.
    mix: Vec<f32>,
    centers: Vec<Vec2>,
    radius: Vec<f32>,
    angle: Vec<f32>,
    angular_velocity: Vec<f32>,
    spiral: Vec<f32>,
}

impl OrbitSwarm {
    pub fn generate(
        style: OrbitStyle,
        params: &ParamSet,
        viewport: &Viewport,
        spawn: &mut SpawnContext,
    ) -> Self {
        let frustum = viewport.frustum();
        let count = params.entity_count();
        let color_a = params.color_a.rgb();
        let color_b = params.color_b.rgb();

        let swirl_centers: Vec<Vec2> = (0..params.center_count())
            .map(|_| {
                Vec2::new(
                    spawn.centered(frustum.width * 0.8),
                    spawn.centered(frustum.height * 0.8),
                )
            })
            .collect();

        let depth = match style {
            OrbitStyle::Particles => (params.spread * 0.6).min(400.0),
            OrbitStyle::Vortex => 200.0,
        };
        let material = match style {
            OrbitStyle::Particles => PointMaterial::normal(params.size, 0.95),
            OrbitStyle::Vortex => PointMaterial::additive(params.size, 0.95),
        };

        let mut swarm = Self {
            style,
            cloud: PointCloud::with_capacity(count, material),
            base_colors: Vec::with_capacity(count),
            mix: Vec::with_capacity(count),
            centers: Vec::with_capacity(count),
            radius: Vec::with_capacity(count),
            angle: Vec::with_capacity(count),
            angular_velocity: Vec::with_capacity(count),
            spiral: Vec::with_capacity(count),
        };

        for _ in 0..count {
            let p = spawn.in_box(frustum.width, frustum.height, depth);

            let t = spawn.random();
            let color = color_a.lerp(color_b, t);
            swarm.cloud.push(p, color);
            swarm.base_colors.push(color);
            swarm.mix.push(t);

            let anchor = swirl_centers[spawn.pick(swirl_centers.len())];
            let center = anchor
                + Vec2::new(
                    spawn.centered(frustum.width * params.center_jitter),
                    spawn.centered(frustum.height * params.center_jitter),
                );
            let offset = p.truncate() - center;
            let r = offset.length() * spawn.random_range(0.4, 2.0);

            let (radius, angular_velocity, spiral) = match style {
                OrbitStyle::Particles => (
                    r,
                    spawn.random_range(0.2, 1.8) * spawn.random_range(0.3, 1.7),
                    0.0,
                ),
                OrbitStyle::Vortex => (
                    r.max(10.0),
                    spawn.random_range(0.3, 1.5) * spawn.sign(),
                    spawn.random_range(-0.3, 0.3),
                ),
            };

            swarm.centers.push(center);
            swarm.radius.push(radius);
            swarm.angle.push(offset.y.atan2(offset.x));
            swarm.angular_velocity.push(angular_velocity);
            swarm.spiral.push(spiral);
        }

        swarm
    }

    /// Advance every orbit by one frame and cycle colors.
    pub fn update(&mut self, ctx: &FrameContext) {
        let params = ctx.params;
        let t = ctx.frame.elapsed;
        let dt = ctx.frame.delta;
        let global_swirl = params.swirl_intensity * 0.08 * (t * 0.07).sin();
        let turn = params.circular_speed * dt * 0.8;

        for i in 0..self.cloud.len() {
            self.angle[i] += self.angular_velocity[i] * turn;
            self.radius[i] += self.spiral[i] * dt * 6.0;

            let a = self.angle[i] + global_swirl;
            let r = self.radius[i];
            let c = self.centers[i];
            self.cloud.positions[i] = Vec3::new(
                c.x + a.cos() * r,
                c.y + a.sin() * r * 0.9,
                (a * 0.6 + t * 0.5).sin() * 40.0,
            );
            self.cloud.colors[i] = cycle_color(self.base_colors[i], t, params.color_speed, i);
        }
    }

    /// Recompute base colors after an endpoint change.
    pub fn recolor(&mut self, params: &ParamSet) {
        let a = params.color_a.rgb();
        let b = params.color_b.rgb();
        for (base, &t) in self.base_colors.iter_mut().zip(&self.mix) {
            *base = a.lerp(b, t);
        }
        self.cloud.colors.copy_from_slice(&self.base_colors);
    }

    pub fn radii(&self) -> &[f32] {
        &self.radius
    }

    pub fn angular_velocities(&self) -> &[f32] {
        &self.angular_velocity
    }

    pub fn spiral_rates(&self) -> &[f32] {
        &self.spiral
    }

    pub fn base_colors(&self) -> &[Vec3] {
        &self.base_colors
    }

    fn swap_remove(&mut self, index: usize) {
        self.cloud.swap_remove(index);
        self.base_colors.swap_remove(index);
        self.mix.swap_remove(index);
        self.centers.swap_remove(index);
        self.radius.swap_remove(index);
        self.angle.swap_remove(index);
        self.angular_velocity.swap_remove(index);
        self.spiral.swap_remove(index);
    }
}

impl Sanitize for OrbitSwarm {
    fn sanitize(&mut self) -> SanitizeReport {
        let bad = non_finite_indices(&self.cloud.positions);
        // Descending, so every entity swapped into a hole was already checked.
        for &i in bad.iter().rev() {
            self.swap_remove(i);
        }
        SanitizeReport::discarded(bad.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FrameTime;

    fn swarm(style: OrbitStyle, seed: u64) -> (OrbitSwarm, ParamSet, Viewport) {
        let params = ParamSet {
            count: 300,
            ..Default::default()
        };
        let viewport = Viewport::default();
        let mut spawn = SpawnContext::seeded(seed);
        (OrbitSwarm::generate(style, &params, &viewport, &mut spawn), params, viewport)
    }

    #[test]
    fn test_generate_channel_lengths() {
        let (s, _, _) = swarm(OrbitStyle::Vortex, 1);
        assert_eq!(s.cloud.len(), 300);
        assert_eq!(s.radii().len(), 300);
        assert_eq!(s.base_colors().len(), 300);
        assert_eq!(s.cloud.colors, s.base_colors);
    }

    #[test]
    fn test_vortex_distributions() {
        let (s, _, _) = swarm(OrbitStyle::Vortex, 2);
        assert!(s.radii().iter().all(|&r| r >= 10.0));
        assert!(s
            .angular_velocities()
            .iter()
            .all(|&w| (0.3..=1.5).contains(&w.abs())));
        assert!(s.spiral_rates().iter().all(|&k| (-0.3..=0.3).contains(&k)));
        assert!(s.angular_velocities().iter().any(|&w| w < 0.0));
    }

    #[test]
    fn test_particles_never_spiral() {
        let (mut s, params, viewport) = swarm(OrbitStyle::Particles, 3);
        assert!(s.spiral_rates().iter().all(|&k| k == 0.0));
        let before = s.radii().to_vec();
        let ctx = FrameContext::new(FrameTime::new(1.0, 0.5), &params, &viewport);
        s.update(&ctx);
        assert_eq!(s.radii(), &before[..]);
    }

    #[test]
    fn test_update_is_orbit_around_center() {
        let (mut s, params, viewport) = swarm(OrbitStyle::Vortex, 4);
        let ctx = FrameContext::new(FrameTime::new(0.0, 0.0), &params, &viewport);
        s.update(&ctx);
        for i in 0..s.cloud.len() {
            let p = s.cloud.positions[i];
            let c = s.centers[i];
            let r = s.radius[i];
            let a = s.angle[i];
            assert!((p.x - (c.x + a.cos() * r)).abs() < 1e-3);
            assert!((p.y - (c.y + a.sin() * r * 0.9)).abs() < 1e-3);
        }
    }

    #[test]
    fn test_recolor_uses_mix_factors() {
        let (mut s, mut params, _) = swarm(OrbitStyle::Vortex, 5);
        params.color_a = crate::color::HexColor::from_rgb8(0, 0, 0);
        params.color_b = crate::color::HexColor::from_rgb8(255, 255, 255);
        s.recolor(&params);
        for (c, t) in s.base_colors().iter().zip(&s.mix) {
            assert!((c.x - t).abs() < 1e-5);
        }
    }

    #[test]
    fn test_sanitize_discards_non_finite_entities() {
        let (mut s, _, _) = swarm(OrbitStyle::Vortex, 6);
        s.cloud.positions[10].x = f32::NAN;
        s.cloud.positions[299].y = f32::INFINITY;
        let report = s.sanitize();
        assert_eq!(report.discarded_entities, 2);
        assert_eq!(s.cloud.len(), 298);
        assert_eq!(s.radii().len(), 298);
        assert!(s.cloud.positions.iter().all(|p| p.is_finite()));
    }
}
