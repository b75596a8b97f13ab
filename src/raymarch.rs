//! CPU reference implementation of the raymarching fragment program.
//!
//! Mirrors the GLSL step for step in `f32`, so tests and headless tools can
//! evaluate the shader without a GPU. A pixel whose shading comes out
//! non-finite falls back to the sky color instead of propagating NaN.

use crate::params::MAX_RAYMARCH_STEPS;
use crate::patterns::RaymarchUniforms;
use glam::{Vec2, Vec3, Vec4};

/// Sphere center in view space.
pub const SPHERE_CENTER: Vec3 = Vec3::new(0.0, 0.0, 500.0);
/// Unmodulated sphere radius.
pub const SPHERE_RADIUS: f32 = 120.0;
/// Camera origin.
pub const RAY_ORIGIN: Vec3 = Vec3::new(0.0, 0.0, -200.0);

#[inline]
fn fract(v: Vec2) -> Vec2 {
    v - v.floor()
}

/// Gradient hash in `[-1, 1]²`.
pub fn hash2(p: Vec2) -> Vec2 {
    let q = Vec2::new(
        p.dot(Vec2::new(127.1, 311.7)),
        p.dot(Vec2::new(269.5, 183.3)),
    );
    let s = Vec2::new(q.x.sin(), q.y.sin()) * 43758.547;
    Vec2::splat(-1.0) + 2.0 * fract(s)
}

/// 2D gradient noise.
pub fn noise(p: Vec2) -> f32 {
    let i = p.floor();
    let f = fract(p);
    let u = f * f * (Vec2::splat(3.0) - 2.0 * f);

    let corner = |o: Vec2| hash2(i + o).dot(f - o);
    let a = corner(Vec2::new(0.0, 0.0));
    let b = corner(Vec2::new(1.0, 0.0));
    let c = corner(Vec2::new(0.0, 1.0));
    let d = corner(Vec2::new(1.0, 1.0));

    let ab = a + (b - a) * u.x;
    let cd = c + (d - c) * u.x;
    ab + (cd - ab) * u.y
}

/// Five octaves of [`noise`].
pub fn fbm(mut p: Vec2) -> f32 {
    let mut v = 0.0;
    let mut a = 0.5;
    for _ in 0..5 {
        v += a * noise(p);
        p *= 2.0;
        a *= 0.5;
    }
    v
}

#[inline]
fn reflect(i: Vec3, n: Vec3) -> Vec3 {
    i - 2.0 * n.dot(i) * n
}

/// Result of sphere tracing one ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    /// Distance travelled along the ray.
    pub t: f32,
    pub position: Vec3,
    /// Iterations taken.
    pub steps: u32,
}

/// Evaluates the fragment program for a fixed set of uniforms.
#[derive(Clone, Copy, Debug)]
pub struct Raymarcher<'a> {
    uniforms: &'a RaymarchUniforms,
}

impl<'a> Raymarcher<'a> {
    pub fn new(uniforms: &'a RaymarchUniforms) -> Self {
        Self { uniforms }
    }

    /// Signed distance to the noise-modulated sphere.
    pub fn distance(&self, p: Vec3) -> f32 {
        let u = self.uniforms;
        let t = u.time * u.noise_speed;
        let n = fbm((p.truncate() + Vec2::splat(t)) * u.noise_scale) * u.noise_intensity;
        let r = SPHERE_RADIUS + (u.time * u.sphere_mod_freq + n * 6.2831).sin() * u.sphere_mod_amp;
        (p - SPHERE_CENTER).length() - r
    }

    /// Central-difference surface normal.
    pub fn normal(&self, p: Vec3) -> Vec3 {
        let h = self.uniforms.epsilon.max(0.0005);
        let axis = |d: Vec3| self.distance(p + d) - self.distance(p - d);
        Vec3::new(
            axis(Vec3::new(h, 0.0, 0.0)),
            axis(Vec3::new(0.0, h, 0.0)),
            axis(Vec3::new(0.0, 0.0, h)),
        )
        .normalize()
    }

    /// View direction for texture coordinate `uv` on the quad.
    pub fn ray_direction(&self, uv: Vec2) -> Vec3 {
        let res = self.uniforms.resolution;
        let aspect = res.x / res.y;
        let p = (uv - Vec2::splat(0.5)) * Vec2::new(aspect, 1.0);
        p.extend(1.0).normalize()
    }

    /// Sphere-trace along `rd`. `None` when the ray escapes past the maximum
    /// distance.
    pub fn march(&self, rd: Vec3) -> Option<Hit> {
        let u = self.uniforms;
        let limit = u.steps.min(MAX_RAYMARCH_STEPS);
        let mut t = 0.0f32;
        let mut steps = 0;
        while steps < limit {
            steps += 1;
            let d = self.distance(RAY_ORIGIN + rd * t);
            if d < u.epsilon {
                break;
            }
            t += d;
            if t > u.max_distance {
                break;
            }
        }
        (t < u.max_distance).then(|| Hit {
            t,
            position: RAY_ORIGIN + rd * t,
            steps,
        })
    }

    /// Background seen by a ray that hits nothing.
    pub fn sky(&self, rd: Vec3) -> Vec4 {
        let u = self.uniforms;
        if u.use_gradient {
            u.color_a.lerp(u.color_b, 0.5 + 0.5 * rd.y).extend(0.0)
        } else {
            u.bg_color.extend(1.0)
        }
    }

    /// Diffuse, specular and fresnel shading at a hit.
    pub fn shade(&self, hit: &Hit, rd: Vec3) -> Vec4 {
        let u = self.uniforms;
        let pos = hit.position;
        let n = self.normal(pos);
        let l = (u.light_pos - pos).normalize();
        let view = (-rd).normalize();

        let diff = n.dot(l).max(0.0);
        let spec = reflect(-l, n).dot(view).max(0.0).powf(32.0);
        let fres = (1.0 - view.dot(n).max(0.0)).powf(3.0);
        let base = u
            .color_a
            .lerp(u.color_b, 0.5 + 0.5 * (pos.truncate().length() * 0.005 + u.time * 0.8).sin());

        let col = base * (0.15 + 0.85 * diff)
            + Vec3::splat(spec)
            + fres * Vec3::ONE.lerp(base, 0.5) * 0.3;
        col.extend(1.0)
    }

    /// RGBA output for texture coordinate `uv` (origin bottom-left).
    pub fn pixel(&self, uv: Vec2) -> Vec4 {
        let rd = self.ray_direction(uv);
        let color = match self.march(rd) {
            Some(hit) => self.shade(&hit, rd),
            None => return self.sky(rd),
        };
        if color.is_finite() {
            color
        } else {
            self.sky(rd)
        }
    }

    /// Render a `width × height` image, rows top to bottom.
    pub fn render(&self, width: u32, height: u32) -> Vec<Vec4> {
        let mut out = Vec::with_capacity(pixel_count(width, height));
        for y in 0..height {
            let v = 1.0 - (y as f32 + 0.5) / height as f32;
            for x in 0..width {
                let u = (x as f32 + 0.5) / width as f32;
                out.push(self.pixel(Vec2::new(u, v)));
            }
        }
        out
    }
}

/// Pixels in a `width` x `height` image, counted in `usize`.
#[inline]
pub fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}
