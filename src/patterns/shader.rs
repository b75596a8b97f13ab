//! Shader surfaces: the Distorting Plane and Raymarching archetypes.
//!
//! Neither keeps per-vertex CPU state. Each frame refreshes a typed uniform
//! record from the parameter set; the GLSL programs read those uniforms.

use super::FrameContext;
use crate::buffers::{GridSpec, ShaderSurface, Transform};
use crate::params::ParamSet;
use crate::sanitize::{Sanitize, SanitizeReport};
use crate::uniforms::ShaderUniforms;
use crate::viewport::Viewport;
use backdrop_derive::ShaderUniforms;
use glam::{Vec2, Vec3};

/// Tessellation of the distorting plane.
pub const PLANE_SEGMENTS: usize = 64;

/// Both shader quads are scaled up and pushed back behind the origin.
fn backdrop_transform() -> Transform {
    Transform {
        rotation_x: 0.0,
        translation: Vec3::new(0.0, 0.0, -300.0),
        scale: Vec3::new(1000.0, 1000.0, 1.0),
    }
}

/// Uniforms of the distorting plane program.
#[derive(ShaderUniforms, Clone, Copy, Debug, PartialEq)]
pub struct PlaneUniforms {
    pub time: f32,
    pub distortion: f32,
    pub speed: f32,
    pub color_a: Vec3,
    pub color_b: Vec3,
}

impl PlaneUniforms {
    pub fn from_params(params: &ParamSet, time: f32) -> Self {
        Self {
            time,
            distortion: params.shader_distortion,
            speed: params.shader_speed,
            color_a: params.color_a.rgb(),
            color_b: params.color_b.rgb(),
        }
    }

    /// Vertex displacement along z at texture coordinate `uv`.
    #[inline]
    pub fn displacement(&self, uv: Vec2) -> f32 {
        let ts = self.time * self.speed;
        let d = ((uv.x + ts) * 10.0).sin() * 0.1 + ((uv.y - ts) * 12.0).cos() * 0.08;
        d * self.distortion * 200.0
    }
}

/// Uniforms of the raymarching program.
#[derive(ShaderUniforms, Clone, Copy, Debug, PartialEq)]
pub struct RaymarchUniforms {
    pub time: f32,
    pub resolution: Vec2,
    pub steps: u32,
    pub max_distance: f32,
    pub epsilon: f32,
    pub light_pos: Vec3,
    pub color_a: Vec3,
    pub color_b: Vec3,
    pub bg_color: Vec3,
    pub use_gradient: bool,
    pub sphere_mod_amp: f32,
    pub sphere_mod_freq: f32,
    pub noise_scale: f32,
    pub noise_speed: f32,
    pub noise_intensity: f32,
}

impl RaymarchUniforms {
    pub fn from_params(params: &ParamSet, viewport: &Viewport, time: f32) -> Self {
        Self {
            time,
            resolution: Vec2::new(viewport.width_px as f32, viewport.height_px as f32),
            steps: params.raymarch_step_limit(),
            max_distance: params.raymarch_max_distance,
            epsilon: params.raymarch_epsilon,
            light_pos: params.light_position(),
            color_a: params.color_a.rgb(),
            color_b: params.color_b.rgb(),
            bg_color: params.background.rgb(),
            use_gradient: params.gradient,
            sphere_mod_amp: params.ray_sphere_mod_amp,
            sphere_mod_freq: params.ray_sphere_mod_freq,
            noise_scale: params.ray_noise_scale,
            noise_speed: params.ray_noise_speed,
            noise_intensity: params.ray_noise_intensity,
        }
    }
}

pub const PLANE_VERTEX_BODY: &str = r#"varying vec2 vUv;
void main() {
  vUv = uv;
  vec3 p = position;
  float t = time * speed;
  float d = sin((uv.x + t) * 10.0) * 0.1 + cos((uv.y - t) * 12.0) * 0.08;
  p.z += d * distortion * 200.0;
  gl_Position = projectionMatrix * modelViewMatrix * vec4(p, 1.0);
}
"#;

pub const PLANE_FRAGMENT_BODY: &str = r#"varying vec2 vUv;
void main() {
  float m = 0.5 + 0.5 * sin(time * 1.5 + vUv.x * 10.0);
  gl_FragColor = vec4(mix(colorA, colorB, m), 1.0);
}
"#;

pub const QUAD_VERTEX: &str = r#"varying vec2 vUv;
void main() {
  vUv = uv;
  gl_Position = projectionMatrix * modelViewMatrix * vec4(position, 1.0);
}
"#;

pub const RAYMARCH_FRAGMENT_BODY: &str = r#"varying vec2 vUv;

vec2 hash2(vec2 p) {
  p = vec2(dot(p, vec2(127.1, 311.7)), dot(p, vec2(269.5, 183.3)));
  return -1.0 + 2.0 * fract(sin(p) * 43758.5453123);
}

float noise(vec2 p) {
  vec2 i = floor(p);
  vec2 f = fract(p);
  vec2 u = f * f * (3.0 - 2.0 * f);
  float a = dot(hash2(i + vec2(0.0, 0.0)), f - vec2(0.0, 0.0));
  float b = dot(hash2(i + vec2(1.0, 0.0)), f - vec2(1.0, 0.0));
  float c = dot(hash2(i + vec2(0.0, 1.0)), f - vec2(0.0, 1.0));
  float d = dot(hash2(i + vec2(1.0, 1.0)), f - vec2(1.0, 1.0));
  return mix(mix(a, b, u.x), mix(c, d, u.x), u.y);
}

float fbm(vec2 p) {
  float v = 0.0;
  float a = 0.5;
  for (int i = 0; i < 5; i++) { v += a * noise(p); p *= 2.0; a *= 0.5; }
  return v;
}

float map(vec3 p) {
  vec3 sc = vec3(0.0, 0.0, 500.0);
  float t = time * noiseSpeed;
  float n = fbm((p.xy + vec2(t)) * noiseScale) * noiseIntensity;
  float r = 120.0 + sin(time * sphereModFreq + n * 6.2831) * sphereModAmp;
  return length(p - sc) - r;
}

vec3 calcNormal(vec3 p) {
  float h = max(epsilon, 0.0005);
  vec3 dx = vec3(h, 0.0, 0.0);
  vec3 dy = vec3(0.0, h, 0.0);
  vec3 dz = vec3(0.0, 0.0, h);
  return normalize(vec3(map(p + dx) - map(p - dx), map(p + dy) - map(p - dy), map(p + dz) - map(p - dz)));
}

void main() {
  vec2 uv = (vUv - 0.5) * vec2(resolution.x / resolution.y, 1.0);
  vec3 ro = vec3(0.0, 0.0, -200.0);
  vec3 rd = normalize(vec3(uv, 1.0));
  float tRay = 0.0;
  for (int i = 0; i < 512; i++) {
    if (float(i) >= steps) break;
    float d = map(ro + rd * tRay);
    if (d < epsilon) break;
    tRay += d;
    if (tRay > maxDistance) break;
  }
  if (tRay < maxDistance) {
    vec3 pos = ro + rd * tRay;
    vec3 n = calcNormal(pos);
    vec3 L = normalize(lightPos - pos);
    float diff = max(dot(n, L), 0.0);
    float spec = pow(max(dot(reflect(-L, n), normalize(-rd)), 0.0), 32.0);
    float fres = pow(1.0 - max(dot(normalize(-rd), n), 0.0), 3.0);
    vec3 base = mix(colorA, colorB, 0.5 + 0.5 * sin(length(pos.xy) * 0.005 + time * 0.8));
    vec3 col = base * (0.15 + 0.85 * diff) + spec * vec3(1.0) + fres * mix(vec3(1.0), base, 0.5) * 0.3;
    gl_FragColor = vec4(col, 1.0);
  } else if (useGradient > 0.5) {
    gl_FragColor = vec4(mix(colorA, colorB, 0.5 + 0.5 * rd.y), 0.0);
  } else {
    gl_FragColor = vec4(bgColor, 1.0);
  }
}
"#;

/// Prepend the uniform declarations of `U` to a program body.
pub fn program<U: ShaderUniforms>(body: &str, precision: bool) -> String {
    let mut src = String::new();
    if precision {
        src.push_str("precision highp float;\n");
    }
    src.push_str(U::GLSL_DECLARATIONS);
    src.push_str(body);
    src
}

/// Full-screen quad displaced by a layered sine in its vertex program.
#[derive(Clone, Debug)]
pub struct DistortingPlane {
    pub surface: ShaderSurface<PlaneUniforms>,
}

impl DistortingPlane {
    pub fn generate(params: &ParamSet) -> Self {
        Self {
            surface: ShaderSurface::quad(
                PLANE_SEGMENTS,
                backdrop_transform(),
                PlaneUniforms::from_params(params, 0.0),
            ),
        }
    }

    pub fn update(&mut self, ctx: &FrameContext) {
        self.surface.uniforms = PlaneUniforms::from_params(ctx.params, ctx.frame.elapsed);
    }

    pub fn vertex_shader() -> String {
        program::<PlaneUniforms>(PLANE_VERTEX_BODY, false)
    }

    pub fn fragment_shader() -> String {
        program::<PlaneUniforms>(PLANE_FRAGMENT_BODY, false)
    }

    /// CPU mirror of the vertex program, in model space.
    pub fn displaced_positions(&self) -> Vec<Vec3> {
        let grid = self.surface.grid();
        let u = &self.surface.uniforms;
        grid.positions()
            .into_iter()
            .zip(grid.uvs())
            .map(|(p, uv)| p + Vec3::Z * u.displacement(uv))
            .collect()
    }
}

impl Sanitize for DistortingPlane {
    /// A non-finite displacement falls back to the flat quad by zeroing the
    /// distortion for this frame. If the flat quad is still not finite the
    /// surface is dropped.
    fn sanitize(&mut self) -> SanitizeReport {
        let grid = self.surface.grid();
        let bad = self.non_finite_vertices(&grid);
        if bad == 0 {
            return SanitizeReport::default();
        }
        self.surface.uniforms.distortion = 0.0;
        self.surface.uniforms.time = 0.0;
        if self.non_finite_vertices(&grid) > 0 {
            return SanitizeReport::surface_discarded(bad);
        }
        tracing::debug!(vertices = bad, "flattened non-finite plane displacement");
        SanitizeReport::repaired(bad)
    }
}

impl DistortingPlane {
    fn non_finite_vertices(&self, grid: &GridSpec) -> usize {
        let u = &self.surface.uniforms;
        grid.uvs()
            .into_iter()
            .filter(|&uv| !u.displacement(uv).is_finite())
            .count()
    }
}

/// Full-screen quad running a sphere-tracing fragment program.
#[derive(Clone, Debug)]
pub struct Raymarching {
    pub surface: ShaderSurface<RaymarchUniforms>,
}

impl Raymarching {
    pub fn generate(params: &ParamSet, viewport: &Viewport) -> Self {
        let mut surface = ShaderSurface::quad(
            1,
            backdrop_transform(),
            RaymarchUniforms::from_params(params, viewport, 0.0),
        );
        surface.transparent = true;
        Self { surface }
    }

    pub fn update(&mut self, ctx: &FrameContext) {
        self.surface.uniforms =
            RaymarchUniforms::from_params(ctx.params, ctx.viewport, ctx.frame.elapsed);
    }

    pub fn vertex_shader() -> String {
        QUAD_VERTEX.to_string()
    }

    pub fn fragment_shader() -> String {
        program::<RaymarchUniforms>(RAYMARCH_FRAGMENT_BODY, true)
    }
}

impl Sanitize for Raymarching {
    fn sanitize(&mut self) -> SanitizeReport {
        SanitizeReport::default()
    }
}
