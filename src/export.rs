//! Standalone HTML export.
//!
//! Produces a single page that replays the current look without the editor:
//! the parameter set is embedded as JSON next to a JavaScript port of the
//! selected archetype's generator and updater, using the same constants as
//! the Rust engine. Shader archetypes embed the GLSL programs generated from
//! their typed uniform records. The only network fetch is three.js itself.
//!
//! Export is best effort and never fails: non-finite numbers serialize as
//! `null` and the page falls back to defaults for them.

use crate::background::Background;
use crate::buffers::{BlendMode, PointMaterial};
use crate::error::ExportError;
use crate::params::{ParamSet, PatternKind, MAX_ENTITY_COUNT, MAX_SWIRL_CENTERS};
use crate::patterns::{
    point_material, DistortingPlane, PlaneUniforms, RaymarchUniforms, Raymarching,
    PLANE_SEGMENTS, WAVE_SEGMENTS,
};
use crate::uniforms::ShaderUniforms;
use crate::viewport::Viewport;
use std::path::Path;

/// three.js build loaded by exported pages.
pub const THREE_JS_URL: &str = "https://cdn.jsdelivr.net/npm/three@0.152.2/build/three.min.js";

/// Output settings.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportOptions {
    pub title: String,
    pub three_js_url: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            title: "Backdrop Export".to_string(),
            three_js_url: THREE_JS_URL.to_string(),
        }
    }
}

/// Render the standalone page for `params`.
pub fn standalone_html(params: &ParamSet, options: &ExportOptions) -> String {
    let kind = params.pattern;
    let mut html = String::with_capacity(24 * 1024);

    html.push_str("<!doctype html>\n<html>\n<head>\n");
    html.push_str("  <meta charset=\"utf-8\">\n");
    html.push_str("  <meta name=\"viewport\" content=\"width=device-width,initial-scale=1\">\n");
    html.push_str(&format!("  <title>{}</title>\n", escape_html(&options.title)));
    html.push_str(&format!(
        "  <style>html,body{{height:100%;margin:0;overflow:hidden;background:{};}}canvas{{display:block;}}</style>\n",
        Background::from_params(params, 0.0).css()
    ));
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!(
        "  <script src=\"{}\"></script>\n",
        escape_html(&options.three_js_url)
    ));
    html.push_str("  <script>\n(function () {\n");
    html.push_str(&format!(
        "const DEFAULTS = {};\nconst RAW = {};\n",
        json_for_script(&ParamSet::default()),
        json_for_script(params)
    ));
    html.push_str(PRELUDE_JS);
    html.push_str(&pattern_js(kind, params));
    html.push_str(LOOP_JS);
    html.push_str("})();\n  </script>\n</body>\n</html>\n");

    tracing::debug!(pattern = %kind, bytes = html.len(), "rendered standalone export");
    html
}

/// Render and write the page to `path`.
pub fn write_html(
    path: impl AsRef<Path>,
    params: &ParamSet,
    options: &ExportOptions,
) -> Result<(), ExportError> {
    let path = path.as_ref();
    std::fs::write(path, standalone_html(params, options)).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "wrote standalone export");
    Ok(())
}

/// JSON safe to embed inside a `<script>` element.
fn json_for_script(params: &ParamSet) -> String {
    match serde_json::to_string(params) {
        Ok(json) => json.replace("</", "<\\/"),
        Err(err) => {
            tracing::warn!(%err, "failed to serialize parameters, exporting defaults");
            "{}".to_string()
        }
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// `THREE.PointsMaterial` options for `material`.
fn points_material_js(material: &PointMaterial) -> String {
    let mut js = format!(
        "{{ vertexColors: true, transparent: true, size: {:?}, opacity: {:?}, depthTest: {}, depthWrite: {}",
        material.size, material.opacity, material.depth_test, material.depth_write
    );
    if material.blend == BlendMode::Additive {
        js.push_str(&format!(", blending: {}", material.blend.three_js_constant()));
    }
    js.push_str(" }");
    js
}

/// three.js uniform object literal for a typed uniform record.
fn uniforms_js<U: ShaderUniforms>(uniforms: &U) -> String {
    let fields: Vec<String> = uniforms
        .entries()
        .into_iter()
        .map(|(name, value)| format!("{}: {{ value: {} }}", name, value.js_literal()))
        .collect();
    format!("{{ {} }}", fields.join(", "))
}

/// Template literal body; GLSL never contains backticks or `${`.
fn js_template(src: &str) -> String {
    format!("`{}`", src.replace('\\', "\\\\"))
}

/// Generator and updater for `kind`, defining `build()`.
fn pattern_js(kind: PatternKind, params: &ParamSet) -> String {
    let material = |k| point_material(k, params.size).map(|m| points_material_js(&m));
    let mut js = String::new();
    match kind {
        PatternKind::Particles | PatternKind::Vortex => {
            js.push_str(&format!(
                "const VORTEX = {};\nconst MATERIAL = {};\n",
                kind == PatternKind::Vortex,
                material(kind).unwrap_or_default()
            ));
            js.push_str(ORBIT_JS);
        }
        PatternKind::FlowField => {
            js.push_str(&format!("const MATERIAL = {};\n", material(kind).unwrap_or_default()));
            js.push_str(FLOW_JS);
        }
        PatternKind::Lissajous => {
            js.push_str(&format!("const MATERIAL = {};\n", material(kind).unwrap_or_default()));
            js.push_str(LISSAJOUS_JS);
        }
        PatternKind::Fireflies => {
            js.push_str(&format!("const MATERIAL = {};\n", material(kind).unwrap_or_default()));
            js.push_str(FIREFLIES_JS);
        }
        PatternKind::Waves => {
            js.push_str(&format!(
                "const SEGMENTS = [{}, {}];\n",
                WAVE_SEGMENTS.0, WAVE_SEGMENTS.1
            ));
            js.push_str(WAVES_JS);
        }
        PatternKind::WireframeTerrain => js.push_str(TERRAIN_JS),
        PatternKind::DistortingPlane => {
            js.push_str(&format!(
                "const SEGMENTS = {};\nconst UNIFORMS = {};\nconst VERTEX = {};\nconst FRAGMENT = {};\n",
                PLANE_SEGMENTS,
                uniforms_js(&PlaneUniforms::from_params(params, 0.0)),
                js_template(&DistortingPlane::vertex_shader()),
                js_template(&DistortingPlane::fragment_shader()),
            ));
            js.push_str(SHADER_QUAD_JS);
        }
        PatternKind::Raymarching => {
            let uniforms = RaymarchUniforms::from_params(params, &Viewport::default(), 0.0);
            js.push_str(&format!(
                "const SEGMENTS = 1;\nconst UNIFORMS = {};\nconst VERTEX = {};\nconst FRAGMENT = {};\n",
                uniforms_js(&uniforms),
                js_template(&Raymarching::vertex_shader()),
                js_template(&Raymarching::fragment_shader()),
            ));
            js.push_str(SHADER_QUAD_JS);
        }
    }
    js.replace("MAX_ENTITY_COUNT", &MAX_ENTITY_COUNT.to_string())
        .replace("MAX_SWIRL_CENTERS", &MAX_SWIRL_CENTERS.to_string())
}

const PRELUDE_JS: &str = r#"const params = Object.assign({}, DEFAULTS);
for (const k in RAW) { if (RAW[k] !== null && RAW[k] !== undefined) params[k] = RAW[k]; }
THREE.ColorManagement.enabled = false;

const scene = new THREE.Scene();
const camera = new THREE.PerspectiveCamera(50, innerWidth / innerHeight, 1, 5000);
camera.position.z = 800;
const renderer = new THREE.WebGLRenderer({ antialias: true, alpha: true });
renderer.setPixelRatio(Math.min(devicePixelRatio, 2));
renderer.setSize(innerWidth, innerHeight);
if (params.gradient) renderer.setClearColor(0x000000, 0);
else renderer.setClearColor(new THREE.Color(params.background), 1);
document.body.appendChild(renderer.domElement);

const colorA = new THREE.Color(params.colorA);
const colorB = new THREE.Color(params.colorB);
const rand = (min, max) => min + Math.random() * (max - min);
const centered = (extent) => (Math.random() - 0.5) * extent;
const count = (v, max) => Math.max(1, Math.min(max, Math.round(v) || 1));

function frustum() {
  const h = 2 * Math.tan(THREE.MathUtils.degToRad(camera.fov / 2)) * camera.position.z;
  return { w: h * camera.aspect, h: h };
}

function cycle(base, t, i, out) {
  const hsl = {};
  base.getHSL(hsl);
  const h = hsl.h + Math.sin(t * params.colorSpeed + i * 0.02) * 0.12;
  const l = hsl.l + Math.cos(t * params.colorSpeed * (2 / 3) + i * 0.01) * 0.04;
  return out.setHSL(((h % 1) + 1) % 1, hsl.s, Math.min(1, Math.max(0, l)));
}

function pointCloud(n, material) {
  const geo = new THREE.BufferGeometry();
  geo.setAttribute('position', new THREE.BufferAttribute(new Float32Array(n * 3), 3));
  geo.setAttribute('color', new THREE.BufferAttribute(new Float32Array(n * 3), 3));
  scene.add(new THREE.Points(geo, new THREE.PointsMaterial(material)));
  return geo;
}

function gridMesh(width, height, sx, sy, wireframe) {
  const geo = new THREE.PlaneGeometry(width, height, sx, sy);
  const pos = geo.attributes.position;
  const cols = new Float32Array(pos.count * 3);
  for (let i = 0; i < pos.count; i++) {
    const c = colorA.clone().lerp(colorB, i / pos.count);
    cols[i * 3] = c.r; cols[i * 3 + 1] = c.g; cols[i * 3 + 2] = c.b;
  }
  geo.setAttribute('color', new THREE.BufferAttribute(cols, 3));
  const mat = new THREE.MeshBasicMaterial({ vertexColors: true, side: THREE.DoubleSide, wireframe: wireframe });
  const mesh = new THREE.Mesh(geo, mat);
  scene.add(mesh);
  return { mesh: mesh, base: Float32Array.from(pos.array) };
}

function repair(pos, base) {
  for (let i = 0; i < pos.length; i++) {
    if (!Number.isFinite(pos[i])) pos[i] = Number.isFinite(base[i]) ? base[i] : 0;
  }
}

"#;

const ORBIT_JS: &str = r#"function build() {
  const f = frustum();
  const n = count(params.count, MAX_ENTITY_COUNT);
  const k = count(params.centers, MAX_SWIRL_CENTERS);
  const depth = VORTEX ? 200 : Math.min(400, params.spread * 0.6);
  const geo = pointCloud(n, MATERIAL);
  const pos = geo.attributes.position.array;
  const col = geo.attributes.color.array;
  const centers = [];
  for (let c = 0; c < k; c++) centers.push([centered(f.w * 0.8), centered(f.h * 0.8)]);
  const cx = new Float32Array(n), cy = new Float32Array(n), radius = new Float32Array(n);
  const angle = new Float32Array(n), vel = new Float32Array(n), spiral = new Float32Array(n);
  const base = [];
  for (let i = 0; i < n; i++) {
    const x = centered(f.w), y = centered(f.h);
    pos[i * 3] = x; pos[i * 3 + 1] = y; pos[i * 3 + 2] = centered(depth);
    base.push(colorA.clone().lerp(colorB, Math.random()));
    const anchor = centers[Math.floor(Math.random() * k)];
    cx[i] = anchor[0] + centered(f.w * params.centerJitter);
    cy[i] = anchor[1] + centered(f.h * params.centerJitter);
    const dx = x - cx[i], dy = y - cy[i];
    const r = Math.hypot(dx, dy) * rand(0.4, 2.0);
    angle[i] = Math.atan2(dy, dx);
    if (VORTEX) {
      radius[i] = Math.max(10, r);
      vel[i] = rand(0.3, 1.5) * (Math.random() < 0.5 ? -1 : 1);
      spiral[i] = rand(-0.3, 0.3);
    } else {
      radius[i] = r;
      vel[i] = rand(0.2, 1.8) * rand(0.3, 1.7);
    }
  }
  const tmp = new THREE.Color();
  return function (t, dt) {
    const swirl = params.swirlIntensity * 0.08 * Math.sin(t * 0.07);
    const turn = params.circularSpeed * dt * 0.8;
    for (let i = 0; i < n; i++) {
      angle[i] += vel[i] * turn;
      radius[i] += spiral[i] * dt * 6;
      const a = angle[i] + swirl;
      pos[i * 3] = cx[i] + Math.cos(a) * radius[i];
      pos[i * 3 + 1] = cy[i] + Math.sin(a) * radius[i] * 0.9;
      pos[i * 3 + 2] = Math.sin(a * 0.6 + t * 0.5) * 40;
      cycle(base[i], t, i, tmp);
      col[i * 3] = tmp.r; col[i * 3 + 1] = tmp.g; col[i * 3 + 2] = tmp.b;
    }
    repair(pos, []);
    geo.attributes.position.needsUpdate = true;
    geo.attributes.color.needsUpdate = true;
  };
}
"#;

const FLOW_JS: &str = r#"function build() {
  const f = frustum();
  const n = count(params.count, MAX_ENTITY_COUNT);
  const geo = pointCloud(n, MATERIAL);
  const pos = geo.attributes.position.array;
  const col = geo.attributes.color.array;
  const seed = new Float32Array(n);
  for (let i = 0; i < n; i++) {
    pos[i * 3] = centered(f.w * 1.1); pos[i * 3 + 1] = centered(f.h * 1.1); pos[i * 3 + 2] = centered(300);
    seed[i] = rand(0, 1000);
  }
  const wrap = (v, b) => (v > b ? -b : v < -b ? b : v);
  const tmp = new THREE.Color();
  return function (t, dt) {
    const fr = frustum();
    const bx = fr.w * params.flowWrapFraction, by = fr.h * params.flowWrapFraction;
    const step = 40 * params.circularSpeed * dt;
    for (let i = 0; i < n; i++) {
      const s = seed[i];
      const px = pos[i * 3], py = pos[i * 3 + 1];
      const ang = Math.sin(px * 0.003 + t * 0.6 + s) * Math.PI + Math.cos((py * 0.002 - t * 0.4) * 0.7 + s) * Math.PI * 0.5;
      const x = wrap(px + Math.cos(ang) * step, bx);
      const y = wrap(py + Math.sin(ang) * step, by);
      pos[i * 3] = x; pos[i * 3 + 1] = y; pos[i * 3 + 2] = Math.sin((x + y) * 0.002 + t * 0.8) * 60;
      tmp.copy(colorA).lerp(colorB, (Math.sin(t * 0.2 + s) + 1) * 0.5);
      col[i * 3] = tmp.r; col[i * 3 + 1] = tmp.g; col[i * 3 + 2] = tmp.b;
    }
    repair(pos, []);
    geo.attributes.position.needsUpdate = true;
    geo.attributes.color.needsUpdate = true;
  };
}
"#;

const LISSAJOUS_JS: &str = r#"function build() {
  const n = count(params.count, MAX_ENTITY_COUNT);
  const geo = pointCloud(n, MATERIAL);
  const pos = geo.attributes.position.array;
  const col = geo.attributes.color.array;
  const fa = new Float32Array(n), fb = new Float32Array(n), phase = new Float32Array(n);
  for (let i = 0; i < n; i++) {
    fa[i] = 1 + Math.floor(Math.random() * 6);
    fb[i] = 1 + Math.floor(Math.random() * 6);
    phase[i] = rand(0, Math.PI * 2);
  }
  const ax = Math.min(1200, params.spread * 1.2) / 2, ay = Math.min(800, params.spread * 0.8) / 2;
  const tmp = new THREE.Color();
  return function (t) {
    for (let i = 0; i < n; i++) {
      pos[i * 3] = Math.sin(fa[i] * t * 0.6 + phase[i]) * ax;
      pos[i * 3 + 1] = Math.sin(fb[i] * t * 0.55 + phase[i] * 0.8) * ay;
      pos[i * 3 + 2] = Math.cos((fa[i] + fb[i]) * t * 0.15 + phase[i]) * 80;
      tmp.copy(colorA).lerp(colorB, (Math.sin(t * 0.3 + i * 0.02) + 1) * 0.5);
      col[i * 3] = tmp.r; col[i * 3 + 1] = tmp.g; col[i * 3 + 2] = tmp.b;
    }
    repair(pos, []);
    geo.attributes.position.needsUpdate = true;
    geo.attributes.color.needsUpdate = true;
  };
}
"#;

const FIREFLIES_JS: &str = r#"function build() {
  const f = frustum();
  const n = count(params.count, MAX_ENTITY_COUNT);
  const geo = pointCloud(n, MATERIAL);
  const pos = geo.attributes.position.array;
  const col = geo.attributes.color.array;
  const intensity = new Float32Array(n);
  for (let i = 0; i < n; i++) {
    pos[i * 3] = centered(f.w); pos[i * 3 + 1] = centered(f.h); pos[i * 3 + 2] = centered(200);
    intensity[i] = Math.random();
  }
  const tmp = new THREE.Color();
  return function (t, dt) {
    const jitter = params.circularSpeed * dt;
    for (let i = 0; i < n; i++) {
      pos[i * 3] += Math.sin(t * 0.7 + i) * 0.2 * jitter;
      pos[i * 3 + 1] += Math.cos(t * 0.6 + i * 0.7) * 0.18 * jitter;
      pos[i * 3 + 2] = Math.sin(t * 0.9 + i * 0.3) * 60;
      const glow = (Math.sin(t * 3 + i * 0.5) * 0.5 + 0.5) * intensity[i];
      tmp.copy(colorA).lerp(colorB, Math.random()).multiplyScalar(0.6 + glow * 0.8);
      col[i * 3] = tmp.r; col[i * 3 + 1] = tmp.g; col[i * 3 + 2] = tmp.b;
    }
    repair(pos, []);
    geo.attributes.position.needsUpdate = true;
    geo.attributes.color.needsUpdate = true;
  };
}
"#;

const WAVES_JS: &str = r#"function build() {
  const grid = gridMesh(Math.min(1400, params.spread * 2), Math.min(600, params.spread), SEGMENTS[0], SEGMENTS[1], false);
  grid.mesh.rotation.x = -0.5;
  const pos = grid.mesh.geometry.attributes.position;
  return function (t) {
    const travel = t * params.waveSpeed;
    for (let i = 0; i < pos.count; i++) {
      const bx = grid.base[i * 3];
      pos.array[i * 3 + 2] = Math.sin((bx + travel * 40) * 0.008) * params.waveHeight
        + Math.cos((i + travel * 30) * 0.02) * params.waveHeight / 3;
    }
    repair(pos.array, grid.base);
    pos.needsUpdate = true;
  };
}
"#;

const TERRAIN_JS: &str = r#"function build() {
  const sx = Math.max(2, Math.min(600, Math.round(params.terrainSegmentsX) || 2));
  const sy = Math.max(2, Math.min(400, Math.round(params.terrainSegmentsY) || 2));
  const grid = gridMesh(Math.min(1600, params.spread * 2), Math.min(900, params.spread * 1.2), sx, sy, params.terrainWireframe);
  grid.mesh.rotation.x = -0.6;
  grid.mesh.position.y = -80;
  const pos = grid.mesh.geometry.attributes.position;
  return function (t) {
    for (let i = 0; i < pos.count; i++) {
      const bx = grid.base[i * 3], by = grid.base[i * 3 + 1];
      pos.array[i * 3 + 2] = Math.sin((bx + by) * 0.005 * params.terrainScale + t * params.terrainSpeed * 0.6) * params.terrainHeight;
    }
    repair(pos.array, grid.base);
    pos.needsUpdate = true;
  };
}
"#;

const SHADER_QUAD_JS: &str = r#"function build() {
  const mat = new THREE.ShaderMaterial({ uniforms: UNIFORMS, vertexShader: VERTEX, fragmentShader: FRAGMENT, transparent: true });
  const quad = new THREE.Mesh(new THREE.PlaneGeometry(2, 2, SEGMENTS, SEGMENTS), mat);
  quad.scale.set(1000, 1000, 1);
  quad.position.z = -300;
  scene.add(quad);
  const resize = () => { if (UNIFORMS.resolution) UNIFORMS.resolution.value.set(innerWidth, innerHeight); };
  resize();
  addEventListener('resize', resize);
  return function (t) { UNIFORMS.time.value = t; };
}
"#;

const LOOP_JS: &str = r#"const update = build();
const clock = new THREE.Clock();
let time = 0;
function animate() {
  requestAnimationFrame(animate);
  const dt = Math.min(clock.getDelta(), 0.1);
  const elapsed = clock.elapsedTime;
  const step = dt * params.speed;
  time += step;
  update(time, step);
  if (params.gradient) {
    const angle = params.gradientAngle + Math.sin(elapsed * 0.05) * 8;
    document.body.style.background = 'linear-gradient(' + angle.toFixed(2) + 'deg, ' + params.colorA + ', ' + params.colorB + ')';
  }
  renderer.render(scene, camera);
}
animate();
addEventListener('resize', () => {
  camera.aspect = innerWidth / innerHeight;
  camera.updateProjectionMatrix();
  renderer.setSize(innerWidth, innerHeight);
});
"#;
