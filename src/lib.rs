//! # Backdrop - generative background engine
//!
//! Procedural backgrounds driven by a flat parameter set: orbiting particle
//! swarms, flow fields, Lissajous curves, fireflies, displaced wave and
//! terrain meshes, a shader-distorted plane and a raymarched sphere.
//!
//! Backdrop owns the numerical side: generating attribute buffers, advancing
//! them each frame, keeping every position finite, and exporting the current
//! look as a standalone HTML page. Drawing is left to a [`RenderSink`].
//!
//! ## Quick Start
//!
//! ```ignore
//! use backdrop::prelude::*;
//!
//! let mut scene = Scene::new(ParamSet::with_pattern(PatternKind::Vortex), Viewport::default());
//! let mut time = Time::new();
//!
//! loop {
//!     let report = scene.advance(time.update());
//!     scene.submit(&mut my_renderer);
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Parameters
//!
//! [`ParamSet`] holds every tunable value and (de)serializes to the JSON the
//! editor and exported pages share. Control panels send named changes
//! ([`ParamKey`] + [`ParamValue`]); each change is either structural (the
//! pattern is regenerated) or cosmetic (applied in place).
//!
//! ### Patterns
//!
//! [`Pattern`] is one of nine archetypes, each owning its buffers:
//!
//! | Archetype | Surface |
//! |-----------|---------|
//! | Particles, Vortex | orbiting point cloud |
//! | Flow Field | drifting point cloud with toroidal wrap |
//! | Lissajous | parametric point cloud |
//! | Fireflies | twinkling point cloud |
//! | Waves, Wireframe Terrain | displaced grid mesh |
//! | Distorting Plane, Raymarching | shader quad with typed uniforms |
//!
//! Updates take an explicit [`FrameTime`]; nothing reads a global clock.
//!
//! ### Typed Uniforms
//!
//! Shader archetypes describe their inputs with `#[derive(ShaderUniforms)]`:
//!
//! ```ignore
//! #[derive(ShaderUniforms, Clone, Copy)]
//! struct Glow {
//!     time: f32,
//!     color_a: Vec3,      // uniform vec3 colorA;
//!     #[uniform(name = "uSteps")]
//!     steps: u32,         // uniform float uSteps;
//! }
//! ```
//!
//! ### Sanitizing
//!
//! After every update the scene runs [`Sanitize`]: meshes are repaired from
//! their base positions, particles with non-finite positions are dropped.
//! Faults never stop the frame loop.

// The derive emits `backdrop::...` paths; this makes them resolve inside the crate too.
extern crate self as backdrop;

pub mod background;
pub mod buffers;
pub mod color;
pub mod error;
pub mod export;
pub mod params;
pub mod patterns;
pub mod presets;
pub mod raymarch;
pub mod sanitize;
pub mod scene;
pub mod spawn;
pub mod time;
pub mod uniforms;
pub mod viewport;

pub use backdrop_derive::ShaderUniforms;
pub use background::Background;
pub use buffers::{BlendMode, GridSpec, MeshSurface, PointCloud, PointMaterial, ShaderSurface, Transform};
pub use bytemuck;
pub use color::HexColor;
pub use error::{ExportError, ParamError};
pub use export::{standalone_html, write_html, ExportOptions};
pub use glam::{Vec2, Vec3, Vec4};
pub use params::{ChangeKind, MotionMode, ParamKey, ParamSet, ParamValue, PatternKind};
pub use patterns::{FrameContext, Pattern};
pub use sanitize::{Sanitize, SanitizeReport};
pub use scene::{FrameReport, ParamChange, RenderItem, RenderSink, Scene, ShaderItem};
pub use spawn::SpawnContext;
pub use time::{FrameTime, Time};
pub use uniforms::UniformValue;
pub use viewport::Viewport;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use backdrop::prelude::*;
/// ```
pub mod prelude {
    pub use crate::background::Background;
    pub use crate::export::{standalone_html, ExportOptions};
    pub use crate::params::{ParamKey, ParamSet, ParamValue, PatternKind};
    pub use crate::patterns::{FrameContext, Pattern};
    pub use crate::presets::PRESETS;
    pub use crate::sanitize::Sanitize;
    pub use crate::scene::{ParamChange, RenderSink, Scene};
    pub use crate::spawn::SpawnContext;
    pub use crate::time::{FrameTime, Time};
    pub use crate::uniforms::{ShaderUniforms, UniformValue};
    pub use crate::viewport::Viewport;
    pub use crate::{Vec2, Vec3, Vec4};
    pub use backdrop_derive::ShaderUniforms;
}
