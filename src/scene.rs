//! Scene orchestration.
//!
//! The [`Scene`] owns the parameter set and at most one active [`Pattern`].
//! Each call to [`Scene::advance`] runs one frame:
//!
//! 1. Apply queued parameter changes. Structural changes collapse into a
//!    single regeneration; cosmetic changes are applied in place.
//! 2. Update the active pattern with the pattern clock.
//! 3. Sanitize the updated buffers.
//!
//! Rendering happens afterwards through [`Scene::submit`], which hands
//! borrowed buffers to a [`RenderSink`]. Nothing in the scene can be mutated
//! while a sink holds those borrows.
//!
//! ```ignore
//! let mut scene = Scene::new(ParamSet::default(), Viewport::default());
//! let mut time = Time::new();
//! loop {
//!     let report = scene.advance(time.update());
//!     scene.submit(&mut renderer);
//! }
//! ```

use crate::background::Background;
use crate::buffers::{MeshSurface, PointCloud, ShaderSurface, Transform};
use crate::export::{self, ExportOptions};
use crate::params::{ChangeKind, ParamKey, ParamSet, ParamValue, PatternKind};
use crate::patterns::{
    DistortingPlane, FrameContext, Pattern, PlaneUniforms, RaymarchUniforms, Raymarching,
};
use crate::sanitize::{Sanitize, SanitizeReport};
use crate::spawn::SpawnContext;
use crate::time::FrameTime;
use crate::uniforms::{ShaderUniforms, UniformValue};
use crate::viewport::Viewport;

/// A change notification queued between frames.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamChange {
    /// Set one named parameter.
    Set(ParamKey, ParamValue),
    /// Replace the whole parameter set, as when loading a preset or file.
    Replace(Box<ParamSet>),
}

impl ParamChange {
    pub fn set(key: ParamKey, value: impl Into<ParamValue>) -> Self {
        ParamChange::Set(key, value.into())
    }
}

/// What happened during one [`Scene::advance`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameReport {
    /// Pattern clock the update ran with.
    pub frame: FrameTime,
    /// The active pattern was rebuilt this frame.
    pub regenerated: bool,
    /// Queued changes that were rejected for a type mismatch.
    pub rejected_changes: usize,
    pub sanitize: SanitizeReport,
    /// Entities or vertices in the active pattern after sanitizing.
    pub elements: usize,
}

/// A shader surface ready for the render collaborator.
#[derive(Clone, Copy, Debug)]
pub enum ShaderItem<'a> {
    Plane(&'a ShaderSurface<PlaneUniforms>),
    Raymarch(&'a ShaderSurface<RaymarchUniforms>),
}

impl ShaderItem<'_> {
    pub fn vertex_shader(&self) -> String {
        match self {
            ShaderItem::Plane(_) => DistortingPlane::vertex_shader(),
            ShaderItem::Raymarch(_) => Raymarching::vertex_shader(),
        }
    }

    pub fn fragment_shader(&self) -> String {
        match self {
            ShaderItem::Plane(_) => DistortingPlane::fragment_shader(),
            ShaderItem::Raymarch(_) => Raymarching::fragment_shader(),
        }
    }

    /// Current uniform values by GLSL name.
    pub fn uniforms(&self) -> Vec<(&'static str, UniformValue)> {
        match self {
            ShaderItem::Plane(s) => s.uniforms.entries(),
            ShaderItem::Raymarch(s) => s.uniforms.entries(),
        }
    }

    /// Uniform block bytes in std140 layout.
    pub fn uniform_bytes(&self) -> Vec<u8> {
        match self {
            ShaderItem::Plane(s) => s.uniforms.to_bytes(),
            ShaderItem::Raymarch(s) => s.uniforms.to_bytes(),
        }
    }

    pub fn transform(&self) -> Transform {
        match self {
            ShaderItem::Plane(s) => s.transform,
            ShaderItem::Raymarch(s) => s.transform,
        }
    }

    pub fn transparent(&self) -> bool {
        match self {
            ShaderItem::Plane(s) => s.transparent,
            ShaderItem::Raymarch(s) => s.transparent,
        }
    }
}

/// One drawable handed to the render collaborator.
#[derive(Clone, Copy, Debug)]
pub enum RenderItem<'a> {
    Points(&'a PointCloud),
    Mesh(&'a MeshSurface),
    Shader(ShaderItem<'a>),
}

/// The render surface consumed by the scene.
pub trait RenderSink {
    fn background(&mut self, background: &Background);
    fn points(&mut self, cloud: &PointCloud);
    fn mesh(&mut self, mesh: &MeshSurface);
    fn shader(&mut self, shader: ShaderItem<'_>);
}

/// Owns the parameter set and the single active pattern.
#[derive(Debug)]
pub struct Scene {
    params: ParamSet,
    viewport: Viewport,
    spawn: SpawnContext,
    pattern: Option<Pattern>,
    pending: Vec<ParamChange>,
    clock: FrameTime,
    elapsed: f32,
    sanitize_enabled: bool,
}

impl Scene {
    /// Create a scene and generate the selected pattern.
    pub fn new(params: ParamSet, viewport: Viewport) -> Self {
        Self::build(params, viewport, SpawnContext::new())
    }

    /// Like [`Scene::new`] with a deterministic random source.
    pub fn with_seed(params: ParamSet, viewport: Viewport, seed: u64) -> Self {
        Self::build(params, viewport, SpawnContext::seeded(seed))
    }

    fn build(params: ParamSet, viewport: Viewport, spawn: SpawnContext) -> Self {
        let mut scene = Self {
            params,
            viewport,
            spawn,
            pattern: None,
            pending: Vec::new(),
            clock: FrameTime::ZERO,
            elapsed: 0.0,
            sanitize_enabled: true,
        };
        scene.regenerate();
        scene
    }

    pub fn params(&self) -> &ParamSet {
        &self.params
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// The active pattern, `None` after a teardown or a discarded surface.
    pub fn active(&self) -> Option<&Pattern> {
        self.pattern.as_ref()
    }

    /// Pattern clock, scaled by the speed multiplier.
    pub fn pattern_time(&self) -> FrameTime {
        self.clock
    }

    pub fn sanitize_enabled(&self) -> bool {
        self.sanitize_enabled
    }

    pub fn set_sanitize_enabled(&mut self, enabled: bool) {
        self.sanitize_enabled = enabled;
    }

    /// Queue a change for the start of the next frame.
    pub fn queue(&mut self, change: ParamChange) {
        self.pending.push(change);
    }

    /// Number of changes waiting for the next frame.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Run one frame.
    pub fn advance(&mut self, frame: FrameTime) -> FrameReport {
        let mut report = FrameReport::default();
        let (regenerate, rejected) = self.apply_pending();
        report.rejected_changes = rejected;
        if regenerate {
            self.regenerate();
            report.regenerated = true;
        }

        self.elapsed = frame.elapsed;
        self.clock = self.clock.next(frame.delta.max(0.0) * self.params.speed);
        report.frame = self.clock;

        if let Some(pattern) = self.pattern.as_mut() {
            let ctx = FrameContext::new(self.clock, &self.params, &self.viewport);
            pattern.update(&ctx);
            if self.sanitize_enabled {
                report.sanitize = pattern.sanitize();
            }
        }
        if report.sanitize.discarded_surface {
            tracing::warn!(pattern = %self.params.pattern, "dropping surface from render set");
            self.pattern = None;
        }
        report.elements = self.pattern.as_ref().map_or(0, Pattern::element_count);
        report
    }

    /// Apply queued changes. Returns whether a regeneration is needed and how
    /// many changes were rejected.
    fn apply_pending(&mut self) -> (bool, usize) {
        let mut structural = false;
        let mut recolor = false;
        let mut resize_points = false;
        let mut rejected = 0;

        for change in std::mem::take(&mut self.pending) {
            match change {
                ParamChange::Set(key, value) => match self.params.set(key, value) {
                    Ok(ChangeKind::Structural) => structural = true,
                    Ok(ChangeKind::Cosmetic) => match key {
                        ParamKey::ColorA | ParamKey::ColorB | ParamKey::Background => {
                            recolor = true
                        }
                        ParamKey::Size => resize_points = true,
                        _ => {}
                    },
                    Err(err) => {
                        tracing::warn!(key = key.name(), %err, "rejected parameter change");
                        rejected += 1;
                    }
                },
                ParamChange::Replace(params) => {
                    self.params = *params;
                    structural = true;
                }
            }
        }

        if !structural {
            if let Some(pattern) = self.pattern.as_mut() {
                if recolor {
                    pattern.recolor(&self.params);
                }
                if resize_points {
                    pattern.set_point_size(self.params.size);
                }
            }
        }
        (structural, rejected)
    }

    /// Tear down the active pattern and generate the selected one.
    #[tracing::instrument(skip(self), fields(pattern = %self.params.pattern))]
    fn regenerate(&mut self) {
        self.teardown();
        let pattern = Pattern::generate(&self.params, &self.viewport, &mut self.spawn);
        tracing::debug!(elements = pattern.element_count(), "generated pattern");
        self.pattern = Some(pattern);
    }

    /// Switch archetype now, releasing the previous one first.
    pub fn select(&mut self, kind: PatternKind) {
        self.params.pattern = kind;
        self.regenerate();
    }

    /// Release the active pattern and all its buffers.
    pub fn teardown(&mut self) {
        if let Some(old) = self.pattern.take() {
            tracing::debug!(pattern = %old.kind(), "tearing down pattern");
        }
    }

    /// Update viewport facts. Takes effect for new generations and for the
    /// raymarch resolution on the next frame.
    pub fn resize(&mut self, width_px: u32, height_px: u32) {
        self.viewport.resize(width_px, height_px);
    }

    pub fn background(&self, elapsed: f32) -> Background {
        Background::from_params(&self.params, elapsed)
    }

    /// Drawables for the current frame.
    pub fn render_items(&self) -> Vec<RenderItem<'_>> {
        let item = match self.pattern.as_ref() {
            None => return Vec::new(),
            Some(Pattern::DistortingPlane(p)) => RenderItem::Shader(ShaderItem::Plane(&p.surface)),
            Some(Pattern::Raymarching(r)) => RenderItem::Shader(ShaderItem::Raymarch(&r.surface)),
            Some(pattern) => match (pattern.points(), pattern.mesh()) {
                (Some(cloud), _) => RenderItem::Points(cloud),
                (None, Some(mesh)) => RenderItem::Mesh(mesh),
                (None, None) => return Vec::new(),
            },
        };
        vec![item]
    }

    /// Hand the background and the active buffers to `sink`.
    pub fn submit(&self, sink: &mut impl RenderSink) {
        sink.background(&self.background(self.elapsed));
        for item in self.render_items() {
            match item {
                RenderItem::Points(cloud) => sink.points(cloud),
                RenderItem::Mesh(mesh) => sink.mesh(mesh),
                RenderItem::Shader(shader) => sink.shader(shader),
            }
        }
    }

    /// Standalone HTML reproducing the current parameters.
    pub fn export_html(&self) -> String {
        export::standalone_html(&self.params, &ExportOptions::default())
    }
}
