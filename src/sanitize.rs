//! Geometry validation and repair.
//!
//! Runs after every update pass. Each position buffer ends up in one of
//! three states:
//!
//! | State | Condition | Outcome |
//! |-------|-----------|---------|
//! | Valid | every component finite | untouched |
//! | Repaired | a base position exists | non-finite components replaced from base (or 0) |
//! | Discarded | no base, or repair failed | entity or whole surface removed |
//!
//! A discard is local: it never stops the frame loop.

use glam::Vec3;

/// Outcome of one sanitize pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SanitizeReport {
    /// Components replaced from a base position.
    pub repaired: usize,
    /// Entities removed from a point cloud.
    pub discarded_entities: usize,
    /// The whole surface must be dropped from the render set.
    pub discarded_surface: bool,
}

impl SanitizeReport {
    pub fn repaired(count: usize) -> Self {
        Self {
            repaired: count,
            ..Default::default()
        }
    }

    pub fn discarded(entities: usize) -> Self {
        Self {
            discarded_entities: entities,
            ..Default::default()
        }
    }

    pub fn surface_discarded(repaired: usize) -> Self {
        Self {
            repaired,
            discarded_surface: true,
            ..Default::default()
        }
    }

    /// Nothing needed fixing.
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }

    /// Accumulate another report into this one.
    pub fn merge(&mut self, other: SanitizeReport) {
        self.repaired += other.repaired;
        self.discarded_entities += other.discarded_entities;
        self.discarded_surface |= other.discarded_surface;
    }
}

/// Implemented by every pattern state that owns position buffers.
pub trait Sanitize {
    /// Validate positions, repairing or discarding as needed.
    fn sanitize(&mut self) -> SanitizeReport;
}

/// Whether every component of every position is finite.
pub fn is_finite_buffer(positions: &[Vec3]) -> bool {
    positions.iter().all(|p| p.is_finite())
}

/// Indices of positions with any non-finite component, ascending.
///
/// Allocates nothing when the buffer is valid.
pub fn non_finite_indices(positions: &[Vec3]) -> Vec<usize> {
    if is_finite_buffer(positions) {
        return Vec::new();
    }
    positions
        .iter()
        .enumerate()
        .filter(|(_, p)| !p.is_finite())
        .map(|(i, _)| i)
        .collect()
}

/// Replace every non-finite component with the matching base component, or
/// 0 where the base is itself non-finite. Returns the number of components
/// replaced.
pub fn repair(positions: &mut [Vec3], base: &[Vec3]) -> usize {
    let mut repaired = 0;
    for (i, p) in positions.iter_mut().enumerate() {
        if p.is_finite() {
            continue;
        }
        let fallback = base.get(i).copied().unwrap_or(Vec3::ZERO);
        for axis in 0..3 {
            if !p[axis].is_finite() {
                let b = fallback[axis];
                p[axis] = if b.is_finite() { b } else { 0.0 };
                repaired += 1;
            }
        }
    }
    if repaired > 0 {
        tracing::debug!(repaired, "repaired non-finite position components");
    }
    repaired
}
