//! Per-axis search results and derating.

use heapless::FnvIndexMap;

use super::attempt::SearchKind;
use crate::geometry::Axis;

/// Converged per-axis maxima of one top-level search command.
///
/// Built once per command and frozen after [`SearchResult::derate`]: the
/// recommendation is the *minimum* derated value across axes, because the
/// recommended setting must be safe on the worst axis, not the average one.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Parameter these values apply to.
    pub kind: SearchKind,
    values: FnvIndexMap<Axis, f32, 8>,
    /// Cross-axis recommendation; set by [`SearchResult::derate`].
    pub recommended: Option<f32>,
    /// Total wall-clock duration of the command, seconds.
    pub duration: f32,
}

impl SearchResult {
    /// Empty result for `kind`.
    pub fn new(kind: SearchKind) -> Self {
        Self {
            kind,
            values: FnvIndexMap::new(),
            recommended: None,
            duration: 0.0,
        }
    }

    /// Store the converged value for an axis. Capacity covers every [`Axis`]
    /// variant, so an insert of a fresh axis cannot fail.
    pub fn insert(&mut self, axis: Axis, value: f32) {
        let _ = self.values.insert(axis, value);
    }

    /// Converged value for an axis, if it was searched.
    pub fn get(&self, axis: Axis) -> Option<f32> {
        self.values.get(&axis).copied()
    }

    /// Iterate over `(axis, value)` entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Axis, f32)> + '_ {
        self.values.iter().map(|(axis, value)| (*axis, *value))
    }

    /// Number of axes with a converged value.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no axis has converged yet.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Multiply every entry by `factor` (0 < factor < 1) and store the
    /// minimum derated value as the cross-axis recommendation.
    pub fn derate(&mut self, factor: f32) {
        let mut min: Option<f32> = None;
        for value in self.values.values_mut() {
            *value *= factor;
            min = Some(match min {
                Some(m) if m <= *value => m,
                _ => *value,
            });
        }
        self.recommended = min;
    }
}
