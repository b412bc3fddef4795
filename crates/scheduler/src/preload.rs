//! Viewport-aware preload decisions
//!
//! Turns the viewport size into entry counts and decides whether the loaded
//! window has to be re-centered (and possibly widened) around the entry the
//! user is scrolling towards:
//! 1. Keep `2 * preloaded_screens + 1` screens of entries materialized
//! 2. Re-center once the visible edge drifts `preloaded_screens -
//!    threshold_screens` screens away from the focal entry
//! 3. Widen the window whenever it is narrower than the screens require

use media_viewer_core::{Slice, UniversalId};

/// Visible area of the list in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Screen counts driving the heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreloadConfig {
    /// Screens kept loaded on each side of the current one
    pub preloaded_screens: i32,
    /// Re-center when fewer than this many screens would remain ahead
    pub threshold_screens: i32,
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            preloaded_screens: 4,
            threshold_screens: 1,
        }
    }
}

impl PreloadConfig {
    /// Screens covered by a full window: both sides plus the current one
    pub fn full_screens(&self) -> i64 {
        i64::from(self.preloaded_screens) * 2 + 1
    }

    /// Screens between the focal entry and the re-center point
    fn drift_screens(&self) -> i64 {
        i64::from(self.preloaded_screens) - i64::from(self.threshold_screens)
    }
}

/// Entry counts derived from one viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreloadLimits {
    /// Entries fitting in a full window
    pub preloaded_count: usize,
    /// Narrowest acceptable half-width
    pub ids_limit_min: usize,
    /// Half-width to request when re-centering
    pub ids_limit: usize,
    /// Drift (in slice positions) from the focal entry that forces a re-center
    pub min_universal_id_delta: usize,
}

impl PreloadLimits {
    /// Compute the limits for a viewport of `viewport_height` pixels whose
    /// entries are at least `min_item_height` pixels tall
    ///
    /// # Example
    ///
    /// ```
    /// use media_viewer_scheduler::{PreloadConfig, PreloadLimits};
    ///
    /// let limits = PreloadLimits::compute(&PreloadConfig::default(), 600, 50);
    /// assert_eq!(limits.preloaded_count, 108);
    /// assert_eq!(limits.ids_limit_min, 55);
    /// assert_eq!(limits.ids_limit, 67);
    /// assert_eq!(limits.min_universal_id_delta, 36);
    /// ```
    pub fn compute(config: &PreloadConfig, viewport_height: i32, min_item_height: i32) -> Self {
        let height = i64::from(viewport_height.max(0));
        let item = i64::from(min_item_height.max(1));

        let preloaded_count = config.full_screens().max(0).saturating_mul(height) / item;
        let ids_limit_min = preloaded_count / 2 + 1;
        let ids_limit = ids_limit_min.saturating_add(height / item);
        let min_universal_id_delta = config.drift_screens().max(0).saturating_mul(height) / item;

        Self {
            preloaded_count: to_count(preloaded_count),
            ids_limit_min: to_count(ids_limit_min),
            ids_limit: to_count(ids_limit),
            min_universal_id_delta: to_count(min_universal_id_delta),
        }
    }
}

fn to_count(value: i64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

/// Which visible edge to preload around
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreloadEdge {
    /// Newer entries
    Top,
    /// Older entries
    Bottom,
}

/// Pick the edge to evaluate, if any
///
/// The top edge wins when both are requested. An edge whose end of the list
/// is already loaded is never evaluated.
pub fn choose_edge(slice: &Slice, preload_top: bool, preload_bottom: bool) -> Option<PreloadEdge> {
    if preload_top && !slice.top_loaded() {
        Some(PreloadEdge::Top)
    } else if preload_bottom && !slice.bottom_loaded() {
        Some(PreloadEdge::Bottom)
    } else {
        None
    }
}

/// Whether the window must be re-centered on `candidate`
///
/// `focal` and `candidate` must already be normalized slice-key ids. If
/// either is missing from the slice the window cannot be measured and is
/// re-centered.
pub fn preload_required(
    limits: &PreloadLimits,
    current_ids_limit: usize,
    slice: &Slice,
    focal: UniversalId,
    candidate: UniversalId,
) -> bool {
    if current_ids_limit < limits.ids_limit_min {
        return true;
    }
    match slice.distance(focal, candidate) {
        Some(delta) => delta.unsigned_abs() >= limits.min_universal_id_delta,
        None => true,
    }
}
