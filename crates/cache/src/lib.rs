//! Media Viewer Cache Library
//!
//! Layout cache with mark-and-sweep eviction, plus drag-selection resolution
//! over the cached window.

pub mod layout;
pub mod layouts;
pub mod selection;

pub use layout::{
    section_policy, CachedLayout, LayoutFactory, LayoutSection, SectionPolicy, SingleSection,
};
pub use layouts::{LayoutCache, LayoutCacheStats, LayoutRemoved};
pub use selection::{apply_drag_selection, DragRange, SelectionMap, SelectionMark};
