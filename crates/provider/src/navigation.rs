//! Saved navigation state

use media_viewer_core::FullId;
use serde::{Deserialize, Serialize};

/// Where the list was scrolled to: the topmost visible item and how far it
/// is shifted past the top edge, in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollTopState {
    pub item: Option<FullId>,
    pub shift: i32,
}

/// Window position saved when the viewer is closed and restored when it is
/// reopened
///
/// A memento with `ids_limit == 0` holds nothing and restores nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationMemento {
    pub around_id: Option<FullId>,
    pub ids_limit: usize,
    pub scroll_top_item: Option<FullId>,
    pub scroll_top_shift: i32,
}

impl NavigationMemento {
    pub fn is_empty(&self) -> bool {
        self.ids_limit == 0 || self.around_id.is_none()
    }

    /// Scroll position to hand back to the list on restore
    pub fn scroll_top(&self) -> ScrollTopState {
        ScrollTopState {
            item: self.scroll_top_item,
            shift: self.scroll_top_shift,
        }
    }
}
