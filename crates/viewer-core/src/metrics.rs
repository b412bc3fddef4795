//! Minimum row heights per media kind.
//!
//! The preload heuristic only needs a lower bound on how tall one entry can
//! be, so it can turn viewport heights into entry counts.

use crate::item::MediaKind;

/// Source of the smallest possible row height for a kind at a given width.
pub trait RowMetrics {
    /// Minimum height in pixels of one entry. Must be positive.
    fn min_item_height(&self, kind: MediaKind, width: i32) -> i32;
}

impl<F> RowMetrics for F
where
    F: Fn(MediaKind, i32) -> i32,
{
    fn min_item_height(&self, kind: MediaKind, width: i32) -> i32 {
        self(kind, width)
    }
}

/// Grid and list metrics of the standard overview style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardMetrics {
    /// Gap between grid tiles and around the grid
    pub grid_skip: i32,
    /// Smallest edge of a grid tile
    pub grid_min_size: i32,
    /// Vertical padding (top + bottom) of song and voice rows
    pub song_padding: i32,
    pub song_thumb_size: i32,
    /// Vertical padding (top + bottom) of file rows
    pub file_padding: i32,
    pub file_thumb_size: i32,
    pub link_photo_size: i32,
    /// Vertical margin (top + bottom) of link rows
    pub link_margin: i32,
    pub link_border: i32,
    pub line_width: i32,
}

impl Default for StandardMetrics {
    fn default() -> Self {
        Self {
            grid_skip: 2,
            grid_min_size: 90,
            song_padding: 14,
            song_thumb_size: 36,
            file_padding: 12,
            file_thumb_size: 70,
            link_photo_size: 46,
            link_margin: 14,
            link_border: 1,
            line_width: 1,
        }
    }
}

impl RowMetrics for StandardMetrics {
    fn min_item_height(&self, kind: MediaKind, width: i32) -> i32 {
        let height = match kind {
            MediaKind::Photo | MediaKind::Gif | MediaKind::Video | MediaKind::RoundFile => {
                let tile = self.grid_min_size + self.grid_skip;
                let items_in_row = ((width - self.grid_skip) / tile.max(1)).max(1);
                tile / items_in_row
            }
            MediaKind::VoiceFile => self.song_padding + self.song_thumb_size + self.line_width,
            MediaKind::File => self.file_padding + self.file_thumb_size + self.line_width,
            MediaKind::MusicFile => self.song_padding + self.song_thumb_size,
            MediaKind::Link => self.link_photo_size + self.link_margin + self.link_border,
        };
        height.max(1)
    }
}
