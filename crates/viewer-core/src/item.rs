//! Items shown in the media overview and the kinds of overview they feed.

use crate::ids::FullId;
use std::collections::HashMap;

pub type PhotoId = u64;
pub type DocumentId = u64;
pub type WebPageId = u64;

/// Kind of media overview a provider is specialized for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Photo,
    Gif,
    Video,
    File,
    MusicFile,
    VoiceFile,
    Link,
    RoundFile,
}

impl MediaKind {
    pub const ALL: [MediaKind; 8] = [
        MediaKind::Photo,
        MediaKind::Gif,
        MediaKind::Video,
        MediaKind::File,
        MediaKind::MusicFile,
        MediaKind::VoiceFile,
        MediaKind::Link,
        MediaKind::RoundFile,
    ];

    /// Kinds laid out as a tile grid rather than a list of rows.
    pub fn is_grid(self) -> bool {
        matches!(
            self,
            MediaKind::Photo | MediaKind::Gif | MediaKind::Video | MediaKind::RoundFile
        )
    }
}

/// Media attached to an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Media {
    Photo(PhotoId),
    Document(DocumentId),
    WebPage(WebPageId),
}

/// Snapshot of an item owned by the backing store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: FullId,
    pub media: Option<Media>,
}

impl Item {
    pub fn new(id: FullId, media: Option<Media>) -> Self {
        Self { id, media }
    }

    pub fn photo(&self) -> Option<PhotoId> {
        match self.media {
            Some(Media::Photo(photo)) => Some(photo),
            _ => None,
        }
    }

    pub fn document(&self) -> Option<DocumentId> {
        match self.media {
            Some(Media::Document(document)) => Some(document),
            _ => None,
        }
    }
}

/// Looks up items in the backing store.
///
/// Layouts never keep a pointer into the store; they re-resolve through this
/// trait and are dropped when the item is deleted.
pub trait ItemResolver {
    fn resolve(&self, id: FullId) -> Option<Item>;
}

impl ItemResolver for HashMap<FullId, Item> {
    fn resolve(&self, id: FullId) -> Option<Item> {
        self.get(&id).cloned()
    }
}

impl<R: ItemResolver + ?Sized> ItemResolver for &R {
    fn resolve(&self, id: FullId) -> Option<Item> {
        (**self).resolve(id)
    }
}
