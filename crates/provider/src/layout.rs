//! Concrete media layouts and the factory that builds them on demand

use media_viewer_cache::{CachedLayout, LayoutFactory};
use media_viewer_core::{
    DocumentId, FullId, IdSpace, Item, ItemResolver, Media, MediaKind, PhotoId, UniversalId,
};

/// Per-layout lifecycle flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutState {
    initialized: bool,
    invalidations: u32,
}

impl LayoutState {
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// How many times theme-dependent caches were dropped
    pub fn invalidations(&self) -> u32 {
        self.invalidations
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoLayout {
    pub item: FullId,
    pub photo: PhotoId,
    state: LayoutState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLayout {
    pub item: FullId,
    pub document: DocumentId,
    state: LayoutState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkLayout {
    pub item: FullId,
    pub media: Option<Media>,
    state: LayoutState,
}

/// Presentation of one shared-media entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaLayout {
    Photo(PhotoLayout),
    Gif(DocumentLayout),
    Video(DocumentLayout),
    File(DocumentLayout),
    MusicFile(DocumentLayout),
    VoiceFile(DocumentLayout),
    RoundFile(DocumentLayout),
    Link(LinkLayout),
}

impl MediaLayout {
    /// Layout presenting `item` as `kind`
    ///
    /// Returns `None` when the item lacks the media the kind needs. Links
    /// always build.
    ///
    /// # Example
    ///
    /// ```
    /// use media_viewer_core::{CollectionId, FullId, Item, Media, MediaKind};
    /// use media_viewer_provider::MediaLayout;
    ///
    /// let item = Item::new(FullId::new(CollectionId(1), 7), Some(Media::Photo(3)));
    /// assert!(MediaLayout::build(MediaKind::Photo, &item).is_some());
    /// assert!(MediaLayout::build(MediaKind::Video, &item).is_none());
    /// assert!(MediaLayout::build(MediaKind::Link, &item).is_some());
    /// ```
    pub fn build(kind: MediaKind, item: &Item) -> Option<Self> {
        let document = || {
            item.document().map(|document| DocumentLayout {
                item: item.id,
                document,
                state: LayoutState::default(),
            })
        };

        match kind {
            MediaKind::Photo => item.photo().map(|photo| {
                Self::Photo(PhotoLayout {
                    item: item.id,
                    photo,
                    state: LayoutState::default(),
                })
            }),
            MediaKind::Gif => document().map(Self::Gif),
            MediaKind::Video => document().map(Self::Video),
            MediaKind::File => document().map(Self::File),
            MediaKind::MusicFile => document().map(Self::MusicFile),
            MediaKind::VoiceFile => document().map(Self::VoiceFile),
            MediaKind::RoundFile => document().map(Self::RoundFile),
            MediaKind::Link => Some(Self::Link(LinkLayout {
                item: item.id,
                media: item.media,
                state: LayoutState::default(),
            })),
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            Self::Photo(_) => MediaKind::Photo,
            Self::Gif(_) => MediaKind::Gif,
            Self::Video(_) => MediaKind::Video,
            Self::File(_) => MediaKind::File,
            Self::MusicFile(_) => MediaKind::MusicFile,
            Self::VoiceFile(_) => MediaKind::VoiceFile,
            Self::RoundFile(_) => MediaKind::RoundFile,
            Self::Link(_) => MediaKind::Link,
        }
    }

    pub fn item(&self) -> FullId {
        match self {
            Self::Photo(layout) => layout.item,
            Self::Link(layout) => layout.item,
            Self::Gif(layout)
            | Self::Video(layout)
            | Self::File(layout)
            | Self::MusicFile(layout)
            | Self::VoiceFile(layout)
            | Self::RoundFile(layout) => layout.item,
        }
    }

    pub fn state(&self) -> LayoutState {
        *self.state_ref()
    }

    fn state_ref(&self) -> &LayoutState {
        match self {
            Self::Photo(layout) => &layout.state,
            Self::Link(layout) => &layout.state,
            Self::Gif(layout)
            | Self::Video(layout)
            | Self::File(layout)
            | Self::MusicFile(layout)
            | Self::VoiceFile(layout)
            | Self::RoundFile(layout) => &layout.state,
        }
    }

    fn state_mut(&mut self) -> &mut LayoutState {
        match self {
            Self::Photo(layout) => &mut layout.state,
            Self::Link(layout) => &mut layout.state,
            Self::Gif(layout)
            | Self::Video(layout)
            | Self::File(layout)
            | Self::MusicFile(layout)
            | Self::VoiceFile(layout)
            | Self::RoundFile(layout) => &mut layout.state,
        }
    }
}

impl CachedLayout for MediaLayout {
    fn item_id(&self) -> FullId {
        self.item()
    }

    fn init_dimensions(&mut self) {
        self.state_mut().initialized = true;
    }

    fn invalidate_cache(&mut self) {
        self.state_mut().invalidations += 1;
    }
}

/// Builds [`MediaLayout`]s by resolving universal ids through the store
pub struct MediaLayoutFactory<'a, R: ?Sized> {
    space: IdSpace,
    kind: MediaKind,
    resolver: &'a R,
}

impl<'a, R: ItemResolver + ?Sized> MediaLayoutFactory<'a, R> {
    pub fn new(space: IdSpace, kind: MediaKind, resolver: &'a R) -> Self {
        Self {
            space,
            kind,
            resolver,
        }
    }
}

impl<R: ItemResolver + ?Sized> LayoutFactory<MediaLayout> for MediaLayoutFactory<'_, R> {
    fn create(&mut self, universal_id: UniversalId) -> Option<MediaLayout> {
        let item = self.resolver.resolve(self.space.to_full_id(universal_id))?;
        MediaLayout::build(self.kind, &item)
    }
}
