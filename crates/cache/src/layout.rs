//! Traits the layout cache is generic over, and the sections it returns.

use media_viewer_core::{FullId, UniversalId};

/// Presentation object kept by the cache for one entry
pub trait CachedLayout {
    /// Item this layout presents
    fn item_id(&self) -> FullId;

    /// Called once, right after construction and before first use
    fn init_dimensions(&mut self) {}

    /// Drop anything rendered from the current theme
    fn invalidate_cache(&mut self) {}
}

/// Builds layouts for entries missing from the cache
///
/// Returning `None` means the entry cannot be shown (deleted item, or an
/// item without the media this cache presents); it is skipped, not an error.
pub trait LayoutFactory<L> {
    fn create(&mut self, universal_id: UniversalId) -> Option<L>;
}

impl<L, F> LayoutFactory<L> for F
where
    F: FnMut(UniversalId) -> Option<L>,
{
    fn create(&mut self, universal_id: UniversalId) -> Option<L> {
        self(universal_id)
    }
}

/// Grouping policy deciding where sections break
pub trait SectionPolicy<L> {
    /// Whether `layout` still belongs to `section`. Never consulted for an
    /// empty section.
    fn fits(&self, section: &LayoutSection<'_, L>, layout: &L) -> bool;
}

impl<L, F> SectionPolicy<L> for F
where
    F: Fn(&LayoutSection<'_, L>, &L) -> bool,
{
    fn fits(&self, section: &LayoutSection<'_, L>, layout: &L) -> bool {
        self(section, layout)
    }
}

/// Pin a closure to the [`SectionPolicy`] signature so its argument types
/// and lifetimes are inferred.
pub fn section_policy<L, F>(policy: F) -> F
where
    F: Fn(&LayoutSection<'_, L>, &L) -> bool,
{
    policy
}

/// Policy that keeps everything in a single section
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleSection;

impl<L> SectionPolicy<L> for SingleSection {
    fn fits(&self, _section: &LayoutSection<'_, L>, _layout: &L) -> bool {
        true
    }
}

/// Run of consecutive layouts, newest first, borrowed from the cache
#[derive(Debug)]
pub struct LayoutSection<'a, L> {
    entries: Vec<(UniversalId, &'a L)>,
}

impl<L> Clone for LayoutSection<'_, L> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<'a, L> LayoutSection<'a, L> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, universal_id: UniversalId, layout: &'a L) {
        self.entries.push((universal_id, layout));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = UniversalId> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    pub fn layouts(&self) -> impl Iterator<Item = &'a L> + '_ {
        self.entries.iter().map(|(_, layout)| *layout)
    }

    pub fn iter(&self) -> impl Iterator<Item = (UniversalId, &'a L)> + '_ {
        self.entries.iter().copied()
    }

    /// Newest layout of the section
    pub fn first(&self) -> Option<&'a L> {
        self.entries.first().map(|(_, layout)| *layout)
    }

    /// Oldest layout of the section
    pub fn last(&self) -> Option<&'a L> {
        self.entries.last().map(|(_, layout)| *layout)
    }
}
