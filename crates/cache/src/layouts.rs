//! Layout cache with mark-and-sweep eviction
//!
//! Keeps one presentation object per universal id for the entries rendered
//! in the most recent fill pass. Every pass marks all entries stale, touches
//! the ones it renders and evicts whatever stayed stale, so the cache always
//! mirrors "what was on the last render" rather than "what was last fetched".

use crate::layout::{CachedLayout, LayoutFactory, LayoutSection, SectionPolicy};
use media_viewer_core::{EventStream, FullId, Slice, UniversalId};
use std::collections::BTreeMap;
use std::ops::RangeBounds;
use tracing::trace;

/// Identity of a layout that left the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutRemoved {
    pub universal_id: UniversalId,
    pub item: FullId,
}

/// Why a layout left the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Eviction {
    Stale,
    Deleted,
}

/// Statistics about cache usage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutCacheStats {
    /// Number of layouts currently cached
    pub layout_count: usize,

    /// Layouts built by the factory
    pub created: u64,

    /// Fill-pass lookups answered by an existing layout
    pub reused: u64,

    /// Factory calls that produced nothing
    pub failed: u64,

    /// Layouts evicted because a fill pass did not render them
    pub evicted_stale: u64,

    /// Layouts removed because their item was deleted
    pub removed_deleted: u64,
}

impl LayoutCacheStats {
    /// Share of fill-pass lookups served without building (0.0 to 1.0)
    pub fn reuse_rate(&self) -> f64 {
        let total = self.reused + self.created;
        if total == 0 {
            0.0
        } else {
            self.reused as f64 / total as f64
        }
    }
}

struct LayoutEntry<L> {
    layout: L,
    stale: bool,
}

/// Cache of layouts keyed by universal id
///
/// Callers only ever get borrowed access; the cache owns every layout.
///
/// # Example
///
/// ```
/// use media_viewer_cache::{CachedLayout, LayoutCache, SingleSection};
/// use media_viewer_core::{CollectionId, FullId, Slice, UniversalId};
///
/// struct Row(FullId);
///
/// impl CachedLayout for Row {
///     fn item_id(&self) -> FullId {
///         self.0
///     }
/// }
///
/// let mut cache: LayoutCache<Row> = LayoutCache::new();
/// let slice = Slice::new(vec![1, 2, 3], Some(0), Some(0), Some(3)).unwrap();
/// let mut build = |id: UniversalId| Some(Row(FullId::new(CollectionId(1), id)));
///
/// let sections = cache.fill_sections(&slice, &mut build, &SingleSection);
/// assert_eq!(sections[0].ids().collect::<Vec<_>>(), vec![3, 2, 1]);
/// ```
pub struct LayoutCache<L> {
    entries: BTreeMap<UniversalId, LayoutEntry<L>>,
    removed: EventStream<LayoutRemoved>,
    stats: LayoutCacheStats,
}

impl<L: CachedLayout> LayoutCache<L> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            removed: EventStream::new(),
            stats: LayoutCacheStats::default(),
        }
    }

    /// Fires once per layout evicted by a sweep or by [`remove`](Self::remove)
    pub fn layout_removed(&self) -> &EventStream<LayoutRemoved> {
        &self.removed
    }

    /// Rebuild the sections for one render pass
    ///
    /// Walks `slice` from newest to oldest, reusing cached layouts and
    /// building missing ones through `factory`. Ids the factory cannot build
    /// are skipped. A new section starts whenever `policy` rejects a layout.
    /// Layouts not rendered by this pass are evicted afterwards.
    ///
    /// # Arguments
    ///
    /// * `slice` - Window to render
    /// * `factory` - Builds layouts for ids not cached yet
    /// * `policy` - Decides where sections break
    pub fn fill_sections<'a, F, P>(
        &'a mut self,
        slice: &Slice,
        factory: &mut F,
        policy: &P,
    ) -> Vec<LayoutSection<'a, L>>
    where
        F: LayoutFactory<L> + ?Sized,
        P: SectionPolicy<L> + ?Sized,
    {
        self.mark_stale();
        let rendered: Vec<UniversalId> = slice
            .iter_newest_first()
            .filter(|&id| self.touch(id, factory))
            .collect();
        self.clear_stale();

        let this: &'a Self = self;
        let mut sections = Vec::new();
        let mut section = LayoutSection::new();
        for id in rendered {
            let Some(layout) = this.lookup(id) else {
                continue;
            };
            if !section.is_empty() && !policy.fits(&section, layout) {
                sections.push(std::mem::replace(&mut section, LayoutSection::new()));
            }
            section.push(id, layout);
        }
        if !section.is_empty() {
            sections.push(section);
        }
        sections
    }

    /// Flag every layout as stale, starting a fill pass
    pub fn mark_stale(&mut self) {
        for entry in self.entries.values_mut() {
            entry.stale = true;
        }
    }

    /// Fetch or build the layout for `universal_id` and mark it fresh
    ///
    /// Returns `false` if it is not cached and the factory could not build it.
    pub fn touch<F>(&mut self, universal_id: UniversalId, factory: &mut F) -> bool
    where
        F: LayoutFactory<L> + ?Sized,
    {
        if let Some(entry) = self.entries.get_mut(&universal_id) {
            entry.stale = false;
            self.stats.reused += 1;
            return true;
        }

        match factory.create(universal_id) {
            Some(mut layout) => {
                layout.init_dimensions();
                self.entries.insert(
                    universal_id,
                    LayoutEntry {
                        layout,
                        stale: false,
                    },
                );
                self.stats.created += 1;
                self.stats.layout_count = self.entries.len();
                true
            }
            None => {
                self.stats.failed += 1;
                false
            }
        }
    }

    /// Evict every layout still flagged stale, finishing a fill pass
    ///
    /// Returns the number of evicted layouts.
    pub fn clear_stale(&mut self) -> usize {
        let stale: Vec<UniversalId> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.stale)
            .map(|(id, _)| *id)
            .collect();

        for &id in &stale {
            self.evict(id, Eviction::Stale);
        }
        if !stale.is_empty() {
            trace!(evicted = stale.len(), kept = self.entries.len(), "swept stale layouts");
        }
        stale.len()
    }

    /// Evict the layout of a deleted item right away
    ///
    /// Removing an id that is not cached does nothing and fires nothing.
    pub fn remove(&mut self, universal_id: UniversalId) -> bool {
        self.evict(universal_id, Eviction::Deleted)
    }

    /// Drop every layout without firing removals
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.layout_count = 0;
    }

    /// Ask every layout to drop its theme-dependent caches
    pub fn invalidate_all(&mut self) {
        for entry in self.entries.values_mut() {
            entry.layout.invalidate_cache();
        }
    }

    pub fn lookup(&self, universal_id: UniversalId) -> Option<&L> {
        self.entries.get(&universal_id).map(|entry| &entry.layout)
    }

    pub fn lookup_mut(&mut self, universal_id: UniversalId) -> Option<&mut L> {
        self.entries
            .get_mut(&universal_id)
            .map(|entry| &mut entry.layout)
    }

    pub fn contains(&self, universal_id: UniversalId) -> bool {
        self.entries.contains_key(&universal_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = UniversalId> + '_ {
        self.entries.keys().copied()
    }

    /// Cached layouts in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = (UniversalId, &L)> + '_ {
        self.entries.iter().map(|(id, entry)| (*id, &entry.layout))
    }

    /// Cached layouts whose ids fall in `range`, ascending
    ///
    /// # Panics
    ///
    /// Panics on ranges `BTreeMap::range` rejects (start after end, or equal
    /// excluded bounds).
    pub fn range<R>(&self, range: R) -> impl Iterator<Item = (UniversalId, &L)> + '_
    where
        R: RangeBounds<UniversalId>,
    {
        self.entries
            .range(range)
            .map(|(id, entry)| (*id, &entry.layout))
    }

    pub fn stats(&self) -> LayoutCacheStats {
        self.stats
    }

    fn evict(&mut self, universal_id: UniversalId, reason: Eviction) -> bool {
        let Some(entry) = self.entries.remove(&universal_id) else {
            return false;
        };

        match reason {
            Eviction::Stale => self.stats.evicted_stale += 1,
            Eviction::Deleted => self.stats.removed_deleted += 1,
        }
        self.stats.layout_count = self.entries.len();

        self.removed.fire(&LayoutRemoved {
            universal_id,
            item: entry.layout.item_id(),
        });
        true
    }
}

impl<L: CachedLayout> Default for LayoutCache<L> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{section_policy, SingleSection};
    use media_viewer_core::CollectionId;
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    #[derive(Debug)]
    struct TestLayout {
        item: FullId,
        initialized: bool,
        invalidations: u32,
    }

    impl CachedLayout for TestLayout {
        fn item_id(&self) -> FullId {
            self.item
        }

        fn init_dimensions(&mut self) {
            self.initialized = true;
        }

        fn invalidate_cache(&mut self) {
            self.invalidations += 1;
        }
    }

    fn build(id: UniversalId) -> Option<TestLayout> {
        Some(TestLayout {
            item: FullId::new(CollectionId(1), id),
            initialized: false,
            invalidations: 0,
        })
    }

    fn slice(ids: &[i64]) -> Slice {
        Slice::new(ids.to_vec(), None, None, None).unwrap()
    }

    fn record_removals(
        cache: &LayoutCache<TestLayout>,
    ) -> (Rc<RefCell<Vec<UniversalId>>>, media_viewer_core::Subscription) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let subscription = cache
            .layout_removed()
            .subscribe(move |removed| sink.borrow_mut().push(removed.universal_id));
        (log, subscription)
    }

    #[test]
    fn test_fill_orders_newest_first() {
        let mut cache: LayoutCache<TestLayout> = LayoutCache::new();
        let sections = cache.fill_sections(&slice(&[5, 9, 12]), &mut build, &SingleSection);

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].ids().collect::<Vec<_>>(), vec![12, 9, 5]);
        assert!(sections[0].layouts().all(|layout| layout.initialized));
    }

    #[test]
    fn test_second_pass_reuses_layouts() {
        let mut cache: LayoutCache<TestLayout> = LayoutCache::new();
        cache.fill_sections(&slice(&[1, 2, 3]), &mut build, &SingleSection);
        cache.fill_sections(&slice(&[1, 2, 3]), &mut build, &SingleSection);

        let stats = cache.stats();
        assert_eq!(stats.created, 3);
        assert_eq!(stats.reused, 3);
        assert_eq!(stats.layout_count, 3);
        assert!((stats.reuse_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sweep_evicts_ids_not_rendered() {
        let mut cache: LayoutCache<TestLayout> = LayoutCache::new();
        let (log, _subscription) = record_removals(&cache);

        cache.fill_sections(&slice(&[1, 2, 3, 4]), &mut build, &SingleSection);
        cache.fill_sections(&slice(&[2, 3]), &mut build, &SingleSection);

        let mut removed = log.borrow().clone();
        removed.sort_unstable();
        assert_eq!(removed, vec![1, 4]);
        assert_eq!(cache.ids().collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(cache.stats().evicted_stale, 2);
    }

    #[test]
    fn test_failed_construction_is_skipped() {
        let mut cache: LayoutCache<TestLayout> = LayoutCache::new();
        let mut only_even = |id: UniversalId| if id % 2 == 0 { build(id) } else { None };

        let sections = cache.fill_sections(&slice(&[1, 2, 3, 4]), &mut only_even, &SingleSection);

        assert_eq!(sections[0].ids().collect::<Vec<_>>(), vec![4, 2]);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().failed, 2);
    }

    #[test]
    fn test_policy_splits_sections() {
        let mut cache: LayoutCache<TestLayout> = LayoutCache::new();
        // Group by tens: 31, 35 | 22, 28 | 11
        let by_tens = section_policy(|section: &LayoutSection<'_, TestLayout>, row: &TestLayout| {
            section
                .first()
                .map(|first| first.item.local / 10 == row.item.local / 10)
                .unwrap_or(true)
        });

        let sections = cache.fill_sections(&slice(&[11, 22, 28, 31, 35]), &mut build, &by_tens);

        let grouped: Vec<Vec<_>> = sections.iter().map(|s| s.ids().collect()).collect();
        assert_eq!(grouped, vec![vec![35, 31], vec![28, 22], vec![11]]);
    }

    #[test]
    fn test_empty_slice_evicts_everything() {
        let mut cache: LayoutCache<TestLayout> = LayoutCache::new();
        cache.fill_sections(&slice(&[1, 2]), &mut build, &SingleSection);
        let sections = cache.fill_sections(&Slice::empty(), &mut build, &SingleSection);

        assert!(sections.is_empty());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_remove_fires_once() {
        let mut cache: LayoutCache<TestLayout> = LayoutCache::new();
        let (log, _subscription) = record_removals(&cache);
        cache.fill_sections(&slice(&[1, 2]), &mut build, &SingleSection);

        assert!(cache.remove(2));
        assert!(!cache.remove(2));
        assert!(!cache.remove(99));

        assert_eq!(*log.borrow(), vec![2]);
        assert_eq!(cache.stats().removed_deleted, 1);
    }

    #[test]
    fn test_clear_is_silent() {
        let mut cache: LayoutCache<TestLayout> = LayoutCache::new();
        let (log, _subscription) = record_removals(&cache);
        cache.fill_sections(&slice(&[1, 2]), &mut build, &SingleSection);

        cache.clear();
        assert!(cache.is_empty());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_invalidate_all_keeps_entries() {
        let mut cache: LayoutCache<TestLayout> = LayoutCache::new();
        cache.fill_sections(&slice(&[1, 2]), &mut build, &SingleSection);

        cache.invalidate_all();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.lookup(1).unwrap().invalidations, 1);
    }

    #[test]
    fn test_lookup_has_no_side_effects() {
        let mut cache: LayoutCache<TestLayout> = LayoutCache::new();
        cache.fill_sections(&slice(&[1]), &mut build, &SingleSection);
        let before = cache.stats();

        assert!(cache.lookup(1).is_some());
        assert!(cache.lookup(2).is_none());
        assert_eq!(cache.stats(), before);
    }

    #[test]
    fn test_range_iteration() {
        let mut cache: LayoutCache<TestLayout> = LayoutCache::new();
        cache.fill_sections(&slice(&[1, 5, 9, 13]), &mut build, &SingleSection);

        let ids: HashSet<_> = cache.range(4..=9).map(|(id, _)| id).collect();
        assert_eq!(ids, HashSet::from([5, 9]));
    }

    #[test]
    fn test_manual_pass_matches_fill() {
        let mut cache: LayoutCache<TestLayout> = LayoutCache::new();
        let mut factory = build;
        cache.touch(1, &mut factory);
        cache.touch(2, &mut factory);

        cache.mark_stale();
        cache.touch(2, &mut factory);
        assert_eq!(cache.clear_stale(), 1);
        assert!(cache.contains(2));
        assert!(!cache.contains(1));
        assert!(cache.lookup_mut(2).is_some());
    }
}
