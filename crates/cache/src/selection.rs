//! Drag-selection range resolution over the cached window

use crate::layout::CachedLayout;
use crate::layouts::LayoutCache;
use media_viewer_core::{FullId, IdSpace, UniversalId};
use std::collections::BTreeMap;
use tracing::trace;

/// Selection state of one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMark {
    /// The whole entry
    Full,
    /// A text range inside the entry
    Partial { from: u16, to: u16 },
}

/// Selected entries, owned by the caller
pub type SelectionMap = BTreeMap<FullId, SelectionMark>;

/// Half-open universal id range `(till, from]` swept by a drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragRange {
    from: UniversalId,
    till: UniversalId,
}

impl DragRange {
    /// Range between the entry the drag started on and the one it ended on
    ///
    /// `skip_from` leaves the `from` entry out, `skip_till` leaves the `till`
    /// entry out.
    ///
    /// # Example
    ///
    /// ```
    /// use media_viewer_cache::DragRange;
    ///
    /// let range = DragRange::new(10, false, 5, false);
    /// assert!(range.contains(10));
    /// assert!(range.contains(5));
    /// assert!(!range.contains(4));
    ///
    /// assert!(DragRange::new(10, true, 10, true).is_empty());
    /// ```
    pub fn new(
        from_id: UniversalId,
        skip_from: bool,
        till_id: UniversalId,
        skip_till: bool,
    ) -> Self {
        Self {
            from: from_id - i64::from(skip_from),
            till: till_id - i64::from(!skip_till),
        }
    }

    /// Highest id included
    pub fn from(&self) -> UniversalId {
        self.from
    }

    /// Highest id excluded below the range
    pub fn till(&self) -> UniversalId {
        self.till
    }

    pub fn contains(&self, id: UniversalId) -> bool {
        id > self.till && id <= self.from
    }

    pub fn is_empty(&self) -> bool {
        self.till >= self.from
    }
}

/// Make `selected` match a drag over `range`
///
/// Drops every selected entry outside the range (entries of collections
/// outside `space` included), then marks each cached layout inside the range
/// as fully selected. Entries already selected are updated in place; new ones
/// are only added while fewer than `max_selected` entries are selected.
///
/// Returns the number of entries added.
pub fn apply_drag_selection<L: CachedLayout>(
    cache: &LayoutCache<L>,
    space: &IdSpace,
    selected: &mut SelectionMap,
    range: DragRange,
    max_selected: usize,
) -> usize {
    let before = selected.len();
    selected.retain(|id, _| {
        space
            .to_universal(*id)
            .map(|universal| range.contains(universal))
            .unwrap_or(false)
    });
    let pruned = before - selected.len();

    let mut added = 0;
    if !range.is_empty() {
        for (_, layout) in cache.range(range.till + 1..=range.from) {
            let item = layout.item_id();
            if let Some(mark) = selected.get_mut(&item) {
                *mark = SelectionMark::Full;
            } else if selected.len() < max_selected {
                selected.insert(item, SelectionMark::Full);
                added += 1;
            }
        }
    }

    trace!(
        from = range.from,
        till = range.till,
        pruned,
        added,
        selected = selected.len(),
        "applied drag selection"
    );
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::SingleSection;
    use media_viewer_core::{CollectionId, Slice, SERVER_MAX_LOCAL_ID};

    const PRIMARY: CollectionId = CollectionId(1);
    const MIGRATED: CollectionId = CollectionId(2);

    struct Row(FullId);

    impl CachedLayout for Row {
        fn item_id(&self) -> FullId {
            self.0
        }
    }

    fn space() -> IdSpace {
        IdSpace::new(PRIMARY, Some(MIGRATED))
    }

    fn cache_with(ids: &[i64]) -> LayoutCache<Row> {
        let space = space();
        let mut cache: LayoutCache<Row> = LayoutCache::new();
        let slice = Slice::new(ids.to_vec(), None, None, None).unwrap();
        let mut build = |id: UniversalId| Some(Row(space.to_full_id(id)));
        cache.fill_sections(&slice, &mut build, &SingleSection);
        cache
    }

    fn primary(local: i64) -> FullId {
        FullId::new(PRIMARY, local)
    }

    fn select(
        cache: &LayoutCache<Row>,
        selected: &mut SelectionMap,
        range: DragRange,
        max_selected: usize,
    ) -> usize {
        apply_drag_selection(cache, &space(), selected, range, max_selected)
    }

    #[test]
    fn test_range_bounds() {
        let range = DragRange::new(10, true, 5, true);
        assert_eq!((range.from(), range.till()), (9, 5));
        assert!(!range.contains(10));
        assert!(!range.contains(5));
        assert!(range.contains(6));

        let reversed = DragRange::new(3, false, 8, false);
        assert!(reversed.is_empty());
    }

    #[test]
    fn test_selects_cached_entries_in_range() {
        let cache = cache_with(&[1, 2, 3, 4, 5, 6]);
        let mut selected = SelectionMap::new();

        let added = select(&cache, &mut selected, DragRange::new(5, false, 2, false), 100);

        assert_eq!(added, 4);
        assert_eq!(
            selected.keys().copied().collect::<Vec<_>>(),
            vec![primary(2), primary(3), primary(4), primary(5)]
        );
    }

    #[test]
    fn test_prunes_outside_and_foreign_entries() {
        let cache = cache_with(&[1, 2, 3]);
        let mut selected = SelectionMap::new();
        selected.insert(primary(1), SelectionMark::Full);
        selected.insert(primary(50), SelectionMark::Full);
        selected.insert(FullId::new(CollectionId(99), 2), SelectionMark::Full);

        select(&cache, &mut selected, DragRange::new(3, false, 2, false), 100);

        assert_eq!(
            selected.keys().copied().collect::<Vec<_>>(),
            vec![primary(2), primary(3)]
        );
    }

    #[test]
    fn test_partial_selection_becomes_full() {
        let cache = cache_with(&[1, 2, 3]);
        let mut selected = SelectionMap::new();
        selected.insert(primary(2), SelectionMark::Partial { from: 0, to: 4 });

        let added = select(&cache, &mut selected, DragRange::new(3, false, 1, false), 100);

        assert_eq!(added, 2);
        assert_eq!(selected.get(&primary(2)), Some(&SelectionMark::Full));
    }

    #[test]
    fn test_cap_limits_new_entries_only() {
        let cache = cache_with(&[1, 2, 3, 4, 5]);
        let mut selected = SelectionMap::new();
        selected.insert(primary(5), SelectionMark::Partial { from: 1, to: 2 });

        let added = select(&cache, &mut selected, DragRange::new(5, false, 1, false), 3);

        assert_eq!(added, 2);
        assert_eq!(selected.len(), 3);
        assert_eq!(selected.get(&primary(5)), Some(&SelectionMark::Full));
    }

    #[test]
    fn test_empty_range_clears_selection() {
        let cache = cache_with(&[1, 2, 3]);
        let mut selected = SelectionMap::new();
        selected.insert(primary(2), SelectionMark::Full);

        let added = select(&cache, &mut selected, DragRange::new(2, true, 2, true), 100);

        assert_eq!(added, 0);
        assert!(selected.is_empty());
    }

    #[test]
    fn test_range_spans_migrated_collection() {
        let migrated_id = 7 - SERVER_MAX_LOCAL_ID;
        let cache = cache_with(&[migrated_id, 1, 2]);
        let mut selected = SelectionMap::new();

        select(&cache, &mut selected, DragRange::new(1, false, migrated_id, false), 100);

        assert!(selected.contains_key(&FullId::new(MIGRATED, 7)));
        assert!(selected.contains_key(&primary(1)));
        assert!(!selected.contains_key(&primary(2)));
    }

    #[test]
    fn test_uncached_entries_are_not_added() {
        let cache = cache_with(&[1, 3]);
        let mut selected = SelectionMap::new();

        select(&cache, &mut selected, DragRange::new(3, false, 1, false), 100);

        assert!(!selected.contains_key(&primary(2)));
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_full_selection_still_upgrades_existing_entries() {
        let cache = cache_with(&[1, 2, 3]);
        let mut selected = SelectionMap::new();
        selected.insert(primary(3), SelectionMark::Partial { from: 2, to: 6 });

        let added = select(&cache, &mut selected, DragRange::new(3, false, 1, false), 1);

        assert_eq!(added, 0);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected.get(&primary(3)), Some(&SelectionMark::Full));
    }
}
