//! Property tests for the layout cache.
//!
//! 1. Stale sweep: after any fill pass the cache holds exactly the ids of the
//!    rendered slice, and every id dropped since the previous pass fired one
//!    removal.
//! 2. Drag selection is idempotent.
//! 3. Deleting entries in any order fires one removal per cached entry and
//!    none for unknown ids.

use media_viewer_cache::{
    apply_drag_selection, CachedLayout, DragRange, LayoutCache, SelectionMap, SelectionMark,
    SingleSection,
};
use media_viewer_core::{CollectionId, FullId, IdSpace, Slice, UniversalId};
use proptest::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

const PRIMARY: CollectionId = CollectionId(3);

struct Row(FullId);

impl CachedLayout for Row {
    fn item_id(&self) -> FullId {
        self.0
    }
}

fn space() -> IdSpace {
    IdSpace::new(PRIMARY, None)
}

fn id_set() -> impl Strategy<Value = BTreeSet<i64>> {
    prop::collection::btree_set(1i64..500, 0..60)
}

fn fill(cache: &mut LayoutCache<Row>, ids: &BTreeSet<i64>) {
    let slice = Slice::new(ids.iter().copied().collect(), None, None, None).unwrap();
    let space = space();
    let mut build = |id: UniversalId| Some(Row(space.to_full_id(id)));
    cache.fill_sections(&slice, &mut build, &SingleSection);
}

fn removal_log(
    cache: &LayoutCache<Row>,
) -> (Rc<RefCell<Vec<i64>>>, media_viewer_core::Subscription) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    let subscription = cache
        .layout_removed()
        .subscribe(move |removed| sink.borrow_mut().push(removed.universal_id));
    (log, subscription)
}

proptest! {
    #[test]
    fn sweep_keeps_exactly_the_rendered_ids(first in id_set(), second in id_set()) {
        let mut cache: LayoutCache<Row> = LayoutCache::new();
        let (log, _subscription) = removal_log(&cache);

        fill(&mut cache, &first);
        prop_assert!(log.borrow().is_empty());
        fill(&mut cache, &second);

        let cached: BTreeSet<i64> = cache.ids().collect();
        prop_assert_eq!(&cached, &second);

        let removed: BTreeSet<i64> = log.borrow().iter().copied().collect();
        let expected: BTreeSet<i64> = first.difference(&second).copied().collect();
        prop_assert_eq!(removed, expected);
        prop_assert_eq!(log.borrow().len(), first.difference(&second).count());
    }

    #[test]
    fn drag_selection_is_idempotent(
        cached in id_set(),
        preselected in prop::collection::btree_set(1i64..500, 0..20),
        from in 1i64..500,
        till in 1i64..500,
        skip_from in any::<bool>(),
        skip_till in any::<bool>(),
        max_selected in 0usize..80,
    ) {
        let mut cache: LayoutCache<Row> = LayoutCache::new();
        fill(&mut cache, &cached);

        let mut selected: SelectionMap = preselected
            .iter()
            .map(|&local| (FullId::new(PRIMARY, local), SelectionMark::Partial { from: 0, to: 1 }))
            .collect();
        let range = DragRange::new(from, skip_from, till, skip_till);

        apply_drag_selection(&cache, &space(), &mut selected, range, max_selected);
        let once = selected.clone();
        let added = apply_drag_selection(&cache, &space(), &mut selected, range, max_selected);

        prop_assert_eq!(&selected, &once);
        prop_assert_eq!(added, 0);
        for id in selected.keys() {
            prop_assert!(range.contains(id.local));
        }
    }

    #[test]
    fn deletions_fire_once_per_cached_entry(cached in id_set(), seed in any::<u64>()) {
        let mut cache: LayoutCache<Row> = LayoutCache::new();
        fill(&mut cache, &cached);
        let (log, _subscription) = removal_log(&cache);

        let mut order: Vec<i64> = (1..500).collect();
        order.shuffle(&mut rand::rngs::StdRng::seed_from_u64(seed));
        for id in order {
            cache.remove(id);
        }

        prop_assert!(cache.is_empty());
        let removed: BTreeSet<i64> = log.borrow().iter().copied().collect();
        prop_assert_eq!(log.borrow().len(), cached.len());
        prop_assert_eq!(removed, cached.clone());
        prop_assert_eq!(cache.stats().removed_deleted, cached.len() as u64);
    }
}
