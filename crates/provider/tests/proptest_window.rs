//! Property tests for the window controller.
//!
//! 1. `ids_limit` never shrinks between restarts and never drops below the
//!    configured floor.
//! 2. With a source that answers immediately, the focal id is always loaded
//!    once the first slice arrived.
//! 3. A restart returns the window to its initial shape.

use media_viewer_core::{CollectionId, FullId, IdSpace, Item, MediaKind};
use media_viewer_provider::{MediaProvider, ProviderConfig};
use media_viewer_scheduler::{MemorySliceSource, Viewport};
use proptest::prelude::*;
use std::collections::HashMap;

const PRIMARY: CollectionId = CollectionId(5);
const COUNT: i64 = 5_000;

#[derive(Debug, Clone)]
struct Scroll {
    height: i32,
    top: i64,
    bottom: i64,
    preload_top: bool,
    preload_bottom: bool,
}

fn scroll() -> impl Strategy<Value = Scroll> {
    (100i32..2_000, 1i64..=COUNT, 1i64..=COUNT, any::<bool>(), any::<bool>()).prop_map(
        |(height, a, b, preload_top, preload_bottom)| Scroll {
            height,
            top: a.max(b),
            bottom: a.min(b),
            preload_top,
            preload_bottom,
        },
    )
}

fn provider(kind: MediaKind) -> MediaProvider<MemorySliceSource, HashMap<FullId, Item>> {
    MediaProvider::new(
        IdSpace::new(PRIMARY, None),
        kind,
        MemorySliceSource::new((1..=COUNT).collect()),
        HashMap::new(),
        ProviderConfig::default(),
    )
    .unwrap()
}

fn kind() -> impl Strategy<Value = MediaKind> {
    prop::sample::select(MediaKind::ALL.to_vec())
}

proptest! {
    #[test]
    fn ids_limit_only_grows(kind in kind(), scrolls in prop::collection::vec(scroll(), 1..30)) {
        let mut provider = provider(kind);
        provider.restart();
        let mut previous = provider.ids_limit();
        prop_assert_eq!(previous, 16);

        for step in scrolls {
            provider.check_preload(
                Viewport::new(480, step.height),
                FullId::new(PRIMARY, step.top),
                FullId::new(PRIMARY, step.bottom),
                step.preload_top,
                step.preload_bottom,
            );

            prop_assert!(provider.ids_limit() >= previous);
            prop_assert!(provider.ids_limit() >= provider.config().min_ids_limit);
            prop_assert!(provider.slice().contains(provider.around_id()));
            prop_assert_eq!(provider.full_count(), Some(COUNT as usize));
            previous = provider.ids_limit();
        }

        provider.restart();
        prop_assert_eq!(provider.ids_limit(), 16);
        prop_assert_eq!(provider.around_id(), COUNT);
        prop_assert!(provider.layouts().is_empty());
    }
}
