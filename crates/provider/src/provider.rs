//! Window controller over one shared-media list
//!
//! [`MediaProvider`] keeps a window of entries loaded around a focal id and
//! moves it as the user scrolls:
//! 1. The list reports its visible edges through `check_preload`
//! 2. When the window is too narrow or the edge drifted too far, the focal id
//!    moves to the edge and a new slice is requested
//! 3. Slices arriving for the current request are adopted and `refreshed`
//!    fires; the list then calls `fill_sections` to rebuild its rows
//!
//! Only the newest request can ever update the window.

use crate::config::{ConfigError, ProviderConfig};
use crate::layout::{MediaLayout, MediaLayoutFactory};
use crate::navigation::{NavigationMemento, ScrollTopState};
use media_viewer_cache::{
    apply_drag_selection, DragRange, LayoutCache, LayoutRemoved, LayoutSection, SectionPolicy,
    SelectionMap,
};
use media_viewer_core::{
    EventStream, FullId, IdSpace, ItemResolver, MediaKind, RowMetrics, Slice, SliceKey,
    StandardMetrics, Subscription, UniversalId, DEFAULT_AROUND_ID,
};
use media_viewer_scheduler::{
    choose_edge, preload_required, PreloadEdge, PreloadLimits, RequestId, SliceFeed, SliceSource,
    Viewport,
};
use std::cell::{Cell, RefCell};
use std::mem;
use std::rc::Rc;
use tracing::{debug, trace, warn};

/// Sliding window over one media kind of a (possibly merged) collection
///
/// # Example
///
/// ```
/// use media_viewer_core::{CollectionId, FullId, IdSpace, Item, MediaKind};
/// use media_viewer_provider::{MediaProvider, ProviderConfig};
/// use media_viewer_scheduler::MemorySliceSource;
/// use std::collections::HashMap;
///
/// let space = IdSpace::new(CollectionId(1), None);
/// let source = MemorySliceSource::new((1..=1000).collect());
/// let mut provider = MediaProvider::new(
///     space,
///     MediaKind::Photo,
///     source,
///     HashMap::<FullId, Item>::new(),
///     ProviderConfig::default(),
/// )
/// .unwrap();
///
/// provider.restart();
/// assert_eq!(provider.full_count(), Some(1000));
/// assert_eq!(provider.around_id(), 1000);
/// assert_eq!(provider.slice().len(), 17);
/// ```
pub struct MediaProvider<S, R> {
    space: IdSpace,
    kind: MediaKind,
    config: ProviderConfig,
    source: S,
    resolver: R,
    metrics: Box<dyn RowMetrics>,
    feed: SliceFeed,
    slice: Slice,
    layouts: LayoutCache<MediaLayout>,
    refreshed: EventStream<()>,
    around_id: UniversalId,
    ids_limit: usize,
    // Events that arrived while the provider was borrowed
    queued_removals: Rc<RefCell<Vec<FullId>>>,
    queued_invalidation: Rc<Cell<bool>>,
}

impl<S: SliceSource, R: ItemResolver> MediaProvider<S, R> {
    /// Controller with [`StandardMetrics`] and an empty window
    ///
    /// Nothing is requested until [`restart`](Self::restart) or
    /// [`restore_state`](Self::restore_state).
    ///
    /// # Errors
    /// Returns an error if `config` does not validate.
    pub fn new(
        space: IdSpace,
        kind: MediaKind,
        source: S,
        resolver: R,
        config: ProviderConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            space,
            kind,
            source,
            resolver,
            metrics: Box::new(StandardMetrics::default()),
            feed: SliceFeed::new(),
            slice: Slice::empty(),
            layouts: LayoutCache::new(),
            refreshed: EventStream::new(),
            around_id: DEFAULT_AROUND_ID,
            ids_limit: config.min_ids_limit,
            config,
            queued_removals: Rc::default(),
            queued_invalidation: Rc::default(),
        })
    }

    /// Replace the row metrics used to size the window
    pub fn with_metrics(mut self, metrics: impl RowMetrics + 'static) -> Self {
        self.metrics = Box::new(metrics);
        self
    }

    /// Fires after every adopted slice
    pub fn refreshed(&self) -> &EventStream<()> {
        &self.refreshed
    }

    /// Fires once per layout evicted from the cache
    pub fn layout_removed(&self) -> &EventStream<LayoutRemoved> {
        self.layouts.layout_removed()
    }

    /// Start over from the most recent entries
    ///
    /// Drops all layouts without removal events and requests a fresh window.
    pub fn restart(&mut self) {
        debug!(kind = ?self.kind, "restarting media window");
        self.layouts.clear();
        self.around_id = DEFAULT_AROUND_ID;
        self.ids_limit = self.config.min_ids_limit;
        self.slice = Slice::empty();
        self.refresh_viewer();
    }

    /// Re-center the window if the visible edge requires it
    ///
    /// `top` and `bottom` are the newest and oldest visible entries. The top
    /// edge is evaluated when `preload_top` is set and newer entries remain
    /// unloaded; otherwise the bottom edge under the same rule. Returns
    /// whether a new window was requested.
    pub fn check_preload(
        &mut self,
        viewport: Viewport,
        top: FullId,
        bottom: FullId,
        preload_top: bool,
        preload_bottom: bool,
    ) -> bool {
        let Some(edge) = choose_edge(&self.slice, preload_top, preload_bottom) else {
            return false;
        };
        let edge_item = match edge {
            PreloadEdge::Top => top,
            PreloadEdge::Bottom => bottom,
        };
        let Some(candidate) = self.space.to_universal(edge_item) else {
            warn!(item = ?edge_item, "visible edge belongs to another collection");
            return false;
        };

        let min_item_height = self
            .metrics
            .min_item_height(self.kind, viewport.width)
            .max(1);
        let limits =
            PreloadLimits::compute(&self.config.preload(), viewport.height, min_item_height);

        let focal = self.space.slice_key(self.around_id).universal_id;
        let target = self.space.slice_key(candidate).universal_id;
        if !preload_required(&limits, self.ids_limit, &self.slice, focal, target) {
            return false;
        }

        debug!(
            ?edge,
            from = self.around_id,
            to = candidate,
            ids_limit = self.ids_limit.max(limits.ids_limit),
            "preloading around visible edge"
        );
        self.ids_limit = self.ids_limit.max(limits.ids_limit);
        self.around_id = candidate;
        self.refresh_viewer();
        true
    }

    /// Request the window around the current focal id
    ///
    /// Supersedes any request still in flight, then applies whatever the
    /// source delivered synchronously.
    pub fn refresh_viewer(&mut self) {
        let key = self.space.slice_key(self.around_id);
        let request = self.feed.issue(key, self.ids_limit, self.ids_limit);
        self.source.request(request);
        self.poll();
    }

    /// Apply slices delivered for the current request
    ///
    /// Slices with an unknown total are dropped. Returns the number of
    /// slices adopted.
    pub fn poll(&mut self) -> usize {
        self.apply_queued_events();
        let Some(requested) = self.feed.current_key() else {
            return 0;
        };

        let mut adopted = 0;
        for slice in self.feed.drain() {
            if slice.full_count().is_none() {
                debug!(len = slice.len(), "dropping slice with unknown total");
                continue;
            }

            self.slice = slice;
            if let Some(nearest) = self.slice.nearest(requested.universal_id) {
                self.around_id = nearest;
            }
            trace!(
                around = self.around_id,
                len = self.slice.len(),
                full_count = ?self.slice.full_count(),
                "adopted slice"
            );
            adopted += 1;
            self.refreshed.fire(&());
        }
        adopted
    }

    /// Rebuild the rows for the current window
    ///
    /// Layouts are built for entries not cached yet and evicted for entries
    /// no longer in the window.
    pub fn fill_sections<P>(&mut self, policy: &P) -> Vec<LayoutSection<'_, MediaLayout>>
    where
        P: SectionPolicy<MediaLayout> + ?Sized,
    {
        self.apply_queued_events();
        let mut factory = MediaLayoutFactory::new(self.space, self.kind, &self.resolver);
        self.layouts.fill_sections(&self.slice, &mut factory, policy)
    }

    pub fn lookup_layout(&self, item: FullId) -> Option<&MediaLayout> {
        self.space
            .to_universal(item)
            .and_then(|universal_id| self.layouts.lookup(universal_id))
    }

    /// Forget the layout of a deleted item
    ///
    /// Items of other collections and items without a layout are ignored.
    pub fn item_removed(&mut self, item: FullId) -> bool {
        match self.space.to_universal(item) {
            Some(universal_id) => self.layouts.remove(universal_id),
            None => false,
        }
    }

    /// Drop theme-dependent caches of every layout (palette change)
    pub fn invalidate_layouts(&mut self) {
        self.layouts.invalidate_all();
    }

    /// Apply deletions and palette changes that arrived while busy
    fn apply_queued_events(&mut self) {
        let removals = mem::take(&mut *self.queued_removals.borrow_mut());
        if !removals.is_empty() {
            debug!(count = removals.len(), "applying queued deletions");
        }
        for item in removals {
            self.item_removed(item);
        }
        if self.queued_invalidation.replace(false) {
            self.invalidate_layouts();
        }
    }

    /// Resolve a drag from `from` to `till` into `selected`
    ///
    /// Returns the number of entries added. A drag ending outside this
    /// collection leaves `selected` untouched.
    pub fn apply_drag_selection(
        &self,
        selected: &mut SelectionMap,
        from: FullId,
        skip_from: bool,
        till: FullId,
        skip_till: bool,
    ) -> usize {
        let (Some(from_id), Some(till_id)) =
            (self.space.to_universal(from), self.space.to_universal(till))
        else {
            debug!(?from, ?till, "drag crosses collection boundary");
            return 0;
        };

        apply_drag_selection(
            &self.layouts,
            &self.space,
            selected,
            DragRange::new(from_id, skip_from, till_id, skip_till),
            self.config.max_selected_items,
        )
    }

    /// Record the window position into `memento`
    ///
    /// Nothing is written until the window has moved off the initial
    /// position and the list reports a scroll anchor.
    pub fn save_state(&self, memento: &mut NavigationMemento, scroll: ScrollTopState) {
        if self.around_id == DEFAULT_AROUND_ID || scroll.item.is_none() {
            return;
        }
        memento.around_id = Some(self.compute_full_id(self.around_id));
        memento.ids_limit = self.ids_limit;
        memento.scroll_top_item = scroll.item;
        memento.scroll_top_shift = scroll.shift;
    }

    /// Reopen the window saved in `memento`
    ///
    /// Mementos without a limit, without a valid entry id, or saved for
    /// another collection are ignored. Otherwise the scroll anchor goes to `restore_scroll` and the
    /// window is requested. Returns whether anything was restored.
    pub fn restore_state<F>(&mut self, memento: &NavigationMemento, restore_scroll: F) -> bool
    where
        F: FnOnce(ScrollTopState),
    {
        if memento.ids_limit == 0 {
            return false;
        }
        let around = memento
            .around_id
            .and_then(|id| self.space.to_universal(id))
            .filter(|&universal| universal != 0);
        let Some(around) = around else {
            debug!(around = ?memento.around_id, "ignoring memento without a usable entry");
            return false;
        };

        debug!(around, ids_limit = memento.ids_limit, "restoring media window");
        self.ids_limit = memento.ids_limit.max(self.config.min_ids_limit);
        self.around_id = around;
        restore_scroll(memento.scroll_top());
        self.refresh_viewer();
        true
    }

    pub fn is_my_item(&self, item: FullId) -> bool {
        self.space.is_my_item(item)
    }

    /// Whether `a` comes before `b` in the merged list
    pub fn is_after(&self, a: FullId, b: FullId) -> bool {
        self.space.is_after(a, b)
    }

    /// # Panics
    ///
    /// Panics if `universal_id` is zero.
    pub fn compute_full_id(&self, universal_id: UniversalId) -> FullId {
        self.space.to_full_id(universal_id)
    }

    pub fn slice_key(&self, universal_id: UniversalId) -> SliceKey {
        self.space.slice_key(universal_id)
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn space(&self) -> &IdSpace {
        &self.space
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn slice(&self) -> &Slice {
        &self.slice
    }

    pub fn full_count(&self) -> Option<usize> {
        self.slice.full_count()
    }

    pub fn around_id(&self) -> UniversalId {
        self.around_id
    }

    pub fn ids_limit(&self) -> usize {
        self.ids_limit
    }

    pub fn layouts(&self) -> &LayoutCache<MediaLayout> {
        &self.layouts
    }

    /// Request still waiting for answers, if any
    pub fn pending_request(&self) -> Option<RequestId> {
        self.feed.current()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }
}

/// Forward deletions from the backing store into `provider`
///
/// The subscription keeps only a weak reference; dropping either the
/// provider or the returned handle disconnects. Deletions arriving while the
/// provider is borrowed are queued and applied by the next `poll` or
/// `fill_sections`.
pub fn connect_item_removals<S, R>(
    provider: &Rc<RefCell<MediaProvider<S, R>>>,
    deletions: &EventStream<FullId>,
) -> Subscription
where
    S: SliceSource + 'static,
    R: ItemResolver + 'static,
{
    let weak = Rc::downgrade(provider);
    let queue = provider.borrow().queued_removals.clone();
    deletions.subscribe(move |item| {
        let Some(provider) = weak.upgrade() else {
            return;
        };
        match provider.try_borrow_mut() {
            Ok(mut provider) => {
                provider.item_removed(*item);
            }
            Err(_) => {
                debug!(?item, "provider busy, queueing deletion");
                queue.borrow_mut().push(*item);
            }
        };
    })
}

/// Invalidate layout caches of `provider` on every palette change
///
/// A change arriving while the provider is borrowed is applied by the next
/// `poll` or `fill_sections`.
pub fn connect_palette_changes<S, R>(
    provider: &Rc<RefCell<MediaProvider<S, R>>>,
    palette_changed: &EventStream<()>,
) -> Subscription
where
    S: SliceSource + 'static,
    R: ItemResolver + 'static,
{
    let weak = Rc::downgrade(provider);
    let queued = provider.borrow().queued_invalidation.clone();
    palette_changed.subscribe(move |_| {
        if let Some(provider) = weak.upgrade() {
            match provider.try_borrow_mut() {
                Ok(mut provider) => provider.invalidate_layouts(),
                Err(_) => {
                    debug!("provider busy, queueing palette change");
                    queued.set(true);
                }
            }
        }
    })
}
