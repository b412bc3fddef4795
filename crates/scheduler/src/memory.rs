//! In-memory slice source
//!
//! Serves windows out of a sorted list of universal ids. Useful for local
//! collections that are fully known up front, and for driving a window
//! controller without a network layer.

use crate::feed::{SliceRequest, SliceSource};
use media_viewer_core::{Slice, SliceKey, UniversalId};
use tracing::warn;

/// How the source answers requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnswerMode {
    /// Answer synchronously, once
    #[default]
    Immediate,
    /// Answer synchronously twice: first without counts, then complete
    Progressive,
    /// Queue requests until [`MemorySliceSource::answer_pending`] is called
    Deferred,
}

/// Record of a request the source received
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceivedRequest {
    pub id: u64,
    pub key: SliceKey,
    pub limit_before: usize,
    pub limit_after: usize,
}

/// Slice source over an in-memory id list
///
/// # Example
///
/// ```
/// use media_viewer_core::{CollectionId, IdSpace};
/// use media_viewer_scheduler::{MemorySliceSource, SliceFeed, SliceSource};
///
/// let space = IdSpace::new(CollectionId(1), None);
/// let mut source = MemorySliceSource::new((1..=100).collect());
/// let mut feed = SliceFeed::new();
///
/// source.request(feed.issue(space.slice_key(50), 10, 10));
///
/// let slice = feed.drain().pop().unwrap();
/// assert_eq!(slice.len(), 21);
/// assert_eq!(slice.full_count(), Some(100));
/// ```
#[derive(Debug, Default)]
pub struct MemorySliceSource {
    ids: Vec<UniversalId>,
    mode: AnswerMode,
    received: Vec<ReceivedRequest>,
    pending: Vec<SliceRequest>,
}

impl MemorySliceSource {
    /// Source answering immediately; `ids` are sorted and deduplicated
    pub fn new(mut ids: Vec<UniversalId>) -> Self {
        ids.sort_unstable();
        ids.dedup();
        Self {
            ids,
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: AnswerMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn ids(&self) -> &[UniversalId] {
        &self.ids
    }

    /// Drop an id, as if the entry was deleted upstream
    pub fn remove(&mut self, id: UniversalId) -> bool {
        match self.ids.binary_search(&id) {
            Ok(index) => {
                self.ids.remove(index);
                true
            }
            Err(_) => false,
        }
    }

    /// Every request received so far, oldest first
    pub fn received(&self) -> &[ReceivedRequest] {
        &self.received
    }

    pub fn last_received(&self) -> Option<&ReceivedRequest> {
        self.received.last()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Answer every queued request in arrival order
    ///
    /// Superseded requests are answered too; their slices are dropped by the
    /// sink. Returns how many answers were accepted.
    pub fn answer_pending(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending);
        pending
            .iter()
            .filter(|request| self.answer(request))
            .count()
    }

    /// Answer queued requests newest first
    pub fn answer_pending_reversed(&mut self) -> usize {
        let mut pending = std::mem::take(&mut self.pending);
        pending.reverse();
        pending
            .iter()
            .filter(|request| self.answer(request))
            .count()
    }

    /// Window of `ids` around `around` honoring both limits
    pub fn window(&self, around: UniversalId, limit_before: usize, limit_after: usize) -> Slice {
        slice_around(&self.ids, around, limit_before, limit_after)
    }

    fn answer(&self, request: &SliceRequest) -> bool {
        let slice = self.window(
            request.key.universal_id,
            request.limit_before,
            request.limit_after,
        );
        request.push(slice)
    }

    fn answer_progressively(&self, request: &SliceRequest) {
        let complete = self.window(
            request.key.universal_id,
            request.limit_before,
            request.limit_after,
        );
        match Slice::new(complete.ids().to_vec(), None, None, None) {
            Ok(partial) => {
                request.push(partial);
            }
            Err(err) => warn!(%err, "could not build partial slice"),
        }
        request.push(complete);
    }
}

impl SliceSource for MemorySliceSource {
    fn request(&mut self, request: SliceRequest) {
        self.received.push(ReceivedRequest {
            id: request.id,
            key: request.key,
            limit_before: request.limit_before,
            limit_after: request.limit_after,
        });

        match self.mode {
            AnswerMode::Immediate => {
                self.answer(&request);
            }
            AnswerMode::Progressive => self.answer_progressively(&request),
            AnswerMode::Deferred => self.pending.push(request),
        }
    }
}

/// Cut a window out of sorted, deduplicated `ids`
///
/// The window is anchored at the first id `>= around` (or the newest id when
/// `around` is past the end) and extends `limit_before` entries towards older
/// ids and `limit_after` entries towards newer ids.
pub fn slice_around(
    ids: &[UniversalId],
    around: UniversalId,
    limit_before: usize,
    limit_after: usize,
) -> Slice {
    if ids.is_empty() {
        return Slice::new(Vec::new(), Some(0), Some(0), Some(0)).unwrap_or_default();
    }

    let anchor = ids.partition_point(|&id| id < around).min(ids.len() - 1);
    let start = anchor.saturating_sub(limit_before);
    let end = anchor.saturating_add(limit_after).saturating_add(1).min(ids.len());

    Slice::new(
        ids[start..end].to_vec(),
        Some(start),
        Some(ids.len() - end),
        Some(ids.len()),
    )
    .unwrap_or_else(|err| {
        warn!(%err, "memory source produced an invalid slice");
        Slice::empty()
    })
}
