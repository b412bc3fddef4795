//! Slice requests and the feed that keeps only the newest one alive
//!
//! A window controller talks to its data source through a [`SliceFeed`].
//! Each issued request gets its own channel and cancellation token. Issuing
//! the next request cancels the token and drops the receiving end, so a
//! source that answers late can no longer reach the controller, whatever
//! order the answers arrive in.

use crate::cancel::CancellationToken;
use media_viewer_core::{Slice, SliceKey};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use tracing::{debug, trace};

/// Monotonic request identifier, unique per feed
pub type RequestId = u64;

#[derive(Debug)]
struct Delivery {
    request_id: RequestId,
    slice: Slice,
}

/// Sending half handed to the data source
///
/// A source may push any number of slices for one request (progressive
/// refinements). Pushing after the request was superseded is a no-op.
#[derive(Debug, Clone)]
pub struct SliceSink {
    request_id: RequestId,
    sender: Sender<Delivery>,
    token: CancellationToken,
}

impl SliceSink {
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Deliver a slice for this request
    ///
    /// Returns `false` if the request has been superseded or the feed is gone;
    /// the slice is dropped in that case.
    pub fn push(&self, slice: Slice) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        self.sender
            .send(Delivery {
                request_id: self.request_id,
                slice,
            })
            .is_ok()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Window the controller wants: centered on `key`, with up to
/// `limit_before` older and `limit_after` newer entries around it
#[derive(Debug, Clone)]
pub struct SliceRequest {
    pub id: RequestId,
    pub key: SliceKey,
    pub limit_before: usize,
    pub limit_after: usize,
    sink: SliceSink,
}

impl SliceRequest {
    /// A sink the source can keep after the request value is gone
    pub fn sink(&self) -> SliceSink {
        self.sink.clone()
    }

    pub fn push(&self, slice: Slice) -> bool {
        self.sink.push(slice)
    }

    pub fn is_cancelled(&self) -> bool {
        self.sink.is_cancelled()
    }
}

/// External ordered data source
///
/// Implementations answer now or later, once or several times, through the
/// request's sink. They must tolerate being handed a new request while an
/// older one is still open; the older one can simply be forgotten.
pub trait SliceSource {
    fn request(&mut self, request: SliceRequest);
}

impl<S: SliceSource + ?Sized> SliceSource for Box<S> {
    fn request(&mut self, request: SliceRequest) {
        (**self).request(request)
    }
}

#[derive(Debug)]
struct ActiveRequest {
    id: RequestId,
    key: SliceKey,
    token: CancellationToken,
    receiver: Receiver<Delivery>,
}

/// At most one outstanding slice request
///
/// # Example
///
/// ```
/// use media_viewer_core::{CollectionId, IdSpace, Slice};
/// use media_viewer_scheduler::SliceFeed;
///
/// let space = IdSpace::new(CollectionId(1), None);
/// let mut feed = SliceFeed::new();
///
/// let stale = feed.issue(space.slice_key(100), 20, 20);
/// let fresh = feed.issue(space.slice_key(500), 20, 20);
///
/// // The first request was superseded; its answer goes nowhere.
/// assert!(!stale.push(Slice::empty()));
/// assert!(fresh.push(Slice::empty()));
/// assert_eq!(feed.drain().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct SliceFeed {
    next_id: RequestId,
    active: Option<ActiveRequest>,
    superseded: u64,
}

impl SliceFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new request, superseding the current one
    pub fn issue(
        &mut self,
        key: SliceKey,
        limit_before: usize,
        limit_after: usize,
    ) -> SliceRequest {
        if self.cancel() {
            self.superseded += 1;
        }

        self.next_id += 1;
        let id = self.next_id;
        let (sender, receiver) = mpsc::channel();
        let token = CancellationToken::new();

        debug!(
            request_id = id,
            around = key.universal_id,
            limit_before,
            limit_after,
            "issuing slice request"
        );

        self.active = Some(ActiveRequest {
            id,
            key,
            token: token.clone(),
            receiver,
        });

        SliceRequest {
            id,
            key,
            limit_before,
            limit_after,
            sink: SliceSink {
                request_id: id,
                sender,
                token,
            },
        }
    }

    /// Abandon the current request, if any
    ///
    /// Returns `true` if there was one.
    pub fn cancel(&mut self) -> bool {
        match self.active.take() {
            Some(active) => {
                debug!(request_id = active.id, "abandoning slice request");
                active.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Take every slice delivered so far for the current request, oldest first
    pub fn drain(&mut self) -> Vec<Slice> {
        let Some(active) = &self.active else {
            return Vec::new();
        };

        let mut slices = Vec::new();
        loop {
            match active.receiver.try_recv() {
                Ok(delivery) if delivery.request_id == active.id => slices.push(delivery.slice),
                Ok(delivery) => {
                    trace!(request_id = delivery.request_id, "dropping foreign delivery");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        slices
    }

    pub fn current(&self) -> Option<RequestId> {
        self.active.as_ref().map(|active| active.id)
    }

    pub fn current_key(&self) -> Option<SliceKey> {
        self.active.as_ref().map(|active| active.key)
    }

    /// Number of requests that were replaced by a newer one
    pub fn superseded_count(&self) -> u64 {
        self.superseded
    }
}
