//! Media Viewer Scheduler Library
//!
//! Decides when the loaded window has to move and carries the resulting
//! slice requests to the data source.
//!
//! Only the newest request of a [`SliceFeed`] can deliver: issuing a new one
//! cancels the previous request's token and closes its channel, so late
//! answers never reach the controller.
//!
//! # Example
//!
//! ```
//! use media_viewer_core::{CollectionId, IdSpace};
//! use media_viewer_scheduler::{
//!     choose_edge, preload_required, MemorySliceSource, PreloadConfig, PreloadLimits,
//!     SliceFeed, SliceSource,
//! };
//!
//! let space = IdSpace::new(CollectionId(1), None);
//! let mut source = MemorySliceSource::new((1..=1000).collect());
//! let mut feed = SliceFeed::new();
//!
//! source.request(feed.issue(space.slice_key(500), 67, 67));
//! let slice = feed.drain().pop().unwrap();
//!
//! let limits = PreloadLimits::compute(&PreloadConfig::default(), 600, 50);
//! assert!(choose_edge(&slice, false, true).is_some());
//! assert!(!preload_required(&limits, 67, &slice, 500, 480));
//! assert!(preload_required(&limits, 67, &slice, 500, 450));
//! ```

mod cancel;
mod feed;
mod memory;
mod preload;

// Re-export public API
pub use cancel::CancellationToken;
pub use feed::{RequestId, SliceFeed, SliceRequest, SliceSink, SliceSource};
pub use memory::{slice_around, AnswerMode, MemorySliceSource, ReceivedRequest};
pub use preload::{
    choose_edge, preload_required, PreloadConfig, PreloadEdge, PreloadLimits, Viewport,
};
