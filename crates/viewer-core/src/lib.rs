//! Media Viewer Core Library
//!
//! Shared vocabulary of the media overview: the merged universal id space,
//! slices served by data sources, items and media kinds, row metrics and the
//! single-threaded event streams the other crates publish through.

pub mod events;
pub mod ids;
pub mod item;
pub mod metrics;
pub mod slice;

pub use events::{EventStream, Subscription};
pub use ids::{
    CollectionId, FullId, IdSpace, LocalId, SliceKey, UniversalId, DEFAULT_AROUND_ID,
    SERVER_MAX_LOCAL_ID,
};
pub use item::{DocumentId, Item, ItemResolver, Media, MediaKind, PhotoId, WebPageId};
pub use metrics::{RowMetrics, StandardMetrics};
pub use slice::{Slice, SliceError};
