//! Media Viewer Provider Library
//!
//! Window controller for shared-media lists: preload decisions, slice
//! adoption, layout building, drag selection and saved navigation state.

pub mod config;
pub mod layout;
pub mod navigation;
pub mod provider;

pub use config::{ConfigError, ProviderConfig, MAX_PRELOADED_SCREENS};
pub use layout::{
    DocumentLayout, LayoutState, LinkLayout, MediaLayout, MediaLayoutFactory, PhotoLayout,
};
pub use navigation::{NavigationMemento, ScrollTopState};
pub use provider::{connect_item_removals, connect_palette_changes, MediaProvider};
