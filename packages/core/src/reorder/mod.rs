//! Client-side protocols over the navigation API
//!
//! - [`ReorderController`] - drag-and-drop reorder with optimistic update
//!   and re-fetch reconciliation
//! - [`NavigationFeed`] - end-user list load, aborted when dropped
//! - [`NavigationApi`] - the server surface both of them use

mod api;
mod controller;
mod error;
mod feed;

pub use api::{NavigationApi, ServiceApi};
pub use controller::{
    DropEffect, ReconcilePhase, ReorderController, ReorderOutcome, ReorderState,
};
pub use error::ReorderError;
pub use feed::{FeedState, NavigationFeed};
