// Library target holds the feed pipeline; main.rs is a thin CLI over it and
// the criterion benches import the composer from here.

pub mod backend;
pub mod catalog;
pub mod challenge;
pub mod config;
pub mod error;
pub mod event;
pub mod feed;
pub mod personalize;
pub mod session;
pub mod store;
