//! Version sources.
//!
//! Feeds list the published future toolchain versions, newest first.

pub mod feed;
pub mod remote;

pub use feed::{FeedError, VersionFeed};
pub use remote::HttpVersionFeed;
