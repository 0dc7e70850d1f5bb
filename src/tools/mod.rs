//! Tool-facing operations built on the metadata cache.
//!
//! - `cache_management`: statistics, listing and manual refresh tools.
//! - `resolver`: project/bucket id resolution used by the document tools.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod cache_management;
pub mod resolver;

pub use cache_management::{
    BucketView, CacheStatisticsReport, CacheTools, CachedResources, ProjectView, RefreshReport,
    StatisticsView,
};
pub use resolver::{ResolvedScope, ResourceResolver};
