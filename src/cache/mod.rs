// GroundX metadata cache
// Author: kelexine (https://github.com/kelexine)

pub mod models;
pub mod refresh;
pub mod repository;
pub mod scheduler;
pub mod stats;

pub use models::{Bucket, CacheSnapshot, CacheState, Project, RefreshOutcome};
pub use refresh::{MetadataProvider, RefreshCoordinator, RefreshResult};
pub use repository::ResourceRepository;
pub use scheduler::{RefreshScheduler, SchedulerHandle};
pub use stats::{CacheStatistics, StatisticsTracker};
