// Service exports
pub mod appwrite;
pub mod cache;
pub mod directory;
pub mod engine;
pub mod notifier;
pub mod postgres;
pub mod store;

pub use appwrite::{AppwriteClient, AppwriteCollections, AppwriteError};
pub use cache::{CacheError, CacheKey, CacheManager};
pub use directory::{CachedDirectory, DirectoryError, MemoryProfileDirectory, ProfileDirectory};
pub use engine::{ConnectionEngine, EngineOptions, SwipeResult};
pub use notifier::{ChannelNotifier, ConnectionSignal, Notifier, NotifyError, SignalPriority, TracingNotifier};
pub use postgres::{PostgresConnectionStore, PostgresError};
pub use store::{ConnectionStore, MemoryConnectionStore, StoreError};
