// Core algorithm exports
pub mod compatibility;
pub mod engagement;
pub mod filters;
pub mod health;
pub mod ranker;
pub mod reporting;
pub mod swipe;

pub use compatibility::{compatibility, connection_success_prediction};
pub use engagement::{apply_event, apply_refund, EngagementEvent};
pub use filters::{is_eligible, matches_filters, orientation_compatible};
pub use ranker::{BrowseStack, DiscoveryRanker};
pub use reporting::{relationship_strength, CreatorStats};
pub use swipe::{MemberSwipeInput, SwipeOutcome};
