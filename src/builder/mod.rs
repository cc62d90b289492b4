// Test fixture builders and the harness they report to.

pub mod collection_builder;
pub mod community_builder;
pub mod eperson_builder;
pub mod group_builder;
pub mod harness;
pub mod item_builder;
pub mod services;

pub use collection_builder::CollectionBuilder;
pub use community_builder::CommunityBuilder;
pub use eperson_builder::EPersonBuilder;
pub use group_builder::{GroupBuilder, GroupCleanup};
pub use harness::{Cleanup, CleanupRegistry, ErrorSink, FixtureHarness, ObjectCleanup};
pub use item_builder::ItemBuilder;
pub use services::ServiceLocator;
