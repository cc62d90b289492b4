pub mod builder;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use builder::{
    CollectionBuilder, CommunityBuilder, EPersonBuilder, FixtureHarness, GroupBuilder,
    ItemBuilder, ServiceLocator,
};
pub use config::FixtureConfig;
pub use crate::core::{Context, Dispatcher, Store};
pub use domain::model::{Collection, Community, DSpaceObject, EPerson, Group, Item, ObjectType};
pub use utils::error::{RepoError, Result};
