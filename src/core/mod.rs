pub mod authorize;
pub mod collection_service;
pub mod community_service;
pub mod context;
pub mod eperson_service;
pub mod group_service;
pub mod item_service;
pub mod store;
pub mod workflow_service;

pub use crate::domain::model::{Collection, Community, DSpaceObject, EPerson, Group, Item};
pub use crate::domain::ports::{
    AuthorizeService, CollectionService, CommunityService, EPersonService, GroupService,
    ItemService, WorkflowService,
};
pub use crate::utils::error::Result;
pub use context::{Context, Dispatcher};
pub use store::Store;
