use crate::core::context::Context;
use crate::domain::model::{Collection, Community, EPerson, Group, Item};
use crate::utils::error::Result;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait AuthorizeService: Send + Sync {
    async fn is_admin(&self, ctx: &Context) -> bool;
    async fn authorize_admin(&self, ctx: &Context, action: &str) -> Result<()>;
    async fn authorize_community_admin(
        &self,
        ctx: &Context,
        community: &Community,
        action: &str,
    ) -> Result<()>;
    async fn authorize_collection_admin(
        &self,
        ctx: &Context,
        collection: &Collection,
        action: &str,
    ) -> Result<()>;
}

#[async_trait]
pub trait GroupService: Send + Sync {
    async fn create(&self, ctx: &Context) -> Result<Group>;
    fn set_name(&self, group: &mut Group, name: &str) -> Result<()>;
    async fn add_member(&self, ctx: &Context, group: &mut Group, eperson: &EPerson) -> Result<()>;
    async fn add_member_group(&self, ctx: &Context, parent: &mut Group, child: &Group)
        -> Result<()>;
    async fn update(&self, ctx: &Context, group: &Group) -> Result<()>;
    async fn find(&self, ctx: &Context, id: Uuid) -> Result<Option<Group>>;
    async fn find_by_name(&self, ctx: &Context, name: &str) -> Result<Option<Group>>;
    async fn delete(&self, ctx: &Context, group: &Group) -> Result<()>;
    async fn is_member(&self, ctx: &Context, group: &Group, eperson: &EPerson) -> Result<bool>;
    async fn all_members(&self, ctx: &Context, group: &Group) -> Result<Vec<EPerson>>;
}

#[async_trait]
pub trait EPersonService: Send + Sync {
    async fn create(&self, ctx: &Context) -> Result<EPerson>;
    async fn update(&self, ctx: &Context, eperson: &EPerson) -> Result<()>;
    async fn find(&self, ctx: &Context, id: Uuid) -> Result<Option<EPerson>>;
    async fn find_by_email(&self, ctx: &Context, email: &str) -> Result<Option<EPerson>>;
    async fn delete(&self, ctx: &Context, eperson: &EPerson) -> Result<()>;
}

#[async_trait]
pub trait CommunityService: Send + Sync {
    async fn create(&self, ctx: &Context, parent: Option<&Community>) -> Result<Community>;
    async fn update(&self, ctx: &Context, community: &Community) -> Result<()>;
    async fn find(&self, ctx: &Context, id: Uuid) -> Result<Option<Community>>;
    /// Returns the community's administrator group, creating and binding it when absent.
    async fn create_administrators(&self, ctx: &Context, community: &Community) -> Result<Group>;
    async fn delete(&self, ctx: &Context, community: &Community) -> Result<()>;
}

#[async_trait]
pub trait CollectionService: Send + Sync {
    async fn create(&self, ctx: &Context, community: &Community) -> Result<Collection>;
    async fn update(&self, ctx: &Context, collection: &Collection) -> Result<()>;
    async fn find(&self, ctx: &Context, id: Uuid) -> Result<Option<Collection>>;
    async fn create_administrators(&self, ctx: &Context, collection: &Collection) -> Result<Group>;
    async fn create_submitters(&self, ctx: &Context, collection: &Collection) -> Result<Group>;
    async fn create_default_read_group(
        &self,
        ctx: &Context,
        collection: &Collection,
        type_of_group: &str,
        default_read: i32,
    ) -> Result<Group>;
    async fn delete(&self, ctx: &Context, collection: &Collection) -> Result<()>;
}

#[async_trait]
pub trait WorkflowService: Send + Sync {
    async fn create_workflow_role_group(
        &self,
        ctx: &Context,
        collection: &Collection,
        role_name: &str,
    ) -> Result<Group>;
}

#[async_trait]
pub trait ItemService: Send + Sync {
    async fn create(&self, ctx: &Context, collection: &Collection) -> Result<Item>;
    async fn update(&self, ctx: &Context, item: &Item) -> Result<()>;
    async fn find(&self, ctx: &Context, id: Uuid) -> Result<Option<Item>>;
    async fn delete(&self, ctx: &Context, item: &Item) -> Result<()>;
}
