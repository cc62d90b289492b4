use crate::core::context::Context;
use crate::core::group_service::{create_role_group, delete_role_group};
use crate::domain::model::{
    Collection, Community, DefaultReadAction, Event, EventKind, Group, Item, ObjectType,
};
use crate::domain::ports::{AuthorizeService, CollectionService, GroupService};
use crate::utils::error::{RepoError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

pub struct CollectionServiceImpl {
    authorize: Arc<dyn AuthorizeService>,
    groups: Arc<dyn GroupService>,
}

impl CollectionServiceImpl {
    pub fn new(authorize: Arc<dyn AuthorizeService>, groups: Arc<dyn GroupService>) -> Self {
        Self { authorize, groups }
    }

    async fn load(&self, ctx: &Context, collection: &Collection) -> Result<Collection> {
        ctx.store()
            .get(collection.id)
            .await
            .ok_or_else(|| RepoError::not_found(ObjectType::Collection, collection.id))
    }

    async fn owning_community(&self, ctx: &Context, collection: &Collection) -> Result<Community> {
        ctx.store()
            .get(collection.community)
            .await
            .ok_or_else(|| RepoError::not_found(ObjectType::Community, collection.community))
    }

    /// Returns the group already bound to a role slot, if it still exists.
    async fn bound_group(&self, ctx: &Context, slot: Option<Uuid>) -> Result<Option<Group>> {
        match slot {
            Some(id) => self.groups.find(ctx, id).await,
            None => Ok(None),
        }
    }

    async fn save_binding(&self, ctx: &Context, collection: Collection) {
        ctx.add_event(Event::new(
            EventKind::Modify,
            ObjectType::Collection,
            collection.id,
        ));
        ctx.store().put(collection).await;
    }
}

#[async_trait]
impl CollectionService for CollectionServiceImpl {
    async fn create(&self, ctx: &Context, community: &Community) -> Result<Collection> {
        let community: Community = ctx
            .store()
            .get(community.id)
            .await
            .ok_or_else(|| RepoError::not_found(ObjectType::Community, community.id))?;
        self.authorize
            .authorize_community_admin(ctx, &community, "ADD collection")
            .await?;

        let collection = Collection::new(community.id);
        ctx.store().put(collection.clone()).await;
        ctx.add_event(Event::new(
            EventKind::Create,
            ObjectType::Collection,
            collection.id,
        ));
        tracing::debug!(collection = %collection.id, community = %community.id, "created collection");
        Ok(collection)
    }

    async fn update(&self, ctx: &Context, collection: &Collection) -> Result<()> {
        let current = self.load(ctx, collection).await?;
        self.authorize
            .authorize_collection_admin(ctx, &current, "WRITE")
            .await?;
        // role bindings are owned by the role creators and group deletion
        let updated = Collection {
            name: collection.name.clone(),
            community: collection.community,
            ..current
        };
        self.save_binding(ctx, updated).await;
        Ok(())
    }

    async fn find(&self, ctx: &Context, id: Uuid) -> Result<Option<Collection>> {
        Ok(ctx.store().get(id).await)
    }

    async fn create_administrators(&self, ctx: &Context, collection: &Collection) -> Result<Group> {
        let mut current = self.load(ctx, collection).await?;
        let community = self.owning_community(ctx, &current).await?;
        self.authorize
            .authorize_community_admin(ctx, &community, "manage collection admin group")
            .await?;

        if let Some(existing) = self.bound_group(ctx, current.admins).await? {
            return Ok(existing);
        }

        let name = format!("COLLECTION_{}_ADMIN", current.id);
        let group = create_role_group(ctx, self.groups.as_ref(), &name).await?;
        current.admins = Some(group.id);
        self.save_binding(ctx, current).await;
        Ok(group)
    }

    async fn create_submitters(&self, ctx: &Context, collection: &Collection) -> Result<Group> {
        let mut current = self.load(ctx, collection).await?;
        self.authorize
            .authorize_collection_admin(ctx, &current, "manage submitters group")
            .await?;

        if let Some(existing) = self.bound_group(ctx, current.submitters).await? {
            return Ok(existing);
        }

        let name = format!("COLLECTION_{}_SUBMIT", current.id);
        let group = create_role_group(ctx, self.groups.as_ref(), &name).await?;
        current.submitters = Some(group.id);
        self.save_binding(ctx, current).await;
        Ok(group)
    }

    async fn create_default_read_group(
        &self,
        ctx: &Context,
        collection: &Collection,
        type_of_group: &str,
        default_read: i32,
    ) -> Result<Group> {
        let action = DefaultReadAction::from_code(default_read).ok_or_else(|| {
            RepoError::misuse(format!("Unsupported default read action: {}", default_read))
        })?;
        if type_of_group.trim().is_empty() {
            return Err(RepoError::misuse("Default read group type cannot be empty"));
        }

        let mut current = self.load(ctx, collection).await?;
        self.authorize
            .authorize_collection_admin(ctx, &current, "manage default read group")
            .await?;

        let slot = current.default_read.get(&action.code()).copied();
        if let Some(existing) = self.bound_group(ctx, slot).await? {
            return Ok(existing);
        }

        let name = format!("COLLECTION_{}_{}_DEFAULT_READ", current.id, type_of_group);
        let group = create_role_group(ctx, self.groups.as_ref(), &name).await?;
        current.default_read.insert(action.code(), group.id);
        self.save_binding(ctx, current).await;
        Ok(group)
    }

    async fn delete(&self, ctx: &Context, collection: &Collection) -> Result<()> {
        let current = self.load(ctx, collection).await?;
        let community = self.owning_community(ctx, &current).await?;
        self.authorize
            .authorize_community_admin(ctx, &community, "REMOVE collection")
            .await?;

        for group_id in current.role_groups() {
            delete_role_group(ctx, self.groups.as_ref(), group_id).await?;
        }

        let mut state = ctx.store().write().await;
        let owned: Vec<Item> = state
            .all::<Item>()
            .into_iter()
            .filter(|i| i.owning_collection == Some(current.id))
            .collect();
        for item in owned {
            state.remove(item.id);
            ctx.add_event(Event::new(EventKind::Delete, ObjectType::Item, item.id));
        }
        state.remove(current.id);
        ctx.add_event(Event::new(
            EventKind::Delete,
            ObjectType::Collection,
            current.id,
        ));
        tracing::debug!(collection = %current.id, "deleted collection");
        Ok(())
    }
}
