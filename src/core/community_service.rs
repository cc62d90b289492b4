use crate::core::context::Context;
use crate::core::group_service::{create_role_group, delete_role_group};
use crate::domain::model::{Collection, Community, Event, EventKind, Group, ObjectType};
use crate::domain::ports::{AuthorizeService, CollectionService, CommunityService, GroupService};
use crate::utils::error::{RepoError, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

pub struct CommunityServiceImpl {
    authorize: Arc<dyn AuthorizeService>,
    groups: Arc<dyn GroupService>,
    collections: Arc<dyn CollectionService>,
}

impl CommunityServiceImpl {
    pub fn new(
        authorize: Arc<dyn AuthorizeService>,
        groups: Arc<dyn GroupService>,
        collections: Arc<dyn CollectionService>,
    ) -> Self {
        Self {
            authorize,
            groups,
            collections,
        }
    }

    async fn load(&self, ctx: &Context, id: Uuid) -> Result<Community> {
        ctx.store()
            .get(id)
            .await
            .ok_or_else(|| RepoError::not_found(ObjectType::Community, id))
    }

    /// Top-level communities are managed by site administrators, sub-communities by the parent's admins.
    async fn authorize_manage(&self, ctx: &Context, community: &Community, action: &str) -> Result<()> {
        match community.parent {
            Some(parent_id) => {
                let parent = self.load(ctx, parent_id).await?;
                self.authorize
                    .authorize_community_admin(ctx, &parent, action)
                    .await
            }
            None => self.authorize.authorize_admin(ctx, action).await,
        }
    }

    /// The community and every community below it, parents first.
    async fn subtree(&self, ctx: &Context, root: Uuid) -> Vec<Uuid> {
        let all: Vec<Community> = ctx.store().all().await;
        let mut ordered = vec![root];
        let mut seen = HashSet::from([root]);
        let mut cursor = 0;
        while cursor < ordered.len() {
            let current = ordered[cursor];
            for child in all.iter().filter(|c| c.parent == Some(current)) {
                if seen.insert(child.id) {
                    ordered.push(child.id);
                }
            }
            cursor += 1;
        }
        ordered
    }
}

#[async_trait]
impl CommunityService for CommunityServiceImpl {
    async fn create(&self, ctx: &Context, parent: Option<&Community>) -> Result<Community> {
        let community = match parent {
            Some(parent) => {
                let parent = self.load(ctx, parent.id).await?;
                self.authorize
                    .authorize_community_admin(ctx, &parent, "ADD sub-community")
                    .await?;
                Community::new(Some(parent.id))
            }
            None => {
                self.authorize
                    .authorize_admin(ctx, "Only administrators can create top-level communities")
                    .await?;
                Community::new(None)
            }
        };

        ctx.store().put(community.clone()).await;
        ctx.add_event(Event::new(
            EventKind::Create,
            ObjectType::Community,
            community.id,
        ));
        tracing::debug!(community = %community.id, parent = ?community.parent, "created community");
        Ok(community)
    }

    async fn update(&self, ctx: &Context, community: &Community) -> Result<()> {
        let current = self.load(ctx, community.id).await?;
        self.authorize
            .authorize_community_admin(ctx, &current, "WRITE")
            .await?;
        // the admin binding is owned by create_administrators and group deletion
        let updated = Community {
            admins: current.admins,
            ..community.clone()
        };
        ctx.store().put(updated).await;
        ctx.add_event(Event::new(
            EventKind::Modify,
            ObjectType::Community,
            community.id,
        ));
        Ok(())
    }

    async fn find(&self, ctx: &Context, id: Uuid) -> Result<Option<Community>> {
        Ok(ctx.store().get(id).await)
    }

    async fn create_administrators(&self, ctx: &Context, community: &Community) -> Result<Group> {
        let mut current = self.load(ctx, community.id).await?;
        self.authorize_manage(ctx, &current, "manage community admin group")
            .await?;

        if let Some(id) = current.admins {
            if let Some(existing) = self.groups.find(ctx, id).await? {
                return Ok(existing);
            }
        }

        let name = format!("COMMUNITY_{}_ADMIN", current.id);
        let group = create_role_group(ctx, self.groups.as_ref(), &name).await?;
        current.admins = Some(group.id);
        ctx.store().put(current.clone()).await;
        ctx.add_event(Event::new(
            EventKind::Modify,
            ObjectType::Community,
            current.id,
        ));
        Ok(group)
    }

    async fn delete(&self, ctx: &Context, community: &Community) -> Result<()> {
        let current = self.load(ctx, community.id).await?;
        self.authorize_manage(ctx, &current, "REMOVE community").await?;

        let subtree = self.subtree(ctx, current.id).await;
        let _guard = ctx.elevate();

        let collections: Vec<Collection> = ctx.store().all().await;
        for collection in collections
            .iter()
            .filter(|c| subtree.contains(&c.community))
        {
            self.collections.delete(ctx, collection).await?;
        }

        for id in subtree.iter().rev() {
            if let Some(admins) = ctx.store().get::<Community>(*id).await.and_then(|c| c.admins) {
                delete_role_group(ctx, self.groups.as_ref(), admins).await?;
            }
            ctx.store().write().await.remove(*id);
            ctx.add_event(Event::new(EventKind::Delete, ObjectType::Community, *id));
        }
        tracing::debug!(community = %current.id, removed = subtree.len(), "deleted community tree");
        Ok(())
    }
}
