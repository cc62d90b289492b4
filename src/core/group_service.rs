use crate::core::context::Context;
use crate::domain::model::{
    Collection, Community, EPerson, Event, EventKind, Group, ObjectType,
};
use crate::domain::ports::{AuthorizeService, GroupService};
use crate::utils::error::{RepoError, Result};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

pub struct GroupServiceImpl {
    authorize: Arc<dyn AuthorizeService>,
}

impl GroupServiceImpl {
    pub fn new(authorize: Arc<dyn AuthorizeService>) -> Self {
        Self { authorize }
    }
}

/// Creates, names and persists a container role group with authorization lifted for the duration.
pub(crate) async fn create_role_group(
    ctx: &Context,
    groups: &dyn GroupService,
    name: &str,
) -> Result<Group> {
    let _guard = ctx.elevate();
    let mut group = groups.create(ctx).await?;
    groups.set_name(&mut group, name)?;
    groups.update(ctx, &group).await?;
    tracing::debug!(group = %group.id, name, "created role group");
    Ok(group)
}

/// Deletes a role group that may already be gone; used by container cascades.
pub(crate) async fn delete_role_group(
    ctx: &Context,
    groups: &dyn GroupService,
    group_id: Uuid,
) -> Result<()> {
    let _guard = ctx.elevate();
    if let Some(group) = groups.find(ctx, group_id).await? {
        groups.delete(ctx, &group).await?;
    }
    Ok(())
}

#[async_trait]
impl GroupService for GroupServiceImpl {
    async fn create(&self, ctx: &Context) -> Result<Group> {
        self.authorize
            .authorize_admin(ctx, "Only administrators can create groups")
            .await?;

        let group = Group::new();
        ctx.store().put(group.clone()).await;
        ctx.add_event(Event::new(EventKind::Create, ObjectType::Group, group.id));
        tracing::debug!(group = %group.id, "created group");
        Ok(group)
    }

    fn set_name(&self, group: &mut Group, name: &str) -> Result<()> {
        if group.permanent {
            return Err(RepoError::misuse(
                "The name of a permanent group cannot be changed",
            ));
        }
        if name.trim().is_empty() {
            return Err(RepoError::misuse("Group name cannot be empty"));
        }
        group.name = Some(name.to_string());
        Ok(())
    }

    async fn add_member(&self, ctx: &Context, group: &mut Group, eperson: &EPerson) -> Result<()> {
        self.authorize
            .authorize_admin(ctx, &format!("ADD member to group {}", group.id))
            .await?;

        if !group.members.insert(eperson.id) {
            return Ok(());
        }

        let mut state = ctx.store().write().await;
        if let Some(mut stored) = state.get::<Group>(group.id) {
            stored.members.insert(eperson.id);
            state.put(stored);
        }
        ctx.add_event(Event::new(EventKind::Modify, ObjectType::Group, group.id));
        Ok(())
    }

    async fn add_member_group(
        &self,
        ctx: &Context,
        parent: &mut Group,
        child: &Group,
    ) -> Result<()> {
        self.authorize
            .authorize_admin(ctx, &format!("ADD member to group {}", parent.id))
            .await?;

        if parent.id == child.id {
            return Err(RepoError::misuse("A group cannot be a member of itself"));
        }
        if parent.member_groups.contains(&child.id) {
            return Ok(());
        }

        let mut state = ctx.store().write().await;
        if state.group_closure(child.id).contains(&parent.id) {
            return Err(RepoError::misuse(format!(
                "Adding group {} to {} would create a membership cycle",
                child.id, parent.id
            )));
        }

        parent.member_groups.insert(child.id);
        if let Some(mut stored) = state.get::<Group>(parent.id) {
            stored.member_groups.insert(child.id);
            state.put(stored);
        }
        ctx.add_event(Event::new(EventKind::Modify, ObjectType::Group, parent.id));
        Ok(())
    }

    async fn update(&self, ctx: &Context, group: &Group) -> Result<()> {
        self.authorize
            .authorize_admin(ctx, &format!("WRITE group {}", group.id))
            .await?;

        let mut state = ctx.store().write().await;
        let Some(mut stored) = state.get::<Group>(group.id) else {
            return Err(RepoError::not_found(ObjectType::Group, group.id));
        };
        if let Some(name) = group.name() {
            if let Some(existing) = state.group_by_name(name) {
                if existing.id != group.id {
                    return Err(RepoError::Conflict {
                        message: format!("Group name already in use: {}", name),
                    });
                }
            }
        }

        // Memberships written through by other holders of this group stay put;
        // ids deleted since the caller's copy was taken are not brought back.
        stored.name = group.name.clone();
        stored.members.extend(
            group
                .members
                .iter()
                .copied()
                .filter(|id| state.get::<EPerson>(*id).is_some()),
        );
        stored.member_groups.extend(
            group
                .member_groups
                .iter()
                .copied()
                .filter(|id| *id != group.id && state.get::<Group>(*id).is_some()),
        );

        state.put(stored);
        ctx.add_event(Event::new(EventKind::Modify, ObjectType::Group, group.id));
        Ok(())
    }

    async fn find(&self, ctx: &Context, id: Uuid) -> Result<Option<Group>> {
        Ok(ctx.store().get(id).await)
    }

    async fn find_by_name(&self, ctx: &Context, name: &str) -> Result<Option<Group>> {
        Ok(ctx.store().group_by_name(name).await)
    }

    async fn delete(&self, ctx: &Context, group: &Group) -> Result<()> {
        self.authorize
            .authorize_admin(ctx, &format!("DELETE group {}", group.id))
            .await?;

        if group.permanent {
            return Err(RepoError::misuse("A permanent group cannot be deleted"));
        }

        let mut state = ctx.store().write().await;
        if state.remove(group.id).is_none() {
            return Err(RepoError::not_found(ObjectType::Group, group.id));
        }

        for mut parent in state.all::<Group>() {
            if parent.member_groups.remove(&group.id) {
                state.put(parent);
            }
        }
        for mut collection in state.all::<Collection>() {
            if collection.unbind_group(group.id) {
                state.put(collection);
            }
        }
        for mut community in state.all::<Community>() {
            if community.admins == Some(group.id) {
                community.admins = None;
                state.put(community);
            }
        }

        ctx.add_event(Event::new(EventKind::Delete, ObjectType::Group, group.id));
        tracing::debug!(group = %group.id, name = ?group.name, "deleted group");
        Ok(())
    }

    async fn is_member(&self, ctx: &Context, group: &Group, eperson: &EPerson) -> Result<bool> {
        Ok(ctx
            .store()
            .group_contains_eperson(group.id, eperson.id)
            .await)
    }

    async fn all_members(&self, ctx: &Context, group: &Group) -> Result<Vec<EPerson>> {
        let state = ctx.store().read().await;
        let member_ids: BTreeSet<Uuid> = state
            .group_closure(group.id)
            .into_iter()
            .filter_map(|id| state.get::<Group>(id))
            .flat_map(|g| g.members.into_iter())
            .collect();

        Ok(member_ids
            .into_iter()
            .filter_map(|id| state.get::<EPerson>(id))
            .collect())
    }
}
