use crate::core::context::Context;
use crate::core::group_service::create_role_group;
use crate::domain::model::{Collection, Event, EventKind, Group, ObjectType};
use crate::domain::ports::{AuthorizeService, GroupService, WorkflowService};
use crate::utils::error::{RepoError, Result};
use async_trait::async_trait;
use std::sync::Arc;

pub struct WorkflowServiceImpl {
    authorize: Arc<dyn AuthorizeService>,
    groups: Arc<dyn GroupService>,
    roles: Vec<String>,
}

impl WorkflowServiceImpl {
    pub fn new(
        authorize: Arc<dyn AuthorizeService>,
        groups: Arc<dyn GroupService>,
        roles: Vec<String>,
    ) -> Self {
        Self {
            authorize,
            groups,
            roles,
        }
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }
}

#[async_trait]
impl WorkflowService for WorkflowServiceImpl {
    async fn create_workflow_role_group(
        &self,
        ctx: &Context,
        collection: &Collection,
        role_name: &str,
    ) -> Result<Group> {
        if !self.roles.iter().any(|r| r == role_name) {
            return Err(RepoError::misuse(format!(
                "Unknown workflow role '{}'. Configured roles: {}",
                role_name,
                self.roles.join(", ")
            )));
        }

        let mut current: Collection = ctx
            .store()
            .get(collection.id)
            .await
            .ok_or_else(|| RepoError::not_found(ObjectType::Collection, collection.id))?;
        self.authorize
            .authorize_collection_admin(ctx, &current, "manage workflow groups")
            .await?;

        if let Some(id) = current.workflow_roles.get(role_name).copied() {
            if let Some(existing) = self.groups.find(ctx, id).await? {
                return Ok(existing);
            }
        }

        let name = format!("COLLECTION_{}_WORKFLOW_ROLE_{}", current.id, role_name);
        let group = create_role_group(ctx, self.groups.as_ref(), &name).await?;
        current
            .workflow_roles
            .insert(role_name.to_string(), group.id);
        ctx.store().put(current.clone()).await;
        ctx.add_event(Event::new(
            EventKind::Modify,
            ObjectType::Collection,
            current.id,
        ));
        Ok(group)
    }
}
