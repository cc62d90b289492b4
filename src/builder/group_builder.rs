use crate::builder::harness::{priority, Cleanup, FixtureHarness};
use crate::builder::services::ServiceLocator;
use crate::core::{Context, GroupService};
use crate::domain::model::{Collection, Community, DSpaceObject, EPerson, Group};
use crate::utils::error::{RepoError, Result};
use anyhow::Context as _;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Fluent construction of a [`Group`] for tests.
///
/// Every step that touches a service records its failure in the harness
/// [`ErrorSink`](crate::builder::harness::ErrorSink) and hands the builder back,
/// so a chain never aborts halfway. Once a group exists a [`GroupCleanup`] is
/// registered that deletes it during teardown.
///
/// The session passed in is borrowed: the builder never completes or aborts it.
pub struct GroupBuilder<'a> {
    harness: &'a FixtureHarness,
    context: &'a Context,
    group: Option<Group>,
}

impl<'a> GroupBuilder<'a> {
    fn new(harness: &'a FixtureHarness, context: &'a Context) -> Self {
        Self {
            harness,
            context,
            group: None,
        }
    }

    pub async fn create_group(harness: &'a FixtureHarness, context: &'a Context) -> Self {
        let builder = Self::new(harness, context);
        let result = builder.service().create(context).await;
        builder.created(result)
    }

    pub async fn create_collection_admin_group(
        harness: &'a FixtureHarness,
        context: &'a Context,
        collection: &Collection,
    ) -> Self {
        let builder = Self::new(harness, context);
        let result = harness
            .services()
            .collection_service()
            .create_administrators(context, collection)
            .await;
        builder.created(result)
    }

    pub async fn create_collection_submitter_group(
        harness: &'a FixtureHarness,
        context: &'a Context,
        collection: &Collection,
    ) -> Self {
        let builder = Self::new(harness, context);
        let result = harness
            .services()
            .collection_service()
            .create_submitters(context, collection)
            .await;
        builder.created(result)
    }

    pub async fn create_collection_default_read_group(
        harness: &'a FixtureHarness,
        context: &'a Context,
        collection: &Collection,
        type_of_group: &str,
        default_read: i32,
    ) -> Self {
        let builder = Self::new(harness, context);
        let result = harness
            .services()
            .collection_service()
            .create_default_read_group(context, collection, type_of_group, default_read)
            .await;
        builder.created(result)
    }

    pub async fn create_collection_workflow_role_group(
        harness: &'a FixtureHarness,
        context: &'a Context,
        collection: &Collection,
        role_name: &str,
    ) -> Self {
        let builder = Self::new(harness, context);
        let result = harness
            .services()
            .workflow_service()
            .create_workflow_role_group(context, collection, role_name)
            .await;
        builder.created(result)
    }

    pub async fn create_community_admin_group(
        harness: &'a FixtureHarness,
        context: &'a Context,
        community: &Community,
    ) -> Self {
        let builder = Self::new(harness, context);
        let result = harness
            .services()
            .community_service()
            .create_administrators(context, community)
            .await;
        builder.created(result)
    }

    /// Administrator group of whatever container is given; anything but a
    /// collection or community is recorded as misuse.
    pub async fn create_admin_group(
        harness: &'a FixtureHarness,
        context: &'a Context,
        container: &DSpaceObject,
    ) -> Self {
        match container {
            DSpaceObject::Collection(collection) => {
                Self::create_collection_admin_group(harness, context, collection).await
            }
            DSpaceObject::Community(community) => {
                Self::create_community_admin_group(harness, context, community).await
            }
            other => {
                let builder = Self::new(harness, context);
                builder.handle_exception(RepoError::misuse(format!(
                    "DSpaceObject must be collection or community. Type: {}",
                    other.object_type()
                )));
                builder
            }
        }
    }

    fn created(mut self, result: Result<Group>) -> Self {
        if let Some(group) = self.harness.errors().capture(result) {
            self.harness.cleanups().register(GroupCleanup::new(
                self.harness.services().clone(),
                group.clone(),
            ));
            self.group = Some(group);
        }
        self
    }

    fn handle_exception(&self, err: RepoError) {
        self.harness.errors().handle_exception(err);
    }

    /// The service generic teardown uses to look up and delete groups.
    pub fn service(&self) -> Arc<dyn GroupService> {
        self.harness.services().group_service()
    }

    pub fn group(&self) -> Option<&Group> {
        self.group.as_ref()
    }

    pub fn with_name(mut self, name: &str) -> Self {
        let service = self.service();
        if let Some(group) = self.group.as_mut() {
            if let Err(err) = service.set_name(group, name) {
                self.handle_exception(err);
            }
        } else {
            tracing::debug!(name, "with_name skipped, no group under construction");
        }
        self
    }

    /// Makes the group a direct member of `parent`.
    pub async fn with_parent(self, parent: &mut Group) -> Self {
        let service = self.service();
        if let Some(group) = self.group.as_ref() {
            if let Err(err) = service.add_member_group(self.context, parent, group).await {
                self.handle_exception(err);
            }
        } else {
            tracing::debug!(parent = %parent.id, "with_parent skipped, no group under construction");
        }
        self
    }

    pub async fn add_member(mut self, eperson: &EPerson) -> Self {
        let service = self.service();
        if let Some(group) = self.group.as_mut() {
            if let Err(err) = service.add_member(self.context, group, eperson).await {
                self.handle_exception(err);
            }
        } else {
            tracing::debug!(eperson = %eperson.id, "add_member skipped, no group under construction");
        }
        self
    }

    /// Persists the group and returns it as stored, including memberships
    /// other builders attached meanwhile. `None` when creation or the update failed.
    pub async fn build(self) -> Option<Group> {
        let service = self.service();
        let group = self.group?;
        let result = service.update(self.context, &group).await;
        self.harness.errors().capture(result)?;
        Some(self.context.reload_entity(&group).await.unwrap_or(group))
    }

    /// Runs this builder's teardown immediately.
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        match &self.group {
            Some(group) => {
                GroupCleanup::new(self.harness.services().clone(), group.clone())
                    .cleanup()
                    .await
            }
            None => Ok(()),
        }
    }

    /// Deletes a group by id in its own authorization-free session.
    ///
    /// # Panics
    ///
    /// Panics if the delete is refused for authorization reasons, which cannot
    /// happen while authorization is off.
    pub async fn delete_group(services: &ServiceLocator, id: Uuid) -> Result<()> {
        let ctx = services.new_context();
        ctx.turn_off_authorisation_system();
        let groups = services.group_service();

        if let Some(group) = groups.find(&ctx, id).await? {
            match groups.delete(&ctx, &group).await {
                Ok(()) => {}
                Err(err) if err.is_authorization() => {
                    panic!("authorization denied with authorization disabled: {}", err)
                }
                Err(err) => return Err(err),
            }
        }
        ctx.complete().await
    }
}

/// Teardown for a built group. Reloads in a fresh session so state left
/// behind by the test's own session does not matter, and treats a group that
/// is already gone as done.
pub struct GroupCleanup {
    services: ServiceLocator,
    group: Group,
}

impl GroupCleanup {
    pub fn new(services: ServiceLocator, group: Group) -> Self {
        Self { services, group }
    }
}

#[async_trait]
impl Cleanup for GroupCleanup {
    fn priority(&self) -> i32 {
        priority::GROUP
    }

    fn describe(&self) -> String {
        format!("GROUP {}", self.group.id)
    }

    async fn cleanup(&self) -> anyhow::Result<()> {
        let ctx = self.services.cleanup_context()?;
        let Some(group) = ctx.reload_entity(&self.group).await else {
            tracing::debug!(group = %self.group.id, "group already removed");
            return Ok(());
        };

        self.services
            .group_service()
            .delete(&ctx, &group)
            .await
            .with_context(|| format!("deleting group {}", group.id))?;
        ctx.complete().await?;
        Ok(())
    }
}
