use crate::config::FixtureConfig;
use crate::core::authorize::AuthorizeServiceImpl;
use crate::core::collection_service::CollectionServiceImpl;
use crate::core::community_service::CommunityServiceImpl;
use crate::core::eperson_service::EPersonServiceImpl;
use crate::core::group_service::GroupServiceImpl;
use crate::core::item_service::ItemServiceImpl;
use crate::core::workflow_service::WorkflowServiceImpl;
use crate::core::{
    AuthorizeService, CollectionService, CommunityService, Context, EPersonService,
    GroupService, ItemService, Store, WorkflowService,
};
use crate::domain::model::DSpaceObject;
use crate::utils::error::Result;
use std::sync::Arc;

/// Hands builders and teardown hooks the store and the domain services.
#[derive(Clone)]
pub struct ServiceLocator {
    store: Store,
    config: Arc<FixtureConfig>,
    authorize: Arc<dyn AuthorizeService>,
    groups: Arc<dyn GroupService>,
    epersons: Arc<dyn EPersonService>,
    communities: Arc<dyn CommunityService>,
    collections: Arc<dyn CollectionService>,
    workflow: Arc<dyn WorkflowService>,
    items: Arc<dyn ItemService>,
}

impl ServiceLocator {
    /// Wires the default service implementations over a fresh in-memory store.
    pub fn in_memory(config: FixtureConfig) -> Self {
        let authorize: Arc<dyn AuthorizeService> = Arc::new(AuthorizeServiceImpl::new());
        let groups: Arc<dyn GroupService> = Arc::new(GroupServiceImpl::new(authorize.clone()));
        let collections: Arc<dyn CollectionService> = Arc::new(CollectionServiceImpl::new(
            authorize.clone(),
            groups.clone(),
        ));
        let communities: Arc<dyn CommunityService> = Arc::new(CommunityServiceImpl::new(
            authorize.clone(),
            groups.clone(),
            collections.clone(),
        ));
        let workflow: Arc<dyn WorkflowService> = Arc::new(WorkflowServiceImpl::new(
            authorize.clone(),
            groups.clone(),
            config.workflow.roles.clone(),
        ));

        Self {
            store: Store::new(),
            config: Arc::new(config),
            epersons: Arc::new(EPersonServiceImpl::new(authorize.clone())),
            items: Arc::new(ItemServiceImpl::new(authorize.clone())),
            authorize,
            groups,
            communities,
            collections,
            workflow,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn config(&self) -> &FixtureConfig {
        &self.config
    }

    pub fn new_context(&self) -> Context {
        Context::new(self.store.clone())
    }

    /// A fresh session for teardown: configured dispatcher, authorization off.
    pub fn cleanup_context(&self) -> Result<Context> {
        let mut ctx = self.new_context();
        ctx.set_dispatcher(self.config.cleanup_dispatcher())?;
        ctx.turn_off_authorisation_system();
        Ok(ctx)
    }

    pub fn authorize_service(&self) -> Arc<dyn AuthorizeService> {
        self.authorize.clone()
    }

    pub fn group_service(&self) -> Arc<dyn GroupService> {
        self.groups.clone()
    }

    pub fn eperson_service(&self) -> Arc<dyn EPersonService> {
        self.epersons.clone()
    }

    pub fn community_service(&self) -> Arc<dyn CommunityService> {
        self.communities.clone()
    }

    pub fn collection_service(&self) -> Arc<dyn CollectionService> {
        self.collections.clone()
    }

    pub fn workflow_service(&self) -> Arc<dyn WorkflowService> {
        self.workflow.clone()
    }

    pub fn item_service(&self) -> Arc<dyn ItemService> {
        self.items.clone()
    }

    /// Deletes any object through the service that owns its type.
    pub async fn delete_object(&self, ctx: &Context, object: &DSpaceObject) -> Result<()> {
        match object {
            DSpaceObject::Group(group) => self.groups.delete(ctx, group).await,
            DSpaceObject::EPerson(eperson) => self.epersons.delete(ctx, eperson).await,
            DSpaceObject::Item(item) => self.items.delete(ctx, item).await,
            DSpaceObject::Collection(collection) => self.collections.delete(ctx, collection).await,
            DSpaceObject::Community(community) => self.communities.delete(ctx, community).await,
        }
    }
}

impl Default for ServiceLocator {
    fn default() -> Self {
        Self::in_memory(FixtureConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Dispatcher;
    use crate::domain::model::EPerson;

    #[test]
    fn test_cleanup_context_uses_configured_dispatcher() {
        let services = ServiceLocator::default();
        let ctx = services.cleanup_context().unwrap();
        assert_eq!(ctx.dispatcher(), Dispatcher::NoIndex);
        assert!(ctx.ignore_authorization());

        let mut config = FixtureConfig::default();
        config.cleanup.dispatcher = "bogus".to_string();
        assert!(ServiceLocator::in_memory(config).cleanup_context().is_err());
    }

    #[tokio::test]
    async fn test_delete_object_dispatches_by_type() {
        let services = ServiceLocator::default();
        let ctx = services.new_context();
        ctx.turn_off_authorisation_system();

        let person: EPerson = services.eperson_service().create(&ctx).await.unwrap();
        let group = services.group_service().create(&ctx).await.unwrap();

        services.delete_object(&ctx, &person.clone().into()).await.unwrap();
        services.delete_object(&ctx, &group.clone().into()).await.unwrap();

        assert!(!services.store().contains(person.id).await);
        assert!(!services.store().contains(group.id).await);
    }
}
