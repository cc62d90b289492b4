use crate::builder::harness::{priority, FixtureHarness, ObjectCleanup};
use crate::core::Context;
use crate::domain::model::Community;
use crate::utils::error::Result;

pub struct CommunityBuilder<'a> {
    harness: &'a FixtureHarness,
    context: &'a Context,
    community: Option<Community>,
}

impl<'a> CommunityBuilder<'a> {
    pub async fn create_community(harness: &'a FixtureHarness, context: &'a Context) -> Self {
        let result = harness
            .services()
            .community_service()
            .create(context, None)
            .await;
        Self::new(harness, context).created(result)
    }

    pub async fn create_sub_community(
        harness: &'a FixtureHarness,
        context: &'a Context,
        parent: &Community,
    ) -> Self {
        let result = harness
            .services()
            .community_service()
            .create(context, Some(parent))
            .await;
        Self::new(harness, context).created(result)
    }

    fn new(harness: &'a FixtureHarness, context: &'a Context) -> Self {
        Self {
            harness,
            context,
            community: None,
        }
    }

    fn created(mut self, result: Result<Community>) -> Self {
        if let Some(community) = self.harness.errors().capture(result) {
            self.harness.cleanups().register(ObjectCleanup::new(
                self.harness.services().clone(),
                &community.clone().into(),
                priority::COMMUNITY,
            ));
            self.community = Some(community);
        }
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        if let Some(community) = self.community.as_mut() {
            community.name = Some(name.to_string());
        }
        self
    }

    pub async fn build(self) -> Option<Community> {
        let community = self.community?;
        let result = self
            .harness
            .services()
            .community_service()
            .update(self.context, &community)
            .await;
        self.harness.errors().capture(result).map(|_| community)
    }
}
