use crate::builder::harness::{priority, FixtureHarness, ObjectCleanup};
use crate::core::Context;
use crate::domain::model::{Collection, Community};
use crate::utils::error::Result;

pub struct CollectionBuilder<'a> {
    harness: &'a FixtureHarness,
    context: &'a Context,
    collection: Option<Collection>,
}

impl<'a> CollectionBuilder<'a> {
    pub async fn create_collection(
        harness: &'a FixtureHarness,
        context: &'a Context,
        community: &Community,
    ) -> Self {
        let result = harness
            .services()
            .collection_service()
            .create(context, community)
            .await;
        Self {
            harness,
            context,
            collection: None,
        }
        .created(result)
    }

    fn created(mut self, result: Result<Collection>) -> Self {
        if let Some(collection) = self.harness.errors().capture(result) {
            self.harness.cleanups().register(ObjectCleanup::new(
                self.harness.services().clone(),
                &collection.clone().into(),
                priority::COLLECTION,
            ));
            self.collection = Some(collection);
        }
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        if let Some(collection) = self.collection.as_mut() {
            collection.name = Some(name.to_string());
        }
        self
    }

    pub async fn build(self) -> Option<Collection> {
        let collection = self.collection?;
        let result = self
            .harness
            .services()
            .collection_service()
            .update(self.context, &collection)
            .await;
        self.harness.errors().capture(result).map(|_| collection)
    }
}
