use crate::builder::harness::{priority, FixtureHarness, ObjectCleanup};
use crate::core::Context;
use crate::domain::model::{Collection, Item};

/// Minimal item fixture; groups only need items as a non-container object.
pub struct ItemBuilder<'a> {
    harness: &'a FixtureHarness,
    context: &'a Context,
    item: Option<Item>,
}

impl<'a> ItemBuilder<'a> {
    pub async fn create_item(
        harness: &'a FixtureHarness,
        context: &'a Context,
        collection: &Collection,
    ) -> Self {
        let result = harness
            .services()
            .item_service()
            .create(context, collection)
            .await;
        let item = harness.errors().capture(result);
        if let Some(item) = &item {
            harness.cleanups().register(ObjectCleanup::new(
                harness.services().clone(),
                &item.clone().into(),
                priority::ITEM,
            ));
        }
        Self {
            harness,
            context,
            item,
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        if let Some(item) = self.item.as_mut() {
            item.name = Some(title.to_string());
        }
        self
    }

    pub async fn build(self) -> Option<Item> {
        let item = self.item?;
        let result = self
            .harness
            .services()
            .item_service()
            .update(self.context, &item)
            .await;
        self.harness.errors().capture(result).map(|_| item)
    }
}
