use crate::core::context::Context;
use crate::domain::model::{Collection, Event, EventKind, Item, ObjectType};
use crate::domain::ports::{AuthorizeService, ItemService};
use crate::utils::error::{RepoError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

pub struct ItemServiceImpl {
    authorize: Arc<dyn AuthorizeService>,
}

impl ItemServiceImpl {
    pub fn new(authorize: Arc<dyn AuthorizeService>) -> Self {
        Self { authorize }
    }

    async fn owning_collection(&self, ctx: &Context, item: &Item) -> Result<Option<Collection>> {
        match item.owning_collection {
            Some(id) => Ok(ctx.store().get(id).await),
            None => Ok(None),
        }
    }

    async fn authorize_write(&self, ctx: &Context, item: &Item, action: &str) -> Result<()> {
        match self.owning_collection(ctx, item).await? {
            Some(collection) => {
                self.authorize
                    .authorize_collection_admin(ctx, &collection, action)
                    .await
            }
            None => self.authorize.authorize_admin(ctx, action).await,
        }
    }
}

#[async_trait]
impl ItemService for ItemServiceImpl {
    async fn create(&self, ctx: &Context, collection: &Collection) -> Result<Item> {
        let collection: Collection = ctx
            .store()
            .get(collection.id)
            .await
            .ok_or_else(|| RepoError::not_found(ObjectType::Collection, collection.id))?;
        self.authorize
            .authorize_collection_admin(ctx, &collection, "ADD item")
            .await?;

        let item = Item::new(Some(collection.id));
        ctx.store().put(item.clone()).await;
        ctx.add_event(Event::new(EventKind::Create, ObjectType::Item, item.id));
        Ok(item)
    }

    async fn update(&self, ctx: &Context, item: &Item) -> Result<()> {
        if !ctx.store().contains(item.id).await {
            return Err(RepoError::not_found(ObjectType::Item, item.id));
        }
        self.authorize_write(ctx, item, "WRITE item").await?;
        ctx.store().put(item.clone()).await;
        ctx.add_event(Event::new(EventKind::Modify, ObjectType::Item, item.id));
        Ok(())
    }

    async fn find(&self, ctx: &Context, id: Uuid) -> Result<Option<Item>> {
        Ok(ctx.store().get(id).await)
    }

    async fn delete(&self, ctx: &Context, item: &Item) -> Result<()> {
        self.authorize_write(ctx, item, "REMOVE item").await?;
        if ctx.store().write().await.remove(item.id).is_none() {
            return Err(RepoError::not_found(ObjectType::Item, item.id));
        }
        ctx.add_event(Event::new(EventKind::Delete, ObjectType::Item, item.id));
        Ok(())
    }
}
