use crate::core::context::Context;
use crate::domain::model::{Collection, Community};
use crate::domain::ports::AuthorizeService;
use crate::utils::error::{RepoError, Result};
use async_trait::async_trait;

/// Site administrators may do anything; container administrators may manage
/// their own container's role groups.
#[derive(Debug, Default, Clone)]
pub struct AuthorizeServiceImpl;

impl AuthorizeServiceImpl {
    pub fn new() -> Self {
        Self
    }

    async fn is_member_of(&self, ctx: &Context, group: Option<uuid::Uuid>) -> bool {
        match (group, ctx.current_user()) {
            (Some(group_id), Some(user)) => {
                ctx.store().group_contains_eperson(group_id, user.id).await
            }
            _ => false,
        }
    }
}

#[async_trait]
impl AuthorizeService for AuthorizeServiceImpl {
    async fn is_admin(&self, ctx: &Context) -> bool {
        if ctx.ignore_authorization() {
            return true;
        }
        match ctx.current_user() {
            Some(user) => ctx.store().is_site_admin(user.id).await,
            None => false,
        }
    }

    async fn authorize_admin(&self, ctx: &Context, action: &str) -> Result<()> {
        if self.is_admin(ctx).await {
            return Ok(());
        }
        tracing::debug!(action, user = ?ctx.current_user().map(|u| u.id), "admin authorization denied");
        Err(RepoError::authorization(action))
    }

    async fn authorize_community_admin(
        &self,
        ctx: &Context,
        community: &Community,
        action: &str,
    ) -> Result<()> {
        if self.is_admin(ctx).await || self.is_member_of(ctx, community.admins).await {
            return Ok(());
        }
        Err(RepoError::authorization(format!(
            "{} on community {}",
            action, community.id
        )))
    }

    async fn authorize_collection_admin(
        &self,
        ctx: &Context,
        collection: &Collection,
        action: &str,
    ) -> Result<()> {
        if self.is_admin(ctx).await || self.is_member_of(ctx, collection.admins).await {
            return Ok(());
        }
        if let Some(community) = ctx.store().get::<Community>(collection.community).await {
            if self.is_member_of(ctx, community.admins).await {
                return Ok(());
            }
        }
        Err(RepoError::authorization(format!(
            "{} on collection {}",
            action, collection.id
        )))
    }
}
