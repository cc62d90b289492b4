use crate::core::context::Context;
use crate::domain::model::{EPerson, Event, EventKind, Group, ObjectType};
use crate::domain::ports::{AuthorizeService, EPersonService};
use crate::utils::error::{RepoError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

pub struct EPersonServiceImpl {
    authorize: Arc<dyn AuthorizeService>,
}

impl EPersonServiceImpl {
    pub fn new(authorize: Arc<dyn AuthorizeService>) -> Self {
        Self { authorize }
    }
}

#[async_trait]
impl EPersonService for EPersonServiceImpl {
    async fn create(&self, ctx: &Context) -> Result<EPerson> {
        self.authorize
            .authorize_admin(ctx, "Only administrators can create e-people")
            .await?;

        let eperson = EPerson::new();
        ctx.store().put(eperson.clone()).await;
        ctx.add_event(Event::new(EventKind::Create, ObjectType::EPerson, eperson.id));
        Ok(eperson)
    }

    async fn update(&self, ctx: &Context, eperson: &EPerson) -> Result<()> {
        self.authorize
            .authorize_admin(ctx, &format!("WRITE eperson {}", eperson.id))
            .await?;

        let mut state = ctx.store().write().await;
        if state.get::<EPerson>(eperson.id).is_none() {
            return Err(RepoError::not_found(ObjectType::EPerson, eperson.id));
        }
        if let Some(email) = eperson.email.as_deref() {
            let taken = state.all::<EPerson>().into_iter().any(|other| {
                other.id != eperson.id
                    && other
                        .email
                        .as_deref()
                        .is_some_and(|e| e.eq_ignore_ascii_case(email))
            });
            if taken {
                return Err(RepoError::Conflict {
                    message: format!("Email address already in use: {}", email),
                });
            }
        }

        state.put(eperson.clone());
        ctx.add_event(Event::new(EventKind::Modify, ObjectType::EPerson, eperson.id));
        Ok(())
    }

    async fn find(&self, ctx: &Context, id: Uuid) -> Result<Option<EPerson>> {
        Ok(ctx.store().get(id).await)
    }

    async fn find_by_email(&self, ctx: &Context, email: &str) -> Result<Option<EPerson>> {
        Ok(ctx
            .store()
            .all::<EPerson>()
            .await
            .into_iter()
            .find(|p| {
                p.email
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(email))
            }))
    }

    async fn delete(&self, ctx: &Context, eperson: &EPerson) -> Result<()> {
        self.authorize
            .authorize_admin(ctx, &format!("DELETE eperson {}", eperson.id))
            .await?;

        let mut state = ctx.store().write().await;
        if state.remove(eperson.id).is_none() {
            return Err(RepoError::not_found(ObjectType::EPerson, eperson.id));
        }
        for mut group in state.all::<Group>() {
            if group.members.remove(&eperson.id) {
                state.put(group);
            }
        }
        ctx.add_event(Event::new(EventKind::Delete, ObjectType::EPerson, eperson.id));
        Ok(())
    }
}
