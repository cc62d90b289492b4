use crate::core::store::Store;
use crate::domain::model::{EPerson, Entity, Event};
use crate::utils::error::{RepoError, Result};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

/// Where a session's queued events go when it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatcher {
    /// Events are recorded in the store's index log.
    Default,
    /// Events are dropped.
    NoIndex,
}

impl Dispatcher {
    pub const DEFAULT: &'static str = "default";
    pub const NO_INDEX: &'static str = "noindex";

    pub fn name(self) -> &'static str {
        match self {
            Self::Default => Self::DEFAULT,
            Self::NoIndex => Self::NO_INDEX,
        }
    }
}

impl FromStr for Dispatcher {
    type Err = RepoError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            Self::DEFAULT => Ok(Self::Default),
            Self::NO_INDEX => Ok(Self::NoIndex),
            other => Err(RepoError::Config {
                field: "dispatcher".to_string(),
                message: format!("Unknown dispatcher '{}'", other),
            }),
        }
    }
}

/// A scoped session onto the store.
///
/// Store writes are applied as they are issued. The session owns the queued
/// change events, the authorization switch and the acting user. `complete`
/// hands the events to the dispatcher; dropping an incomplete session
/// discards them.
#[derive(Debug)]
pub struct Context {
    id: Uuid,
    store: Store,
    dispatcher: Dispatcher,
    ignore_auth_depth: AtomicUsize,
    current_user: Option<EPerson>,
    events: Mutex<Vec<Event>>,
    open: bool,
}

impl Context {
    pub fn new(store: Store) -> Self {
        let id = Uuid::new_v4();
        tracing::trace!(context = %id, "opening context");
        Self {
            id,
            store,
            dispatcher: Dispatcher::Default,
            ignore_auth_depth: AtomicUsize::new(0),
            current_user: None,
            events: Mutex::new(Vec::new()),
            open: true,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn set_dispatcher(&mut self, name: &str) -> Result<()> {
        self.dispatcher = name.parse()?;
        Ok(())
    }

    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher
    }

    pub fn set_current_user(&mut self, user: Option<EPerson>) {
        self.current_user = user;
    }

    pub fn current_user(&self) -> Option<&EPerson> {
        self.current_user.as_ref()
    }

    /// Disables authorization checks until a matching `restore_auth_system_state`. Calls nest.
    pub fn turn_off_authorisation_system(&self) {
        self.ignore_auth_depth.fetch_add(1, Ordering::SeqCst);
    }

    pub fn restore_auth_system_state(&self) {
        let previous = self
            .ignore_auth_depth
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |depth| {
                depth.checked_sub(1)
            });
        if previous.is_err() {
            tracing::warn!(context = %self.id, "restore_auth_system_state called without a matching turn-off");
        }
    }

    pub fn ignore_authorization(&self) -> bool {
        self.ignore_auth_depth.load(Ordering::SeqCst) > 0
    }

    /// Turns authorization off for the lifetime of the returned guard.
    pub fn elevate(&self) -> AuthorisationGuard<'_> {
        self.turn_off_authorisation_system();
        AuthorisationGuard { context: self }
    }

    /// Reads the current stored state of `entity`, or `None` once it has been deleted.
    pub async fn reload_entity<T: Entity>(&self, entity: &T) -> Option<T> {
        self.store.get(entity.id()).await
    }

    pub fn add_event(&self, event: Event) {
        self.lock_events().push(event);
    }

    pub fn pending_events(&self) -> usize {
        self.lock_events().len()
    }

    /// Dispatches queued events and closes the session.
    pub async fn complete(mut self) -> Result<()> {
        let events = std::mem::take(&mut *self.lock_events());
        match self.dispatcher {
            Dispatcher::Default => {
                tracing::debug!(context = %self.id, events = events.len(), "dispatching events");
                self.store.record_indexed(events).await;
            }
            Dispatcher::NoIndex => {
                tracing::debug!(context = %self.id, events = events.len(), "noindex dispatcher, dropping events");
            }
        }
        self.open = false;
        Ok(())
    }

    /// Closes the session without dispatching its events.
    pub fn abort(mut self) {
        self.discard();
    }

    fn discard(&mut self) {
        if !self.open {
            return;
        }
        let dropped = std::mem::take(&mut *self.lock_events()).len();
        if dropped > 0 {
            tracing::debug!(context = %self.id, events = dropped, "aborting context, discarding events");
        }
        self.open = false;
    }

    fn lock_events(&self) -> std::sync::MutexGuard<'_, Vec<Event>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        self.discard();
    }
}

pub struct AuthorisationGuard<'a> {
    context: &'a Context,
}

impl Drop for AuthorisationGuard<'_> {
    fn drop(&mut self) {
        self.context.restore_auth_system_state();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{EventKind, Group, ObjectType};

    fn event() -> Event {
        Event::new(EventKind::Create, ObjectType::Group, Uuid::new_v4())
    }

    #[test]
    fn test_dispatcher_names() {
        assert_eq!("noindex".parse::<Dispatcher>().unwrap(), Dispatcher::NoIndex);
        assert_eq!("default".parse::<Dispatcher>().unwrap(), Dispatcher::Default);
        assert!("solr".parse::<Dispatcher>().is_err());
        assert_eq!(Dispatcher::NoIndex.name(), "noindex");
    }

    #[test]
    fn test_authorisation_switch_nests() {
        let context = Context::new(Store::new());
        assert!(!context.ignore_authorization());

        context.turn_off_authorisation_system();
        {
            let _guard = context.elevate();
            assert!(context.ignore_authorization());
        }
        assert!(context.ignore_authorization());

        context.restore_auth_system_state();
        assert!(!context.ignore_authorization());

        // unmatched restore stays at zero
        context.restore_auth_system_state();
        assert!(!context.ignore_authorization());
    }

    #[tokio::test]
    async fn test_complete_dispatches_to_index() {
        let store = Store::new();
        let context = Context::new(store.clone());
        context.add_event(event());
        context.add_event(event());
        assert_eq!(context.pending_events(), 2);

        context.complete().await.unwrap();
        assert_eq!(store.indexed_events().await.len(), 2);
    }

    #[tokio::test]
    async fn test_noindex_dispatcher_drops_events() {
        let store = Store::new();
        let mut context = Context::new(store.clone());
        context.set_dispatcher("noindex").unwrap();
        context.add_event(event());

        context.complete().await.unwrap();
        assert!(store.indexed_events().await.is_empty());
    }

    #[tokio::test]
    async fn test_dropped_context_discards_events() {
        let store = Store::new();
        {
            let context = Context::new(store.clone());
            context.add_event(event());
        }
        let context = Context::new(store.clone());
        context.add_event(event());
        context.abort();

        assert!(store.indexed_events().await.is_empty());
    }

    #[tokio::test]
    async fn test_reload_entity_after_delete() {
        let store = Store::new();
        let context = Context::new(store.clone());
        let group = Group::new();
        store.put(group.clone()).await;

        assert_eq!(context.reload_entity(&group).await, Some(group.clone()));
        store.write().await.remove(group.id);
        assert_eq!(context.reload_entity(&group).await, None);
    }
}
