use crate::domain::model::{
    DSpaceObject, Entity, Event, Group, ADMINISTRATOR_GROUP, ANONYMOUS_GROUP,
};
use crate::utils::error::Result;
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// In-memory repository state.
#[derive(Debug, Default)]
pub struct StoreState {
    objects: HashMap<Uuid, DSpaceObject>,
    index_log: Vec<Event>,
}

impl StoreState {
    pub fn get<T: Entity>(&self, id: Uuid) -> Option<T> {
        self.objects.get(&id).cloned().and_then(T::from_object)
    }

    pub fn get_object(&self, id: Uuid) -> Option<&DSpaceObject> {
        self.objects.get(&id)
    }

    pub fn put<T: Entity>(&mut self, entity: T) {
        self.objects.insert(entity.id(), entity.into_object());
    }

    pub fn remove(&mut self, id: Uuid) -> Option<DSpaceObject> {
        self.objects.remove(&id)
    }

    pub fn all<T: Entity>(&self) -> Vec<T> {
        self.objects
            .values()
            .filter(|o| o.object_type() == T::TYPE)
            .cloned()
            .filter_map(T::from_object)
            .collect()
    }

    pub fn group_by_name(&self, name: &str) -> Option<Group> {
        self.all::<Group>()
            .into_iter()
            .find(|g| g.name.as_deref() == Some(name))
    }

    /// Ids of every group reachable from `group_id` through member groups, itself included.
    pub fn group_closure(&self, group_id: Uuid) -> HashSet<Uuid> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([group_id]);
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(group) = self.get::<Group>(id) {
                queue.extend(group.member_groups.iter().copied());
            }
        }
        seen
    }

    pub fn group_contains_eperson(&self, group_id: Uuid, eperson_id: Uuid) -> bool {
        self.group_closure(group_id).into_iter().any(|id| {
            self.get::<Group>(id)
                .map(|g| g.members.contains(&eperson_id))
                .unwrap_or(false)
        })
    }

    pub fn is_site_admin(&self, eperson_id: Uuid) -> bool {
        self.group_by_name(ADMINISTRATOR_GROUP)
            .map(|admins| self.group_contains_eperson(admins.id, eperson_id))
            .unwrap_or(false)
    }
}

/// Serializable copy of the store, ordered by object id.
#[derive(Debug, Clone, Serialize)]
pub struct StoreSnapshot {
    pub objects: Vec<DSpaceObject>,
    pub indexed: Vec<Event>,
}

/// Cheaply clonable handle onto the shared repository state.
#[derive(Debug, Clone)]
pub struct Store {
    inner: Arc<RwLock<StoreState>>,
}

impl Store {
    /// Creates a store seeded with the permanent `Anonymous` and `Administrator` groups.
    pub fn new() -> Self {
        let mut state = StoreState::default();
        state.put(Group::permanent(ANONYMOUS_GROUP));
        state.put(Group::permanent(ADMINISTRATOR_GROUP));
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    pub async fn get<T: Entity>(&self, id: Uuid) -> Option<T> {
        self.inner.read().await.get(id)
    }

    pub async fn get_object(&self, id: Uuid) -> Option<DSpaceObject> {
        self.inner.read().await.get_object(id).cloned()
    }

    pub async fn contains(&self, id: Uuid) -> bool {
        self.inner.read().await.get_object(id).is_some()
    }

    pub async fn put<T: Entity>(&self, entity: T) {
        self.inner.write().await.put(entity);
    }

    pub async fn all<T: Entity>(&self) -> Vec<T> {
        self.inner.read().await.all()
    }

    pub async fn group_by_name(&self, name: &str) -> Option<Group> {
        self.inner.read().await.group_by_name(name)
    }

    pub async fn group_contains_eperson(&self, group_id: Uuid, eperson_id: Uuid) -> bool {
        self.inner
            .read()
            .await
            .group_contains_eperson(group_id, eperson_id)
    }

    pub async fn is_site_admin(&self, eperson_id: Uuid) -> bool {
        self.inner.read().await.is_site_admin(eperson_id)
    }

    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.inner.read().await
    }

    /// Exclusive access for multi-step changes that must not interleave.
    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.inner.write().await
    }

    pub(crate) async fn record_indexed(&self, events: Vec<Event>) {
        self.inner.write().await.index_log.extend(events);
    }

    pub async fn indexed_events(&self) -> Vec<Event> {
        self.inner.read().await.index_log.clone()
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        let state = self.inner.read().await;
        let mut objects: Vec<DSpaceObject> = state.objects.values().cloned().collect();
        objects.sort_by_key(|o| o.id());
        StoreSnapshot {
            objects,
            indexed: state.index_log.clone(),
        }
    }

    pub async fn to_json(&self) -> Result<String> {
        let snapshot = self.snapshot().await;
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
