use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use uuid::Uuid;

pub const ANONYMOUS_GROUP: &str = "Anonymous";
pub const ADMINISTRATOR_GROUP: &str = "Administrator";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectType {
    EPerson,
    Group,
    Item,
    Collection,
    Community,
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::EPerson => "EPERSON",
            Self::Group => "GROUP",
            Self::Item => "ITEM",
            Self::Collection => "COLLECTION",
            Self::Community => "COMMUNITY",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: Option<String>,
    /// Well-known groups that can be neither renamed nor deleted.
    pub permanent: bool,
    /// Direct e-person members.
    pub members: BTreeSet<Uuid>,
    /// Direct member groups.
    pub member_groups: BTreeSet<Uuid>,
}

impl Group {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: None,
            permanent: false,
            members: BTreeSet::new(),
            member_groups: BTreeSet::new(),
        }
    }

    pub fn permanent(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            permanent: true,
            ..Self::new()
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn has_direct_member(&self, eperson: &EPerson) -> bool {
        self.members.contains(&eperson.id)
    }

    pub fn has_direct_member_group(&self, group: &Group) -> bool {
        self.member_groups.contains(&group.id)
    }
}

impl Default for Group {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EPerson {
    pub id: Uuid,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub can_log_in: bool,
}

impl EPerson {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            email: None,
            first_name: None,
            last_name: None,
            can_log_in: false,
        }
    }
}

impl Default for EPerson {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Community {
    pub id: Uuid,
    pub name: Option<String>,
    pub parent: Option<Uuid>,
    pub admins: Option<Uuid>,
}

impl Community {
    pub fn new(parent: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: None,
            parent,
            admins: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: Uuid,
    pub name: Option<String>,
    pub community: Uuid,
    pub admins: Option<Uuid>,
    pub submitters: Option<Uuid>,
    /// Default read groups keyed by action code.
    pub default_read: BTreeMap<i32, Uuid>,
    /// Workflow role groups keyed by role name.
    pub workflow_roles: BTreeMap<String, Uuid>,
}

impl Collection {
    pub fn new(community: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: None,
            community,
            admins: None,
            submitters: None,
            default_read: BTreeMap::new(),
            workflow_roles: BTreeMap::new(),
        }
    }

    /// Every group bound to one of this collection's role slots.
    pub fn role_groups(&self) -> Vec<Uuid> {
        self.admins
            .iter()
            .chain(self.submitters.iter())
            .chain(self.default_read.values())
            .chain(self.workflow_roles.values())
            .copied()
            .collect()
    }

    pub(crate) fn unbind_group(&mut self, group_id: Uuid) -> bool {
        let mut changed = false;
        if self.admins == Some(group_id) {
            self.admins = None;
            changed = true;
        }
        if self.submitters == Some(group_id) {
            self.submitters = None;
            changed = true;
        }
        let before = self.default_read.len() + self.workflow_roles.len();
        self.default_read.retain(|_, id| *id != group_id);
        self.workflow_roles.retain(|_, id| *id != group_id);
        changed || before != self.default_read.len() + self.workflow_roles.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub name: Option<String>,
    pub owning_collection: Option<Uuid>,
}

impl Item {
    pub fn new(owning_collection: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: None,
            owning_collection,
        }
    }
}

/// Any object held by the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DSpaceObject {
    EPerson(EPerson),
    Group(Group),
    Item(Item),
    Collection(Collection),
    Community(Community),
}

impl DSpaceObject {
    pub fn id(&self) -> Uuid {
        match self {
            Self::EPerson(o) => o.id,
            Self::Group(o) => o.id,
            Self::Item(o) => o.id,
            Self::Collection(o) => o.id,
            Self::Community(o) => o.id,
        }
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            Self::EPerson(_) => ObjectType::EPerson,
            Self::Group(_) => ObjectType::Group,
            Self::Item(_) => ObjectType::Item,
            Self::Collection(_) => ObjectType::Collection,
            Self::Community(_) => ObjectType::Community,
        }
    }
}

/// A typed view onto [`DSpaceObject`], used for reloads and typed store access.
pub trait Entity: Clone + Send + Sync + 'static {
    const TYPE: ObjectType;

    fn id(&self) -> Uuid;
    fn into_object(self) -> DSpaceObject;
    fn from_object(object: DSpaceObject) -> Option<Self>;
}

macro_rules! impl_entity {
    ($ty:ident) => {
        impl Entity for $ty {
            const TYPE: ObjectType = ObjectType::$ty;

            fn id(&self) -> Uuid {
                self.id
            }

            fn into_object(self) -> DSpaceObject {
                DSpaceObject::$ty(self)
            }

            fn from_object(object: DSpaceObject) -> Option<Self> {
                match object {
                    DSpaceObject::$ty(inner) => Some(inner),
                    _ => None,
                }
            }
        }

        impl From<$ty> for DSpaceObject {
            fn from(value: $ty) -> Self {
                DSpaceObject::$ty(value)
            }
        }
    };
}

impl_entity!(EPerson);
impl_entity!(Group);
impl_entity!(Item);
impl_entity!(Collection);
impl_entity!(Community);

/// Action codes accepted when creating a collection's default read group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultReadAction {
    Bitstream,
    Item,
}

impl DefaultReadAction {
    pub const BITSTREAM_CODE: i32 = 9;
    pub const ITEM_CODE: i32 = 10;

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            Self::BITSTREAM_CODE => Some(Self::Bitstream),
            Self::ITEM_CODE => Some(Self::Item),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Bitstream => Self::BITSTREAM_CODE,
            Self::Item => Self::ITEM_CODE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Create,
    Modify,
    Delete,
}

/// A change notification queued on a session and handed to its dispatcher on commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub subject_type: ObjectType,
    pub subject_id: Uuid,
    pub at: DateTime<Utc>,
}

impl Event {
    pub fn new(kind: EventKind, subject_type: ObjectType, subject_id: Uuid) -> Self {
        Self {
            kind,
            subject_type,
            subject_id,
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_round_trip_through_object() {
        let group = Group::permanent(ADMINISTRATOR_GROUP);
        let object: DSpaceObject = group.clone().into();
        assert_eq!(object.object_type(), ObjectType::Group);
        assert_eq!(object.id(), group.id);
        assert_eq!(Group::from_object(object.clone()), Some(group));
        assert_eq!(EPerson::from_object(object), None);
    }

    #[test]
    fn test_collection_unbind_group() {
        let mut collection = Collection::new(Uuid::new_v4());
        let admins = Uuid::new_v4();
        let reader = Uuid::new_v4();
        collection.admins = Some(admins);
        collection.default_read.insert(DefaultReadAction::ITEM_CODE, reader);

        assert_eq!(collection.role_groups().len(), 2);
        assert!(collection.unbind_group(reader));
        assert!(collection.default_read.is_empty());
        assert!(!collection.unbind_group(reader));
        assert_eq!(collection.admins, Some(admins));
    }

    #[test]
    fn test_default_read_codes() {
        assert_eq!(DefaultReadAction::from_code(9), Some(DefaultReadAction::Bitstream));
        assert_eq!(DefaultReadAction::from_code(10), Some(DefaultReadAction::Item));
        assert_eq!(DefaultReadAction::from_code(3), None);
        assert_eq!(DefaultReadAction::Item.code(), 10);
    }

    #[test]
    fn test_object_type_display() {
        assert_eq!(ObjectType::Item.to_string(), "ITEM");
        assert_eq!(ObjectType::Community.to_string(), "COMMUNITY");
    }
}
