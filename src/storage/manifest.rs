//! Pack manifest records
//!
//! A pack is stored as one JSON document:
//!
//! ```json
//! {
//!   "id": "faces",
//!   "groups": [
//!     {
//!       "id": "Alice",
//!       "description": "Protagonist",
//!       "items": [
//!         { "id": "happy", "image": "alice/happy.png", "priority": 500 },
//!         { "id": "sad", "image": "alice/sad.png", "after": "happy" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Only explicitly authored fields are written back. Automatic priorities
//! are recomputed on load, so they never show up as diffs.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::{Collection, Group, Item, Links, Meta, ModelError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackRecord {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,

    /// Predecessor group id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,

    /// Successor group id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ItemRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: String,

    /// Image path relative to the pack root
    pub image: PathBuf,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,

    /// Predecessor item id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,

    /// Successor item id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
}

impl PackRecord {
    /// Builds the record for a collection, in its current order
    pub fn from_collection(collection: &Collection) -> Self {
        Self {
            id: collection.id().to_string(),
            name: collection.meta.name.clone(),
            description: collection.meta.description.clone(),
            groups: collection.iter().map(GroupRecord::from_group).collect(),
        }
    }

    /// Rebuilds a collection, assigning automatic priorities with `step`
    ///
    /// Children are added in file order through the normal `add` path, so a
    /// repeated id fails with `DuplicateId`.
    pub fn into_collection(self, step: i64) -> Result<Collection, ModelError> {
        let mut collection =
            Collection::new(self.id).with_meta(Meta::new(self.name, self.description));
        collection.set_priority_step(step);

        for record in self.groups {
            collection.add(record.into_group(step)?)?;
        }

        Ok(collection)
    }
}

impl GroupRecord {
    pub fn from_group(group: &Group) -> Self {
        Self {
            id: group.id().to_string(),
            name: group.meta.name.clone(),
            description: group.meta.description.clone(),
            priority: group.priority().explicit(),
            after: group.links.after.clone(),
            before: group.links.before.clone(),
            items: group.iter().map(ItemRecord::from_item).collect(),
        }
    }

    pub fn into_group(self, step: i64) -> Result<Group, ModelError> {
        let mut group = Group::new(self.id)
            .with_meta(Meta::new(self.name, self.description))
            .with_links(Links::new(self.after, self.before))
            .with_step(step);
        if let Some(priority) = self.priority {
            group.set_priority(priority);
        }

        for record in self.items {
            group.add(record.into_item())?;
        }

        Ok(group)
    }
}

impl ItemRecord {
    pub fn from_item(item: &Item) -> Self {
        Self {
            id: item.id().to_string(),
            image: item.image.clone(),
            name: item.meta.name.clone(),
            description: item.meta.description.clone(),
            priority: item.priority().explicit(),
            after: item.links.after.clone(),
            before: item.links.before.clone(),
        }
    }

    pub fn into_item(self) -> Item {
        let mut item = Item::new(self.id, self.image)
            .with_meta(Meta::new(self.name, self.description))
            .with_links(Links::new(self.after, self.before));
        if let Some(priority) = self.priority {
            item.set_priority(priority);
        }
        item
    }
}
