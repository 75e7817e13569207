//! Item domain model
//!
//! Items are the leaf records of a pack: one face image plus optional
//! display metadata, a sort priority and ordering links to siblings.

use std::path::{Path, PathBuf};

use super::constraint::Links;
use super::priority::Priority;

/// Optional display metadata shared by items and groups
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Meta {
    /// Display name override
    pub name: Option<String>,

    /// Free-form, possibly multi-line description
    pub description: Option<String>,
}

impl Meta {
    pub fn new(name: Option<String>, description: Option<String>) -> Self {
        Self { name, description }
    }

    /// Returns true if no field is set
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

/// A face image inside a group
///
/// `Clone` keeps the owner handle, so a plain clone of an owned item cannot
/// be added anywhere. Use [`Item::copy`] for a detached duplicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    id: String,
    priority: Priority,

    /// Image path relative to the pack root
    pub image: PathBuf,

    pub meta: Meta,

    pub links: Links,

    /// Id of the owning group
    owner: Option<String>,

    /// Position in the owner's arrival sequence
    arrival: u64,
}

impl Item {
    /// Creates a detached item with no priority
    pub fn new(id: impl Into<String>, image: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            priority: Priority::Unset,
            image: image.into(),
            meta: Meta::default(),
            links: Links::default(),
            owner: None,
            arrival: 0,
        }
    }

    /// Sets an explicit priority
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Priority::Explicit(priority);
        self
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_links(mut self, links: Links) -> Self {
        self.links = links;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Sets an explicit priority
    ///
    /// On an owned item, go through [`Group::set_item_priority`](super::Group::set_item_priority)
    /// or [`Group::item_mut`](super::Group::item_mut) so the group re-sorts.
    pub fn set_priority(&mut self, priority: i64) {
        self.priority = Priority::Explicit(priority);
    }

    /// Forgets the priority; the next owner assigns a spaced one
    pub fn clear_priority(&mut self) {
        self.priority = Priority::Unset;
    }

    pub fn image(&self) -> &Path {
        &self.image
    }

    /// Returns the display name, falling back to the id
    pub fn display_name(&self) -> &str {
        self.meta.name.as_deref().unwrap_or(&self.id)
    }

    /// Returns the id of the owning group, if attached
    pub fn group(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn is_owned(&self) -> bool {
        self.owner.is_some()
    }

    /// Returns a detached deep copy with the same id and priority
    pub fn copy(&self) -> Self {
        Self {
            owner: None,
            arrival: 0,
            ..self.clone()
        }
    }

    pub(crate) fn arrival(&self) -> u64 {
        self.arrival
    }

    pub(crate) fn assign_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    pub(crate) fn attach(&mut self, owner: &str, arrival: u64) {
        self.owner = Some(owner.to_string());
        self.arrival = arrival;
    }

    pub(crate) fn detach(&mut self) {
        self.owner = None;
    }

    pub(crate) fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub(crate) fn set_owner(&mut self, owner: &str) {
        if self.owner.is_some() {
            self.owner = Some(owner.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_item_is_detached_and_unset() {
        let item = Item::new("happy", "alice/happy.png");

        assert_eq!(item.id(), "happy");
        assert!(item.priority().is_unset());
        assert!(!item.is_owned());
        assert_eq!(item.image(), Path::new("alice/happy.png"));
    }

    #[test]
    fn display_name_falls_back_to_id() {
        let item = Item::new("happy", "happy.png");
        assert_eq!(item.display_name(), "happy");

        let named = item.with_meta(Meta::new(Some("Happy!".into()), None));
        assert_eq!(named.display_name(), "Happy!");
    }

    #[test]
    fn copy_detaches() {
        let mut item = Item::new("sad", "sad.png").with_priority(700);
        item.attach("Alice", 3);

        let copy = item.copy();
        assert!(!copy.is_owned());
        assert_eq!(copy.priority(), Priority::Explicit(700));
        assert_eq!(copy.id(), "sad");

        // A plain clone still carries the owner
        assert_eq!(item.clone().group(), Some("Alice"));
    }

    #[test]
    fn set_owner_ignores_detached_items() {
        let mut item = Item::new("x", "x.png");
        item.set_owner("G");
        assert!(!item.is_owned());
    }
}
