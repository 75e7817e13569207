//! Collection domain model
//!
//! A collection (a face pack) owns an ordered set of groups and resolves
//! `group/item` paths into items.

use indexmap::IndexMap;

use super::constraint::{arrange, Arrangement, SortScratch};
use super::error::ModelError;
use super::group::Group;
use super::item::{Item, Meta};
use super::priority::{next_spaced, Priority, DEFAULT_PRIORITY_STEP};

/// Separator between the group and item segments of a path
pub const PATH_DELIMITER: char = '/';

/// A named, ordered set of groups
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    id: String,

    pub meta: Meta,

    /// Groups keyed by id; the map order is the display order once sorted
    groups: IndexMap<String, Group>,

    dirty: bool,

    /// Gap between automatically assigned group priorities
    step: i64,

    next_arrival: u64,
}

impl Collection {
    /// Creates an empty collection
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            meta: Meta::default(),
            groups: IndexMap::new(),
            dirty: false,
            step: DEFAULT_PRIORITY_STEP,
            next_arrival: 0,
        }
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Renames the collection and re-points every group at it
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
        for group in self.groups.values_mut() {
            group.set_owner(&self.id);
        }
    }

    pub fn step(&self) -> i64 {
        self.step
    }

    /// Sets the priority gap for this collection and all of its groups
    pub fn set_priority_step(&mut self, step: i64) {
        if step <= 0 {
            return;
        }
        self.step = step;
        for group in self.groups.values_mut() {
            group.set_step(step);
        }
    }

    pub fn display_name(&self) -> &str {
        self.meta.name.as_deref().unwrap_or(&self.id)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Returns the number of items across all groups
    pub fn item_count(&self) -> usize {
        self.groups.values().map(Group::len).sum()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.groups.contains_key(id)
    }

    /// Returns true if the group order is stale
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Adds a detached group
    pub fn add(&mut self, mut group: Group) -> Result<(), ModelError> {
        if let Some(owner) = group.collection() {
            return Err(ModelError::AlreadyOwned(
                group.id().to_string(),
                owner.to_string(),
            ));
        }

        if self.groups.contains_key(group.id()) {
            return Err(ModelError::DuplicateId(
                group.id().to_string(),
                self.id.clone(),
            ));
        }

        if group.priority().is_unset() {
            let last = self.max_priority().unwrap_or(0);
            group.assign_priority(Priority::Auto(next_spaced(last, self.step)));
        }

        group.attach(&self.id, self.next_arrival);
        self.next_arrival += 1;

        self.groups.insert(group.id().to_string(), group);
        self.dirty = true;
        Ok(())
    }

    /// Detaches and returns the group with the given id
    pub fn remove(&mut self, id: &str) -> Result<Group, ModelError> {
        let mut group = self
            .groups
            .shift_remove(id)
            .ok_or_else(|| self.not_found(id))?;

        group.detach();
        self.dirty = true;
        Ok(group)
    }

    /// Renames a group, keeping its position and its items' back-references
    pub fn rename_group(&mut self, id: &str, new_id: &str) -> Result<(), ModelError> {
        let index = self
            .groups
            .get_index_of(id)
            .ok_or_else(|| self.not_found(id))?;

        if id == new_id {
            return Ok(());
        }

        if self.groups.contains_key(new_id) {
            return Err(ModelError::DuplicateId(new_id.to_string(), self.id.clone()));
        }

        let (_, mut group) = self
            .groups
            .shift_remove_index(index)
            .ok_or_else(|| self.not_found(id))?;
        group.set_id(new_id);
        self.groups.shift_insert(index, new_id.to_string(), group);
        Ok(())
    }

    /// Renames an item addressed by `group/item`
    pub fn rename_item(&mut self, path: &str, new_id: &str) -> Result<(), ModelError> {
        let (group, item) = self.split_path(path)?;
        self.group_entry_mut(group)?.rename(item, new_id)
    }

    /// Removes an item addressed by `group/item`
    pub fn remove_item(&mut self, path: &str) -> Result<Item, ModelError> {
        let (group, item) = self.split_path(path)?;
        self.group_entry_mut(group)?.remove(item)
    }

    pub fn get(&self, id: &str) -> Option<&Group> {
        self.groups.get(id)
    }

    /// Returns the group with the given id or `NotFound`
    pub fn group(&self, id: &str) -> Result<&Group, ModelError> {
        self.groups.get(id).ok_or_else(|| self.not_found(id))
    }

    /// Returns a mutable group and marks the collection dirty
    pub fn group_mut(&mut self, id: &str) -> Result<&mut Group, ModelError> {
        self.dirty = true;
        self.group_entry_mut(id)
    }

    /// Sets a group's explicit priority
    pub fn set_priority(&mut self, id: &str, priority: i64) -> Result<(), ModelError> {
        self.group_mut(id)?.set_priority(priority);
        Ok(())
    }

    /// Resolves a `group/item` path
    pub fn item(&self, path: &str) -> Result<&Item, ModelError> {
        let (group, item) = self.split_path(path)?;
        self.group(group)?.item(item)
    }

    /// Resolves a `group/item` path mutably; the group is marked dirty
    pub fn item_mut(&mut self, path: &str) -> Result<&mut Item, ModelError> {
        let (group, item) = self.split_path(path)?;
        self.group_entry_mut(group)?.item_mut(item)
    }

    /// Sorts groups by priority if the order is stale
    ///
    /// Equal priorities are ordered by id. Returns true if a sort happened.
    pub fn sort_if_needed(&mut self) -> bool {
        if !self.dirty {
            return false;
        }

        self.groups.sort_by(|_, a, _, b| {
            a.priority()
                .sort_cmp(&b.priority())
                .then_with(|| a.id().cmp(b.id()))
        });
        self.dirty = false;

        tracing::debug!(collection = %self.id, groups = self.groups.len(), "sorted collection");
        true
    }

    /// Sorts the collection and every group
    pub fn sort_all(&mut self) {
        self.sort_if_needed();
        for group in self.groups.values_mut() {
            group.sort_if_needed();
        }
    }

    /// Returns the groups in display order, sorting first if needed
    pub fn groups(&mut self) -> impl ExactSizeIterator<Item = &Group> + '_ {
        self.sort_if_needed();
        self.groups.values()
    }

    /// Returns the groups in their current order without sorting
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Group> + '_ {
        self.groups.values()
    }

    /// Returns the groups in the order they were added
    pub fn in_arrival_order(&self) -> Vec<&Group> {
        let mut groups: Vec<&Group> = self.groups.values().collect();
        groups.sort_by_key(|group| group.arrival());
        groups
    }

    /// Orders groups by their `after`/`before` links
    pub fn arrange(&self, scratch: &mut SortScratch) -> Arrangement {
        let scope = format!("collection {}", self.id);
        let groups = self.in_arrival_order();
        arrange(
            &scope,
            groups.iter().map(|group| (group.id(), &group.links)),
            scratch,
        )
    }

    /// Rewrites group priorities as `step, 2*step, ...` following `order`
    pub fn apply_arrangement(&mut self, order: &[String]) -> Result<(), ModelError> {
        if let Some(missing) = order.iter().find(|id| !self.groups.contains_key(id.as_str())) {
            return Err(self.not_found(missing));
        }

        let mut priority = 0i64;
        for id in order {
            priority = priority.saturating_add(self.step);
            if let Some(group) = self.groups.get_mut(id.as_str()) {
                group.set_priority(priority);
            }
        }

        self.dirty = true;
        Ok(())
    }

    /// Returns a deep copy with its own ownership chain
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Returns an empty collection carrying this collection's metadata
    pub fn copy_shell(&self) -> Self {
        let mut shell = Collection::new(self.id.clone()).with_meta(self.meta.clone());
        shell.step = self.step;
        shell
    }

    fn group_entry_mut(&mut self, id: &str) -> Result<&mut Group, ModelError> {
        let not_found = self.not_found(id);
        self.groups.get_mut(id).ok_or(not_found)
    }

    fn split_path<'p>(&self, path: &'p str) -> Result<(&'p str, &'p str), ModelError> {
        path.split_once(PATH_DELIMITER)
            .ok_or_else(|| self.not_found(path))
    }

    fn max_priority(&self) -> Option<i64> {
        self.groups
            .values()
            .filter_map(|group| group.priority().value())
            .max()
    }

    fn not_found(&self, id: &str) -> ModelError {
        ModelError::NotFound(id.to_string(), self.id.clone())
    }
}
