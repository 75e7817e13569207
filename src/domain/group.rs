//! Group domain model
//!
//! A group (one character in a face pack) owns an ordered set of items.
//! Order is priority-based and materialized lazily: mutations only mark the
//! group dirty and the next ordered read sorts.

use indexmap::IndexMap;

use super::constraint::{arrange, Arrangement, Links, SortScratch};
use super::error::ModelError;
use super::item::{Item, Meta};
use super::priority::{next_spaced, Priority, DEFAULT_PRIORITY_STEP};

/// A named, ordered set of items
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    id: String,
    priority: Priority,

    pub meta: Meta,

    pub links: Links,

    /// Items keyed by id; the map order is the display order once sorted
    items: IndexMap<String, Item>,

    dirty: bool,

    /// Id of the earliest-added item still present
    representative: Option<String>,

    /// Gap between automatically assigned item priorities
    step: i64,

    next_arrival: u64,

    /// Id of the owning collection
    owner: Option<String>,

    /// Position in the owner's arrival sequence
    arrival: u64,
}

impl Group {
    /// Creates a detached, empty group
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            priority: Priority::Unset,
            meta: Meta::default(),
            links: Links::default(),
            items: IndexMap::new(),
            dirty: false,
            representative: None,
            step: DEFAULT_PRIORITY_STEP,
            next_arrival: 0,
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

    /// Sets the gap used for automatic item priorities
    pub fn with_step(mut self, step: i64) -> Self {
        self.set_step(step);
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
    /// On an owned group, use [`Collection::set_priority`](super::Collection::set_priority)
    /// so the collection re-sorts.
    pub fn set_priority(&mut self, priority: i64) {
        self.priority = Priority::Explicit(priority);
    }

    pub fn step(&self) -> i64 {
        self.step
    }

    /// Sets the gap used for automatic item priorities (non-positive values are ignored)
    pub fn set_step(&mut self, step: i64) {
        if step > 0 {
            self.step = step;
        }
    }

    /// Returns the display name, falling back to the id
    pub fn display_name(&self) -> &str {
        self.meta.name.as_deref().unwrap_or(&self.id)
    }

    /// Returns the id of the owning collection, if attached
    pub fn collection(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn is_owned(&self) -> bool {
        self.owner.is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    /// Returns true if the order is stale
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns the earliest-added item still in the group
    pub fn representative(&self) -> Option<&Item> {
        self.representative
            .as_deref()
            .and_then(|id| self.items.get(id))
    }

    /// Adds a detached item
    ///
    /// Items without a priority get the next spaced value after the largest
    /// priority already present. "Last" means that maximum, not the most
    /// recently added item.
    pub fn add(&mut self, mut item: Item) -> Result<(), ModelError> {
        if let Some(owner) = item.group() {
            return Err(ModelError::AlreadyOwned(
                item.id().to_string(),
                owner.to_string(),
            ));
        }

        if self.items.contains_key(item.id()) {
            return Err(ModelError::DuplicateId(
                item.id().to_string(),
                self.id.clone(),
            ));
        }

        if item.priority().is_unset() {
            let last = self.max_priority().unwrap_or(0);
            item.assign_priority(Priority::Auto(next_spaced(last, self.step)));
        }

        item.attach(&self.id, self.next_arrival);
        self.next_arrival += 1;

        if self.representative.is_none() {
            self.representative = Some(item.id().to_string());
        }

        self.items.insert(item.id().to_string(), item);
        self.dirty = true;
        Ok(())
    }

    /// Detaches and returns the item with the given id
    pub fn remove(&mut self, id: &str) -> Result<Item, ModelError> {
        let mut item = self
            .items
            .shift_remove(id)
            .ok_or_else(|| self.not_found(id))?;

        item.detach();

        if self.representative.as_deref() == Some(id) {
            self.representative = self
                .items
                .values()
                .min_by_key(|item| item.arrival())
                .map(|item| item.id().to_string());
        }

        self.dirty = true;
        Ok(item)
    }

    /// Renames an item, keeping its position
    ///
    /// Order is priority-based, so a rename does not mark the group dirty.
    pub fn rename(&mut self, id: &str, new_id: &str) -> Result<(), ModelError> {
        let index = self
            .items
            .get_index_of(id)
            .ok_or_else(|| self.not_found(id))?;

        if id == new_id {
            return Ok(());
        }

        if self.items.contains_key(new_id) {
            return Err(ModelError::DuplicateId(new_id.to_string(), self.id.clone()));
        }

        let (_, mut item) = self
            .items
            .shift_remove_index(index)
            .ok_or_else(|| self.not_found(id))?;
        item.set_id(new_id);
        self.items.shift_insert(index, new_id.to_string(), item);

        if self.representative.as_deref() == Some(id) {
            self.representative = Some(new_id.to_string());
        }

        Ok(())
    }

    /// Returns the item with the given id
    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.get(id)
    }

    /// Returns the item with the given id or `NotFound`
    pub fn item(&self, id: &str) -> Result<&Item, ModelError> {
        self.items.get(id).ok_or_else(|| self.not_found(id))
    }

    /// Returns a mutable item and marks the group dirty
    pub fn item_mut(&mut self, id: &str) -> Result<&mut Item, ModelError> {
        let not_found = self.not_found(id);
        let item = self.items.get_mut(id).ok_or(not_found)?;
        self.dirty = true;
        Ok(item)
    }

    /// Sets an item's explicit priority
    pub fn set_item_priority(&mut self, id: &str, priority: i64) -> Result<(), ModelError> {
        self.item_mut(id)?.set_priority(priority);
        Ok(())
    }

    /// Sorts items by priority if the order is stale
    ///
    /// Equal priorities are ordered by id. Returns true if a sort happened.
    pub fn sort_if_needed(&mut self) -> bool {
        if !self.dirty {
            return false;
        }

        self.items.sort_by(|_, a, _, b| {
            a.priority()
                .sort_cmp(&b.priority())
                .then_with(|| a.id().cmp(b.id()))
        });
        self.dirty = false;

        tracing::debug!(group = %self.id, items = self.items.len(), "sorted group");
        true
    }

    /// Returns the items in display order, sorting first if needed
    pub fn items(&mut self) -> impl ExactSizeIterator<Item = &Item> + '_ {
        self.sort_if_needed();
        self.items.values()
    }

    /// Returns the items in their current order without sorting
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Item> + '_ {
        self.items.values()
    }

    /// Returns the items in the order they were added
    pub fn in_arrival_order(&self) -> Vec<&Item> {
        let mut items: Vec<&Item> = self.items.values().collect();
        items.sort_by_key(|item| item.arrival());
        items
    }

    /// Orders items by their `after`/`before` links
    ///
    /// Items are fed to the constraint sorter in arrival order. Cycles and
    /// links to missing items are logged and returned as diagnostics.
    pub fn arrange(&self, scratch: &mut SortScratch) -> Arrangement {
        let scope = format!("group {}", self.id);
        let items = self.in_arrival_order();
        arrange(
            &scope,
            items.iter().map(|item| (item.id(), &item.links)),
            scratch,
        )
    }

    /// Rewrites priorities as `step, 2*step, ...` following `order`
    ///
    /// Written priorities are explicit so they persist. Fails without
    /// changing anything if an id is not in the group.
    pub fn apply_arrangement(&mut self, order: &[String]) -> Result<(), ModelError> {
        if let Some(missing) = order.iter().find(|id| !self.items.contains_key(id.as_str())) {
            return Err(self.not_found(missing));
        }

        let mut priority = 0i64;
        for id in order {
            priority = priority.saturating_add(self.step);
            if let Some(item) = self.items.get_mut(id.as_str()) {
                item.set_priority(priority);
            }
        }

        self.dirty = true;
        Ok(())
    }

    /// Returns a detached deep copy with the same ids and priorities
    pub fn copy(&self) -> Self {
        Self {
            owner: None,
            arrival: 0,
            ..self.clone()
        }
    }

    /// Returns a detached, empty group with this group's own metadata
    pub fn copy_shell(&self) -> Self {
        let mut shell = Group::new(self.id.clone())
            .with_meta(self.meta.clone())
            .with_links(self.links.clone())
            .with_step(self.step);
        shell.priority = self.priority;
        shell
    }

    fn max_priority(&self) -> Option<i64> {
        self.items
            .values()
            .filter_map(|item| item.priority().value())
            .max()
    }

    fn not_found(&self, id: &str) -> ModelError {
        ModelError::NotFound(id.to_string(), self.id.clone())
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

    pub(crate) fn set_owner(&mut self, owner: &str) {
        if self.owner.is_some() {
            self.owner = Some(owner.to_string());
        }
    }

    /// Changes the id and re-points every item at it
    pub(crate) fn set_id(&mut self, id: &str) {
        self.id = id.to_string();
        for item in self.items.values_mut() {
            item.set_owner(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(id: &str) -> Item {
        Item::new(id, format!("{}.png", id))
    }

    fn ids(group: &mut Group) -> Vec<String> {
        group.items().map(|item| item.id().to_string()).collect()
    }

    #[test]
    fn spaced_priorities_in_insertion_order() {
        let mut group = Group::new("Bob");
        for id in ["a", "b", "c", "d"] {
            group.add(face(id)).unwrap();
        }

        let priorities: Vec<_> = group
            .items()
            .map(|item| item.priority().value().unwrap())
            .collect();
        assert_eq!(priorities, vec![1000, 2000, 3000, 4000]);
    }

    #[test]
    fn explicit_priority_then_spacing() {
        let mut group = Group::new("Alice");
        group.add(face("happy").with_priority(500)).unwrap();
        group.add(face("sad")).unwrap();
        group.add(face("angry")).unwrap();

        assert_eq!(group.get("happy").unwrap().priority(), Priority::Explicit(500));
        assert_eq!(group.get("sad").unwrap().priority(), Priority::Auto(1000));
        assert_eq!(group.get("angry").unwrap().priority(), Priority::Auto(2000));
        assert_eq!(ids(&mut group), vec!["happy", "sad", "angry"]);

        group.rename("sad", "calm").unwrap();
        assert_eq!(ids(&mut group), vec!["happy", "calm", "angry"]);
        assert!(group.item("sad").unwrap_err().is_not_found());
        assert_eq!(group.item("calm").unwrap().priority(), Priority::Auto(1000));
        assert_eq!(group.item("calm").unwrap().group(), Some("Alice"));
    }

    #[test]
    fn spacing_follows_largest_priority() {
        let mut group = Group::new("G");
        group.add(face("high").with_priority(5000)).unwrap();
        group.add(face("low").with_priority(10)).unwrap();
        group.add(face("next")).unwrap();

        assert_eq!(group.get("next").unwrap().priority(), Priority::Auto(6000));
    }

    #[test]
    fn custom_step() {
        let mut group = Group::new("G").with_step(10);
        group.add(face("a")).unwrap();
        group.add(face("b")).unwrap();

        assert_eq!(group.get("b").unwrap().priority().value(), Some(20));
    }

    #[test]
    fn sort_is_lazy() {
        let mut group = Group::new("G");
        group.add(face("b").with_priority(2)).unwrap();
        group.add(face("a").with_priority(1)).unwrap();

        // Not reordered until read
        assert!(group.is_dirty());
        let raw: Vec<_> = group.iter().map(|item| item.id()).collect();
        assert_eq!(raw, vec!["b", "a"]);

        assert_eq!(ids(&mut group), vec!["a", "b"]);
        assert!(!group.is_dirty());
        assert!(!group.sort_if_needed());
    }

    #[test]
    fn equal_priorities_tie_break_by_id() {
        let mut group = Group::new("G");
        group.add(face("zeta").with_priority(7)).unwrap();
        group.add(face("alpha").with_priority(7)).unwrap();
        group.add(face("mid").with_priority(7)).unwrap();

        assert_eq!(ids(&mut group), vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn add_rejects_owned_item() {
        let mut first = Group::new("first");
        first.add(face("x")).unwrap();

        let owned = first.get("x").unwrap().clone();
        let mut second = Group::new("second");
        assert_eq!(
            second.add(owned),
            Err(ModelError::AlreadyOwned("x".into(), "first".into()))
        );

        // A detached copy is accepted
        second.add(first.get("x").unwrap().copy()).unwrap();
        assert_eq!(second.get("x").unwrap().group(), Some("second"));
    }

    #[test]
    fn add_rejects_duplicate_id() {
        let mut group = Group::new("G");
        group.add(face("x")).unwrap();

        let result = group.add(face("x"));
        assert_eq!(result, Err(ModelError::DuplicateId("x".into(), "G".into())));
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn rename_rejects_collision() {
        let mut group = Group::new("G");
        group.add(face("a")).unwrap();
        group.add(face("b")).unwrap();

        assert!(group.rename("a", "b").unwrap_err().is_duplicate());
        assert!(group.rename("missing", "c").unwrap_err().is_not_found());
        assert!(group.contains("a"));
        assert!(group.contains("b"));
    }

    #[test]
    fn rename_does_not_dirty() {
        let mut group = Group::new("G");
        group.add(face("a")).unwrap();
        group.sort_if_needed();

        group.rename("a", "z").unwrap();
        assert!(!group.is_dirty());
        assert_eq!(group.representative().unwrap().id(), "z");
    }

    #[test]
    fn remove_detaches_and_updates_representative() {
        let mut group = Group::new("G");
        group.add(face("first").with_priority(9000)).unwrap();
        group.add(face("second").with_priority(1)).unwrap();
        group.add(face("third").with_priority(2)).unwrap();
        group.sort_if_needed();

        assert_eq!(group.representative().unwrap().id(), "first");

        let removed = group.remove("first").unwrap();
        assert!(!removed.is_owned());
        assert!(group.is_dirty());
        assert_eq!(group.representative().unwrap().id(), "second");

        assert!(group.remove("first").unwrap_err().is_not_found());

        group.remove("second").unwrap();
        group.remove("third").unwrap();
        assert!(group.representative().is_none());
    }

    #[test]
    fn item_mut_marks_dirty() {
        let mut group = Group::new("G");
        group.add(face("a")).unwrap();
        group.add(face("b")).unwrap();
        group.sort_if_needed();

        group.set_item_priority("b", 1).unwrap();
        assert!(group.is_dirty());
        assert_eq!(ids(&mut group), vec!["b", "a"]);
    }

    #[test]
    fn arrange_and_apply() {
        let mut group = Group::new("G");
        group
            .add(face("a").with_links(Links::new(Some("b".into()), None)))
            .unwrap();
        group.add(face("b")).unwrap();
        group.add(face("c")).unwrap();

        let arrangement = group.arrange(&mut SortScratch::new());
        assert_eq!(arrangement.order, vec!["b", "a", "c"]);
        assert!(arrangement.diagnostics.is_clean());

        group.apply_arrangement(&arrangement.order).unwrap();
        assert_eq!(ids(&mut group), vec!["b", "a", "c"]);
        assert_eq!(group.get("a").unwrap().priority(), Priority::Explicit(2000));
    }

    #[test]
    fn arrange_reports_dangling_links() {
        let mut group = Group::new("G");
        group
            .add(face("a").with_links(Links::new(None, Some("nobody".into()))))
            .unwrap();

        let arrangement = group.arrange(&mut SortScratch::new());
        assert_eq!(arrangement.order, vec!["a"]);
        assert_eq!(arrangement.diagnostics.dangling, vec!["nobody".to_string()]);
    }

    #[test]
    fn apply_arrangement_rejects_unknown_ids() {
        let mut group = Group::new("G");
        group.add(face("a").with_priority(5)).unwrap();

        let result = group.apply_arrangement(&["a".to_string(), "ghost".to_string()]);
        assert!(result.unwrap_err().is_not_found());
        assert_eq!(group.get("a").unwrap().priority(), Priority::Explicit(5));
    }

    #[test]
    fn copy_is_detached_and_independent() {
        let mut group = Group::new("G").with_priority(300);
        group.add(face("a")).unwrap();
        group.attach("pack", 0);

        let mut copy = group.copy();
        assert!(!copy.is_owned());
        assert_eq!(copy.priority(), Priority::Explicit(300));
        assert_eq!(copy.get("a").unwrap().group(), Some("G"));

        copy.remove("a").unwrap();
        assert!(group.contains("a"));
    }

    #[test]
    fn copy_shell_keeps_metadata_only() {
        let group = Group::new("G")
            .with_meta(Meta::new(None, Some("Line one\nLine two".into())))
            .with_step(50);
        let mut group = group;
        group.add(face("a")).unwrap();

        let shell = group.copy_shell();
        assert!(shell.is_empty());
        assert_eq!(shell.meta.description.as_deref(), Some("Line one\nLine two"));
        assert_eq!(shell.step(), 50);
    }
}
