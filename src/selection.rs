use thiserror::Error;
use tracing::debug;

/// Items that can live in a [`SelectionState`].
pub trait Identified {
    fn id(&self) -> &str;
}

/// A field-level change that can be merged into an item.
pub trait Patch<T> {
    fn apply(self, target: &mut T);
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("An item with id {0} already exists")]
    DuplicateId(String),
    #[error("No item with id {0}")]
    NotFound(String),
}

/// A collection plus at most one selected item.
///
/// The selection is stored as an id into the collection rather than as a
/// copy, so the detail pane always reads the same data the list shows.
/// Removing the selected item clears the selection.
#[derive(Debug, Clone)]
pub struct SelectionState<T> {
    items: Vec<T>,
    selected: Option<String>,
}

impl<T> Default for SelectionState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            selected: None,
        }
    }
}

impl<T: Identified> SelectionState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a collection. Later items with an id already seen are dropped.
    pub fn with_items(items: Vec<T>) -> Self {
        let mut state = Self::new();
        state.replace_all(items);
        state
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn selected(&self) -> Option<&T> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Select an item, replacing any previous selection.
    pub fn select(&mut self, id: &str) -> Result<&T, SelectionError> {
        let position = self.position(id)?;
        self.selected = Some(id.to_string());
        Ok(&self.items[position])
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Append a new item. Ids must be unique.
    pub fn insert(&mut self, item: T) -> Result<(), SelectionError> {
        if self.contains(item.id()) {
            return Err(SelectionError::DuplicateId(item.id().to_string()));
        }
        self.items.push(item);
        Ok(())
    }

    /// Merge a patch into the item with the given id.
    pub fn update<P: Patch<T>>(&mut self, id: &str, patch: P) -> Result<&T, SelectionError> {
        self.modify(id, |item| patch.apply(item))
    }

    /// Merge a patch into the selected item, if any.
    pub fn update_selected<P: Patch<T>>(&mut self, patch: P) -> Option<&T> {
        let id = self.selected.clone()?;
        self.update(&id, patch).ok()
    }

    /// Mutate the item with the given id in place.
    pub fn modify<F>(&mut self, id: &str, f: F) -> Result<&T, SelectionError>
    where
        F: FnOnce(&mut T),
    {
        let position = self.position(id)?;
        f(&mut self.items[position]);
        Ok(&self.items[position])
    }

    /// Remove an item, clearing the selection if it pointed at it.
    pub fn remove(&mut self, id: &str) -> Option<T> {
        let position = self.position(id).ok()?;
        if self.selected.as_deref() == Some(id) {
            debug!(id, "selected item removed, clearing selection");
            self.selected = None;
        }
        Some(self.items.remove(position))
    }

    /// Replace the whole collection. The selection survives only if its id is
    /// still present.
    pub fn replace_all(&mut self, items: Vec<T>) {
        self.items.clear();
        for item in items {
            if !self.contains(item.id()) {
                self.items.push(item);
            }
        }
        if let Some(id) = self.selected.as_deref() {
            if !self.contains(id) {
                self.selected = None;
            }
        }
    }

    fn position(&self, id: &str) -> Result<usize, SelectionError> {
        self.items
            .iter()
            .position(|item| item.id() == id)
            .ok_or_else(|| SelectionError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: String,
        label: String,
    }

    impl Identified for Item {
        fn id(&self) -> &str {
            &self.id
        }
    }

    struct Relabel(&'static str);

    impl Patch<Item> for Relabel {
        fn apply(self, target: &mut Item) {
            target.label = self.0.to_string();
        }
    }

    fn item(id: &str) -> Item {
        Item {
            id: id.to_string(),
            label: id.to_string(),
        }
    }

    #[test]
    fn selecting_replaces_previous_selection() {
        let mut state = SelectionState::with_items(vec![item("a"), item("b")]);
        state.select("a").unwrap();
        state.select("b").unwrap();
        assert_eq!(state.selected_id(), Some("b"));
    }

    #[test]
    fn selecting_missing_id_keeps_selection() {
        let mut state = SelectionState::with_items(vec![item("a")]);
        state.select("a").unwrap();
        assert_eq!(
            state.select("zzz").unwrap_err(),
            SelectionError::NotFound("zzz".into())
        );
        assert_eq!(state.selected_id(), Some("a"));
    }

    #[test]
    fn update_selected_is_visible_in_collection() {
        let mut state = SelectionState::with_items(vec![item("a"), item("b")]);
        state.select("b").unwrap();
        state.update_selected(Relabel("edited"));
        assert_eq!(state.get("b").unwrap().label, "edited");
        assert_eq!(state.selected().unwrap().label, "edited");
    }

    #[test]
    fn update_selected_without_selection_is_noop() {
        let mut state = SelectionState::with_items(vec![item("a")]);
        assert!(state.update_selected(Relabel("x")).is_none());
        assert_eq!(state.get("a").unwrap().label, "a");
    }

    #[test]
    fn removing_selected_clears_selection() {
        let mut state = SelectionState::with_items(vec![item("a"), item("b")]);
        state.select("a").unwrap();
        state.remove("b");
        assert_eq!(state.selected_id(), Some("a"));
        state.remove("a");
        assert!(state.selected().is_none());
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut state = SelectionState::with_items(vec![item("a")]);
        assert!(state.insert(item("a")).is_err());
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn replace_all_keeps_present_selection_only() {
        let mut state = SelectionState::with_items(vec![item("a"), item("b")]);
        state.select("a").unwrap();
        state.replace_all(vec![item("a"), item("c")]);
        assert_eq!(state.selected_id(), Some("a"));
        state.replace_all(vec![item("c")]);
        assert_eq!(state.selected_id(), None);
    }

    #[test]
    fn replace_all_drops_duplicate_ids() {
        let state = SelectionState::with_items(vec![item("a"), item("a"), item("b")]);
        assert_eq!(state.len(), 2);
    }

    proptest! {
        #[test]
        fn prop_last_selection_wins(count in 2usize..10, first in 0usize..10, second in 0usize..10) {
            let items: Vec<Item> = (0..count).map(|i| item(&i.to_string())).collect();
            let (a, b) = ((first % count).to_string(), (second % count).to_string());
            let mut state = SelectionState::with_items(items);
            state.select(&a).unwrap();
            state.select(&b).unwrap();
            prop_assert_eq!(state.selected_id(), Some(b.as_str()));
        }

        #[test]
        fn prop_removing_selected_clears(count in 1usize..10, pick in 0usize..10) {
            let items: Vec<Item> = (0..count).map(|i| item(&i.to_string())).collect();
            let id = (pick % count).to_string();
            let mut state = SelectionState::with_items(items);
            state.select(&id).unwrap();
            prop_assert!(state.remove(&id).is_some());
            prop_assert!(state.selected().is_none());
            prop_assert_eq!(state.len(), count - 1);
        }
    }
}
