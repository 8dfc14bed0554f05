use crate::cache::Bitmap;
use crate::id_generator::ElementId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryEventKind {
    AddElement,
    RemoveElement,
}

/// Source image of an added Image element, kept so redo does not decode again.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRef {
    pub data_url: String,
    pub bitmap: Option<Bitmap>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEvent {
    pub kind: HistoryEventKind,
    pub element_uid: ElementId,
    pub image: Option<ImageRef>,
}

impl HistoryEvent {
    pub fn add(element_uid: ElementId) -> Self {
        Self {
            kind: HistoryEventKind::AddElement,
            element_uid,
            image: None,
        }
    }

    pub fn remove(element_uid: ElementId) -> Self {
        Self {
            kind: HistoryEventKind::RemoveElement,
            element_uid,
            image: None,
        }
    }

    pub fn with_image(mut self, image: ImageRef) -> Self {
        self.image = Some(image);
        self
    }
}

/// Linear undo log with a pointer at the last applied event.
///
/// Undo and redo only move the pointer; a new event drops everything
/// after it.
#[derive(Debug, Clone, Default)]
pub struct History {
    events: Vec<HistoryEvent>,
    /// Number of applied events; the pointer is `applied - 1`.
    applied: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[HistoryEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Index of the last applied event.
    pub fn pointer(&self) -> Option<usize> {
        self.applied.checked_sub(1)
    }

    pub fn has_undo(&self) -> bool {
        self.applied > 0
    }

    pub fn has_redo(&self) -> bool {
        self.applied < self.events.len()
    }

    pub fn push(&mut self, event: HistoryEvent) {
        self.events.truncate(self.applied);
        self.events.push(event);
        self.applied = self.events.len();
    }

    /// Steps back over the event at the pointer and returns it.
    pub fn step_back(&mut self) -> Option<&HistoryEvent> {
        let index = self.pointer()?;
        self.applied = index;
        self.events.get(index)
    }

    /// Steps forward onto the next event and returns it.
    pub fn step_forward(&mut self) -> Option<&HistoryEvent> {
        let event = self.events.get(self.applied)?;
        self.applied += 1;
        Some(event)
    }

    /// Permanently discards the event at the pointer along with any redo tail.
    pub fn pop(&mut self) -> Option<HistoryEvent> {
        let index = self.pointer()?;
        self.events.truncate(index + 1);
        self.applied = index;
        self.events.pop()
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.applied = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(uid: &str) -> HistoryEvent {
        HistoryEvent::add(uid.into())
    }

    #[test]
    fn empty_history_has_nothing_to_do() {
        let mut history = History::new();
        assert!(!history.has_undo());
        assert!(!history.has_redo());
        assert!(history.step_back().is_none());
        assert!(history.step_forward().is_none());
        assert!(history.pop().is_none());
    }

    #[test]
    fn undo_then_redo_walks_the_same_event() {
        let mut history = History::new();
        history.push(add("a"));
        history.push(add("b"));

        assert_eq!(history.step_back().map(|e| e.element_uid.as_str()), Some("b"));
        assert!(history.has_redo());
        assert_eq!(history.step_forward().map(|e| e.element_uid.as_str()), Some("b"));
        assert!(!history.has_redo());
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn new_event_drops_redo_tail() {
        let mut history = History::new();
        history.push(add("a"));
        history.push(add("b"));
        history.step_back();

        history.push(add("c"));
        let uids: Vec<_> = history.events().iter().map(|e| e.element_uid.as_str()).collect();
        assert_eq!(uids, ["a", "c"]);
        assert!(!history.has_redo());
    }

    #[test]
    fn pop_discards_pointer_and_tail() {
        let mut history = History::new();
        history.push(add("a"));
        history.push(add("b"));
        history.push(add("c"));
        history.step_back();

        let popped = history.pop().unwrap();
        assert_eq!(popped.element_uid.as_str(), "b");
        assert_eq!(history.len(), 1);
        assert_eq!(history.pointer(), Some(0));
        assert!(!history.has_redo());
    }
}
