//! One page worth of elements, their visibility and the undo log.
//!
//! Elements are never removed: deleting hides them so undo can bring them
//! back. Visible ClearAll elements act as barriers; only what was created
//! after the last of them is active.

use std::collections::HashMap;

mod history;

pub use history::{History, HistoryEvent, HistoryEventKind, ImageRef};

use crate::config::SceneConfig;
use crate::element::record::ElementRecord;
use crate::element::{Element, PageId, Tool};
use crate::error::SceneError;
use crate::geometry::{Point, hit_test};
use crate::id_generator::ElementId;
use crate::overlay::OverlayEdit;
use crate::renderer::{self, DrawOptions, Surface};

/// A persisted record that could not be hydrated.
#[derive(Debug)]
pub struct Rejected {
    pub uid: Option<String>,
    pub error: SceneError,
}

#[derive(Debug, Default)]
pub struct Scene {
    page_id: PageId,
    elements: HashMap<ElementId, Element>,
    element_order: Vec<ElementId>,
    /// Positions in `element_order` of visible ClearAll elements, ascending.
    clear_all_indexes: Vec<usize>,
    history: History,
    config: SceneConfig,
}

impl Scene {
    pub fn new(page_id: impl Into<PageId>) -> Self {
        Self::with_config(page_id, SceneConfig::default())
    }

    pub fn with_config(page_id: impl Into<PageId>, config: SceneConfig) -> Self {
        Self {
            page_id: page_id.into(),
            config,
            ..Self::default()
        }
    }

    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.element_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.element_order.is_empty()
    }

    pub fn element_order(&self) -> &[ElementId] {
        &self.element_order
    }

    pub fn clear_all_indexes(&self) -> &[usize] {
        &self.clear_all_indexes
    }

    pub fn element(&self, uid: &ElementId) -> Option<&Element> {
        self.elements.get(uid)
    }

    pub fn element_mut(&mut self, uid: &ElementId) -> Option<&mut Element> {
        self.elements.get_mut(uid)
    }

    /// Every element in creation order, hidden ones included.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.element_order
            .iter()
            .filter_map(|uid| self.elements.get(uid))
    }

    /// Adds an element without recording history.
    pub fn set_element(&mut self, element: Element) -> Result<(), SceneError> {
        let uid = element.uid().clone();
        if self.elements.contains_key(&uid) {
            return Err(SceneError::DuplicateElement(uid));
        }

        let is_barrier = element.tool() == Tool::ClearAll && !element.is_hidden();
        self.element_order.push(uid.clone());
        self.elements.insert(uid, element);
        if is_barrier {
            self.register_clear_all(self.element_order.len() - 1);
        }
        Ok(())
    }

    /// Commits a finished element: appends it, shows it and records the addition.
    pub fn create_element(&mut self, mut element: Element) -> Result<ElementId, SceneError> {
        if matches!(element.tool(), Tool::Pointer | Tool::Paper) {
            return Err(SceneError::NotDrawable(element.tool()));
        }

        if element.canvas_settings().dpi != self.config.device_pixel_ratio {
            element.set_device_pixel_ratio(self.config.device_pixel_ratio);
        }
        if self.config.cache_elements
            && !element.is_html_element()
            && !element.tool().is_bitmap_backed()
        {
            if let Err(err) = element.rasterize() {
                log::debug!("Element {} left uncached: {}", element.uid(), err);
            }
        }

        let uid = element.uid().clone();
        let mut event = HistoryEvent::add(uid.clone());
        if element.tool() == Tool::Image {
            if let Some(data_url) = element.settings().image_data_url() {
                event = event.with_image(ImageRef {
                    data_url: data_url.to_owned(),
                    bitmap: element.cached_bitmap().cloned(),
                });
            }
        }

        self.set_element(element)?;
        self.show_element(&uid)?;
        self.add_history_event(event);
        log::debug!("Created element {uid}");
        Ok(uid)
    }

    /// Hides an element, optionally recording the removal for undo.
    pub fn delete_element(
        &mut self,
        uid: &ElementId,
        track_history: bool,
    ) -> Result<(), SceneError> {
        self.hide_element(uid)?;
        if track_history {
            self.add_history_event(HistoryEvent::remove(uid.clone()));
        }
        log::debug!("Deleted element {uid}");
        Ok(())
    }

    pub fn show_element(&mut self, uid: &ElementId) -> Result<(), SceneError> {
        let element = self
            .elements
            .get_mut(uid)
            .ok_or_else(|| SceneError::UnknownElement(uid.clone()))?;
        element.set_hidden(false);

        if element.tool() == Tool::ClearAll {
            if let Some(index) = self.position(uid) {
                self.register_clear_all(index);
            }
        }
        log::debug!("Showing element {uid}");
        Ok(())
    }

    pub fn hide_element(&mut self, uid: &ElementId) -> Result<(), SceneError> {
        let element = self
            .elements
            .get_mut(uid)
            .ok_or_else(|| SceneError::UnknownElement(uid.clone()))?;
        element.set_hidden(true);

        if element.tool() == Tool::ClearAll {
            if let Some(index) = self.position(uid) {
                self.clear_all_indexes.retain(|&i| i != index);
            }
        }
        log::debug!("Hiding element {uid}");
        Ok(())
    }

    /// Position of the last visible ClearAll, or 0 when there is none.
    pub fn active_elements_start_index(&self) -> usize {
        self.clear_all_indexes.last().copied().unwrap_or(0)
    }

    /// Visible elements created after the last visible ClearAll, in creation order.
    pub fn active_elements(&self) -> impl Iterator<Item = &Element> {
        let start = match self.clear_all_indexes.last() {
            Some(&barrier) => barrier + 1,
            None => 0,
        };
        self.element_order
            .iter()
            .skip(start)
            .filter_map(|uid| self.elements.get(uid))
            .filter(|element| !element.is_hidden())
    }

    pub fn active_html_elements(&self) -> impl Iterator<Item = &Element> {
        self.active_elements()
            .filter(|element| element.is_html_element())
    }

    pub fn last_active_element_id(&self) -> Option<&ElementId> {
        self.active_elements().last().map(Element::uid)
    }

    /// Topmost active element under `point`.
    pub fn element_at(&self, point: Point) -> Option<&ElementId> {
        let tolerance = self.config.hit_tolerance;
        let active: Vec<&Element> = self.active_elements().collect();
        active
            .into_iter()
            .rev()
            .find(|element| hit_test(element, point, tolerance))
            .map(Element::uid)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn add_history_event(&mut self, event: HistoryEvent) {
        self.history.push(event);
    }

    /// Drops the event at the history pointer, and any redo tail, without
    /// applying anything.
    pub fn pop_history_event(&mut self) -> Option<HistoryEvent> {
        self.history.pop()
    }

    pub fn has_undo(&self) -> bool {
        self.history.has_undo()
    }

    pub fn has_redo(&self) -> bool {
        self.history.has_redo()
    }

    /// Reverts the event at the history pointer. Returns `false` when there
    /// is nothing to undo.
    pub fn undo(&mut self) -> Result<bool, SceneError> {
        let Some(event) = self.history.step_back().cloned() else {
            return Ok(false);
        };
        log::debug!("Undo {:?} of {}", event.kind, event.element_uid);

        match event.kind {
            HistoryEventKind::AddElement => self.hide_element(&event.element_uid)?,
            HistoryEventKind::RemoveElement => self.show_element(&event.element_uid)?,
        }
        Ok(true)
    }

    /// Re-applies the event after the history pointer. Returns `false` when
    /// there is nothing to redo.
    pub fn redo(&mut self) -> Result<bool, SceneError> {
        let Some(event) = self.history.step_forward().cloned() else {
            return Ok(false);
        };
        log::debug!("Redo {:?} of {}", event.kind, event.element_uid);

        match event.kind {
            HistoryEventKind::AddElement => {
                self.show_element(&event.element_uid)?;
                self.restore_image(&event);
            }
            HistoryEventKind::RemoveElement => self.hide_element(&event.element_uid)?,
        }
        Ok(true)
    }

    /// Hydrates persisted records. Records that fail are reported back and
    /// skipped; the rest are loaded clean and without history.
    pub fn load_records<'a>(
        &mut self,
        records: impl IntoIterator<Item = &'a ElementRecord>,
    ) -> Vec<Rejected> {
        let mut rejected = Vec::new();

        for record in records {
            let result = Element::from_record(record).and_then(|element| self.set_element(element));
            if let Err(error) = result {
                log::warn!("Skipping element record {:?}: {}", record.uid, error);
                rejected.push(Rejected {
                    uid: record.uid.clone(),
                    error,
                });
            }
        }

        log::info!(
            "Page {} holds {} elements after hydration ({} rejected)",
            self.page_id,
            self.elements.len(),
            rejected.len()
        );
        rejected
    }

    /// Persisted form of every unsaved element, in creation order. The
    /// elements are clean afterwards.
    pub fn take_dirty_batch(&mut self) -> Result<Vec<ElementRecord>, SceneError> {
        let mut batch = Vec::new();
        for uid in &self.element_order {
            let Some(element) = self.elements.get_mut(uid) else {
                continue;
            };
            if element.is_dirty() {
                batch.push(element.to_batch_format()?);
                element.mark_clean();
            }
        }
        Ok(batch)
    }

    pub fn toggle_checkbox(&mut self, uid: &ElementId) -> Result<bool, SceneError> {
        self.require_mut(uid)?.toggle_checked()
    }

    pub fn set_text_contents(
        &mut self,
        uid: &ElementId,
        text: Option<String>,
    ) -> Result<(), SceneError> {
        self.require_mut(uid)?.set_text_contents(text)
    }

    pub fn complete_cut(&mut self, uid: &ElementId) -> Result<(), SceneError> {
        self.require_mut(uid)?.complete_cut()
    }

    pub fn apply_overlay_edit(&mut self, edit: OverlayEdit) -> Result<(), SceneError> {
        match edit {
            OverlayEdit::ToggleCheckbox(uid) => self.toggle_checkbox(&uid).map(|_| ()),
            OverlayEdit::SetText { uid, text } => self.set_text_contents(&uid, text),
        }
    }

    /// Starts decoding every cached bitmap that is not decoded yet.
    pub fn request_bitmap_decodes(&mut self) -> usize {
        self.elements
            .values_mut()
            .filter(|element| element.is_cached())
            .map(|element| element.request_bitmap_decode())
            .filter(|&started| started)
            .count()
    }

    /// Picks up finished decodes; returns how many bitmaps became ready.
    pub fn poll_bitmaps(&mut self) -> usize {
        self.elements
            .values_mut()
            .filter(|element| element.is_decode_pending())
            .map(|element| element.poll_bitmap())
            .filter(|&ready| ready)
            .count()
    }

    /// Draws every active canvas element in creation order.
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S, options: DrawOptions) {
        for element in self.active_elements() {
            renderer::draw(surface, element, options);
        }
    }

    fn require_mut(&mut self, uid: &ElementId) -> Result<&mut Element, SceneError> {
        self.elements
            .get_mut(uid)
            .ok_or_else(|| SceneError::UnknownElement(uid.clone()))
    }

    fn position(&self, uid: &ElementId) -> Option<usize> {
        self.element_order.iter().position(|candidate| candidate == uid)
    }

    fn register_clear_all(&mut self, index: usize) {
        if let Err(slot) = self.clear_all_indexes.binary_search(&index) {
            self.clear_all_indexes.insert(slot, index);
        }
    }

    fn restore_image(&mut self, event: &HistoryEvent) {
        let Some(ImageRef {
            bitmap: Some(bitmap),
            ..
        }) = &event.image
        else {
            return;
        };
        if let Some(element) = self.elements.get_mut(&event.element_uid) {
            if element.cached_bitmap().is_none() {
                element.install_bitmap(bitmap.clone());
            }
        }
    }
}
