//! egui widgets for the interactive elements of a scene.
//!
//! Checkboxes and text boxes are not painted onto the canvas. They are laid
//! over it as real widgets at their view-relative placement, and user edits
//! come back as [`OverlayEdit`]s for the scene to apply.

use std::collections::HashMap;

use crate::element::{Element, Tool, ViewMatrix};
use crate::id_generator::ElementId;
use crate::scene::Scene;

const CHECKBOX_SIZE: egui::Vec2 = egui::vec2(24.0, 24.0);
const TEXTBOX_SIZE: egui::Vec2 = egui::vec2(200.0, 40.0);

/// A user edit made through the overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEdit {
    ToggleCheckbox(ElementId),
    SetText { uid: ElementId, text: Option<String> },
}

/// Screen rectangle of an interactive element, or `None` for canvas elements.
///
/// `origin` is the screen position of the page origin. Rotation is not
/// applied; egui widgets are axis aligned.
pub fn overlay_rect(
    element: &Element,
    current: &ViewMatrix,
    initial: &ViewMatrix,
    origin: egui::Pos2,
) -> Option<egui::Rect> {
    let base = match element.tool() {
        Tool::Checkbox => CHECKBOX_SIZE,
        Tool::Textbox => TEXTBOX_SIZE,
        _ => return None,
    };
    let placement = element.transform()?.relative_to(current, initial);

    Some(egui::Rect::from_min_size(
        origin + egui::vec2(placement.translate.x, placement.translate.y),
        egui::vec2(base.x * placement.scale[0], base.y * placement.scale[1]),
    ))
}

/// Keeps text edits in progress between frames.
#[derive(Debug, Default)]
pub struct InteractiveOverlay {
    pub view: ViewMatrix,
    pub initial_view: ViewMatrix,
    text_buffers: HashMap<ElementId, String>,
}

impl InteractiveOverlay {
    pub fn new(initial_view: ViewMatrix) -> Self {
        Self {
            view: initial_view,
            initial_view,
            text_buffers: HashMap::new(),
        }
    }

    /// Shows every active interactive element and returns the edits made this frame.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        scene: &Scene,
        origin: egui::Pos2,
    ) -> Vec<OverlayEdit> {
        let mut edits = Vec::new();

        for element in scene.active_html_elements() {
            let Some(rect) = overlay_rect(element, &self.view, &self.initial_view, origin) else {
                continue;
            };
            let uid = element.uid();

            match element.tool() {
                Tool::Checkbox => {
                    let mut checked = element.settings().is_checked();
                    if ui.put(rect, egui::Checkbox::new(&mut checked, "")).changed() {
                        edits.push(OverlayEdit::ToggleCheckbox(uid.clone()));
                    }
                }
                Tool::Textbox => {
                    let buffer = self.text_buffers.entry(uid.clone()).or_insert_with(|| {
                        element.settings().text_contents().unwrap_or_default().to_owned()
                    });
                    let response = ui.put(
                        rect,
                        egui::TextEdit::multiline(&mut *buffer).desired_width(rect.width()),
                    );
                    if response.changed() {
                        edits.push(OverlayEdit::SetText {
                            uid: uid.clone(),
                            text: (!buffer.is_empty()).then(|| buffer.clone()),
                        });
                    }
                }
                _ => {}
            }
        }

        edits
    }

    /// Forgets text buffers of elements that are no longer shown.
    pub fn retain_visible(&mut self, scene: &Scene) {
        self.text_buffers.retain(|uid, _| {
            scene
                .element(uid)
                .is_some_and(|element| !element.is_hidden())
        });
    }
}
