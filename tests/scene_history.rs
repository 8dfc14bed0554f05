use canvas_scene::element::ImageRect;
use canvas_scene::geometry::Bounds;
use canvas_scene::{
    Bitmap, ElementId, ElementStyle, HistoryEvent, HistoryEventKind, Point, Scene, SceneError, Tool,
    factory,
};

// Helper to add a small rectangle at `offset`
fn add_rect(scene: &mut Scene, offset: f32) -> ElementId {
    let element = factory::create(
        scene.page_id(),
        Tool::Rectangle,
        vec![Point::new(offset, offset), Point::new(offset + 10.0, offset + 10.0)],
        ElementStyle::default(),
    );
    scene.create_element(element).unwrap()
}

fn add_clear_all(scene: &mut Scene) -> ElementId {
    let element = factory::clear_all(scene.page_id(), Bounds::new(0.0, 0.0, 500.0, 500.0));
    scene.create_element(element).unwrap()
}

fn active_uids(scene: &Scene) -> Vec<ElementId> {
    scene.active_elements().map(|e| e.uid().clone()).collect()
}

#[test]
fn test_clear_all_hides_everything_before_it() {
    let mut scene = Scene::new("page");
    for i in 0..5 {
        add_rect(&mut scene, i as f32);
    }
    let barrier = add_clear_all(&mut scene);
    let later = vec![add_rect(&mut scene, 20.0), add_rect(&mut scene, 30.0)];

    assert_eq!(scene.element_order()[5], barrier);
    assert_eq!(scene.active_elements_start_index(), 5);
    assert_eq!(active_uids(&scene), later);
}

#[test]
fn test_undo_create_removes_element_and_redo_restores_it() {
    let mut scene = Scene::new("page");
    let uid = add_rect(&mut scene, 0.0);

    assert!(scene.has_undo());
    assert!(scene.undo().unwrap());
    assert!(active_uids(&scene).is_empty());
    assert!(!scene.has_undo());
    assert!(scene.has_redo());

    assert!(scene.redo().unwrap());
    assert_eq!(active_uids(&scene), vec![uid]);
    assert!(!scene.has_redo());
}

#[test]
fn test_undo_past_the_start_is_a_no_op() {
    let mut scene = Scene::new("page");
    assert!(!scene.undo().unwrap());
    assert!(!scene.redo().unwrap());
}

#[test]
fn test_new_action_clears_redo_tail() {
    let mut scene = Scene::new("page");
    let first = add_rect(&mut scene, 0.0);
    add_rect(&mut scene, 10.0);
    scene.undo().unwrap();
    assert!(scene.has_redo());

    let third = add_rect(&mut scene, 20.0);
    assert!(!scene.has_redo());
    assert!(!scene.redo().unwrap());
    assert_eq!(active_uids(&scene), vec![first, third]);
}

#[test]
fn test_undo_delete_shows_element_again() {
    let mut scene = Scene::new("page");
    let uid = add_rect(&mut scene, 0.0);
    scene.delete_element(&uid, true).unwrap();
    assert!(active_uids(&scene).is_empty());

    scene.undo().unwrap();
    assert_eq!(active_uids(&scene), vec![uid.clone()]);

    scene.redo().unwrap();
    assert!(active_uids(&scene).is_empty());
    // Deleted elements stay in the scene.
    assert!(scene.element(&uid).is_some_and(|e| e.is_hidden()));
}

#[test]
fn test_undoing_clear_all_revives_earlier_elements() {
    let mut scene = Scene::new("page");
    let before = add_rect(&mut scene, 0.0);
    add_clear_all(&mut scene);
    assert!(active_uids(&scene).is_empty());

    scene.undo().unwrap();
    assert_eq!(active_uids(&scene), vec![before]);
    assert!(scene.clear_all_indexes().is_empty());

    scene.redo().unwrap();
    assert!(active_uids(&scene).is_empty());
    assert_eq!(scene.clear_all_indexes(), [1]);
}

#[test]
fn test_pop_history_event_discards_without_applying() {
    let mut scene = Scene::new("page");
    let first = add_rect(&mut scene, 0.0);
    let second = add_rect(&mut scene, 10.0);

    let popped = scene.pop_history_event().unwrap();
    assert_eq!(popped.kind, HistoryEventKind::AddElement);
    assert_eq!(popped.element_uid, second);

    // The element itself is untouched, but its creation can no longer be undone.
    assert_eq!(active_uids(&scene), vec![first.clone(), second]);
    scene.undo().unwrap();
    assert!(!scene.has_undo());
    assert!(!active_uids(&scene).contains(&first));

    // Only the first creation is left to redo.
    assert!(scene.redo().unwrap());
    assert!(!scene.has_redo());
    assert_eq!(scene.history().len(), 1);
}

#[test]
fn test_history_events_can_be_added_directly() {
    let mut scene = Scene::new("page");
    let uid = add_rect(&mut scene, 0.0);
    scene.hide_element(&uid).unwrap();
    scene.add_history_event(HistoryEvent::remove(uid.clone()));

    scene.undo().unwrap();
    assert_eq!(active_uids(&scene), vec![uid]);
}

#[test]
fn test_image_creation_captures_its_source() {
    let mut pixmap = tiny_skia::Pixmap::new(2, 2).unwrap();
    pixmap.fill(tiny_skia::Color::BLACK);
    let url = Bitmap::new(pixmap).to_data_url().unwrap();

    let mut scene = Scene::new("page");
    let rect = ImageRect {
        left: 0.0,
        top: 0.0,
        width: 2.0,
        height: 2.0,
    };
    scene
        .create_element(factory::image("page", url.clone(), rect))
        .unwrap();

    let event = &scene.history().events()[0];
    assert_eq!(event.image.as_ref().map(|image| image.data_url.as_str()), Some(url.as_str()));
}

#[test]
fn test_interactive_edits_mark_elements_dirty() {
    let mut scene = Scene::new("page");
    let checkbox = scene
        .create_element(factory::checkbox("page", Point::new(0.0, 0.0), false))
        .unwrap();
    let textbox = scene
        .create_element(factory::textbox("page", Point::new(0.0, 40.0), None))
        .unwrap();
    scene.take_dirty_batch().unwrap();

    assert!(scene.toggle_checkbox(&checkbox).unwrap());
    scene.set_text_contents(&textbox, Some("notes".into())).unwrap();

    let batch = scene.take_dirty_batch().unwrap();
    assert_eq!(batch.len(), 2);
    assert!(batch[1].settings.as_deref().is_some_and(|s| s.contains("notes")));

    assert_eq!(
        scene.active_html_elements().count(),
        2,
        "both widgets are interactive"
    );
    assert!(matches!(
        scene.toggle_checkbox(&textbox),
        Err(SceneError::WrongTool {
            expected: Tool::Checkbox,
            found: Tool::Textbox
        })
    ));
}

#[test]
fn test_completing_a_cut_switches_it_to_erase() {
    let mut scene = Scene::new("page");
    let cut = factory::create(
        "page",
        Tool::Cut,
        vec![Point::new(0.0, 0.0), Point::new(40.0, 0.0), Point::new(20.0, 30.0)],
        ElementStyle::default(),
    );
    let uid = scene.create_element(cut).unwrap();
    scene.complete_cut(&uid).unwrap();

    let cut = scene.element(&uid).unwrap();
    assert!(cut.settings().is_completed_cut());
    assert_eq!(
        cut.composition(),
        canvas_scene::element::Composition::DestinationOut
    );
}

#[test]
fn test_hydrated_scene_reports_rejects() {
    let mut source = Scene::new("page");
    let kept = add_rect(&mut source, 0.0);
    source.element_mut(&kept).unwrap().set_api_uid("server-1".into());
    let mut records = source.take_dirty_batch().unwrap();

    let mut broken = records[0].clone();
    broken.uid = Some("server-2".into());
    broken.points = Some("not json".into());
    let mut unknown = records[0].clone();
    unknown.uid = Some("server-3".into());
    unknown.tool = 404;
    records.extend([broken, unknown]);

    let mut scene = Scene::new("page");
    let rejected = scene.load_records(&records);

    assert_eq!(rejected.len(), 2);
    assert!(matches!(rejected[0].error, SceneError::MalformedRecord { field: "points", .. }));
    assert!(matches!(rejected[1].error, SceneError::InvalidTool(404)));
    assert_eq!(scene.len(), 1);
    assert!(!scene.has_undo());
    assert!(scene.take_dirty_batch().unwrap().is_empty());
}
