use wavelane_core::config::EditorConfig;
use wavelane_core::selection::{ClipZone, RangeTarget};
use wavelane_core::timeline::{ClipId, GroupId};
use wavelane_editor::editor::Editor;
use wavelane_editor::message::{Key, Modifiers};
use wavelane_editor::test_helpers::*;
use wavelane_test_harness::assertions::*;
use wavelane_test_harness::builders::*;
use wavelane_test_harness::fixtures::{init_test_logging, waveform_for_secs};

/// `a` at [0, 5) and `b` at [10, 15); 20px per second at zoom 1.
fn two_clip_editor() -> Editor {
    init_test_logging();
    let timeline = single_track(&[("a", 0.0, 5.0), ("b", 10.0, 15.0)]).build_timeline();
    Editor::with_timeline(EditorConfig::default(), timeline).unwrap()
}

fn grouped_editor() -> Editor {
    init_test_logging();
    let timeline = single_track(&[("x", 0.0, 5.0), ("y", 5.0, 9.0)])
        .with_group("g1", &["x", "y"], true)
        .build_timeline();
    Editor::with_timeline(EditorConfig::default(), timeline).unwrap()
}

fn span(editor: &Editor, id: &str) -> (f64, f64) {
    let clip = editor.state().timeline.find_clip(&ClipId::from(id)).unwrap();
    (clip.start_time, clip.end_time)
}

#[test]
fn test_header_click_selects_clip() {
    let mut editor = two_clip_editor();
    editor.update(press_clip("a", ClipZone::Header, 50.0));
    editor.update(move_to(53.0));
    editor.update(release_at(53.0));

    assert_eq!(editor.state().selected_clips.ids(), &[ClipId::from("a")]);
    assert_eq!(span(&editor, "a"), (0.0, 5.0));
    assert_selection_exists(editor.state());
}

#[test]
fn test_command_click_extends_selection() {
    let mut editor = two_clip_editor();
    editor.update(press_clip("a", ClipZone::Header, 50.0));
    editor.update(release_at(50.0));
    editor.update(press_clip_with("b", ClipZone::Header, 250.0, Modifiers::command()));
    editor.update(release_at(250.0));

    assert_eq!(editor.state().selected_clips.len(), 2);
}

#[test]
fn test_header_drag_moves_clip_live() {
    let mut editor = two_clip_editor();
    editor.update(press_clip("a", ClipZone::Header, 50.0));
    assert_eq!(editor.pointer_listeners().active(), 1);

    editor.update(move_to(70.0));
    assert_eq!(span(&editor, "a"), (1.0, 6.0));
    editor.update(move_to(90.0));
    assert_eq!(span(&editor, "a"), (2.0, 7.0));

    editor.update(release_at(90.0));
    assert_eq!(editor.pointer_listeners().active(), 0);
    assert!(!editor.drag().is_active());
    assert_state_invariants(editor.state());
}

#[test]
fn test_drag_snaps_and_clears_indicator_on_drop() {
    let mut editor = two_clip_editor();
    editor.update(press_clip("b", ClipZone::Header, 250.0));
    editor.update(move_to(152.0));

    assert_eq!(span(&editor, "b"), (5.0, 10.0));
    assert!(editor.snap_state().is_snapping());
    editor.update(release_at(152.0));
    assert!(!editor.snap_state().is_snapping());
}

#[test]
fn test_edge_drag_trims() {
    let mut editor = two_clip_editor();
    editor.update(press_clip("b", ClipZone::EndEdge, 300.0));
    editor.update(move_to(260.0));
    editor.update(release_at(260.0));
    assert_eq!(span(&editor, "b"), (10.0, 13.0));

    editor.update(press_clip("b", ClipZone::StartEdge, 200.0));
    editor.update(move_to(220.0));
    editor.update(release_at(220.0));
    assert_eq!(span(&editor, "b"), (11.0, 13.0));
    let b = editor.state().timeline.find_clip(&"b".into()).unwrap();
    assert_eq!(b.source_start_offset, 1.0);
    assert_durations_consistent(&editor.state().timeline);
}

#[test]
fn test_background_click_moves_playhead_and_clears_selection() {
    let mut editor = two_clip_editor();
    editor.update(press_clip("a", ClipZone::Header, 50.0));
    editor.update(release_at(50.0));

    editor.update(press_background(100.0));
    assert!(editor.state().selected_clips.is_empty());
    assert_eq!(editor.state().playhead_position, 5.0);

    editor.update(move_to(200.0));
    assert_eq!(editor.state().playhead_position, 10.0);
    editor.update(release_at(200.0));
    assert_eq!(editor.pointer_listeners().active(), 0);
}

#[test]
fn test_body_drag_selects_range() {
    let mut editor = two_clip_editor();
    editor.update(press_clip("a", ClipZone::Body, 20.0));
    editor.update(move_to(80.0));
    editor.update(release_at(80.0));

    let range = editor.range_selection().unwrap();
    assert_eq!(range.target, RangeTarget::Clip("a".into()));
    assert_eq!((range.start_offset, range.end_offset), (1.0, 4.0));
    assert!(editor.state().selected_clips.is_empty());
}

#[test]
fn test_pressing_another_clip_drops_old_range() {
    let mut editor = two_clip_editor();
    editor.update(press_clip("a", ClipZone::Body, 20.0));
    editor.update(move_to(60.0));
    editor.update(release_at(60.0));
    assert!(editor.range_selection().is_some());

    editor.update(press_clip("b", ClipZone::Header, 210.0));
    editor.update(release_at(210.0));
    assert!(editor.range_selection().is_none());
    assert_eq!(editor.state().selected_clips.ids(), &[ClipId::from("b")]);

    editor.update(key(Key::Delete));
    assert_eq!(span(&editor, "a"), (0.0, 5.0));
    assert!(editor.state().timeline.find_clip(&ClipId::from("b")).is_none());
}

#[test]
fn test_body_press_on_other_clip_drops_old_range() {
    let mut editor = two_clip_editor();
    editor.update(press_clip("a", ClipZone::Body, 20.0));
    editor.update(move_to(60.0));
    editor.update(release_at(60.0));

    editor.update(press_clip("b", ClipZone::Body, 220.0));
    assert!(editor.range_selection().is_none());
    editor.update(release_at(220.0));
    editor.update(command_key('s'));
    assert_eq!(span(&editor, "a"), (0.0, 5.0));
}

#[test]
fn test_trim_then_split_keeps_samples_aligned() {
    init_test_logging();
    let timeline = StateBuilder::new()
        .with_track(
            TrackBuilder::audio("t1")
                .with_clip(ClipBuilder::new("take").span(0.0, 10.0).waveform(waveform_for_secs(10.0))),
        )
        .build_timeline();
    let mut editor = Editor::with_timeline(EditorConfig::default(), timeline).unwrap();

    editor.update(press_clip("take", ClipZone::StartEdge, 0.0));
    editor.update(move_to(40.0));
    editor.update(release_at(40.0));
    let take = editor.state().timeline.find_clip(&ClipId::from("take")).unwrap();
    assert_eq!((take.start_time, take.source_start_offset), (2.0, 2.0));
    assert_eq!(take.waveform_data.len(), 80);
    assert_eq!(take.waveform_data[0], 20.0);

    editor.update(press_background(120.0));
    editor.update(release_at(120.0));
    editor.update(command_key('s'));

    let timeline = &editor.state().timeline;
    let left = timeline.find_clip(&ClipId::from("take-left")).unwrap();
    let right = timeline.find_clip(&ClipId::from("take-right")).unwrap();
    assert_eq!((left.start_time, left.end_time), (2.0, 6.0));
    assert_eq!(left.waveform_data.len(), 40);
    assert_eq!(left.waveform_data.first(), Some(&20.0));
    assert_eq!(left.waveform_data.last(), Some(&59.0));
    assert_eq!(right.waveform_data.len(), 40);
    assert_eq!(right.waveform_data.first(), Some(&60.0));
    assert_durations_consistent(timeline);
}

#[test]
fn test_body_click_without_travel_selects_clip() {
    let mut editor = two_clip_editor();
    editor.update(press_clip("a", ClipZone::Body, 20.0));
    editor.update(move_to(22.0));
    editor.update(release_at(22.0));

    assert!(editor.range_selection().is_none());
    assert_eq!(editor.state().selected_clips.ids(), &[ClipId::from("a")]);
}

#[test]
fn test_shift_starts_range_immediately() {
    let mut editor = two_clip_editor();
    editor.update(press_clip_with("a", ClipZone::Body, 20.0, Modifiers::shift()));
    editor.update(move_to(22.0));
    editor.update(release_at(22.0));

    let range = editor.range_selection().unwrap();
    assert!((range.width() - 0.1).abs() < 1e-9);
}

#[test]
fn test_range_in_collapsed_group_targets_group() {
    let mut editor = grouped_editor();
    editor.update(press_clip("y", ClipZone::Body, 120.0));
    editor.update(move_to(160.0));
    editor.update(release_at(160.0));

    let range = editor.range_selection().unwrap().clone();
    assert_eq!(range.target, RangeTarget::Group("g1".into()));
    assert_eq!((range.start_offset, range.end_offset), (6.0, 8.0));

    editor.update(key(Key::Delete));
    let state = editor.state();
    assert_eq!(span(&editor, "x"), (0.0, 5.0));
    assert_eq!(span(&editor, "y-before"), (5.0, 6.0));
    assert_eq!(span(&editor, "y-after"), (8.0, 9.0));
    assert_eq!(state.groups()[0].clip_ids.len(), 3);
    assert_group_links_consistent(&state.timeline);
    assert!(editor.range_selection().is_none());
}

#[test]
fn test_group_header_drags_whole_group() {
    let mut editor = grouped_editor();
    editor.update(press_group("g1", 50.0));
    assert_eq!(editor.state().selected_clips.len(), 2);

    editor.update(move_to(90.0));
    editor.update(release_at(90.0));
    assert_eq!(span(&editor, "x"), (2.0, 7.0));
    assert_eq!(span(&editor, "y"), (7.0, 11.0));
}

#[test]
fn test_clicking_grouped_clip_drags_all_members() {
    let mut editor = grouped_editor();
    editor.update(press_clip("y", ClipZone::Header, 150.0));
    editor.update(move_to(190.0));
    editor.update(release_at(190.0));

    assert_eq!(span(&editor, "x"), (2.0, 7.0));
    assert_eq!(span(&editor, "y"), (7.0, 11.0));
    assert_eq!(
        editor.state().timeline.find_clip(&"y".into()).unwrap().group_id,
        Some(GroupId::from("g1"))
    );
}

#[test]
fn test_button_press_is_ignored() {
    let mut editor = two_clip_editor();
    editor.update(wavelane_editor::message::Message::PointerDown {
        chain: vec![wavelane_core::selection::TargetMarker::Button],
        position: wavelane_core::drag::Point::new(10.0, 10.0),
        modifiers: Modifiers::NONE,
    });
    assert!(!editor.drag().is_active());
    assert_eq!(editor.state().playhead_position, 0.0);
}

#[test]
fn test_teardown_releases_listeners() {
    let mut editor = two_clip_editor();
    editor.update(press_clip("a", ClipZone::Header, 50.0));
    assert_eq!(editor.pointer_listeners().active(), 1);
    editor.update(wavelane_editor::message::Message::Teardown);
    assert_eq!(editor.pointer_listeners().active(), 0);
}
