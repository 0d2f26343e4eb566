use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use wavelane_core::config::EditorConfig;
use wavelane_core::selection::ClipZone;
use wavelane_core::state::TimelineState;
use wavelane_core::timeline::{ClipId, TrackId, TrackType};
use wavelane_core::zoom::ZoomPhase;
use wavelane_editor::editor::Editor;
use wavelane_editor::message::{Key, KeyPress, Message, Modifiers};
use wavelane_editor::test_helpers::*;
use wavelane_test_harness::assertions::*;
use wavelane_test_harness::builders::*;
use wavelane_test_harness::fixtures::{
    FIXTURE_SAMPLE_RATE, FakeAudioLoader, init_test_logging, placeholder_files, waveform_for_secs,
};

fn editor_with(spans: &[(&str, f64, f64)]) -> Editor {
    init_test_logging();
    Editor::with_timeline(EditorConfig::default(), single_track(spans).build_timeline()).unwrap()
}

fn click(editor: &mut Editor, id: &str, modifiers: Modifiers) {
    editor.update(press_clip_with(id, ClipZone::Header, 10.0, modifiers));
    editor.update(release_at(10.0));
}

fn sorted_ids(editor: &Editor) -> Vec<String> {
    let mut ids: Vec<String> = editor.state().timeline.clips().map(|c| c.id.to_string()).collect();
    ids.sort();
    ids
}

#[test]
fn test_delete_key_removes_selection() {
    let mut editor = editor_with(&[("a", 0.0, 5.0), ("b", 5.0, 9.0)]);
    click(&mut editor, "a", Modifiers::NONE);
    editor.update(key(Key::Backspace));

    assert_eq!(sorted_ids(&editor), vec!["b"]);
    assert!(editor.state().selected_clips.is_empty());
}

#[test]
fn test_delete_with_nothing_selected_is_noop() {
    let mut editor = editor_with(&[("a", 0.0, 5.0)]);
    editor.update(key(Key::Delete));
    assert_eq!(sorted_ids(&editor), vec!["a"]);
}

#[test]
fn test_shortcuts_ignored_while_typing() {
    let mut editor = editor_with(&[("a", 0.0, 5.0)]);
    click(&mut editor, "a", Modifiers::NONE);

    let mut press = KeyPress::new(Key::Delete, Modifiers::NONE);
    press.text_input_focused = true;
    editor.update(Message::KeyPressed(press));
    assert_eq!(sorted_ids(&editor), vec!["a"]);
}

#[test]
fn test_split_shortcut_uses_playhead() {
    let mut editor = editor_with(&[("a", 0.0, 5.0), ("b", 5.0, 9.0)]);
    editor.update(press_background(60.0));
    editor.update(release_at(60.0));
    editor.update(command_key('s'));

    assert_eq!(sorted_ids(&editor), vec!["a-left", "a-right", "b"]);
    assert_time_eq(
        editor.state().timeline.find_clip(&"a-right".into()).unwrap().start_time,
        3.0,
    );
}

#[test]
fn test_split_shortcut_slices_waveform_and_offsets() {
    init_test_logging();
    let timeline = StateBuilder::new()
        .with_track(
            TrackBuilder::audio("t1").with_clip(
                ClipBuilder::new("take")
                    .span(0.0, 8.0)
                    .source_start(1.0)
                    .waveform(waveform_for_secs(8.0)),
            ),
        )
        .build_timeline();
    let mut editor = Editor::with_timeline(EditorConfig::default(), timeline).unwrap();
    editor.update(press_background(40.0));
    editor.update(release_at(40.0));
    editor.update(command_key('s'));

    let timeline = &editor.state().timeline;
    let left = timeline.find_clip(&"take-left".into()).unwrap();
    let right = timeline.find_clip(&"take-right".into()).unwrap();
    assert_eq!(left.source_start_offset, 1.0);
    assert_eq!(right.source_start_offset, 3.0);
    assert_eq!(left.waveform_data.len(), 2 * FIXTURE_SAMPLE_RATE);
    assert_eq!(right.waveform_data.len(), 6 * FIXTURE_SAMPLE_RATE);
    assert_eq!(right.waveform_data[0], (2 * FIXTURE_SAMPLE_RATE) as f32);
    assert_durations_consistent(timeline);
}

#[test]
fn test_split_shortcut_prefers_range() {
    let mut editor = editor_with(&[("a", 0.0, 5.0)]);
    editor.update(press_clip("a", ClipZone::Body, 20.0));
    editor.update(move_to(60.0));
    editor.update(release_at(60.0));
    editor.update(command_key('S'));

    assert_eq!(sorted_ids(&editor), vec!["a-after", "a-before"]);
    assert!(editor.range_selection().is_none());
}

#[test]
fn test_group_shortcut_toggles() {
    let mut editor = editor_with(&[("a", 0.0, 5.0), ("b", 5.0, 9.0)]);
    click(&mut editor, "a", Modifiers::NONE);
    click(&mut editor, "b", Modifiers::command());
    editor.update(command_key('g'));

    assert_eq!(editor.state().groups().len(), 1);
    assert!(editor.state().selected_clips.is_empty());
    assert_group_links_consistent(&editor.state().timeline);

    // A collapsed group member selects the whole group; the shortcut now ungroups.
    click(&mut editor, "a", Modifiers::NONE);
    assert!(editor.state().has_grouped_selection());
    editor.update(command_key('g'));
    assert!(editor.state().groups().is_empty());
}

#[test]
fn test_group_single_clip_is_silent() {
    let mut editor = editor_with(&[("a", 0.0, 5.0)]);
    click(&mut editor, "a", Modifiers::NONE);
    editor.update(command_key('g'));

    assert!(editor.state().groups().is_empty());
    assert!(editor.status_message.is_empty());
}

#[test]
fn test_escape_cancels_drag_and_clears_selection() {
    let mut editor = editor_with(&[("a", 0.0, 5.0), ("b", 20.0, 25.0)]);
    click(&mut editor, "b", Modifiers::NONE);
    editor.update(press_clip("b", ClipZone::Header, 410.0));
    editor.update(move_to(510.0));
    let moved = editor.state().timeline.find_clip(&"b".into()).unwrap().start_time;
    assert_eq!(moved, 25.0);

    editor.update(key(Key::Escape));
    let b = editor.state().timeline.find_clip(&"b".into()).unwrap();
    assert_eq!((b.start_time, b.end_time), (20.0, 25.0));
    assert!(editor.state().selected_clips.is_empty());
    assert!(!editor.drag().is_active());
    assert_eq!(editor.pointer_listeners().active(), 0);

    // The release after a cancelled drag does nothing.
    editor.update(release_at(510.0));
    assert!(editor.state().selected_clips.is_empty());
}

#[test]
fn test_space_toggles_playback_and_ticks_advance() {
    let mut editor = editor_with(&[("a", 0.0, 5.0)]);
    editor.update(Message::PlaybackTick(Duration::from_secs(1)));
    assert_eq!(editor.state().playhead_position, 0.0);

    editor.update(key(Key::Space));
    assert!(editor.state().is_playing);
    editor.update(Message::PlaybackTick(Duration::from_millis(500)));
    assert_eq!(editor.state().playhead_position, 0.5);

    editor.update(key(Key::Space));
    assert!(!editor.state().is_playing);
}

#[test]
fn test_set_zoom_is_clamped_into_state() {
    let mut editor = editor_with(&[]);
    editor.update(Message::SetZoom {
        level: 1_000.0,
        smooth: false,
        at: Instant::now(),
    });
    assert_eq!(editor.state().zoom_level, 20.0);
    assert_eq!(editor.zoom_phase(), ZoomPhase::Idle);
}

#[test]
fn test_zoom_in_animates_to_target() {
    let mut editor = editor_with(&[]);
    let t0 = Instant::now();
    editor.update(Message::ZoomIn(t0));
    assert_eq!(editor.zoom_phase(), ZoomPhase::Animating);

    editor.update(Message::AnimationFrame(t0 + Duration::from_secs(1)));
    assert_eq!(editor.zoom_phase(), ZoomPhase::Idle);
    assert_eq!(editor.state().zoom_level, 1.25);
}

#[test]
fn test_zoom_messages_replay_to_same_viewport() {
    let t0 = Instant::now();
    let script = [
        Message::ZoomIn(t0),
        Message::AnimationFrame(t0 + Duration::from_millis(50)),
        Message::Wheel {
            delta: -120.0,
            anchor_px: Some(200.0),
            zoom: true,
            at: t0 + Duration::from_millis(80),
        },
        Message::AnimationFrame(t0 + Duration::from_millis(120)),
    ];
    let run = || {
        let mut editor = editor_with(&[("a", 0.0, 5.0)]);
        for message in script.iter().cloned() {
            editor.update(message);
        }
        (editor.state().zoom_level, editor.state().viewport_offset)
    };
    let first = run();
    assert_eq!(first, run());
    assert!(first.0 > 1.0);
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = EditorConfig {
        min_zoom: 5.0,
        max_zoom: 1.0,
        ..EditorConfig::default()
    };
    assert!(Editor::new(config).is_err());
}

#[test]
fn test_wheel_without_modifier_scrolls() {
    let mut editor = editor_with(&[]);
    editor.update(Message::Wheel {
        delta: 50.0,
        anchor_px: None,
        zoom: false,
        at: Instant::now(),
    });
    assert_eq!(editor.state().viewport_offset, 50.0);

    editor.update(Message::Wheel {
        delta: -500.0,
        anchor_px: None,
        zoom: false,
        at: Instant::now(),
    });
    assert_eq!(editor.state().viewport_offset, 0.0);
}

#[test]
fn test_scrolled_view_maps_clicks_to_time() {
    let mut editor = editor_with(&[("a", 0.0, 5.0)]);
    editor.update(Message::Wheel {
        delta: 100.0,
        anchor_px: None,
        zoom: false,
        at: Instant::now(),
    });
    editor.update(press_background(100.0));
    editor.update(release_at(100.0));
    assert_eq!(editor.state().playhead_position, 10.0);
}

#[test]
fn test_import_files_appends_and_skips_failures() {
    init_test_logging();
    let timeline = StateBuilder::new()
        .with_track(TrackBuilder::audio("t1"))
        .build_timeline();
    let loader = FakeAudioLoader::new()
        .with_duration("kick.wav", 2.0)
        .failing("broken.wav");
    let mut editor = Editor::with_timeline(EditorConfig::default(), timeline)
        .unwrap()
        .with_loader(Box::new(loader));

    let (_dir, paths) = placeholder_files(&["kick.wav", "broken.wav", "snare.wav"]);
    editor.update(Message::ImportFiles {
        track_id: TrackId::from("t1"),
        paths,
    });

    assert_eq!(editor.status_message, "Imported 2 files, skipped 1");
    let names: Vec<&str> = editor.library.sources().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["kick", "snare"]);
    let track = &editor.state().tracks()[0];
    let mut clips: Vec<(&str, f64, f64)> = track
        .clips
        .iter()
        .map(|c| (c.name.as_str(), c.start_time, c.end_time))
        .collect();
    clips.sort_by(|a, b| a.1.total_cmp(&b.1));
    assert_eq!(clips, vec![("kick", 0.0, 2.0), ("snare", 2.0, 7.0)]);
    assert_state_invariants(editor.state());
}

#[test]
fn test_import_without_loader_reports() {
    let mut editor = editor_with(&[]);
    editor.update(Message::ImportFiles {
        track_id: TrackId::from("t1"),
        paths: vec!["/audio/a.wav".into()],
    });
    assert_eq!(editor.status_message, "No audio loader configured");
}

#[test]
fn test_import_to_missing_track_sets_status() {
    let mut editor = Editor::new(EditorConfig::default()).unwrap().with_loader(Box::new(FakeAudioLoader::new()));
    editor.update(Message::ImportFiles {
        track_id: TrackId::from("ghost"),
        paths: vec!["/audio/a.wav".into()],
    });
    assert!(editor.status_message.starts_with("Imported 0 files"));
    assert!(editor.state().timeline.tracks.is_empty());
}

#[test]
fn test_add_track_and_toggle_group() {
    let mut editor = editor_with(&[("x", 0.0, 5.0), ("y", 5.0, 9.0)]);
    editor.update(Message::AddTrack {
        name: "Bus".into(),
        track_type: TrackType::Audio,
    });
    assert_eq!(editor.state().tracks().len(), 2);
    assert_eq!(editor.state().tracks()[1].name, "Bus");

    click(&mut editor, "x", Modifiers::NONE);
    click(&mut editor, "y", Modifiers::command());
    editor.update(command_key('g'));
    let group_id = editor.state().groups()[0].id.clone();
    editor.update(Message::ToggleGroupCollapsed(group_id));
    assert!(!editor.state().groups()[0].collapsed);
}

#[test]
fn test_listener_sees_committed_snapshots() {
    let mut editor = editor_with(&[("a", 0.0, 5.0)]);
    let commits = Rc::new(Cell::new(0));
    let sink = Rc::clone(&commits);
    let id = editor.subscribe(Box::new(move |state: &Arc<TimelineState>| {
        assert!(state.selected_clips.ids().iter().all(|c| state.timeline.contains_clip(c)));
        sink.set(sink.get() + 1);
    }));

    click(&mut editor, "a", Modifiers::NONE);
    editor.update(key(Key::Delete));
    assert_eq!(commits.get(), 2);

    editor.unsubscribe(id);
    editor.update(key(Key::Space));
    assert_eq!(commits.get(), 2);
    assert!(editor.state().timeline.find_clip(&ClipId::from("a")).is_none());
}
