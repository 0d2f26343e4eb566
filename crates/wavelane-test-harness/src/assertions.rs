use wavelane_core::state::TimelineState;
use wavelane_core::timeline::Timeline;

const EPSILON: f64 = 1e-9;

/// Assert that no two ungrouped clips overlap on any track.
pub fn assert_no_ungrouped_overlaps(timeline: &Timeline) {
    for track in &timeline.tracks {
        for (i, a) in track.clips.iter().enumerate() {
            for b in track.clips.iter().skip(i + 1) {
                if a.shares_group_with(b) {
                    continue;
                }
                assert!(
                    !a.overlaps(b),
                    "clips {} [{}, {}) and {} [{}, {}) overlap on track {}",
                    a.id,
                    a.start_time,
                    a.end_time,
                    b.id,
                    b.start_time,
                    b.end_time,
                    track.id
                );
            }
        }
    }
}

/// Assert that every clip/group link points both ways.
pub fn assert_group_links_consistent(timeline: &Timeline) {
    for clip in timeline.clips() {
        if let Some(group_id) = &clip.group_id {
            let group = timeline
                .groups
                .iter()
                .find(|g| &g.id == group_id)
                .unwrap_or_else(|| panic!("clip {} references missing group {group_id}", clip.id));
            assert!(
                group.clip_ids.contains(&clip.id),
                "group {group_id} does not list its member {}",
                clip.id
            );
        }
    }
    for group in &timeline.groups {
        assert!(
            group.clip_ids.len() >= 2,
            "group {} has only {} members",
            group.id,
            group.clip_ids.len()
        );
        for id in &group.clip_ids {
            let clip = timeline
                .find_clip(id)
                .unwrap_or_else(|| panic!("group {} lists missing clip {id}", group.id));
            assert_eq!(
                clip.group_id.as_ref(),
                Some(&group.id),
                "clip {id} is listed in group {} but points elsewhere",
                group.id
            );
        }
    }
}

/// Assert `duration == end - start` and `start < end` for every clip.
pub fn assert_durations_consistent(timeline: &Timeline) {
    for clip in timeline.clips() {
        assert!(
            clip.start_time < clip.end_time,
            "clip {} has empty or inverted span [{}, {})",
            clip.id,
            clip.start_time,
            clip.end_time
        );
        assert!(
            (clip.duration - (clip.end_time - clip.start_time)).abs() < EPSILON,
            "clip {} duration {} != end - start {}",
            clip.id,
            clip.duration,
            clip.end_time - clip.start_time
        );
    }
}

/// Assert every selected id names an existing clip and flags agree.
pub fn assert_selection_exists(state: &TimelineState) {
    for id in state.selected_clips.ids() {
        assert!(
            state.timeline.contains_clip(id),
            "selection holds missing clip {id}"
        );
    }
    for clip in state.timeline.clips() {
        assert_eq!(
            clip.selected,
            state.selected_clips.contains(&clip.id),
            "clip {} selected flag disagrees with selection",
            clip.id
        );
    }
}

/// Run every structural assertion on a committed state.
pub fn assert_state_invariants(state: &TimelineState) {
    assert_no_ungrouped_overlaps(&state.timeline);
    assert_group_links_consistent(&state.timeline);
    assert_durations_consistent(&state.timeline);
    assert_selection_exists(state);
}

/// Assert two times agree to within floating point noise.
pub fn assert_time_eq(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "time {actual} != expected {expected}"
    );
}
