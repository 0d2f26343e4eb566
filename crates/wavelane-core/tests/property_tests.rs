use proptest::prelude::*;

use wavelane_core::config::EditorConfig;
use wavelane_core::coords::CoordinateMapper;
use wavelane_core::ops;
use wavelane_core::selection::{RangeSelection, RangeTarget};
use wavelane_core::timeline::{Clip, ClipId, GroupId, Timeline, Track};
use wavelane_core::zoom::ZoomController;

const TOLERANCE: f64 = 1e-9;

fn one_track(clips: Vec<Clip>) -> Timeline {
    let mut track = Track::audio("t1", "Track 1");
    track.clips = clips;
    Timeline {
        tracks: vec![track],
        groups: Vec::new(),
    }
}

proptest! {
    #[test]
    fn split_conserves_duration(
        start in 0.0f64..1_000.0,
        duration in 0.01f64..500.0,
        ratio in 0.001f64..0.999,
        offset in 0.0f64..100.0,
    ) {
        let mut clip = Clip::new("c", "t1", "c", start, duration);
        clip.source_start_offset = offset;
        let p = start + duration * ratio;
        prop_assume!(clip.strictly_contains(p));

        let (left, right) = ops::split_clip(&clip, p).unwrap();
        prop_assert!((left.duration + right.duration - clip.duration).abs() < TOLERANCE * 1_000.0);
        prop_assert_eq!(left.end_time, p);
        prop_assert_eq!(right.start_time, p);
        prop_assert!(
            (right.source_start_offset - (left.source_start_offset + left.duration)).abs()
                < TOLERANCE * 1_000.0
        );
    }

    #[test]
    fn range_delete_equals_range_split(
        duration in 1.0f64..100.0,
        a in 0.0f64..1.0,
        b in 0.0f64..1.0,
    ) {
        prop_assume!((a - b).abs() > 1e-3);
        let timeline = one_track(vec![Clip::new("c", "t1", "c", 2.0, duration)]);
        let range = RangeSelection::new(RangeTarget::Clip("c".into()), a * duration, b * duration);
        prop_assert_eq!(
            ops::range_delete(&timeline, &range).unwrap(),
            ops::range_split(&timeline, &range).unwrap()
        );
    }

    #[test]
    fn pixel_time_roundtrip(t in 0.0f64..10_000.0, zoom in 0.1f64..20.0, offset in 0.0f64..5_000.0) {
        let mapper = CoordinateMapper::new(20.0, zoom).with_offset(offset);
        let back = mapper.pixel_to_time(mapper.time_to_pixel(t));
        prop_assert!((back - t).abs() <= 1e-9 * t.max(1.0));
    }

    #[test]
    fn zoom_is_always_within_bounds(level in -1.0e6f64..1.0e6) {
        let config = EditorConfig::default();
        let mut zoom = ZoomController::new(&config);
        zoom.set_zoom_level(level, false, std::time::Instant::now());
        prop_assert!(zoom.zoom_level() >= config.min_zoom);
        prop_assert!(zoom.zoom_level() <= config.max_zoom);
    }

    #[test]
    fn group_links_agree_after_grouping(count in 2usize..8) {
        let clips: Vec<Clip> = (0..count)
            .map(|i| Clip::new(format!("c{i}"), "t1", "c", i as f64 * 2.0, 1.5))
            .collect();
        let selection: Vec<ClipId> = clips.iter().map(|c| c.id.clone()).collect();
        let timeline = ops::group_clips(&one_track(clips), &selection, GroupId::from("g"))
            .unwrap();

        let group = &timeline.groups[0];
        prop_assert_eq!(group.clip_ids.len(), count);
        for id in &group.clip_ids {
            let clip = timeline.find_clip(id).unwrap();
            prop_assert_eq!(clip.group_id.as_ref(), Some(&group.id));
        }
    }
}
