use wavelane_core::timeline::{Clip, ClipId, Group, GroupId, Timeline, Track, TrackId};

/// Builder for creating test Clips with sensible defaults.
pub struct ClipBuilder {
    id: ClipId,
    start_secs: f64,
    duration_secs: f64,
    source_start_secs: f64,
    waveform: Vec<f32>,
}

impl ClipBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: ClipId::from(id),
            start_secs: 0.0,
            duration_secs: 5.0,
            source_start_secs: 0.0,
            waveform: Vec::new(),
        }
    }

    pub fn at(mut self, start_secs: f64) -> Self {
        self.start_secs = start_secs;
        self
    }

    pub fn duration_secs(mut self, secs: f64) -> Self {
        self.duration_secs = secs;
        self
    }

    /// Shorthand for `at(start).duration_secs(end - start)`.
    pub fn span(self, start_secs: f64, end_secs: f64) -> Self {
        self.at(start_secs).duration_secs(end_secs - start_secs)
    }

    pub fn source_start(mut self, secs: f64) -> Self {
        self.source_start_secs = secs;
        self
    }

    pub fn waveform(mut self, samples: Vec<f32>) -> Self {
        self.waveform = samples;
        self
    }

    /// Build for the given track. The clip is named after its id.
    pub fn build(self, track_id: &TrackId) -> Clip {
        let name = self.id.to_string();
        let mut clip = Clip::new(
            self.id,
            track_id.clone(),
            name,
            self.start_secs,
            self.duration_secs,
        );
        clip.source_start_offset = self.source_start_secs;
        clip.waveform_data = self.waveform;
        clip
    }
}

/// Builder for an audio track and its clips. Clip track ids are filled in.
pub struct TrackBuilder {
    id: TrackId,
    clips: Vec<ClipBuilder>,
}

impl TrackBuilder {
    pub fn audio(id: &str) -> Self {
        Self {
            id: TrackId::from(id),
            clips: Vec::new(),
        }
    }

    pub fn with_clip(mut self, clip: ClipBuilder) -> Self {
        self.clips.push(clip);
        self
    }

    pub fn build(self) -> Track {
        let mut track = Track::audio(self.id.clone(), self.id.to_string());
        track.clips = self.clips.into_iter().map(|c| c.build(&track.id)).collect();
        track
    }
}

struct GroupSpec {
    id: GroupId,
    members: Vec<ClipId>,
    collapsed: bool,
}

/// Build a timeline with groups wired up on both sides of the clip/group
/// link.
#[derive(Default)]
pub struct StateBuilder {
    tracks: Vec<Track>,
    groups: Vec<GroupSpec>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_track(mut self, track: TrackBuilder) -> Self {
        self.tracks.push(track.build());
        self
    }

    /// Group existing clips, in lane order.
    pub fn with_group(mut self, id: &str, members: &[&str], collapsed: bool) -> Self {
        self.groups.push(GroupSpec {
            id: GroupId::from(id),
            members: members.iter().map(|m| ClipId::from(*m)).collect(),
            collapsed,
        });
        self
    }

    pub fn build_timeline(&self) -> Timeline {
        let mut timeline = Timeline {
            tracks: self.tracks.clone(),
            groups: Vec::new(),
        };
        for (n, spec) in self.groups.iter().enumerate() {
            let mut track_id = None;
            let mut color = None;
            for (lane, member) in spec.members.iter().enumerate() {
                let clip = timeline
                    .find_clip_mut(member)
                    .unwrap_or_else(|| panic!("group member {member} not on any track"));
                clip.group_id = Some(spec.id.clone());
                clip.group_track_index = Some(lane);
                track_id.get_or_insert_with(|| clip.track_id.clone());
                color.get_or_insert_with(|| clip.color.clone());
            }
            timeline.groups.push(Group {
                id: spec.id.clone(),
                name: format!("Group {}", n + 1),
                clip_ids: spec.members.clone(),
                color: color.unwrap_or_default(),
                collapsed: spec.collapsed,
                track_id: track_id.unwrap_or_else(|| TrackId::from("none")),
            });
        }
        timeline
    }
}

/// One audio track `t1` holding clips with the given `(id, start, end)` spans.
pub fn single_track(spans: &[(&str, f64, f64)]) -> StateBuilder {
    let track = spans
        .iter()
        .fold(TrackBuilder::audio("t1"), |track, (id, start, end)| {
            track.with_clip(ClipBuilder::new(id).span(*start, *end))
        });
    StateBuilder::new().with_track(track)
}
