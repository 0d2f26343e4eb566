//! Clip selection, group expansion, range selection and pointer hit targets.

use serde::{Deserialize, Serialize};

use crate::timeline::{ClipId, GroupId, Timeline};

/// Ordered set of selected clip ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection(Vec<ClipId>);

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from ids, keeping first occurrences only.
    pub fn from_ids(ids: impl IntoIterator<Item = ClipId>) -> Self {
        let mut selection = Self::new();
        for id in ids {
            selection.insert(id);
        }
        selection
    }

    pub fn ids(&self) -> &[ClipId] {
        &self.0
    }

    pub fn contains(&self, id: &ClipId) -> bool {
        self.0.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn insert(&mut self, id: ClipId) {
        if !self.0.contains(&id) {
            self.0.push(id);
        }
    }

    pub fn remove(&mut self, id: &ClipId) {
        self.0.retain(|c| c != id);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Drop ids that no longer exist in `timeline`.
    pub fn retain_existing(&mut self, timeline: &Timeline) {
        self.0.retain(|id| timeline.contains_clip(id));
    }

    /// Resulting selection after clicking `clip_id`.
    ///
    /// Without `toggle` the click replaces the selection; with it (meta/ctrl)
    /// membership flips. A clip inside a collapsed group stands for the whole
    /// group, so the group's members are selected or deselected as a unit.
    pub fn click(&self, timeline: &Timeline, clip_id: &ClipId, toggle: bool) -> Selection {
        let collapsed_group = timeline
            .find_clip(clip_id)
            .and_then(|c| c.group_id.as_ref())
            .and_then(|gid| timeline.group(gid).ok())
            .filter(|g| g.collapsed);

        let unit: Vec<ClipId> = match collapsed_group {
            Some(group) => group.clip_ids.clone(),
            None => vec![clip_id.clone()],
        };

        if !toggle {
            return Selection::from_ids(unit);
        }

        let mut next = self.clone();
        if unit.iter().all(|id| next.contains(id)) {
            for id in &unit {
                next.remove(id);
            }
        } else {
            for id in unit {
                next.insert(id);
            }
        }
        next
    }

    /// Every member of a group, in group order.
    pub fn of_group(timeline: &Timeline, group_id: &GroupId) -> Selection {
        match timeline.group(group_id) {
            Ok(group) => Selection::from_ids(group.clip_ids.iter().cloned()),
            Err(_) => Selection::new(),
        }
    }

    /// This selection plus every member of any group it touches.
    pub fn expanded_to_groups(&self, timeline: &Timeline) -> Selection {
        let mut next = self.clone();
        for id in &self.0 {
            if let Some(gid) = timeline.find_clip(id).and_then(|c| c.group_id.as_ref()) {
                if let Ok(group) = timeline.group(gid) {
                    for member in &group.clip_ids {
                        next.insert(member.clone());
                    }
                }
            }
        }
        next
    }

    /// True if any selected clip belongs to a group.
    pub fn has_grouped(&self, timeline: &Timeline) -> bool {
        self.0
            .iter()
            .filter_map(|id| timeline.find_clip(id))
            .any(|c| c.group_id.is_some())
    }
}

/// What a range selection is drawn over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeTarget {
    Clip(ClipId),
    Group(GroupId),
}

/// A `[start_offset, end_offset)` window in the target's local time. For a
/// group, local time starts at the group's earliest member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeSelection {
    pub target: RangeTarget,
    pub start_offset: f64,
    pub end_offset: f64,
}

impl RangeSelection {
    /// Offsets may be given in either order.
    pub fn new(target: RangeTarget, a: f64, b: f64) -> Self {
        Self {
            target,
            start_offset: a.min(b),
            end_offset: a.max(b),
        }
    }

    pub fn width(&self) -> f64 {
        self.end_offset - self.start_offset
    }
}

// =============================================================================
// Pointer hit targets
// =============================================================================

/// Part of a clip under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipZone {
    Header,
    Body,
    StartEdge,
    EndEdge,
}

/// One element of the event target chain, innermost first.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetMarker {
    Clip { id: ClipId, zone: ClipZone },
    Group { id: GroupId },
    Button,
    /// Any unmarked element (lane, ruler, canvas).
    Element,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HitTarget {
    Clip { id: ClipId, zone: ClipZone },
    Group(GroupId),
    Button,
    Background,
}

/// Walk outwards until a clip, group or button marker is found.
pub fn resolve_target(chain: &[TargetMarker]) -> HitTarget {
    for marker in chain {
        match marker {
            TargetMarker::Clip { id, zone } => {
                return HitTarget::Clip {
                    id: id.clone(),
                    zone: *zone,
                };
            }
            TargetMarker::Group { id } => return HitTarget::Group(id.clone()),
            TargetMarker::Button => return HitTarget::Button,
            TargetMarker::Element => {}
        }
    }
    HitTarget::Background
}
