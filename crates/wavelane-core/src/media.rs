//! Audio sources and the decoding collaborator.
//!
//! Decoding itself lives outside the engine behind [`AudioLoader`]; the
//! engine only consumes a duration and an amplitude array per source.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::palette;
use crate::timeline::{Clip, ClipId, TrackId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioSource {
    pub id: Uuid,
    pub name: String,
    pub path: PathBuf,
    pub duration: Duration,
    /// Amplitude samples spanning the whole source.
    pub waveform: Vec<f32>,
}

impl AudioSource {
    pub fn new(name: String, path: PathBuf, duration: Duration, waveform: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            path,
            duration,
            waveform,
        }
    }

    /// A clip covering the whole source, not yet positioned.
    pub fn to_clip(&self, clip_id: ClipId, track_id: TrackId, color_index: usize) -> Clip {
        let mut clip = Clip::new(
            clip_id,
            track_id,
            self.name.clone(),
            0.0,
            self.duration.as_secs_f64(),
        );
        clip.waveform_data = self.waveform.clone();
        clip.color = palette::color_for_index(color_index).to_owned();
        clip
    }
}

/// What the decoding collaborator hands back for one file.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub duration: Duration,
    pub waveform: Vec<f32>,
}

/// External audio decoder producing a duration and an amplitude array.
pub trait AudioLoader {
    fn load(&mut self, path: &Path) -> Result<DecodedAudio>;
}

/// Outcome of a batch import: the sources that loaded and the files skipped.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub sources: Vec<AudioSource>,
    pub failures: Vec<(PathBuf, CoreError)>,
}

/// Load each path in turn. A failing file is logged and skipped; the rest of
/// the batch still loads.
pub fn load_sources(loader: &mut dyn AudioLoader, paths: &[PathBuf]) -> ImportReport {
    let mut report = ImportReport::default();
    for path in paths {
        match loader.load(path) {
            Ok(decoded) => {
                let name = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                info!(path = %path.display(), secs = decoded.duration.as_secs_f64(), "audio source loaded");
                report.sources.push(AudioSource::new(
                    name,
                    path.clone(),
                    decoded.duration,
                    decoded.waveform,
                ));
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping audio source");
                report.failures.push((path.clone(), e));
            }
        }
    }
    report
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SourceLibrary {
    sources: Vec<AudioSource>,
}

impl SourceLibrary {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    pub fn import(&mut self, source: AudioSource) {
        self.sources.push(source);
    }

    pub fn remove(&mut self, id: Uuid) -> Option<AudioSource> {
        let idx = self.sources.iter().position(|s| s.id == id)?;
        Some(self.sources.remove(idx))
    }

    pub fn get(&self, id: Uuid) -> Option<&AudioSource> {
        self.sources.iter().find(|s| s.id == id)
    }

    pub fn sources(&self) -> &[AudioSource] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
