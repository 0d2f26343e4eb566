use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Duration;

use tempfile::TempDir;
use tracing_subscriber::EnvFilter;
use wavelane_core::error::{CoreError, Result};
use wavelane_core::media::{AudioLoader, DecodedAudio};

/// Samples per second used by the waveform fixtures.
pub const FIXTURE_SAMPLE_RATE: usize = 10;

/// A linear ramp `0, 1, 2, ...`; makes slices easy to identify.
pub fn ramp_waveform(len: usize) -> Vec<f32> {
    (0..len).map(|i| i as f32).collect()
}

/// A waveform for `secs` seconds at [`FIXTURE_SAMPLE_RATE`].
pub fn waveform_for_secs(secs: f64) -> Vec<f32> {
    ramp_waveform((secs * FIXTURE_SAMPLE_RATE as f64).round() as usize)
}

/// Install a `tracing` subscriber for test output, honouring `RUST_LOG`.
pub fn init_test_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Create empty placeholder audio files in a fresh temp dir.
pub fn placeholder_files(names: &[&str]) -> (TempDir, Vec<PathBuf>) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let paths = names
        .iter()
        .map(|name| {
            let path = dir.path().join(name);
            fs::write(&path, b"").expect("failed to write placeholder");
            path
        })
        .collect();
    (dir, paths)
}

/// In-memory stand-in for the external audio decoder.
///
/// Every file decodes to [`FakeAudioLoader::default_secs`] of ramp waveform
/// unless given an explicit duration or marked as failing.
pub struct FakeAudioLoader {
    pub default_secs: f64,
    durations: HashMap<String, f64>,
    failing: HashSet<String>,
    pub loaded: Vec<PathBuf>,
}

impl Default for FakeAudioLoader {
    fn default() -> Self {
        Self {
            default_secs: 5.0,
            durations: HashMap::new(),
            failing: HashSet::new(),
            loaded: Vec::new(),
        }
    }
}

impl FakeAudioLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files whose name is `file_name` decode to `secs` seconds.
    pub fn with_duration(mut self, file_name: &str, secs: f64) -> Self {
        self.durations.insert(file_name.into(), secs);
        self
    }

    /// Files whose name is `file_name` fail to decode.
    pub fn failing(mut self, file_name: &str) -> Self {
        self.failing.insert(file_name.into());
        self
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl AudioLoader for FakeAudioLoader {
    fn load(&mut self, path: &Path) -> Result<DecodedAudio> {
        let name = file_name(path);
        if self.failing.contains(&name) {
            return Err(CoreError::Decode {
                path: path.display().to_string(),
                reason: "unsupported format".into(),
            });
        }
        self.loaded.push(path.to_path_buf());
        let secs = self.durations.get(&name).copied().unwrap_or(self.default_secs);
        Ok(DecodedAudio {
            duration: Duration::from_secs_f64(secs),
            waveform: waveform_for_secs(secs),
        })
    }
}
