use std::collections::HashMap;
use std::time::Duration;

use rayon::prelude::*;

use crate::audio::analysis::extract_with;
use crate::audio::decode::{decode_file, AudioSignal, DecodeError};
use crate::audio::features::FeatureSet;
use crate::config::{AnalysisConfig, ClipEntry};

/// A reference clip decoded once and kept for the rest of the session.
#[derive(Clone, Debug)]
pub struct LoadedClip {
    pub entry: ClipEntry,
    pub signal: AudioSignal,
    pub features: FeatureSet,
}

/// Decoded reference clips keyed by id.
///
/// Built once by the caller at session start and passed to whatever needs
/// it; dropping it releases the decoded audio.
#[derive(Debug)]
pub struct ClipLibrary {
    clips: HashMap<String, LoadedClip>,
    order: Vec<String>,
    fallback_window: Duration,
}

impl ClipLibrary {
    pub fn new(fallback_window: Duration) -> Self {
        Self {
            clips: HashMap::new(),
            order: Vec::new(),
            fallback_window,
        }
    }

    pub fn load(entries: &[ClipEntry], analysis: &AnalysisConfig, fallback_window: Duration) -> Self {
        Self::load_with_progress(entries, analysis, fallback_window, |_| {})
    }

    /// Decode and analyze every entry in parallel. `on_done` runs once per
    /// entry as it finishes, successful or not.
    ///
    /// Clips that fail to decode are logged and left out. Repeated ids keep
    /// the first entry.
    pub fn load_with_progress<F>(
        entries: &[ClipEntry],
        analysis: &AnalysisConfig,
        fallback_window: Duration,
        on_done: F,
    ) -> Self
    where
        F: Fn(&ClipEntry) + Sync,
    {
        let mut library = Self::new(fallback_window);

        let mut unique: Vec<&ClipEntry> = Vec::with_capacity(entries.len());
        for entry in entries {
            if unique.iter().any(|seen| seen.id == entry.id) {
                log::warn!("Duplicate clip id '{}' ({}), skipping", entry.id, entry.name);
                continue;
            }
            unique.push(entry);
        }

        let loaded: Vec<(&ClipEntry, Result<LoadedClip, DecodeError>)> = unique
            .into_par_iter()
            .map(|entry| {
                let result = decode_file(&entry.file).and_then(|signal| {
                    let features = extract_with(&signal, analysis)?;
                    Ok(LoadedClip {
                        entry: entry.clone(),
                        signal,
                        features,
                    })
                });
                on_done(entry);
                (entry, result)
            })
            .collect();

        for (entry, result) in loaded {
            match result {
                Ok(clip) => {
                    library.add(clip);
                }
                Err(err) => {
                    log::error!(
                        "Failed to load audio clip {} ({}): {}",
                        entry.name,
                        entry.file.display(),
                        err
                    );
                }
            }
        }

        log::info!("Loaded {}/{} clips", library.len(), entries.len());
        library
    }

    /// Add a clip whose audio is already decoded. Returns `Ok(false)` when
    /// the id is already present.
    pub fn insert(
        &mut self,
        entry: ClipEntry,
        signal: AudioSignal,
        analysis: &AnalysisConfig,
    ) -> Result<bool, DecodeError> {
        let features = extract_with(&signal, analysis)?;
        Ok(self.add(LoadedClip {
            entry,
            signal,
            features,
        }))
    }

    fn add(&mut self, clip: LoadedClip) -> bool {
        if self.clips.contains_key(&clip.entry.id) {
            log::warn!("Clip '{}' is already loaded", clip.entry.id);
            return false;
        }
        self.order.push(clip.entry.id.clone());
        self.clips.insert(clip.entry.id.clone(), clip);
        true
    }

    pub fn get(&self, id: &str) -> Option<&LoadedClip> {
        self.clips.get(id)
    }

    /// Ids in catalog order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// How long to record an attempt for `id`: the clip's own length, or the
    /// fallback for unknown or zero-length clips.
    pub fn recording_window(&self, id: &str) -> Duration {
        self.get(id)
            .map(|clip| clip.signal.duration())
            .filter(|secs| *secs > 0.0)
            .map(Duration::from_secs_f32)
            .unwrap_or(self.fallback_window)
    }
}
