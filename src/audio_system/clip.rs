/// Audio clips
///
/// Clips are preloaded into memory once and shared by reference between the
/// channels that play them.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AudioError;

/// Stable identifier of a clip in the library
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipId(String);

impl ClipId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClipId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A preloaded clip
#[derive(Debug, Clone)]
pub struct Clip {
    id: ClipId,
    data: Arc<Vec<u8>>,
    length: Option<Duration>,
}

impl Clip {
    /// Create a clip from encoded audio bytes
    pub fn new(id: ClipId, data: Arc<Vec<u8>>) -> Self {
        Self {
            id,
            data,
            length: None,
        }
    }

    /// Attach a known playback length
    pub fn with_length(mut self, length: Duration) -> Self {
        self.length = Some(length);
        self
    }

    pub fn id(&self) -> &ClipId {
        &self.id
    }

    /// Encoded audio bytes
    pub fn data(&self) -> &Arc<Vec<u8>> {
        &self.data
    }

    /// Playback length, when known up front
    pub fn length(&self) -> Option<Duration> {
        self.length
    }
}

/// In-memory clip library keyed by clip id
#[derive(Debug, Default)]
pub struct ClipLibrary {
    clips: HashMap<ClipId, Clip>,
}

impl ClipLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load clip bytes from a file
    pub fn load_file(
        &mut self,
        id: ClipId,
        path: &Path,
        length: Option<Duration>,
    ) -> Result<(), AudioError> {
        let data = std::fs::read(path).map_err(|e| AudioError::LoadFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;

        tracing::info!(
            "Loaded clip {}: {} ({} bytes)",
            id,
            path.display(),
            data.len()
        );

        let mut clip = Clip::new(id, Arc::new(data));
        if let Some(length) = length {
            clip = clip.with_length(length);
        }
        self.insert(clip)
    }

    /// Register an already loaded clip
    pub fn insert(&mut self, clip: Clip) -> Result<(), AudioError> {
        if self.clips.contains_key(clip.id()) {
            return Err(AudioError::DuplicateClip(clip.id().to_string()));
        }
        tracing::debug!("Clip ready: {}", clip.id());
        self.clips.insert(clip.id().clone(), clip);
        Ok(())
    }

    pub fn get(&self, id: &ClipId) -> Option<&Clip> {
        self.clips.get(id)
    }

    /// Like [`get`](Self::get), failing with [`AudioError::UnknownClip`]
    pub fn require(&self, id: &ClipId) -> Result<&Clip, AudioError> {
        self.get(id)
            .ok_or_else(|| AudioError::UnknownClip(id.to_string()))
    }

    pub fn contains(&self, id: &ClipId) -> bool {
        self.clips.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn clip(id: &str) -> Clip {
        Clip::new(ClipId::new(id), Arc::new(vec![0u8; 16]))
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut library = ClipLibrary::new();
        library.insert(clip("pop")).unwrap();

        assert_eq!(library.len(), 1);
        assert!(library.contains(&ClipId::new("pop")));
        assert!(library.get(&ClipId::new("swap")).is_none());
        assert!(matches!(
            library.require(&ClipId::new("swap")),
            Err(AudioError::UnknownClip(id)) if id == "swap"
        ));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut library = ClipLibrary::new();
        library.insert(clip("pop")).unwrap();

        let err = library.insert(clip("pop")).unwrap_err();
        assert!(matches!(err, AudioError::DuplicateClip(id) if id == "pop"));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[1, 2, 3, 4]).unwrap();

        let mut library = ClipLibrary::new();
        library
            .load_file(
                ClipId::new("theme"),
                file.path(),
                Some(Duration::from_secs(90)),
            )
            .unwrap();

        let loaded = library.get(&ClipId::new("theme")).unwrap();
        assert_eq!(loaded.data().as_slice(), &[1, 2, 3, 4]);
        assert_eq!(loaded.length(), Some(Duration::from_secs(90)));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let mut library = ClipLibrary::new();
        let result = library.load_file(
            ClipId::new("missing"),
            Path::new("nonexistent.mp3"),
            None,
        );
        assert!(matches!(result, Err(AudioError::LoadFailed { .. })));
        assert!(library.is_empty());
    }
}
