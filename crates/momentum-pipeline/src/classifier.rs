//! Input classification.

use momentum_models::{MediaAsset, MediaKind};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::error::InputError;
use crate::logging::RunLogger;

/// One audio track and the videos to cut against it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedInputs {
    pub audio: MediaAsset,
    pub videos: Vec<MediaAsset>,
}

/// Splits dropped paths into audio and video by extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct MediaClassifier;

impl MediaClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify `paths` in order.
    ///
    /// Any missing path fails the whole call. Unsupported extensions are
    /// skipped; extra audio files after the first are ignored.
    pub fn classify(
        &self,
        paths: &[PathBuf],
        logger: &RunLogger,
    ) -> Result<ClassifiedInputs, InputError> {
        let mut audio: Option<MediaAsset> = None;
        let mut videos = Vec::new();
        let mut seen_videos = HashSet::new();

        for path in paths {
            if !path.exists() {
                logger.log_error(&format!("Input file not found: {}", path.display()));
                return Err(InputError::MissingFile(path.clone()));
            }

            match MediaKind::from_path(path) {
                Some(MediaKind::Audio) => {
                    if let Some(existing) = &audio {
                        logger.log_warning(&format!(
                            "Multiple audio files provided; keeping {} and ignoring {}",
                            existing.display_name(),
                            path.display()
                        ));
                    } else {
                        audio = Some(MediaAsset::new(path.clone(), MediaKind::Audio));
                    }
                }
                Some(MediaKind::Video) => {
                    if seen_videos.insert(path.clone()) {
                        videos.push(MediaAsset::new(path.clone(), MediaKind::Video));
                    } else {
                        logger.log_warning(&format!(
                            "Duplicate video ignored: {}",
                            path.display()
                        ));
                    }
                }
                None => {
                    logger.log_warning(&format!(
                        "Unsupported file type skipped: {}",
                        path.display()
                    ));
                }
            }
        }

        let audio = audio.ok_or(InputError::NoAudioFound)?;
        if videos.is_empty() {
            return Err(InputError::NoVideoFound);
        }

        logger.log_progress(&format!(
            "Classified inputs: audio={}, videos={}",
            audio.display_name(),
            videos.len()
        ));

        Ok(ClassifiedInputs { audio, videos })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, b"x").unwrap();
        path
    }

    fn classify(paths: &[PathBuf]) -> Result<ClassifiedInputs, InputError> {
        MediaClassifier::new().classify(paths, &RunLogger::new("classifier"))
    }

    #[test]
    fn test_classifies_by_extension() {
        let dir = TempDir::new().unwrap();
        let audio = touch(&dir, "track.WAV");
        let v1 = touch(&dir, "v1.mp4");
        let v2 = touch(&dir, "v2.MOV");
        let notes = touch(&dir, "notes.txt");

        let inputs = classify(&[v1.clone(), notes, audio.clone(), v2.clone()]).unwrap();
        assert_eq!(inputs.audio.path(), audio.as_path());
        let videos: Vec<_> = inputs.videos.iter().map(|v| v.path().to_path_buf()).collect();
        assert_eq!(videos, vec![v1, v2]);
    }

    #[test]
    fn test_missing_file_fails_whole_call() {
        let dir = TempDir::new().unwrap();
        let audio = touch(&dir, "a.wav");
        let missing = dir.path().join("v1.mp4");

        let err = classify(&[audio, missing.clone()]).unwrap_err();
        assert!(matches!(err, InputError::MissingFile(p) if p == missing));
    }

    #[test]
    fn test_requires_audio_and_video() {
        let dir = TempDir::new().unwrap();
        let audio = touch(&dir, "a.mp3");
        let video = touch(&dir, "v.mp4");

        assert!(matches!(classify(&[audio]), Err(InputError::NoVideoFound)));
        assert!(matches!(classify(&[video]), Err(InputError::NoAudioFound)));
        assert!(matches!(classify(&[]), Err(InputError::NoAudioFound)));
    }

    #[test]
    fn test_first_audio_wins() {
        let dir = TempDir::new().unwrap();
        let first = touch(&dir, "first.mp3");
        let second = touch(&dir, "second.wav");
        let video = touch(&dir, "v.mp4");

        let inputs = classify(&[first.clone(), video, second]).unwrap();
        assert_eq!(inputs.audio.path(), first.as_path());
        assert_eq!(inputs.videos.len(), 1);
    }

    #[test]
    fn test_duplicate_video_kept_once() {
        let dir = TempDir::new().unwrap();
        let audio = touch(&dir, "a.wav");
        let video = touch(&dir, "v.mp4");

        let inputs = classify(&[audio, video.clone(), video]).unwrap();
        assert_eq!(inputs.videos.len(), 1);
    }
}
