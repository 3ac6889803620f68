use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlayerError>;

#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("failed to open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read tags from {}: {source}", path.display())]
    Tag {
        path: PathBuf,
        #[source]
        source: lofty::error::LoftyError,
    },

    #[error("failed to decode {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("audio output error: {0}")]
    Output(String),

    #[error("failed to spawn playback worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("playback worker exited unexpectedly")]
    WorkerGone,
}

impl PlayerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Decode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display_names_the_path() {
        let err = PlayerError::io(
            "music/missing.mp3",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert!(err.is_io());
        assert_eq!(err.to_string(), "failed to open music/missing.mp3: not found");
    }

    #[test]
    fn decode_error_keeps_reason() {
        let err = PlayerError::decode("a.mp3", "unrecognized format");
        assert!(!err.is_io());
        assert_eq!(err.to_string(), "failed to decode a.mp3: unrecognized format");
    }
}
