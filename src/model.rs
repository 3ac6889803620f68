use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
    Paused,
    Stopped,
    Complete,
}

impl PlaybackState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Playing => "Playing",
            Self::Paused => "Paused",
            Self::Stopped => "Stopped",
            Self::Complete => "Complete",
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, Self::Playing | Self::Paused)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    Started,
    Paused,
    Resumed,
    Stopped,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Theme {
    #[default]
    Dark,
    PitchBlack,
    Matrix,
}

impl Theme {
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::PitchBlack,
            Self::PitchBlack => Self::Matrix,
            Self::Matrix => Self::Dark,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "black" | "pitchblack" | "pitch-black" => Some(Self::PitchBlack),
            "matrix" => Some(Self::Matrix),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SelectorSnapshot {
    pub available: Vec<String>,
    pub selected: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_saved_volume")]
    pub saved_volume: f32,
    #[serde(default)]
    pub selector: SelectorSnapshot,
}

fn default_saved_volume() -> f32 {
    1.0
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            saved_volume: default_saved_volume(),
            selector: SelectorSnapshot::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn older_state_files_fill_missing_fields() {
        let state: PersistedState = serde_json::from_str("{}").expect("parse");
        assert_eq!(state.theme, Theme::Dark);
        assert_eq!(state.saved_volume, 1.0);
        assert!(state.selector.available.is_empty());
    }

    #[test]
    fn theme_cycles_back_to_start() {
        let theme = Theme::Dark.next().next().next();
        assert_eq!(theme, Theme::Dark);
        assert_eq!(Theme::parse(" Matrix "), Some(Theme::Matrix));
        assert_eq!(Theme::parse("neon"), None);
    }
}
