use crate::model::PersistedState;
use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "duotune";
const STATE_FILE: &str = "state.json";
const LOG_DIR: &str = "logs";

pub fn config_root() -> Result<PathBuf> {
    if let Ok(override_dir) = env::var("DUOTUNE_CONFIG_DIR") {
        return Ok(PathBuf::from(override_dir));
    }

    let home = env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .context("neither HOME nor USERPROFILE is set")?;
    Ok(PathBuf::from(home).join(".config").join(APP_DIR))
}

pub fn state_path() -> Result<PathBuf> {
    Ok(config_root()?.join(STATE_FILE))
}

pub fn log_dir() -> Result<PathBuf> {
    Ok(config_root()?.join(LOG_DIR))
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).with_context(|| format!("failed to create {}", path.display()))
}

pub fn load_state() -> Result<PersistedState> {
    load_state_from(&state_path()?)
}

pub fn save_state(state: &PersistedState) -> Result<()> {
    save_state_to(&state_path()?, state)
}

pub fn load_state_from(path: &Path) -> Result<PersistedState> {
    if !path.exists() {
        return Ok(PersistedState::default());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read state file {}", path.display()))?;
    let state: PersistedState = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse state file {}", path.display()))?;
    Ok(state)
}

pub fn save_state_to(path: &Path, state: &PersistedState) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SelectorSnapshot, Theme};
    use tempfile::tempdir;

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested").join(STATE_FILE);

        let state = PersistedState {
            theme: Theme::Matrix,
            selector: SelectorSnapshot {
                available: vec![String::from("One")],
                selected: vec![String::from("Two")],
            },
            ..PersistedState::default()
        };
        save_state_to(&path, &state).expect("save");
        let loaded = load_state_from(&path).expect("load");
        assert_eq!(loaded.theme, Theme::Matrix);
        assert_eq!(loaded.selector, state.selector);
    }

    #[test]
    fn missing_state_file_yields_defaults() {
        let dir = tempdir().expect("tempdir");
        let loaded = load_state_from(&dir.path().join(STATE_FILE)).expect("load");
        assert_eq!(loaded.theme, Theme::Dark);
        assert_eq!(loaded.saved_volume, 1.0);
    }

    #[test]
    fn corrupt_state_file_reports_path() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join(STATE_FILE);
        fs::write(&path, b"{not json").expect("write");

        let err = load_state_from(&path).expect_err("error");
        assert!(
            err.to_string().contains("failed to parse state file"),
            "unexpected error: {err:#}"
        );
    }
}
