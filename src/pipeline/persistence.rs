// Saves and restores the whole session as JSON. Called from the middle layer
// on save/load controls, and once from main at startup.
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::pipeline::session::SessionData;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("could not access session file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed session file {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not encode session: {0}")]
    Encode(#[from] serde_json::Error),
}

pub fn load_session(path: &Path) -> Result<SessionData, SessionError> {
    let data = std::fs::read_to_string(path).map_err(|source| SessionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut state: SessionData =
        serde_json::from_str(&data).map_err(|source| SessionError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
    state.sanitize();
    Ok(state)
}

// Save the session to disk, creating parent directories if needed
pub fn save_session(path: &Path, state: &SessionData) -> Result<(), SessionError> {
    let io_error = |source| SessionError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json).map_err(io_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{PaintKind, Param};
    use crate::generators::ScaleFamily;
    use tempfile::tempdir;

    #[test]
    fn save_then_load_restores_session() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let mut state = SessionData::default();
        state.apply(Param::Bpm, 97.0);
        state.apply(Param::Rotation, -3.0);
        state.scale = ScaleFamily::Pentatonic;
        state.paint(3, 4, PaintKind::On);
        state.paint(5, 1, PaintKind::Off);

        save_session(&path, &state).unwrap();
        let loaded = load_session(&path).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let err = load_session(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, SessionError::Io { .. }));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ \"Frequency\": ").unwrap();
        let err = load_session(&path).unwrap_err();
        assert!(matches!(err, SessionError::Decode { .. }));
    }

    #[test]
    fn out_of_range_numbers_are_clamped_on_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wild.json");
        let mut json = serde_json::to_value(SessionData::default()).unwrap();
        json["Low"] = serde_json::json!(300);
        json["Release"] = serde_json::json!(-4);
        json["Octaves"] = serde_json::json!(99);
        json["Bpm"] = serde_json::json!(5000);
        json["R"] = serde_json::json!(-1000);
        json["K"] = serde_json::json!(7.6);
        std::fs::write(&path, json.to_string()).unwrap();

        let state = load_session(&path).unwrap();
        assert_eq!(state.low, 127);
        assert_eq!(state.release, 0);
        assert_eq!(state.octaves, 10);
        assert_eq!(state.bpm, 960);
        assert_eq!(state.rotation, -32);
        assert_eq!(state.k, 8);
    }

    #[test]
    fn saving_onto_a_directory_is_an_io_error() {
        let dir = tempdir().unwrap();
        let err = save_session(dir.path(), &SessionData::default()).unwrap_err();
        assert!(matches!(err, SessionError::Io { .. }));
        assert!(dir.path().is_dir());
    }

    #[test]
    fn unknown_override_code_is_a_decode_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("codes.json");
        let mut json = serde_json::to_value(SessionData::default()).unwrap();
        json["UserMatrix"][0][0] = serde_json::json!(9);
        std::fs::write(&path, json.to_string()).unwrap();
        assert!(matches!(load_session(&path), Err(SessionError::Decode { .. })));
    }

    #[test]
    fn loads_files_without_scale_and_with_extra_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("older.json");
        let json = r#"{
            "UserMatrix": [[0, 2], [3, 0]],
            "UserPattern": { "Rhythm": [1, 0, 1] },
            "KeyboardNumInput": "",
            "Frequency": 0.5, "Lacunarity": 1.1, "Gain": 2.5, "Octaves": 4,
            "XSteps": 0, "YSteps": 12, "Offset": 40, "Bpm": 120,
            "Low": 48, "Release": 2, "N": 3, "K": 8, "R": 1, "G": 0
        }"#;
        std::fs::write(&path, json).unwrap();

        let state = load_session(&path).unwrap();
        assert_eq!(state.scale, ScaleFamily::Chromatic);
        assert_eq!(state.x_steps, 1); // clamped
        assert_eq!(state.y_steps, 12);
        assert_eq!(state.n, 3);
        assert_eq!(state.user_matrix.get(0, 1), crate::pipeline::session::Override::On);
        assert_eq!(state.user_matrix.get(1, 0), crate::pipeline::session::Override::Off);
    }
}
