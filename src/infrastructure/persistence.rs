use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::{ClientError, ClientResult, Credentials, PreferencesRepository};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Preferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    credentials: Option<Credentials>,
}

/// Preference keys stored as one JSON document on disk.
pub struct PreferencesFile {
    path: PathBuf,
}

impl PreferencesFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> ClientResult<Preferences> {
        match fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| ClientError::Storage(format!("Invalid preferences file - {}", e))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Preferences::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, preferences: &Preferences) -> ClientResult<()> {
        let json = serde_json::to_string_pretty(preferences)
            .map_err(|e| ClientError::Storage(format!("Serialization failed: {}", e)))?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl PreferencesRepository for PreferencesFile {
    fn credentials(&self) -> Option<Credentials> {
        match self.read() {
            Ok(preferences) => preferences.credentials,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "could not read preferences");
                None
            }
        }
    }

    fn set_credentials(&self, credentials: &Credentials) -> ClientResult<()> {
        let mut preferences = self.read().unwrap_or_default();
        preferences.credentials = Some(credentials.clone());
        self.write(&preferences)
    }

    fn clear_credentials(&self) -> ClientResult<()> {
        let mut preferences = self.read().unwrap_or_default();
        preferences.credentials = None;
        self.write(&preferences)
    }
}
