use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::application::{DeeplinkSettings, FeedSettings, MintSettings};
use crate::domain::ClientResult;

/// Client configuration, read from a TOML file. Every key is optional.
///
/// ```toml
/// api_base_url = "https://api.duckee.xyz/"
///
/// [deeplink]
/// query_key = "data"
/// auto_clear_ms = 500
///
/// [feed]
/// page_size = 20
/// filters = ["Trending", "Open Source"]
/// filter_policy = "keep_feed"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub auth_url: String,
    pub mint_url: String,
    pub max_royalty: u32,
    pub preferences_path: PathBuf,
    pub deeplink: DeeplinkSettings,
    pub feed: FeedSettings,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.duckee.xyz/".to_string(),
            auth_url: "https://with-solana.duckee.xyz/auth".to_string(),
            mint_url: "https://with-solana.duckee.xyz/transact/mint".to_string(),
            max_royalty: 50,
            preferences_path: PathBuf::from("duckee-preferences.json"),
            deeplink: DeeplinkSettings::default(),
            feed: FeedSettings::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_toml(content: &str) -> ClientResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> ClientResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn mint_settings(&self) -> MintSettings {
        MintSettings {
            mint_url: self.mint_url.clone(),
            query_key: self.deeplink.query_key.clone(),
            max_royalty: self.max_royalty,
        }
    }
}
