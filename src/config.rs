use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// PKCE allows verifiers of 43 to 128 characters.
pub const VERIFIER_LENGTH_RANGE: std::ops::RangeInclusive<usize> = 43..=128;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub client_id: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    #[serde(default = "default_auth_base")]
    pub auth_base: String,
    #[serde(default = "default_show_dialog")]
    pub show_dialog: bool,

    // PKCE
    #[serde(default = "default_verifier_length")]
    pub verifier_length: usize,

    // Blend
    #[serde(default = "default_blend_track_limit")]
    pub blend_track_limit: usize,
    /// Score each of the user's own top tracks adds to the weighted blend.
    #[serde(default = "default_own_track_weight")]
    pub own_track_weight: f64,

    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

fn default_redirect_uri() -> String { "http://127.0.0.1:5000/callback".into() }
fn default_auth_base() -> String { "https://accounts.spotify.com".into() }
fn default_show_dialog() -> bool { true }
fn default_verifier_length() -> usize { 64 }
fn default_blend_track_limit() -> usize { 50 }
fn default_own_track_weight() -> f64 { 0.5 }
fn default_log_dir() -> PathBuf { "logs".into() }

fn default_scopes() -> Vec<String> {
    vec![
        "user-read-private",
        "user-read-email",
        "user-top-read",
        "playlist-modify-public",
        "playlist-modify-private",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Config {
    pub fn from_path(path: &std::path::Path) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&s)?;
        Ok(cfg)
    }

    /// Authorization server base URL. SPOTIFY_AUTH_BASE overrides the
    /// configured value (useful for tests and local mocks).
    pub fn auth_base(&self) -> String {
        env::var("SPOTIFY_AUTH_BASE").unwrap_or_else(|_| self.auth_base.clone())
    }

    /// Check the values the authorization flow depends on.
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(anyhow!("client_id must not be empty"));
        }
        if !VERIFIER_LENGTH_RANGE.contains(&self.verifier_length) {
            return Err(anyhow!(
                "verifier_length {} outside PKCE range {}..={}",
                self.verifier_length,
                VERIFIER_LENGTH_RANGE.start(),
                VERIFIER_LENGTH_RANGE.end()
            ));
        }
        url::Url::parse(&self.redirect_uri)
            .map_err(|e| anyhow!("invalid redirect_uri '{}': {}", self.redirect_uri, e))?;
        let auth_base = self.auth_base();
        url::Url::parse(&auth_base)
            .map_err(|e| anyhow!("invalid auth_base '{}': {}", auth_base, e))?;
        if self.blend_track_limit == 0 {
            return Err(anyhow!("blend_track_limit must be at least 1"));
        }
        Ok(())
    }
}
