//! Configuration management for the playlist harvester.
//!
//! This module handles loading and accessing configuration values from
//! environment variables and an optional `.env` file. The configuration
//! system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)
//!
//! The bearer credential is deliberately read once and passed into the
//! client as an immutable value; nothing in this module mutates state after
//! startup.

use std::{env, path::PathBuf};

use crate::error::GatherError;

/// Loads environment variables from a `.env` file in the local data
/// directory (`spogather/.env`), creating the directory if needed. A missing
/// file is not an error: everything can also come from the environment.
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spogather/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Base URL of the Spotify Web API. Overridable through `SPOTIFY_API_URL`,
/// which is also how tests and mock servers point the client elsewhere.
pub fn spotify_apiurl() -> String {
    env::var("SPOTIFY_API_URL").unwrap_or_else(|_| "https://api.spotify.com/v1".to_string())
}

/// The bearer token attached to every request, from `SPOTIFY_API_TOKEN`.
///
/// Token acquisition is an external concern; this tool only consumes one.
pub fn spotify_token() -> Result<String, GatherError> {
    env::var("SPOTIFY_API_TOKEN")
        .map_err(|_| GatherError::Auth("SPOTIFY_API_TOKEN must be set".to_string()))
}

/// Per-request timeout in seconds (`SPOGATHER_REQUEST_TIMEOUT`, default 30).
pub fn request_timeout_secs() -> u64 {
    env::var("SPOGATHER_REQUEST_TIMEOUT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(30)
}

/// Maximum retries for transient fetch failures
/// (`SPOGATHER_MAX_RETRIES`, default 3).
pub fn max_fetch_retries() -> u32 {
    env::var("SPOGATHER_MAX_RETRIES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3)
}
