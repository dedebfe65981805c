//! Spotify Playlist Harvester Library
//!
//! This library implements a paginated, fault-tolerant bulk-fetch engine for
//! the Spotify Web API. It pages through playlist search results and playlist
//! contents, flattens the nested JSON records into flat tables, and enriches
//! the result with per-track audio features fetched in batches.
//!
//! # Modules
//!
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - Error types for fetch, join, and precondition failures
//! - `flatten` - Nested-record flattening into prefixed columns
//! - `gather` - The pagination/accumulation/join engine
//! - `spotify` - Spotify Web API client implementation
//! - `table` - In-memory tabular structure and join operations
//! - `types` - Wire-level data structures
//!
//! # Example
//!
//! ```
//! use spogather::{gather, spotify::SpotifyClient, table::JoinKind};
//!
//! #[tokio::main]
//! async fn main() -> spogather::Res<()> {
//!     let client = SpotifyClient::from_env()?;
//!     let playlists = gather::search_playlists_table(&client, "deep house", 100).await?;
//!     let tracks = gather::aggregate(&client, &playlists, JoinKind::Left).await?;
//!     println!("harvested {} rows", tracks.len());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod flatten;
pub mod gather;
pub mod spotify;
pub mod table;
pub mod types;

/// A convenient Result type alias for operations that may fail.
///
/// Provides a standard error handling pattern throughout the application
/// using a boxed dynamic error trait object. This allows for flexible
/// error handling while maintaining Send + Sync bounds for async contexts.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Used only for unrecoverable errors: missing configuration, a broken
/// credential, or a precondition violation the caller must fix. Recoverable
/// fetch failures go through [`warning!`] and degrade to partial results.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// This is the channel for the catch-log-continue failure policy: every
/// per-page, per-batch, and per-collection failure is reported here with
/// enough context (resource id, offset) to resume manually.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
