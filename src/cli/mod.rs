//! # CLI Module
//!
//! User-facing commands of the harvester. Each command wires the Spotify
//! client into the gather engine, reports progress through an indicatif
//! spinner, and finishes by writing a CSV file and/or printing a table
//! preview. Fatal conditions (missing credential, broken output path) exit
//! through the `error!` macro; recoverable fetch failures are already
//! handled inside the engine and only shrink the result.

mod harvest;
mod playlists;

pub use harvest::harvest;
pub use playlists::playlists;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::table::{Table, cell_display};

/// Spinner used by all long-running commands.
pub(crate) fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}

/// Renders the first `limit` rows for the console, truncating long cells.
pub(crate) fn preview(table: &Table, limit: usize) -> tabled::Table {
    let mut builder = tabled::builder::Builder::default();
    builder.push_record(table.columns().iter().cloned());
    for row in table.rows().iter().take(limit) {
        builder.push_record(row.iter().map(|cell| {
            let text = cell_display(cell);
            if text.chars().count() > 40 {
                let mut truncated: String = text.chars().take(37).collect();
                truncated.push_str("...");
                truncated
            } else {
                text
            }
        }));
    }
    builder.build()
}
