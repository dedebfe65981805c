use std::path::PathBuf;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use spogather::{cli, config, error};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Search playlists and export them as a table
    Playlists(PlaylistsOptions),

    /// Harvest all tracks (and optionally audio features) of the playlists
    /// matching a query
    ///
    /// Nested album data is flattened into album_* columns; list-valued
    /// columns such as artists are written to the CSV as JSON text.
    Harvest(HarvestOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct PlaylistsOptions {
    /// Search query, e.g. a genre name
    pub query: String,

    /// How many playlists to collect
    #[clap(long, default_value_t = 50)]
    pub count: u64,

    /// Write the result to this CSV file
    #[clap(long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct HarvestOptions {
    /// Search query, e.g. a genre name
    pub query: String,

    /// How many playlists to harvest tracks from
    #[clap(long, default_value_t = 50)]
    pub count: u64,

    /// Also fetch and join per-track audio features
    #[clap(long)]
    pub features: bool,

    /// Write the result to this CSV file (default: harvest-<date>.csv)
    #[clap(long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Playlists(opt) => cli::playlists(opt.query, opt.count, opt.output).await,
        Command::Harvest(opt) => {
            cli::harvest(opt.query, opt.count, opt.features, opt.output).await
        }
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
