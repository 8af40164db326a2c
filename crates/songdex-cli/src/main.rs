use anyhow::Result;
use clap::Parser;
use songdex_worker::{logging, Config};

mod commands;
mod session;
mod tui;
mod view;

#[derive(Debug, Parser)]
#[command(name = "songdex", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Song catalog: a JSON file or an http(s) URL (default: KaraokeList_Auto.json)
    #[arg(long, global = true)]
    catalog: Option<String>,

    /// Maximum number of songs shown for a search (default: 450)
    #[arg(long, global = true)]
    cap: Option<usize>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Search the catalog interactively (the default)
    ///
    /// Loads the catalog into a background search worker and opens a
    /// full-screen search box. Results update as you type, a short moment
    /// after the last keystroke, and are ordered newest first, then by
    /// title.
    ///
    /// Keys:
    /// - Up/Down, PageUp/PageDown: move the selection
    /// - Enter: open the selected song (link_base + song code)
    /// - Ctrl-Y: copy the selected song code to the terminal clipboard
    /// - Esc or Ctrl-C: quit
    Search,
    /// Run one search and print the matching songs
    Query {
        /// Text to look for in title and artist (case-insensitive)
        #[arg(default_value = "")]
        term: String,

        /// Print every match as JSON instead of a capped table
        #[arg(long)]
        json: bool,
    },
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the effective configuration (default)
    Show,
    /// Print one setting, or the whole config file
    Get { key: Option<String> },
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file with defaults if it doesn't exist
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?.with_overrides(cli.catalog, cli.cap);
    let command = cli.command.unwrap_or(Commands::Search);

    // The search screen owns the terminal, so its log goes to a file.
    let output =
        matches!(command, Commands::Search).then(|| logging::screen_output(&config.logging));
    if let Err(e) = logging::init(&config.logging, cli.log_level.as_deref(), output) {
        eprintln!("warning: {e:#}");
    }

    match command {
        Commands::Search => {
            commands::run_search(config).await?;
        }
        Commands::Query { term, json } => {
            commands::run_query(&config, &term, json).await?;
        }
        Commands::Config { action } => match action.unwrap_or(ConfigAction::Show) {
            ConfigAction::Show => commands::config::show_config(&config)?,
            ConfigAction::Get { key } => commands::config::get_config(&config, key)?,
            ConfigAction::Path => commands::config::show_path()?,
            ConfigAction::Example => commands::config::show_example()?,
            ConfigAction::Init => commands::config::init_config()?,
        },
    }

    Ok(())
}
