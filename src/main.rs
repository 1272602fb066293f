use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use propdesk::{cli, config, web};

#[derive(Debug, Parser)]
#[command(name = "propdesk")]
#[command(about = "Browse and edit Java .properties translations")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the editor panel and REST API
    Serve {
        /// Listen address (default from config: 127.0.0.1:8080)
        #[arg(long)]
        addr: Option<String>,
        /// Directory holding the .properties files
        #[arg(long)]
        dir: Option<String>,
        /// Open the panel in the default browser
        #[arg(long)]
        open: bool,
    },
    /// Print the string table from a running server
    List {
        /// Case-insensitive substring of the English value
        query: Option<String>,
        /// Output format: table (default), json, html
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Add an English string with pseudo-translations
    Add {
        /// English value
        #[arg(long)]
        value: String,
        /// Key (derived from the value when omitted)
        #[arg(long, default_value = "")]
        key: String,
    },
    /// Change one value
    Edit { key: String, lang: String, value: String },
    /// Remove a key from all language files
    Remove {
        key: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Show or hide translation columns
    Translations {
        #[arg(value_enum)]
        state: Toggle,
    },
    /// Show recent changes from the activity log
    History {
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Check config, properties directory and server
    Health,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default config to ~/.propdesk/config.toml
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. `store.props_dir resources`
    Set { key: String, value: String },
    /// Overwrite the global config with defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Serve { addr, dir, open } => {
            let mut cfg = config::load();
            if let Some(addr) = addr {
                cfg.server.addr = addr;
            }
            if let Some(dir) = dir {
                cfg.store.props_dir = dir;
            }
            cfg.server.open_browser |= open;
            web::serve(cfg, config::project_config_file())
        }
        Commands::List { query, format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_list(query.as_deref().unwrap_or(""), fmt)
        }
        Commands::Add { value, key } => cli::run_add(&key, &value),
        Commands::Edit { key, lang, value } => cli::run_edit(&key, &lang, &value),
        Commands::Remove { key, yes } => cli::run_remove(&key, yes),
        Commands::Translations { state } => cli::run_translations(matches!(state, Toggle::On)),
        Commands::History { limit } => cli::run_history(limit),
        Commands::Health => cli::run_health(),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
