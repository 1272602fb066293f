//! CLI command implementations for propdesk.
//!
//! Provides subcommand handlers for:
//! - `propdesk list [query]` — print the string table
//! - `propdesk add | edit | remove` — change strings through the server
//! - `propdesk translations on|off` — switch the display preference
//! - `propdesk history` — recent changes from the activity log
//! - `propdesk health` — check config, properties directory, server
//! - `propdesk config show|init|set|reset` — configuration management
//!
//! Client commands drive the same [`Panel`] as the browser, talking to a
//! running `propdesk serve` over HTTP.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Result, bail};
use colored::Colorize;

use crate::activity::logger::{self, ActivityEntry};
use crate::config::{self, EditorConfig};
use crate::panel::client::HttpApi;
use crate::panel::render::{self, Table};
use crate::panel::{Outcome, Panel, Prompter};
use crate::protocol::StringsResponse;
use crate::store;

/// Output format for `list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Html,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("html") => Self::Html,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// Terminal prompter
// ---------------------------------------------------------------------------

/// Prints alerts to stdout and reads confirmations from stdin.
pub struct TerminalPrompter {
    assume_yes: bool,
}

impl TerminalPrompter {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Prompter for TerminalPrompter {
    fn alert(&mut self, message: &str) {
        println!("{message}");
    }

    fn confirm(&mut self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{message} [y/N] ");
        let _ = io::stdout().flush();

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_yes(&answer)
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn open_panel(cfg: &EditorConfig, assume_yes: bool) -> Panel<HttpApi, TerminalPrompter> {
    Panel::new(
        HttpApi::from_config(&cfg.client),
        TerminalPrompter::new(assume_yes),
        &cfg.store.default_lang,
        Duration::from_millis(cfg.client.debounce_ms),
    )
}

fn check_outcome(outcome: Outcome, action: &str) -> Result<()> {
    match outcome {
        Outcome::Done => Ok(()),
        Outcome::Cancelled => {
            println!("{}", "Cancelled.".dimmed());
            Ok(())
        }
        Outcome::Blocked | Outcome::Failed => bail!("{action} failed"),
    }
}

// ---------------------------------------------------------------------------
// propdesk list
// ---------------------------------------------------------------------------

/// Print the string table, optionally filtered by `query`.
pub fn run_list(query: &str, format: OutputFormat) -> Result<()> {
    let cfg = config::load();
    let panel = open_panel(&cfg, false);
    panel.fetch(&query.to_lowercase())?;
    let state = panel.state();

    match format {
        OutputFormat::Json => {
            let response = StringsResponse {
                langs: state.snapshot.languages,
                strings: state.snapshot.strings,
                show_translations: state.show_translations,
            };
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Html => println!("{}", state.view.to_html()),
        OutputFormat::Table => {
            if state.view.rows.is_empty() {
                println!("{}", "No strings match.".yellow());
            } else {
                print_table(&state.view);
            }
        }
    }

    Ok(())
}

fn print_table(table: &Table) {
    let languages = table.visible_languages();
    let key_width = table
        .rows
        .iter()
        .map(|r| r.key.chars().count())
        .max()
        .unwrap_or(0)
        .clamp(3, 40);

    let mut heading = format!("  {:<key_width$}", render::HEADER[0]);
    for lang in &languages {
        heading.push_str(&format!("  {:<30}", render::display_name(lang)));
    }
    println!("{}", heading.bold().cyan());
    println!("  {}", "-".repeat(key_width + 32 * languages.len()));

    for (i, row) in table.rows.iter().enumerate() {
        let mut line = format!("  {:<key_width$}", truncate(&row.key, key_width));
        for cell in &row.cells {
            line.push_str(&format!("  {:<30}", truncate(&cell.value, 30)));
        }

        if i % 2 == 0 {
            println!("{}", line);
        } else {
            println!("{}", line.dimmed());
        }
    }

    println!();
    println!("  {} {}", "Keys:".bold(), table.rows.len());
}

// ---------------------------------------------------------------------------
// propdesk add | edit | remove
// ---------------------------------------------------------------------------

/// Add an English string; the key is derived from the value when empty.
pub fn run_add(key: &str, value: &str) -> Result<()> {
    let cfg = config::load();
    let panel = open_panel(&cfg, false);
    panel.set_new_entry(key, value);

    let outcome = panel.add();
    if outcome == Outcome::Done {
        println!("{} Added {}", "✓".green().bold(), value.bold());
    }
    check_outcome(outcome, "add")
}

/// Save one value.
pub fn run_edit(key: &str, lang: &str, value: &str) -> Result<()> {
    let cfg = config::load();
    let panel = open_panel(&cfg, false);
    check_outcome(panel.edit(key, lang, value), "edit")
}

/// Remove a key from every language file.
pub fn run_remove(key: &str, assume_yes: bool) -> Result<()> {
    let cfg = config::load();
    let panel = open_panel(&cfg, assume_yes);

    let outcome = panel.remove(key);
    if outcome == Outcome::Done {
        println!("{} Removed {}", "✓".green().bold(), key.bold());
    }
    check_outcome(outcome, "remove")
}

// ---------------------------------------------------------------------------
// propdesk translations on|off
// ---------------------------------------------------------------------------

/// Persist the display preference on the server.
pub fn run_translations(show: bool) -> Result<()> {
    let cfg = config::load();
    let panel = open_panel(&cfg, false);
    panel.toggle_translations(show)?;
    println!(
        "{} Translations {}",
        "✓".green().bold(),
        if show { "shown" } else { "hidden" }
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// propdesk history
// ---------------------------------------------------------------------------

/// Show the most recent activity log entries.
pub fn run_history(limit: usize) -> Result<()> {
    let cfg = config::load();
    let entries = logger::read_recent(&cfg.logging, limit);

    if entries.is_empty() {
        println!(
            "{}",
            "No activity yet. Changes made through `propdesk serve` are logged here.".yellow()
        );
        return Ok(());
    }

    println!("{}", "Recent Activity".bold().cyan());
    println!(
        "  {:<19} {:<18} {:<28} {:<6} Detail",
        "Time", "Action", "Key", "Lang"
    );
    println!("  {}", "-".repeat(80));
    for entry in &entries {
        println!("{}", format_entry(entry));
    }

    Ok(())
}

fn format_entry(entry: &ActivityEntry) -> String {
    let time = chrono::DateTime::parse_from_rfc3339(&entry.timestamp)
        .map(|t| {
            t.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|_| entry.timestamp.clone());

    let line = format!(
        "  {:<19} {:<18} {:<28} {:<6} {}",
        time,
        entry.action,
        truncate(entry.key.as_deref().unwrap_or("-"), 28),
        entry.lang.as_deref().unwrap_or("-"),
        entry.detail.as_deref().unwrap_or(""),
    );

    if entry.success {
        line
    } else {
        line.red().to_string()
    }
}

// ---------------------------------------------------------------------------
// propdesk health
// ---------------------------------------------------------------------------

/// Check config files, the properties directory and the server.
pub fn run_health() -> Result<()> {
    println!("{}", "propdesk Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    // Config files
    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let cfg = config::load();
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.propdesk/config.toml found"
        } else {
            "not found (run `propdesk config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".propdesk.toml found"
        } else {
            "none (optional)"
        },
    );

    // Properties files
    let props_dir = Path::new(&cfg.store.props_dir);
    let file_count = count_properties_files(props_dir, &cfg.store.base_filename);
    print_health_item(
        "Properties directory",
        props_dir.is_dir(),
        &if props_dir.is_dir() {
            format!(
                "{} ({} {}*.properties files)",
                props_dir.display(),
                file_count,
                cfg.store.base_filename
            )
        } else {
            format!("{} not found", props_dir.display())
        },
    );

    // Server
    let api = HttpApi::from_config(&cfg.client);
    let reachable = api.is_reachable();
    print_health_item(
        "Server",
        reachable,
        &if reachable {
            format!("reachable at {}", api.base_url())
        } else {
            format!("not reachable at {} (run `propdesk serve`)", api.base_url())
        },
    );

    // Activity log
    let log_path = logger::activity_log_path(&cfg.logging);
    let log_exists = log_path.exists();
    print_health_item(
        "Activity log",
        cfg.logging.enabled,
        &if !cfg.logging.enabled {
            "disabled".to_string()
        } else if log_exists {
            format!("{} entries", logger::read_all_entries(&cfg.logging).len())
        } else {
            "no log file yet".to_string()
        },
    );

    Ok(())
}

fn count_properties_files(dir: &Path, base_filename: &str) -> usize {
    let Ok(file_regex) = store::language_file_regex(base_filename) else {
        return 0;
    };
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .filter_map(|e| e.ok())
        .filter(|e| file_regex.is_match(&e.file_name().to_string_lossy()))
        .count()
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<22} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// propdesk config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective propdesk Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.propdesk/config.toml", global_exists);
    print_source(".propdesk.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "PROPDESK_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.propdesk/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 5), "hell…");
        assert_eq!(truncate("ab", 2), "ab");
        assert_eq!(truncate("Olá mundo", 4), "Olá…");
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("html")), OutputFormat::Html);
        assert_eq!(
            OutputFormat::from_str_opt(Some("unknown")),
            OutputFormat::Table
        );
    }

    #[test]
    fn test_confirmation_answers() {
        assert!(is_yes("y\n"));
        assert!(is_yes("YES"));
        assert!(!is_yes("\n"));
        assert!(!is_yes("nope"));
    }

    #[test]
    fn assume_yes_skips_stdin() {
        let mut prompter = TerminalPrompter::new(true);
        assert!(prompter.confirm("Remove?"));
    }

    #[test]
    fn failed_entries_render_with_detail() {
        colored::control::set_override(false);
        let entry = ActivityEntry::now("add")
            .with_key("Hello")
            .failed("Key already exists");
        let line = format_entry(&entry);
        assert!(line.contains("add"));
        assert!(line.contains("Hello"));
        assert!(line.contains("Key already exists"));
    }

    #[test]
    fn counts_only_matching_properties_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("messages.properties"), "").unwrap();
        std::fs::write(dir.path().join("messages_fr.properties"), "").unwrap();
        std::fs::write(dir.path().join("other.properties"), "").unwrap();
        std::fs::write(dir.path().join("messagesOld.properties"), "").unwrap();
        std::fs::write(dir.path().join("messages.txt"), "").unwrap();
        assert_eq!(count_properties_files(dir.path(), "messages"), 2);
    }
}
