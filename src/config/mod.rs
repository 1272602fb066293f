/// Configuration system for propdesk.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults** — hardcoded in [`schema::EditorConfig::default()`]
/// 2. **User global config** — `~/.propdesk/config.toml`
/// 3. **Project local config** — `.propdesk.toml` in the current working directory
/// 4. **Environment variables** — `PROPDESK_*` overrides (highest precedence)
///
/// Layers are merged at the key level: a file that only sets
/// `display.show_translations` leaves every other value of the previous
/// layer untouched.
///
/// The server persists the panel's display preference into the project
/// layer, so a preference toggled in the browser survives restarts.
///
/// # Usage
///
/// ```rust,ignore
/// use propdesk::config;
///
/// let cfg = config::load();
/// println!("serving {} from {}", cfg.store.base_filename, cfg.store.props_dir);
/// ```
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use schema::EditorConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved propdesk configuration.
///
/// Merges defaults → global TOML → project TOML → env vars. Malformed files
/// are reported on stderr and skipped.
pub fn load() -> EditorConfig {
    let mut config = load_layers(&[global_config_path(), project_config_path()]);
    apply_env_overrides(&mut config);
    config
}

/// Merge the given TOML files, in order, over the built-in defaults.
///
/// Missing paths and missing files are skipped. Env overrides are not
/// applied.
pub fn load_layers(paths: &[Option<PathBuf>]) -> EditorConfig {
    let Ok(mut merged) = toml::Value::try_from(EditorConfig::default()) else {
        return EditorConfig::default();
    };

    for path in paths.iter().flatten() {
        if let Some(layer) = read_toml_value(path) {
            merge_toml(&mut merged, layer);
        }
    }

    match merged.try_into() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("propdesk: ignoring invalid configuration: {e}");
            EditorConfig::default()
        }
    }
}

/// Read a TOML file as a raw value tree.
///
/// Returns `None` if the file doesn't exist or can't be parsed.
fn read_toml_value(path: &Path) -> Option<toml::Value> {
    let content = fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            eprintln!("propdesk: skipping malformed config {}: {e}", path.display());
            None
        }
    }
}

/// Recursively merge `overlay` into `base`. Tables merge key by key; any
/// other value in the overlay replaces the base value.
fn merge_toml(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.propdesk/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".propdesk").join("config.toml"))
}

/// Path to the project local config: `.propdesk.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".propdesk.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `PROPDESK_PROPS_DIR` — directory holding the `.properties` files
/// - `PROPDESK_BASE_FILENAME` — file name stem
/// - `PROPDESK_ADDR` — server listen address
/// - `PROPDESK_URL` — server base URL used by client commands
/// - `PROPDESK_SHOW_TRANSLATIONS` — display preference (`1`/`true`/`yes`/`on`)
/// - `PROPDESK_LOG` — activity logging enabled
fn apply_env_overrides(config: &mut EditorConfig) {
    if let Ok(val) = std::env::var("PROPDESK_PROPS_DIR")
        && !val.is_empty()
    {
        config.store.props_dir = val;
    }
    if let Ok(val) = std::env::var("PROPDESK_BASE_FILENAME")
        && !val.is_empty()
    {
        config.store.base_filename = val;
    }
    if let Ok(val) = std::env::var("PROPDESK_ADDR")
        && !val.is_empty()
    {
        config.server.addr = val;
    }
    if let Ok(val) = std::env::var("PROPDESK_URL")
        && !val.is_empty()
    {
        config.client.base_url = val;
    }
    if let Ok(val) = std::env::var("PROPDESK_SHOW_TRANSLATIONS") {
        config.display.show_translations = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("PROPDESK_LOG") {
        config.logging.enabled = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
pub fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.propdesk/config.toml`.
///
/// Returns an error if the file already exists (use `force = true` to
/// overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.propdesk/ directory")?;
    }

    fs::write(&path, EditorConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key in the global config file.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;
    set_value_in_file(&path, key, value)
}

/// Set a dotted `key` to `raw_value` in the TOML file at `path`.
///
/// Only the given key is written; the file is created (with any missing
/// sections) if needed. The value is parsed according to the type of the
/// same key in the built-in defaults, so unknown keys are rejected.
pub fn set_value_in_file(path: &Path, key: &str, raw_value: &str) -> Result<()> {
    let mut root = if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse {} as TOML", path.display()))?
    } else {
        toml::Value::Table(toml::map::Map::new())
    };

    set_toml_value(&mut root, key, raw_value)?;

    let output = toml::to_string_pretty(&root).context("failed to serialize config")?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(path, output).with_context(|| format!("failed to write {}", path.display()))?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
///
/// Missing intermediate tables are created.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').filter(|p| !p.is_empty()).collect();
    let Some((leaf, sections)) = parts.split_last() else {
        anyhow::bail!("empty config key");
    };

    let new_value = typed_value_for(key, sections, leaf, raw_value)?;

    let mut current = root;
    for &part in sections {
        let table = current
            .as_table_mut()
            .with_context(|| format!("expected table above '{part}' in '{key}'"))?;
        current = table
            .entry(part.to_string())
            .or_insert(toml::Value::Table(toml::map::Map::new()));
    }

    let table = current
        .as_table_mut()
        .with_context(|| format!("expected table at '{}'", sections.join(".")))?;
    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Parse `raw_value` into the TOML type the defaults use for `key`.
///
/// Keys inside a map section (such as `pseudo.length_multipliers.de`) take
/// the type of their siblings.
fn typed_value_for(
    key: &str,
    sections: &[&str],
    leaf: &str,
    raw_value: &str,
) -> Result<toml::Value> {
    let defaults =
        toml::Value::try_from(EditorConfig::default()).context("failed to serialize defaults")?;

    let mut parent = &defaults;
    for &part in sections {
        parent = parent
            .get(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }
    let parent = parent
        .as_table()
        .with_context(|| format!("config key not found: '{key}'"))?;

    let template = match parent.get(leaf) {
        Some(existing) => existing,
        None if is_map_section(sections) => parent
            .values()
            .next()
            .with_context(|| format!("config key not found: '{key}'"))?,
        None => anyhow::bail!("config key not found: '{key}'"),
    };

    let value = match template {
        toml::Value::Boolean(_) => toml::Value::Boolean(is_truthy(raw_value)),
        toml::Value::Integer(_) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        toml::Value::Float(_) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        toml::Value::Table(_) => anyhow::bail!("'{key}' is a section, not a value"),
        _ => toml::Value::String(raw_value.to_string()),
    };
    Ok(value)
}

/// Sections whose keys are free-form (language codes).
fn is_map_section(sections: &[&str]) -> bool {
    sections == ["pseudo", "length_multipliers"]
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
