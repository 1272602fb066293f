/// Configuration schema and defaults for propdesk.
///
/// Defines the TOML-serializable configuration structure with the sections
/// `[store]`, `[pseudo]`, `[display]`, `[server]`, `[client]`, and
/// `[logging]`.
///
/// Every field has a built-in default. Users only need to set the values
/// they want to override.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level propdesk configuration.
///
/// Maps directly to the `~/.propdesk/config.toml` and `.propdesk.toml` file
/// schemas. All sections and fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub store: StoreConfig,
    pub pseudo: PseudoConfig,
    pub display: DisplayConfig,
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [store]
// ---------------------------------------------------------------------------

/// Where the `.properties` files live and how they are named.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory scanned for language files.
    pub props_dir: String,
    /// File name stem: `messages` → `messages.properties`, `messages_fr.properties`.
    pub base_filename: String,
    /// Authoritative language. Its values are editable in the panel and
    /// `<base>.properties` maps to it.
    pub default_lang: String,
    /// Maximum number of keys returned by a single query.
    pub max_results: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            props_dir: "resources".to_string(),
            base_filename: "messages".to_string(),
            default_lang: "en".to_string(),
            max_results: 250,
        }
    }
}

// ---------------------------------------------------------------------------
// [pseudo]
// ---------------------------------------------------------------------------

/// Pseudo-translation settings applied to non-default languages on add.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PseudoConfig {
    /// Length multiplier for any language missing from `length_multipliers`.
    pub default_multiplier: f64,
    /// Expected text expansion per language, relative to the default language.
    pub length_multipliers: BTreeMap<String, f64>,
}

impl Default for PseudoConfig {
    fn default() -> Self {
        let length_multipliers = [
            ("es", 1.25),
            ("fi", 1.1),
            ("fr", 1.2),
            ("nl", 1.2),
            ("pt", 1.2),
        ]
        .into_iter()
        .map(|(lang, m)| (lang.to_string(), m))
        .collect();

        Self {
            default_multiplier: 1.1,
            length_multipliers,
        }
    }
}

impl PseudoConfig {
    /// Multiplier for `lang`, falling back to `default_multiplier`.
    pub fn multiplier_for(&self, lang: &str) -> f64 {
        self.length_multipliers
            .get(lang)
            .copied()
            .unwrap_or(self.default_multiplier)
    }
}

// ---------------------------------------------------------------------------
// [display]
// ---------------------------------------------------------------------------

/// Panel display preferences persisted by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Whether non-default-language columns are returned and rendered.
    pub show_translations: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_translations: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [server]
// ---------------------------------------------------------------------------

/// HTTP server settings for `propdesk serve`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address.
    pub addr: String,
    /// Open the panel in the default browser on startup.
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8080".to_string(),
            open_browser: false,
        }
    }
}

// ---------------------------------------------------------------------------
// [client]
// ---------------------------------------------------------------------------

/// Settings for the CLI panel talking to a running server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the propdesk server.
    pub base_url: String,
    /// Per-request timeout (milliseconds).
    pub timeout_ms: u64,
    /// Quiet period before a filter change is sent (milliseconds).
    pub debounce_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            timeout_ms: 10_000,
            debounce_ms: 300,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Activity log settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether mutations are recorded in the activity log.
    pub enabled: bool,
    /// Path to the JSONL activity log. `~` is expanded to the home directory.
    pub path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.propdesk/activity.jsonl".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default config file
// ---------------------------------------------------------------------------

impl EditorConfig {
    /// Annotated default configuration written by `propdesk config init`.
    pub fn default_toml() -> String {
        r#"# propdesk configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (PROPDESK_*)
#   2. Project config (.propdesk.toml in current directory)
#   3. User global config (~/.propdesk/config.toml)
#   4. Built-in defaults

[store]
props_dir = "resources"
base_filename = "messages"   # messages.properties, messages_fr.properties, ...
default_lang = "en"
max_results = 250

[pseudo]
default_multiplier = 1.1     # Used for languages not listed below

[pseudo.length_multipliers]
es = 1.25
fi = 1.1
fr = 1.2
nl = 1.2
pt = 1.2

[display]
show_translations = true

[server]
addr = "127.0.0.1:8080"
open_browser = false

[client]
base_url = "http://127.0.0.1:8080"
timeout_ms = 10000
debounce_ms = 300

[logging]
enabled = true
path = "~/.propdesk/activity.jsonl"
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_toml_matches_defaults() {
        let parsed: EditorConfig = toml::from_str(&EditorConfig::default_toml()).unwrap();
        assert_eq!(parsed, EditorConfig::default());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
[store]
props_dir = "i18n"

[display]
show_translations = false
"#;
        let config: EditorConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.store.props_dir, "i18n");
        assert_eq!(config.store.base_filename, "messages");
        assert!(!config.display.show_translations);
        assert_eq!(config.client.debounce_ms, 300);
    }

    #[test]
    fn multiplier_falls_back_to_default() {
        let pseudo = PseudoConfig::default();
        assert!((pseudo.multiplier_for("es") - 1.25).abs() < f64::EPSILON);
        assert!((pseudo.multiplier_for("de") - 1.1).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_toml_is_default() {
        let config: EditorConfig = toml::from_str("").unwrap();
        assert_eq!(config, EditorConfig::default());
    }
}
