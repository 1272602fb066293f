//! The string table behind the REST API.
//!
//! One `.properties` file per language lives in the configured directory:
//! `<base>.properties` or `<base>_<lang>.properties` for the default
//! language, `<base>_<lang>.properties` for everything else. The store keeps
//! every file in memory, answers queries from memory, and rewrites the
//! affected files after each mutation.

pub mod error;
pub mod properties;
pub mod pseudo;

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::config::schema::{PseudoConfig, StoreConfig};
use crate::protocol::StringTable;

pub use error::StoreError;

/// A language's entries and the file they are saved to.
#[derive(Debug, Clone)]
struct LanguageFile {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

/// Files that could not be loaded, and whether a fresh default-language
/// file had to be created.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub skipped: Vec<(PathBuf, String)>,
    pub created_default: bool,
}

/// Result of [`StringStore::query`].
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Languages included in `strings`, default language first.
    pub langs: Vec<String>,
    pub strings: StringTable,
}

/// In-memory view of all language files.
#[derive(Debug)]
pub struct StringStore {
    dir: PathBuf,
    base_filename: String,
    default_lang: String,
    max_results: usize,
    languages: BTreeMap<String, LanguageFile>,
}

/// Matches `<base>.properties` and `<base>_<lang>.properties`, capturing
/// the language code.
pub fn language_file_regex(base_filename: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"^{}(?:_(\w+))?\.properties$",
        regex::escape(base_filename)
    ))
}

impl StringStore {
    /// Load every language file from the configured directory.
    ///
    /// When the directory holds no language file at all, an empty
    /// default-language file is created. The default language is always
    /// present afterwards.
    pub fn open(config: &StoreConfig) -> Result<(Self, LoadReport), StoreError> {
        let dir = PathBuf::from(&config.props_dir);
        let mut store = Self {
            dir,
            base_filename: config.base_filename.clone(),
            default_lang: config.default_lang.clone(),
            max_results: config.max_results,
            languages: BTreeMap::new(),
        };
        let mut report = LoadReport::default();

        for (path, lang) in store.discover_files()? {
            match fs::read_to_string(&path) {
                Ok(text) => {
                    let entries = properties::parse(&text);
                    store
                        .languages
                        .insert(lang, LanguageFile { path, entries });
                }
                Err(e) => report.skipped.push((path, e.to_string())),
            }
        }

        if store.languages.is_empty() {
            let default_lang = store.default_lang.clone();
            let file = LanguageFile {
                path: store.default_file_path(),
                entries: BTreeMap::new(),
            };
            store.languages.insert(default_lang.clone(), file);
            store.save(&default_lang)?;
            report.created_default = true;
        } else if !store.languages.contains_key(&store.default_lang) {
            let file = LanguageFile {
                path: store.default_file_path(),
                entries: BTreeMap::new(),
            };
            store.languages.insert(store.default_lang.clone(), file);
        }

        Ok((store, report))
    }

    /// List `(path, lang)` for every file named like a language file.
    ///
    /// An explicit `<base>_<default>.properties` takes precedence over
    /// `<base>.properties`.
    fn discover_files(&self) -> Result<Vec<(PathBuf, String)>, StoreError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let Ok(file_regex) = language_file_regex(&self.base_filename) else {
            return Ok(Vec::new());
        };

        let read_dir = fs::read_dir(&self.dir).map_err(|source| StoreError::Read {
            path: self.dir.clone(),
            source,
        })?;

        let mut found: Vec<(PathBuf, String, bool)> = read_dir
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                let caps = file_regex.captures(&name)?;
                let explicit = caps.get(1).map(|m| m.as_str().to_string());
                let is_explicit = explicit.is_some();
                let lang = explicit.unwrap_or_else(|| self.default_lang.clone());
                Some((entry.path(), lang, is_explicit))
            })
            .collect();

        // Bare `<base>.properties` first so an explicit default file overrides it.
        found.sort_by(|a, b| a.2.cmp(&b.2).then_with(|| a.0.cmp(&b.0)));

        let mut by_lang: BTreeMap<String, PathBuf> = BTreeMap::new();
        for (path, lang, _) in found {
            by_lang.insert(lang, path);
        }
        Ok(by_lang.into_iter().map(|(lang, path)| (path, lang)).collect())
    }

    fn default_file_path(&self) -> PathBuf {
        self.dir
            .join(format!("{}.properties", self.base_filename))
    }

    /// The authoritative language code.
    pub fn default_lang(&self) -> &str {
        &self.default_lang
    }

    /// All language codes: the default language first, the rest sorted.
    pub fn languages(&self) -> Vec<String> {
        let mut langs = vec![self.default_lang.clone()];
        langs.extend(
            self.languages
                .keys()
                .filter(|lang| **lang != self.default_lang)
                .cloned(),
        );
        langs
    }

    /// Value of `key` in `lang`, if set.
    pub fn get(&self, lang: &str, key: &str) -> Option<&str> {
        self.languages
            .get(lang)?
            .entries
            .get(key)
            .map(String::as_str)
    }

    /// File backing `lang`.
    pub fn path_of(&self, lang: &str) -> Option<&Path> {
        self.languages.get(lang).map(|file| file.path.as_path())
    }

    /// Collect the rows matching `query`.
    ///
    /// Keys are the union over all languages, sorted. A non-empty query keeps
    /// the keys whose default-language value contains it, ignoring case. At
    /// most `max_results` keys are returned. Only the default language is
    /// included unless `show_translations` is set. Missing values are `""`.
    pub fn query(&self, query: &str, show_translations: bool) -> QueryResult {
        let needle = query.to_lowercase();
        let default_entries = self
            .languages
            .get(&self.default_lang)
            .map(|file| &file.entries);

        let all_keys: BTreeSet<&String> = self
            .languages
            .values()
            .flat_map(|file| file.entries.keys())
            .collect();

        let keys = all_keys.into_iter().filter(|key| {
            if needle.is_empty() {
                return true;
            }
            let value = default_entries
                .and_then(|entries| entries.get(*key))
                .map(String::as_str)
                .unwrap_or("");
            value.to_lowercase().contains(&needle)
        });

        let langs = if show_translations {
            self.languages()
        } else {
            vec![self.default_lang.clone()]
        };

        let strings: StringTable = keys
            .take(self.max_results)
            .map(|key| {
                let values: BTreeMap<String, String> = langs
                    .iter()
                    .map(|lang| {
                        let value = self.get(lang, key).unwrap_or("").to_string();
                        (lang.clone(), value)
                    })
                    .collect();
                (key.clone(), values)
            })
            .collect();

        QueryResult { langs, strings }
    }

    /// Create a key in every language.
    ///
    /// An empty `key` is derived from `value`. The default language receives
    /// `value`; every other language a pseudo-translation. Returns the key
    /// that was used.
    pub fn add(
        &mut self,
        key: &str,
        value: &str,
        pseudo: &PseudoConfig,
    ) -> Result<String, StoreError> {
        if value.is_empty() {
            return Err(StoreError::EmptyValue);
        }

        let key = if key.is_empty() {
            pseudo::derive_key(value)
        } else {
            key.to_string()
        };

        if self.get(&self.default_lang, &key).is_some() {
            return Err(StoreError::KeyExists(key));
        }

        for (lang, file) in self.languages.iter_mut() {
            let text = if *lang == self.default_lang {
                value.to_string()
            } else {
                pseudo::pseudo_translate(value, lang, pseudo)
            };
            file.entries.insert(key.clone(), text);
        }

        self.save_all()?;
        Ok(key)
    }

    /// Set one value. The key is created in `lang` if missing.
    pub fn edit(&mut self, key: &str, lang: &str, value: &str) -> Result<(), StoreError> {
        if key.is_empty() || lang.is_empty() {
            return Err(StoreError::MissingKeyOrLang);
        }

        let file = self
            .languages
            .get_mut(lang)
            .ok_or_else(|| StoreError::UnknownLanguage(lang.to_string()))?;
        file.entries.insert(key.to_string(), value.to_string());

        self.save(lang)
    }

    /// Remove `key` from every language.
    pub fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }

        for file in self.languages.values_mut() {
            file.entries.remove(key);
        }

        self.save_all()
    }

    fn save_all(&self) -> Result<(), StoreError> {
        for lang in self.languages.keys() {
            self.save(lang)?;
        }
        Ok(())
    }

    /// Rewrite the file of `lang`, creating the directory if needed.
    fn save(&self, lang: &str) -> Result<(), StoreError> {
        let Some(file) = self.languages.get(lang) else {
            return Err(StoreError::UnknownLanguage(lang.to_string()));
        };
        let path = file.path.clone();

        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Write {
            path: self.dir.clone(),
            source,
        })?;
        fs::write(&path, properties::write(&file.entries))
            .map_err(|source| StoreError::Write { path, source })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
