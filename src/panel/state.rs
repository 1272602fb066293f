use crate::protocol::{StringTable, StringsResponse};

use super::render::{Table, render_table};

/// The string table as last returned by the server.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Column order, default language first.
    pub languages: Vec<String>,
    pub strings: StringTable,
}

/// The "new string" inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryForm {
    pub key: String,
    pub value: String,
}

impl EntryForm {
    pub fn clear(&mut self) {
        self.key.clear();
        self.value.clear();
    }
}

/// Everything the panel shows.
///
/// Replaced wholesale on every fetch; nothing is merged.
#[derive(Debug, Clone)]
pub struct PanelState {
    pub snapshot: Snapshot,
    pub show_translations: bool,
    /// Current filter text, as typed.
    pub query: String,
    pub form: EntryForm,
    /// Result of the last render.
    pub view: Table,
    /// Used until the server has named its default language.
    fallback_lang: String,
}

impl PanelState {
    pub fn new(fallback_lang: impl Into<String>) -> Self {
        Self {
            snapshot: Snapshot::default(),
            show_translations: true,
            query: String::new(),
            form: EntryForm::default(),
            view: Table::default(),
            fallback_lang: fallback_lang.into(),
        }
    }

    /// Swap in a fresh server response and re-render.
    pub fn apply(&mut self, response: StringsResponse) {
        self.snapshot = Snapshot {
            languages: response.langs,
            strings: response.strings,
        };
        self.show_translations = response.show_translations;
        self.rerender();
    }

    /// Rebuild the view from the loaded snapshot.
    pub fn rerender(&mut self) {
        self.view = render_table(&self.snapshot, self.show_translations, self.default_lang());
    }

    /// The server lists its default language first.
    pub fn default_lang(&self) -> &str {
        self.snapshot
            .languages
            .first()
            .map(String::as_str)
            .unwrap_or(&self.fallback_lang)
    }
}
