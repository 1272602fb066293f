//! Table construction from a fetched snapshot.
//!
//! Rendering is pure: the same snapshot and display preference always give
//! the same [`Table`]. The table can then be emitted as an HTML fragment or
//! printed by the CLI.

use super::state::Snapshot;

/// Column headings of the strings table.
pub const HEADER: [&str; 3] = ["Key", "Values", "Actions"];

/// One language input of a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub lang: String,
    /// Shown next to the input while translations are visible.
    pub label: Option<String>,
    pub value: String,
    /// Only the default language is editable.
    pub editable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub key: String,
    pub cells: Vec<Cell>,
}

/// A rendered strings table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<Row>,
}

/// Build the table for `snapshot`.
///
/// Languages are taken in snapshot order. Unless `show_translations` is set,
/// only the default language (`default_lang`) gets a cell.
pub fn render_table(snapshot: &Snapshot, show_translations: bool, default_lang: &str) -> Table {
    let visible: Vec<&String> = snapshot
        .languages
        .iter()
        .filter(|lang| show_translations || lang.as_str() == default_lang)
        .collect();

    let rows = snapshot
        .strings
        .iter()
        .map(|(key, values)| Row {
            key: key.clone(),
            cells: visible
                .iter()
                .map(|lang| Cell {
                    lang: (*lang).clone(),
                    label: show_translations.then(|| display_name(lang)),
                    value: values.get(*lang).cloned().unwrap_or_default(),
                    editable: lang.as_str() == default_lang,
                })
                .collect(),
        })
        .collect();

    Table { rows }
}

impl Table {
    /// Languages that have a column, in order. Empty for an empty table.
    pub fn visible_languages(&self) -> Vec<&str> {
        self.rows
            .first()
            .map(|row| row.cells.iter().map(|c| c.lang.as_str()).collect())
            .unwrap_or_default()
    }

    /// Emit the table as `<thead>` + `<tbody>` HTML with every key and value
    /// escaped.
    pub fn to_html(&self) -> String {
        let mut html = String::from("<thead><tr>");
        for heading in HEADER {
            html.push_str(&format!("<th>{heading}</th>"));
        }
        html.push_str("</tr></thead>\n<tbody>\n");

        for row in &self.rows {
            let key = escape_html(&row.key);
            html.push_str(&format!("<tr><td class=\"key\">{key}</td><td>"));
            for cell in &row.cells {
                let lang = escape_html(&cell.lang);
                let value = escape_html(&cell.value);
                html.push_str("<div class=\"value-cell\">");
                if let Some(label) = &cell.label {
                    html.push_str(&format!(
                        "<label for=\"value-{key}-{lang}\">{}</label>",
                        escape_html(label)
                    ));
                }
                html.push_str(&format!(
                    "<input type=\"text\" id=\"value-{key}-{lang}\" value=\"{value}\" title=\"{value}\"{}>",
                    if cell.editable { "" } else { " disabled" }
                ));
                html.push_str("</div>");
            }
            html.push_str("</td><td class=\"actions\"><button class=\"remove\">Remove Key</button></td></tr>\n");
        }

        html.push_str("</tbody>");
        html
    }
}

/// Escape text for use in HTML content and double- or single-quoted
/// attribute values.
pub fn escape_html(text: &str) -> String {
    v_htmlescape::escape(text).to_string()
}

/// English display name for a language code such as `fr`, `pt_BR` or
/// `zh-Hant`. Unknown codes are returned unchanged; a region or script
/// suffix is kept in parentheses.
pub fn display_name(code: &str) -> String {
    let (language, region) = match code.split_once(['_', '-']) {
        Some((language, region)) => (language, Some(region)),
        None => (code, None),
    };

    let Some(name) = language_name(&language.to_ascii_lowercase()) else {
        return code.to_string();
    };

    match region {
        Some(region) => format!("{name} ({region})"),
        None => name.to_string(),
    }
}

fn language_name(code: &str) -> Option<&'static str> {
    let name = match code {
        "ar" => "Arabic",
        "bg" => "Bulgarian",
        "ca" => "Catalan",
        "cs" => "Czech",
        "da" => "Danish",
        "de" => "German",
        "el" => "Greek",
        "en" => "English",
        "es" => "Spanish",
        "et" => "Estonian",
        "fa" => "Persian",
        "fi" => "Finnish",
        "fr" => "French",
        "he" => "Hebrew",
        "hi" => "Hindi",
        "hr" => "Croatian",
        "hu" => "Hungarian",
        "id" => "Indonesian",
        "is" => "Icelandic",
        "it" => "Italian",
        "ja" => "Japanese",
        "ko" => "Korean",
        "lt" => "Lithuanian",
        "lv" => "Latvian",
        "ms" => "Malay",
        "nb" => "Norwegian Bokmål",
        "nl" => "Dutch",
        "no" => "Norwegian",
        "pl" => "Polish",
        "pt" => "Portuguese",
        "ro" => "Romanian",
        "ru" => "Russian",
        "sk" => "Slovak",
        "sl" => "Slovenian",
        "sr" => "Serbian",
        "sv" => "Swedish",
        "th" => "Thai",
        "tr" => "Turkish",
        "uk" => "Ukrainian",
        "vi" => "Vietnamese",
        "zh" => "Chinese",
        _ => return None,
    };
    Some(name)
}
