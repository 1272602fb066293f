//! REST API handlers.
//!
//! Each handler corresponds to an API endpoint and returns a
//! `Response<Cursor<Vec<u8>>>`. Validation failures become `400` responses
//! carrying the plain-text message; the panel shows that text to the user.

use std::collections::HashMap;
use std::io::Cursor;

use anyhow::{Context, Result};
use serde::Serialize;
use tiny_http::{Response, StatusCode};

use crate::activity::logger::{self, ActivityEntry};
use crate::config;
use crate::protocol::StringsResponse;
use crate::store::StoreError;

use super::{ServerState, content_type_json, content_type_text};

// ---------------------------------------------------------------------------
// Form decoding
// ---------------------------------------------------------------------------

/// Request fields gathered from the URL query and a urlencoded body.
///
/// Body fields take precedence over query fields of the same name.
#[derive(Debug, Default)]
pub struct Form {
    fields: HashMap<String, String>,
}

impl Form {
    pub fn parse(url: &str, body: Option<&str>) -> Self {
        let mut fields = HashMap::new();
        if let Some((_, query)) = url.split_once('?') {
            decode_pairs(query, &mut fields);
        }
        if let Some(body) = body {
            decode_pairs(body, &mut fields);
        }
        Self { fields }
    }

    /// Value of `name`, or `""` when absent.
    pub fn get(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }
}

fn decode_pairs(encoded: &str, into: &mut HashMap<String, String>) {
    for pair in encoded.split('&').filter(|p| !p.is_empty()) {
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        into.insert(percent_decode(k), percent_decode(v));
    }
}

/// Decode `application/x-www-form-urlencoded` text. Malformed escapes are
/// kept literally.
fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => match (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                (Some(hi), Some(lo)) => {
                    out.push(hi << 4 | lo);
                    i += 2;
                }
                _ => out.push(b'%'),
            },
            b => out.push(b),
        }
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn hex_digit(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

type HttpResponse = Response<Cursor<Vec<u8>>>;

/// Build a JSON success response.
fn json_response<T: Serialize>(data: &T) -> Result<HttpResponse> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(200)))
}

/// Plain-text response with the given status.
pub(crate) fn text_response(status: u16, message: &str) -> HttpResponse {
    Response::from_data(message.as_bytes().to_vec())
        .with_header(content_type_text())
        .with_status_code(StatusCode(status))
}

/// Map a store failure to a response: `400` for validation, `500` otherwise.
fn store_error_response(err: &StoreError) -> HttpResponse {
    if err.is_validation() {
        text_response(400, &err.to_string())
    } else {
        eprintln!("propdesk: {err}");
        text_response(500, "Internal Server Error")
    }
}

// ---------------------------------------------------------------------------
// API Handlers
// ---------------------------------------------------------------------------

/// `GET /api/strings?query=Q` — the (filtered) string table.
pub fn get_strings(state: &ServerState, form: &Form) -> Result<HttpResponse> {
    let show = state.config.display.show_translations;
    let result = state.store.query(form.get("query"), show);

    let resp = StringsResponse {
        langs: result.langs,
        strings: result.strings,
        show_translations: show,
    };

    json_response(&resp)
}

/// `POST /api/add` — create a key in every language (`201`).
pub fn post_add(state: &mut ServerState, form: &Form) -> Result<HttpResponse> {
    let value = form.get("value");
    let outcome = state
        .store
        .add(form.get("key"), value, &state.config.pseudo);

    let response = match &outcome {
        Ok(_) => text_response(201, ""),
        Err(err) => store_error_response(err),
    };

    let entry = match outcome {
        Ok(key) => ActivityEntry::now("add").with_key(key),
        Err(err) => ActivityEntry::now("add")
            .with_key(form.get("key"))
            .failed(err.to_string()),
    };
    logger::log_activity(&state.config.logging, &entry);

    Ok(response)
}

/// `POST /api/edit` — set one value in one language.
pub fn post_edit(state: &mut ServerState, form: &Form) -> Result<HttpResponse> {
    let (key, lang) = (form.get("key"), form.get("lang"));
    let outcome = state.store.edit(key, lang, form.get("value"));

    let mut entry = ActivityEntry::now("edit").with_key(key).with_lang(lang);
    let response = match outcome {
        Ok(()) => text_response(200, ""),
        Err(err) => {
            entry = entry.failed(err.to_string());
            store_error_response(&err)
        }
    };
    logger::log_activity(&state.config.logging, &entry);

    Ok(response)
}

/// `POST /api/remove` — delete a key from every language.
pub fn post_remove(state: &mut ServerState, form: &Form) -> Result<HttpResponse> {
    let key = form.get("key");
    let outcome = state.store.remove(key);

    let mut entry = ActivityEntry::now("remove").with_key(key);
    let response = match outcome {
        Ok(()) => text_response(200, ""),
        Err(err) => {
            entry = entry.failed(err.to_string());
            store_error_response(&err)
        }
    };
    logger::log_activity(&state.config.logging, &entry);

    Ok(response)
}

/// `PUT /api/showTranslations?show=BOOL` — persist the display preference.
///
/// Anything other than `true` hides translations.
pub fn put_show_translations(state: &mut ServerState, form: &Form) -> Result<HttpResponse> {
    let show = form.get("show") == "true";
    state.config.display.show_translations = show;

    if let Some(path) = &state.preference_file {
        config::set_value_in_file(path, "display.show_translations", &show.to_string())
            .context("failed to persist display preference")?;
    }

    logger::log_activity(
        &state.config.logging,
        &ActivityEntry::now("show_translations").with_detail(show.to_string()),
    );

    Ok(text_response(200, ""))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
