/// Panel behavior tests.
///
/// Drives [`Panel`] against an in-memory API and a recording prompter, so
/// every flow can be checked without a server: which requests are sent,
/// what the user is told, and what the table shows afterwards.
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use propdesk::panel::client::{ApiError, StringsApi};
use propdesk::panel::{Outcome, Panel, Prompter};
use propdesk::protocol::{StringTable, StringsResponse};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FakeInner {
    strings: Mutex<StringTable>,
    show: AtomicBool,
    fetches: AtomicUsize,
    queries: Mutex<Vec<String>>,
    adds: AtomicUsize,
    edits: AtomicUsize,
    removes: AtomicUsize,
    persists: AtomicUsize,
    fail_fetch: AtomicBool,
    fail_mutations: AtomicBool,
}

#[derive(Clone, Default)]
struct FakeApi {
    inner: Arc<FakeInner>,
}

impl FakeApi {
    fn with_strings(rows: &[(&str, &str, &str)]) -> Self {
        let api = FakeApi::default();
        api.inner.show.store(true, Ordering::SeqCst);
        {
            let mut strings = api.inner.strings.lock().unwrap();
            for (key, en, fr) in rows {
                strings.insert(
                    key.to_string(),
                    BTreeMap::from([
                        ("en".to_string(), en.to_string()),
                        ("fr".to_string(), fr.to_string()),
                    ]),
                );
            }
        }
        api
    }

    fn rejected(message: &str) -> ApiError {
        ApiError::Rejected {
            status: 400,
            message: message.to_string(),
        }
    }

    fn fetches(&self) -> usize {
        self.inner.fetches.load(Ordering::SeqCst)
    }
}

impl StringsApi for FakeApi {
    fn fetch(&self, query: &str) -> Result<StringsResponse, ApiError> {
        self.inner.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.queries.lock().unwrap().push(query.to_string());
        if self.inner.fail_fetch.load(Ordering::SeqCst) {
            return Err(ApiError::Transport("connection refused".to_string()));
        }

        let show = self.inner.show.load(Ordering::SeqCst);
        let langs: Vec<String> = if show {
            vec!["en".to_string(), "fr".to_string()]
        } else {
            vec!["en".to_string()]
        };

        let strings = self
            .inner
            .strings
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, values)| {
                values
                    .get("en")
                    .is_some_and(|v| v.to_lowercase().contains(&query.to_lowercase()))
            })
            .map(|(key, values)| {
                let values = values
                    .iter()
                    .filter(|(lang, _)| langs.contains(lang))
                    .map(|(l, v)| (l.clone(), v.clone()))
                    .collect();
                (key.clone(), values)
            })
            .collect();

        Ok(StringsResponse {
            langs,
            strings,
            show_translations: show,
        })
    }

    fn set_show_translations(&self, show: bool) -> Result<(), ApiError> {
        self.inner.persists.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_mutations.load(Ordering::SeqCst) {
            return Err(FakeApi::rejected("disk full"));
        }
        self.inner.show.store(show, Ordering::SeqCst);
        Ok(())
    }

    fn add(&self, key: &str, value: &str) -> Result<(), ApiError> {
        self.inner.adds.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_mutations.load(Ordering::SeqCst) {
            return Err(FakeApi::rejected("Key already exists"));
        }
        self.inner.strings.lock().unwrap().insert(
            key.to_string(),
            BTreeMap::from([
                ("en".to_string(), value.to_string()),
                ("fr".to_string(), format!("{value} [fr]")),
            ]),
        );
        Ok(())
    }

    fn edit(&self, key: &str, lang: &str, value: &str) -> Result<(), ApiError> {
        self.inner.edits.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_mutations.load(Ordering::SeqCst) {
            return Err(FakeApi::rejected("Language not found"));
        }
        if let Some(values) = self.inner.strings.lock().unwrap().get_mut(key) {
            values.insert(lang.to_string(), value.to_string());
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ApiError> {
        self.inner.removes.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_mutations.load(Ordering::SeqCst) {
            return Err(ApiError::Transport("connection reset".to_string()));
        }
        self.inner.strings.lock().unwrap().remove(key);
        Ok(())
    }
}

#[derive(Clone)]
struct RecordingPrompter {
    alerts: Arc<Mutex<Vec<String>>>,
    questions: Arc<Mutex<Vec<String>>>,
    answer: bool,
}

impl RecordingPrompter {
    fn answering(answer: bool) -> Self {
        Self {
            alerts: Arc::default(),
            questions: Arc::default(),
            answer,
        }
    }

    fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }
}

impl Prompter for RecordingPrompter {
    fn alert(&mut self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.questions.lock().unwrap().push(message.to_string());
        self.answer
    }
}

const QUIET: Duration = Duration::from_millis(100);
const SETTLE: Duration = Duration::from_millis(600);

fn panel_with(
    api: &FakeApi,
    prompter: &RecordingPrompter,
) -> Panel<FakeApi, RecordingPrompter> {
    Panel::new(api.clone(), prompter.clone(), "en", QUIET)
}

fn sample_api() -> FakeApi {
    FakeApi::with_strings(&[
        ("Hello", "Hello", "Hello [fr]"),
        ("SaveAll", "Save all", "Save all [fr]"),
    ])
}

// ---------------------------------------------------------------------------
// Fetch and render
// ---------------------------------------------------------------------------

#[test]
fn fetch_replaces_table_and_preference() {
    let api = sample_api();
    let prompter = RecordingPrompter::answering(true);
    let panel = panel_with(&api, &prompter);

    panel.fetch("").unwrap();
    let view = panel.view();
    assert_eq!(view.rows.len(), 2);
    assert!(view.rows.iter().all(|r| r.cells.len() == 2));
    assert!(panel.show_translations());

    api.inner.show.store(false, Ordering::SeqCst);
    panel.fetch("save").unwrap();
    let view = panel.view();
    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].key, "SaveAll");
    assert_eq!(view.visible_languages(), vec!["en"]);
    assert!(!panel.show_translations());
}

#[test]
fn fetch_error_is_returned_to_caller() {
    let api = sample_api();
    api.inner.fail_fetch.store(true, Ordering::SeqCst);
    let prompter = RecordingPrompter::answering(true);
    let panel = panel_with(&api, &prompter);

    assert!(matches!(panel.fetch(""), Err(ApiError::Transport(_))));
    assert!(prompter.alerts().is_empty());
}

/// A server whose default language is German, with translations hidden.
struct GermanDefaultApi;

impl StringsApi for GermanDefaultApi {
    fn fetch(&self, _query: &str) -> Result<StringsResponse, ApiError> {
        let mut strings = StringTable::new();
        strings.insert(
            "Hallo".to_string(),
            BTreeMap::from([("de".to_string(), "Hallo".to_string())]),
        );
        Ok(StringsResponse {
            langs: vec!["de".to_string()],
            strings,
            show_translations: false,
        })
    }

    fn set_show_translations(&self, _show: bool) -> Result<(), ApiError> {
        Ok(())
    }

    fn add(&self, _key: &str, _value: &str) -> Result<(), ApiError> {
        Ok(())
    }

    fn edit(&self, _key: &str, _lang: &str, _value: &str) -> Result<(), ApiError> {
        Ok(())
    }

    fn remove(&self, _key: &str) -> Result<(), ApiError> {
        Ok(())
    }
}

#[test]
fn server_default_language_overrides_local_setting() {
    let prompter = RecordingPrompter::answering(true);
    let panel = Panel::new(GermanDefaultApi, prompter, "en", QUIET);

    panel.fetch("").unwrap();
    let view = panel.view();
    assert_eq!(view.visible_languages(), vec!["de"]);
    assert!(view.rows.iter().all(|r| r.cells.len() == 1 && r.cells[0].editable));
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

#[test]
fn keystrokes_within_quiet_period_fetch_once() {
    let api = sample_api();
    let prompter = RecordingPrompter::answering(true);
    let panel = panel_with(&api, &prompter);

    panel.filter("S");
    panel.filter("Sa");
    panel.filter("Sav");
    thread::sleep(SETTLE);

    assert_eq!(api.fetches(), 1);
    assert_eq!(*api.inner.queries.lock().unwrap(), vec!["sav".to_string()]);
    assert_eq!(panel.state().query, "Sav");
    assert_eq!(panel.view().rows.len(), 1);
}

#[test]
fn debounced_fetch_failure_is_alerted() {
    let api = sample_api();
    api.inner.fail_fetch.store(true, Ordering::SeqCst);
    let prompter = RecordingPrompter::answering(true);
    let panel = panel_with(&api, &prompter);

    panel.filter("x");
    thread::sleep(SETTLE);

    let alerts = prompter.alerts();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].starts_with("Error loading strings: "));
}

// ---------------------------------------------------------------------------
// Add
// ---------------------------------------------------------------------------

#[test]
fn empty_add_is_blocked_without_request() {
    let api = sample_api();
    let prompter = RecordingPrompter::answering(true);
    let panel = panel_with(&api, &prompter);

    panel.set_new_entry("SomeKey", "");
    assert_eq!(panel.add(), Outcome::Blocked);

    assert_eq!(prompter.alerts(), vec!["English Value cannot be empty."]);
    assert_eq!(api.inner.adds.load(Ordering::SeqCst), 0);
    assert_eq!(api.fetches(), 0);
}

#[test]
fn successful_add_clears_form_and_refetches() {
    let api = sample_api();
    let prompter = RecordingPrompter::answering(true);
    let panel = panel_with(&api, &prompter);

    panel.set_new_entry("Goodbye", "Goodbye");
    assert_eq!(panel.add(), Outcome::Done);

    let state = panel.state();
    assert!(state.form.key.is_empty());
    assert!(state.form.value.is_empty());
    assert_eq!(api.fetches(), 1);
    assert!(state.view.rows.iter().any(|r| r.key == "Goodbye"));
    assert!(prompter.alerts().is_empty());
}

#[test]
fn rejected_add_shows_server_text() {
    let api = sample_api();
    api.inner.fail_mutations.store(true, Ordering::SeqCst);
    let prompter = RecordingPrompter::answering(true);
    let panel = panel_with(&api, &prompter);

    panel.set_new_entry("Hello", "Hello");
    assert_eq!(panel.add(), Outcome::Failed);

    assert_eq!(
        prompter.alerts(),
        vec!["Error adding string: Key already exists"]
    );
    assert_eq!(panel.state().form.value, "Hello");
    assert_eq!(api.fetches(), 0);
}

// ---------------------------------------------------------------------------
// Edit
// ---------------------------------------------------------------------------

#[test]
fn edit_reports_result_without_refetch() {
    let api = sample_api();
    let prompter = RecordingPrompter::answering(true);
    let panel = panel_with(&api, &prompter);

    assert_eq!(panel.edit("Hello", "en", "Hi"), Outcome::Done);
    api.inner.fail_mutations.store(true, Ordering::SeqCst);
    assert_eq!(panel.edit("Hello", "xx", "Hi"), Outcome::Failed);

    assert_eq!(
        prompter.alerts(),
        vec!["'Hello' in 'en' saved!", "Error saving string."]
    );
    assert_eq!(api.fetches(), 0);
}

// ---------------------------------------------------------------------------
// Remove
// ---------------------------------------------------------------------------

#[test]
fn confirmed_remove_drops_key_from_next_table() {
    let api = sample_api();
    let prompter = RecordingPrompter::answering(true);
    let panel = panel_with(&api, &prompter);
    panel.fetch("").unwrap();

    assert_eq!(panel.remove("Hello"), Outcome::Done);

    assert_eq!(
        *prompter.questions.lock().unwrap(),
        vec!["Are you sure you want to remove the key 'Hello' from all language files?"]
    );
    assert!(panel.view().rows.iter().all(|r| r.key != "Hello"));
    assert_eq!(api.fetches(), 2);
}

#[test]
fn cancelled_remove_sends_nothing() {
    let api = sample_api();
    let prompter = RecordingPrompter::answering(false);
    let panel = panel_with(&api, &prompter);

    assert_eq!(panel.remove("Hello"), Outcome::Cancelled);
    assert_eq!(api.inner.removes.load(Ordering::SeqCst), 0);
    assert!(prompter.alerts().is_empty());
}

#[test]
fn failed_remove_alerts() {
    let api = sample_api();
    api.inner.fail_mutations.store(true, Ordering::SeqCst);
    let prompter = RecordingPrompter::answering(true);
    let panel = panel_with(&api, &prompter);

    assert_eq!(panel.remove("Hello"), Outcome::Failed);
    assert_eq!(prompter.alerts(), vec!["Error removing string."]);
}

// ---------------------------------------------------------------------------
// Display toggle
// ---------------------------------------------------------------------------

#[test]
fn toggle_rerenders_immediately_then_refetches() {
    let api = sample_api();
    let prompter = RecordingPrompter::answering(true);
    let panel = panel_with(&api, &prompter);
    panel.fetch("").unwrap();
    let before = panel.view().visible_languages().join(",");

    panel.toggle_translations(false).unwrap();
    assert_eq!(panel.view().visible_languages(), vec!["en"]);
    assert_eq!(api.inner.persists.load(Ordering::SeqCst), 1);

    thread::sleep(SETTLE);
    assert_eq!(api.fetches(), 2);
    assert!(!panel.show_translations());

    panel.toggle_translations(true).unwrap();
    thread::sleep(SETTLE);
    assert_eq!(panel.view().visible_languages().join(","), before);
}

#[test]
fn toggle_refetches_even_when_persist_fails() {
    let api = sample_api();
    api.inner.fail_mutations.store(true, Ordering::SeqCst);
    let prompter = RecordingPrompter::answering(true);
    let panel = panel_with(&api, &prompter);
    panel.fetch("").unwrap();
    panel.filter("Save");
    thread::sleep(SETTLE);
    let fetches = api.fetches();

    assert!(panel.toggle_translations(false).is_err());
    thread::sleep(SETTLE);

    assert_eq!(api.fetches(), fetches + 1);
    assert_eq!(
        api.inner.queries.lock().unwrap().last().map(String::as_str),
        Some("save")
    );
    // Server kept its preference, so the refetch restores the columns.
    assert!(panel.show_translations());
}
