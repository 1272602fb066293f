//! Native model of the editor panel.
//!
//! [`Panel`] drives the same flows as the browser panel (fetch, filter,
//! add, edit, remove, display toggle) against any [`StringsApi`], and talks
//! to the user only through a [`Prompter`]. The CLI uses it with a terminal
//! prompter; tests use recording fakes.

pub mod client;
pub mod debounce;
pub mod render;
pub mod state;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use client::{ApiError, StringsApi};
use debounce::Debouncer;
use render::Table;
use state::PanelState;

/// How the panel talks back to the user.
pub trait Prompter: Send {
    /// Show a message.
    fn alert(&mut self, message: &str);
    /// Ask a yes/no question.
    fn confirm(&mut self, message: &str) -> bool;
}

/// What became of a user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The server accepted the change.
    Done,
    /// Local validation failed; nothing was sent.
    Blocked,
    /// The user declined the confirmation.
    Cancelled,
    /// The request was sent and failed.
    Failed,
}

struct Shared<A, P> {
    api: A,
    prompter: Mutex<P>,
    state: Mutex<PanelState>,
}

impl<A: StringsApi, P: Prompter> Shared<A, P> {
    fn alert(&self, message: &str) {
        lock(&self.prompter).alert(message);
    }

    fn fetch(&self, query: &str) -> Result<(), ApiError> {
        let response = self.api.fetch(query)?;
        lock(&self.state).apply(response);
        Ok(())
    }

    /// Fetch and report failures through the prompter.
    fn refresh(&self, query: &str) {
        if let Err(e) = self.fetch(query) {
            self.alert(&format!("Error loading strings: {e}"));
        }
    }
}

/// The editor panel.
///
/// Locks are never held across network calls, so a debounced fetch running
/// on the worker thread does not block user actions.
pub struct Panel<A, P>
where
    A: StringsApi + 'static,
    P: Prompter + 'static,
{
    shared: Arc<Shared<A, P>>,
    debouncer: Debouncer<String>,
}

impl<A, P> Panel<A, P>
where
    A: StringsApi + 'static,
    P: Prompter + 'static,
{
    /// Create a panel. Nothing is fetched until [`Panel::fetch`] or
    /// [`Panel::filter`] is called.
    ///
    /// `fallback_lang` is only used before the first fetch; afterwards the
    /// default language is the first one the server lists.
    pub fn new(api: A, prompter: P, fallback_lang: &str, debounce: Duration) -> Self {
        let shared = Arc::new(Shared {
            api,
            prompter: Mutex::new(prompter),
            state: Mutex::new(PanelState::new(fallback_lang)),
        });

        let worker_shared = Arc::clone(&shared);
        let debouncer = Debouncer::new(debounce, move |query: String| {
            worker_shared.refresh(&query);
        });

        Self { shared, debouncer }
    }

    /// Load the table for `query` and replace the panel state with it.
    pub fn fetch(&self, query: &str) -> Result<(), ApiError> {
        self.shared.fetch(query)
    }

    /// Record the search text and schedule a debounced fetch for it.
    pub fn filter(&self, query: &str) {
        lock(&self.shared.state).query = query.to_string();
        self.debouncer.trigger(query.to_lowercase());
    }

    /// Fill the "new string" inputs.
    pub fn set_new_entry(&self, key: &str, value: &str) {
        let mut state = lock(&self.shared.state);
        state.form.key = key.to_string();
        state.form.value = value.to_string();
    }

    /// Submit the "new string" inputs.
    pub fn add(&self) -> Outcome {
        let form = lock(&self.shared.state).form.clone();
        if form.value.is_empty() {
            self.shared.alert("English Value cannot be empty.");
            return Outcome::Blocked;
        }

        match self.shared.api.add(&form.key, &form.value) {
            Ok(()) => {
                lock(&self.shared.state).form.clear();
                self.shared.refresh("");
                Outcome::Done
            }
            Err(e) => {
                let text = e.server_message().map(str::to_string).unwrap_or_else(|| e.to_string());
                self.shared.alert(&format!("Error adding string: {text}"));
                Outcome::Failed
            }
        }
    }

    /// Save one value. The table is not refetched.
    pub fn edit(&self, key: &str, lang: &str, value: &str) -> Outcome {
        match self.shared.api.edit(key, lang, value) {
            Ok(()) => {
                self.shared.alert(&format!("'{key}' in '{lang}' saved!"));
                Outcome::Done
            }
            Err(_) => {
                self.shared.alert("Error saving string.");
                Outcome::Failed
            }
        }
    }

    /// Remove `key` from every language after confirmation.
    pub fn remove(&self, key: &str) -> Outcome {
        let question =
            format!("Are you sure you want to remove the key '{key}' from all language files?");
        if !lock(&self.shared.prompter).confirm(&question) {
            return Outcome::Cancelled;
        }

        match self.shared.api.remove(key) {
            Ok(()) => {
                self.shared.refresh("");
                Outcome::Done
            }
            Err(_) => {
                self.shared.alert("Error removing string.");
                Outcome::Failed
            }
        }
    }

    /// Switch translation columns on or off.
    ///
    /// The table is re-rendered from loaded data at once. The preference is
    /// then persisted and a filtered refetch scheduled; a failed persist does
    /// not prevent the refetch.
    pub fn toggle_translations(&self, show: bool) -> Result<(), ApiError> {
        let query = {
            let mut state = lock(&self.shared.state);
            state.show_translations = show;
            state.rerender();
            state.query.clone()
        };

        let persisted = self.shared.api.set_show_translations(show);
        self.filter(&query);
        persisted
    }

    /// Current rendered table.
    pub fn view(&self) -> Table {
        lock(&self.shared.state).view.clone()
    }

    /// Copy of the whole panel state.
    pub fn state(&self) -> PanelState {
        lock(&self.shared.state).clone()
    }

    pub fn show_translations(&self) -> bool {
        lock(&self.shared.state).show_translations
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
