//! Embedded HTML/CSS/JS for the browser panel.
//!
//! The page and its script are compiled into the binary as string constants.
//! No external assets, no build tools, no CDN dependencies.

/// The panel page. Loads [`SCRIPT_JS`] from `/assets/script.js`.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>propdesk</title>
<style>
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #58a6ff;
  --green: #3fb950;
  --red: #f85149;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}

.app {
  max-width: 1400px;
  margin: 0 auto;
  padding: 24px;
}

header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  margin-bottom: 24px;
  padding-bottom: 16px;
  border-bottom: 1px solid var(--border);
}

header h1 {
  font-size: 24px;
  font-weight: 600;
  font-family: var(--mono);
  color: var(--accent);
}

.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 20px;
  margin-bottom: 16px;
}

.card h2 {
  font-size: 16px;
  font-weight: 600;
  margin-bottom: 16px;
}

.row { display: flex; gap: 8px; align-items: center; flex-wrap: wrap; }

input[type=text] {
  background: var(--bg);
  color: var(--text);
  border: 1px solid var(--border);
  border-radius: 6px;
  padding: 6px 10px;
  font-size: 13px;
  min-width: 220px;
}
input[type=text]:disabled { color: var(--text-muted); }

button {
  padding: 6px 14px;
  border: 1px solid var(--border);
  border-radius: 6px;
  background: var(--surface);
  color: var(--text);
  font-size: 13px;
  cursor: pointer;
}
button.primary { background: var(--accent); border-color: var(--accent); color: #fff; }
button.remove { border-color: var(--red); color: var(--red); }
button.save { border-color: var(--green); color: var(--green); }

table { width: 100%; border-collapse: collapse; }
th, td {
  text-align: left;
  padding: 8px 10px;
  border-bottom: 1px solid var(--border);
  vertical-align: top;
}
th { color: var(--text-muted); font-weight: 500; font-size: 12px; text-transform: uppercase; }
td.key { font-family: var(--mono); font-size: 12px; }
.value-cell { display: flex; gap: 6px; align-items: center; flex-wrap: wrap; }
.value-cell label { color: var(--text-muted); font-size: 12px; min-width: 80px; }
</style>
</head>
<body>
<div class="app">
  <header>
    <h1>propdesk</h1>
    <label class="row"><input type="checkbox" id="showTranslations" checked> Show translations</label>
  </header>

  <div class="card">
    <h2>Add string</h2>
    <div class="row">
      <input type="text" id="new-key" placeholder="Key (optional)">
      <input type="text" id="new-value" placeholder="English value">
      <button class="primary" id="btn-add">Add</button>
    </div>
  </div>

  <div class="card">
    <div class="row" style="margin-bottom: 16px">
      <input type="text" id="search" placeholder="Filter by English value">
    </div>
    <table id="strings-table">
      <thead id="strings-head"></thead>
      <tbody id="strings-body"></tbody>
    </table>
  </div>
</div>
<script src="/assets/script.js"></script>
</body>
</html>"##;

/// Panel behaviour: fetch, render, debounced filter, add/edit/remove, and
/// the translations toggle.
pub const SCRIPT_JS: &str = r##"// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------
let languages = [];
let strings = {};
let showTranslations = true;
let filterTimeout = null;

const FILTER_DELAY_MS = 300;
const displayNames = new Intl.DisplayNames(['en'], { type: 'language' });

const showTranslationsCheckbox = document.getElementById('showTranslations');

// ---------------------------------------------------------------------------
// Fetch
// ---------------------------------------------------------------------------
async function fetchStrings(query) {
  try {
    const res = await fetch('/api/strings?query=' + encodeURIComponent(query || ''));
    if (!res.ok) throw new Error(await res.text());
    const data = await res.json();
    languages = data.langs;
    strings = data.strings;
    showTranslations = data.showTranslations;
    showTranslationsCheckbox.checked = showTranslations;
    renderTable(languages, strings);
  } catch (e) {
    alert('Error loading strings: ' + e.message);
  }
}

function postForm(path, fields) {
  return fetch(path, { method: 'POST', body: new URLSearchParams(fields) });
}

// ---------------------------------------------------------------------------
// Render
// ---------------------------------------------------------------------------
function displayName(lang) {
  try {
    return displayNames.of(lang.replace('_', '-')) || lang;
  } catch (e) {
    return lang;
  }
}

function renderTable(langs, rows) {
  document.getElementById('strings-head').innerHTML =
    '<tr><th>Key</th><th>Values</th><th>Actions</th></tr>';

  // The server always lists the default language first.
  const defaultLang = langs[0];
  let html = '';
  for (const key in rows) {
    const values = rows[key];
    html += `<tr><td class="key">${esc(key)}</td><td>`;
    langs.forEach(lang => {
      if (!showTranslations && lang !== defaultLang) return;
      const value = values[lang] || '';
      const editable = lang === defaultLang;
      html += '<div class="value-cell">';
      if (showTranslations) html += `<label>${esc(displayName(lang))}</label>`;
      html += `<input type="text" data-key="${esc(key)}" data-lang="${esc(lang)}" value="${esc(value)}" title="${esc(value)}"${editable ? '' : ' disabled'}>`;
      if (editable) html += `<button class="save" data-key="${esc(key)}" data-lang="${esc(lang)}">Save</button>`;
      html += '</div>';
    });
    html += `</td><td><button class="remove" data-key="${esc(key)}">Remove Key</button></td></tr>`;
  }
  document.getElementById('strings-body').innerHTML = html;
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------
function filterStrings() {
  if (filterTimeout) clearTimeout(filterTimeout);
  filterTimeout = setTimeout(() => {
    filterTimeout = null;
    const query = document.getElementById('search').value.toLowerCase();
    fetchStrings(query);
  }, FILTER_DELAY_MS);
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------
async function addString() {
  const keyInput = document.getElementById('new-key');
  const valueInput = document.getElementById('new-value');
  if (!valueInput.value) {
    alert('English Value cannot be empty.');
    return;
  }

  const res = await postForm('/api/add', { key: keyInput.value, value: valueInput.value });
  if (res.ok) {
    keyInput.value = '';
    valueInput.value = '';
    fetchStrings();
  } else {
    alert('Error adding string: ' + await res.text());
  }
}

async function editString(key, lang, value) {
  const res = await postForm('/api/edit', { key, lang, value });
  if (res.ok) {
    alert(`'${key}' in '${lang}' saved!`);
  } else {
    alert('Error saving string.');
  }
}

async function removeString(key) {
  if (!confirm(`Are you sure you want to remove the key '${key}' from all language files?`)) return;
  const res = await postForm('/api/remove', { key });
  if (res.ok) {
    fetchStrings();
  } else {
    alert('Error removing string.');
  }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------
showTranslationsCheckbox.addEventListener('change', e => {
  showTranslations = e.target.checked;
  renderTable(languages, strings);
  fetch('/api/showTranslations?show=' + showTranslations, { method: 'PUT' })
    .catch(() => {})
    .finally(filterStrings);
});

document.getElementById('search').addEventListener('input', filterStrings);
document.getElementById('btn-add').addEventListener('click', addString);

document.getElementById('strings-body').addEventListener('click', e => {
  const btn = e.target.closest('button');
  if (!btn) return;
  const key = btn.dataset.key;
  if (btn.classList.contains('remove')) {
    removeString(key);
  } else if (btn.classList.contains('save')) {
    const lang = btn.dataset.lang;
    const input = [...document.querySelectorAll('#strings-body input')]
      .find(i => i.dataset.key === key && i.dataset.lang === lang);
    if (input) editString(key, lang, input.value);
  }
});

// ---------------------------------------------------------------------------
// Utility
// ---------------------------------------------------------------------------
function esc(s) {
  if (!s) return '';
  return String(s)
    .replace(/&/g, '&amp;')
    .replace(/</g, '&lt;')
    .replace(/>/g, '&gt;')
    .replace(/"/g, '&quot;')
    .replace(/'/g, '&#39;');
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------
fetchStrings();
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_references_script_and_controls() {
        assert!(INDEX_HTML.contains(r#"src="/assets/script.js""#));
        for id in ["showTranslations", "new-key", "new-value", "search", "strings-body"] {
            assert!(INDEX_HTML.contains(&format!(r#"id="{id}""#)), "missing #{id}");
        }
    }

    #[test]
    fn script_calls_every_endpoint() {
        for endpoint in [
            "/api/strings",
            "/api/add",
            "/api/edit",
            "/api/remove",
            "/api/showTranslations",
        ] {
            assert!(SCRIPT_JS.contains(endpoint), "script never calls {endpoint}");
        }
    }
}
