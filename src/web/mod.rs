//! HTTP server for the string table.
//!
//! A small synchronous server (via `tiny_http`) that serves:
//! - The browser panel (`/` and `/assets/script.js`)
//! - The REST API the panel mirrors: `/api/strings`, `/api/add`,
//!   `/api/edit`, `/api/remove`, `/api/showTranslations`
//!
//! Launched via `propdesk serve` (default: `http://127.0.0.1:8080`).

pub mod api;
mod frontend;

use std::io::{Cursor, Read};
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::config::EditorConfig;
use crate::store::StringStore;

use api::Form;

/// Everything a request handler may read or change.
///
/// Owned by the request loop; requests are handled one at a time.
pub struct ServerState {
    pub config: EditorConfig,
    pub store: StringStore,
    /// TOML file the display preference is written to. `None` keeps the
    /// preference in memory only.
    pub preference_file: Option<PathBuf>,
}

impl ServerState {
    /// Load the string store described by `config`.
    ///
    /// Files that fail to load are reported on stderr and skipped.
    pub fn load(config: EditorConfig, preference_file: Option<PathBuf>) -> Result<Self> {
        let (store, report) = StringStore::open(&config.store).with_context(|| {
            format!("failed to load properties from {}", config.store.props_dir)
        })?;

        for (path, reason) in &report.skipped {
            eprintln!(
                "{} could not load {}: {}. Skipping.",
                "warning:".yellow().bold(),
                path.display(),
                reason
            );
        }
        if report.created_default {
            println!(
                "No properties files found, created empty {}.properties",
                config.store.base_filename
            );
        }

        Ok(Self {
            config,
            store,
            preference_file,
        })
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// A bound, not yet running, panel server.
pub struct PanelServer {
    server: Server,
}

impl PanelServer {
    /// Bind to `addr`. Port `0` picks a free port.
    pub fn bind(addr: &str) -> Result<Self> {
        let server = Server::http(addr)
            .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;
        Ok(Self { server })
    }

    /// The address actually bound.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Handle requests until the process exits.
    ///
    /// Errors are handled per request without stopping the server.
    pub fn run(self, mut state: ServerState) {
        for mut request in self.server.incoming_requests() {
            let method = request.method().clone();
            let url = request.url().to_string();

            // Read body up-front for methods that carry one
            let body = if matches!(method, Method::Put | Method::Post) {
                let mut buf = String::new();
                let _ = request.as_reader().read_to_string(&mut buf);
                Some(buf)
            } else {
                None
            };

            let response = match dispatch(&mut state, &method, &url, body.as_deref()) {
                Ok(resp) => resp,
                Err(e) => {
                    eprintln!("{} {method} {url}: {e:#}", "error:".red().bold());
                    let body = serde_json::json!({ "error": e.to_string() }).to_string();
                    Response::from_data(body.into_bytes())
                        .with_header(content_type_json())
                        .with_status_code(StatusCode(500))
                }
            };
            let status = response.status_code().0;
            let _ = request.respond(response);

            // Brief access log
            println!(
                "{} {} {} {}",
                chrono::Local::now().format("%H:%M:%S"),
                method,
                url,
                status
            );
        }
    }
}

/// Load the store, bind, and serve until interrupted.
pub fn serve(config: EditorConfig, preference_file: Option<PathBuf>) -> Result<()> {
    let addr = config.server.addr.clone();
    let open = config.server.open_browser;
    let state = ServerState::load(config, preference_file)?;
    let server = PanelServer::bind(&addr)?;

    println!("propdesk panel running at http://{addr}");
    println!("Loaded languages: {}", state.store.languages().join(", "));
    println!("Press Ctrl+C to stop.\n");

    if open {
        // Best-effort
        let _ = open_browser(&format!("http://{addr}"));
    }

    server.run(state);
    Ok(())
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

type HttpResponse = Response<Cursor<Vec<u8>>>;

/// Dispatch an incoming request to the appropriate handler.
fn dispatch(
    state: &mut ServerState,
    method: &Method,
    url: &str,
    body: Option<&str>,
) -> Result<HttpResponse> {
    // Strip query string for path matching
    let path = url.split('?').next().unwrap_or(url);
    let form = || Form::parse(url, body);

    match path {
        "/" | "/index.html" => only(method, Method::Get, || {
            Ok(static_response(frontend::INDEX_HTML, content_type_html()))
        }),
        "/assets/script.js" => only(method, Method::Get, || {
            Ok(static_response(frontend::SCRIPT_JS, content_type_js()))
        }),
        "/api/strings" => only(method, Method::Get, || api::get_strings(state, &form())),
        "/api/add" => only(method, Method::Post, || api::post_add(state, &form())),
        "/api/edit" => only(method, Method::Post, || api::post_edit(state, &form())),
        "/api/remove" => only(method, Method::Post, || api::post_remove(state, &form())),
        "/api/showTranslations" => only(method, Method::Put, || {
            api::put_show_translations(state, &form())
        }),
        _ => Ok(api::text_response(404, "404 page not found")),
    }
}

/// Run `handler` when the request uses `allowed`, otherwise answer `405`.
fn only<F>(method: &Method, allowed: Method, handler: F) -> Result<HttpResponse>
where
    F: FnOnce() -> Result<HttpResponse>,
{
    if *method == allowed {
        handler()
    } else {
        Ok(api::text_response(405, "Invalid request method"))
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn static_response(content: &str, content_type: Header) -> HttpResponse {
    Response::from_data(content.as_bytes().to_vec())
        .with_header(content_type)
        .with_status_code(StatusCode(200))
}

/// JSON content type header.
pub(crate) fn content_type_json() -> Header {
    Header::from_bytes("Content-Type", "application/json; charset=utf-8").unwrap()
}

/// Plain text content type header.
pub(crate) fn content_type_text() -> Header {
    Header::from_bytes("Content-Type", "text/plain; charset=utf-8").unwrap()
}

fn content_type_html() -> Header {
    Header::from_bytes("Content-Type", "text/html; charset=utf-8").unwrap()
}

fn content_type_js() -> Header {
    Header::from_bytes("Content-Type", "text/javascript; charset=utf-8").unwrap()
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}
