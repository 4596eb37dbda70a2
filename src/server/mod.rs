//! Development server: the apply-edit endpoint plus tagged module serving.

mod modules;
mod response;


pub use modules::{module_key, ModuleGraph, ServedModule};
pub use response::ApiResponse;

use std::{
    io::Read,
    net::SocketAddr,
    path::{Component, Path, PathBuf},
    sync::Arc,
    thread,
};

use anyhow::{anyhow, Result};
use serde_json::json;
use tiny_http::{Method, Request, Server};

use crate::{
    config::Config,
    patch::{EditApplier, PatchRequest},
    tagger::Tagger,
};

pub const APPLY_EDIT_PATH: &str = "/api/apply-edit";
const MODULES_PREFIX: &str = "/api/modules/";

/// Maximum accepted request body
const MAX_BODY_BYTES: u64 = 1024 * 1024;

/// Maximum number of port binding attempts
const MAX_PORT_RETRIES: u16 = 10;

/// Shared state for all request threads
#[derive(Debug, fieldwork::Fieldwork)]
#[fieldwork(get)]
pub struct DevServer {
    root: PathBuf,
    tagger: Tagger,
    applier: EditApplier,
    modules: Arc<ModuleGraph>,
}

impl DevServer {
    /// Build the server state for a project. `config.root()` must exist.
    pub fn new(config: &Config) -> Result<Self> {
        let root = config.canonical_root()?;
        let modules = Arc::new(ModuleGraph::new(config.server().module_cache_size()));

        let applier = EditApplier::new(&root)
            .with_debug(config.tagger().debug())
            .with_on_applied({
                let modules = Arc::clone(&modules);
                let root = root.clone();
                move |applied| {
                    let path: &Path = applied.path();
                    modules.reload(&module_key(path.strip_prefix(&root).unwrap_or(path)));
                }
            });

        Ok(Self {
            tagger: Tagger::new(config.tagger().clone(), &root),
            root,
            applier,
            modules,
        })
    }

    /// Decide the response for one request
    pub fn route(&self, method: &Method, url: &str, body: &str) -> ApiResponse {
        let path = url.split(['?', '#']).next().unwrap_or(url);

        if path == APPLY_EDIT_PATH {
            return self.apply_edit(method, body);
        }

        if let Some(relative) = path.strip_prefix(MODULES_PREFIX) {
            if *method != Method::Get {
                return ApiResponse::method_not_allowed();
            }
            return ApiResponse::json(
                200,
                &json!({
                    "path": relative,
                    "generation": self.modules.generation(&module_key(Path::new(relative))),
                }),
            );
        }

        if *method == Method::Get {
            return self.serve_module(path.trim_start_matches('/'));
        }

        ApiResponse::not_found()
    }

    /// `POST /api/apply-edit`
    pub fn apply_edit(&self, method: &Method, body: &str) -> ApiResponse {
        if *method != Method::Post {
            return ApiResponse::method_not_allowed();
        }

        let request: PatchRequest = match serde_json::from_str(body) {
            Ok(request) => request,
            Err(e) => {
                log::warn!("[inline-edit] rejected edit request: invalid JSON: {e}");
                return ApiResponse::text(400, "Invalid JSON body");
            }
        };

        match self.applier.apply(&request) {
            Ok(applied) => {
                log::debug!(
                    "[inline-edit] applied {} from {}",
                    applied.edit_id(),
                    request.url.as_deref().unwrap_or("unknown page")
                );
                ApiResponse::json(200, &json!({ "success": true }))
            }

            Err(e) if e.status() >= 500 => {
                log::error!("[inline-edit] Error handling edit request: {e}");
                ApiResponse::text(e.status(), e.to_string())
            }

            Err(e) => {
                log::warn!("[inline-edit] rejected edit request: {e}");
                ApiResponse::text(e.status(), e.to_string())
            }
        }
    }

    fn serve_module(&self, relative: &str) -> ApiResponse {
        let is_plain_relative = Path::new(relative)
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if relative.is_empty() || !is_plain_relative {
            return ApiResponse::not_found();
        }

        let absolute = self.root.join(relative);
        if !self.tagger.handles(&absolute) || !absolute.is_file() {
            return ApiResponse::not_found();
        }
        let inside_root = absolute
            .canonicalize()
            .is_ok_and(|canonical| canonical.starts_with(&self.root));
        if !inside_root {
            return ApiResponse::not_found();
        }

        match self.modules.load(&module_key(Path::new(relative)), &absolute, &self.tagger) {
            Ok(module) => ApiResponse::javascript(module.code()),
            Err(e) => {
                log::error!("[inline-edit] could not load {relative}: {e}");
                ApiResponse::text(500, "Internal Server Error")
            }
        }
    }

    /// Bind and serve until the process exits
    pub fn run(self, addr: SocketAddr) -> Result<()> {
        let (server, addr) = bind_with_retry(addr)?;
        log::info!("[inline-edit] serving http://{addr}{APPLY_EDIT_PATH}");

        let state = Arc::new(self);
        for request in server.incoming_requests() {
            let state = Arc::clone(&state);
            thread::spawn(move || {
                if let Err(e) = state.handle_request(request) {
                    log::error!("[inline-edit] request error: {e}");
                }
            });
        }
        Ok(())
    }

    fn handle_request(&self, mut request: Request) -> Result<()> {
        let mut body = String::new();
        if *request.method() == Method::Post {
            let read = request
                .as_reader()
                .take(MAX_BODY_BYTES)
                .read_to_string(&mut body);
            if let Err(e) = read {
                log::warn!("[inline-edit] unreadable request body: {e}");
                return ApiResponse::text(400, "Unreadable request body").send(request);
            }
        }

        let method = request.method().clone();
        let url = request.url().to_string();
        let response = self.route(&method, &url, &body);
        log::debug!("[inline-edit] {method} {url} -> {}", response.status());
        response.send(request)
    }
}

/// Bind to the address, moving up one port at a time while it is taken
fn bind_with_retry(addr: SocketAddr) -> Result<(Server, SocketAddr)> {
    let base_port = addr.port();
    let mut last_error = None;
    for offset in 0..MAX_PORT_RETRIES {
        let addr = SocketAddr::new(addr.ip(), base_port.saturating_add(offset));
        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log::warn!("[inline-edit] port {base_port} in use, using {} instead", addr.port());
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow!(
        "failed to bind after {MAX_PORT_RETRIES} attempts from port {base_port}: {}",
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}
