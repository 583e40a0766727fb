//! Handler for serving static files, with optional response caching.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use log::{debug, warn};

use crate::cache::{ResponseCache, MAX_CACHE_ENTRY_SIZE};
use crate::handler::{ConnInfo, Handler, HandlerError, HandlerResult, Reply};
use crate::media;
use crate::request::Request;
use crate::response::Response;
use crate::router::PathParams;

/// Customization hook: called with the request and the response about to be
/// served, returns the response to use instead.
pub type Intervene = Box<dyn Fn(&Request, Response) -> Response + Send + Sync>;

/// Configuration for [`StaticFiles`].
#[derive(Default)]
pub struct StaticOptions {
    pub root: PathBuf,
    pub intervene: Option<Intervene>,
    pub cache: Option<Arc<ResponseCache>>,
}

impl StaticOptions {
    /// Serve from under this base directory.
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            intervene: None,
            cache: None,
        }
    }
    pub fn with_intervene<F>(mut self, f: F) -> Self
    where
        F: Fn(&Request, Response) -> Response + Send + Sync + 'static,
    {
        self.intervene = Some(Box::new(f));
        self
    }
    pub fn with_cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }
}

/// Handler which serves files named by the route's `:filename+` parameter
/// from a subdirectory of the configured base directory.
///
/// Route it with a trailing one-or-more segment:
/// `.with_route("/assets/:filename+", static_files)`.
pub struct StaticFiles {
    dir: PathBuf,
    intervene: Option<Intervene>,
    cache: Option<Arc<ResponseCache>>,
}

impl StaticFiles {
    /// Create a new StaticFiles handler serving `options.root`/`subdir`.
    pub fn new(subdir: &str, options: StaticOptions) -> Result<Self, io::Error> {
        Ok(Self {
            dir: options.root.join(subdir).canonicalize()?,
            intervene: options.intervene,
            cache: options.cache,
        })
    }
}

/// Convenience constructor matching the handler's role in a route table.
pub fn serve_static(subdir: &str, options: StaticOptions) -> Result<StaticFiles, io::Error> {
    StaticFiles::new(subdir, options)
}

/// Weak validator from file size and mtime, in the `W/"len-mtime"` shape.
fn weak_etag(metadata: &fs::Metadata) -> String {
    let mtime = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_secs());
    format!("W/\"{}-{}\"", metadata.len(), mtime)
}

/// Whether the client's `If-None-Match` revalidates against `etag`.
fn revalidates(request: &Request, etag: &str) -> bool {
    match request.header("if-none-match") {
        Some(value) => value == "*" || value.split(',').any(|tag| tag.trim() == etag),
        None => false,
    }
}

/// Check if root is parent of target. Make sure both are canonical
/// by calling `canonicalize()` first if you want it to work reliably.
fn is_parent(root: &Path, target: &Path) -> bool {
    let mut curr = target;
    loop {
        if curr == root {
            return true;
        }
        curr = match curr.parent() {
            Some(parent) => parent,
            None => return false,
        };
    }
}

impl Handler for StaticFiles {
    fn handle(&self, request: &Request, _conn: &ConnInfo, params: &PathParams) -> HandlerResult {
        let filename = params
            .get("filename")
            .ok_or_else(|| HandlerError::failure("route is missing a :filename+ segment"))?;

        let filepath = self
            .dir
            .join(filename)
            .canonicalize()
            .map_err(|_| HandlerError::NotFound)?;

        // Prevent serving files above the base directory from path
        // traversals like ../../../etc/passwd
        if !is_parent(&self.dir, &filepath) {
            warn!("path traversal attempted: {:?}", &filepath);
            return Err(HandlerError::NotFound);
        }

        let metadata = fs::metadata(&filepath).map_err(|_| HandlerError::NotFound)?;
        let etag = weak_etag(&metadata);
        if revalidates(request, &etag) {
            return Ok(Reply::Http(Response::new(304).with_header("ETag", &etag)));
        }

        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.lookup(request) {
                return Ok(Reply::Http(hit));
            }
        }

        let contents = fs::read(&filepath).map_err(|_| HandlerError::NotFound)?;
        let mut response = Response::new(200)
            .with_header("ETag", &etag)
            .with_body(contents);
        if let Some(media_type) = media::media_type(filename) {
            response = response.with_header("Content-Type", media_type);
        }

        if let Some(intervene) = &self.intervene {
            response = intervene(request, response);
        }
        if response.status_code == 404 {
            return Err(HandlerError::NotFound);
        }

        if let Some(cache) = &self.cache {
            if response.content_length() < MAX_CACHE_ENTRY_SIZE {
                cache.store(request, &response);
            } else {
                debug!("{} is too large to cache", filename);
            }
        }
        Ok(Reply::Http(response))
    }
}
