use std::future::Future;
use std::path::PathBuf;

use anyhow::Result;
use funk_api::{content_type, status::StatusCode, RequestDescriptor, Target};

use crate::config::ServerConfig;
use crate::pages::build_error;
use crate::proto::http_like::Response;
use crate::store::{DiskStore, FileStore};

/// Consumer of classified `Site` and `Provider` requests.
///
/// The server awaits the returned future before accepting the next
/// connection, so a slow handler stalls everything behind it.
pub trait RequestHandler: Send + Sync {
    fn handle(&self, request: RequestDescriptor) -> impl Future<Output = Result<Response>> + Send;
}

/// Serves site pages straight from the document root and acknowledges
/// provider calls with a JSON echo of the descriptor.
#[derive(Debug, Clone)]
pub struct DefaultHandler {
    store: DiskStore,
    template_root: PathBuf,
}

impl DefaultHandler {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            store: DiskStore::new(&config.doc_root),
            template_root: config.template_dir.clone(),
        }
    }

    fn serve_page(&self, path: &str) -> Result<Response> {
        let page = if path.ends_with('/') { format!("{path}index.html") } else { path.to_string() };
        let resolved = content_type::resolve(&page);
        if !self.store.exists(&resolved.path) {
            return Ok(build_error(
                &self.store,
                &self.template_root,
                StatusCode::NotFound,
                &format!("Page not found: {path}"),
            ));
        }
        let body = self.store.read(&resolved.path)?;
        let resp = Response::new(StatusCode::Ok, body);
        Ok(match resolved.media_type {
            Some(mt) => resp.with_content_type(mt),
            None => resp,
        })
    }
}

impl RequestHandler for DefaultHandler {
    async fn handle(&self, request: RequestDescriptor) -> Result<Response> {
        match request.target {
            Target::Provider => {
                let body = serde_json::to_vec(&serde_json::json!({
                    "status": "accepted",
                    "request": request,
                }))?;
                Ok(Response::new(StatusCode::Ok, body).with_content_type("application/json"))
            }
            _ => self.serve_page(&request.path),
        }
    }
}
