use std::path::PathBuf;

use funk_api::{content_type, status::StatusCode, Method, RequestDescriptor, Target};

use crate::config::ServerConfig;
use crate::form;
use crate::handler::RequestHandler;
use crate::pages::build_error;
use crate::proto::http_like::{Request, Response};
use crate::store::{under_root, DiskStore, FileStore, TemplateStore, UploadStore};

mod classifier;

pub use classifier::{classify, get_header, Classification};

pub const USER_AGENT_HEADER: &str = "uagent";
pub const CONTENT_TYPE_HEADER: &str = "content-type";

/// Turns one parsed request into a response: classify, decode, then hand the
/// descriptor to the handler or serve a file.
pub struct Router<H> {
    files: Box<dyn FileStore>,
    templates: Box<dyn TemplateStore>,
    uploads: Box<dyn UploadStore>,
    template_root: PathBuf,
    upload_root: PathBuf,
    handler: H,
}

impl<H: RequestHandler> Router<H> {
    pub fn new(config: &ServerConfig, handler: H) -> Self {
        let disk = DiskStore::new(&config.doc_root);
        Self {
            files: Box::new(disk.clone()),
            templates: Box::new(disk.clone()),
            uploads: Box::new(disk),
            template_root: config.template_dir.clone(),
            upload_root: config.upload_root.clone(),
            handler,
        }
    }

    pub async fn handle(&self, req: Request) -> Response {
        let descriptor = match self.describe(&req) {
            Ok(d) => d,
            Err(resp) => return resp,
        };
        tracing::debug!(
            method = descriptor.method.as_str(),
            path = %descriptor.path,
            target = ?descriptor.target,
            provider = ?descriptor.provider,
            action = ?descriptor.action,
            mode = ?descriptor.mode,
            fields = descriptor.fields.len(),
            "request classified"
        );

        match descriptor.target {
            Target::Site | Target::Provider => {
                let path = descriptor.path.clone();
                match self.handler.handle(descriptor).await {
                    Ok(resp) => resp,
                    Err(e) => {
                        tracing::error!(path = %path, "handler failed: {e:#}");
                        self.error(StatusCode::InternalServerError, "The request could not be processed.")
                    }
                }
            }
            Target::File => self.serve_file(&descriptor.path),
        }
    }

    /// Build the request descriptor. A malformed body short-circuits into a
    /// 400 error document.
    ///
    /// Uploads go below the raw request path for site and provider routes. For
    /// a page such as `/index.html` that directory is a file path, so every
    /// upload there fails to store and is skipped with only a `warn!` to show
    /// for it.
    pub fn describe(&self, req: &Request) -> Result<RequestDescriptor, Response> {
        let path = req.path_only().to_string();
        let c = classify(&path, &req.headers);
        let method = Method::parse(&req.method);

        // file routes upload next to the resolved static path, others below the raw path
        let upload_dir = match c.target {
            Target::File => under_root(&self.upload_root, &content_type::resolve(&path).path),
            _ => under_root(&self.upload_root, &path),
        };
        let fields = form::decode(
            &method,
            &req.path,
            req.header(CONTENT_TYPE_HEADER),
            &req.body,
            &upload_dir,
            self.uploads.as_ref(),
        )
        .map_err(|e| {
            tracing::warn!(path = %path, "malformed request payload: {e}");
            self.error(StatusCode::BadRequest, &format!("Malformed request payload: {e}"))
        })?
        .unwrap_or_default();

        Ok(RequestDescriptor {
            method,
            path,
            target: c.target,
            provider: c.provider,
            action: c.action,
            mode: c.mode,
            user_agent: req.header(USER_AGENT_HEADER).unwrap_or_default().to_string(),
            fields,
        })
    }

    pub fn serve_file(&self, path: &str) -> Response {
        let resolved = content_type::resolve(path);
        if !self.files.exists(&resolved.path) {
            return self.error(StatusCode::NotFound, &format!("File not found: {path}"));
        }
        match self.files.read(&resolved.path) {
            Ok(bytes) => {
                let resp = Response::new(StatusCode::Ok, bytes);
                match resolved.media_type {
                    Some(mt) => resp.with_content_type(mt),
                    None => resp,
                }
            }
            Err(e) => {
                tracing::error!(path = %resolved.path, "failed to read file: {e}");
                self.error(StatusCode::InternalServerError, "The file could not be read.")
            }
        }
    }

    pub fn error(&self, code: StatusCode, message: &str) -> Response {
        build_error(self.templates.as_ref(), &self.template_root, code, message)
    }
}
