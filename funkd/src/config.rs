use std::path::PathBuf;

use crate::proto::http_like::DEFAULT_SERVER_NAME;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub addr: String,            // 127.0.0.1:8080
    pub doc_root: PathBuf,       // www
    pub template_dir: PathBuf,   // <doc_root>/templates
    pub upload_root: PathBuf,    // <doc_root>
    pub server_name: String,     // funkd/0.1
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::with_doc_root("www")
    }
}

impl ServerConfig {
    /// Defaults with every directory derived from `doc_root`.
    pub fn with_doc_root(doc_root: impl Into<PathBuf>) -> Self {
        let doc_root = doc_root.into();
        Self {
            addr: "127.0.0.1:8080".to_string(),
            template_dir: doc_root.join("templates"),
            upload_root: doc_root.clone(),
            doc_root,
            server_name: DEFAULT_SERVER_NAME.to_string(),
        }
    }

    /// - FUNK_ADDR (default 127.0.0.1:8080)
    /// - FUNK_DOC_ROOT (default www)
    /// - FUNK_TEMPLATE_DIR (default <doc_root>/templates)
    /// - FUNK_UPLOAD_ROOT (default <doc_root>)
    /// - FUNK_SERVER_NAME (default funkd/0.1)
    pub fn from_env() -> Self {
        let doc_root = env_nonempty("FUNK_DOC_ROOT").unwrap_or_else(|| "www".to_string());
        let mut cfg = Self::with_doc_root(doc_root);

        if let Some(addr) = env_nonempty("FUNK_ADDR") {
            cfg.addr = addr;
        }
        if let Some(dir) = env_nonempty("FUNK_TEMPLATE_DIR") {
            cfg.template_dir = PathBuf::from(dir);
        }
        if let Some(dir) = env_nonempty("FUNK_UPLOAD_ROOT") {
            cfg.upload_root = PathBuf::from(dir);
        }
        if let Some(name) = env_nonempty("FUNK_SERVER_NAME") {
            cfg.server_name = name;
        }
        cfg
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
