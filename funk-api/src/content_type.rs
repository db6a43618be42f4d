/// Outcome of [`resolve`]: the lower-cased path, plus the media type when the
/// extension is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub path: String,
    pub media_type: Option<&'static str>,
}

const TABLE: &[(&str, &str)] = &[
    (".css", "text/css"),
    (".js", "text/javascript"),
    (".htm", "text/html"),
    (".html", "text/html"),
    (".png", "image/png"),
    (".jpg", "image/jpg"),
    (".jpeg", "image/jpg"),
    (".gif", "image/gif"),
    (".appcache", "text/cache-manifest"),
    (".woff2", "application/font-woff2"),
    (".cgi", "text/html"),
];

/// Map a path's extension to the response media type. Unknown extensions
/// leave the media type unset; the caller then sends no `Content-Type`.
pub fn resolve(path: &str) -> Resolved {
    let path = path.to_ascii_lowercase();
    let media_type = TABLE
        .iter()
        .find(|(ext, _)| path.ends_with(ext))
        .map(|(_, mt)| *mt);
    Resolved { path, media_type }
}
