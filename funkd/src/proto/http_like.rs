use funk_api::{limits::{enforce_max_message_size, MAX_MESSAGE_BYTES}, status::StatusCode};
use memchr::{memmem::Finder, memchr};
use anyhow::Result;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

pub const DEFAULT_SERVER_NAME: &str = "funkd/0.1";

#[derive(Debug, Clone)]
pub struct Request {
    pub method: String,
    /// Request target as sent, query included.
    pub path: String,
    /// Header names are stored lower-cased.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Request {
    pub fn path_only(&self) -> &str {
        self.path.split('?').next().unwrap_or("")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

pub async fn read_request<S>(stream: &mut S) -> Result<Request, StatusCode>
where
    S: AsyncReadExt + Unpin,
{
    // Read headers up to CRLFCRLF with total cap
    let mut buf = Vec::with_capacity(4096);
    let mut tmp = [0u8; 2048];
    // Track where to resume scanning for CRLFCRLF to avoid O(n^2) rescans
    let mut search_from: usize = 0;
    let finder = Finder::new(b"\r\n\r\n");
    let mut header_end: Option<usize> = None;
    loop {
        let n = stream.read(&mut tmp).await.map_err(|_| StatusCode::InternalServerError)?;
        if n == 0 { return Err(StatusCode::BadRequest); }
        let before_len = buf.len();
        buf.extend_from_slice(&tmp[..n]);
        if buf.len() > MAX_MESSAGE_BYTES { return Err(StatusCode::RequestEntityTooLarge); }
        let start = search_from.saturating_sub(3);
        if let Some(rel) = finder.find(&buf[start..]) {
            header_end = Some(start + rel);
            break;
        }
        search_from = before_len + n;
    }
    let header_end = header_end.ok_or(StatusCode::BadRequest)?;
    let (head, rest) = buf.split_at(header_end + 4);
    let head_str = std::str::from_utf8(head).map_err(|_| StatusCode::BadRequest)?;
    let mut lines = head_str.split("\r\n");
    let start = lines.next().unwrap_or("");
    let mut sp = start.split_whitespace();
    let method = sp.next().unwrap_or("").to_string();
    let path = sp.next().unwrap_or("").to_string();
    let _version = sp.next().unwrap_or("");
    if method.is_empty() || path.is_empty() { return Err(StatusCode::BadRequest); }

    let mut headers = Vec::new();
    let mut content_length: usize = 0;
    for line in lines {
        if line.is_empty() { continue; }
        if let Some(idx) = memchr(b':', line.as_bytes()) {
            let (name_raw, value_raw) = line.split_at(idx);
            let name = name_raw.trim().to_ascii_lowercase();
            let value = value_raw[1..].trim().to_string();
            if name == "content-length" {
                content_length = value.parse::<usize>().map_err(|_| StatusCode::BadRequest)?;
            }
            headers.push((name, value));
        }
    }

    let mut body = Vec::new();
    if content_length > 0 {
        // content-length is client-controlled; the sum may not fit in usize
        let total = content_length.checked_add(header_end + 4).ok_or(StatusCode::RequestEntityTooLarge)?;
        if total > MAX_MESSAGE_BYTES { return Err(StatusCode::RequestEntityTooLarge); }
        body.extend_from_slice(rest);
        while body.len() < content_length {
            let mut chunk = [0u8; 4096];
            let n = stream.read(&mut chunk).await.map_err(|_| StatusCode::InternalServerError)?;
            if n == 0 { return Err(StatusCode::BadRequest); }
            body.extend_from_slice(&chunk[..n]);
            enforce_max_message_size(header_end + 4 + body.len()).map_err(|_| StatusCode::RequestEntityTooLarge)?;
        }
        body.truncate(content_length);
    }

    Ok(Request { method, path, headers, body })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub code: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(code: StatusCode, body: Vec<u8>) -> Self {
        Self { code, headers: vec![], body }
    }

    pub fn with_content_type(mut self, media_type: &str) -> Self {
        self.headers.push(("content-type".into(), media_type.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn into_bytes(self, server_name: &str) -> Vec<u8> {
        make_response(self.code, &self.headers, &self.body, server_name)
    }
}

/// Serialize a response. `server` and `date` are always emitted; a
/// `content-type` only when the caller supplied one.
pub fn make_response(code: StatusCode, headers: &[(String, String)], body: &[u8], server_name: &str) -> Vec<u8> {
    let date = httpdate::fmt_http_date(std::time::SystemTime::now());
    let mut out = format!(
        "HTTP/1.1 {} {}\r\nserver: {}\r\ndate: {}\r\n",
        code.as_u16(), code.reason(), server_name, date
    ).into_bytes();
    let mut had_cl = false;
    for (k, v) in headers {
        if k.eq_ignore_ascii_case("content-length") { had_cl = true; }
        out.extend_from_slice(k.as_bytes());
        out.extend_from_slice(b": ");
        out.extend_from_slice(v.as_bytes());
        out.extend_from_slice(b"\r\n");
    }
    if !had_cl { out.extend_from_slice(format!("content-length: {}\r\n", body.len()).as_bytes()); }
    out.extend_from_slice(b"connection: close\r\n\r\n");
    out.extend_from_slice(body);
    out
}

/// Response sender: write one serialized response and flush.
pub async fn send_response<S>(stream: &mut S, response: Response, server_name: &str) -> std::io::Result<()>
where
    S: AsyncWriteExt + Unpin,
{
    let bytes = response.into_bytes(server_name);
    stream.write_all(&bytes).await?;
    stream.flush().await
}
