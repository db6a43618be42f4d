use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use funkd::api::{limits::MAX_MESSAGE_BYTES, RequestDescriptor, StatusCode};
use funkd::config::ServerConfig;
use funkd::handler::{DefaultHandler, RequestHandler};
use funkd::proto::http_like::{read_request, Response};
use funkd::server::Server;
use serde_json::Value;
use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

async fn roundtrip<H: RequestHandler>(server: &Server<H>, raw: &[u8]) -> String {
    let (mut client, mut conn) = duplex(1 << 16);
    client.write_all(raw).await.unwrap();
    server.serve_connection(&mut conn).await.expect("serve");
    drop(conn);
    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();
    String::from_utf8_lossy(&out).into_owned()
}

fn docroot() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>on air</h1>").unwrap();
    std::fs::write(dir.path().join("app.woff2"), [0u8, 1, 2]).unwrap();
    dir
}

#[tokio::test]
async fn serves_static_file_with_fixed_headers() {
    let dir = docroot();
    let config = ServerConfig::with_doc_root(dir.path());
    let server = Server::new(&config, DefaultHandler::new(&config));

    let resp = roundtrip(&server, b"GET /app.woff2 HTTP/1.1\r\nhost: x\r\n\r\n").await;
    assert!(resp.starts_with("HTTP/1.1 200 OK\r\n"), "response was: {resp}");
    assert!(resp.contains("server: funkd/0.1\r\n"));
    assert!(resp.contains("\r\ndate: "));
    assert!(resp.contains("content-type: application/font-woff2\r\n"));
    assert!(resp.contains("content-length: 3\r\n"));
}

#[tokio::test]
async fn default_handler_serves_site_root() {
    let dir = docroot();
    let config = ServerConfig::with_doc_root(dir.path());
    let server = Server::new(&config, DefaultHandler::new(&config));

    let resp = roundtrip(&server, b"GET / HTTP/1.1\r\n\r\n").await;
    assert!(resp.starts_with("HTTP/1.1 200 OK"));
    assert!(resp.contains("content-type: text/html"));
    assert!(resp.ends_with("<h1>on air</h1>"));
}

#[tokio::test]
async fn default_handler_acknowledges_provider_calls() {
    let dir = docroot();
    let config = ServerConfig::with_doc_root(dir.path());
    let server = Server::new(&config, DefaultHandler::new(&config));

    let body = "name=DJ+Eve&role=host";
    let raw = format!(
        "POST /providers/users/ HTTP/1.1\r\nAction: Add\r\nRequest-Type: async\r\nUAgent: cli\r\n\
Content-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    );
    let resp = roundtrip(&server, raw.as_bytes()).await;
    assert!(resp.starts_with("HTTP/1.1 200 OK"), "response was: {resp}");
    let json = resp.split("\r\n\r\n").nth(1).unwrap();
    let v: Value = serde_json::from_str(json).expect("valid json");
    assert_eq!(v["status"], "accepted");
    assert_eq!(v["request"]["target"], "provider");
    assert_eq!(v["request"]["provider"], "user");
    assert_eq!(v["request"]["action"], "add");
    assert_eq!(v["request"]["mode"], "async");
    assert_eq!(v["request"]["user_agent"], "cli");
    assert_eq!(v["request"]["fields"]["name"], "DJ Eve");
}

#[tokio::test]
async fn missing_page_is_404_document() {
    let dir = docroot();
    let config = ServerConfig::with_doc_root(dir.path());
    let server = Server::new(&config, DefaultHandler::new(&config));

    let resp = roundtrip(&server, b"GET /nowhere.html HTTP/1.1\r\n\r\n").await;
    assert!(resp.starts_with("HTTP/1.1 404 Not Found"), "response was: {resp}");
    assert!(resp.contains("Page not found: /nowhere.html"));
}

#[tokio::test]
async fn unreadable_request_gets_400() {
    let dir = docroot();
    let config = ServerConfig::with_doc_root(dir.path());
    let server = Server::new(&config, DefaultHandler::new(&config));

    let resp = roundtrip(&server, b"\r\n\r\n").await;
    assert!(resp.starts_with("HTTP/1.1 400 Bad Request"), "response was: {resp}");
}

#[tokio::test]
async fn oversized_request_is_rejected_with_413() {
    let (mut client, mut server) = duplex(8192);
    let srv = tokio::spawn(async move { read_request(&mut server).await.map(|_| ()) });

    let head = format!("POST /x HTTP/1.1\r\ncontent-length: {}\r\n\r\n", MAX_MESSAGE_BYTES + 1);
    client.write_all(head.as_bytes()).await.unwrap();
    assert_eq!(srv.await.unwrap(), Err(StatusCode::RequestEntityTooLarge));
}

#[tokio::test]
async fn overflowing_content_length_is_rejected_with_413() {
    let (mut client, mut server) = duplex(8192);
    let srv = tokio::spawn(async move { read_request(&mut server).await.map(|_| ()) });

    let head = format!("POST /x HTTP/1.1\r\ncontent-length: {}\r\n\r\n", usize::MAX);
    client.write_all(head.as_bytes()).await.unwrap();
    let joined = srv.await;
    assert!(joined.is_ok(), "reader panicked");
    assert_eq!(joined.unwrap(), Err(StatusCode::RequestEntityTooLarge));
}

#[tokio::test]
async fn server_answers_413_for_overflowing_content_length() {
    let dir = docroot();
    let config = ServerConfig::with_doc_root(dir.path());
    let server = Server::new(&config, DefaultHandler::new(&config));

    let raw = format!("POST /x HTTP/1.1\r\ncontent-length: {}\r\n\r\n", usize::MAX);
    let resp = roundtrip(&server, raw.as_bytes()).await;
    assert!(resp.starts_with("HTTP/1.1 413 "), "response was: {resp}");
}

#[tokio::test]
async fn body_is_read_across_chunks() {
    let (mut client, mut server) = duplex(64);
    let srv = tokio::spawn(async move { read_request(&mut server).await });

    let body = vec![b'a'; 1000];
    let head = format!("POST /x HTTP/1.1\r\nContent-Length: {}\r\n\r\n", body.len());
    client.write_all(head.as_bytes()).await.unwrap();
    client.write_all(&body).await.unwrap();
    let req = srv.await.unwrap().expect("request");
    assert_eq!(req.body.len(), 1000);
    assert_eq!(req.header("Content-Length"), Some("1000"));
}

/// Handler that is slow on its first call; used to observe serial processing.
#[derive(Clone, Default)]
struct SlowFirst {
    log: Arc<Mutex<Vec<String>>>,
}

impl RequestHandler for SlowFirst {
    async fn handle(&self, request: RequestDescriptor) -> Result<Response> {
        self.log.lock().unwrap().push(format!("start {}", request.path));
        if request.path == "/first.html" {
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        self.log.lock().unwrap().push(format!("end {}", request.path));
        Ok(Response::new(StatusCode::Ok, request.path.into_bytes()))
    }
}

async fn fetch(addr: std::net::SocketAddr, path: &str) -> String {
    let mut s = TcpStream::connect(addr).await.unwrap();
    s.write_all(format!("GET {path} HTTP/1.1\r\n\r\n").as_bytes()).await.unwrap();
    let mut out = Vec::new();
    s.read_to_end(&mut out).await.unwrap();
    String::from_utf8_lossy(&out).into_owned()
}

#[tokio::test]
async fn connections_are_processed_one_at_a_time() {
    let dir = docroot();
    let config = ServerConfig::with_doc_root(dir.path());
    let handler = SlowFirst::default();
    let log = handler.log.clone();
    let server = Server::new(&config, handler);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let srv = tokio::spawn(async move { server.run(listener).await });

    let first = tokio::spawn(fetch(addr, "/first.html"));
    tokio::time::sleep(Duration::from_millis(30)).await;
    let second = tokio::spawn(fetch(addr, "/second.html"));

    assert!(first.await.unwrap().ends_with("/first.html"));
    assert!(second.await.unwrap().ends_with("/second.html"));
    assert_eq!(
        *log.lock().unwrap(),
        vec!["start /first.html", "end /first.html", "start /second.html", "end /second.html"]
    );
    srv.abort();
}
