//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves `/node/<id>/pdf` with a canned response per node and records every
//! node requested. Unknown nodes get 404. A `Hang` node accepts the request and
//! never answers, to exercise the client's timeout.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum NodeResponse {
    /// Status code, optional Content-Type, body.
    Reply(u16, Option<&'static str>, Vec<u8>),
    /// Read the request, then stall without sending anything.
    Hang,
}

impl NodeResponse {
    pub fn pdf(body: &[u8]) -> Self {
        NodeResponse::Reply(200, Some("application/pdf"), body.to_vec())
    }

    pub fn html() -> Self {
        NodeResponse::Reply(200, Some("text/html; charset=utf-8"), b"<html></html>".to_vec())
    }
}

pub struct NodeServer {
    /// e.g. "http://127.0.0.1:12345/node/{id}/pdf"
    pub template: String,
    requested: Arc<Mutex<Vec<u64>>>,
}

impl NodeServer {
    /// Nodes requested so far, in arrival order.
    pub fn requested(&self) -> Vec<u64> {
        self.requested.lock().unwrap().clone()
    }
}

/// Starts a server in a background thread. It runs until the process exits.
pub fn start(routes: Vec<(u64, NodeResponse)>) -> NodeServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes: Arc<HashMap<u64, NodeResponse>> = Arc::new(routes.into_iter().collect());
    let requested = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&requested);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let log = Arc::clone(&log);
            thread::spawn(move || handle(stream, &routes, &log));
        }
    });
    NodeServer {
        template: format!("http://127.0.0.1:{}/node/{{id}}/pdf", port),
        requested,
    }
}

/// A URL template pointing at a port nothing listens on.
pub fn dead_template() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/node/{{id}}/pdf", port)
}

fn handle(
    mut stream: std::net::TcpStream,
    routes: &HashMap<u64, NodeResponse>,
    log: &Mutex<Vec<u64>>,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let Some(node) = parse_node(request) else {
        let _ = stream.write_all(b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        return;
    };
    log.lock().unwrap().push(node);

    let fallback = NodeResponse::Reply(404, Some("text/html"), b"not found".to_vec());
    match routes.get(&node).unwrap_or(&fallback) {
        NodeResponse::Hang => {
            thread::sleep(Duration::from_secs(5));
        }
        NodeResponse::Reply(status, content_type, body) => {
            let ct = content_type
                .map(|ct| format!("Content-Type: {}\r\n", ct))
                .unwrap_or_default();
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
                status,
                reason(*status),
                body.len(),
                ct
            );
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.write_all(body);
        }
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    }
}

/// Extracts `<id>` from `GET /node/<id>/pdf HTTP/1.1`.
fn parse_node(request: &str) -> Option<u64> {
    let line = request.lines().next()?;
    let mut parts = line.split_whitespace();
    let method = parts.next()?;
    if !method.eq_ignore_ascii_case("GET") {
        return None;
    }
    let path = parts.next()?;
    let rest = path.strip_prefix("/node/")?;
    let id = rest.strip_suffix("/pdf")?;
    id.parse().ok()
}
