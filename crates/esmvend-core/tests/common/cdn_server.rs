//! Minimal HTTP/1.1 server standing in for a module CDN in integration tests.
//!
//! Serves a fixed route table of JavaScript bodies and redirects; unknown
//! paths get 404. Every GET is counted per path. Connections are closed
//! after one response.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Route {
    /// 200 with this body.
    Module(String),
    /// 302 to this location (absolute or root-relative).
    Redirect(String),
}

#[derive(Debug, Default)]
pub struct CdnRoutes {
    routes: HashMap<String, Route>,
}

impl CdnRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn module(mut self, path: &str, body: &str) -> Self {
        self.routes.insert(path.to_string(), Route::Module(body.to_string()));
        self
    }

    pub fn redirect(mut self, path: &str, location: &str) -> Self {
        self.routes.insert(path.to_string(), Route::Redirect(location.to_string()));
        self
    }
}

/// Handle to a running server. The server runs until the process exits.
#[derive(Clone)]
pub struct CdnServer {
    /// e.g. "http://127.0.0.1:12345" (no trailing slash).
    pub origin: String,
    hits: Arc<Mutex<HashMap<String, usize>>>,
}

impl CdnServer {
    /// Absolute URL for a path on this server.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.origin, path)
    }

    /// Number of GET requests received for `path` (including the query).
    pub fn hits(&self, path: &str) -> usize {
        self.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }
}

/// Starts a server in a background thread serving `routes`.
pub fn start(routes: CdnRoutes) -> CdnServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes = Arc::new(routes.routes);
    let hits = Arc::new(Mutex::new(HashMap::new()));
    let server_hits = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let hits = Arc::clone(&server_hits);
            thread::spawn(move || handle(stream, &routes, &hits));
        }
    });
    CdnServer {
        origin: format!("http://127.0.0.1:{}", port),
        hits,
    }
}

fn handle(
    mut stream: TcpStream,
    routes: &HashMap<String, Route>,
    hits: &Mutex<HashMap<String, usize>>,
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
    let Some((method, path)) = parse_request_line(request) else {
        let _ = stream.write_all(b"HTTP/1.1 400 Bad Request\r\nConnection: close\r\n\r\n");
        return;
    };
    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream
            .write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        return;
    }
    *hits.lock().unwrap().entry(path.to_string()).or_default() += 1;

    let response = match routes.get(path) {
        Some(Route::Module(body)) => format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/javascript; charset=utf-8\r\n\
Content-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        ),
        Some(Route::Redirect(location)) => format!(
            "HTTP/1.1 302 Found\r\nLocation: {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            location
        ),
        None => {
            let body = format!("not found: {path}");
            format!(
                "HTTP/1.1 404 Not Found\r\nContent-Type: text/plain\r\nContent-Length: {}\r\n\
Connection: close\r\n\r\n{}",
                body.len(),
                body
            )
        }
    };
    let _ = stream.write_all(response.as_bytes());
}

/// Returns (method, request-target) from the first line.
fn parse_request_line(request: &str) -> Option<(&str, &str)> {
    let line = request.lines().next()?;
    let mut parts = line.split_whitespace();
    let method = parts.next()?;
    let target = parts.next()?;
    Some((method, target))
}
