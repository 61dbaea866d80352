//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a fixed set of paths with GET. Unknown paths get 404; a path can
//! be told to answer 500 a number of times before serving its body.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Default)]
struct Routes {
    bodies: HashMap<String, Vec<u8>>,
    failures: HashMap<String, usize>,
    hits: HashMap<String, usize>,
}

/// Handle to a running server. The server runs until the process exits.
#[derive(Clone)]
pub struct StaticServer {
    base: String,
    routes: Arc<Mutex<Routes>>,
}

impl StaticServer {
    /// Base URL, e.g. "http://127.0.0.1:12345/".
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Absolute URL for `path` (no leading slash).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn insert(&self, path: &str, body: impl Into<Vec<u8>>) {
        self.routes
            .lock()
            .unwrap()
            .bodies
            .insert(format!("/{}", path), body.into());
    }

    pub fn fail(&self, path: &str, times: usize) {
        self.routes
            .lock()
            .unwrap()
            .failures
            .insert(format!("/{}", path), times);
    }

    pub fn hits(&self, path: &str) -> usize {
        self.routes
            .lock()
            .unwrap()
            .hits
            .get(&format!("/{}", path))
            .copied()
            .unwrap_or(0)
    }
}

/// Starts a server in a background thread.
pub fn start() -> StaticServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes = Arc::new(Mutex::new(Routes::default()));
    let shared = Arc::clone(&routes);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&shared);
            thread::spawn(move || handle(stream, &routes));
        }
    });
    StaticServer {
        base: format!("http://127.0.0.1:{}/", port),
        routes,
    }
}

fn handle(mut stream: std::net::TcpStream, routes: &Mutex<Routes>) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
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
    let (method, path) = parse_request_line(request);
    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        return;
    }
    let path = path.split('?').next().unwrap_or("/").to_string();

    let (status, body) = {
        let mut routes = routes.lock().unwrap();
        *routes.hits.entry(path.clone()).or_default() += 1;
        let failing = match routes.failures.get_mut(&path) {
            Some(left) if *left > 0 => {
                *left -= 1;
                true
            }
            _ => false,
        };
        if failing {
            ("500 Internal Server Error", Vec::new())
        } else {
            match routes.bodies.get(&path) {
                Some(b) => ("200 OK", b.clone()),
                None => ("404 Not Found", Vec::new()),
            }
        }
    };
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&body);
}

/// Returns (method, path) from the request line.
fn parse_request_line(request: &str) -> (&str, &str) {
    let line = request.lines().next().unwrap_or("");
    let mut parts = line.split_whitespace();
    let method = parts.next().unwrap_or("");
    let path = parts.next().unwrap_or("/");
    (method, path)
}
