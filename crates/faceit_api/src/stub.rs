//! Loopback HTTP stub serving canned FACEIT responses.
//!
//! Routes match on the request path without its query string. Unknown paths
//! get a 404. Every request path is recorded in arrival order.

use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
pub struct StubRoute {
    pub path:   String,
    pub status: u16,
    pub body:   String,
}

impl StubRoute {
    pub fn ok(path: &str, body: &str) -> Self {
        Self::status(path, 200, body)
    }

    pub fn status(path: &str, status: u16, body: &str) -> Self {
        Self { path: path.to_string(), status, body: body.to_string() }
    }
}

pub struct StubServer {
    base_url: String,
    hits:     Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub async fn spawn(routes: Vec<StubRoute>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub listener");
        let addr = listener.local_addr().expect("stub local addr");
        let hits = Arc::new(Mutex::new(Vec::new()));
        let routes = Arc::new(routes);

        {
            let hits = Arc::clone(&hits);
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    let routes = Arc::clone(&routes);
                    let hits = Arc::clone(&hits);
                    tokio::spawn(async move {
                        let _ = serve(stream, &routes, &hits).await;
                    });
                }
            });
        }

        Self { base_url: format!("http://{addr}"), hits }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().map(|h| h.clone()).unwrap_or_default()
    }
}

async fn serve(
    mut stream: TcpStream,
    routes: &[StubRoute],
    hits: &Mutex<Vec<String>>,
) -> std::io::Result<()> {
    let mut buf = Vec::with_capacity(4096);
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }

    let req = String::from_utf8_lossy(&buf);
    let target = req
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/");
    let path = target.split('?').next().unwrap_or(target).to_string();

    if let Ok(mut h) = hits.lock() {
        h.push(path.clone());
    }

    let (status, body) = routes
        .iter()
        .find(|r| r.path == path)
        .map(|r| (r.status, r.body.clone()))
        .unwrap_or((404, "{}".to_string()));

    let reason = if status < 400 { "OK" } else { "Error" };
    let resp = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    stream.write_all(resp.as_bytes()).await?;
    stream.shutdown().await
}
