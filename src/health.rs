//! Keep-alive HTTP endpoint for uptime monitors: `GET /` and `GET /ping`.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info};

pub const HOME_BODY: &str = "Faceit bot is running! 🤖";

fn route(method: &str, path: &str) -> (&'static str, &'static str) {
    match (method, path) {
        ("GET" | "HEAD", "/") => ("HTTP/1.1 200 OK", HOME_BODY),
        ("GET" | "HEAD", "/ping") => {
            info!("🏓 Ping from uptime monitor");
            ("HTTP/1.1 200 OK", "pong")
        }
        _ => ("HTTP/1.1 404 Not Found", "not found"),
    }
}

async fn handle_connection(mut stream: TcpStream) -> Result<()> {
    let mut buf = vec![0u8; 4096];
    let n = stream.read(&mut buf).await.context("http read")?;
    if n == 0 {
        return Ok(());
    }

    let req = String::from_utf8_lossy(&buf[..n]);
    let first_line = req.lines().next().unwrap_or_default();
    let mut parts = first_line.split_whitespace();
    let method = parts.next().unwrap_or("");
    let target = parts.next().unwrap_or("");
    let path = target.split('?').next().unwrap_or(target);

    let (status_line, body) = route(method, path);
    let payload = if method == "HEAD" { "" } else { body };

    let resp = format!(
        "{status_line}\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        payload
    );
    stream.write_all(resp.as_bytes()).await.context("http write")?;
    Ok(())
}

pub async fn serve(listener: TcpListener) -> Result<()> {
    loop {
        let (stream, peer) = listener.accept().await.context("http accept")?;
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream).await {
                debug!("health handler err {}: {}", peer, e);
            }
        });
    }
}

pub async fn start(bind: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(bind).await.context("health bind")?;
    info!("🌐 Health endpoint on http://{} (GET /, /ping)", bind);
    serve(listener).await
}
