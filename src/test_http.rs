//! Canned HTTP fixtures for stream tests.
//!
//! The streaming contracts (ordering, truncation, missing bodies) have
//! to be testable offline, so these helpers serve hand-written HTTP/1.1
//! responses over a local socket.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Serves exactly one connection with a canned HTTP response, then
/// closes. Returns the base URL to point a client at.
pub(crate) async fn serve_once(response: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request(&mut socket).await;
        socket.write_all(&response).await.unwrap();
        socket.flush().await.unwrap();
    });
    format!("http://{addr}/")
}

/// Reads one full HTTP request (headers plus content-length body).
async fn read_request(socket: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 1024];
    loop {
        let n = socket.read(&mut tmp).await.unwrap();
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&tmp[..n]);
        if let Some(pos) = find_subsequence(&buf, b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..pos]).to_ascii_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            let mut remaining = content_length.saturating_sub(buf.len() - (pos + 4));
            while remaining > 0 {
                let n = socket.read(&mut tmp).await.unwrap();
                if n == 0 {
                    return;
                }
                remaining = remaining.saturating_sub(n);
            }
            return;
        }
    }
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Builds a complete chunked HTTP response from the given body chunks.
pub(crate) fn chunked_response(chunks: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(
        b"HTTP/1.1 200 OK\r\n\
          content-type: text/plain; charset=utf-8\r\n\
          transfer-encoding: chunked\r\n\
          connection: close\r\n\r\n",
    );
    for chunk in chunks {
        out.extend_from_slice(format!("{:x}\r\n", chunk.len()).as_bytes());
        out.extend_from_slice(chunk);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(b"0\r\n\r\n");
    out
}

/// Like [`chunked_response`] but without the terminal chunk, so the
/// connection drops mid-stream.
pub(crate) fn truncated_chunked_response(chunks: &[&[u8]]) -> Vec<u8> {
    let mut out = chunked_response(chunks);
    out.truncate(out.len() - b"0\r\n\r\n".len());
    out
}

/// Builds a complete JSON response with a content-length.
pub(crate) fn json_response(body: &str) -> Vec<u8> {
    format!(
        "HTTP/1.1 200 OK\r\n\
         content-type: application/json\r\n\
         content-length: {}\r\n\
         connection: close\r\n\r\n{}",
        body.len(),
        body
    )
    .into_bytes()
}
