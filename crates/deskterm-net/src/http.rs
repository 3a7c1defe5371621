//! Minimal blocking HTTP/1.1 client.
//!
//! Plain HTTP runs over `std::net::TcpStream`. HTTPS needs the `tls-rustls`
//! feature; without it, `https` URLs fail with a network error.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use deskterm_types::error::{DesktermError, Result};

use crate::url::Url;

/// Maximum response size accepted from a server (8 MB).
const MAX_BODY_SIZE: usize = 8 * 1024 * 1024;

/// Redirect hops followed when a request asks for it.
const MAX_REDIRECTS: u8 = 5;

/// Default connect/read timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("deskterm/", env!("CARGO_PKG_VERSION"));

/// An outgoing request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: String,
    pub url: Url,
    /// Extra headers; `Host`, `Connection` and `Content-Length` are added by
    /// the client.
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    /// Applied to connect and to every read/write.
    pub timeout: Duration,
    pub follow_redirects: bool,
}

impl HttpRequest {
    pub fn new(method: &str, url: Url) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            url,
            headers: Vec::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT,
            follow_redirects: false,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new("GET", url)
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }
}

/// A parsed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status_code: u16,
    pub reason: String,
    /// Header names lowercased, in wire order.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Anything that can perform an HTTP request.
///
/// The terminal's `ping` and `curl` commands talk to this trait so tests can
/// substitute canned responses.
pub trait HttpClient {
    fn request(&self, req: &HttpRequest) -> Result<HttpResponse>;
}

/// Blocking client over `std::net`.
#[derive(Clone)]
pub struct StdHttpClient {
    #[cfg(feature = "tls-rustls")]
    tls: std::sync::Arc<rustls::ClientConfig>,
}

impl std::fmt::Debug for StdHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StdHttpClient")
            .field("tls", &cfg!(feature = "tls-rustls"))
            .finish()
    }
}

impl StdHttpClient {
    pub fn new() -> Self {
        Self {
            #[cfg(feature = "tls-rustls")]
            tls: crate::tls::client_config(),
        }
    }

    /// Whether this build can speak HTTPS.
    pub fn supports_https(&self) -> bool {
        cfg!(feature = "tls-rustls")
    }

    fn send_once(&self, req: &HttpRequest, url: &Url) -> Result<HttpResponse> {
        let stream = tcp_connect(&url.host, url.port_or_default(), req.timeout)?;
        let raw = if url.is_https() {
            self.exchange_tls(stream, req, url)?
        } else {
            let mut stream = stream;
            send_request(&mut stream, req, url)?;
            read_response(&mut stream)?
        };
        parse_response(&raw, req.method == "HEAD")
    }

    #[cfg(feature = "tls-rustls")]
    fn exchange_tls(&self, stream: TcpStream, req: &HttpRequest, url: &Url) -> Result<Vec<u8>> {
        let mut tls = crate::tls::connect(&self.tls, &url.host, stream)?;
        send_request(&mut tls, req, url)?;
        read_response(&mut tls)
    }

    #[cfg(not(feature = "tls-rustls"))]
    fn exchange_tls(&self, _stream: TcpStream, _req: &HttpRequest, url: &Url) -> Result<Vec<u8>> {
        Err(DesktermError::Network(format!(
            "{}: HTTPS is not available in this build",
            url.host
        )))
    }
}

impl Default for StdHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for StdHttpClient {
    fn request(&self, req: &HttpRequest) -> Result<HttpResponse> {
        if req.url.scheme != "http" && req.url.scheme != "https" {
            return Err(DesktermError::Network(format!(
                "unsupported scheme: {}",
                req.url.scheme
            )));
        }
        let mut url = req.url.clone();
        let hops = if req.follow_redirects { MAX_REDIRECTS } else { 0 };
        for _ in 0..=hops {
            log::debug!("{} {url}", req.method);
            let resp = self.send_once(req, &url)?;
            if req.follow_redirects
                && is_redirect(resp.status_code)
                && let Some(location) = resp.header("location")
            {
                url = url.join(location).ok_or_else(|| {
                    DesktermError::Network(format!("bad redirect location: {location}"))
                })?;
                continue;
            }
            return Ok(resp);
        }
        Err(DesktermError::Network("too many redirects".to_string()))
    }
}

// -------------------------------------------------------------------
// Wire helpers
// -------------------------------------------------------------------

/// Resolve and connect with a timeout, then apply read/write timeouts.
fn tcp_connect(host: &str, port: u16, timeout: Duration) -> Result<TcpStream> {
    let addr = (host, port)
        .to_socket_addrs()
        .map_err(|e| DesktermError::Network(format!("{host}: DNS resolution failed: {e}")))?
        .next()
        .ok_or_else(|| DesktermError::Network(format!("{host}: no addresses")))?;

    let stream = TcpStream::connect_timeout(&addr, timeout).map_err(|e| {
        if e.kind() == io::ErrorKind::TimedOut {
            DesktermError::Network(format!("{host}: request timed out"))
        } else {
            DesktermError::Network(format!("{host}: connection failed: {e}"))
        }
    })?;
    stream.set_read_timeout(Some(timeout))?;
    stream.set_write_timeout(Some(timeout))?;
    Ok(stream)
}

/// Serialize the request head and body.
fn send_request(stream: &mut impl Write, req: &HttpRequest, url: &Url) -> Result<()> {
    let mut head = format!(
        "{} {} HTTP/1.1\r\nHost: {}\r\n",
        req.method,
        url.target(),
        url.host_header()
    );
    let has = |name: &str| req.headers.iter().any(|(k, _)| k.eq_ignore_ascii_case(name));
    if !has("user-agent") {
        head.push_str(&format!("User-Agent: {USER_AGENT}\r\n"));
    }
    if !has("accept") {
        head.push_str("Accept: */*\r\n");
    }
    for (name, value) in &req.headers {
        head.push_str(&format!("{name}: {value}\r\n"));
    }
    if let Some(body) = &req.body {
        if !has("content-type") {
            head.push_str("Content-Type: application/x-www-form-urlencoded\r\n");
        }
        head.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    head.push_str("Connection: close\r\n\r\n");

    let send_err = |e: io::Error| DesktermError::Network(format!("send request: {e}"));
    stream.write_all(head.as_bytes()).map_err(send_err)?;
    if let Some(body) = &req.body {
        stream.write_all(body.as_bytes()).map_err(send_err)?;
    }
    stream.flush().map_err(send_err)
}

/// Read until EOF. Read timeouts are errors; a peer that closes without a
/// TLS close_notify is treated as EOF.
fn read_response(stream: &mut impl Read) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(8192);
    let mut chunk = [0u8; 8192];
    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                if buf.len() + n > MAX_BODY_SIZE + 4096 {
                    return Err(DesktermError::Network("response too large".to_string()));
                }
                buf.extend_from_slice(&chunk[..n]);
            },
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e)
                if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::TimedOut =>
            {
                if buf.is_empty() {
                    return Err(DesktermError::Network("request timed out".to_string()));
                }
                break;
            },
            Err(e) => return Err(DesktermError::Network(format!("read response: {e}"))),
        }
    }
    Ok(buf)
}

/// Parse a raw response. `head_only` skips the body (responses to `HEAD`).
pub fn parse_response(data: &[u8], head_only: bool) -> Result<HttpResponse> {
    let header_end = find_subsequence(data, b"\r\n\r\n").ok_or_else(|| {
        DesktermError::Network("malformed HTTP response: no header terminator".to_string())
    })?;
    let header_str = std::str::from_utf8(&data[..header_end])
        .map_err(|_| DesktermError::Network("non-UTF-8 headers".to_string()))?;

    let mut lines = header_str.split("\r\n");
    let status_line = lines
        .next()
        .ok_or_else(|| DesktermError::Network("empty response".to_string()))?;
    let (status_code, reason) = parse_status_line(status_line)?;

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
        .collect();

    let raw_body = &data[header_end + 4..];
    let body = if head_only {
        Vec::new()
    } else if find_header(&headers, "transfer-encoding").is_some_and(|v| v.contains("chunked")) {
        decode_chunked(raw_body)?
    } else if let Some(cl) = find_header(&headers, "content-length") {
        let len: usize = cl
            .parse()
            .map_err(|_| DesktermError::Network("bad Content-Length".to_string()))?;
        if len > MAX_BODY_SIZE {
            return Err(DesktermError::Network(
                "response body exceeds 8 MB limit".to_string(),
            ));
        }
        raw_body[..raw_body.len().min(len)].to_vec()
    } else {
        raw_body.to_vec()
    };

    Ok(HttpResponse {
        status_code,
        reason,
        headers,
        body,
    })
}

/// `HTTP/1.1 200 OK` -> `(200, "OK")`.
fn parse_status_line(line: &str) -> Result<(u16, String)> {
    let mut parts = line.splitn(3, ' ');
    let version = parts.next().unwrap_or_default();
    if !version.starts_with("HTTP/") {
        return Err(DesktermError::Network(format!("bad status line: {line}")));
    }
    let code = parts
        .next()
        .and_then(|c| c.parse().ok())
        .ok_or_else(|| DesktermError::Network(format!("bad status code in: {line}")))?;
    Ok((code, parts.next().unwrap_or_default().to_string()))
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Decode a chunked transfer-encoded body.
fn decode_chunked(data: &[u8]) -> Result<Vec<u8>> {
    let mut result = Vec::new();
    let mut pos = 0;

    while let Some(i) = find_subsequence(&data[pos..], b"\r\n") {
        let line_end = pos + i;
        let size_line = std::str::from_utf8(&data[pos..line_end])
            .map_err(|_| DesktermError::Network("bad chunk size".to_string()))?;
        // Chunk extensions follow a `;`.
        let size_str = size_line.split(';').next().unwrap_or_default().trim();
        let chunk_size = usize::from_str_radix(size_str, 16)
            .map_err(|_| DesktermError::Network("bad chunk size".to_string()))?;
        if chunk_size == 0 {
            break;
        }

        let chunk_start = line_end + 2;
        let chunk_end = chunk_start + chunk_size;
        if chunk_end > data.len() {
            result.extend_from_slice(&data[chunk_start..]);
            break;
        }
        if result.len() + chunk_size > MAX_BODY_SIZE {
            return Err(DesktermError::Network(
                "chunked body exceeds 8 MB limit".to_string(),
            ));
        }
        result.extend_from_slice(&data[chunk_start..chunk_end]);
        pos = chunk_end + 2;
        if pos > data.len() {
            break;
        }
    }
    Ok(result)
}

fn is_redirect(status: u16) -> bool {
    matches!(status, 301 | 302 | 303 | 307 | 308)
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn parse_simple_response() {
        let raw = b"HTTP/1.1 200 OK\r\n\
                     Content-Type: text/plain\r\n\
                     Content-Length: 5\r\n\
                     \r\n\
                     hello world";
        let resp = parse_response(raw, false).unwrap();
        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.reason, "OK");
        assert_eq!(resp.header("Content-Type"), Some("text/plain"));
        assert_eq!(resp.body, b"hello");
        assert!(resp.is_success());
    }

    #[test]
    fn parse_without_length_reads_to_end() {
        let raw = b"HTTP/1.0 404 Not Found\r\n\r\nmissing";
        let resp = parse_response(raw, false).unwrap();
        assert_eq!(resp.status_code, 404);
        assert_eq!(resp.text(), "missing");
        assert!(!resp.is_success());
    }

    #[test]
    fn head_response_has_no_body() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n";
        let resp = parse_response(raw, true).unwrap();
        assert!(resp.body.is_empty());
    }

    #[test]
    fn parse_chunked() {
        let raw = b"HTTP/1.1 200 OK\r\n\
                     Transfer-Encoding: chunked\r\n\
                     \r\n\
                     5\r\nhello\r\n6;x=y\r\n world\r\n0\r\n\r\n";
        let resp = parse_response(raw, false).unwrap();
        assert_eq!(resp.text(), "hello world");
    }

    #[test]
    fn rejects_malformed() {
        assert!(parse_response(b"garbage", false).is_err());
        assert!(parse_response(b"SPDY 200\r\n\r\n", false).is_err());
        assert!(parse_status_line("HTTP/1.1 abc").is_err());
    }

    #[test]
    fn oversized_content_length() {
        let head = format!("HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n", MAX_BODY_SIZE + 1);
        let err = parse_response(head.as_bytes(), false).unwrap_err();
        assert!(err.to_string().contains("8 MB"));
    }

    #[test]
    fn request_head_includes_body_headers() {
        let url = Url::parse("http://example.com:8080/api?x=1").unwrap();
        let req = HttpRequest::new("post", url.clone())
            .header("X-Test", "1")
            .body("a=b");
        let mut out = Vec::new();
        send_request(&mut out, &req, &url).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("POST /api?x=1 HTTP/1.1\r\nHost: example.com:8080\r\n"));
        assert!(text.contains("X-Test: 1\r\n"));
        assert!(text.contains("Content-Length: 3\r\n"));
        assert!(text.ends_with("\r\n\r\na=b"));
    }

    #[test]
    fn unsupported_scheme() {
        let url = Url::parse("ftp://example.com/").unwrap();
        let err = StdHttpClient::new().request(&HttpRequest::get(url)).unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    fn serve_once(response: &'static str) -> (u16, std::thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4096];
            let n = stream.read(&mut buf).unwrap_or(0);
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&buf[..n]).into_owned()
        });
        (port, handle)
    }

    #[test]
    fn round_trip_against_local_server() {
        let (port, handle) = serve_once("HTTP/1.1 201 Created\r\nContent-Length: 2\r\n\r\nok");
        let url = Url::parse(&format!("http://127.0.0.1:{port}/things")).unwrap();
        let resp = StdHttpClient::new()
            .request(&HttpRequest::new("PUT", url).timeout(Duration::from_secs(5)))
            .unwrap();
        assert_eq!(resp.status_code, 201);
        assert_eq!(resp.text(), "ok");
        let seen = handle.join().unwrap();
        assert!(seen.starts_with("PUT /things HTTP/1.1"));
    }

    #[test]
    fn connection_refused_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let url = Url::parse(&format!("http://127.0.0.1:{port}/")).unwrap();
        let err = StdHttpClient::new()
            .request(&HttpRequest::get(url).timeout(Duration::from_secs(2)))
            .unwrap_err();
        assert!(matches!(err, DesktermError::Network(_)));
    }
}
