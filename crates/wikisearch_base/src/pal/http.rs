/* 📖 # Why a dedicated HTTP module in the PAL?

The server speaks a deliberately small slice of HTTP/1.0 directly on the socket:
one request line in, one status line plus headers plus body out, then close.
These value types keep that response shape in one place so the connection
handler builds a response and serializes it without touching the wire format.

This module provides raw HTTP types only; parsing and routing live in the engine.
*/

use std::io::{self, Read, Write};
use std::time::Duration;

/// HTTP methods the server answers. Anything else is refused by the router.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
}

impl HttpMethod {
    /// Parse an HTTP method, ignoring case.
    pub fn parse(method: &str) -> Option<Self> {
        if method.eq_ignore_ascii_case("GET") {
            Some(Self::Get)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Response headers in insertion order.
///
/// Insertion order is kept so the serialized response is byte-for-byte stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpHeaders {
    inner: Vec<(String, String)>,
}

impl HttpHeaders {
    /// Create empty headers.
    pub fn new() -> Self {
        Self { inner: Vec::new() }
    }

    /// Insert a header, replacing an existing one with the same name (case-insensitive).
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self
            .inner
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&key))
        {
            Some(entry) => entry.1 = value,
            None => self.inner.push((key, value)),
        }
    }

    /// Iterate over all headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/* 📖 # Why support both bytes and streaming in HttpBody?
Search result pages and error pages are small and built in memory. Static files
can be arbitrarily large and are copied from the open file straight to the socket
instead of being loaded into memory first.
*/

/// HTTP response body content.
pub enum HttpBody {
    /// Fixed-size body content
    Bytes(Vec<u8>),
    /// Streaming body content
    Stream(Box<dyn Read + Send>),
}

impl HttpBody {
    /// Create an empty body.
    pub fn empty() -> Self {
        Self::Bytes(vec![])
    }

    /// Create from string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self::Bytes(s.into().into_bytes())
    }

    /// Create from a streaming reader.
    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Self {
        Self::Stream(Box::new(reader))
    }

    /// Copy the body to the writer, returning the number of bytes written.
    pub fn write_to(self, writer: &mut dyn Write) -> io::Result<u64> {
        match self {
            Self::Bytes(bytes) => {
                writer.write_all(&bytes)?;
                Ok(bytes.len() as u64)
            }
            Self::Stream(mut reader) => io::copy(&mut reader, writer),
        }
    }
}

impl Default for HttpBody {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for HttpBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Stream(_) => f.debug_tuple("Stream").finish(),
        }
    }
}

impl From<String> for HttpBody {
    fn from(s: String) -> Self {
        Self::from_string(s)
    }
}

/// HTTP status codes produced by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpStatusCode {
    Ok = 200,
    MovedPermanently = 301,
    NotFound = 404,
    InternalServerError = 500,
}

impl HttpStatusCode {
    /// Get the numeric status code.
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Get the standard reason phrase.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::MovedPermanently => "Moved Permanently",
            Self::NotFound => "Not Found",
            Self::InternalServerError => "Internal Server Error",
        }
    }
}

/// HTTP response structure.
#[derive(Debug)]
pub struct HttpResponse {
    status: HttpStatusCode,
    headers: HttpHeaders,
    body: HttpBody,
}

impl HttpResponse {
    /// Create a new response with the given status.
    pub fn new(status: HttpStatusCode) -> Self {
        Self {
            status,
            headers: HttpHeaders::new(),
            body: HttpBody::empty(),
        }
    }

    /// Create a 200 OK response.
    pub fn ok() -> Self {
        Self::new(HttpStatusCode::Ok)
    }

    /// Create a 404 Not Found response.
    pub fn not_found() -> Self {
        Self::new(HttpStatusCode::NotFound)
    }

    /// Create a 500 Internal Server Error response.
    pub fn internal_error() -> Self {
        Self::new(HttpStatusCode::InternalServerError)
    }

    /// Create a 301 redirect to the given location.
    pub fn moved_permanently(location: impl Into<String>) -> Self {
        Self::new(HttpStatusCode::MovedPermanently).with_header("Location", location)
    }

    /// Get the status code.
    pub fn status(&self) -> HttpStatusCode {
        self.status
    }

    /// Set the response body.
    pub fn with_body(mut self, body: impl Into<HttpBody>) -> Self {
        self.body = body.into();
        self
    }

    /// Set a header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }

    /// Set the content type header. The header name is written as `Content-type`.
    pub fn with_content_type(self, content_type: impl Into<String>) -> Self {
        self.with_header("Content-type", content_type)
    }

    /// Create an HTML response.
    pub fn html(body: impl Into<String>) -> Self {
        Self::ok().with_content_type("text/html").with_body(body.into())
    }

    /// Serialize the response: status line, headers, blank line, body, then flush.
    ///
    /// Returns the number of body bytes written.
    pub fn write_to(self, writer: &mut dyn Write) -> io::Result<u64> {
        write!(
            writer,
            "HTTP/1.0 {} {}\r\n",
            self.status.as_u16(),
            self.status.reason_phrase()
        )?;
        for (key, value) in self.headers.iter() {
            write!(writer, "{}: {}\r\n", key, value)?;
        }
        writer.write_all(b"\r\n")?;
        let written = self.body.write_to(writer)?;
        writer.flush()?;
        Ok(written)
    }
}

/// Configuration for the listening socket.
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on. If None, the OS will assign an available port.
    pub port: Option<u16>,
    /// Optional read/write deadline applied to every accepted connection.
    pub io_timeout: Option<Duration>,
}

impl HttpServerConfig {
    /// Create a new configuration with the given host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            io_timeout: None,
        }
    }

    /// Set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the per-connection read/write timeout.
    pub fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = Some(timeout);
        self
    }

    /// Get the address string (host:port, port 0 for OS-assigned).
    ///
    /// IPv6 hosts are bracketed.
    pub fn address(&self) -> String {
        let port = self.port.unwrap_or(0);
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, port)
        } else {
            format!("{}:{}", self.host, port)
        }
    }
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self::new("127.0.0.1")
    }
}
