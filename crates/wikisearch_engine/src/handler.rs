/* 📖 # How does a connection move from request to response?

Each accepted connection gets exactly one pass through these states:

```text
Reading → Routing → Searching | FileServing → Responding → Closed
```

- **Reading** takes one line off the socket. A peer that hangs up before sending
  a line is not an error, the handler just returns. A line that does not end
  within `MAX_REQUEST_LINE` bytes is refused whole; its prefix is never routed.
- **Routing** hands the line to `parse_request_line`. Malformed lines get the
  same 404 as a missing file.
- **Searching** asks the index for the term and renders the sorted documents.
  A failing index is a 500, never an empty result page.
- **FileServing** redirects directories to their slash form, 404s anything
  that cannot be opened and streams the rest.
- **Responding** serializes the response and flushes.

`handle` takes the stream by value, so the socket is closed when the handler
returns on every path, including read and write failures. Nothing is retried.
*/

use std::io::{self, BufRead, BufReader, Read, Write};

use tracing::{debug, error, info, instrument, warn};

use wikisearch_base::PalHandle;
use wikisearch_base::error::ErrorKind;
use wikisearch_base::pal::FilePath;
use wikisearch_base::pal::http::{HttpBody, HttpResponse};

use crate::index::{IndexHandle, search};
use crate::render::{guess_content_type, render_not_found, render_results, render_search_failed};
use crate::request::{MalformedReason, ParseOutcome, Route, parse_request_line};

/// Longest request line accepted, terminator included.
const MAX_REQUEST_LINE: u64 = 8 * 1024;

/// What came off the socket before routing.
#[derive(Debug, PartialEq, Eq)]
enum RequestLine {
    Complete(String),
    TooLong,
    Closed,
}

/// Serves connections against one document root and one index.
///
/// Cloning is cheap: both collaborators are shared handles, so every connection
/// thread gets its own clone.
#[derive(Debug, Clone)]
pub struct ConnectionHandler {
    pal: PalHandle,
    index: IndexHandle,
}

impl ConnectionHandler {
    pub fn new(pal: PalHandle, index: IndexHandle) -> Self {
        Self { pal, index }
    }

    /// Serve a single connection and close it.
    #[instrument(skip(self, stream), fields(peer = %peer))]
    pub fn handle<S: Read + Write>(&self, mut stream: S, peer: &str) {
        let response = match read_request_line(&mut stream) {
            Ok(RequestLine::Complete(line)) => {
                info!(request = %line, "request");
                self.respond(&line)
            }
            Ok(RequestLine::TooLong) => {
                info!(limit = MAX_REQUEST_LINE, "request line too long");
                refuse(&MalformedReason::TooLong, None)
            }
            Ok(RequestLine::Closed) => {
                debug!("connection closed before a request line was sent");
                return;
            }
            Err(e) => {
                warn!(error = %e, "failed to read request line");
                return;
            }
        };
        let status = response.status().as_u16();
        match response.write_to(&mut stream) {
            Ok(bytes) => debug!(status, bytes, "response written"),
            Err(e) => warn!(status, error = %e, "failed to write response"),
        }
    }

    /// Build the response for one request line.
    pub fn respond(&self, line: &str) -> HttpResponse {
        match parse_request_line(line) {
            ParseOutcome::Malformed { reason, path } => refuse(&reason, path.as_deref()),
            ParseOutcome::Parsed(request) => {
                debug!(method = %request.method, path = %request.raw_path, "routing");
                match request.route {
                    Route::Search { term } => self.answer_search(&term),
                    Route::File { path } => self.serve_file(&path),
                }
            }
        }
    }

    fn answer_search(&self, term: &str) -> HttpResponse {
        match search(term, &self.index) {
            Ok(entries) => {
                debug!(term, hits = entries.len(), "search answered");
                HttpResponse::html(render_results(term, &entries))
            }
            Err(e) => {
                error!(term, error = %e, "index lookup failed");
                HttpResponse::internal_error()
                    .with_content_type("text/html")
                    .with_body(render_search_failed(term))
            }
        }
    }

    fn serve_file(&self, path: &FilePath) -> HttpResponse {
        match self.pal.is_directory(path) {
            Ok(true) => {
                debug!(%path, "redirecting to directory");
                return HttpResponse::moved_permanently(format!("/{}/", path));
            }
            Ok(false) => {}
            Err(e) => warn!(%path, error = %e, "could not check for directory"),
        }

        match self.pal.read_file(path) {
            Ok(reader) => HttpResponse::ok()
                .with_content_type(guess_content_type(path.as_str()))
                .with_body(HttpBody::from_reader(reader)),
            Err(e) => {
                if is_not_found(e.kind()) {
                    debug!(%path, "file not found");
                } else {
                    warn!(%path, error = %e, "failed to open file");
                }
                not_found(path.as_str())
            }
        }
    }
}

fn refuse(reason: &MalformedReason, path: Option<&str>) -> HttpResponse {
    debug!(%reason, "malformed request");
    not_found(path.unwrap_or(""))
}

fn not_found(path: &str) -> HttpResponse {
    HttpResponse::not_found()
        .with_content_type("text/html")
        .with_body(render_not_found(path))
}

fn is_not_found(kind: &ErrorKind) -> bool {
    matches!(kind, ErrorKind::FileError { source, .. } if source.kind() == io::ErrorKind::NotFound)
}

/// Read one `\n` or `\r\n` terminated line.
///
/// A peer that closes after a partial line still gets it routed. Bytes that are
/// not UTF-8 are replaced, which at worst turns the request into a 404.
fn read_request_line<R: Read>(stream: R) -> io::Result<RequestLine> {
    let mut reader = BufReader::new(stream.take(MAX_REQUEST_LINE));
    let mut buffer = Vec::new();
    let read = reader.read_until(b'\n', &mut buffer)?;
    if read == 0 {
        return Ok(RequestLine::Closed);
    }
    if read as u64 == MAX_REQUEST_LINE && !buffer.ends_with(b"\n") {
        return Ok(RequestLine::TooLong);
    }
    let line = String::from_utf8_lossy(&buffer);
    Ok(RequestLine::Complete(
        line.trim_end_matches(['\r', '\n']).to_string(),
    ))
}
