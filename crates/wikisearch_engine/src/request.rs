/* 📖 # How is a request line turned into a route?

The server reads exactly one line per connection, e.g.

```text
GET /search?q=IBM HTTP/1.0
```

and decides between two things: answer a search, or serve a file below the
document root. Parsing never fails with an error; it returns a tagged outcome.
Anything that cannot be served safely is `Malformed` and becomes a 404, exactly
like a missing file, so a probing client learns nothing about the filesystem.

The steps, in order:
1. Split on whitespace; the method must be `GET` (any case) and a path must follow.
2. A path ending in `/` gets `index.html` appended.
3. Leading `/` are stripped.
4. Paths containing `..`, `:` or `|` are rejected before the filesystem is consulted.
5. The first `?` separates the file path from `&`-separated `key=value` pairs.
6. A `q` parameter that is not blank makes the request a search for its trimmed,
   lower-cased value.

The path after steps 2 and 3, without its query, is the name a 404 page shows.
A refused request and a missing file therefore read the same way.

The file path itself is never percent-decoded, so `%2e%2e` is just an odd file
name and not a way around step 4.
*/

use std::collections::BTreeMap;

use wikisearch_base::FilePath;
use wikisearch_base::pal::http::HttpMethod;

const INDEX_FILE: &str = "index.html";
const SEARCH_PARAM: &str = "q";
const FORBIDDEN_SEQUENCES: [&str; 3] = ["..", ":", "|"];

/// What the connection should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Answer a search for a lower-cased term.
    Search { term: String },
    /// Serve a file (or redirect to a directory) below the document root.
    File { path: FilePath },
}

/// A successfully parsed request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    pub method: HttpMethod,
    /// The path token exactly as received.
    pub raw_path: String,
    /// Decoded query parameters; the last value wins for repeated keys.
    pub query_params: BTreeMap<String, String>,
    pub route: Route,
}

impl ParsedRequest {
    /// The sanitized file path, absent for search requests.
    pub fn sanitized_file_path(&self) -> Option<&FilePath> {
        match &self.route {
            Route::File { path } => Some(path),
            Route::Search { .. } => None,
        }
    }

    /// The search term, absent for file requests.
    pub fn search_term(&self) -> Option<&str> {
        match &self.route {
            Route::Search { term } => Some(term),
            Route::File { .. } => None,
        }
    }
}

/// Why a request line was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    /// The line was blank.
    Empty,
    /// Only a method, no path.
    MissingPath,
    /// Anything other than GET.
    UnsupportedMethod(String),
    /// The path tried to leave the document root.
    Traversal,
    /// The line did not fit the read limit, so only a prefix of it was seen.
    TooLong,
}

impl std::fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty request line"),
            Self::MissingPath => write!(f, "missing request path"),
            Self::UnsupportedMethod(method) => write!(f, "unsupported method {}", method),
            Self::Traversal => write!(f, "path escapes the document root"),
            Self::TooLong => write!(f, "request line too long"),
        }
    }
}

/// Result of parsing one request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Parsed(ParsedRequest),
    Malformed {
        reason: MalformedReason,
        /// The requested file, named the same way as for a file request.
        path: Option<String>,
    },
}

impl ParseOutcome {
    fn malformed(reason: MalformedReason, path: Option<&FilePath>) -> Self {
        Self::Malformed {
            reason,
            path: path.map(FilePath::to_string),
        }
    }
}

/// Parse one HTTP request line (without its line terminator).
///
/// # Examples
///
/// ```
/// use wikisearch_engine::request::{parse_request_line, ParseOutcome, Route};
///
/// let ParseOutcome::Parsed(request) = parse_request_line("GET /search?q=IBM HTTP/1.0") else {
///     panic!("expected a parsed request");
/// };
/// assert_eq!(request.route, Route::Search { term: "ibm".to_string() });
/// ```
pub fn parse_request_line(line: &str) -> ParseOutcome {
    let mut tokens = line.split_whitespace();
    let Some(method_token) = tokens.next() else {
        return ParseOutcome::malformed(MalformedReason::Empty, None);
    };
    let Some(raw_path) = tokens.next() else {
        return ParseOutcome::malformed(MalformedReason::MissingPath, None);
    };

    let mut path = raw_path.to_string();
    if path.ends_with('/') {
        path.push_str(INDEX_FILE);
    }
    let path = path.trim_start_matches('/');
    let (file_part, query) = path.split_once('?').unwrap_or((path, ""));
    let file_path = file_path_for(file_part);

    let Some(method) = HttpMethod::parse(method_token) else {
        return ParseOutcome::malformed(
            MalformedReason::UnsupportedMethod(method_token.to_string()),
            Some(&file_path),
        );
    };
    if FORBIDDEN_SEQUENCES.iter().any(|seq| path.contains(seq)) {
        return ParseOutcome::malformed(MalformedReason::Traversal, Some(&file_path));
    }

    let query_params = parse_query(query);
    let route = match query_params.get(SEARCH_PARAM).map(|term| term.trim()) {
        Some(term) if !term.is_empty() => Route::Search {
            term: term.to_lowercase(),
        },
        _ => Route::File { path: file_path },
    };

    ParseOutcome::Parsed(ParsedRequest {
        method,
        raw_path: raw_path.to_string(),
        query_params,
        route,
    })
}

/// Map the file part of a request to a path below the root.
///
/// The root itself and anything ending in `/` (possible once a query string has
/// been split off) resolve to the directory's index file.
fn file_path_for(file_part: &str) -> FilePath {
    if file_part.is_empty() || file_part.ends_with('/') {
        FilePath::from(format!("{}{}", file_part, INDEX_FILE))
    } else {
        FilePath::from(file_part)
    }
}

/// Parse `k=v&k2=v2`. Pairs without `=` or with an empty key are skipped.
pub fn parse_query(query: &str) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    for pair in query.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let key = decode_component(key);
        if key.is_empty() {
            continue;
        }
        params.insert(key, decode_component(value));
    }
    params
}

/// Percent-decode a query component, treating `+` as a space.
///
/// Invalid UTF-8 after decoding is replaced rather than rejected.
fn decode_component(component: &str) -> String {
    let spaced = component.replace('+', " ");
    let bytes = urlencoding::decode_binary(spaced.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;

    fn parsed(line: &str) -> ParsedRequest {
        match parse_request_line(line) {
            ParseOutcome::Parsed(request) => request,
            other => panic!("expected parsed request for {line:?}, got {other:?}"),
        }
    }

    fn reason(line: &str) -> MalformedReason {
        match parse_request_line(line) {
            ParseOutcome::Malformed { reason, .. } => reason,
            other => panic!("expected malformed request for {line:?}, got {other:?}"),
        }
    }

    fn file_route(line: &str) -> String {
        parsed(line)
            .sanitized_file_path()
            .map(|path| path.to_string())
            .unwrap_or_default()
    }

    #[test]
    fn test_search_request() {
        let request = parsed("GET /search?q=IBM HTTP/1.0");
        expect![[r#"
            ParsedRequest {
                method: Get,
                raw_path: "/search?q=IBM",
                query_params: {
                    "q": "IBM",
                },
                route: Search {
                    term: "ibm",
                },
            }
        "#]]
        .assert_debug_eq(&request);
        assert_eq!(request.sanitized_file_path(), None);
    }

    #[test]
    fn test_file_request() {
        let request = parsed("GET /docs/readme.html HTTP/1.0");
        assert_eq!(request.search_term(), None);
        assert_eq!(file_route("GET /docs/readme.html HTTP/1.0"), "docs/readme.html");
    }

    #[test]
    fn test_method_is_case_insensitive() {
        assert_eq!(file_route("get /a.txt HTTP/1.0"), "a.txt");
    }

    #[test]
    fn test_http_version_is_optional() {
        assert_eq!(file_route("GET /a.txt"), "a.txt");
    }

    #[test]
    fn test_line_terminators_are_whitespace() {
        assert_eq!(file_route("GET /a.txt HTTP/1.0\r\n"), "a.txt");
    }

    #[test]
    fn test_trailing_slash_appends_index() {
        assert_eq!(file_route("GET / HTTP/1.0"), "index.html");
        assert_eq!(file_route("GET /reports/ HTTP/1.0"), "reports/index.html");
    }

    #[test]
    fn test_all_leading_slashes_are_stripped() {
        assert_eq!(file_route("GET ///etc/hosts HTTP/1.0"), "etc/hosts");
    }

    #[test]
    fn test_root_with_query_serves_index() {
        assert_eq!(file_route("GET /?lang=en HTTP/1.0"), "index.html");
        assert_eq!(file_route("GET /reports/?lang=en HTTP/1.0"), "reports/index.html");
    }

    #[test]
    fn test_malformed_lines() {
        assert_eq!(reason(""), MalformedReason::Empty);
        assert_eq!(reason("   \r\n"), MalformedReason::Empty);
        assert_eq!(reason("GET"), MalformedReason::MissingPath);
        assert_eq!(
            reason("POST /search HTTP/1.0"),
            MalformedReason::UnsupportedMethod("POST".to_string())
        );
        assert_eq!(
            reason("BREW /pot HTTP/1.0"),
            MalformedReason::UnsupportedMethod("BREW".to_string())
        );
    }

    #[test]
    fn test_traversal_is_rejected() {
        assert_eq!(reason("GET /../../etc/passwd HTTP/1.0"), MalformedReason::Traversal);
        assert_eq!(reason("GET /docs/../secret HTTP/1.0"), MalformedReason::Traversal);
        assert_eq!(reason("GET /C:/windows HTTP/1.0"), MalformedReason::Traversal);
        assert_eq!(reason("GET /a|b HTTP/1.0"), MalformedReason::Traversal);
        assert_eq!(reason("GET /search?q=a..b HTTP/1.0"), MalformedReason::Traversal);
    }

    #[test]
    fn test_malformed_names_path_like_file_request() {
        assert_eq!(
            parse_request_line("GET /../x HTTP/1.0"),
            ParseOutcome::Malformed {
                reason: MalformedReason::Traversal,
                path: Some("../x".to_string()),
            }
        );
        assert_eq!(
            parse_request_line("POST //reports/?q=ibm HTTP/1.0"),
            ParseOutcome::Malformed {
                reason: MalformedReason::UnsupportedMethod("POST".to_string()),
                path: Some("reports/index.html".to_string()),
            }
        );
        assert_eq!(
            parse_request_line("GET"),
            ParseOutcome::Malformed {
                reason: MalformedReason::MissingPath,
                path: None,
            }
        );
    }

    #[test]
    fn test_encoded_dots_are_not_decoded_in_file_path() {
        assert_eq!(file_route("GET /%2e%2e/secret HTTP/1.0"), "%2e%2e/secret");
    }

    #[test]
    fn test_query_parsing() {
        expect![[r#"
            {
                "lang": "en",
                "q": "hello world",
                "x": "",
            }
        "#]]
        .assert_debug_eq(&parse_query("q=hello+world&lang=de&novalue&=orphan&x=&lang=en"));
    }

    #[test]
    fn test_query_percent_decoding() {
        let params = parse_query("q=caf%C3%A9%20au%20lait&bad=%FF");
        assert_eq!(params["q"], "café au lait");
        assert_eq!(params["bad"], "\u{FFFD}");
    }

    #[test]
    fn test_last_q_wins() {
        assert_eq!(
            parsed("GET /s?q=first&q=Second HTTP/1.0").search_term(),
            Some("second")
        );
    }

    #[test]
    fn test_empty_q_is_file_request() {
        assert_eq!(file_route("GET /page.html?q= HTTP/1.0"), "page.html");
        assert_eq!(file_route("GET /page.html?other=1 HTTP/1.0"), "page.html");
    }

    #[test]
    fn test_blank_q_is_file_request() {
        assert_eq!(file_route("GET /page.html?q=+ HTTP/1.0"), "page.html");
        assert_eq!(file_route("GET /page.html?q=%20%09%20 HTTP/1.0"), "page.html");
    }

    #[test]
    fn test_search_term_is_trimmed() {
        assert_eq!(
            parsed("GET /search?q=+IBM+ HTTP/1.0").search_term(),
            Some("ibm")
        );
        assert_eq!(
            parsed("GET /search?q=big+blue HTTP/1.0").search_term(),
            Some("big blue")
        );
    }
}
