/* 📖 # Why render HTML by hand?

The server emits exactly three kinds of page: a flat list of result links, a
"not found" page and a "search failed" page. None of them is worth a template
engine. Everything that came from the client or from the index goes through
`pulldown_cmark_escape` first, so document identifiers and requested paths can
never inject markup into the page.
*/

use pulldown_cmark_escape::{escape_href, escape_html};

use crate::relevance::ScoredEntry;

/// Guess the content type of a file from its extension (case-insensitive).
pub fn guess_content_type(path: &str) -> &'static str {
    let path_lower = path.to_lowercase();
    if path_lower.ends_with(".html") || path_lower.ends_with(".htm") {
        "text/html"
    } else if path_lower.ends_with(".jpg") || path_lower.ends_with(".jpeg") {
        "image/jpeg"
    } else if path_lower.ends_with(".gif") {
        "image/gif"
    } else if path_lower.ends_with(".class") {
        "application/octet-stream"
    } else {
        "text/plain"
    }
}

fn escaped_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a String cannot fail.
    let _ = escape_html(&mut out, text);
    out
}

fn escaped_href(href: &str) -> String {
    let mut out = String::with_capacity(href.len());
    let _ = escape_href(&mut out, href);
    out
}

/// Result page for `term`: one link per document, in the given order.
pub fn render_results(term: &str, entries: &[ScoredEntry]) -> String {
    let term = escaped_html(term);
    let mut html = format!(
        "<html><head><title>Search: {term}</title></head><body>\n\
         <h1>Results for {term}</h1>\n"
    );
    if entries.is_empty() {
        html.push_str("<p>No documents found</p>\n");
    } else {
        html.push_str("<ol>\n");
        for entry in entries {
            html.push_str(&format!(
                "<li><a href=\"{}\">{}</a> ({})</li>\n",
                escaped_href(&entry.document),
                escaped_html(&entry.document),
                entry.relevance
            ));
        }
        html.push_str("</ol>\n");
    }
    html.push_str("</body></html>\n");
    html
}

/// Body of the 404 page naming the requested path.
///
/// `path` is the file the request resolved to, as the parser produces it: no
/// leading `/`, no query, `index.html` appended to directories. Refused
/// requests are named the same way, so `/docs/` reads `docs/index.html not found`
/// whether the file is missing or the method was wrong.
pub fn render_not_found(path: &str) -> String {
    format!(
        "<html><head></head><body>{} not found</body></html>\n",
        escaped_html(path)
    )
}

/// Body of the 500 page for a failed index lookup.
pub fn render_search_failed(term: &str) -> String {
    format!(
        "<html><head></head><body>search failed for {}</body></html>\n",
        escaped_html(term)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;

    #[test]
    fn test_content_types() {
        assert_eq!(guess_content_type("index.html"), "text/html");
        assert_eq!(guess_content_type("old/INDEX.HTM"), "text/html");
        assert_eq!(guess_content_type("a/photo.jpeg"), "image/jpeg");
        assert_eq!(guess_content_type("photo.JPG"), "image/jpeg");
        assert_eq!(guess_content_type("anim.gif"), "image/gif");
        assert_eq!(guess_content_type("Applet.class"), "application/octet-stream");
        assert_eq!(guess_content_type("notes.txt"), "text/plain");
        assert_eq!(guess_content_type("Makefile"), "text/plain");
        assert_eq!(guess_content_type("archive.html.gz"), "text/plain");
    }

    #[test]
    fn test_render_results() {
        let entries = vec![ScoredEntry::new("docB", 1), ScoredEntry::new("docA", 3)];
        expect![[r#"
            <html><head><title>Search: ibm</title></head><body>
            <h1>Results for ibm</h1>
            <ol>
            <li><a href="docB">docB</a> (1)</li>
            <li><a href="docA">docA</a> (3)</li>
            </ol>
            </body></html>
        "#]]
        .assert_eq(&render_results("ibm", &entries));
    }

    #[test]
    fn test_render_empty_results() {
        expect![[r#"
            <html><head><title>Search: zzz</title></head><body>
            <h1>Results for zzz</h1>
            <p>No documents found</p>
            </body></html>
        "#]]
        .assert_eq(&render_results("zzz", &[]));
    }

    #[test]
    fn test_render_escapes_documents_and_terms() {
        let entries = vec![ScoredEntry::new("<script>", 1)];
        let html = render_results("a&b", &entries);
        assert!(html.contains("Results for a&amp;b"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_render_not_found() {
        expect![[r#"
            "<html><head></head><body>docs/missing.html not found</body></html>\n"
        "#]]
        .assert_debug_eq(&render_not_found("docs/missing.html"));
        assert!(render_not_found("<b>").contains("&lt;b&gt; not found"));
    }

    #[test]
    fn test_render_search_failed() {
        expect![[r#"
            "<html><head></head><body>search failed for ibm</body></html>\n"
        "#]]
        .assert_debug_eq(&render_search_failed("ibm"));
    }
}
